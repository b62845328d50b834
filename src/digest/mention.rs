//! Mapping GitHub logins to chat mentions.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::Author;

/// A malformed `login:mention` entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MentionParseError {
    #[error("mention entry {entry:?} is missing ':' (expected gitLogin:mentionHandle)")]
    MissingSeparator { entry: String },

    #[error("mention entry {entry:?} has an empty login")]
    EmptyLogin { entry: String },
}

/// GitHub login to chat handle, e.g. `alice` to `@al` or `<@U024BE7LH>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionMap {
    handles: BTreeMap<String, String>,
}

impl MentionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `login:handle` entries separated by commas or newlines.
    ///
    /// Entries split on the first `:`, so handles may contain colons. Blank
    /// entries are ignored; later entries override earlier ones.
    pub fn parse(input: &str) -> Result<Self, MentionParseError> {
        let mut map = Self::new();

        for entry in input.split([',', '\n']).map(str::trim) {
            if entry.is_empty() {
                continue;
            }
            let (login, handle) =
                entry
                    .split_once(':')
                    .ok_or_else(|| MentionParseError::MissingSeparator {
                        entry: entry.to_string(),
                    })?;
            let login = login.trim();
            if login.is_empty() {
                return Err(MentionParseError::EmptyLogin {
                    entry: entry.to_string(),
                });
            }
            map.insert(login, handle.trim());
        }

        Ok(map)
    }

    pub fn insert(&mut self, login: impl Into<String>, handle: impl Into<String>) {
        self.handles.insert(login.into(), handle.into());
    }

    pub fn get(&self, login: &str) -> Option<&str> {
        self.handles.get(login).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Renders how `author` is addressed in a digest.
    ///
    /// A mapped author becomes `handle (login)`, even when the handle is empty;
    /// anyone else becomes `@login`. Unknown authors are looked up under `UNKNOWN`.
    pub fn mention(&self, author: &Author) -> String {
        let login = author.to_string();
        match self.get(&login) {
            Some(handle) => format!("{} ({})", handle, login),
            None => format!("@{}", login),
        }
    }
}
