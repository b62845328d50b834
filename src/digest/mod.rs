//! Per-author digest messages.

pub mod format;
pub mod mention;

pub use format::{DIGEST_SEPARATOR, DigestContext, format_digest, format_duration};
pub use mention::{MentionMap, MentionParseError};
