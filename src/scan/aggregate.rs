//! Grouping stale branches by author.

use std::collections::BTreeMap;

use crate::types::{Author, ClassifiedBranch, StaleBranch};

/// Stale branches grouped by the author of each branch's latest commit.
///
/// Authors iterate in [`Author`] order (known logins alphabetically, unknown
/// last). Each author's branches are sorted stalest first, and every list is
/// non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorDigest {
    by_author: BTreeMap<Author, Vec<StaleBranch>>,
}

impl AuthorDigest {
    /// Keeps branches at least `threshold_days` old and groups them by author.
    ///
    /// Branches of unknown age are never included.
    pub fn build<'a>(
        classified: impl IntoIterator<Item = &'a ClassifiedBranch>,
        threshold_days: u32,
    ) -> Self {
        let mut by_author: BTreeMap<Author, Vec<StaleBranch>> = BTreeMap::new();

        for branch in classified {
            let Some(days) = branch.age.days() else {
                continue;
            };
            if !branch.age.is_stale(threshold_days) {
                continue;
            }
            by_author
                .entry(branch.author.clone())
                .or_default()
                .push(StaleBranch {
                    name: branch.name.clone(),
                    days,
                });
        }

        for branches in by_author.values_mut() {
            branches.sort_by(|a, b| b.days.total_cmp(&a.days));
        }

        AuthorDigest { by_author }
    }

    /// Iterates over authors and their stale branches.
    pub fn iter(&self) -> impl Iterator<Item = (&Author, &[StaleBranch])> {
        self.by_author.iter().map(|(a, b)| (a, b.as_slice()))
    }

    /// Returns the stale branches attributed to `author`.
    pub fn get(&self, author: &Author) -> Option<&[StaleBranch]> {
        self.by_author.get(author).map(Vec::as_slice)
    }

    /// Number of authors with at least one stale branch.
    pub fn author_count(&self) -> usize {
        self.by_author.len()
    }

    /// Total number of stale branches across all authors.
    pub fn branch_count(&self) -> usize {
        self.by_author.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommitAge;
    use proptest::prelude::*;

    fn classified(name: &str, author: Author, age: CommitAge) -> ClassifiedBranch {
        ClassifiedBranch {
            name: name.to_string(),
            author,
            age,
        }
    }

    fn carol() -> Author {
        Author::Login("carol".into())
    }

    #[test]
    fn sorts_each_author_stalest_first() {
        let input = vec![
            classified("five", carol(), CommitAge::Days(5.0)),
            classified("forty", carol(), CommitAge::Days(40.0)),
            classified("twelve", carol(), CommitAge::Days(12.0)),
        ];

        let digest = AuthorDigest::build(&input, 0);

        let days: Vec<f64> = digest.get(&carol()).unwrap().iter().map(|b| b.days).collect();
        assert_eq!(days, vec![40.0, 12.0, 5.0]);
    }

    #[test]
    fn threshold_is_inclusive_and_unknown_age_excluded() {
        let input = vec![
            classified("exact", carol(), CommitAge::Days(30.0)),
            classified("young", carol(), CommitAge::Days(29.9)),
            classified("dateless", carol(), CommitAge::Unknown),
        ];

        let digest = AuthorDigest::build(&input, 30);

        assert_eq!(digest.branch_count(), 1);
        assert_eq!(digest.get(&carol()).unwrap()[0].name, "exact");
    }

    #[test]
    fn groups_unknown_authors_together_and_last() {
        let input = vec![
            classified("a", Author::Unknown, CommitAge::Days(50.0)),
            classified("b", Author::Login("zed".into()), CommitAge::Days(50.0)),
            classified("c", Author::Unknown, CommitAge::Days(70.0)),
            classified("d", Author::Login("amy".into()), CommitAge::Days(50.0)),
        ];

        let digest = AuthorDigest::build(&input, 10);

        let authors: Vec<_> = digest.iter().map(|(a, _)| a.to_string()).collect();
        assert_eq!(authors, vec!["amy", "zed", "UNKNOWN"]);
        let unknown: Vec<_> = digest
            .get(&Author::Unknown)
            .unwrap()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(unknown, vec!["c", "a"]);
    }

    #[test]
    fn nothing_stale_is_empty() {
        let input = vec![classified("a", carol(), CommitAge::Days(1.0))];
        let digest = AuthorDigest::build(&input, 30);
        assert!(digest.is_empty());
        assert_eq!(digest.author_count(), 0);
    }

    fn arb_age() -> impl Strategy<Value = CommitAge> {
        prop_oneof![
            1 => Just(CommitAge::Unknown),
            4 => (0.0f64..1000.0).prop_map(CommitAge::Days),
        ]
    }

    fn arb_author() -> impl Strategy<Value = Author> {
        prop_oneof![
            Just(Author::Unknown),
            "[a-d]".prop_map(Author::Login),
        ]
    }

    proptest! {
        #[test]
        fn included_iff_known_and_over_threshold(
            entries in prop::collection::vec((arb_author(), arb_age()), 0..40),
            threshold in 0u32..500,
        ) {
            let input: Vec<_> = entries
                .into_iter()
                .enumerate()
                .map(|(i, (author, age))| classified(&format!("b{}", i), author, age))
                .collect();

            let digest = AuthorDigest::build(&input, threshold);

            for branch in &input {
                let listed = digest
                    .get(&branch.author)
                    .is_some_and(|list| list.iter().any(|s| s.name == branch.name));
                let expected =
                    matches!(branch.age, CommitAge::Days(d) if d >= f64::from(threshold));
                prop_assert_eq!(listed, expected, "branch {}", branch.name);
            }

            for (_, list) in digest.iter() {
                prop_assert!(!list.is_empty());
                for pair in list.windows(2) {
                    prop_assert!(pair[0].days >= pair[1].days);
                }
            }
        }
    }
}
