//! Files contributed by an independent writer after the initial bootstrap

use crate::errors::{CertError, Result};
use std::collections::BTreeSet;

/// Fixed set of local file names that must all exist before any of them is
/// merged into the shared record.
///
/// Names are used verbatim as storage keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondarySet {
    files: BTreeSet<String>,
}

impl SecondarySet {
    /// Build a set from file names; rejects empty sets, duplicates, and
    /// names that are empty or nested.
    pub fn new<I, S>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for file in files {
            let file = file.into();
            if file.is_empty() {
                return Err(CertError::invalid("secondary file names must not be empty"));
            }
            if file.contains('/') {
                return Err(CertError::invalid(format!(
                    "secondary file {file} must be a top-level file"
                )));
            }
            if !set.insert(file.clone()) {
                return Err(CertError::invalid(format!("secondary file {file} listed twice")));
            }
        }
        if set.is_empty() {
            return Err(CertError::invalid("secondary file set must not be empty"));
        }
        Ok(Self { files: set })
    }

    /// Whether `name` is a member
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    /// Iterate member names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false; empty sets are rejected at construction
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_secondary_set_sorted() {
        let set = SecondarySet::new(["b.crt", "a.crt"]).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a.crt", "b.crt"]);
        assert!(set.contains("a.crt"));
    }

    #[test]
    fn test_secondary_set_rejects_duplicates_and_empty() {
        assert_matches!(SecondarySet::new(["a", "a"]), Err(CertError::Invalid { .. }));
        assert_matches!(SecondarySet::new(Vec::<String>::new()), Err(CertError::Invalid { .. }));
        assert_matches!(SecondarySet::new([""]), Err(CertError::Invalid { .. }));
        assert_matches!(SecondarySet::new(["etcd/k0s.crt"]), Err(CertError::Invalid { .. }));
    }
}
