//! Optimistic merge of a secondary writer's files into the shared record
//!
//! One read-modify-write attempt per call. Every outcome that a re-fetch
//! could change is reported as a retryable [`CertError::Conflict`]; the
//! caller owns the retry loop (see [`crate::sync::SecondarySync`]).

use certsync_core::effects::RecordStoreEffects;
use certsync_core::{CertError, RecordId, Result, SecondarySet, SharedRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Classification of a freshly fetched record against the secondary files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// The record carries no data map at all
    NoData,
    /// Secondary keys are present and every supplied file matches
    PresentMatching,
    /// Secondary keys are present but some stored content differs
    PresentConflicting {
        /// Supplied files whose stored value is different or absent
        differing: Vec<String>,
    },
    /// No secondary key is present yet
    NotPresent,
}

/// Successful merge outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The files were added to the record
    Merged,
    /// Identical files were already stored by another writer
    AlreadyPresent,
}

/// Decide what to do with `record`.
///
/// Once any member of `set` is stored, every supplied file must be stored
/// with identical bytes; a supplied file missing from the record counts as
/// differing.
pub fn decide(
    record: &SharedRecord,
    set: &SecondarySet,
    files: &BTreeMap<String, Vec<u8>>,
) -> ReconcileDecision {
    let Some(data) = &record.data else {
        return ReconcileDecision::NoData;
    };

    if !set.iter().any(|name| data.contains_key(name)) {
        return ReconcileDecision::NotPresent;
    }

    let differing: Vec<String> = files
        .iter()
        .filter(|(name, content)| data.get(name.as_str()) != Some(*content))
        .map(|(name, _)| name.clone())
        .collect();

    if differing.is_empty() {
        ReconcileDecision::PresentMatching
    } else {
        ReconcileDecision::PresentConflicting { differing }
    }
}

/// Merges a fixed secondary file set into an already bootstrapped record
#[derive(Clone)]
pub struct SecondaryWriterReconciler {
    store: Arc<dyn RecordStoreEffects>,
    record: RecordId,
    set: SecondarySet,
}

impl SecondaryWriterReconciler {
    /// Create a reconciler for `record`
    pub fn new(store: Arc<dyn RecordStoreEffects>, record: RecordId, set: SecondarySet) -> Self {
        Self { store, record, set }
    }

    /// The secondary file set
    pub fn set(&self) -> &SecondarySet {
        &self.set
    }

    /// One optimistic attempt at merging `files` into the record.
    ///
    /// `files` must hold exactly the members of the secondary set.
    pub async fn merge_secondary_files(
        &self,
        files: &BTreeMap<String, Vec<u8>>,
    ) -> Result<MergeOutcome> {
        self.check_complete(files)?;

        let mut record = self.store.get(&self.record).await.map_err(|e| {
            if e.is_not_found() {
                CertError::NotFound {
                    record: self.record.clone(),
                }
            } else {
                CertError::store(&self.record, "get certs record", e)
            }
        })?;

        match decide(&record, &self.set, files) {
            ReconcileDecision::NoData => Err(CertError::conflict(
                &self.record,
                "record has no data, fetch it again",
            )),
            ReconcileDecision::PresentMatching => {
                debug!(record = %self.record, "Secondary files already stored");
                Ok(MergeOutcome::AlreadyPresent)
            }
            ReconcileDecision::PresentConflicting { differing } => Err(CertError::conflict(
                &self.record,
                format!("record already holds different content for {}", differing.join(", ")),
            )),
            ReconcileDecision::NotPresent => {
                if let Some(data) = record.data.as_mut() {
                    for (name, content) in files {
                        data.insert(name.clone(), content.clone());
                    }
                }
                match self.store.update(record).await {
                    Ok(updated) => {
                        info!(
                            record = %self.record,
                            files = files.len(),
                            digest = %updated.digest(),
                            "Merged secondary files into certs record"
                        );
                        Ok(MergeOutcome::Merged)
                    }
                    Err(e) if e.is_conflict() => Err(CertError::conflict(&self.record, e.to_string())),
                    Err(e) => Err(CertError::store(&self.record, "update certs record", e)),
                }
            }
        }
    }

    fn check_complete(&self, files: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        if let Some(extra) = files.keys().find(|name| !self.set.contains(name)) {
            return Err(CertError::invalid(format!("{extra} is not a secondary file")));
        }
        if let Some(missing) = self.set.iter().find(|name| !files.contains_key(*name)) {
            return Err(CertError::invalid(format!("secondary file {missing} was not supplied")));
        }
        Ok(())
    }
}

impl fmt::Debug for SecondaryWriterReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryWriterReconciler")
            .field("record", &self.record)
            .field("set", &self.set)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certsync_core::RecordVersion;

    fn files(entries: &[(&str, &[u8])]) -> BTreeMap<String, Vec<u8>> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_vec()))
            .collect()
    }

    fn record(entries: &[(&str, &[u8])]) -> SharedRecord {
        let mut record = SharedRecord::new(RecordId::for_cluster("ns1", "vc1"), files(entries));
        record.version = Some(RecordVersion::new("1"));
        record
    }

    #[test]
    fn test_no_data() {
        let set = SecondarySet::new(["k0s.crt"]).unwrap();
        let mut record = record(&[]);
        record.data = None;
        assert_eq!(decide(&record, &set, &files(&[("k0s.crt", b"a")])), ReconcileDecision::NoData);
    }

    #[test]
    fn test_not_present() {
        let set = SecondarySet::new(["k0s.crt", "k0s.key"]).unwrap();
        let record = record(&[("ca.crt", b"ca")]);
        let supplied = files(&[("k0s.crt", b"a"), ("k0s.key", b"b")]);
        assert_eq!(decide(&record, &set, &supplied), ReconcileDecision::NotPresent);
    }

    #[test]
    fn test_present_matching() {
        let set = SecondarySet::new(["k0s.crt", "k0s.key"]).unwrap();
        let record = record(&[("ca.crt", b"ca"), ("k0s.crt", b"a"), ("k0s.key", b"b")]);
        let supplied = files(&[("k0s.crt", b"a"), ("k0s.key", b"b")]);
        assert_eq!(decide(&record, &set, &supplied), ReconcileDecision::PresentMatching);
    }

    #[test]
    fn test_present_conflicting() {
        let set = SecondarySet::new(["k0s.crt", "k0s.key"]).unwrap();
        let record = record(&[("k0s.crt", b"a"), ("k0s.key", b"other")]);
        let supplied = files(&[("k0s.crt", b"a"), ("k0s.key", b"b")]);
        assert_eq!(
            decide(&record, &set, &supplied),
            ReconcileDecision::PresentConflicting {
                differing: vec!["k0s.key".to_string()]
            }
        );
    }

    #[test]
    fn test_partial_presence_conflicts() {
        let set = SecondarySet::new(["k0s.crt", "k0s.key"]).unwrap();
        let record = record(&[("k0s.crt", b"a")]);
        let supplied = files(&[("k0s.crt", b"a"), ("k0s.key", b"b")]);
        assert_eq!(
            decide(&record, &set, &supplied),
            ReconcileDecision::PresentConflicting {
                differing: vec!["k0s.key".to_string()]
            }
        );
    }
}
