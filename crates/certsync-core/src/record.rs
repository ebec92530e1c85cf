//! Shared record identity and shape
//!
//! A shared record is a flat, versioned `key -> bytes` document in the
//! network-accessible store. It carries no metadata beyond its version token,
//! and does not distinguish mapped from extra entries once stored.

use crate::bundle::digest_entries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Suffix appended to the cluster name to form the record name
pub const RECORD_NAME_SUFFIX: &str = "-certs";

/// Deterministic identity of a shared record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    /// Logical namespace shared by all participants
    pub namespace: String,
    /// Record name within the namespace
    pub name: String,
}

impl RecordId {
    /// Create a record id from its parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The certificate record of a cluster: `<cluster_name>-certs`
    pub fn for_cluster(namespace: impl Into<String>, cluster_name: &str) -> Self {
        Self::new(namespace, format!("{cluster_name}{RECORD_NAME_SUFFIX}"))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Opaque optimistic-concurrency token assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordVersion(String);

impl RecordVersion {
    /// Wrap a store-specific version token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versioned key/value document shared by all participants of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRecord {
    /// Record identity
    pub id: RecordId,
    /// Stored entries; `None` when the record carries no data at all
    pub data: Option<BTreeMap<String, Vec<u8>>>,
    /// Version token, `None` until the store has accepted the record
    pub version: Option<RecordVersion>,
}

impl SharedRecord {
    /// A record that has not been stored yet
    pub fn new(id: RecordId, data: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            id,
            data: Some(data),
            version: None,
        }
    }

    /// Value stored under `key`, if any
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.as_ref()?.get(key).map(Vec::as_slice)
    }

    /// Whether the record stores `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.as_ref().is_some_and(|data| data.contains_key(key))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, BTreeMap::len)
    }

    /// Whether the record stores no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content digest over the stored entries (hex BLAKE3)
    pub fn digest(&self) -> String {
        match &self.data {
            Some(data) => digest_entries(data.iter().map(|(k, v)| (k.as_str(), v.as_slice()))),
            None => digest_entries(std::iter::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_for_cluster() {
        let id = RecordId::for_cluster("ns1", "vc1");
        assert_eq!(id.name, "vc1-certs");
        assert_eq!(id.to_string(), "ns1/vc1-certs");
    }

    #[test]
    fn test_record_without_data() {
        let record = SharedRecord {
            id: RecordId::for_cluster("ns1", "vc1"),
            data: None,
            version: Some(RecordVersion::new("7")),
        };
        assert!(record.is_empty());
        assert!(!record.contains_key("ca.crt"));
        assert_eq!(record.get("ca.crt"), None);
    }
}
