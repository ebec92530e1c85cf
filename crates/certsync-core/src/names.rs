//! Local file name <-> storage key mapping
//!
//! Shared record keys cannot contain path separators, so nested local files
//! such as `etcd/ca.crt` are stored under flattened keys (`etcd-ca.crt`).
//! Files outside the table pass through under their own name.

use crate::errors::{CertError, Result};
use std::collections::BTreeMap;

/// Canonical control-plane files and the keys they are stored under
const CONTROL_PLANE_TABLE: &[(&str, &str)] = &[
    ("apiserver-etcd-client.crt", "apiserver-etcd-client.crt"),
    ("apiserver-etcd-client.key", "apiserver-etcd-client.key"),
    ("apiserver-kubelet-client.crt", "apiserver-kubelet-client.crt"),
    ("apiserver-kubelet-client.key", "apiserver-kubelet-client.key"),
    ("apiserver.crt", "apiserver.crt"),
    ("apiserver.key", "apiserver.key"),
    ("ca.crt", "ca.crt"),
    ("ca.key", "ca.key"),
    ("front-proxy-ca.crt", "front-proxy-ca.crt"),
    ("front-proxy-ca.key", "front-proxy-ca.key"),
    ("front-proxy-client.crt", "front-proxy-client.crt"),
    ("front-proxy-client.key", "front-proxy-client.key"),
    ("sa.key", "sa.key"),
    ("sa.pub", "sa.pub"),
    ("etcd/ca.crt", "etcd-ca.crt"),
    ("etcd/ca.key", "etcd-ca.key"),
    ("etcd/healthcheck-client.crt", "etcd-healthcheck-client.crt"),
    ("etcd/healthcheck-client.key", "etcd-healthcheck-client.key"),
    ("etcd/peer.crt", "etcd-peer.crt"),
    ("etcd/peer.key", "etcd-peer.key"),
    ("etcd/server.crt", "etcd-server.crt"),
    ("etcd/server.key", "etcd-server.key"),
    ("admin.conf", "admin.conf"),
    ("controller-manager.conf", "controller-manager.conf"),
    ("scheduler.conf", "scheduler.conf"),
];

/// Local file whose presence means the PKI hierarchy was already generated
pub const PRIMARY_SIGNING_KEY: &str = "sa.key";

/// Bidirectional, injective mapping between local file names and storage keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMap {
    to_key: BTreeMap<String, String>,
    to_local: BTreeMap<String, String>,
}

impl NameMap {
    /// Build a mapping from `(local_name, storage_key)` pairs.
    ///
    /// Rejects duplicate local names and any two local names sharing a storage
    /// key, so that reverse lookups are never ambiguous.
    pub fn new<I, L, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, K)>,
        L: Into<String>,
        K: Into<String>,
    {
        let mut to_key = BTreeMap::new();
        let mut to_local = BTreeMap::new();

        for (local, key) in pairs {
            let local = local.into();
            let key = key.into();
            if local.is_empty() || key.is_empty() {
                return Err(CertError::invalid("name map entries must not be empty"));
            }
            if key.contains('/') {
                return Err(CertError::invalid(format!(
                    "storage key {key} for {local} contains a path separator"
                )));
            }
            if let Some(existing) = to_local.get(&key) {
                return Err(CertError::invalid(format!(
                    "storage key {key} is mapped from both {existing} and {local}"
                )));
            }
            if to_key.contains_key(&local) {
                return Err(CertError::invalid(format!("local name {local} is mapped twice")));
            }
            to_local.insert(key.clone(), local.clone());
            to_key.insert(local, key);
        }

        Ok(Self { to_key, to_local })
    }

    /// The canonical control-plane certificate table
    pub fn control_plane() -> Self {
        Self::from_static(CONTROL_PLANE_TABLE)
    }

    /// Build from a compiled-in table, which must already be injective
    fn from_static(table: &[(&str, &str)]) -> Self {
        let mut to_key = BTreeMap::new();
        let mut to_local = BTreeMap::new();
        for (local, key) in table {
            to_key.insert((*local).to_string(), (*key).to_string());
            to_local.insert((*key).to_string(), (*local).to_string());
        }
        debug_assert!(
            to_key.len() == table.len() && to_local.len() == table.len(),
            "static name table has a duplicate local name or storage key"
        );
        Self { to_key, to_local }
    }

    /// Storage key for a local file; identity if unmapped
    pub fn to_storage_key<'a>(&'a self, local_name: &'a str) -> &'a str {
        self.to_key.get(local_name).map_or(local_name, String::as_str)
    }

    /// Local file name for a storage key; identity if unmapped
    pub fn to_local_name<'a>(&'a self, storage_key: &'a str) -> &'a str {
        self.to_local.get(storage_key).map_or(storage_key, String::as_str)
    }

    /// Whether `local_name` is a canonical file
    pub fn is_mapped_local(&self, local_name: &str) -> bool {
        self.to_key.contains_key(local_name)
    }

    /// Whether `storage_key` belongs to a canonical file
    pub fn is_mapped_key(&self, storage_key: &str) -> bool {
        self.to_local.contains_key(storage_key)
    }

    /// Iterate `(local_name, storage_key)` pairs in local-name order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.to_key.iter().map(|(l, k)| (l.as_str(), k.as_str()))
    }

    /// Number of canonical files
    pub fn len(&self) -> usize {
        self.to_key.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.to_key.is_empty()
    }
}

impl Default for NameMap {
    fn default() -> Self {
        Self::control_plane()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_control_plane_table_is_injective() {
        let validated = NameMap::new(CONTROL_PLANE_TABLE.iter().copied()).unwrap();
        assert_eq!(validated, NameMap::control_plane());
        assert_eq!(validated.len(), CONTROL_PLANE_TABLE.len());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "duplicate local name or storage key")]
    fn test_colliding_static_table_panics() {
        NameMap::from_static(&[("etcd/ca.crt", "etcd-ca.crt"), ("etcd-ca.crt", "etcd-ca.crt")]);
    }

    #[test]
    fn test_nested_files_are_flattened() {
        let names = NameMap::control_plane();
        assert_eq!(names.to_storage_key("etcd/peer.key"), "etcd-peer.key");
        assert_eq!(names.to_local_name("etcd-peer.key"), "etcd/peer.key");
        assert!(names.is_mapped_key("etcd-peer.key"));
        assert!(!names.is_mapped_key("etcd/peer.key"));
    }

    #[test]
    fn test_unmapped_names_pass_through() {
        let names = NameMap::control_plane();
        assert_eq!(names.to_storage_key("kubelet.conf"), "kubelet.conf");
        assert_eq!(names.to_local_name("kubelet.conf"), "kubelet.conf");
        assert!(!names.is_mapped_local("kubelet.conf"));
    }

    #[test]
    fn test_colliding_storage_keys_rejected() {
        let result = NameMap::new([("etcd/ca.crt", "etcd-ca.crt"), ("etcd-ca.crt", "etcd-ca.crt")]);
        assert_matches!(result, Err(CertError::Invalid { .. }));
    }

    #[test]
    fn test_duplicate_local_name_rejected() {
        let result = NameMap::new([("ca.crt", "ca.crt"), ("ca.crt", "root-ca.crt")]);
        assert_matches!(result, Err(CertError::Invalid { .. }));
    }

    #[test]
    fn test_storage_key_with_separator_rejected() {
        let result = NameMap::new([("etcd/ca.crt", "etcd/ca.crt")]);
        assert_matches!(result, Err(CertError::Invalid { .. }));
    }
}
