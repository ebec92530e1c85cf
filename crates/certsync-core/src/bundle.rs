//! Certificate bundle built from a local certificate directory

use crate::names::NameMap;
use std::collections::BTreeMap;

/// Local certificate files keyed by their name relative to the certificate
/// directory.
///
/// Canonical files (covered by a [`NameMap`]) and extra files (anything else
/// found at the top level) are kept apart so that the extras can be carried
/// through the shared record unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateBundle {
    canonical: BTreeMap<String, Vec<u8>>,
    extras: BTreeMap<String, Vec<u8>>,
}

impl CertificateBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical file
    pub fn insert_canonical(&mut self, local_name: impl Into<String>, content: Vec<u8>) {
        self.canonical.insert(local_name.into(), content);
    }

    /// Add an extra file, stored under its own name
    pub fn insert_extra(&mut self, local_name: impl Into<String>, content: Vec<u8>) {
        self.extras.insert(local_name.into(), content);
    }

    /// Canonical files by local name
    pub fn canonical(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.canonical
    }

    /// Extra files by local name
    pub fn extras(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.extras
    }

    /// Total number of files
    pub fn len(&self) -> usize {
        self.canonical.len() + self.extras.len()
    }

    /// Whether the bundle holds no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into shared record data, renaming canonical files to their
    /// storage keys.
    pub fn to_record_data(&self, names: &NameMap) -> BTreeMap<String, Vec<u8>> {
        let mut data = BTreeMap::new();
        for (name, content) in &self.extras {
            data.insert(name.clone(), content.clone());
        }
        for (name, content) in &self.canonical {
            data.insert(names.to_storage_key(name).to_string(), content.clone());
        }
        data
    }

    /// Digest of the record data this bundle produces
    pub fn digest(&self, names: &NameMap) -> String {
        let data = self.to_record_data(names);
        digest_entries(data.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }
}

/// Hex BLAKE3 digest over `(key, value)` pairs.
///
/// Callers pass entries in key order. Each key and value is length-prefixed.
pub(crate) fn digest_entries<'a>(entries: impl Iterator<Item = (&'a str, &'a [u8])>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (key, value) in entries {
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        hasher.update(&(value.len() as u64).to_le_bytes());
        hasher.update(value);
    }
    hasher.finalize().to_hex().to_string()
}
