//! Bootstrap configuration
//!
//! Loaded from TOML by the wiring layer, or built in code.

use crate::errors::{CertError, Result};
use crate::init::{etcd_replica_sans, MAX_ETCD_SANS};
use crate::record::RecordId;
use crate::secondary::SecondarySet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default service network
pub const DEFAULT_SERVICE_CIDR: &str = "10.96.0.0/12";

/// Default cluster DNS domain
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

/// Default interval between local file existence checks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Everything a participant needs to bootstrap and reconcile certificates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Namespace the shared record lives in
    pub namespace: String,
    /// Logical cluster name; the record is `<cluster_name>-certs`
    pub cluster_name: String,
    /// Local certificate directory
    pub cert_dir: PathBuf,
    /// Service network CIDR
    #[serde(default = "default_service_cidr")]
    pub service_cidr: String,
    /// Cluster DNS domain
    #[serde(default = "default_cluster_domain")]
    pub cluster_domain: String,
    /// Extra SANs for the replicated etcd component
    #[serde(default)]
    pub etcd_sans: Vec<String>,
    /// Files contributed later by an independent writer
    #[serde(default)]
    pub secondary_files: Vec<String>,
    /// File wait polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_service_cidr() -> String {
    DEFAULT_SERVICE_CIDR.to_string()
}

fn default_cluster_domain() -> String {
    DEFAULT_CLUSTER_DOMAIN.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl BootstrapConfig {
    /// Configuration with defaults for everything but identity and location
    pub fn new(
        namespace: impl Into<String>,
        cluster_name: impl Into<String>,
        cert_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            cluster_name: cluster_name.into(),
            cert_dir: cert_dir.into(),
            service_cidr: default_service_cidr(),
            cluster_domain: default_cluster_domain(),
            etcd_sans: Vec::new(),
            secondary_files: Vec::new(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    /// Issue etcd certificates for every replica the cluster may scale to
    pub fn with_etcd_replica_sans(mut self) -> Self {
        self.etcd_sans = etcd_replica_sans(&self.cluster_name, &self.namespace);
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| CertError::invalid(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check identity, addressing and bounds
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CertError::invalid("namespace cannot be empty"));
        }
        if self.cluster_name.is_empty() {
            return Err(CertError::invalid("cluster_name cannot be empty"));
        }
        if self.cert_dir.as_os_str().is_empty() {
            return Err(CertError::invalid("cert_dir cannot be empty"));
        }
        if self.cluster_domain.is_empty() {
            return Err(CertError::invalid("cluster_domain cannot be empty"));
        }
        validate_cidr(&self.service_cidr)?;
        if self.etcd_sans.len() > MAX_ETCD_SANS {
            return Err(CertError::invalid(format!(
                "{} etcd SANs exceed the limit of {MAX_ETCD_SANS}",
                self.etcd_sans.len()
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(CertError::invalid("poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Identity of this cluster's shared record
    pub fn record_id(&self) -> RecordId {
        RecordId::for_cluster(self.namespace.clone(), &self.cluster_name)
    }

    /// File wait polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The configured secondary file set; fails if none is configured
    pub fn secondary_set(&self) -> Result<SecondarySet> {
        SecondarySet::new(self.secondary_files.iter().cloned())
    }
}

fn validate_cidr(cidr: &str) -> Result<()> {
    let invalid = || CertError::invalid(format!("service_cidr {cidr} is not a CIDR"));

    let (addr, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(invalid());
    }
    Ok(())
}
