//! Configuration descriptor handed to the PKI asset generator

use crate::config::BootstrapConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of etcd replicas certificates are issued for.
///
/// Fixed so the replica count can scale up or down without regenerating
/// certificates.
pub const MAX_ETCD_REPLICAS: usize = 20;

/// Upper bound on etcd subject alternative names: three per replica plus the
/// service names and `localhost`
pub const MAX_ETCD_SANS: usize = 3 * MAX_ETCD_REPLICAS + 4;

/// Cluster name written into generated certificates and kubeconfigs
pub const INTERNAL_CLUSTER_NAME: &str = "kubernetes";

/// Control plane endpoint written into generated kubeconfigs
pub const CONTROL_PLANE_ENDPOINT: &str = "127.0.0.1:6443";

/// Inputs the PKI generator needs to produce the certificate hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfiguration {
    /// Cluster name embedded in certificates
    pub cluster_name: String,
    /// Node registration name
    pub node_name: String,
    /// SANs for the etcd serving certificate
    pub etcd_server_sans: Vec<String>,
    /// SANs for the etcd peer certificate
    pub etcd_peer_sans: Vec<String>,
    /// Service network CIDR
    pub service_subnet: String,
    /// Cluster DNS domain
    pub dns_domain: String,
    /// Control plane endpoint for kubeconfigs
    pub control_plane_endpoint: String,
    /// Directory the hierarchy is written to
    pub certificates_dir: PathBuf,
    /// API server advertise address
    pub advertise_address: String,
    /// API server bind port
    pub bind_port: u16,
}

impl InitConfiguration {
    /// Descriptor for a bootstrap configuration
    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self {
            cluster_name: INTERNAL_CLUSTER_NAME.to_string(),
            node_name: config.cluster_name.clone(),
            etcd_server_sans: config.etcd_sans.clone(),
            etcd_peer_sans: config.etcd_sans.clone(),
            service_subnet: config.service_cidr.clone(),
            dns_domain: config.cluster_domain.clone(),
            control_plane_endpoint: CONTROL_PLANE_ENDPOINT.to_string(),
            certificates_dir: config.cert_dir.clone(),
            advertise_address: "0.0.0.0".to_string(),
            bind_port: 443,
        }
    }
}

/// SANs covering [`MAX_ETCD_REPLICAS`] etcd replicas of a cluster
pub fn etcd_replica_sans(cluster_name: &str, namespace: &str) -> Vec<String> {
    let service = format!("{cluster_name}-etcd");
    let headless = format!("{cluster_name}-etcd-headless");

    let mut sans = Vec::with_capacity(MAX_ETCD_SANS);
    sans.push(service.clone());
    sans.push(format!("{service}.{namespace}"));
    sans.push(format!("{service}.{namespace}.svc"));
    sans.push("localhost".to_string());
    for i in 0..MAX_ETCD_REPLICAS {
        let pod = format!("{service}-{i}");
        sans.push(format!("{pod}.{headless}"));
        sans.push(format!("{pod}.{headless}.{namespace}"));
        sans.push(pod);
    }
    sans
}
