//! PKI asset generator effects
//!
//! Key and certificate construction happens outside this workspace. The
//! generator writes the full hierarchy, and the kubeconfigs derived from it,
//! into `InitConfiguration::certificates_dir`.

use crate::init::InitConfiguration;
use async_trait::async_trait;

/// Error reported by a PKI generator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct PkiError {
    /// Generator-specific description
    pub reason: String,
}

impl PkiError {
    /// Create a generator error
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External certificate hierarchy generator
#[async_trait]
pub trait PkiGeneratorEffects: Send + Sync {
    /// Generate CA, serving, client and service-account keys and certificates
    async fn create_pki_assets(&self, config: &InitConfiguration) -> Result<(), PkiError>;

    /// Generate the control-plane kubeconfig files from the existing CA
    async fn create_kubeconfig_files(&self, config: &InitConfiguration) -> Result<(), PkiError>;
}
