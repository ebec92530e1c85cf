//! Fake PKI generator
//!
//! Writes a placeholder hierarchy whose content embeds the generator's label,
//! so tests can tell which participant's bundle won a creation race.

use async_trait::async_trait;
use certsync_core::effects::{PkiError, PkiGeneratorEffects};
use certsync_core::{InitConfiguration, NameMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// File name of the derived configuration written next to the PKI
pub const GENERATED_CONFIG_FILE: &str = "kubeadm-config.json";

/// Stage at which a [`FakePkiGenerator`] fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailStage {
    /// `create_pki_assets` fails
    PkiAssets,
    /// `create_kubeconfig_files` fails
    KubeConfigs,
}

/// PKI generator writing labelled placeholder files
#[derive(Debug)]
pub struct FakePkiGenerator {
    label: String,
    names: NameMap,
    fail_stage: Option<FailStage>,
    pki_calls: AtomicUsize,
    kubeconfig_calls: AtomicUsize,
}

impl FakePkiGenerator {
    /// Generator whose files are tagged with `label`
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            names: NameMap::control_plane(),
            fail_stage: None,
            pki_calls: AtomicUsize::new(0),
            kubeconfig_calls: AtomicUsize::new(0),
        }
    }

    /// Generator that fails at `stage`
    pub fn failing(label: impl Into<String>, stage: FailStage) -> Self {
        Self {
            fail_stage: Some(stage),
            ..Self::new(label)
        }
    }

    /// Number of `create_pki_assets` calls
    pub fn pki_invocations(&self) -> usize {
        self.pki_calls.load(Ordering::SeqCst)
    }

    /// Number of `create_kubeconfig_files` calls
    pub fn kubeconfig_invocations(&self) -> usize {
        self.kubeconfig_calls.load(Ordering::SeqCst)
    }

    /// Content this generator writes for `local_name`
    pub fn content_for(&self, local_name: &str) -> Vec<u8> {
        format!("{} {}\n", self.label, local_name).into_bytes()
    }

    async fn write(&self, dir: &Path, local_name: &str, content: &[u8]) -> Result<(), PkiError> {
        let path = dir.join(local_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PkiError::new(format!("create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| PkiError::new(format!("write {}: {e}", path.display())))
    }
}

#[async_trait]
impl PkiGeneratorEffects for FakePkiGenerator {
    async fn create_pki_assets(&self, config: &InitConfiguration) -> Result<(), PkiError> {
        self.pki_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stage == Some(FailStage::PkiAssets) {
            return Err(PkiError::new("signing backend unavailable"));
        }

        for (local_name, _) in self.names.entries() {
            if local_name.ends_with(".conf") {
                continue;
            }
            self.write(&config.certificates_dir, local_name, &self.content_for(local_name))
                .await?;
        }

        let descriptor = serde_json::to_vec_pretty(config)
            .map_err(|e| PkiError::new(format!("encode config: {e}")))?;
        self.write(&config.certificates_dir, GENERATED_CONFIG_FILE, &descriptor)
            .await
    }

    async fn create_kubeconfig_files(&self, config: &InitConfiguration) -> Result<(), PkiError> {
        self.kubeconfig_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stage == Some(FailStage::KubeConfigs) {
            return Err(PkiError::new("ca.key unreadable"));
        }

        for (local_name, _) in self.names.entries() {
            if !local_name.ends_with(".conf") {
                continue;
            }
            self.write(&config.certificates_dir, local_name, &self.content_for(local_name))
                .await?;
        }
        Ok(())
    }
}
