//! Create-once, converge-many certificate bootstrap
//!
//! There is no lock. Exactly one participant's candidate becomes the shared
//! record because the store's create is atomic and fails if the record
//! exists; every other participant fetches the winner's record and writes it
//! over whatever it generated locally, so all participants end up with
//! byte-identical certificate directories.

use crate::local::{materialize_record, read_candidate_bundle};
use certsync_core::effects::{LocalFsEffects, PkiGeneratorEffects, RecordStoreEffects};
use certsync_core::{
    BootstrapConfig, CertError, InitConfiguration, NameMap, Result, SharedRecord,
    PRIMARY_SIGNING_KEY,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Which path `ensure_certificates` took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The record already existed and was materialized
    Fetched,
    /// This caller created the record from its local bundle
    Created,
    /// Another caller created the record first; its copy was materialized
    LostRace,
}

impl fmt::Display for BootstrapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetched => f.write_str("fetched"),
            Self::Created => f.write_str("created"),
            Self::LostRace => f.write_str("lost race"),
        }
    }
}

/// Orchestrates local generation, shared record creation and materialization
#[derive(Clone)]
pub struct BootstrapCoordinator {
    store: Arc<dyn RecordStoreEffects>,
    fs: Arc<dyn LocalFsEffects>,
    generator: Arc<dyn PkiGeneratorEffects>,
    names: NameMap,
}

impl BootstrapCoordinator {
    /// Create a coordinator using the control-plane name table
    pub fn new(
        store: Arc<dyn RecordStoreEffects>,
        fs: Arc<dyn LocalFsEffects>,
        generator: Arc<dyn PkiGeneratorEffects>,
    ) -> Self {
        Self {
            store,
            fs,
            generator,
            names: NameMap::control_plane(),
        }
    }

    /// Use a different name table
    pub fn with_names(mut self, names: NameMap) -> Self {
        self.names = names;
        self
    }

    /// The name table in use
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// Make sure the cluster's certificate record exists and that the local
    /// certificate directory holds exactly its content.
    pub async fn ensure_certificates(&self, config: &BootstrapConfig) -> Result<BootstrapOutcome> {
        config.validate()?;
        let id = config.record_id();

        match self.store.get(&id).await {
            Ok(record) => {
                info!(record = %id, digest = %record.digest(), "Found existing certs record");
                self.materialize(&record, config).await?;
                return Ok(BootstrapOutcome::Fetched);
            }
            Err(e) if e.is_not_found() => {
                debug!(record = %id, "No certs record yet, bootstrapping locally");
            }
            Err(e) => return Err(CertError::store(&id, "get certs record", e)),
        }

        self.generate_if_missing(config).await?;

        let bundle = read_candidate_bundle(self.fs.as_ref(), &self.names, &config.cert_dir).await?;
        let candidate = SharedRecord::new(id.clone(), bundle.to_record_data(&self.names));

        let (record, outcome) = match self.store.create(candidate).await {
            Ok(record) => {
                info!(
                    record = %id,
                    entries = record.len(),
                    digest = %record.digest(),
                    "Successfully created certs record"
                );
                (record, BootstrapOutcome::Created)
            }
            Err(e) if e.is_already_exists() => {
                let record = self
                    .store
                    .get(&id)
                    .await
                    .map_err(|e| CertError::store(&id, "retrieve certs record", e))?;
                info!(
                    record = %id,
                    digest = %record.digest(),
                    "Certs record was created concurrently, using it instead of the local bundle"
                );
                (record, BootstrapOutcome::LostRace)
            }
            Err(e) => return Err(CertError::store(&id, "create certs record", e)),
        };

        self.materialize(&record, config).await?;
        Ok(outcome)
    }

    /// Run the PKI generator unless the primary signing key already exists
    async fn generate_if_missing(&self, config: &BootstrapConfig) -> Result<()> {
        let sentinel = config.cert_dir.join(PRIMARY_SIGNING_KEY);
        let present = self
            .fs
            .exists(&sentinel)
            .await
            .map_err(|e| CertError::io("stat", &sentinel, e))?;
        if present {
            info!(path = %sentinel.display(), "Signing key present, skipping PKI generation");
            return Ok(());
        }

        let init = InitConfiguration::from_config(config);
        self.generator
            .create_pki_assets(&init)
            .await
            .map_err(|e| CertError::generator("create pki assets", e.reason))?;
        self.generator
            .create_kubeconfig_files(&init)
            .await
            .map_err(|e| CertError::generator("create kube configs", e.reason))?;

        info!(dir = %config.cert_dir.display(), "Generated PKI assets");
        Ok(())
    }

    async fn materialize(&self, record: &SharedRecord, config: &BootstrapConfig) -> Result<()> {
        materialize_record(self.fs.as_ref(), &self.names, record, &config.cert_dir).await?;
        Ok(())
    }
}

impl fmt::Debug for BootstrapCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapCoordinator")
            .field("names", &self.names.len())
            .finish_non_exhaustive()
    }
}
