//! Caller-side loop for the secondary writer: wait for its files, then merge
//! them until the record converges.

use crate::secondary::{MergeOutcome, SecondaryWriterReconciler};
use crate::waiter::{pause, FileSyncWaiter};
use certsync_core::effects::{CancellationToken, LocalFsEffects, RecordStoreEffects, TimeEffects};
use certsync_core::{BootstrapConfig, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Default pause between merge attempts after a conflict
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Drives [`FileSyncWaiter`] and [`SecondaryWriterReconciler`] to completion
#[derive(Clone)]
pub struct SecondarySync {
    waiter: FileSyncWaiter,
    reconciler: SecondaryWriterReconciler,
    time: Arc<dyn TimeEffects>,
    cert_dir: PathBuf,
    retry_interval: Duration,
    max_attempts: Option<u32>,
}

impl SecondarySync {
    /// Create a driver reading the secondary files from `cert_dir`
    pub fn new(
        waiter: FileSyncWaiter,
        reconciler: SecondaryWriterReconciler,
        time: Arc<dyn TimeEffects>,
        cert_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            waiter,
            reconciler,
            time,
            cert_dir: cert_dir.into(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: None,
        }
    }

    /// Wire a driver for the secondary files named in `config`
    pub fn from_config(
        config: &BootstrapConfig,
        store: Arc<dyn RecordStoreEffects>,
        fs: Arc<dyn LocalFsEffects>,
        time: Arc<dyn TimeEffects>,
    ) -> Result<Self> {
        config.validate()?;
        let set = config.secondary_set()?;
        let waiter = FileSyncWaiter::new(fs, time.clone()).with_poll_interval(config.poll_interval());
        let reconciler = SecondaryWriterReconciler::new(store, config.record_id(), set);
        Ok(Self::new(waiter, reconciler, time, config.cert_dir.clone()))
    }

    /// Override the pause between merge attempts
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Give up after `max_attempts` merge attempts instead of retrying until
    /// cancelled
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Wait for the secondary files and merge them.
    ///
    /// Retryable conflicts are retried after `retry_interval`; any other
    /// error, cancellation, or running out of attempts ends the loop.
    pub async fn run(&self, cancel: &dyn CancellationToken) -> Result<MergeOutcome> {
        let files = self
            .waiter
            .wait_for_files(&self.cert_dir, self.reconciler.set(), cancel)
            .await?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.reconciler.merge_secondary_files(&files).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && self.max_attempts.map_or(true, |max| attempt < max) => {
                    warn!(attempt, error = %e, "Secondary merge did not apply, retrying");
                    pause(self.time.as_ref(), cancel, self.retry_interval).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl fmt::Debug for SecondarySync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondarySync")
            .field("waiter", &self.waiter)
            .field("reconciler", &self.reconciler)
            .field("cert_dir", &self.cert_dir)
            .field("retry_interval", &self.retry_interval)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
