//! Waiting for a file set to appear locally
//!
//! The gate is all-or-nothing: nothing is read until every file exists, and
//! cancellation never yields a partial result.

use certsync_core::effects::{CancellationToken, LocalFsEffects, TimeEffects};
use certsync_core::{CertError, Result, SecondarySet};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default interval between existence checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Cooperative polling until a fixed set of local files all exist
#[derive(Clone)]
pub struct FileSyncWaiter {
    fs: Arc<dyn LocalFsEffects>,
    time: Arc<dyn TimeEffects>,
    poll_interval: Duration,
}

impl FileSyncWaiter {
    /// Create a waiter polling every [`DEFAULT_POLL_INTERVAL`]
    pub fn new(fs: Arc<dyn LocalFsEffects>, time: Arc<dyn TimeEffects>) -> Self {
        Self {
            fs,
            time,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the polling interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Block until every file of `required` exists below `dir`, then read
    /// them all.
    ///
    /// Returns [`CertError::Cancelled`] if `cancel` fires first.
    pub async fn wait_for_files(
        &self,
        dir: &Path,
        required: &SecondarySet,
        cancel: &dyn CancellationToken,
    ) -> Result<BTreeMap<String, Vec<u8>>> {
        while let Some(missing) = self.first_missing(dir, required).await? {
            debug!(file = %missing, dir = %dir.display(), "Waiting for file");
            pause(self.time.as_ref(), cancel, self.poll_interval).await?;
        }

        let mut files = BTreeMap::new();
        for name in required.iter() {
            let path = dir.join(name);
            let content = self
                .fs
                .read(&path)
                .await
                .map_err(|e| CertError::io("read", &path, e))?;
            files.insert(name.to_string(), content);
        }
        Ok(files)
    }

    async fn first_missing<'a>(&self, dir: &Path, required: &'a SecondarySet) -> Result<Option<&'a str>> {
        for name in required.iter() {
            let path = dir.join(name);
            let present = self
                .fs
                .exists(&path)
                .await
                .map_err(|e| CertError::io("stat", &path, e))?;
            if !present {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for FileSyncWaiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSyncWaiter")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

/// Sleep for `interval` unless cancelled; cancellation is checked before
/// sleeping so it is never delayed behind a full tick.
pub(crate) async fn pause(
    time: &dyn TimeEffects,
    cancel: &dyn CancellationToken,
    interval: Duration,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CertError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(CertError::Cancelled),
        _ = time.sleep(interval) => Ok(()),
    }
}
