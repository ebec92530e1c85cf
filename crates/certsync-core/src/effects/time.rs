//! Time effects for cooperative waits

use async_trait::async_trait;
use std::time::Duration;

/// Wall-clock sleeping
#[async_trait]
pub trait TimeEffects: Send + Sync {
    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}
