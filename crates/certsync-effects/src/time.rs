//! Real time effect handler for production use

use async_trait::async_trait;
use certsync_core::effects::TimeEffects;
use std::time::Duration;

/// Real time handler backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeEffects for RealTimeHandler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
