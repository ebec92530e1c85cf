//! Watch-channel cancellation
//!
//! A [`CancellationSource`] owns the signal; any number of
//! [`WatchCancellation`] tokens observe it. Dropping the source without
//! cancelling leaves the tokens pending forever.

use async_trait::async_trait;
use certsync_core::effects::CancellationToken;
use std::sync::Arc;
use tokio::sync::watch;

/// Owner side of a cancellation signal
#[derive(Debug)]
pub struct CancellationSource {
    shutdown_tx: watch::Sender<bool>,
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSource {
    /// Create an un-cancelled source
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// Request cancellation; wakes every token
    pub fn cancel(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// A token observing this source
    pub fn token(&self) -> Arc<dyn CancellationToken> {
        Arc::new(WatchCancellation {
            shutdown_rx: self.shutdown_tx.subscribe(),
        })
    }
}

/// Token half of a [`CancellationSource`]
#[derive(Debug, Clone)]
pub struct WatchCancellation {
    shutdown_rx: watch::Receiver<bool>,
}

#[async_trait]
impl CancellationToken for WatchCancellation {
    async fn cancelled(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow() {
                return;
            }
            if shutdown_rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_tokens() {
        let source = CancellationSource::new();
        let token = source.token();
        assert!(!token.is_cancelled());

        let waiter = {
            let token = Arc::clone(&token);
            tokio::spawn(async move { token.cancelled().await })
        };
        source.cancel();

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_token_created_after_cancel() {
        let source = CancellationSource::new();
        source.cancel();
        let token = source.token();
        assert!(token.is_cancelled());
        token.cancelled().await;
    }
}
