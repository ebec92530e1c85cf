//! # certsync protocol
//!
//! Bootstraps a control-plane certificate bundle exactly once per cluster and
//! converges every participant on it.
//!
//! # Architecture
//!
//! - `bootstrap` - create-once record bootstrap with race handling
//! - `local` - certificate directory <-> record conversion
//! - `waiter` - all-or-nothing wait for a local file set
//! - `secondary` - optimistic single-attempt merge of a second file set
//! - `sync` - caller-side retry loop for the secondary writer
//!
//! # Design Principles
//!
//! - No locks: create-if-absent and version-checked update in the shared
//!   store are the only synchronization
//! - No internal tasks; all concurrency is between independent callers
//! - Structured outcomes (`BootstrapOutcome`, `MergeOutcome`) and retryable
//!   errors instead of string inspection

#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod local;
pub mod secondary;
pub mod sync;
pub mod waiter;

pub use bootstrap::{BootstrapCoordinator, BootstrapOutcome};
pub use local::{materialize_record, read_candidate_bundle};
pub use secondary::{decide, MergeOutcome, ReconcileDecision, SecondaryWriterReconciler};
pub use sync::{SecondarySync, DEFAULT_RETRY_INTERVAL};
pub use waiter::{FileSyncWaiter, DEFAULT_POLL_INTERVAL};
