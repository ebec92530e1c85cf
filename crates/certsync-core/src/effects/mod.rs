//! Core effect trait definitions
//!
//! Pure trait definitions for every side effect the protocols perform.
//! This module defines **what** effects can be performed; handlers in
//! `certsync-effects` (and fakes in `certsync-testkit`) define **how**.

pub mod filesystem;
pub mod pki;
pub mod store;
pub mod task;
pub mod time;

pub use filesystem::LocalFsEffects;
pub use pki::{PkiError, PkiGeneratorEffects};
pub use store::{RecordStoreEffects, StoreError};
pub use task::{CancellationToken, NeverCancel};
pub use time::TimeEffects;
