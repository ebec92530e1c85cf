//! certsync testing infrastructure
//!
//! Fakes for the external collaborators (PKI generator, shared store) and
//! fixtures for certificate directories.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! certsync-testkit = { workspace = true }
//! ```

pub mod fixtures;
pub mod pki;
pub mod store;

pub use fixtures::*;
pub use pki::{FailStage, FakePkiGenerator, GENERATED_CONFIG_FILE};
pub use store::ScriptedRecordStore;
