//! # certsync core
//!
//! Types, configuration and effect traits for bootstrapping a control-plane
//! certificate bundle once and converging every replica on it.
//!
//! ## Core Concepts
//!
//! - **Shared record**: versioned `key -> bytes` document, one per cluster,
//!   named `<cluster>-certs`
//! - **Name map**: injective table between local file names and record keys;
//!   anything outside it passes through under its own name
//! - **Certificate bundle**: files read from the local certificate directory
//! - **Secondary set**: files a second writer merges in after bootstrap
//!
//! ## What's NOT in this crate
//!
//! - Effect handlers (belong in `certsync-effects`)
//! - Protocol logic (belongs in `certsync-protocol`)

#![forbid(unsafe_code)]

/// Certificate bundles read from local storage
pub mod bundle;
/// Bootstrap configuration
pub mod config;
/// Effect trait definitions
pub mod effects;
/// Unified error type
pub mod errors;
/// PKI generator configuration descriptor
pub mod init;
/// Local file name <-> storage key mapping
pub mod names;
/// Shared record identity and shape
pub mod record;
/// Secondary writer file set
pub mod secondary;

pub use bundle::CertificateBundle;
pub use config::BootstrapConfig;
pub use errors::{CertError, Result};
pub use init::{etcd_replica_sans, InitConfiguration, MAX_ETCD_REPLICAS, MAX_ETCD_SANS};
pub use names::{NameMap, PRIMARY_SIGNING_KEY};
pub use record::{RecordId, RecordVersion, SharedRecord};
pub use secondary::SecondarySet;
