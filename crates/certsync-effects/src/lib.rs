//! # certsync effects - handler implementations
//!
//! Stateless production handlers for the effect traits defined in
//! `certsync-core`, plus an in-memory record store with the same atomicity
//! and versioning guarantees as a networked one.

#![forbid(unsafe_code)]

pub mod cancellation;
pub mod filesystem;
pub mod store;
pub mod time;

pub use cancellation::{CancellationSource, WatchCancellation};
pub use filesystem::FilesystemHandler;
pub use store::MemoryRecordStore;
pub use time::RealTimeHandler;
