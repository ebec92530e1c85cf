//! Local filesystem effects
//!
//! Handlers return plain `std::io::Error`; the protocol attaches the
//! operation and path when it surfaces them.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Local filesystem primitives used against the certificate directory
#[async_trait]
pub trait LocalFsEffects: Send + Sync {
    /// Read a whole file
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write a whole file, replacing existing content
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all missing parents
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Whether a path exists; errors other than "not found" are reported
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Names of the non-directory entries directly inside `dir`, sorted.
    ///
    /// Symlinks are followed: links to files are listed, links to
    /// directories are not. Subdirectories are not listed or descended into.
    /// Dangling links and names that are not valid UTF-8 are errors.
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<String>>;
}
