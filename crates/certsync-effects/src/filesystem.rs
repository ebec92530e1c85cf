//! Filesystem handler backed by `tokio::fs`
//!
//! Stateless; delegates every operation to the local filesystem. Paths are
//! used as given, so callers decide what directory they address.

use async_trait::async_trait;
use certsync_core::effects::LocalFsEffects;
use std::io;
use std::path::Path;
use tokio::fs;

/// Production local filesystem handler
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemHandler;

impl FilesystemHandler {
    /// Create a new filesystem handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocalFsEffects for FilesystemHandler {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            // follows symlinks; mounted volumes expose files as links
            let metadata = fs::metadata(entry.path()).await?;
            if metadata.is_dir() {
                continue;
            }
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file name {} is not valid UTF-8", raw.to_string_lossy()),
                )
            })?;
            names.push(name);
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read_exists() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();
        let path = temp_dir.path().join("ca.crt");

        assert!(!handler.exists(&path).await.unwrap());
        handler.write(&path, b"cert").await.unwrap();
        assert!(handler.exists(&path).await.unwrap());
        assert_eq!(handler.read(&path).await.unwrap(), b"cert");

        handler.write(&path, b"replaced").await.unwrap();
        assert_eq!(handler.read(&path).await.unwrap(), b"replaced");
    }

    #[tokio::test]
    async fn test_list_files_skips_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();

        handler.create_dir_all(&temp_dir.path().join("etcd")).await.unwrap();
        handler.write(&temp_dir.path().join("etcd/ca.crt"), b"x").await.unwrap();
        handler.write(&temp_dir.path().join("sa.pub"), b"y").await.unwrap();
        handler.write(&temp_dir.path().join("admin.conf"), b"z").await.unwrap();

        let names = handler.list_files(temp_dir.path()).await.unwrap();
        assert_eq!(names, vec!["admin.conf".to_string(), "sa.pub".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_files_follows_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let mounted = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();

        std::fs::write(mounted.path().join("kubelet.conf"), b"k").unwrap();
        std::fs::create_dir(mounted.path().join("data")).unwrap();
        std::os::unix::fs::symlink(mounted.path().join("kubelet.conf"), temp_dir.path().join("kubelet.conf"))
            .unwrap();
        std::os::unix::fs::symlink(mounted.path().join("data"), temp_dir.path().join("data")).unwrap();

        let names = handler.list_files(temp_dir.path()).await.unwrap();
        assert_eq!(names, vec!["kubelet.conf".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_files_reports_dangling_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), temp_dir.path().join("token.csv")).unwrap();

        let err = handler.list_files(temp_dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_list_files_rejects_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();
        let name = std::ffi::OsStr::from_bytes(b"bad-\xff.crt");
        std::fs::write(temp_dir.path().join(name), b"x").unwrap();

        let err = handler.list_files(temp_dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let handler = FilesystemHandler::new();
        let err = handler.read(&temp_dir.path().join("missing")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
