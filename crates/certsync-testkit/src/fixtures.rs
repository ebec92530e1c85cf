//! Common fixtures

use certsync_core::BootstrapConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// Namespace used by fixtures
pub const TEST_NAMESPACE: &str = "ns1";

/// Cluster name used by fixtures
pub const TEST_CLUSTER: &str = "vc1";

/// Bootstrap configuration for the fixture cluster rooted at `cert_dir`
pub fn test_config(cert_dir: &Path) -> BootstrapConfig {
    let mut config = BootstrapConfig::new(TEST_NAMESPACE, TEST_CLUSTER, cert_dir);
    config.service_cidr = "10.96.0.0/12".to_string();
    config.cluster_domain = "cluster.local".to_string();
    config
}

/// Every regular file below `dir`, keyed by `/`-separated relative path
pub fn read_tree(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current).unwrap();
        for entry in entries {
            let entry = entry.unwrap();
            let path = entry.path();
            if entry.file_type().unwrap().is_dir() {
                stack.push(path);
                continue;
            }
            let relative = path.strip_prefix(dir).unwrap();
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(key, std::fs::read(&path).unwrap());
        }
    }
    files
}

/// Write `content` to `dir/name`, creating parents
pub fn write_file(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Install a test-friendly tracing subscriber once; honours `RUST_LOG`
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_tree_uses_relative_paths() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "etcd/ca.crt", b"a");
        write_file(dir.path(), "ca.crt", b"b");

        let tree = read_tree(dir.path());
        assert_eq!(tree.get("etcd/ca.crt"), Some(&b"a".to_vec()));
        assert_eq!(tree.get("ca.crt"), Some(&b"b".to_vec()));
        assert_eq!(tree.len(), 2);
    }
}
