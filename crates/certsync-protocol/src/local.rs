//! Moving bundles between the certificate directory and shared records
//!
//! Reading builds a candidate bundle (canonical files first, then top-level
//! extras). Writing materializes an authoritative record file by file. The
//! write loop is not atomic across files: a failure part way leaves the
//! directory partially updated, and the error says which file failed.

use certsync_core::effects::LocalFsEffects;
use certsync_core::{CertError, CertificateBundle, NameMap, Result, SharedRecord};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Read every canonical file and every top-level extra file.
///
/// A missing or unreadable canonical file fails the whole read; partial
/// bundles are never returned.
pub async fn read_candidate_bundle(
    fs: &dyn LocalFsEffects,
    names: &NameMap,
    cert_dir: &Path,
) -> Result<CertificateBundle> {
    let mut bundle = CertificateBundle::new();

    for (local_name, _) in names.entries() {
        let path = cert_dir.join(local_name);
        let content = fs
            .read(&path)
            .await
            .map_err(|e| CertError::io("read", &path, e))?;
        bundle.insert_canonical(local_name, content);
    }

    let listed = fs
        .list_files(cert_dir)
        .await
        .map_err(|e| CertError::io("list", cert_dir, e))?;
    for name in listed {
        if names.is_mapped_local(&name) {
            continue;
        }
        if names.is_mapped_key(&name) {
            // would overwrite a canonical entry in the record
            warn!(file = %name, "Skipping extra file named like a canonical storage key");
            continue;
        }
        let path = cert_dir.join(&name);
        let content = fs
            .read(&path)
            .await
            .map_err(|e| CertError::io("read extra file", &path, e))?;
        bundle.insert_extra(name, content);
    }

    debug!(
        dir = %cert_dir.display(),
        canonical = bundle.canonical().len(),
        extras = bundle.extras().len(),
        "Read candidate bundle"
    );
    Ok(bundle)
}

/// Write every entry of `record` below `cert_dir`, overwriting existing files.
///
/// Canonical keys with empty content fail with [`CertError::EmptyContent`].
/// Returns the number of files written.
pub async fn materialize_record(
    fs: &dyn LocalFsEffects,
    names: &NameMap,
    record: &SharedRecord,
    cert_dir: &Path,
) -> Result<usize> {
    let Some(data) = &record.data else {
        warn!(record = %record.id, "Record has no data, nothing to materialize");
        return Ok(0);
    };

    let mut written = 0;
    for (key, content) in data {
        if names.is_mapped_key(key) && content.is_empty() {
            return Err(CertError::EmptyContent { key: key.clone() });
        }

        let path = local_path(cert_dir, names.to_local_name(key))?;
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .await
                .map_err(|e| CertError::io("create directory", parent, e))?;
        }
        fs.write(&path, content)
            .await
            .map_err(|e| CertError::io("write", &path, e))?;
        written += 1;
    }

    debug!(record = %record.id, files = written, dir = %cert_dir.display(), "Materialized record");
    Ok(written)
}

/// Resolve a record-provided name below `cert_dir`, refusing names that
/// would escape it.
fn local_path(cert_dir: &Path, local_name: &str) -> Result<PathBuf> {
    let relative = Path::new(local_name);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if local_name.is_empty() || !contained {
        return Err(CertError::invalid(format!(
            "record entry {local_name} does not name a file inside the certificate directory"
        )));
    }
    Ok(cert_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_local_path_stays_inside_dir() {
        let dir = Path::new("/pki");
        assert_eq!(local_path(dir, "etcd/ca.crt").unwrap(), PathBuf::from("/pki/etcd/ca.crt"));
        assert_matches!(local_path(dir, "../etc/passwd"), Err(CertError::Invalid { .. }));
        assert_matches!(local_path(dir, "/etc/passwd"), Err(CertError::Invalid { .. }));
        assert_matches!(local_path(dir, ""), Err(CertError::Invalid { .. }));
    }
}
