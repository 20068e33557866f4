//! # Host Persistence Gateways
//!
//! The file gateway, and the helper that opens whichever gateway the
//! configuration selects.
//!
//! File layout: `<root>/<namespace>/<key>.bin`. Writes go to a temporary
//! file first and are renamed into place.

use crate::config::Backend;
use mentionrank_core::{PersistenceGateway, RankError, RedbGateway};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the redb database inside the data directory.
pub const REDB_FILE_NAME: &str = "mentionrank.redb";

/// Gateway storing each blob as a file.
#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    /// Create a gateway rooted at `root`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, namespace: &str, key: &str) -> Result<PathBuf, RankError> {
        validate_component(namespace)?;
        validate_component(key)?;
        Ok(self.root.join(namespace).join(format!("{}.bin", key)))
    }
}

/// Reject path components that could escape the root directory.
fn validate_component(part: &str) -> Result<(), RankError> {
    let valid = !part.is_empty()
        && part != "."
        && part != ".."
        && !part.contains(['/', '\\'])
        && !part.contains('\0');
    if valid {
        Ok(())
    } else {
        Err(RankError::IoError(format!(
            "Invalid storage path component '{}'",
            part
        )))
    }
}

impl PersistenceGateway for FileGateway {
    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, RankError> {
        let path = self.blob_path(namespace, key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RankError::IoError(format!(
                "Read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), RankError> {
        let path = self.blob_path(namespace, key)?;
        let dir = self.root.join(namespace);
        std::fs::create_dir_all(&dir)
            .map_err(|e| RankError::IoError(format!("Create {}: {}", dir.display(), e)))?;

        let tmp = path.with_extension("bin.tmp");
        std::fs::write(&tmp, bytes)
            .map_err(|e| RankError::IoError(format!("Write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| RankError::IoError(format!("Rename {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Open the gateway for `backend` under `data_dir`.
pub fn open_gateway(
    backend: Backend,
    data_dir: &Path,
) -> Result<Arc<dyn PersistenceGateway>, RankError> {
    match backend {
        Backend::File => Ok(Arc::new(FileGateway::new(data_dir))),
        Backend::Redb => {
            std::fs::create_dir_all(data_dir).map_err(|e| {
                RankError::IoError(format!("Create {}: {}", data_dir.display(), e))
            })?;
            Ok(Arc::new(RedbGateway::open(data_dir.join(REDB_FILE_NAME))?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_none() {
        let temp = tempdir().expect("temp dir");
        let gateway = FileGateway::new(temp.path());
        assert!(gateway.read("mentionrank", "current").expect("read").is_none());
    }

    #[test]
    fn write_creates_layout() {
        let temp = tempdir().expect("temp dir");
        let gateway = FileGateway::new(temp.path());

        gateway.write("mentionrank", "current", b"blob").expect("write");

        let path = gateway.root().join("mentionrank").join("current.bin");
        assert_eq!(std::fs::read(path).expect("file"), b"blob");
        assert_eq!(
            gateway.read("mentionrank", "current").expect("read"),
            Some(b"blob".to_vec())
        );
    }

    #[test]
    fn traversal_components_rejected() {
        let temp = tempdir().expect("temp dir");
        let gateway = FileGateway::new(temp.path());

        assert!(gateway.write("..", "current", b"x").is_err());
        assert!(gateway.write("ns", "a/b", b"x").is_err());
        assert!(gateway.read("", "current").is_err());
    }

    #[test]
    fn open_gateway_for_each_backend() {
        let temp = tempdir().expect("temp dir");

        for backend in [Backend::File, Backend::Redb] {
            let dir = temp.path().join(backend.name());
            let gateway = open_gateway(backend, &dir).expect("open");
            gateway.write("ns", "k", b"v").expect("write");
            assert_eq!(gateway.read("ns", "k").expect("read"), Some(b"v".to_vec()));
        }
        assert!(temp.path().join("redb").join(REDB_FILE_NAME).exists());
    }
}
