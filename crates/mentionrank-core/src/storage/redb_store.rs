//! # redb-backed Persistence Gateway
//!
//! Stores engine blobs in a redb embedded database, providing:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - Zero configuration
//!
//! All blobs share one table keyed by `(namespace, key)`, so several
//! engines (or several slots of one engine) can live in the same file.

use super::PersistenceGateway;
use crate::RankError;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for blobs: (namespace, key) -> bytes
const BLOBS: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("blobs");

/// A disk-backed gateway using redb.
pub struct RedbGateway {
    db: Database,
}

impl std::fmt::Debug for RedbGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbGateway").finish_non_exhaustive()
    }
}

fn io_err(e: impl std::fmt::Display) -> RankError {
    RankError::IoError(e.to_string())
}

impl RedbGateway {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RankError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize the table so read transactions never hit a missing table
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(BLOBS).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self { db })
    }
}

impl PersistenceGateway for RedbGateway {
    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, RankError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(BLOBS).map_err(io_err)?;

        let value = table
            .get((namespace, key))
            .map_err(io_err)?
            .map(|v| v.value().to_vec());
        Ok(value)
    }

    fn write(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), RankError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(BLOBS).map_err(io_err)?;
            table.insert((namespace, key), bytes).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_key_reads_none() {
        let temp = tempdir().expect("temp dir");
        let gateway = RedbGateway::open(temp.path().join("blobs.redb")).expect("open db");

        assert!(gateway.read("mentionrank", "current").expect("read").is_none());
    }

    #[test]
    fn write_then_read() {
        let temp = tempdir().expect("temp dir");
        let gateway = RedbGateway::open(temp.path().join("blobs.redb")).expect("open db");

        gateway.write("mentionrank", "current", b"blob").expect("write");
        gateway.write("mentionrank", "current", b"newer").expect("overwrite");

        assert_eq!(
            gateway.read("mentionrank", "current").expect("read"),
            Some(b"newer".to_vec())
        );
    }

    #[test]
    fn persists_across_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("blobs.redb");

        {
            let gateway = RedbGateway::open(&path).expect("open db");
            gateway.write("ns", "key", &[1, 2, 3]).expect("write");
        }

        let gateway = RedbGateway::open(&path).expect("reopen db");
        assert_eq!(gateway.read("ns", "key").expect("read"), Some(vec![1, 2, 3]));
    }
}
