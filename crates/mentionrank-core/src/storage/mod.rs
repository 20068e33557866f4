//! # Persistence Gateways
//!
//! The engine reads its store once at startup and writes it once at
//! shutdown. Where those bytes live is behind [`PersistenceGateway`], an
//! opaque key-value byte store addressed by `(namespace, key)`.
//!
//! Provided implementations:
//! - [`MemoryGateway`]: volatile, for tests and embedding
//! - [`RedbGateway`]: disk-backed, ACID, using redb
//!
//! Hosts add their own (the `mentionrank` binary ships a file gateway).

mod redb_store;

pub use redb_store::RedbGateway;

use crate::RankError;
use crate::primitives::{DEFAULT_KEY, DEFAULT_NAMESPACE};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Opaque key-value byte store.
///
/// `read` returns `Ok(None)` when nothing was ever written under the key.
/// That is the "no data" condition, distinct from a failed read.
pub trait PersistenceGateway: Send + Sync {
    /// Read the blob stored under `(namespace, key)`.
    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, RankError>;

    /// Store `bytes` under `(namespace, key)`, replacing any previous blob.
    fn write(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), RankError>;
}

/// Address of the engine's blob inside a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    pub namespace: String,
    pub key: String,
}

impl StorageSlot {
    /// Create a slot.
    #[must_use]
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl Default for StorageSlot {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_KEY)
    }
}

// =============================================================================
// MEMORY GATEWAY
// =============================================================================

/// Volatile gateway backed by a map.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    blobs: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, RankError> {
        Ok(self
            .blobs
            .lock()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn write(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<(), RankError> {
        self.blobs
            .lock()
            .insert((namespace.to_string(), key.to_string()), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_gateway_absent_key_is_none() {
        let gateway = MemoryGateway::new();
        assert!(gateway.read("ns", "missing").expect("read").is_none());
        assert!(gateway.is_empty());
    }

    #[test]
    fn memory_gateway_overwrites() {
        let gateway = MemoryGateway::new();
        gateway.write("ns", "k", b"one").expect("write");
        gateway.write("ns", "k", b"two").expect("write");
        gateway.write("other", "k", b"three").expect("write");

        assert_eq!(gateway.read("ns", "k").expect("read"), Some(b"two".to_vec()));
        assert_eq!(gateway.len(), 2);
    }

    #[test]
    fn default_slot() {
        let slot = StorageSlot::default();
        assert_eq!(slot.namespace, "mentionrank");
        assert_eq!(slot.key, "current");
    }
}
