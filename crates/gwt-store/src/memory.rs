//! In-memory implementation of the SignatureStore trait.
//!
//! Used by tests and by embedders that do not need durability. All data is
//! lost when the store is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::Result;
use crate::traits::{SignatureRecord, SignatureStore};

/// In-memory signature store. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, SignatureRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities with a live signature.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SignatureStore for MemoryStore {
    async fn put_signature(
        &self,
        identity: &str,
        record: SignatureRecord,
    ) -> Result<Option<SignatureRecord>> {
        trace!(identity, "storing signature");
        Ok(self.inner.write().await.insert(identity.to_owned(), record))
    }

    async fn get_signature(&self, identity: &str) -> Result<Option<SignatureRecord>> {
        Ok(self.inner.read().await.get(identity).copied())
    }

    async fn clear_signature(&self, identity: &str) -> Result<bool> {
        trace!(identity, "clearing signature");
        Ok(self.inner.write().await.remove(identity).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwt_token::{Signature, SIGNATURE_LEN};

    fn record(fill: u8) -> SignatureRecord {
        SignatureRecord {
            signature: Signature::from_bytes([fill; SIGNATURE_LEN]),
            issued_at: 1_000,
            expires: 2_000,
        }
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        assert_eq!(store.put_signature("alice", record(1)).await.unwrap(), None);
        assert_eq!(
            store.put_signature("alice", record(2)).await.unwrap(),
            Some(record(1))
        );
        assert_eq!(
            store.get_signature("alice").await.unwrap(),
            Some(record(2))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::new();
        store.put_signature("bob", record(3)).await.unwrap();
        assert!(store.clear_signature("bob").await.unwrap());
        assert!(!store.clear_signature("bob").await.unwrap());
        assert_eq!(store.get_signature("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let store = MemoryStore::new();
        store.put_signature("a", record(1)).await.unwrap();
        store.put_signature("b", record(2)).await.unwrap();
        store.clear_signature("a").await.unwrap();
        assert_eq!(store.get_signature("b").await.unwrap(), Some(record(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..16u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put_signature(&format!("user-{i}"), record(i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 16);
    }

    #[test]
    fn test_record_serde() {
        let json = serde_json::to_string(&record(0xab)).unwrap();
        assert!(json.contains(&"ab".repeat(SIGNATURE_LEN)));
        let back: SignatureRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record(0xab));
    }
}
