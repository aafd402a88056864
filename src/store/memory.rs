use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Process-local store with fault injection.
///
/// Clones share the same map, so two coordinators built over clones of one
/// `MemoryStore` behave like two tabs over the same browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the store behave as if storage were disabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.set_fail_reads(unavailable);
        self.set_fail_writes(unavailable);
    }

    /// Seed a value directly, bypassing fault injection.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut values) = self.inner.values.lock() {
            values.insert(key.into(), value.into());
        }
    }

    /// Inspect a value directly, bypassing fault injection.
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner
            .values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable {
            message: "memory store lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "storage is disabled".to_string(),
            });
        }
        let values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "storage is disabled".to_string(),
            });
        }
        let mut values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_values() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").await.unwrap();
        assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(b.len(), 1);
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::new();
        store.insert("k", "v");

        store.set_fail_reads(true);
        assert!(store.get("k").await.is_err());
        store.set_fail_reads(false);
        assert!(store.get("k").await.is_ok());

        store.set_fail_writes(true);
        assert!(store.set("k", "w").await.is_err());
        assert_eq!(store.value("k").as_deref(), Some("v"));
    }
}
