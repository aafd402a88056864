//! Persistent store adapter.
//!
//! Backends implement [`KeyValueStore`] and may fail however they like.
//! [`StoreAdapter`] is the boundary the rest of the crate talks to: it never
//! returns an error, converting every backend failure into an explicit
//! [`ReadOutcome`] or [`PersistOutcome`] that is logged and reported to the
//! registered observers. Failed writes are not retried.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, StoreConfig, DEFAULT_MAX_VALUE_BYTES};
use crate::error::{StorageError, StorageResult};
use crate::observe::{PersistEvent, PersistenceObserver};

/// Durable key/value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value under `key`, `None` if absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}

/// Result of reading a key through the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A value is stored under the key.
    Found(String),
    /// Nothing is stored under the key.
    Absent,
    /// The backend could not be read.
    Failed {
        /// Backend error message.
        reason: String,
    },
}

impl ReadOutcome {
    /// The stored value, if any.
    pub fn into_value(self) -> Option<String> {
        match self {
            ReadOutcome::Found(value) => Some(value),
            ReadOutcome::Absent | ReadOutcome::Failed { .. } => None,
        }
    }
}

/// Result of a best-effort durable write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    /// The value was durably stored.
    Persisted {
        /// Size of the stored value.
        bytes: usize,
    },
    /// No write was needed.
    Skipped,
    /// The write had no durable effect.
    Failed {
        /// Why the write was lost.
        reason: String,
    },
}

impl PersistOutcome {
    /// True when the value reached the backend.
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistOutcome::Persisted { .. })
    }

    /// True when the write was attempted and lost.
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistOutcome::Failed { .. })
    }
}

/// Failure-absorbing front of a [`KeyValueStore`].
#[derive(Clone)]
pub struct StoreAdapter {
    backend: Arc<dyn KeyValueStore>,
    max_value_bytes: usize,
    observers: Vec<Arc<dyn PersistenceObserver>>,
}

impl std::fmt::Debug for StoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAdapter")
            .field("backend", &self.backend.backend())
            .field("max_value_bytes", &self.max_value_bytes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl StoreAdapter {
    /// Wrap a backend with the default per-value quota.
    pub fn new<S>(backend: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::from_arc(Arc::new(backend))
    }

    /// Open the configured SQLite database.
    ///
    /// If the database cannot be opened the adapter falls back to a
    /// session-only [`MemoryStore`], so startup always completes.
    pub async fn connect(config: &Config) -> Self {
        let adapter = match SqliteStore::new(&config.database).await {
            Ok(store) => {
                info!(path = %config.database.path.display(), "Durable store opened");
                Self::new(store)
            }
            Err(e) => {
                warn!(
                    path = %config.database.path.display(),
                    error = %e,
                    "Durable store unavailable, state will not survive this session"
                );
                Self::new(MemoryStore::new())
            }
        };
        adapter.with_config(&config.store)
    }

    /// Wrap a shared backend.
    pub fn from_arc(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
            observers: Vec::new(),
        }
    }

    /// Apply limits from configuration.
    pub fn with_config(self, config: &StoreConfig) -> Self {
        self.with_max_value_bytes(config.max_value_bytes)
    }

    /// Set the largest value, in bytes, a single write may store.
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = max_value_bytes;
        self
    }

    /// Register an observer for persistence outcomes.
    pub fn with_observer(mut self, observer: Arc<dyn PersistenceObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Backend name.
    pub fn backend(&self) -> &'static str {
        self.backend.backend()
    }

    /// Per-value quota in bytes.
    pub fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }

    /// Read the raw value under `key`.
    pub async fn read(&self, key: &str) -> ReadOutcome {
        match self.backend.get(key).await {
            Ok(Some(value)) => ReadOutcome::Found(value),
            Ok(None) => ReadOutcome::Absent,
            Err(e) => {
                warn!(key = %key, backend = self.backend(), error = %e, "Failed to read from durable store");
                let reason = e.to_string();
                self.report(&PersistEvent::read_failed(key, reason.clone()));
                ReadOutcome::Failed { reason }
            }
        }
    }

    /// Overwrite the value under `key`, best effort.
    pub async fn write(&self, key: &str, value: &str) -> PersistOutcome {
        let bytes = value.len();
        let result = if bytes > self.max_value_bytes {
            Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                size: bytes,
                limit: self.max_value_bytes,
            })
        } else {
            self.backend.set(key, value).await
        };

        match result {
            Ok(()) => {
                debug!(key = %key, bytes, "Persisted value");
                self.report(&PersistEvent::write_succeeded(key, bytes));
                PersistOutcome::Persisted { bytes }
            }
            Err(e) => {
                warn!(key = %key, backend = self.backend(), error = %e, "Failed to write to durable store");
                let reason = e.to_string();
                self.report(&PersistEvent::write_failed(key, reason.clone()));
                PersistOutcome::Failed { reason }
            }
        }
    }

    pub(crate) fn report(&self, event: &PersistEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
