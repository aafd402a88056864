//! Persistence observability.
//!
//! Durable-store failures never reach the user, but they must not vanish
//! either. The store adapter and the journal report every outcome as a
//! [`PersistEvent`] to the registered [`PersistenceObserver`]s.
//! [`PersistenceMetrics`] is the stock observer that keeps counters an
//! operator can poll.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single persistence outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistEvent {
    /// The backend could not be read.
    ReadFailed {
        /// Storage key that was read.
        key: String,
        /// Backend error message.
        reason: String,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// A stored value was present but could not be decoded.
    DecodeFailed {
        /// Storage key whose value was rejected.
        key: String,
        /// Decoder error message.
        reason: String,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// A value was durably written.
    WriteSucceeded {
        /// Storage key that was written.
        key: String,
        /// Size of the stored value.
        bytes: usize,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// A write had no durable effect.
    WriteFailed {
        /// Storage key that was written.
        key: String,
        /// Why the write was lost.
        reason: String,
        /// When it happened.
        at: DateTime<Utc>,
    },
}

impl PersistEvent {
    pub(crate) fn read_failed(key: &str, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            key: key.to_string(),
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    pub(crate) fn decode_failed(key: &str, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            key: key.to_string(),
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    pub(crate) fn write_succeeded(key: &str, bytes: usize) -> Self {
        Self::WriteSucceeded {
            key: key.to_string(),
            bytes,
            at: Utc::now(),
        }
    }

    pub(crate) fn write_failed(key: &str, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            key: key.to_string(),
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    /// Storage key the event refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::ReadFailed { key, .. }
            | Self::DecodeFailed { key, .. }
            | Self::WriteSucceeded { key, .. }
            | Self::WriteFailed { key, .. } => key,
        }
    }

    /// Whether this event records a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::WriteSucceeded { .. })
    }
}

/// Receives persistence outcomes. Implementations must not block.
pub trait PersistenceObserver: Send + Sync {
    /// Called once per outcome, in the order outcomes occur.
    fn on_event(&self, event: &PersistEvent);
}

/// Point-in-time copy of [`PersistenceMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Successful writes.
    pub writes: u64,
    /// Writes that had no durable effect.
    pub write_failures: u64,
    /// Reads the backend rejected.
    pub read_failures: u64,
    /// Stored values that could not be decoded.
    pub decode_failures: u64,
    /// Total bytes durably written.
    pub bytes_written: u64,
    /// Most recent failure event, if any.
    pub last_failure: Option<PersistEvent>,
}

impl MetricsSnapshot {
    /// Total failures of any kind.
    pub fn failures(&self) -> u64 {
        self.write_failures + self.read_failures + self.decode_failures
    }
}

/// Counting observer.
#[derive(Debug, Default)]
pub struct PersistenceMetrics {
    writes: AtomicU64,
    write_failures: AtomicU64,
    read_failures: AtomicU64,
    decode_failures: AtomicU64,
    bytes_written: AtomicU64,
    last_failure: Mutex<Option<PersistEvent>>,
}

impl PersistenceMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            last_failure: self
                .last_failure
                .lock()
                .map(|guard| guard.clone())
                .unwrap_or_default(),
        }
    }

    fn remember_failure(&self, event: &PersistEvent) {
        if let Ok(mut guard) = self.last_failure.lock() {
            *guard = Some(event.clone());
        }
    }
}

impl PersistenceObserver for PersistenceMetrics {
    fn on_event(&self, event: &PersistEvent) {
        match event {
            PersistEvent::WriteSucceeded { bytes, .. } => {
                self.writes.fetch_add(1, Ordering::Relaxed);
                self.bytes_written
                    .fetch_add(*bytes as u64, Ordering::Relaxed);
            }
            PersistEvent::WriteFailed { .. } => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                self.remember_failure(event);
            }
            PersistEvent::ReadFailed { .. } => {
                self.read_failures.fetch_add(1, Ordering::Relaxed);
                self.remember_failure(event);
            }
            PersistEvent::DecodeFailed { .. } => {
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
                self.remember_failure(event);
            }
        }
    }
}
