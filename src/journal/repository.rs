use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{decode_entries, encode_entries, Guidance, JournalEntry};
use crate::observe::PersistEvent;
use crate::store::{PersistOutcome, ReadOutcome, StoreAdapter};

/// What startup recovered from the stored journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HydrationOutcome {
    /// Nothing was stored.
    Empty,
    /// A journal document was decoded.
    Loaded {
        /// Entries now held in memory.
        entries: usize,
        /// Malformed elements that were skipped.
        dropped: usize,
    },
    /// The stored document was unusable; the journal starts empty.
    Corrupt {
        /// Decoder error message.
        reason: String,
    },
    /// The store could not be read; the journal starts empty.
    ReadFailed {
        /// Backend error message.
        reason: String,
    },
}

impl HydrationOutcome {
    /// True when a failure forced an empty journal.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            HydrationOutcome::Corrupt { .. } | HydrationOutcome::ReadFailed { .. }
        )
    }
}

/// Result of appending to the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedEntry {
    /// The entry now at the head of the journal.
    pub entry: JournalEntry,
    /// Outcome of re-persisting the whole journal.
    pub persist: PersistOutcome,
}

/// Most-recent-first journal backed by one store key.
///
/// The in-memory sequence is authoritative for the session. Every `add`
/// overwrites the stored document with the complete sequence.
#[derive(Debug)]
pub struct JournalRepository {
    key: String,
    store: StoreAdapter,
    entries: Vec<JournalEntry>,
    hydration: Option<HydrationOutcome>,
}

impl JournalRepository {
    /// Create an empty, not yet hydrated repository.
    pub fn new(store: StoreAdapter, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            store,
            entries: Vec::new(),
            hydration: None,
        }
    }

    /// Store key this journal lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the stored journal has been read.
    pub fn is_hydrated(&self) -> bool {
        self.hydration.is_some()
    }

    /// Load the stored journal. Runs once; later calls return the first result.
    pub async fn hydrate(&mut self) -> HydrationOutcome {
        if let Some(outcome) = &self.hydration {
            return outcome.clone();
        }

        let outcome = match self.store.read(&self.key).await {
            ReadOutcome::Absent => HydrationOutcome::Empty,
            ReadOutcome::Failed { reason } => HydrationOutcome::ReadFailed { reason },
            ReadOutcome::Found(raw) => match decode_entries(&raw) {
                Ok(decoded) => {
                    if decoded.dropped > 0 {
                        warn!(
                            key = %self.key,
                            dropped = decoded.dropped,
                            "Dropped malformed journal entries"
                        );
                    }
                    let loaded = HydrationOutcome::Loaded {
                        entries: decoded.entries.len(),
                        dropped: decoded.dropped,
                    };
                    self.entries = decoded.entries;
                    loaded
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Stored journal is unreadable, starting empty");
                    self.store
                        .report(&PersistEvent::decode_failed(&self.key, e.to_string()));
                    HydrationOutcome::Corrupt {
                        reason: e.to_string(),
                    }
                }
            },
        };

        info!(key = %self.key, entries = self.entries.len(), "Journal hydrated");
        self.hydration = Some(outcome.clone());
        outcome
    }

    /// Prepend a new entry and persist the full journal.
    ///
    /// Hydrates first if startup has not done so, so that the write never
    /// clobbers a journal that was not read yet.
    pub async fn add(&mut self, problem: impl Into<String>, guidance: Guidance) -> AddedEntry {
        if !self.is_hydrated() {
            self.hydrate().await;
        }

        let entry = JournalEntry::new(problem, guidance);
        debug!(key = %self.key, id = %entry.id, "Adding journal entry");
        self.entries.insert(0, entry.clone());

        let persist = self.persist().await;
        AddedEntry { entry, persist }
    }

    /// Current entries, most recent first.
    pub fn snapshot(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&JournalEntry> {
        self.entries.iter().find(|e| e.id.as_str() == id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the journal has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn persist(&self) -> PersistOutcome {
        match encode_entries(&self.entries) {
            Ok(raw) => self.store.write(&self.key, &raw).await,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to encode journal");
                self.store
                    .report(&PersistEvent::write_failed(&self.key, e.to_string()));
                PersistOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
