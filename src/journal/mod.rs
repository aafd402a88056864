//! Guidance journal.
//!
//! The journal is an ordered, most-recent-first list of problem/guidance
//! pairs persisted as one JSON array under a single store key. The guidance
//! payload is opaque and stored verbatim.

mod repository;


pub use repository::{AddedEntry, HydrationOutcome, JournalRepository};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{JournalError, JournalResult};

/// Opaque guidance payload produced by the guidance collaborator.
pub type Guidance = serde_json::Value;

/// Unique journal entry identifier.
///
/// New ids are random UUIDs. Ids read back from storage are kept verbatim,
/// whatever their shape (older journals used ISO-8601 timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One recorded problem and the guidance it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// The user-submitted text that prompted guidance.
    pub problem: String,
    /// Guidance payload, never interpreted here.
    pub guidance: Guidance,
}

impl JournalEntry {
    /// Create an entry with a freshly generated id.
    pub fn new(problem: impl Into<String>, guidance: Guidance) -> Self {
        Self {
            id: EntryId::generate(),
            problem: problem.into(),
            guidance,
        }
    }

    /// Override the id (restoring or fixtures).
    pub fn with_id(mut self, id: impl Into<EntryId>) -> Self {
        self.id = id.into();
        self
    }
}

/// Entries recovered from a stored journal document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedJournal {
    /// Well-formed entries, in stored order.
    pub entries: Vec<JournalEntry>,
    /// Array elements that were not valid entries.
    pub dropped: usize,
}

/// Serialize the full journal as a JSON array.
pub fn encode_entries(entries: &[JournalEntry]) -> JournalResult<String> {
    serde_json::to_string(entries).map_err(|e| JournalError::Encode {
        message: e.to_string(),
    })
}

/// Parse a stored journal document.
///
/// The document must be a JSON array. Elements that do not have the entry
/// shape are dropped individually rather than failing the whole journal.
pub fn decode_entries(raw: &str) -> JournalResult<DecodedJournal> {
    let document: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| JournalError::Decode {
            message: e.to_string(),
        })?;

    let items = match document {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(JournalError::Decode {
                message: format!("expected a JSON array, found {}", json_kind(&other)),
            })
        }
    };

    let mut decoded = DecodedJournal::default();
    for item in items {
        match serde_json::from_value::<JournalEntry>(item) {
            Ok(entry) => decoded.entries.push(entry),
            Err(_) => decoded.dropped += 1,
        }
    }
    Ok(decoded)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
