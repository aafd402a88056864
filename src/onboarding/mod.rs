//! One-time onboarding tour flag.
//!
//! The flag is read once per session and written at most once, when the
//! tour is dismissed. Any non-empty stored value means the tour has been
//! shown. Read failures fail open: the tour shows again.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::{PersistOutcome, ReadOutcome, StoreAdapter};

/// Marker written when the tour is dismissed.
pub const SHOWN_MARKER: &str = "true";

/// Session view of the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagState {
    /// Not checked yet.
    #[default]
    Unknown,
    /// The tour must show.
    Unset,
    /// The tour was already completed.
    Set,
}

impl std::fmt::Display for FlagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagState::Unknown => write!(f, "unknown"),
            FlagState::Unset => write!(f, "unset"),
            FlagState::Set => write!(f, "set"),
        }
    }
}

/// Result of the startup flag check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlagCheck {
    /// The marker is present.
    Shown,
    /// The marker is absent.
    NotShown,
    /// The store could not be read; treated as not shown.
    ReadFailed {
        /// Backend error message.
        reason: String,
    },
}

impl FlagCheck {
    /// Whether the tour should be opened.
    pub fn tour_pending(&self) -> bool {
        !matches!(self, FlagCheck::Shown)
    }
}

/// Onboarding flag backed by one store key.
#[derive(Debug)]
pub struct OnboardingFlag {
    key: String,
    store: StoreAdapter,
    state: FlagState,
    check: Option<FlagCheck>,
}

impl OnboardingFlag {
    /// Create an unchecked flag.
    pub fn new(store: StoreAdapter, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            store,
            state: FlagState::Unknown,
            check: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> FlagState {
        self.state
    }

    /// Store key of the marker.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the marker. Runs once; later calls return the first result.
    pub async fn check(&mut self) -> FlagCheck {
        if let Some(check) = &self.check {
            return check.clone();
        }

        let check = match self.store.read(&self.key).await {
            ReadOutcome::Found(value) if !value.is_empty() => FlagCheck::Shown,
            ReadOutcome::Found(_) | ReadOutcome::Absent => FlagCheck::NotShown,
            ReadOutcome::Failed { reason } => FlagCheck::ReadFailed { reason },
        };

        // A flag marked during this session stays marked.
        if self.state != FlagState::Set {
            self.state = if check.tour_pending() {
                FlagState::Unset
            } else {
                FlagState::Set
            };
        }
        debug!(key = %self.key, state = %self.state, "Onboarding flag checked");
        self.check = Some(check.clone());
        check
    }

    /// Whether the tour was already completed. Checks the store on first use.
    pub async fn has_been_shown(&mut self) -> bool {
        self.check().await;
        self.state == FlagState::Set
    }

    /// Record that the tour was dismissed.
    ///
    /// Writes the marker once per session; later calls are `Skipped`. A
    /// failed write leaves nothing durable, so the tour returns next session.
    pub async fn mark_shown(&mut self) -> PersistOutcome {
        if self.state == FlagState::Set {
            return PersistOutcome::Skipped;
        }

        self.state = FlagState::Set;
        let outcome = self.store.write(&self.key, SHOWN_MARKER).await;
        if outcome.is_persisted() {
            info!(key = %self.key, "Onboarding tour marked as shown");
        }
        outcome
    }
}
