//! Application state coordinator.
//!
//! [`AppCoordinator`] owns the three pieces of session state (active view,
//! journal, onboarding tour) plus the transient sidebar and tour flags, and
//! is the only thing the view layer talks to. It is an explicit context
//! object: construct it, call [`AppCoordinator::start`] once, then drive it
//! with the transition methods.
//!
//! ## Composite state
//!
//! ```text
//! ActiveView (8) x Sidebar (open/closed) x Tour (open/closed)
//! initial: { home, closed, closed }
//! ```
//!
//! The tour is only visible while it is open *and* the home view is active.
//! Navigating away hides it without closing it.

mod handle;

pub use handle::CoordinatorHandle;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::journal::{AddedEntry, Guidance, HydrationOutcome, JournalEntry, JournalRepository};
use crate::navigator::{Navigator, View};
use crate::onboarding::{FlagCheck, FlagState, OnboardingFlag};
use crate::store::{PersistOutcome, StoreAdapter};

/// What the view layer renders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Active view.
    pub active_view: View,
    /// Number of journal entries, for the sidebar badge.
    pub journal_len: usize,
    /// Sidebar open flag.
    pub sidebar_open: bool,
    /// Tour open flag, independent of the active view.
    pub tour_open: bool,
    /// Whether the tour overlay is actually displayed.
    pub tour_visible: bool,
}

impl ViewState {
    /// Header label of the active view.
    pub fn active_view_label(&self) -> &'static str {
        self.active_view.label()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_view: View::Home,
            journal_len: 0,
            sidebar_open: false,
            tour_open: false,
            tour_visible: false,
        }
    }
}

/// Composite result of startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyReport {
    /// Journal hydration result.
    pub journal: HydrationOutcome,
    /// Onboarding flag check result.
    pub onboarding: FlagCheck,
    /// Whether startup opened the tour.
    pub tour_opened: bool,
}

impl ReadyReport {
    /// True when any startup read had to fall back to a default.
    pub fn is_degraded(&self) -> bool {
        self.journal.is_degraded() || matches!(self.onboarding, FlagCheck::ReadFailed { .. })
    }
}

/// Owner of all session state.
#[derive(Debug)]
pub struct AppCoordinator {
    navigator: Navigator,
    journal: JournalRepository,
    onboarding: OnboardingFlag,
    sidebar_open: bool,
    tour_open: bool,
    ready: Option<ReadyReport>,
    state_tx: watch::Sender<ViewState>,
}

impl AppCoordinator {
    /// Build a coordinator in the initial state. Nothing is read until
    /// [`start`](Self::start).
    pub fn new(store: StoreAdapter, config: &StoreConfig) -> Self {
        let (state_tx, _) = watch::channel(ViewState::default());
        Self {
            navigator: Navigator::new(),
            journal: JournalRepository::new(store.clone(), config.journal_key.clone()),
            onboarding: OnboardingFlag::new(store, config.onboarding_key.clone()),
            sidebar_open: false,
            tour_open: false,
            ready: None,
            state_tx,
        }
    }

    /// Run the startup sequence.
    ///
    /// Hydrates the journal, then checks the onboarding flag, then opens the
    /// tour if it has not been completed. Every step falls back to a default
    /// on failure, so this always completes. Later calls return the first
    /// report without touching storage.
    pub async fn start(&mut self) -> ReadyReport {
        if let Some(report) = &self.ready {
            return report.clone();
        }

        let journal = self.journal.hydrate().await;
        let onboarding = self.onboarding.check().await;

        let tour_opened = onboarding.tour_pending() && self.onboarding.state() != FlagState::Set;
        if tour_opened {
            self.tour_open = true;
        }

        let report = ReadyReport {
            journal,
            onboarding,
            tour_opened,
        };
        info!(
            entries = self.journal.len(),
            tour_opened,
            degraded = report.is_degraded(),
            "Coordinator ready"
        );

        self.ready = Some(report.clone());
        self.publish();
        report
    }

    /// Whether startup has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// Startup report, once ready.
    pub fn ready_report(&self) -> Option<&ReadyReport> {
        self.ready.as_ref()
    }

    /// Switch the active view. Always closes the sidebar; the tour is untouched.
    pub fn navigate(&mut self, view: View) -> View {
        let previous = self.navigator.navigate(view);
        self.sidebar_open = false;
        debug!(from = %previous, to = %view, "Navigated");
        self.publish();
        previous
    }

    /// Open the sidebar.
    pub fn open_sidebar(&mut self) {
        self.sidebar_open = true;
        self.publish();
    }

    /// Close the sidebar.
    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
        self.publish();
    }

    /// Dismiss the tour and record it as shown.
    ///
    /// The tour closes whatever the persistence outcome. Closing twice is
    /// harmless; the second call does not write.
    pub async fn close_tour(&mut self) -> PersistOutcome {
        self.tour_open = false;
        self.publish();
        self.onboarding.mark_shown().await
    }

    /// Record guidance in the journal.
    pub async fn submit_guidance(
        &mut self,
        problem: impl Into<String>,
        guidance: Guidance,
    ) -> AddedEntry {
        let added = self.journal.add(problem, guidance).await;
        self.publish();
        added
    }

    /// Active view.
    pub fn active_view(&self) -> View {
        self.navigator.active()
    }

    /// Header label of the active view.
    pub fn active_view_label(&self) -> &'static str {
        self.navigator.active().label()
    }

    /// Journal entries, most recent first.
    pub fn journal(&self) -> &[JournalEntry] {
        self.journal.snapshot()
    }

    /// Number of journal entries.
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Sidebar open flag.
    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Tour open flag, regardless of the active view.
    pub fn is_tour_open(&self) -> bool {
        self.tour_open
    }

    /// Whether the tour overlay is displayed.
    pub fn is_tour_visible(&self) -> bool {
        self.tour_open && self.navigator.is_home()
    }

    /// Onboarding flag state for this session.
    pub fn onboarding_state(&self) -> FlagState {
        self.onboarding.state()
    }

    /// Current render state.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            active_view: self.active_view(),
            journal_len: self.journal_len(),
            sidebar_open: self.sidebar_open,
            tour_open: self.tour_open,
            tour_visible: self.is_tour_visible(),
        }
    }

    /// Receive a new [`ViewState`] after every transition that changes it.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    fn publish(&self) {
        let next = self.view_state();
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn coordinator(store: &MemoryStore) -> AppCoordinator {
        AppCoordinator::new(StoreAdapter::new(store.clone()), &StoreConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let store = MemoryStore::new();
        let app = coordinator(&store);
        assert_eq!(app.view_state(), ViewState::default());
        assert!(!app.is_ready());
        assert_eq!(app.onboarding_state(), FlagState::Unknown);
    }

    #[tokio::test]
    async fn test_first_start_opens_tour() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);

        let report = app.start().await;
        assert!(report.tour_opened);
        assert_eq!(report.journal, HydrationOutcome::Empty);
        assert!(app.is_tour_visible());
    }

    #[tokio::test]
    async fn test_navigate_closes_sidebar() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        app.start().await;

        app.open_sidebar();
        assert!(app.is_sidebar_open());

        let previous = app.navigate(View::Chat);
        assert_eq!(previous, View::Home);
        assert_eq!(app.active_view(), View::Chat);
        assert!(!app.is_sidebar_open());
    }

    #[tokio::test]
    async fn test_tour_pinned_to_home() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        app.start().await;

        app.navigate(View::Journal);
        assert!(app.is_tour_open());
        assert!(!app.is_tour_visible());

        app.navigate(View::Home);
        assert!(app.is_tour_visible());
    }

    #[tokio::test]
    async fn test_close_tour_twice() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        app.start().await;

        assert!(app.close_tour().await.is_persisted());
        let once = app.view_state();
        assert_eq!(app.close_tour().await, PersistOutcome::Skipped);
        assert_eq!(app.view_state(), once);
        assert!(!app.is_tour_open());
    }

    #[tokio::test]
    async fn test_start_is_cached() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        let first = app.start().await;
        app.close_tour().await;

        let second = app.start().await;
        assert_eq!(first, second);
        assert!(!app.is_tour_open());
    }

    #[tokio::test]
    async fn test_submit_guidance_updates_badge() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        app.start().await;
        let mut rx = app.subscribe();

        app.submit_guidance("p", json!({"ayah": "2:286"})).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().journal_len, 1);
        assert_eq!(app.journal()[0].problem, "p");
    }

    #[tokio::test]
    async fn test_unchanged_transition_not_published() {
        let store = MemoryStore::new();
        let mut app = coordinator(&store);
        app.start().await;
        let mut rx = app.subscribe();
        rx.borrow_and_update();

        app.close_sidebar();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_close_tour_before_start_keeps_it_closed() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut app = coordinator(&store);

        app.close_tour().await;
        let report = app.start().await;
        assert!(!report.tour_opened);
        assert!(!app.is_tour_open());
    }

    #[tokio::test]
    async fn test_degraded_report_when_storage_disabled() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let mut app = coordinator(&store);

        let report = app.start().await;
        assert!(report.is_degraded());
        assert!(report.tour_opened);
        assert_eq!(app.active_view_label(), "آية ترشدك");
    }
}
