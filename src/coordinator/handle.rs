use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};

use super::{AppCoordinator, ReadyReport, ViewState};
use crate::journal::{AddedEntry, Guidance, JournalEntry};
use crate::navigator::View;
use crate::store::PersistOutcome;

/// Cloneable, task-safe front of an [`AppCoordinator`].
///
/// Transitions take the inner lock for their whole duration, including the
/// awaited store write, and tokio's mutex is fair, so events apply in the
/// order they were issued.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    inner: Arc<Mutex<AppCoordinator>>,
    state_rx: watch::Receiver<ViewState>,
}

impl CoordinatorHandle {
    /// Share a coordinator.
    pub fn new(coordinator: AppCoordinator) -> Self {
        let state_rx = coordinator.subscribe();
        Self {
            inner: Arc::new(Mutex::new(coordinator)),
            state_rx,
        }
    }

    /// See [`AppCoordinator::start`].
    pub async fn start(&self) -> ReadyReport {
        self.inner.lock().await.start().await
    }

    /// See [`AppCoordinator::navigate`].
    pub async fn navigate(&self, view: View) -> View {
        self.inner.lock().await.navigate(view)
    }

    /// See [`AppCoordinator::open_sidebar`].
    pub async fn open_sidebar(&self) {
        self.inner.lock().await.open_sidebar();
    }

    /// See [`AppCoordinator::close_sidebar`].
    pub async fn close_sidebar(&self) {
        self.inner.lock().await.close_sidebar();
    }

    /// See [`AppCoordinator::close_tour`].
    pub async fn close_tour(&self) -> PersistOutcome {
        self.inner.lock().await.close_tour().await
    }

    /// See [`AppCoordinator::submit_guidance`].
    pub async fn submit_guidance(&self, problem: impl Into<String>, guidance: Guidance) -> AddedEntry {
        self.inner.lock().await.submit_guidance(problem, guidance).await
    }

    /// Latest published render state, without waiting on the lock.
    pub fn view_state(&self) -> ViewState {
        *self.state_rx.borrow()
    }

    /// Owned copy of the journal.
    pub async fn journal_snapshot(&self) -> Vec<JournalEntry> {
        self.inner.lock().await.journal().to_vec()
    }

    /// Receive render state updates.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_rx.clone()
    }

    /// Direct access for reads that need several fields at once.
    pub async fn lock(&self) -> MutexGuard<'_, AppCoordinator> {
        self.inner.lock().await
    }
}
