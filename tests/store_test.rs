//! Integration tests for the store adapter
//!
//! Uses a mocked `KeyValueStore` to pin down exactly which backend calls
//! the adapter, the journal and the onboarding flag make.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use mockall::Sequence;
use serde_json::json;

use ayah_guidance_state::config::StoreConfig;
use ayah_guidance_state::error::{StorageError, StorageResult};
use ayah_guidance_state::journal::{decode_entries, JournalRepository};
use ayah_guidance_state::observe::{PersistEvent, PersistenceMetrics, PersistenceObserver};
use ayah_guidance_state::onboarding::OnboardingFlag;
use ayah_guidance_state::store::{KeyValueStore, ReadOutcome, SqliteStore};
use ayah_guidance_state::{AppCoordinator, PersistOutcome, StoreAdapter};

mock! {
    pub Backend {}

    #[async_trait]
    impl KeyValueStore for Backend {
        async fn get(&self, key: &str) -> StorageResult<Option<String>>;
        async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
        fn backend(&self) -> &'static str;
    }
}

fn mock_backend() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_backend().return_const("mock");
    backend
}

/// Observer that keeps every event, for ordering assertions
#[derive(Default)]
struct RecordingObserver {
    events: std::sync::Mutex<Vec<PersistEvent>>,
}

impl PersistenceObserver for RecordingObserver {
    fn on_event(&self, event: &PersistEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod adapter_tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_error_is_absorbed() {
        let mut backend = mock_backend();
        backend.expect_get().returning(|_| {
            Err(StorageError::Unavailable {
                message: "disabled".to_string(),
            })
        });

        let adapter = StoreAdapter::new(backend);
        let outcome = adapter.read("k").await;
        assert!(matches!(outcome, ReadOutcome::Failed { ref reason } if reason.contains("disabled")));
    }

    #[tokio::test]
    async fn test_oversized_value_skips_backend() {
        let mut backend = mock_backend();
        backend.expect_set().never();

        let adapter = StoreAdapter::new(backend).with_max_value_bytes(3);
        let outcome = adapter.write("k", "four").await;
        assert!(matches!(outcome, PersistOutcome::Failed { ref reason } if reason.contains("Quota exceeded")));
    }

    #[tokio::test]
    async fn test_observers_see_events_in_order() {
        let mut backend = mock_backend();
        let mut seq = Sequence::new();
        backend
            .expect_set()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        backend
            .expect_set()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(StorageError::Unavailable {
                    message: "disk full".to_string(),
                })
            });

        let recorder = Arc::new(RecordingObserver::default());
        let metrics = Arc::new(PersistenceMetrics::new());
        let adapter = StoreAdapter::new(backend)
            .with_observer(recorder.clone())
            .with_observer(metrics.clone());

        adapter.write("a", "12").await;
        adapter.write("b", "345").await;

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], PersistEvent::WriteSucceeded { key, bytes: 2, .. } if key == "a"));
        assert!(matches!(&events[1], PersistEvent::WriteFailed { key, .. } if key == "b"));

        let snap = metrics.snapshot();
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.write_failures, 1);
    }
}

#[cfg(test)]
mod journal_backend_tests {
    use super::*;

    #[tokio::test]
    async fn test_each_add_writes_full_journal_once() {
        let mut backend = mock_backend();
        backend
            .expect_get()
            .withf(|key: &str| key == "journal")
            .times(1)
            .returning(|_| Ok(None));

        let mut seq = Sequence::new();
        backend
            .expect_set()
            .withf(|key: &str, value: &str| {
                key == "journal" && decode_entries(value).ok().map(|d| d.entries.len()) == Some(1)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        backend
            .expect_set()
            .withf(|key: &str, value: &str| {
                key == "journal" && decode_entries(value).ok().map(|d| d.entries.len()) == Some(2)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let mut journal = JournalRepository::new(StoreAdapter::new(backend), "journal");
        journal.hydrate().await;
        journal.add("one", json!(1)).await;
        journal.add("two", json!(2)).await;
    }

    #[tokio::test]
    async fn test_hydrate_does_not_write() {
        let mut backend = mock_backend();
        backend
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some(r#"[{"id":"a","problem":"p","guidance":{}}]"#.to_string())));
        backend.expect_set().never();

        let mut journal = JournalRepository::new(StoreAdapter::new(backend), "journal");
        journal.hydrate().await;
        journal.hydrate().await;
        assert_eq!(journal.len(), 1);
    }
}

#[cfg(test)]
mod onboarding_backend_tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_shown_writes_true_marker_once() {
        let mut backend = mock_backend();
        backend.expect_get().times(1).returning(|_| Ok(None));
        backend
            .expect_set()
            .withf(|key: &str, value: &str| key == "tour" && value == "true")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut flag = OnboardingFlag::new(StoreAdapter::new(backend), "tour");
        assert!(!flag.has_been_shown().await);
        assert!(flag.mark_shown().await.is_persisted());
        assert_eq!(flag.mark_shown().await, PersistOutcome::Skipped);
        assert!(flag.has_been_shown().await);
    }
}

#[cfg(test)]
mod startup_tests {
    use super::*;

    #[tokio::test]
    async fn test_startup_reads_journal_then_flag() {
        let config = StoreConfig::default();
        let journal_key = config.journal_key.clone();
        let onboarding_key = config.onboarding_key.clone();

        let mut backend = mock_backend();
        let mut seq = Sequence::new();
        backend
            .expect_get()
            .withf(move |key: &str| key == journal_key)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        backend
            .expect_get()
            .withf(move |key: &str| key == onboarding_key)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("true".to_string())));
        backend.expect_set().never();

        let mut app = AppCoordinator::new(StoreAdapter::new(backend), &config);
        let report = app.start().await;
        assert!(!report.tour_opened);

        // A second start must not touch the backend again.
        app.start().await;
    }

    #[tokio::test]
    async fn test_sqlite_backend_drives_coordinator() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let mut app = AppCoordinator::new(StoreAdapter::new(store.clone()), &StoreConfig::default());
        app.start().await;
        app.submit_guidance("p", json!({"k": "v"})).await;
        app.close_tour().await;

        let flag = store
            .get(&StoreConfig::default().onboarding_key)
            .await
            .unwrap();
        assert_eq!(flag.as_deref(), Some("true"));
    }
}
