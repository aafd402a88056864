//! # Ayah Guidance State
//!
//! Application state coordinator for the Ayah Guidance client. It owns the
//! active-view selector, the durable guidance journal and the one-time
//! onboarding tour, and keeps them consistent with the copy in the durable
//! store across reloads and storage failures.
//!
//! ## Architecture
//!
//! ```text
//! View layer → AppCoordinator ─┬→ Navigator (memory only)
//!                              ├→ JournalRepository ─┐
//!                              └→ OnboardingFlag ────┴→ StoreAdapter → SQLite / memory
//! ```
//!
//! Nothing in this crate is fatal: storage failures degrade to in-memory
//! state and are surfaced through [`observe::PersistenceObserver`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ayah_guidance_state::{AppCoordinator, Config, StoreAdapter, View};
//! use ayah_guidance_state::observe::PersistenceMetrics;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     ayah_guidance_state::logging::init(&config.logging);
//!
//!     let metrics = Arc::new(PersistenceMetrics::new());
//!     let store = StoreAdapter::connect(&config).await.with_observer(metrics.clone());
//!     let mut app = AppCoordinator::new(store, &config.store);
//!     let report = app.start().await;
//!
//!     if app.is_tour_visible() {
//!         app.close_tour().await;
//!     }
//!     app.navigate(View::Chat);
//!     app.submit_guidance("I feel lost", serde_json::json!({"ayah": "93:7"})).await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management.
pub mod config;
/// Application coordinator and view state.
pub mod coordinator;
/// Error types and result aliases for the application.
pub mod error;
/// Journal entries and the journal repository.
pub mod journal;
/// Tracing subscriber initialisation.
pub mod logging;
/// Active-view selection.
pub mod navigator;
/// Persistence observability hooks.
pub mod observe;
/// One-time onboarding tour flag.
pub mod onboarding;
/// Durable key/value store adapter and backends.
pub mod store;

pub use config::Config;
pub use coordinator::{AppCoordinator, CoordinatorHandle, ReadyReport, ViewState};
pub use error::{AppError, AppResult};
pub use journal::{JournalEntry, JournalRepository};
pub use navigator::View;
pub use store::{PersistOutcome, StoreAdapter};
