//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! The dispute collection lives in an explicit, injected [`Store`] — never
//! a process-wide singleton — so every test can build an isolated store per
//! case. The eligibility counters the creation guard consumes are computed
//! views over this store, not independent state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use dflow_core::{Bureau, Dispute, UserId};
use dflow_workflow::guards::CREATION_WINDOW_DAYS;

use crate::auth::SecretToken;

// ── Generic In-Memory Store ────────────────────────────────────────────

/// Cloneable, thread-safe map of records keyed by UUID.
///
/// Operations are synchronous on purpose: the lock is `parking_lot`, not
/// `tokio::sync`, and is never held across an `.await` point. Being
/// non-poisoning, a panic inside a writer leaves the store usable.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Guard-checked update under a single write lock.
    ///
    /// The closure inspects the record, applies whatever precondition it
    /// needs, mutates on success, and returns `Ok(R)` or `Err(E)`. Because
    /// check and mutation share one lock acquisition, a concurrent caller
    /// cannot slip between them.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Configuration ──────────────────────────────────────────────────────

/// Application configuration, built from the environment in `main` and
/// injected — handlers never read env vars.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the server binds.
    pub port: u16,
    /// Bearer secret; `None` disables authentication (dev mode: every
    /// request is treated as an operator).
    pub auth_token: Option<SecretToken>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

// ── AppState ───────────────────────────────────────────────────────────

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: AppConfig,
    /// The dispute collection.
    pub disputes: Store<Dispute>,
}

impl AppState {
    /// Build state with default configuration and an empty store.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Build state with explicit configuration and an empty store.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            disputes: Store::new(),
        }
    }

    /// Count the consumer's disputes opened against the given bureau within
    /// the rolling creation window. Soft-deleted records don't count; a
    /// dispute targeting `ALL` counts toward every bureau.
    pub fn recent_disputes_for_bureau(
        &self,
        user_id: UserId,
        bureau: Bureau,
        now: DateTime<Utc>,
    ) -> usize {
        let window_start = now - Duration::days(CREATION_WINDOW_DAYS);
        self.disputes
            .list()
            .iter()
            .filter(|d| {
                d.user_id == user_id
                    && d.is_active()
                    && d.bureau.covers(bureau)
                    && d.created_at >= window_start
            })
            .count()
    }

    /// Count every dispute the consumer has ever created, soft-deleted ones
    /// included. Drives first-dispute onboarding messaging.
    pub fn total_disputes(&self, user_id: UserId) -> usize {
        self.disputes
            .list()
            .iter()
            .filter(|d| d.user_id == user_id)
            .count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
