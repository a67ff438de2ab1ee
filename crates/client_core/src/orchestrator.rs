//! Top-level driver tying both collections, the form, and error reporting
//! together.
//!
//! Every state change happens under one lock and is followed by a
//! [`SyncEvent::StateChanged`] carrying a fresh [`SyncSnapshot`], so observers
//! never see a half-applied transition. Network calls run with the lock
//! released.
//!
//! At most one mutation or reload runs at a time. The slot is a semaphore
//! permit owned by the running call, so a caller dropping its future frees it.

use std::sync::Arc;

use reqwest::Client;
use shared::domain::{DraftRecord, UserField, UserId, UserRecord};
use tokio::sync::{broadcast, Mutex, Semaphore};
use tracing::{info, warn};

use crate::{
    config::{ConfigError, ResourceConfig},
    error::{OperationContext, SyncError},
    form::{FormController, FormMode},
    resource::{HttpResourceClient, UserListing, UserResource},
    store::{CollectionStore, Reconciliation},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(SyncError),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }
}

/// Immutable view of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub primary_records: Vec<UserRecord>,
    pub read_only_records: Vec<UserRecord>,
    pub primary_status: LoadStatus,
    pub read_only_status: LoadStatus,
    pub is_loading: bool,
    pub current_error: Option<SyncError>,
    pub form_mode: FormMode,
    pub draft: DraftRecord,
}

impl SyncSnapshot {
    pub fn primary_is_empty(&self) -> bool {
        self.primary_records.is_empty()
    }

    pub fn read_only_is_empty(&self) -> bool {
        self.read_only_records.is_empty()
    }

    pub fn find_primary(&self, id: &UserId) -> Option<&UserRecord> {
        self.primary_records.iter().find(|record| &record.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum SyncEvent {
    StateChanged(SyncSnapshot),
    Error(SyncError),
}

struct SyncState {
    store: CollectionStore,
    form: FormController,
    primary_status: LoadStatus,
    read_only_status: LoadStatus,
    current_error: Option<SyncError>,
}

impl SyncState {
    fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            primary_records: self.store.primary().to_vec(),
            read_only_records: self.store.read_only().to_vec(),
            primary_status: self.primary_status.clone(),
            read_only_status: self.read_only_status.clone(),
            is_loading: self.primary_status.is_loading() || self.read_only_status.is_loading(),
            current_error: self.current_error.clone(),
            form_mode: self.form.mode().clone(),
            draft: self.form.draft().clone(),
        }
    }
}

pub struct SyncOrchestrator {
    primary: Arc<dyn UserResource>,
    read_only: Arc<dyn UserListing>,
    inner: Mutex<SyncState>,
    writes: Semaphore,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncOrchestrator {
    pub fn new(primary: Arc<dyn UserResource>, read_only: Arc<dyn UserListing>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            primary,
            read_only,
            inner: Mutex::new(SyncState {
                store: CollectionStore::new(),
                form: FormController::new(),
                primary_status: LoadStatus::Loading,
                read_only_status: LoadStatus::Loading,
                current_error: None,
            }),
            writes: Semaphore::new(1),
            events,
        }
    }

    /// Builds HTTP clients for both collections over one connection pool.
    pub fn from_urls(primary_url: &str, read_only_url: &str) -> Result<Self, ConfigError> {
        let http = Client::new();
        let primary =
            HttpResourceClient::with_http(http.clone(), ResourceConfig::primary(primary_url)?);
        let read_only =
            HttpResourceClient::with_http(http, ResourceConfig::read_only(read_only_url)?);
        Ok(Self::new(Arc::new(primary), Arc::new(read_only)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SyncSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Loads both collections concurrently. Each result is applied as soon as
    /// it arrives; `is_loading` clears once both have finished.
    ///
    /// Waits for an in-flight mutation first so a list fetched before the
    /// server applied it cannot overwrite the confirmed change. Mutations
    /// issued while the reload runs are rejected as busy.
    pub async fn initialize(&self) {
        // Only fails once closed, which never happens.
        let _slot = self.writes.acquire().await;
        {
            let mut state = self.inner.lock().await;
            state.primary_status = LoadStatus::Loading;
            state.read_only_status = LoadStatus::Loading;
            state.current_error = None;
            self.publish(&state);
        }

        futures::join!(self.load_primary(), self.load_read_only());

        let state = self.inner.lock().await;
        info!(
            primary = state.store.primary().len(),
            read_only = state.store.read_only().len(),
            failed = state.current_error.is_some(),
            "initial load finished"
        );
    }

    async fn load_primary(&self) {
        let result = self.primary.list().await;
        let mut state = self.inner.lock().await;
        match result {
            Ok(records) => {
                state.store.replace_primary(records);
                state.primary_status = LoadStatus::Ready;
            }
            Err(err) => {
                warn!(error = %err, "primary load failed");
                state.primary_status = LoadStatus::Failed(err.clone());
                state.current_error = Some(err.clone());
                let _ = self.events.send(SyncEvent::Error(err));
            }
        }
        self.publish(&state);
    }

    async fn load_read_only(&self) {
        let result = self.read_only.list().await;
        let mut state = self.inner.lock().await;
        match result {
            Ok(records) => {
                state.store.replace_read_only(records);
                state.read_only_status = LoadStatus::Ready;
            }
            Err(err) => {
                warn!(error = %err, "read-only load failed");
                state.read_only_status = LoadStatus::Failed(err.clone());
                // A primary failure from the same pass stays the surfaced one.
                let primary_failed = state
                    .current_error
                    .as_ref()
                    .is_some_and(|current| current.context() == OperationContext::ListPrimary);
                if !primary_failed {
                    state.current_error = Some(err.clone());
                }
                let _ = self.events.send(SyncEvent::Error(err));
            }
        }
        self.publish(&state);
    }

    pub async fn start_create(&self) {
        let mut state = self.inner.lock().await;
        state.form.start_create();
        self.publish(&state);
    }

    pub async fn start_edit(&self, record: &UserRecord) {
        let mut state = self.inner.lock().await;
        state.form.start_edit(record);
        self.publish(&state);
    }

    pub async fn update_field(&self, field: UserField, value: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.form.update_field(field, value);
        self.publish(&state);
    }

    /// Creates or updates depending on the form mode. The form resets only
    /// after the server confirms.
    pub async fn submit(&self) -> Result<(), SyncError> {
        let submission = self.inner.lock().await.form.submission();
        let context = submission.context();
        let Ok(_slot) = self.writes.try_acquire() else {
            return Err(SyncError::Busy { context });
        };

        let result = submission.send(self.primary.as_ref()).await;

        let mut state = self.inner.lock().await;
        match result {
            Ok(reconciliation) => {
                info!(%context, "user change confirmed");
                reconciliation.apply(&mut state.store);
                state.form.finish_submit();
                state.current_error = None;
                self.publish(&state);
                Ok(())
            }
            Err(err) => Err(self.fail(&mut state, err)),
        }
    }

    pub async fn delete_record(&self, id: &UserId) -> Result<(), SyncError> {
        let Ok(_slot) = self.writes.try_acquire() else {
            return Err(SyncError::Busy {
                context: OperationContext::Delete,
            });
        };

        let result = self.primary.delete(id).await;

        let mut state = self.inner.lock().await;
        match result {
            Ok(()) => {
                info!(user_id = %id, "user deleted");
                Reconciliation::Removed(id.clone()).apply(&mut state.store);
                state.current_error = None;
                self.publish(&state);
                Ok(())
            }
            Err(err) => Err(self.fail(&mut state, err)),
        }
    }

    fn fail(&self, state: &mut SyncState, err: SyncError) -> SyncError {
        warn!(context = %err.context(), error = %err, "user change failed");
        state.current_error = Some(err.clone());
        let _ = self.events.send(SyncEvent::Error(err.clone()));
        self.publish(state);
        err
    }

    fn publish(&self, state: &SyncState) {
        let _ = self.events.send(SyncEvent::StateChanged(state.snapshot()));
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
