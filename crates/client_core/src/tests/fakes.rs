use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use shared::domain::{DraftRecord, UserId, UserRecord};
use tokio::sync::{Mutex, Notify};

use crate::{
    config::ResourceSource,
    error::{OperationContext, SyncError},
    resource::{list_context, UserListing, UserResource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Create(DraftRecord),
    Update(UserId, DraftRecord),
    Delete(UserId),
}

/// In-memory stand-in for a user endpoint that behaves like a well-formed
/// CRUD server unless told to fail.
pub(crate) struct FakeUsers {
    source: ResourceSource,
    records: Mutex<Vec<UserRecord>>,
    next_id: Mutex<i64>,
    failing: Mutex<HashSet<OperationContext>>,
    calls: Mutex<Vec<Call>>,
    list_gate: Option<Arc<Notify>>,
    mutation_gate: Option<Arc<Notify>>,
}

impl FakeUsers {
    pub(crate) fn primary(records: Vec<UserRecord>) -> Self {
        Self::new(ResourceSource::Primary, records)
    }

    pub(crate) fn read_only(records: Vec<UserRecord>) -> Self {
        Self::new(ResourceSource::ReadOnly, records)
    }

    fn new(source: ResourceSource, records: Vec<UserRecord>) -> Self {
        Self {
            source,
            next_id: Mutex::new(100),
            records: Mutex::new(records),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            list_gate: None,
            mutation_gate: None,
        }
    }

    pub(crate) fn failing_on(self, context: OperationContext) -> Self {
        self.failing.try_lock().expect("fresh fake").insert(context);
        self
    }

    /// `list` parks until the gate is notified.
    pub(crate) fn with_list_gate(mut self, gate: Arc<Notify>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    /// Mutations park until the gate is notified.
    pub(crate) fn with_mutation_gate(mut self, gate: Arc<Notify>) -> Self {
        self.mutation_gate = Some(gate);
        self
    }

    pub(crate) async fn fail(&self, context: OperationContext) {
        self.failing.lock().await.insert(context);
    }

    pub(crate) async fn recover(&self, context: OperationContext) {
        self.failing.lock().await.remove(&context);
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn check(&self, context: OperationContext) -> Result<(), SyncError> {
        if self.failing.lock().await.contains(&context) {
            return Err(SyncError::network(context, "connection refused"));
        }
        Ok(())
    }

    async fn wait_for_mutation_gate(&self) {
        if let Some(gate) = &self.mutation_gate {
            gate.notified().await;
        }
    }
}

fn record_from(id: UserId, draft: &DraftRecord) -> UserRecord {
    UserRecord {
        id,
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        website: draft.website.clone(),
    }
}

#[async_trait]
impl UserListing for FakeUsers {
    fn source(&self) -> ResourceSource {
        self.source
    }

    async fn list(&self) -> Result<Vec<UserRecord>, SyncError> {
        self.calls.lock().await.push(Call::List);
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        self.check(list_context(self.source)).await?;
        Ok(self.records.lock().await.clone())
    }
}

#[async_trait]
impl UserResource for FakeUsers {
    async fn create(&self, draft: &DraftRecord) -> Result<UserRecord, SyncError> {
        self.calls.lock().await.push(Call::Create(draft.clone()));
        self.wait_for_mutation_gate().await;
        self.check(OperationContext::Create).await?;
        let mut next_id = self.next_id.lock().await;
        let record = record_from(UserId::from(*next_id), draft);
        *next_id += 1;
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &UserId, draft: &DraftRecord) -> Result<UserRecord, SyncError> {
        self.calls
            .lock()
            .await
            .push(Call::Update(id.clone(), draft.clone()));
        self.wait_for_mutation_gate().await;
        self.check(OperationContext::Update).await?;
        let record = record_from(id.clone(), draft);
        let mut records = self.records.lock().await;
        if let Some(existing) = records.iter_mut().find(|existing| &existing.id == id) {
            *existing = record.clone();
        }
        Ok(record)
    }

    async fn delete(&self, id: &UserId) -> Result<(), SyncError> {
        self.calls.lock().await.push(Call::Delete(id.clone()));
        self.wait_for_mutation_gate().await;
        self.check(OperationContext::Delete).await?;
        self.records.lock().await.retain(|existing| &existing.id != id);
        Ok(())
    }
}

pub(crate) fn record(id: i64, name: &str) -> UserRecord {
    UserRecord {
        id: UserId::from(id),
        name: name.to_string(),
        email: format!("{}@x.com", name.to_ascii_lowercase()),
        phone: "1".to_string(),
        website: format!("{}.com", name.to_ascii_lowercase()),
    }
}
