//! HTTP clients for user collections.
//!
//! Each call is exactly one round trip. Failures come back as [`SyncError`]
//! tagged with the action that failed; nothing is retried and no local state
//! is touched here.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use shared::{
    domain::{DraftRecord, UserId, UserRecord},
    error::RecordError,
    protocol::{parse_user, parse_user_list, UserWriteRequest},
};
use tracing::{debug, warn};

use crate::{
    config::{ResourceConfig, ResourceSource},
    error::{OperationContext, SyncError},
};

/// Read access to a user collection.
#[async_trait]
pub trait UserListing: Send + Sync {
    fn source(&self) -> ResourceSource;
    async fn list(&self) -> Result<Vec<UserRecord>, SyncError>;
}

/// Full CRUD access to a user collection.
#[async_trait]
pub trait UserResource: UserListing {
    async fn create(&self, draft: &DraftRecord) -> Result<UserRecord, SyncError>;
    async fn update(&self, id: &UserId, draft: &DraftRecord) -> Result<UserRecord, SyncError>;
    async fn delete(&self, id: &UserId) -> Result<(), SyncError>;
}

pub fn list_context(source: ResourceSource) -> OperationContext {
    match source {
        ResourceSource::Primary => OperationContext::ListPrimary,
        ResourceSource::ReadOnly => OperationContext::ListReadOnly,
    }
}

#[derive(Clone)]
pub struct HttpResourceClient {
    http: Client,
    config: ResourceConfig,
}

impl HttpResourceClient {
    pub fn new(config: ResourceConfig) -> Self {
        Self::with_http(Client::new(), config)
    }

    /// Shares an existing connection pool.
    pub fn with_http(http: Client, config: ResourceConfig) -> Self {
        Self { http, config }
    }

    async fn send(
        &self,
        context: OperationContext,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, SyncError> {
        let response = request.send().await.map_err(|err| {
            warn!(source = %self.config.source(), %context, error = %err, "user resource unreachable");
            SyncError::network(context, err)
        })?;

        let status = response.status();
        let response = response.error_for_status().map_err(|err| {
            warn!(source = %self.config.source(), %context, %status, "user resource rejected request");
            SyncError::network(context, err)
        })?;

        let body = response
            .bytes()
            .await
            .map_err(|err| SyncError::network(context, err))?;
        debug!(source = %self.config.source(), %context, %status, bytes = body.len(), "user resource responded");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl UserListing for HttpResourceClient {
    fn source(&self) -> ResourceSource {
        self.config.source()
    }

    async fn list(&self) -> Result<Vec<UserRecord>, SyncError> {
        let context = list_context(self.config.source());
        let body = self
            .send(context, self.http.get(self.config.collection_url()))
            .await?;
        parse_user_list(&body).map_err(|err| SyncError::malformed(context, err))
    }
}

#[async_trait]
impl UserResource for HttpResourceClient {
    async fn create(&self, draft: &DraftRecord) -> Result<UserRecord, SyncError> {
        let context = OperationContext::Create;
        let body = self
            .send(
                context,
                self.http
                    .post(self.config.collection_url())
                    .json(&UserWriteRequest::from(draft)),
            )
            .await?;
        parse_user(&body).map_err(|err| SyncError::malformed(context, err))
    }

    async fn update(&self, id: &UserId, draft: &DraftRecord) -> Result<UserRecord, SyncError> {
        let context = OperationContext::Update;
        let body = self
            .send(
                context,
                self.http
                    .put(self.config.item_url(id))
                    .json(&UserWriteRequest::from(draft)),
            )
            .await?;
        let record = parse_user(&body).map_err(|err| SyncError::malformed(context, err))?;
        if &record.id != id {
            return Err(SyncError::malformed(
                context,
                RecordError::UnexpectedId {
                    expected: id.clone(),
                    actual: record.id,
                },
            ));
        }
        Ok(record)
    }

    async fn delete(&self, id: &UserId) -> Result<(), SyncError> {
        self.send(
            OperationContext::Delete,
            self.http.delete(self.config.item_url(id)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
