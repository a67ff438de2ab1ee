//! Client-side synchronization of a locally editable user collection with a
//! remote CRUD endpoint, alongside a read-only comparison collection.

pub mod config;
pub mod error;
pub mod form;
pub mod orchestrator;
pub mod resource;
pub mod store;

pub use config::{ConfigError, ResourceConfig, ResourceSource};
pub use error::{OperationContext, SyncError};
pub use form::{FormController, FormMode, Submission};
pub use orchestrator::{LoadStatus, SyncEvent, SyncOrchestrator, SyncSnapshot};
pub use resource::{HttpResourceClient, UserListing, UserResource};
pub use store::{CollectionStore, Reconciliation};

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod fakes;
