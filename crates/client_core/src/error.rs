use std::fmt;

use shared::error::RecordError;
use thiserror::Error;

/// The user-facing action an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationContext {
    ListPrimary,
    ListReadOnly,
    Create,
    Update,
    Delete,
}

impl OperationContext {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationContext::ListPrimary => "list_primary",
            OperationContext::ListReadOnly => "list_read_only",
            OperationContext::Create => "create",
            OperationContext::Update => "update",
            OperationContext::Delete => "delete",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            OperationContext::ListPrimary => "Failed to load local users. Please try again later.",
            OperationContext::ListReadOnly => {
                "Failed to load placeholder users. Please try again later."
            }
            OperationContext::Create => "Failed to add user. Please try again later.",
            OperationContext::Update => "Failed to update user. Please try again later.",
            OperationContext::Delete => "Failed to delete user. Please try again later.",
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{context} request failed: {message}")]
    Network {
        context: OperationContext,
        message: String,
    },
    #[error("{context} response was malformed: {source}")]
    MalformedResponse {
        context: OperationContext,
        source: RecordError,
    },
    #[error("{context} rejected: another change is still in flight")]
    Busy { context: OperationContext },
}

impl SyncError {
    pub fn network(context: OperationContext, err: impl fmt::Display) -> Self {
        SyncError::Network {
            context,
            message: err.to_string(),
        }
    }

    pub fn malformed(context: OperationContext, source: RecordError) -> Self {
        SyncError::MalformedResponse { context, source }
    }

    pub fn context(&self) -> OperationContext {
        match self {
            SyncError::Network { context, .. }
            | SyncError::MalformedResponse { context, .. }
            | SyncError::Busy { context } => *context,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::Busy { .. } => "Please wait for the previous change to finish.",
            other => other.context().user_message(),
        }
    }
}
