use thiserror::Error;

use crate::domain::UserId;

/// Reasons a value received from or headed to a user resource is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user record is missing its id")]
    MissingId,
    #[error("user id {0} appears more than once in the collection")]
    DuplicateId(UserId),
    #[error("expected user {expected} but the server answered with user {actual}")]
    UnexpectedId { expected: UserId, actual: UserId },
    #[error("unknown user field '{0}'")]
    UnknownField(String),
    #[error("response body is not a valid user payload: {0}")]
    InvalidShape(String),
}
