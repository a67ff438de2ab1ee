//! Wire shapes exchanged with user resource endpoints.
//!
//! Inbound bodies are parsed into [`UserPayload`] and validated into
//! [`UserRecord`]; nothing downstream ever sees raw server JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{strip_website_scheme, DraftRecord, UserId, UserRecord},
    error::RecordError,
};

/// A user object as a server sends it. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl TryFrom<UserPayload> for UserRecord {
    type Error = RecordError;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        let id = value.id.ok_or(RecordError::MissingId)?;
        let website = strip_website_scheme(&value.website).to_string();
        Ok(UserRecord {
            id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            website,
        })
    }
}

/// Body of create and update requests. Never carries an id; the target of an
/// update travels in the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWriteRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl From<&DraftRecord> for UserWriteRequest {
    fn from(draft: &DraftRecord) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            website: strip_website_scheme(&draft.website).to_string(),
        }
    }
}

pub fn parse_user(body: &[u8]) -> Result<UserRecord, RecordError> {
    let payload: UserPayload =
        serde_json::from_slice(body).map_err(|err| RecordError::InvalidShape(err.to_string()))?;
    UserRecord::try_from(payload)
}

pub fn parse_user_list(body: &[u8]) -> Result<Vec<UserRecord>, RecordError> {
    let payloads: Vec<UserPayload> =
        serde_json::from_slice(body).map_err(|err| RecordError::InvalidShape(err.to_string()))?;

    let mut seen = HashSet::with_capacity(payloads.len());
    let mut records = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let record = UserRecord::try_from(payload)?;
        if !seen.insert(record.id.clone()) {
            return Err(RecordError::DuplicateId(record.id));
        }
        records.push(record);
    }
    Ok(records)
}
