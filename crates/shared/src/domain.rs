use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecordError;

/// Server-assigned identity of a user record.
///
/// Servers disagree on whether ids are numbers or strings, so the id is kept
/// as its canonical text form and compared as such.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Result<Self, RecordError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(RecordError::EmptyId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for UserId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(value) => Ok(UserId::from(value)),
            RawId::Unsigned(value) => Ok(UserId(value.to_string())),
            RawId::Float(value) => Ok(UserId(value.to_string())),
            RawId::Text(value) => UserId::new(value).map_err(serde::de::Error::custom),
        }
    }
}

/// A user record as confirmed by a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl UserRecord {
    /// Link target for the stored website, which never carries a scheme.
    pub fn website_url(&self) -> String {
        format!("http://{}", self.website)
    }

    /// Owned copy for the form buffer; later draft edits never touch `self`.
    pub fn to_draft(&self) -> DraftRecord {
        DraftRecord {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
        }
    }
}

/// The form's pending buffer. Carries an id only when it was copied from a
/// stored record for editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl DraftRecord {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
            && self.website.is_empty()
    }

    pub fn set(&mut self, field: UserField, value: impl Into<String>) {
        let value = value.into();
        match field {
            UserField::Name => self.name = value,
            UserField::Email => self.email = value,
            UserField::Phone => self.phone = value,
            UserField::Website => self.website = value,
        }
    }

    pub fn get(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Email => &self.email,
            UserField::Phone => &self.phone,
            UserField::Website => &self.website,
        }
    }
}

/// Editable fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Name,
    Email,
    Phone,
    Website,
}

impl UserField {
    pub fn as_str(self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Phone => "phone",
            UserField::Website => "website",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for UserField {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(UserField::Name),
            "email" => Ok(UserField::Email),
            "phone" => Ok(UserField::Phone),
            "website" => Ok(UserField::Website),
            other => Err(RecordError::UnknownField(other.to_string())),
        }
    }
}

/// Strips a leading `http://` or `https://` so websites are stored bare.
pub fn strip_website_scheme(website: &str) -> &str {
    let trimmed = website.trim();
    let lower = trimmed.to_ascii_lowercase();
    for scheme in ["https://", "http://"] {
        if lower.starts_with(scheme) {
            return &trimmed[scheme.len()..];
        }
    }
    trimmed
}
