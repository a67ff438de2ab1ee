use std::fmt;

use shared::domain::UserId;
use thiserror::Error;
use url::Url;

/// Which collection a client instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSource {
    Primary,
    ReadOnly,
}

impl fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceSource::Primary => f.write_str("primary"),
            ResourceSource::ReadOnly => f.write_str("read_only"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {source_kind} base url '{url}': {reason}")]
    InvalidBaseUrl {
        source_kind: ResourceSource,
        url: String,
        reason: String,
    },
}

/// Location of one user collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    base_url: Url,
    source: ResourceSource,
}

impl ResourceConfig {
    pub fn new(base_url: &str, source: ResourceSource) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            source_kind: source,
            url: base_url.to_string(),
            reason,
        };

        let base_url = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }

        Ok(Self { base_url, source })
    }

    pub fn primary(base_url: &str) -> Result<Self, ConfigError> {
        Self::new(base_url, ResourceSource::Primary)
    }

    pub fn read_only(base_url: &str) -> Result<Self, ConfigError> {
        Self::new(base_url, ResourceSource::ReadOnly)
    }

    pub fn source(&self) -> ResourceSource {
        self.source
    }

    pub fn collection_url(&self) -> Url {
        self.base_url.clone()
    }

    /// `{base}/{id}`, with the id percent-encoded as a single path segment.
    pub fn item_url(&self, id: &UserId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}
