use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "user_sync.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub primary_url: String,
    pub read_only_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_url: "http://localhost:5000/users".into(),
            read_only_url: "https://jsonplaceholder.typicode.com/users".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    primary_url: Option<String>,
    read_only_url: Option<String>,
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw, path);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            return;
        }
    };
    if let Some(v) = file_cfg.primary_url {
        settings.primary_url = v;
    }
    if let Some(v) = file_cfg.read_only_url {
        settings.read_only_url = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("USER_SYNC_PRIMARY_URL") {
        settings.primary_url = v;
    }
    if let Some(v) = lookup("APP__PRIMARY_URL") {
        settings.primary_url = v;
    }

    if let Some(v) = lookup("USER_SYNC_READ_ONLY_URL") {
        settings.read_only_url = v;
    }
    if let Some(v) = lookup("APP__READ_ONLY_URL") {
        settings.read_only_url = v;
    }
}
