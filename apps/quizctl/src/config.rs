use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use quiz_forms::formset::DEFAULT_PREFIX;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "quizctl.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub session_id: Option<String>,
    pub formset_prefix: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            csrf_token: None,
            session_id: None,
            formset_prefix: DEFAULT_PREFIX.into(),
            log_filter: "info".into(),
        }
    }
}

/// Keys read from `quizctl.toml`. Anything else in the file is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
    pub session_id: Option<String>,
    pub formset_prefix: Option<String>,
    pub log_filter: Option<String>,
}

/// File values first, then environment overrides. Only a missing implicit
/// `quizctl.toml` is skipped; an explicit path must exist and every file
/// that is read must parse.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(file_cfg) = read_file_settings(config_path)? {
        apply_file_values(&mut settings, file_cfg);
    }

    if let Ok(v) = std::env::var("QUIZCTL_BASE_URL") {
        settings.base_url = v;
    }
    if let Ok(v) = std::env::var("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Ok(v) = std::env::var("QUIZCTL_CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Ok(v) = std::env::var("APP__CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }

    if let Ok(v) = std::env::var("QUIZCTL_SESSION_ID") {
        settings.session_id = Some(v);
    }

    if let Ok(v) = std::env::var("APP__FORMSET_PREFIX") {
        settings.formset_prefix = v;
    }

    if let Ok(v) = std::env::var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.base_url = normalize_base_url(&settings.base_url);
    Ok(settings)
}

fn read_file_settings(config_path: Option<&Path>) -> Result<Option<FileSettings>> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if config_path.is_none() && err.kind() == ErrorKind::NotFound => {
            return Ok(None)
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };
    let file_cfg = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    Ok(Some(file_cfg))
}

fn apply_file_values(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.csrf_token {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = file_cfg.session_id {
        settings.session_id = Some(v);
    }
    if let Some(v) = file_cfg.formset_prefix {
        settings.formset_prefix = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

pub fn normalize_base_url(raw_base_url: &str) -> String {
    let raw_base_url = raw_base_url.trim().trim_end_matches('/');

    if raw_base_url.is_empty() {
        return Settings::default().base_url;
    }

    if raw_base_url.contains("://") {
        return raw_base_url.to_string();
    }

    format!("http://{raw_base_url}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
