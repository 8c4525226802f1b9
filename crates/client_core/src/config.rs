//! Classifier endpoint settings: defaults, optional `dermascan.toml`, then environment.

use std::{fs, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const SETTINGS_FILE: &str = "dermascan.toml";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("classifier endpoint is not configured; set CLASSIFIER_API_URL")]
    MissingEndpoint,
    #[error("invalid classifier endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    pub endpoint: Url,
    pub request_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings(endpoint_override: Option<&str>) -> Result<ClassifierSettings, ConfigError> {
    let file_contents = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(
        file_contents.as_deref(),
        |key: &str| std::env::var(key).ok(),
        endpoint_override,
    )
}

/// Precedence, lowest first: file, `CLASSIFIER_API_URL`, `APP__CLASSIFIER_API_URL`, override.
pub fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    endpoint_override: Option<&str>,
) -> Result<ClassifierSettings, ConfigError> {
    let file_cfg = match file_contents {
        Some(raw) => toml::from_str::<FileSettings>(raw).unwrap_or_else(|err| {
            tracing::warn!("ignoring unreadable {SETTINGS_FILE}: {err}");
            FileSettings::default()
        }),
        None => FileSettings::default(),
    };

    let mut endpoint = file_cfg.endpoint;
    if let Some(v) = env("CLASSIFIER_API_URL") {
        endpoint = Some(v);
    }
    if let Some(v) = env("APP__CLASSIFIER_API_URL") {
        endpoint = Some(v);
    }
    if let Some(v) = endpoint_override {
        endpoint = Some(v.to_string());
    }

    let mut request_timeout = file_cfg
        .request_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(secs) => request_timeout = Duration::from_secs(secs),
            Err(_) => tracing::warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    let raw_endpoint = endpoint
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEndpoint)?;

    Ok(ClassifierSettings {
        endpoint: parse_endpoint(&raw_endpoint)?,
        request_timeout,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

impl ClassifierSettings {
    /// `{endpoint}/predict`, tolerating a trailing slash on the base URL.
    pub fn predict_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            shared::protocol::PREDICT_PATH
        )
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
