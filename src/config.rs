//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::models::request::RequestStatus;
use crate::models::reviewer::ReviewerContext;
use crate::{AppError, Result};

/// Keychain service holding the API token.
const KEYRING_SERVICE: &str = "pinnacle-review";

/// Connection settings for the request API.
///
/// The bearer token is loaded at runtime from the OS keychain or the
/// environment, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `https://api.pinnacle.example`.
    pub base_url: String,
    /// Per-call timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Bearer token (populated at runtime; empty means anonymous).
    #[serde(skip)]
    pub token: String,
}

/// Review rules applied client-side before any decision is submitted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReviewConfig {
    /// Minimum trimmed length of a rejection reason.
    #[serde(default = "default_min_reason_len")]
    pub min_rejection_reason_len: usize,
    /// Status filter applied when listing without an explicit filter.
    #[serde(default)]
    pub default_status_filter: Option<RequestStatus>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_rejection_reason_len: default_min_reason_len(),
            default_status_filter: None,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_min_reason_len() -> usize {
    10
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Request API connectivity.
    pub api: ApiConfig,
    /// Signed-in reviewer.
    pub reviewer: ReviewerContext,
    /// Client-side review rules.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the API token from OS keychain with env-var fallback.
    ///
    /// Tries the `pinnacle-review` keyring service first, then the
    /// `PINNACLE_API_TOKEN` environment variable. A missing token leaves
    /// the client anonymous.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain task cannot be joined.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.api.token = load_credential("api_token", "PINNACLE_API_TOKEN")
            .await?
            .unwrap_or_default();
        if self.api.token.is_empty() {
            warn!("no api token found; requests will be sent anonymously");
        }
        Ok(())
    }

    /// Reviewer capability passed into the review workflow.
    #[must_use]
    pub fn reviewer_context(&self) -> ReviewerContext {
        self.reviewer.clone()
    }

    fn validate(&mut self) -> Result<()> {
        let base_url = self.api.base_url.trim().trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config(
                "api.base_url must start with http:// or https://".into(),
            ));
        }
        self.api.base_url = base_url;

        if self.api.timeout_seconds == 0 {
            return Err(AppError::Config(
                "api.timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.reviewer.roles.is_empty() {
            return Err(AppError::Config("reviewer.roles must not be empty".into()));
        }

        if self.review.min_rejection_reason_len == 0 {
            return Err(AppError::Config(
                "review.min_rejection_reason_len must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<Option<String>> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    Ok(env::var(env_key).ok().filter(|value| !value.is_empty()))
}
