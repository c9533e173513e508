//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `ENROLLMENT_*` environment variables and the optional
//! configuration file; the `enroll` binary applies its own flags on top.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_STORAGE_DIR: &str = ".enrollment-client";
const DEFAULT_USER_AGENT: &str = concat!("enrollment-client/", env!("CARGO_PKG_VERSION"));

/// Problems found while interpreting [`ClientSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The base URL does not parse or cannot carry paths.
    #[error("invalid base URL `{value}`: {message}")]
    InvalidBaseUrl {
        /// Offending value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A zero timeout would fail every request.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Configuration for the REST client and its durable session store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ENROLLMENT")]
pub struct ClientSettings {
    /// API root, including the `/api` prefix.
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Directory holding the persisted session.
    pub storage_dir: Option<PathBuf>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl ClientSettings {
    /// Parsed API root, falling back to [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the value is not an
    /// absolute URL that can carry paths.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let invalid = |message: String| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            message,
        };
        let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_owned()));
        }
        Ok(url)
    }

    /// Request timeout, falling back to [`DEFAULT_TIMEOUT_MS`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero value.
    pub fn timeout(&self) -> Result<Duration, SettingsError> {
        match self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS) {
            0 => Err(SettingsError::ZeroTimeout),
            millis => Ok(Duration::from_millis(millis)),
        }
    }

    /// Session directory, falling back to `.enrollment-client`.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}
