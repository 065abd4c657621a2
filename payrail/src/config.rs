//! Client configuration.
//!
//! A [`ClientConfig`] is captured once when a client is built; the dispatcher
//! derives its immutable default headers from it and never reads it again.
//!
//! # Environment Variables
//!
//! - `PAYRAIL_SECRET_KEY` - Secret API key (required)
//! - `PAYRAIL_API_BASE` - API origin (default: `https://api.stripe.com`)
//! - `PAYRAIL_API_VERSION` - Value for the API version pin header
//! - `PAYRAIL_TIMEOUT_SECS` - Per-request timeout in seconds

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the secret key.
pub const SECRET_KEY_ENV: &str = "PAYRAIL_SECRET_KEY";
/// Environment variable overriding the API origin.
pub const API_BASE_ENV: &str = "PAYRAIL_API_BASE";
/// Environment variable pinning the API version.
pub const API_VERSION_ENV: &str = "PAYRAIL_API_VERSION";
/// Environment variable setting the request timeout.
pub const TIMEOUT_SECS_ENV: &str = "PAYRAIL_TIMEOUT_SECS";

/// Settings for one API client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Secret API key, sent as a bearer credential.
    pub secret_key: String,

    /// API origin without the version segment.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API version pin. When unset, the account's default version applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Per-request timeout in seconds. When unset, the transport default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Value of the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base() -> String {
    ClientConfig::DEFAULT_API_BASE.to_owned()
}

fn default_user_agent() -> String {
    concat!("payrail/", env!("CARGO_PKG_VERSION")).to_owned()
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("secret_key", &redact(&self.secret_key))
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Key prefixes that carry no secret material.
const KEY_PREFIXES: [&str; 4] = ["sk_test_", "sk_live_", "rk_test_", "rk_live_"];

/// Keeps a known key prefix and hides everything else.
fn redact(key: &str) -> String {
    let prefix = KEY_PREFIXES
        .into_iter()
        .find(|prefix| key.starts_with(prefix))
        .unwrap_or_default();
    format!("{prefix}***")
}

impl ClientConfig {
    /// Default API origin.
    pub const DEFAULT_API_BASE: &'static str = "https://api.stripe.com";

    /// Creates a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: default_api_base(),
            api_version: None,
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }

    /// Overrides the API origin (useful against a mock server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Pins the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecretKey`] if `PAYRAIL_SECRET_KEY` is
    /// unset or empty, and [`ConfigError::InvalidTimeout`] if
    /// `PAYRAIL_TIMEOUT_SECS` is not an integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup(SECRET_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingSecretKey(SECRET_KEY_ENV))?;
        let mut config = Self::new(secret_key);

        if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.is_empty()) {
            config.api_base = base;
        }
        config.api_version = lookup(API_VERSION_ENV).filter(|v| !v.is_empty());
        if let Some(raw) = lookup(TIMEOUT_SECS_ENV).filter(|v| !v.is_empty()) {
            let parsed = raw.trim().parse::<u64>();
            let secs = parsed.map_err(|source| ConfigError::InvalidTimeout { value: raw, source })?;
            config.timeout_secs = Some(secs);
        }

        Ok(config)
    }
}
