//! Resolver configuration.
//!
//! Configuration is a JSON file whose fields are all optional:
//!
//! ```json
//! {
//!   "fetch_timeout_ms": 5000,
//!   "validator_url": "https://validator.example/validate",
//!   "validator_timeout_ms": 5000,
//!   "validator_failure": "empty_list",
//!   "user_agent": "trust-txt/0.3.0"
//! }
//! ```
//!
//! Environment variables `TRUSTTXT_FETCH_TIMEOUT_MS` and
//! `TRUSTTXT_VALIDATOR_URL` override file values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::fetch::DEFAULT_FETCH_TIMEOUT_MS;
use crate::validator::ValidatorFailurePolicy;

pub const DEFAULT_VALIDATOR_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_USER_AGENT: &str = concat!("trust-txt/", env!("CARGO_PKG_VERSION"));

pub const ENV_FETCH_TIMEOUT_MS: &str = "TRUSTTXT_FETCH_TIMEOUT_MS";
pub const ENV_VALIDATOR_URL: &str = "TRUSTTXT_VALIDATOR_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub fetch_timeout_ms: u64,
    pub validator_url: Option<String>,
    pub validator_timeout_ms: u64,
    pub validator_failure: ValidatorFailurePolicy,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            validator_url: None,
            validator_timeout_ms: DEFAULT_VALIDATOR_TIMEOUT_MS,
            validator_failure: ValidatorFailurePolicy::EmptyList,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` if the file cannot be read and
    /// `TrustError::Config` if it is not valid configuration JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| TrustError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Config` if `TRUSTTXT_FETCH_TIMEOUT_MS` is not a
    /// positive integer.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_FETCH_TIMEOUT_MS) {
            self.fetch_timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| TrustError::Config(format!("{ENV_FETCH_TIMEOUT_MS}={raw}")))?;
        }
        if let Ok(url) = std::env::var(ENV_VALIDATOR_URL) {
            let url = url.trim();
            self.validator_url = (!url.is_empty()).then(|| url.to_string());
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(TrustError::Config("fetch_timeout_ms must be > 0".into()));
        }
        if self.validator_timeout_ms == 0 {
            return Err(TrustError::Config("validator_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn validator_timeout(&self) -> Duration {
        Duration::from_millis(self.validator_timeout_ms)
    }
}
