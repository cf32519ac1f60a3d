//! Delegated validation for same-domain self references.
//!
//! When a page lives on the very domain whose manifest it points at, the
//! manifest cannot vouch for it. The engine instead asks a remote
//! validation endpoint:
//!
//! ```text
//! POST https://<validator-host>/validate   {"url": "<page url>"}
//! 200  [{"status": "found", "domain": "...", "message": "..."}, ...]
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::result::ValidationFinding;

/// Remote validation capability.
///
/// Any failure is reported as `TrustError::DelegatedValidatorUnavailable`.
#[async_trait]
pub trait DelegatedValidator: Send + Sync {
    async fn validate(&self, page_url: &str) -> Result<Vec<ValidationFinding>>;
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    url: &'a str,
}

/// What to return when the validator cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorFailurePolicy {
    /// `Multiple { list: [] }`, which callers treat as a failed resolution.
    #[default]
    EmptyList,
    /// `Error { base_url, message }` carrying the failure reason.
    Error,
}

/// `reqwest`-backed validator posting to a fixed endpoint.
pub struct HttpValidator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpValidator {
    /// # Errors
    ///
    /// Returns `TrustError::Config` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TrustError::Config(format!("validator client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl DelegatedValidator for HttpValidator {
    async fn validate(&self, page_url: &str) -> Result<Vec<ValidationFinding>> {
        let unavailable = |e: reqwest::Error| TrustError::DelegatedValidatorUnavailable(e.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidateRequest { url: page_url })
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrustError::DelegatedValidatorUnavailable(format!(
                "HTTP status {}",
                status.as_u16()
            )));
        }

        response
            .json::<Vec<ValidationFinding>>()
            .await
            .map_err(unavailable)
    }
}

/// Validator used when no endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoValidator;

#[async_trait]
impl DelegatedValidator for NoValidator {
    async fn validate(&self, _page_url: &str) -> Result<Vec<ValidationFinding>> {
        Err(TrustError::DelegatedValidatorUnavailable(
            "no validator endpoint configured".to_string(),
        ))
    }
}
