//! Manifest retrieval.
//!
//! [`ManifestFetcher`] rewrites a [`TrustUri`] to its well-known manifest
//! URL, issues one GET through a [`ManifestTransport`] and bounds it with a
//! timeout. When the timeout fires the transport future is dropped, which
//! cancels the in-flight request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::error::{Result, TrustError};
use crate::manifest::{self, TrustManifest};
use crate::uri::TrustUri;

/// Default manifest fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

/// Something that can GET a URL and return its body as text.
///
/// Implementations map non-success statuses to `TrustError::HttpStatus` and
/// other failures to `TrustError::TransportError`.
#[async_trait]
pub trait ManifestTransport: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport sending `user_agent` with every request.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::TransportError` if the HTTP client cannot be
    /// constructed.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TrustError::TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ManifestTransport for HttpTransport {
    async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TrustError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrustError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TrustError::TransportError(e.to_string()))
    }
}

/// A manifest together with the URL it was fetched from.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub url: Url,
    pub manifest: TrustManifest,
}

impl FetchedManifest {
    /// Host of the manifest URL.
    pub fn domain(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// Resolves Trust URIs to parsed manifests.
#[derive(Clone)]
pub struct ManifestFetcher {
    transport: Arc<dyn ManifestTransport>,
    timeout: Duration,
}

impl ManifestFetcher {
    pub fn new(transport: Arc<dyn ManifestTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and parse the manifest a raw Trust URI points at.
    ///
    /// # Errors
    ///
    /// `TrustError::InvalidUri` before any network access if `trust_uri` is
    /// not a Trust URI; otherwise see [`ManifestFetcher::fetch`].
    pub async fn resolve_manifest(&self, trust_uri: &str) -> Result<FetchedManifest> {
        let uri = TrustUri::parse(trust_uri)?;
        self.fetch(&uri).await
    }

    /// Fetch and parse the manifest for an already parsed URI.
    ///
    /// # Errors
    ///
    /// `TrustError::Timeout` if the GET does not finish within the timeout,
    /// `TrustError::HttpStatus` for non-success responses, and
    /// `TrustError::TransportError` for everything else on the wire.
    pub async fn fetch(&self, uri: &TrustUri) -> Result<FetchedManifest> {
        let url = uri.manifest_url()?;
        debug!("fetching manifest {url} for {uri}");

        let body = match tokio::time::timeout(self.timeout, self.transport.get_text(&url)).await {
            Ok(result) => result?,
            Err(_) => {
                debug!("manifest fetch for {uri} timed out");
                return Err(TrustError::Timeout(self.timeout.as_millis() as u64));
            }
        };

        let manifest = manifest::parse(&body);
        debug!(
            "manifest {url} parsed with {} entries",
            manifest.entry_count()
        );
        Ok(FetchedManifest { url, manifest })
    }
}
