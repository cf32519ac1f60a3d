//! Matching engine: decides whether a page is a listed account.
//!
//! Resolution order for `resolve(page_url, trust_uri)`:
//! 1. Fetch and parse the manifest; any failure becomes `Error`.
//! 2. Same domain (page host without `www.` equals manifest host): ask the
//!    delegated validator and wrap its findings in `Multiple`.
//! 3. Otherwise the first `social` entry naming the same account wins,
//!    then any `member` entry containing the page domain, else `NotFound`.
//!
//! The engine holds no mutable state and can be shared across tasks.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use url::Url;

use crate::config::ResolverConfig;
use crate::error::{Result, TrustError};
use crate::fetch::{FetchedManifest, HttpTransport, ManifestFetcher, ManifestTransport};
use crate::manifest::TrustManifest;
use crate::platform::{base_url_str, PlatformRegistry};
use crate::result::{AccountMatch, ResolutionResult, MATCH_VERSION, MEMBER_PLATFORM};
use crate::validator::{DelegatedValidator, HttpValidator, NoValidator, ValidatorFailurePolicy};

// ── MatchingEngine ────────────────────────────────────────────────────────────

/// Stateless resolver for (page URL, Trust URI) pairs.
#[derive(Clone)]
pub struct MatchingEngine {
    fetcher: ManifestFetcher,
    validator: Arc<dyn DelegatedValidator>,
    validator_timeout: Duration,
    failure_policy: ValidatorFailurePolicy,
    platforms: Arc<PlatformRegistry>,
}

impl MatchingEngine {
    /// Engine with built-in platforms and default validator settings.
    pub fn new(fetcher: ManifestFetcher, validator: Arc<dyn DelegatedValidator>) -> Self {
        Self {
            fetcher,
            validator,
            validator_timeout: Duration::from_millis(crate::config::DEFAULT_VALIDATOR_TIMEOUT_MS),
            failure_policy: ValidatorFailurePolicy::default(),
            platforms: Arc::new(PlatformRegistry::with_builtins()),
        }
    }

    /// Engine wired to the network according to `config`.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::TransportError` or `TrustError::Config` if an
    /// HTTP client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let transport: Arc<dyn ManifestTransport> = Arc::new(HttpTransport::new(&config.user_agent)?);
        let validator: Arc<dyn DelegatedValidator> = match &config.validator_url {
            Some(endpoint) => Arc::new(HttpValidator::new(
                endpoint.clone(),
                &config.user_agent,
                config.validator_timeout(),
            )?),
            None => Arc::new(NoValidator),
        };
        Ok(
            Self::new(ManifestFetcher::new(transport, config.fetch_timeout()), validator)
                .with_validator_timeout(config.validator_timeout())
                .with_failure_policy(config.validator_failure),
        )
    }

    pub fn with_platforms(mut self, platforms: PlatformRegistry) -> Self {
        self.platforms = Arc::new(platforms);
        self
    }

    pub fn with_validator_timeout(mut self, timeout: Duration) -> Self {
        self.validator_timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: ValidatorFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    pub fn fetcher(&self) -> &ManifestFetcher {
        &self.fetcher
    }

    /// Resolve one pair. Never fails: every failure is an `Error` result.
    pub async fn resolve(&self, page_url: &str, trust_uri: &str) -> ResolutionResult {
        let fetched = match self.fetcher.resolve_manifest(trust_uri).await {
            Ok(fetched) => fetched,
            Err(e) => {
                debug!("resolution of {trust_uri} for {page_url} failed: {e}");
                return ResolutionResult::Error {
                    base_url: trust_uri.to_string(),
                    message: e.to_string(),
                };
            }
        };

        let page_domain = page_domain(page_url);
        if page_domain.as_deref() == Some(fetched.domain()) {
            return self.resolve_same_domain(page_url, trust_uri).await;
        }

        match_cross_domain(
            page_url,
            page_domain.as_deref(),
            trust_uri,
            &fetched,
            &self.platforms,
        )
    }

    async fn resolve_same_domain(&self, page_url: &str, trust_uri: &str) -> ResolutionResult {
        let outcome = match tokio::time::timeout(
            self.validator_timeout,
            self.validator.validate(page_url),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(TrustError::DelegatedValidatorUnavailable(format!(
                "timeout after {} ms",
                self.validator_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(list) => ResolutionResult::Multiple { list },
            Err(e) => {
                warn!("delegated validation of {page_url} failed: {e}");
                match self.failure_policy {
                    ValidatorFailurePolicy::EmptyList => ResolutionResult::Multiple { list: Vec::new() },
                    ValidatorFailurePolicy::Error => ResolutionResult::Error {
                        base_url: trust_uri.to_string(),
                        message: e.to_string(),
                    },
                }
            }
        }
    }
}

// ── Pure matching ─────────────────────────────────────────────────────────────

/// Hostname of `page_url` with a leading `www.` removed.
///
/// `None` if the URL does not parse or has no host.
pub fn page_domain(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Cross-domain matching against an already fetched manifest.
///
/// `page_domain` is `None` for unparseable page URLs, in which case only
/// exact base-URL social matches can succeed.
pub fn match_cross_domain(
    page_url: &str,
    page_domain: Option<&str>,
    trust_uri: &str,
    fetched: &FetchedManifest,
    platforms: &PlatformRegistry,
) -> ResolutionResult {
    let manifest_domain = fetched.domain();

    if let Some(account) = match_social(page_url, &fetched.manifest, platforms) {
        return ResolutionResult::Account {
            name: manifest_domain.to_string(),
            base_url: manifest_domain.to_string(),
            version: MATCH_VERSION.to_string(),
            account,
        };
    }

    if let Some(domain) = page_domain {
        if let Some(entry) = fetched
            .manifest
            .member
            .iter()
            .find(|entry| member_matches(entry, domain))
        {
            return ResolutionResult::Account {
                name: domain.to_string(),
                base_url: fetched.url.to_string(),
                version: MATCH_VERSION.to_string(),
                account: AccountMatch {
                    platform: MEMBER_PLATFORM.to_string(),
                    account: domain.to_string(),
                    url: entry.clone(),
                },
            };
        }
    }

    ResolutionResult::NotFound {
        base_url: trust_uri.to_string(),
    }
}

/// First `social` entry that names the same account as `page_url`.
pub fn match_social(
    page_url: &str,
    manifest: &TrustManifest,
    platforms: &PlatformRegistry,
) -> Option<AccountMatch> {
    let page = Url::parse(page_url.trim()).ok();

    for entry in &manifest.social {
        let Ok(entry_url) = Url::parse(entry.trim()) else {
            if base_url_str(entry) == base_url_str(page_url) {
                return Some(AccountMatch {
                    platform: String::new(),
                    account: entry.clone(),
                    url: entry.clone(),
                });
            }
            continue;
        };
        let Some(page) = page.as_ref() else {
            continue;
        };

        let platform = platforms.platform_for(&entry_url);
        if !platform.same_account(page, &entry_url) {
            continue;
        }

        let account = if platform.is_fallback() {
            entry.clone()
        } else {
            platform
                .canonicalize(&entry_url)
                .unwrap_or_else(|| entry.clone())
        };
        return Some(AccountMatch {
            platform: platform.name().to_string(),
            account,
            url: entry.clone(),
        });
    }
    None
}

/// Loose `member` containment.
///
/// Matches when the entry text contains the page domain as a substring
/// (`member=notexample.org` covers `example.org`), or when the page domain
/// is the entry's host or a subdomain of it (`member=example.org` covers
/// `sub.example.org`). The subdomain check is label-aligned, so
/// `example.org.attacker.net` and `evilexample.org` are not covered.
pub fn member_matches(entry: &str, page_domain: &str) -> bool {
    let entry = entry.trim().to_ascii_lowercase();
    if entry.is_empty() || page_domain.is_empty() {
        return false;
    }
    if entry.contains(page_domain) {
        return true;
    }
    let entry_host = Url::parse(&entry)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or(entry);
    let entry_host = entry_host.strip_prefix("www.").unwrap_or(&entry_host);
    !entry_host.is_empty()
        && (page_domain == entry_host
            || page_domain
                .strip_suffix(entry_host)
                .is_some_and(|prefix| prefix.ends_with('.')))
}
