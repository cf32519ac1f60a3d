//! Cache-aware resolution service used by page scans and manual lookups.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::cache::ResultCache;
use crate::engine::MatchingEngine;
use crate::error::Result;
use crate::result::ResolutionResult;
use crate::severity::Severity;
use crate::storage::SettingsStore;
use crate::uri::find_trust_uris;

/// One Trust URI found on a page and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    pub trust_uri: String,
    pub result: ResolutionResult,
    pub severity: Severity,
    /// True when the result came from the session cache.
    pub cached: bool,
}

/// Matching engine plus the shared session cache.
///
/// Cloning is cheap; clones share the cache.
#[derive(Clone)]
pub struct TrustResolver {
    engine: MatchingEngine,
    cache: Arc<ResultCache>,
    settings: Option<SettingsStore>,
}

impl TrustResolver {
    pub fn new(engine: MatchingEngine, cache: Arc<ResultCache>) -> Self {
        Self {
            engine,
            cache,
            settings: None,
        }
    }

    /// Consult `settings` for the auto-scan flag in [`Self::auto_scan_page`].
    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Cached result if present, otherwise resolve and cache.
    pub async fn lookup(&self, page_url: &str, trust_uri: &str) -> ResolutionResult {
        self.lookup_entry(page_url, trust_uri).await.0
    }

    async fn lookup_entry(&self, page_url: &str, trust_uri: &str) -> (ResolutionResult, bool) {
        if let Some(hit) = self.cache.lookup(page_url, trust_uri) {
            debug!("cache hit {page_url} / {trust_uri}");
            return (hit, true);
        }
        (self.refresh(page_url, trust_uri).await, false)
    }

    /// [`Self::lookup`] or, with `fresh`, [`Self::refresh`], reported as a
    /// [`ScanEntry`].
    pub async fn resolve_entry(&self, page_url: &str, trust_uri: &str, fresh: bool) -> ScanEntry {
        let (result, cached) = if fresh {
            (self.refresh(page_url, trust_uri).await, false)
        } else {
            self.lookup_entry(page_url, trust_uri).await
        };
        ScanEntry {
            trust_uri: trust_uri.to_string(),
            severity: result.severity(),
            result,
            cached,
        }
    }

    /// Always resolve over the network, then upsert the cache.
    ///
    /// Concurrent refreshes of the same key are not deduplicated; the last
    /// one to finish owns the cache slot. The cache write, including any
    /// session file write-through, runs on the blocking pool.
    pub async fn refresh(&self, page_url: &str, trust_uri: &str) -> ResolutionResult {
        let result = self.engine.resolve(page_url, trust_uri).await;

        let cache = Arc::clone(&self.cache);
        let (page, uri, value) = (page_url.to_string(), trust_uri.to_string(), result.clone());
        match tokio::task::spawn_blocking(move || cache.put(&page, &uri, value)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to persist result for {page_url} / {trust_uri}: {e}"),
            Err(e) => warn!("cache write for {page_url} / {trust_uri} did not complete: {e}"),
        }
        result
    }

    /// Resolve every Trust URI found in `text` concurrently.
    ///
    /// Entries come back in document order.
    pub async fn scan_page(&self, page_url: &str, text: &str) -> Vec<ScanEntry> {
        let uris = find_trust_uris(text);
        debug!("scan of {page_url} found {} trust URIs", uris.len());

        let mut tasks = JoinSet::new();
        for (idx, uri) in uris.into_iter().enumerate() {
            let this = self.clone();
            let page_url = page_url.to_string();
            tasks.spawn(async move {
                let entry = this.resolve_entry(&page_url, uri.as_str(), false).await;
                (idx, entry)
            });
        }

        let mut entries = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("scan task for {page_url} aborted: {e}"),
            }
        }
        entries.sort_by_key(|(idx, _)| *idx);
        entries.into_iter().map(|(_, entry)| entry).collect()
    }

    /// [`Self::scan_page`] gated on the persistent auto-scan flag.
    ///
    /// Returns `Ok(None)` when automatic scanning is disabled. Without a
    /// settings store scanning is always enabled.
    ///
    /// # Errors
    ///
    /// Propagates settings read failures.
    pub async fn auto_scan_page(&self, page_url: &str, text: &str) -> Result<Option<Vec<ScanEntry>>> {
        if let Some(settings) = &self.settings {
            if !settings.auto_scan()? {
                debug!("auto scan disabled; skipping {page_url}");
                return Ok(None);
            }
        }
        Ok(Some(self.scan_page(page_url, text).await))
    }
}
