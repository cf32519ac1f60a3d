//! trust-txt service.
//!
//! A stdio process that page scanners and context-menu collaborators talk
//! to. Every request shares one resolver and therefore one session cache.
//!
//! # Protocol
//!
//! Newline-delimited JSON. A request is `{"id", "method", "params"}`; the
//! response echoes `id` and carries either `result` or
//! `error: {code, message}`. Requests without an `id` are notifications
//! and get no response. Requests are handled concurrently, so responses
//! may come back in a different order than the requests were sent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use trust_txt::{
    severity, MatchingEngine, ResolverConfig, ResultCache, SessionStore, SettingsStore,
    TrustResolver, ValidationFinding,
};

// ── Error codes ───────────────────────────────────────────────────────────────

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32000;

#[derive(Debug, thiserror::Error)]
enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    fn code(&self) -> i64 {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}

impl From<trust_txt::TrustError> for RpcError {
    fn from(e: trust_txt::TrustError) -> Self {
        Self::Internal(e.to_string())
    }
}

type RpcResult = Result<Value, RpcError>;

fn ok_response(id: Value, result: Value) -> Value {
    json!({ "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "id": id,
        "error": {
            "code": code,
            "message": message.into()
        }
    })
}

// ── Params ────────────────────────────────────────────────────────────────────

fn params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveParams {
    page_url: String,
    trust_uri: String,
    #[serde(default)]
    refresh: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanParams {
    page_url: String,
    text: String,
    /// Automatic scans honor the auto-scan setting; explicit ones do not.
    #[serde(default = "default_true")]
    auto: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultsParams {
    page_url: Option<String>,
}

#[derive(Deserialize)]
struct SeverityParams {
    list: Vec<ValidationFinding>,
}

#[derive(Deserialize)]
struct AutoScanParams {
    enabled: bool,
}

fn default_true() -> bool {
    true
}

// ── Service ───────────────────────────────────────────────────────────────────

struct TrustService {
    resolver: TrustResolver,
    settings: SettingsStore,
}

impl TrustService {
    fn new(engine: MatchingEngine, cache: ResultCache, settings: SettingsStore) -> Self {
        let resolver = TrustResolver::new(engine, Arc::new(cache)).with_settings(settings.clone());
        Self { resolver, settings }
    }

    /// Handle one decoded request. `None` for notifications.
    async fn handle_request(&self, request: Value) -> Option<Value> {
        let id = request.get("id").cloned();
        let outcome = self.dispatch(request).await;

        let id = id?;
        Some(match outcome {
            Ok(result) => ok_response(id, result),
            Err(e) => {
                warn!(code = e.code(), "request failed: {e}");
                error_response(id, e.code(), e.to_string())
            }
        })
    }

    async fn dispatch(&self, mut request: Value) -> RpcResult {
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RpcError::InvalidRequest("missing method".into()))?;
        let params = match request.get_mut("params") {
            Some(p) if !p.is_null() => p.take(),
            _ => Value::Object(Default::default()),
        };
        debug!(%method, "request");

        match method.as_str() {
            "ping" => Ok(json!({})),
            "resolve" => self.handle_resolve(params).await,
            "contextLookup" => self.handle_context_lookup(params).await,
            "scanPage" => self.handle_scan_page(params).await,
            "getResults" => self.handle_get_results(params),
            "severity" => self.handle_severity(params),
            "getSettings" => self.handle_get_settings(),
            "setAutoScan" => self.handle_set_auto_scan(params),
            "clearSession" => self.handle_clear_session(),
            other => Err(RpcError::MethodNotFound(other.to_string())),
        }
    }

    // ── resolve ───────────────────────────────────────────────────────────────

    async fn handle_resolve(&self, params: Value) -> RpcResult {
        let p: ResolveParams = self::params(params)?;
        let entry = self
            .resolver
            .resolve_entry(&p.page_url, &p.trust_uri, p.refresh)
            .await;
        to_value(&entry)
    }

    /// User-initiated lookup on a single link: always fetches again.
    async fn handle_context_lookup(&self, params: Value) -> RpcResult {
        let p: ResolveParams = self::params(params)?;
        let entry = self
            .resolver
            .resolve_entry(&p.page_url, &p.trust_uri, true)
            .await;
        Ok(json!({
            "entry": entry,
            "summary": entry.result.summary(),
        }))
    }

    // ── scanPage ──────────────────────────────────────────────────────────────

    async fn handle_scan_page(&self, params: Value) -> RpcResult {
        let p: ScanParams = self::params(params)?;
        let entries = if p.auto {
            self.resolver.auto_scan_page(&p.page_url, &p.text).await?
        } else {
            Some(self.resolver.scan_page(&p.page_url, &p.text).await)
        };

        Ok(match entries {
            Some(entries) => {
                info!(page = %p.page_url, found = entries.len(), "page scanned");
                json!({ "skipped": false, "entries": entries })
            }
            None => json!({ "skipped": true, "entries": [] }),
        })
    }

    // ── results and severity ──────────────────────────────────────────────────

    fn handle_get_results(&self, params: Value) -> RpcResult {
        let p: ResultsParams = self::params(params)?;
        match p.page_url {
            Some(page) => to_value(&self.resolver.cache().get(&page)),
            None => to_value(&self.resolver.cache().snapshot()),
        }
    }

    fn handle_severity(&self, params: Value) -> RpcResult {
        let p: SeverityParams = self::params(params)?;
        let s = severity(&p.list);
        Ok(json!({
            "severity": s,
            "icon": s.icon(),
            "message": s.message(),
        }))
    }

    // ── settings and session ──────────────────────────────────────────────────

    fn handle_get_settings(&self) -> RpcResult {
        to_value(&self.settings.load()?)
    }

    fn handle_set_auto_scan(&self, params: Value) -> RpcResult {
        let p: AutoScanParams = self::params(params)?;
        self.settings.set_auto_scan(p.enabled)?;
        info!(enabled = p.enabled, "auto scan changed");
        to_value(&self.settings.load()?)
    }

    fn handle_clear_session(&self) -> RpcResult {
        let cache = self.resolver.cache();
        let removed = cache.len();
        cache.clear()?;
        info!(removed, "session cleared");
        Ok(json!({ "removed": removed }))
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| RpcError::Internal(e.to_string()))
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "trust-txt-service", version, about = "trust-txt stdio service")]
struct Args {
    /// Directory holding config, settings and the session cache (default: ~/.trusttxt)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: <data-dir>/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn build_service(args: &Args) -> anyhow::Result<TrustService> {
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => {
            let home = std::env::var("HOME").context("HOME not set; pass --data-dir")?;
            PathBuf::from(home).join(".trusttxt")
        }
    };
    let config = match &args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::load_or_default(&data_dir.join("config.json"))?,
    }
    .apply_env()?;

    let engine = MatchingEngine::from_config(&config).context("failed to build resolver")?;
    let cache = ResultCache::persistent(SessionStore::new(&data_dir)?)
        .context("failed to load session cache")?;
    let settings = SettingsStore::new(&data_dir)?;
    Ok(TrustService::new(engine, cache, settings))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let service = Arc::new(build_service(&args)?);
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line = match serde_json::to_vec(&response) {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to encode response: {e}");
                    continue;
                }
            };
            line.push(b'\n');
            if let Err(e) = stdout.write_all(&line).await {
                warn!("failed to write response: {e}");
                break;
            }
            if let Err(e) = stdout.flush().await {
                warn!("failed to flush stdout: {e}");
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read error: {e}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(error_response(Value::Null, PARSE_ERROR, format!("parse error: {e}")));
                continue;
            }
        };

        let service = Arc::clone(&service);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = service.handle_request(request).await {
                let _ = tx.send(response);
            }
        });
    }

    // In-flight handlers hold their own senders; the writer drains them all.
    drop(tx);
    writer.await.context("response writer panicked")?;
    Ok(())
}
