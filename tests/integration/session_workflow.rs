//! Session workflow: scan a page, reopen the data directory, look up again,
//! toggle automatic scanning, end the session.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use trust_txt::{
    ManifestFetcher, ManifestTransport, MatchingEngine, NoValidator, ResultCache, SessionStore,
    Settings, SettingsStore, Severity, TrustError, TrustResolver,
};

const PAGE: &str = "https://twitter.com/acme";

const PAGE_TEXT: &str = r#"
<div class="bio">
  Official account. trust://acme.example!
  Partners: <span>trust://partner.example/</span>
  Again: trust://acme.example!
</div>
"#;

struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl ManifestTransport for CountingTransport {
    async fn get_text(&self, url: &Url) -> trust_txt::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match url.host_str() {
            Some("acme.example") => Ok("# acme\nsocial=https://twitter.com/acme\n".into()),
            Some("partner.example") => Ok("social=https://github.com/partner\n".into()),
            _ => Err(TrustError::TransportError("connection refused".into())),
        }
    }
}

fn open(dir: &Path, transport: Arc<CountingTransport>) -> TrustResolver {
    let engine = MatchingEngine::new(
        ManifestFetcher::new(transport, Duration::from_secs(5)),
        Arc::new(NoValidator),
    );
    let cache = ResultCache::persistent(SessionStore::new(dir).unwrap()).unwrap();
    TrustResolver::new(engine, Arc::new(cache)).with_settings(SettingsStore::new(dir).unwrap())
}

fn transport() -> Arc<CountingTransport> {
    Arc::new(CountingTransport {
        calls: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn scan_persist_reopen_and_clear() {
    let dir = tempfile::tempdir().unwrap();

    // 1. Scan: two distinct URIs, both fetched once.
    let first_transport = transport();
    let resolver = open(dir.path(), Arc::clone(&first_transport));
    let entries = resolver
        .auto_scan_page(PAGE, PAGE_TEXT)
        .await
        .unwrap()
        .expect("auto scan is on by default");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].trust_uri, "trust://acme.example!");
    assert_eq!(entries[0].severity, Severity::Checkmark);
    assert_eq!(entries[1].trust_uri, "trust://partner.example/");
    assert_eq!(entries[1].result.kind(), "notFound");
    assert_eq!(first_transport.calls.load(Ordering::SeqCst), 2);

    // 2. The session file holds both results under the page.
    let stored = SessionStore::new(dir.path()).unwrap().load().unwrap();
    assert_eq!(stored[PAGE].len(), 2);

    // 3. A new process over the same directory answers from the cache.
    let second_transport = transport();
    let reopened = open(dir.path(), Arc::clone(&second_transport));
    let cached = reopened.lookup(PAGE, "trust://acme.example!").await;
    assert_eq!(cached, entries[0].result);
    assert_eq!(second_transport.calls.load(Ordering::SeqCst), 0);

    // 4. Ending the session forces a fetch on the next lookup.
    reopened.cache().clear().unwrap();
    assert!(SessionStore::new(dir.path()).unwrap().load().unwrap().is_empty());
    reopened.lookup(PAGE, "trust://acme.example!").await;
    assert_eq!(second_transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auto_scan_setting_survives_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path()).unwrap();
    assert_eq!(settings.load().unwrap(), Settings::default());
    settings.set_auto_scan(false).unwrap();

    let t = transport();
    let resolver = open(dir.path(), Arc::clone(&t));
    assert!(resolver.auto_scan_page(PAGE, PAGE_TEXT).await.unwrap().is_none());

    // Explicit scans ignore the flag.
    let entries = resolver.scan_page(PAGE, PAGE_TEXT).await;
    assert_eq!(entries.len(), 2);

    // Clearing the session leaves settings alone.
    resolver.cache().clear().unwrap();
    assert!(!SettingsStore::new(dir.path()).unwrap().auto_scan().unwrap());
}

#[tokio::test]
async fn errors_are_cached_like_any_result() {
    let dir = tempfile::tempdir().unwrap();
    let t = transport();
    let resolver = open(dir.path(), Arc::clone(&t));

    let first = resolver.lookup(PAGE, "trust://down.example!").await;
    assert_eq!(first.kind(), "error");
    let second = resolver.lookup(PAGE, "trust://down.example!").await;
    assert_eq!(first, second);
    assert_eq!(t.calls.load(Ordering::SeqCst), 1);

    // A refresh retries the network.
    resolver.refresh(PAGE, "trust://down.example!").await;
    assert_eq!(t.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn corrupt_session_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path()).unwrap();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{not json").unwrap();
    assert!(ResultCache::persistent(store).is_err());
}
