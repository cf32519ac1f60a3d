//! Concurrency: many resolutions completing in arbitrary order must never
//! lose cache entries, in memory or on disk.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use trust_txt::{
    ManifestFetcher, ManifestTransport, MatchingEngine, NoValidator, ResolutionResult, ResultCache,
    SessionStore, TrustResolver,
};

/// Answers after a host-dependent delay so completions interleave.
struct JitterTransport;

#[async_trait]
impl ManifestTransport for JitterTransport {
    async fn get_text(&self, url: &Url) -> trust_txt::Result<String> {
        let host = url.host_str().unwrap_or_default();
        let jitter = host.bytes().map(u64::from).sum::<u64>() % 17;
        tokio::time::sleep(Duration::from_millis(jitter)).await;
        Ok(format!("member=https://{host}/\n"))
    }
}

fn resolver(cache: ResultCache) -> TrustResolver {
    let engine = MatchingEngine::new(
        ManifestFetcher::new(Arc::new(JitterTransport), Duration::from_secs(5)),
        Arc::new(NoValidator),
    );
    TrustResolver::new(engine, Arc::new(cache))
}

fn not_found(i: usize) -> ResolutionResult {
    ResolutionResult::NotFound {
        base_url: format!("trust://site{i}.example!"),
    }
}

#[test]
fn stress_50_threads_put_to_one_page() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(ResultCache::persistent(SessionStore::new(dir.path()).unwrap()).unwrap());

    let handles: Vec<_> = (0..50)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..20 {
                    let n = t * 20 + i;
                    cache
                        .put(
                            "https://page.example/",
                            &format!("trust://site{n}.example!"),
                            not_found(n),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cache.get("https://page.example/").len(), 1_000);
    let on_disk = SessionStore::new(dir.path()).unwrap().load().unwrap();
    assert_eq!(on_disk["https://page.example/"].len(), 1_000);
}

#[test]
fn stress_readers_and_writers_interleave() {
    let cache = Arc::new(ResultCache::in_memory());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..250 {
                    let n = t * 250 + i;
                    cache
                        .put(&format!("https://p{}.example/", n % 10), &format!("u{n}"), not_found(n))
                        .unwrap();
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..250 {
                    let now = cache.len();
                    assert!(now >= last, "cache shrank from {last} to {now}");
                    last = now;
                    let _ = cache.snapshot();
                }
            })
        })
        .collect();

    for h in writers.into_iter().chain(readers) {
        h.join().unwrap();
    }
    assert_eq!(cache.len(), 2_000);
    assert_eq!(cache.snapshot().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_refreshes_keep_every_uri() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResultCache::persistent(SessionStore::new(dir.path()).unwrap()).unwrap();
    let resolver = resolver(cache);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..200 {
        let resolver = resolver.clone();
        tasks.spawn(async move {
            resolver
                .refresh("https://page.example/", &format!("trust://site{i}.example!"))
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    assert_eq!(resolver.cache().get("https://page.example/").len(), 200);
    let on_disk = SessionStore::new(dir.path()).unwrap().load().unwrap();
    assert_eq!(on_disk["https://page.example/"].len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_duplicate_lookups_agree() {
    let resolver = resolver(ResultCache::in_memory());

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..64 {
        let resolver = resolver.clone();
        tasks.spawn(async move {
            resolver
                .lookup("https://shared.example/", "trust://shared.example!")
                .await
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap());
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(resolver.cache().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_scan_with_many_uris() {
    let resolver = resolver(ResultCache::in_memory());
    let text: String = (0..100)
        .map(|i| format!("<li>trust://org{i}.example!</li>\n"))
        .collect();

    let entries = resolver.scan_page("https://org42.example/about", &text).await;
    assert_eq!(entries.len(), 100);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.trust_uri, format!("trust://org{i}.example!"));
    }
    assert_eq!(resolver.cache().get("https://org42.example/about").len(), 100);
}
