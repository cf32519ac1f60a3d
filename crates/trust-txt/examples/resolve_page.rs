//! Resolve Page: find Trust URIs on a page and check each against its
//! organization's trust.txt.
//!
//! Run offline against a built-in manifest:
//!   cargo run --example resolve_page -p trust-txt
//!
//! Or resolve live over HTTPS:
//!   cargo run --example resolve_page -p trust-txt -- https://twitter.com/acme trust://acme.example!

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use trust_txt::{
    find_trust_uris, parse, ManifestFetcher, ManifestTransport, MatchingEngine, NoValidator,
    ResolverConfig, ResultCache, TrustError, TrustResolver,
};

const DEMO_MANIFEST: &str = "\
# trust.txt for acme.example
belongto=https://federation.example/
member=example.org
social=https://twitter.com/acme
social=https://www.youtube.com/@acme
contact=mailto:trust@acme.example
datatrainingallowed=no
";

/// Serves [`DEMO_MANIFEST`] for acme.example so the example runs offline.
struct DemoTransport;

#[async_trait]
impl ManifestTransport for DemoTransport {
    async fn get_text(&self, url: &Url) -> trust_txt::Result<String> {
        match url.host_str() {
            Some("acme.example") => Ok(DEMO_MANIFEST.to_string()),
            _ => Err(TrustError::HttpStatus(404)),
        }
    }
}

#[tokio::main]
async fn main() -> trust_txt::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [page_url, trust_uri] = args.as_slice() {
        // ── Live mode ───────────────────────────────────────────────────────
        let engine = MatchingEngine::from_config(&ResolverConfig::default().apply_env()?)?;
        let result = engine.resolve(page_url, trust_uri).await;
        println!("{} {}", result.severity().icon(), result.summary());
        println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
        return Ok(());
    }

    // ── 1. Parse a manifest ─────────────────────────────────────────────────
    //
    // Parsing never fails; unknown lines would only produce warnings.
    let manifest = parse(DEMO_MANIFEST);
    println!("Manifest for acme.example");
    println!("  Entries:        {}", manifest.entry_count());
    println!("  Social:         {}", manifest.social.join(", "));
    println!("  Data training:  {}", manifest.data_training_allowed);
    println!();

    // ── 2. Discover Trust URIs in page content ──────────────────────────────
    let page_text = "<p>Official. trust://acme.example!</p><p>Also trust://other.example!</p>";
    let uris = find_trust_uris(page_text);
    println!("Found {} Trust URI(s)", uris.len());
    for uri in &uris {
        println!("  {uri} -> {}", uri.manifest_url()?);
    }
    println!();

    // ── 3. Resolve them for a few pages ─────────────────────────────────────
    //
    // The resolver shares one cache; the second pass is served from it.
    let engine = MatchingEngine::new(
        ManifestFetcher::new(Arc::new(DemoTransport), Duration::from_secs(5)),
        Arc::new(NoValidator),
    );
    let resolver = TrustResolver::new(engine, Arc::new(ResultCache::in_memory()));

    for page in [
        "https://twitter.com/acme",
        "https://www.youtube.com/@ACME/videos",
        "https://blog.example.org/post",
        "https://twitter.com/impostor",
    ] {
        println!("Page {page}");
        for entry in resolver.scan_page(page, page_text).await {
            println!(
                "  {} {:<24} {}",
                entry.severity.icon(),
                entry.trust_uri,
                entry.result.summary()
            );
        }
    }
    println!();

    let again = resolver
        .resolve_entry("https://twitter.com/acme", "trust://acme.example!", false)
        .await;
    println!("Cached lookup: cached={} -> {}", again.cached, again.result.kind());
    Ok(())
}
