//! `ttx`, the trust-txt command line.
//!
//! Resolves `trust://` URIs for a page, inspects `trust.txt` manifests, and
//! manages the session result cache and scanning settings.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use trust_txt::manifest::parse_with_warnings;
use trust_txt::severity::severity_of;
use trust_txt::{
    Category, MatchingEngine, ResolutionResult, ResolverConfig, ResultCache, ScanEntry,
    SessionStore, SettingsStore, TrustManifest, TrustResolver, TrustUri,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --data-dir")?;
    Ok(PathBuf::from(home).join(".trusttxt"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// trust-txt CLI: verify that a page is a listed account of the
/// organization named by a trust:// URI.
#[derive(Parser, Debug)]
#[command(
    name = "ttx",
    about = "trust-txt CLI",
    version,
    long_about = "ttx: trust-txt CLI\n\nResolve trust:// URIs against trust.txt manifests, inspect manifests,\nand manage the session result cache."
)]
struct Cli {
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (default: <data-dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding config, settings and the session cache (default: ~/.trusttxt)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Manifest fetch timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Delegated validator endpoint for same-domain pages
    #[arg(long, global = true)]
    validator_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one trust:// URI for a page
    Resolve {
        /// URL of the page the trust:// URI was found on
        page_url: String,

        /// The trust:// URI
        trust_uri: String,

        /// Ignore any cached result and fetch again
        #[arg(long)]
        fresh: bool,
    },

    /// Find and resolve every trust:// URI in a page's content
    Scan {
        /// URL of the scanned page
        #[arg(long)]
        page_url: String,

        /// File with page content (default: stdin)
        file: Option<PathBuf>,

        /// Behave like an automatic scan: do nothing if auto-scan is off
        #[arg(long)]
        auto: bool,
    },

    /// Fetch and display the manifest a trust:// URI points at
    Manifest {
        /// The trust:// URI
        trust_uri: String,
    },

    /// Parse a local trust.txt file
    Parse {
        /// Path to the manifest
        file: PathBuf,

        /// Print the normalized manifest text
        #[arg(long)]
        normalize: bool,
    },

    /// Inspect or clear the session result cache
    Cache {
        #[command(subcommand)]
        subcommand: CacheCommands,
    },

    /// Show or change persistent settings
    Settings {
        #[command(subcommand)]
        subcommand: SettingsCommands,
    },

    /// Reduce validator statuses ("found", "not found", "error") to a severity
    Severity {
        /// Status values
        statuses: Vec<String>,
    },

    /// List known social platforms
    Platforms,
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Show cached results
    Show {
        /// Only this page
        #[arg(long)]
        page_url: Option<String>,
    },
    /// End the session and drop all cached results
    Clear,
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Turn automatic page scanning on or off
    AutoScan {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

// ── Application context ───────────────────────────────────────────────────────

struct App {
    json: bool,
    verbose: bool,
    data_dir: PathBuf,
    config: ResolverConfig,
}

impl App {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };

        let mut config = match &cli.config {
            Some(path) => ResolverConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ResolverConfig::load_or_default(&data_dir.join("config.json"))
                .context("failed to load config")?,
        }
        .apply_env()
        .context("invalid environment configuration")?;

        if let Some(ms) = cli.timeout_ms {
            if ms == 0 {
                return Err(anyhow!("--timeout-ms must be > 0"));
            }
            config.fetch_timeout_ms = ms;
        }
        if let Some(url) = &cli.validator_url {
            config.validator_url = Some(url.clone());
        }

        log::debug!(
            "data dir {}, fetch timeout {} ms",
            data_dir.display(),
            config.fetch_timeout_ms
        );
        Ok(Self {
            json: cli.json,
            verbose: cli.verbose,
            data_dir,
            config,
        })
    }

    fn session_store(&self) -> Result<SessionStore> {
        SessionStore::new(&self.data_dir).context("failed to open session store")
    }

    fn settings_store(&self) -> Result<SettingsStore> {
        SettingsStore::new(&self.data_dir).context("failed to open settings store")
    }

    fn engine(&self) -> Result<MatchingEngine> {
        MatchingEngine::from_config(&self.config).context("failed to build resolver")
    }

    fn resolver(&self) -> Result<TrustResolver> {
        let cache = ResultCache::persistent(self.session_store()?)
            .context("failed to load session cache")?;
        Ok(TrustResolver::new(self.engine()?, Arc::new(cache)).with_settings(self.settings_store()?))
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match App::from_cli(&cli) {
        Ok(app) => run(&app, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Resolve {
            page_url,
            trust_uri,
            fresh,
        } => cmd_resolve(app, &page_url, &trust_uri, fresh).await,
        Commands::Scan {
            page_url,
            file,
            auto,
        } => cmd_scan(app, &page_url, file.as_deref(), auto).await,
        Commands::Manifest { trust_uri } => cmd_manifest(app, &trust_uri).await,
        Commands::Parse { file, normalize } => cmd_parse(app, &file, normalize),
        Commands::Cache { subcommand } => match subcommand {
            CacheCommands::Show { page_url } => cmd_cache_show(app, page_url.as_deref()),
            CacheCommands::Clear => cmd_cache_clear(app),
        },
        Commands::Settings { subcommand } => match subcommand {
            SettingsCommands::Show => cmd_settings_show(app),
            SettingsCommands::AutoScan { state } => {
                cmd_settings_auto_scan(app, matches!(state, Toggle::On))
            }
        },
        Commands::Severity { statuses } => cmd_severity(app, &statuses),
        Commands::Platforms => cmd_platforms(app),
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `ttx resolve PAGE_URL TRUST_URI [--fresh]`
async fn cmd_resolve(app: &App, page_url: &str, trust_uri: &str, fresh: bool) -> Result<()> {
    let resolver = app.resolver()?;
    let result = if fresh {
        resolver.refresh(page_url, trust_uri).await
    } else {
        resolver.lookup(page_url, trust_uri).await
    };

    if app.json {
        return app.print_json(&result);
    }
    print_result(trust_uri, &result, app.verbose);
    Ok(())
}

/// `ttx scan --page-url URL [FILE] [--auto]`
async fn cmd_scan(app: &App, page_url: &str, file: Option<&Path>, auto: bool) -> Result<()> {
    let text = read_input(file)?;
    let resolver = app.resolver()?;

    let entries: Vec<ScanEntry> = if auto {
        match resolver
            .auto_scan_page(page_url, &text)
            .await
            .context("failed to read settings")?
        {
            Some(entries) => entries,
            None => {
                if app.json {
                    return app.print_json(&serde_json::json!({ "skipped": true }));
                }
                println!("Automatic scanning is off; nothing scanned.");
                return Ok(());
            }
        }
    } else {
        resolver.scan_page(page_url, &text).await
    };

    if app.json {
        return app.print_json(&entries);
    }

    if entries.is_empty() {
        println!("No trust:// URIs found.");
        return Ok(());
    }
    println!("Found {} trust:// URI(s) on {page_url}:", entries.len());
    for entry in &entries {
        let source = if entry.cached { " (cached)" } else { "" };
        println!(
            "  {} {:<40} {}{}",
            entry.severity.icon(),
            entry.trust_uri,
            entry.result.summary(),
            source
        );
    }
    Ok(())
}

/// `ttx manifest TRUST_URI`
async fn cmd_manifest(app: &App, trust_uri: &str) -> Result<()> {
    let uri = TrustUri::parse(trust_uri)?;
    let engine = app.engine()?;
    let fetched = engine
        .fetcher()
        .fetch(&uri)
        .await
        .with_context(|| format!("failed to fetch manifest for {uri}"))?;

    if app.json {
        return app.print_json(&serde_json::json!({
            "url": fetched.url.as_str(),
            "manifest": fetched.manifest,
        }));
    }
    println!("Manifest {}", fetched.url);
    print_manifest(&fetched.manifest);
    Ok(())
}

/// `ttx parse FILE [--normalize]`
fn cmd_parse(app: &App, file: &Path, normalize: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let (manifest, warnings) = parse_with_warnings(&text);

    if app.json {
        return app.print_json(&serde_json::json!({
            "manifest": manifest,
            "warnings": warnings,
        }));
    }

    if normalize {
        print!("{}", manifest.to_text());
    } else {
        print_manifest(&manifest);
    }
    for w in &warnings {
        eprintln!("warning: line {}: unknown variable '{}'", w.line, w.variable);
    }
    Ok(())
}

/// `ttx cache show [--page-url URL]`
fn cmd_cache_show(app: &App, page_url: Option<&str>) -> Result<()> {
    let session = app.session_store()?.load().context("failed to load session")?;

    if app.json {
        return match page_url {
            Some(page) => app.print_json(&session.get(page).cloned().unwrap_or_default()),
            None => app.print_json(&session),
        };
    }

    let pages: Vec<_> = session
        .iter()
        .filter(|(page, _)| page_url.map_or(true, |p| p == page.as_str()))
        .collect();
    if pages.is_empty() {
        println!("(no cached results)");
        return Ok(());
    }
    for (page, results) in pages {
        println!("{page}");
        for (uri, result) in results {
            println!(
                "  {} {:<40} {}",
                result.severity().icon(),
                uri,
                result.summary()
            );
        }
    }
    Ok(())
}

/// `ttx cache clear`
fn cmd_cache_clear(app: &App) -> Result<()> {
    let store = app.session_store()?;
    let removed: usize = store
        .load()
        .context("failed to load session")?
        .values()
        .map(|p| p.len())
        .sum();
    store.clear().context("failed to clear session")?;

    if app.json {
        return app.print_json(&serde_json::json!({ "removed": removed }));
    }
    println!("Cleared {removed} cached result(s)");
    Ok(())
}

/// `ttx settings show`
fn cmd_settings_show(app: &App) -> Result<()> {
    let settings = app.settings_store()?.load().context("failed to load settings")?;
    if app.json {
        return app.print_json(&serde_json::json!({
            "settings": settings,
            "config": app.config,
        }));
    }
    println!("Settings");
    println!("  Auto scan:         {}", on_off(settings.auto_scan));
    println!("  Fetch timeout:     {} ms", app.config.fetch_timeout_ms);
    println!(
        "  Validator:         {}",
        app.config.validator_url.as_deref().unwrap_or("(none)")
    );
    println!("  Validator timeout: {} ms", app.config.validator_timeout_ms);
    println!("  Data directory:    {}", app.data_dir.display());
    Ok(())
}

/// `ttx settings auto-scan on|off`
fn cmd_settings_auto_scan(app: &App, enabled: bool) -> Result<()> {
    app.settings_store()?
        .set_auto_scan(enabled)
        .context("failed to save settings")?;
    if app.json {
        return app.print_json(&serde_json::json!({ "autoScan": enabled }));
    }
    println!("Automatic scanning {}", on_off(enabled));
    Ok(())
}

/// `ttx severity STATUS...`
fn cmd_severity(app: &App, statuses: &[String]) -> Result<()> {
    let severity = severity_of(statuses.iter().map(String::as_str));
    if app.json {
        return app.print_json(&severity);
    }
    println!("{} {}", severity.icon(), severity.message());
    Ok(())
}

/// `ttx platforms`
fn cmd_platforms(app: &App) -> Result<()> {
    let engine = app.engine()?;
    let names = engine.platforms().names();
    if app.json {
        return app.print_json(&names);
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn print_result(trust_uri: &str, result: &ResolutionResult, verbose: bool) {
    let severity = result.severity();
    println!("{} {}", severity.icon(), result.summary());

    match result {
        ResolutionResult::Account {
            name,
            base_url,
            version,
            account,
        } => {
            println!("  Organization: {name}");
            println!("  Manifest:     {base_url}");
            if !account.platform.is_empty() {
                println!("  Platform:     {}", account.platform);
            }
            println!("  Account:      {}", account.account);
            if verbose {
                println!("  Entry:        {}", account.url);
                println!("  Version:      {version}");
            }
        }
        ResolutionResult::Multiple { list } => {
            println!("  Severity:     {}", severity.message());
            for finding in list {
                println!(
                    "    - [{}] {} {}",
                    finding.status, finding.domain, finding.message
                );
            }
        }
        ResolutionResult::NotFound { .. } | ResolutionResult::Error { .. } => {
            if verbose {
                println!("  Trust URI:    {trust_uri}");
            }
        }
    }
}

fn print_manifest(manifest: &TrustManifest) {
    if manifest.is_empty() {
        println!("  (empty)");
        return;
    }
    for category in Category::ALL {
        let entries = manifest.entries(category);
        if entries.is_empty() {
            continue;
        }
        println!("  {} ({}):", category.variable(), entries.len());
        for entry in entries {
            println!("    - {entry}");
        }
    }
    println!("  datatrainingallowed: {}", manifest.data_training_allowed);
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
