//! trust-txt: resolve `trust://` URIs against published `trust.txt`
//! manifests.
//!
//! Given the URL of a page and a Trust URI found on it, the engine fetches
//! the named domain's manifest, parses it, and decides whether the page is a
//! listed account of that organization. Results are kept in a session
//! cache shared by every concurrent caller.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod platform;
pub mod resolver;
pub mod result;
pub mod severity;
pub mod storage;
pub mod uri;
pub mod validator;

// Re-export primary types
pub use cache::ResultCache;
pub use config::ResolverConfig;
pub use engine::MatchingEngine;
pub use error::{Result, TrustError};
pub use fetch::{FetchedManifest, HttpTransport, ManifestFetcher, ManifestTransport};
pub use manifest::{parse, Category, ParseWarning, TrustManifest};
pub use platform::{DefaultPlatform, Platform, PlatformRegistry};
pub use resolver::{ScanEntry, TrustResolver};
pub use result::{AccountMatch, ResolutionResult, ValidationFinding, MATCH_VERSION};
pub use severity::{severity, Severity};
pub use storage::{SessionStore, Settings, SettingsStore};
pub use uri::{contains_trust_uri, find_trust_uris, TrustUri};
pub use validator::{DelegatedValidator, HttpValidator, NoValidator, ValidatorFailurePolicy};
