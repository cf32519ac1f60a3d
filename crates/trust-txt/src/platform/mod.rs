//! Platform canonicalization registry.
//!
//! Social account URLs come in many shapes (`twitter.com/acme`,
//! `x.com/Acme?s=20`, `youtube.com/@acme`). A [`Platform`] recognizes the
//! URLs it owns and reduces them to an account handle so that two URLs for
//! the same account compare equal. URLs no registered platform owns are
//! handled by [`DefaultPlatform`], which compares base URLs literally.

pub mod builtin;

use url::Url;

pub use builtin::{HandleRule, SocialPlatform};

/// A social platform able to canonicalize its account URLs.
pub trait Platform: Send + Sync {
    /// Display name, e.g. `"Twitter"`. Empty for the fallback platform.
    fn name(&self) -> &str;

    /// Does this platform own `url`'s host?
    fn owns(&self, url: &Url) -> bool;

    /// Reduce an account URL to its handle, or `None` if `url` is not an
    /// account URL on this platform.
    fn canonicalize(&self, url: &Url) -> Option<String>;

    /// True if `url` is an account URL on this platform.
    fn is_valid_account_url(&self, url: &Url) -> bool {
        self.canonicalize(url).is_some()
    }

    /// Do two URLs identify the same account on this platform?
    ///
    /// Handles compare case-insensitively.
    fn same_account(&self, a: &Url, b: &Url) -> bool {
        match (self.canonicalize(a), self.canonicalize(b)) {
            (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => false,
        }
    }

    /// True only for the fallback implementation.
    fn is_fallback(&self) -> bool {
        false
    }
}

/// Fallback for unrecognized platforms: base-URL equality.
///
/// The "handle" is the URL's base form (origin + path, no query, no
/// fragment, no trailing slash).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPlatform;

impl Platform for DefaultPlatform {
    fn name(&self) -> &str {
        ""
    }

    fn owns(&self, _url: &Url) -> bool {
        true
    }

    fn canonicalize(&self, url: &Url) -> Option<String> {
        Some(base_url(url))
    }

    fn same_account(&self, a: &Url, b: &Url) -> bool {
        base_url(a) == base_url(b)
    }

    fn is_fallback(&self) -> bool {
        true
    }
}

/// Ordered set of known platforms plus the fallback.
pub struct PlatformRegistry {
    platforms: Vec<Box<dyn Platform>>,
    fallback: DefaultPlatform,
}

impl PlatformRegistry {
    /// A registry with no known platforms; everything uses the fallback.
    pub fn empty() -> Self {
        Self {
            platforms: Vec::new(),
            fallback: DefaultPlatform,
        }
    }

    /// A registry preloaded with [`builtin::builtin_platforms`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for platform in builtin::builtin_platforms() {
            registry.register(Box::new(platform));
        }
        registry
    }

    /// Add a platform. Earlier registrations win when hosts overlap.
    pub fn register(&mut self, platform: Box<dyn Platform>) {
        self.platforms.push(platform);
    }

    /// The platform owning `url`, or the fallback.
    pub fn platform_for(&self, url: &Url) -> &dyn Platform {
        self.platforms
            .iter()
            .find(|p| p.owns(url))
            .map(|p| p.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Display names of the registered platforms, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Origin plus path, with query, fragment and trailing slash removed.
pub fn base_url(url: &Url) -> String {
    let origin = url.origin().ascii_serialization();
    let path = url.path().trim_end_matches('/');
    format!("{origin}{path}")
}

/// [`base_url`] for raw strings; unparseable input is cut at `?`/`#`.
pub fn base_url_str(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => base_url(&url),
        Err(_) => raw
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string(),
    }
}

/// Lower-cased host with a leading `www.`, `m.` or `mobile.` removed.
pub(crate) fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let bare = ["www.", "m.", "mobile."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(&host)
        .to_string();
    Some(bare)
}
