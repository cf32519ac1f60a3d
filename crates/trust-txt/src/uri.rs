//! `trust://` URI parsing and discovery.
//!
//! A Trust URI names a domain whose manifest should be consulted:
//!
//! ```text
//! trust://<domain>[/<path>][!]
//! ```
//!
//! The domain is one or more of `[a-zA-Z0-9.-]`. The optional path and the
//! trailing `!` terminator are kept for display but dropped when building the
//! manifest URL.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TrustError};

/// Scheme token every Trust URI starts with.
pub const TRUST_SCHEME: &str = "trust://";

/// Well-known location of the manifest on the named domain.
pub const WELL_KNOWN_PATH: &str = "/.well-known/trust.txt";

static TRUST_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"trust://[a-zA-Z0-9.\-]+(?:/[^!\s<]*)?!?").expect("trust uri regex is valid")
});

/// A parsed Trust URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrustUri {
    raw: String,
    domain: String,
    path: Option<String>,
}

impl TrustUri {
    /// Parse a Trust URI.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidUri` if the input does not start with
    /// `trust://` or the domain part is empty or contains characters outside
    /// `[a-zA-Z0-9.-]`.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let rest = raw
            .strip_prefix(TRUST_SCHEME)
            .ok_or_else(|| TrustError::InvalidUri(raw.to_string()))?;
        let rest = rest.strip_suffix('!').unwrap_or(rest);

        let (domain, path) = match rest.split_once('/') {
            Some((domain, path)) => {
                let path = path.trim_end_matches('/');
                (domain, (!path.is_empty()).then(|| path.to_string()))
            }
            None => (rest, None),
        };

        let valid_domain = !domain.is_empty()
            && domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid_domain {
            return Err(TrustError::InvalidUri(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            domain: domain.to_ascii_lowercase(),
            path,
        })
    }

    /// The URI exactly as it appeared in page text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lower-cased domain whose manifest is consulted.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Optional path segment after the domain, without slashes or terminator.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// HTTPS URL of the domain's `trust.txt` manifest.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidUri` if the domain does not form a valid
    /// host (for example `trust://..!`).
    pub fn manifest_url(&self) -> Result<Url> {
        let candidate = format!("https://{}{}", self.domain, WELL_KNOWN_PATH);
        Url::parse(&candidate).map_err(|e| TrustError::InvalidUri(format!("{}: {e}", self.raw)))
    }
}

impl fmt::Display for TrustUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for TrustUri {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TrustUri {
    type Error = TrustError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TrustUri> for String {
    fn from(uri: TrustUri) -> Self {
        uri.raw
    }
}

/// Does this unit of page content contain a Trust URI?
pub fn contains_trust_uri(text: &str) -> bool {
    TRUST_URI_REGEX.is_match(text)
}

/// Find every distinct Trust URI in `text`, in document order.
///
/// Matches whose domain does not parse are skipped.
pub fn find_trust_uris(text: &str) -> Vec<TrustUri> {
    let mut seen = HashSet::new();
    TRUST_URI_REGEX
        .find_iter(text)
        .filter_map(|m| TrustUri::parse(m.as_str()).ok())
        .filter(|uri| seen.insert(uri.raw.clone()))
        .collect()
}
