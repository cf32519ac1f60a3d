//! Resolution outcomes.

use serde::{Deserialize, Serialize};

use crate::severity::{severity, Severity};

/// Protocol version string reported with every positive match.
pub const MATCH_VERSION: &str = "trust.txt-draft00";

/// Platform label used for matches found through `member` entries.
pub const MEMBER_PLATFORM: &str = "member";

/// The canonical identity extracted from a matched manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMatch {
    /// Platform display name; empty when the platform is unrecognized.
    pub platform: String,
    /// Canonical handle, or the raw entry URL for unrecognized platforms.
    pub account: String,
    /// The manifest entry that matched.
    pub url: String,
}

/// One finding returned by the delegated validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// `"found"`, `"not found"` or `"error"`.
    pub status: String,
    pub domain: String,
    pub message: String,
}

impl ValidationFinding {
    pub fn new(
        status: impl Into<String>,
        domain: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            domain: domain.into(),
            message: message.into(),
        }
    }
}

/// Outcome of resolving one (page URL, Trust URI) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolutionResult {
    /// The page is a listed account of the manifest's organization.
    Account {
        name: String,
        #[serde(rename = "baseUrl")]
        base_url: String,
        version: String,
        account: AccountMatch,
    },
    /// Same-domain case resolved by the delegated validator.
    Multiple { list: Vec<ValidationFinding> },
    /// Manifest fetched and parsed, no matching entry.
    NotFound {
        #[serde(rename = "baseUrl")]
        base_url: String,
    },
    /// Manifest unreachable or Trust URI invalid.
    Error {
        #[serde(rename = "baseUrl")]
        base_url: String,
        message: String,
    },
}

impl ResolutionResult {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionResult::Account { .. } => "account",
            ResolutionResult::Multiple { .. } => "multiple",
            ResolutionResult::NotFound { .. } => "notFound",
            ResolutionResult::Error { .. } => "error",
        }
    }

    /// True for a positive `Account` match, or a `Multiple` that reduces to
    /// [`Severity::Checkmark`].
    pub fn is_verified(&self) -> bool {
        match self {
            ResolutionResult::Account { .. } => true,
            ResolutionResult::Multiple { list } => severity(list) == Severity::Checkmark,
            ResolutionResult::NotFound { .. } | ResolutionResult::Error { .. } => false,
        }
    }

    /// Presentation severity. `Account` is a checkmark, `NotFound` and
    /// `Error` are invalid, `Multiple` is reduced from its findings.
    pub fn severity(&self) -> Severity {
        match self {
            ResolutionResult::Account { .. } => Severity::Checkmark,
            ResolutionResult::Multiple { list } => severity(list),
            ResolutionResult::NotFound { .. } | ResolutionResult::Error { .. } => Severity::Invalid,
        }
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        match self {
            ResolutionResult::Account {
                name,
                base_url,
                account,
                ..
            } => {
                if account.platform.is_empty() {
                    format!("Verified account {} listed by {base_url} ({name})", account.account)
                } else {
                    format!(
                        "Verified {} account {} listed by {base_url} ({name})",
                        account.platform, account.account
                    )
                }
            }
            ResolutionResult::Multiple { list } if list.is_empty() => {
                "Validation unavailable: no findings returned".to_string()
            }
            ResolutionResult::Multiple { list } => {
                let found = list.iter().filter(|f| f.status == "found").count();
                format!(
                    "{}: {found} of {} sources confirm this page",
                    severity(list).message(),
                    list.len()
                )
            }
            ResolutionResult::NotFound { base_url } => {
                format!("Not listed in the trust.txt of {base_url}")
            }
            ResolutionResult::Error { base_url, message } => {
                format!("Could not verify {base_url}: {message}")
            }
        }
    }
}
