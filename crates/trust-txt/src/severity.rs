//! Result-severity reduction for presentation.

use serde::{Deserialize, Serialize};

use crate::result::ValidationFinding;

pub const STATUS_FOUND: &str = "found";
pub const STATUS_NOT_FOUND: &str = "not found";
pub const STATUS_ERROR: &str = "error";

/// Three-way classification of a list of per-source statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No source confirmed the page.
    Invalid,
    /// At least one source confirmed and none disagreed.
    Checkmark,
    /// Confirmed by some sources, contradicted or failed on others.
    Warning,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Invalid => "✗",
            Severity::Checkmark => "✓",
            Severity::Warning => "!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Severity::Invalid => "Not verified",
            Severity::Checkmark => "Verified",
            Severity::Warning => "Partially verified",
        }
    }
}

/// Reduce findings to a [`Severity`].
pub fn severity(list: &[ValidationFinding]) -> Severity {
    severity_of(list.iter().map(|f| f.status.as_str()))
}

/// Reduce raw status strings to a [`Severity`].
pub fn severity_of<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Severity {
    let (mut found, mut problem) = (false, false);
    for status in statuses {
        match status {
            STATUS_FOUND => found = true,
            STATUS_NOT_FOUND | STATUS_ERROR => problem = true,
            _ => {}
        }
    }
    match (found, problem) {
        (false, _) => Severity::Invalid,
        (true, false) => Severity::Checkmark,
        (true, true) => Severity::Warning,
    }
}
