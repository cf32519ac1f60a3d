//! `trust.txt` line parser.
//!
//! Parsing is a pure fold over lines into a [`TrustManifest`]. It never
//! fails: comment, blank and malformed lines are skipped, and unknown
//! variables are reported as [`ParseWarning`]s.

use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{Category, TrustManifest, DATA_TRAINING_VARIABLE};

/// A non-fatal anomaly found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    /// The lower-cased variable name that was not recognized.
    pub variable: String,
}

/// Parse manifest text, logging any warnings.
pub fn parse(text: &str) -> TrustManifest {
    let (manifest, warnings) = parse_with_warnings(text);
    for w in &warnings {
        warn!("trust.txt line {}: unknown variable '{}'", w.line, w.variable);
    }
    manifest
}

/// Parse manifest text and return the warnings alongside the record.
pub fn parse_with_warnings(text: &str) -> (TrustManifest, Vec<ParseWarning>) {
    text.lines().enumerate().fold(
        (TrustManifest::default(), Vec::new()),
        |(mut manifest, mut warnings), (idx, line)| {
            let Some((variable, value)) = split_line(line) else {
                return (manifest, warnings);
            };

            if let Some(category) = Category::from_variable(&variable) {
                manifest.entries_mut(category).push(value.to_string());
            } else if variable == DATA_TRAINING_VARIABLE {
                manifest.data_training_allowed = value.eq_ignore_ascii_case("yes");
            } else {
                warnings.push(ParseWarning {
                    line: idx + 1,
                    variable,
                });
            }
            (manifest, warnings)
        },
    )
}

/// Split one line into a lower-cased variable and a trimmed value.
///
/// Returns `None` for blank lines, comments, lines without `=`, and lines
/// whose variable or value is empty.
fn split_line(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (variable, value) = line.split_once('=')?;
    let variable = variable.trim().to_ascii_lowercase();
    let value = value.trim();
    if variable.is_empty() || value.is_empty() {
        return None;
    }
    Some((variable, value))
}
