//! `trust.txt` manifests: structured record and line parser.

pub mod parser;
pub mod types;

pub use parser::{parse, parse_with_warnings, ParseWarning};
pub use types::{Category, TrustManifest, DATA_TRAINING_VARIABLE};
