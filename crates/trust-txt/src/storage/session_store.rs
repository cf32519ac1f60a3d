//! Session-scoped persistence of resolution results.
//!
//! The whole session is one JSON object under a single key, mirroring the
//! browser session storage layout the results originally lived in:
//!
//! ```text
//! {base_dir}/
//! └── session/
//!     └── trust_results.json
//! ```
//!
//! File format:
//! ```json
//! { "version": 1, "trustResults": { "<page url>": { "<trust uri>": { ...result... } } } }
//! ```
//!
//! The store does no locking of its own. [`ResultCache`](crate::cache::ResultCache)
//! is its single owner and serializes every write.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::result::ResolutionResult;

const SESSION_FILE_VERSION: u32 = 1;
const SESSION_DIR: &str = "session";
const SESSION_FILE: &str = "trust_results.json";

/// Trust URI → result, for one page.
pub type PageResults = BTreeMap<String, ResolutionResult>;

/// Page URL → [`PageResults`], for the whole session.
pub type SessionResults = BTreeMap<String, PageResults>;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    #[serde(rename = "trustResults", default)]
    trust_results: SessionResults,
}

/// Filesystem-backed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    base_dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at `base_dir`, creating `session/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(SESSION_DIR))?;
        Ok(Self { base_dir })
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(SESSION_DIR).join(SESSION_FILE)
    }

    /// Read the session. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidFileFormat` for malformed or
    /// future-versioned files, or `TrustError::Io` for filesystem errors.
    pub fn load(&self) -> Result<SessionResults> {
        let path = self.path();
        if !path.exists() {
            return Ok(SessionResults::new());
        }

        let bytes = std::fs::read(&path)?;
        let file: SessionFile = serde_json::from_slice(&bytes).map_err(|e| {
            TrustError::InvalidFileFormat(format!(
                "failed to parse session file {}: {e}",
                path.display()
            ))
        })?;

        if file.version > SESSION_FILE_VERSION {
            return Err(TrustError::InvalidFileFormat(format!(
                "unsupported session file version {}",
                file.version
            )));
        }
        Ok(file.trust_results)
    }

    /// Replace the stored session with `results`.
    ///
    /// Writes to a temporary file and renames it into place so readers
    /// never observe a half-written session.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::SerializationError` or `TrustError::Io`.
    pub fn save(&self, results: &SessionResults) -> Result<()> {
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            trust_results: results.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TrustError::SerializationError(e.to_string()))?;

        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// End the session by deleting its file.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::Io` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
