//! Persistent user settings.
//!
//! Unlike the session store this file survives across sessions. It holds
//! the flag that enables automatic page scanning:
//!
//! ```json
//! { "version": 1, "autoScan": true }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

const SETTINGS_FILE_VERSION: u32 = 1;
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Scan pages for Trust URIs automatically.
    pub auto_scan: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { auto_scan: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    version: u32,
    #[serde(flatten)]
    settings: Settings,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    base_dir: PathBuf,
}

impl SettingsStore {
    /// # Errors
    ///
    /// Returns `TrustError::Io` if `base_dir` cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    /// Current settings; defaults when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidFileFormat` for a malformed file.
    pub fn load(&self) -> Result<Settings> {
        let path = self.path();
        if !path.exists() {
            return Ok(Settings::default());
        }
        let bytes = std::fs::read(&path)?;
        let file: SettingsFile = serde_json::from_slice(&bytes).map_err(|e| {
            TrustError::InvalidFileFormat(format!(
                "failed to parse settings file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.settings)
    }

    /// # Errors
    ///
    /// Returns `TrustError::SerializationError` or `TrustError::Io`.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let file = SettingsFile {
            version: SETTINGS_FILE_VERSION,
            settings: *settings,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TrustError::SerializationError(e.to_string()))?;
        std::fs::write(self.path(), json.as_bytes())?;
        Ok(())
    }

    pub fn auto_scan(&self) -> Result<bool> {
        Ok(self.load()?.auto_scan)
    }

    pub fn set_auto_scan(&self, enabled: bool) -> Result<()> {
        let mut settings = self.load()?;
        settings.auto_scan = enabled;
        self.save(&settings)
    }
}
