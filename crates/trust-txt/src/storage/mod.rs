//! Storage layer for session results and settings.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.trusttxt/`:
//!
//! ```text
//! ~/.trusttxt/
//! ├── config.json
//! ├── settings.json
//! └── session/
//!     └── trust_results.json
//! ```
//!
//! # Modules
//!
//! - [`session_store`]: the `trustResults` object for the current session.
//! - [`settings_store`]: persistent settings such as the auto-scan flag.

pub mod session_store;
pub mod settings_store;

pub use session_store::{PageResults, SessionResults, SessionStore};
pub use settings_store::{Settings, SettingsStore};
