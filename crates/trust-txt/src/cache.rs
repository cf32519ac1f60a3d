//! Session result cache shared by every caller.
//!
//! All mutation goes through [`ResultCache::put`], which merges a single
//! `(page_url, trust_uri)` entry into the session map while holding the
//! cache lock, and writes the merged map through to the [`SessionStore`]
//! before releasing it. Concurrent puts for different keys therefore never
//! overwrite each other; puts for the same key are last-writer-wins.

use std::sync::{Mutex, MutexGuard};

use log::trace;

use crate::error::Result;
use crate::result::ResolutionResult;
use crate::storage::{PageResults, SessionResults, SessionStore};

pub struct ResultCache {
    state: Mutex<SessionResults>,
    store: Option<SessionStore>,
}

impl ResultCache {
    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(SessionResults::new()),
            store: None,
        }
    }

    /// A cache backed by `store`, seeded with whatever the session holds.
    ///
    /// # Errors
    ///
    /// Propagates `SessionStore::load` failures.
    pub fn persistent(store: SessionStore) -> Result<Self> {
        let existing = store.load()?;
        Ok(Self {
            state: Mutex::new(existing),
            store: Some(store),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionResults> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All results stored for `page_url`, keyed by Trust URI.
    pub fn get(&self, page_url: &str) -> PageResults {
        self.lock().get(page_url).cloned().unwrap_or_default()
    }

    /// The stored result for one key. `None` means never resolved, which is
    /// distinct from a stored `NotFound` or `Error`.
    pub fn lookup(&self, page_url: &str, trust_uri: &str) -> Option<ResolutionResult> {
        self.lock()
            .get(page_url)
            .and_then(|page| page.get(trust_uri))
            .cloned()
    }

    pub fn contains(&self, page_url: &str, trust_uri: &str) -> bool {
        self.lock()
            .get(page_url)
            .is_some_and(|page| page.contains_key(trust_uri))
    }

    /// Atomically upsert one entry.
    ///
    /// The in-memory map is updated even if writing through to the session
    /// store fails. With a session store attached this performs blocking file
    /// I/O under the cache lock; async callers go through
    /// [`TrustResolver::refresh`](crate::TrustResolver::refresh), which runs it
    /// on the blocking pool.
    ///
    /// # Errors
    ///
    /// Propagates `SessionStore::save` failures.
    pub fn put(&self, page_url: &str, trust_uri: &str, result: ResolutionResult) -> Result<()> {
        let mut state = self.lock();
        trace!("cache put {page_url} / {trust_uri}: {}", result.kind());
        state
            .entry(page_url.to_string())
            .or_default()
            .insert(trust_uri.to_string(), result);

        if let Some(store) = &self.store {
            store.save(&state)?;
        }
        Ok(())
    }

    /// Copy of the whole session.
    pub fn snapshot(&self) -> SessionResults {
        self.lock().clone()
    }

    /// Number of cached (page, Trust URI) entries.
    pub fn len(&self) -> usize {
        self.lock().values().map(|page| page.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and end the persisted session.
    ///
    /// # Errors
    ///
    /// Propagates `SessionStore::clear` failures.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        state.clear();
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::in_memory()
    }
}
