//! The one stateful object of the shelf: who is loaded, what their shelf
//! holds, what went wrong last, and which entry is selected.

use serde::Serialize;
use shelf_models::Entry;
use shelf_sources::{FeedError, FeedSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::cache::SessionCache;
use crate::selection::Selection;

/// Trimmed and lowercased; Letterboxd usernames are case-insensitive.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fetched from the network; number of entries.
    Fetched(usize),
    /// Served from a fresh cache.
    Cached(usize),
    /// A later load or clear started before this one finished. Nothing was applied.
    Superseded,
}

/// Read-only view for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub entries: Vec<Entry>,
    pub error: Option<String>,
    pub loading: bool,
    pub username: Option<String>,
    pub selected_id: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    username: Option<String>,
    entries: Vec<Entry>,
    error: Option<String>,
    loading: bool,
    selection: Selection,
}

/// Overlapping loads resolve as last call wins: every `load_user` and
/// `clear_user` takes a new generation, and a fetch only applies its result
/// if its generation is still the newest when it completes.
pub struct Session {
    source: Arc<dyn FeedSource>,
    cache: SessionCache,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl Session {
    pub fn new(source: Arc<dyn FeedSource>, cache: SessionCache) -> Self {
        Self {
            source,
            cache,
            state: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &dyn FeedSource {
        self.source.as_ref()
    }

    /// Rehydrate from the cache. Returns the number of entries restored; a
    /// stale cache still restores the username.
    pub fn restore(&self) -> usize {
        let restored = self.cache.restore();
        let mut state = self.lock();

        match restored {
            Some(cached) => {
                let count = cached.entries.len();
                info!(username = %cached.username, entries = count, "Restored cached shelf");
                state.username = Some(cached.username);
                state.entries = cached.entries;
                count
            }
            None => {
                state.username = self.cache.remembered_username();
                0
            }
        }
    }

    /// Load a member's shelf, from the cache when it is fresh.
    pub async fn load_user(&self, raw_username: &str) -> Result<LoadOutcome, FeedError> {
        self.load(raw_username, false).await
    }

    /// Load a member's shelf from the network regardless of the cache.
    pub async fn reload_user(&self, raw_username: &str) -> Result<LoadOutcome, FeedError> {
        self.load(raw_username, true).await
    }

    async fn load(&self, raw_username: &str, force: bool) -> Result<LoadOutcome, FeedError> {
        let username = normalize_username(raw_username);
        if username.is_empty() {
            self.lock().error = Some(FeedError::Validation.to_string());
            return Err(FeedError::Validation);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !force {
            if let Some(entries) = self.cache.load_fresh(&username) {
                let mut state = self.lock();
                if !self.is_current(generation) {
                    return Ok(LoadOutcome::Superseded);
                }
                let count = entries.len();
                debug!(username = %username, entries = count, "Serving shelf from cache");
                Self::apply(&mut state, username, entries);
                return Ok(LoadOutcome::Cached(count));
            }
        }

        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self.source.fetch_entries(&username).await;

        let mut state = self.lock();
        if !self.is_current(generation) {
            debug!(username = %username, generation, "Discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }
        state.loading = false;

        match result {
            Ok(entries) => {
                let count = entries.len();
                self.cache.store(&username, &entries);
                Self::apply(&mut state, username, entries);
                Ok(LoadOutcome::Fetched(count))
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Load failed, keeping previous shelf");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Forget the member: shelf, error, selection and cache.
    pub fn clear_user(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        *state = SessionState::default();
        self.cache.clear();
        info!("Cleared session");
    }

    /// Select `id`; returns whether it is on the current shelf. An absent id
    /// stays selected but resolves to no entry.
    pub fn select(&self, id: &str) -> bool {
        let mut state = self.lock();
        state.selection.select(id);
        state.selection.resolve(&state.entries).is_some()
    }

    pub fn select_index(&self, index: usize) -> bool {
        let mut state = self.lock();
        let SessionState { entries, selection, .. } = &mut *state;
        selection.select_by_index(entries, index)
    }

    pub fn deselect(&self) {
        self.lock().selection.deselect();
    }

    pub fn selected_entry(&self) -> Option<Entry> {
        let state = self.lock();
        state.selection.resolve(&state.entries).cloned()
    }

    /// Position of the selected entry, for palette keys of untitled entries.
    pub fn selected_index(&self) -> Option<usize> {
        let state = self.lock();
        state.selection.index_in(&state.entries)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            entries: state.entries.clone(),
            error: state.error.clone(),
            loading: state.loading,
            username: state.username.clone(),
            selected_id: state.selection.selected_id().map(str::to_string),
        }
    }

    fn apply(state: &mut SessionState, username: String, entries: Vec<Entry>) {
        if state.username.as_deref() != Some(username.as_str()) {
            state.selection.deselect();
        }
        state.username = Some(username);
        state.entries = entries;
        state.error = None;
        state.loading = false;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
