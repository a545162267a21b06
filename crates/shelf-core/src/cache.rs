use chrono::{DateTime, Duration, Utc};
use shelf_config::{CacheConfig, KeyValueStore};
use shelf_models::Entry;
use std::sync::Arc;
use tracing::{debug, warn};

pub const USERNAME_KEY: &str = "cataboxd_username";
pub const ENTRIES_KEY: &str = "cataboxd_entries";
pub const FETCHED_AT_KEY: &str = "cataboxd_fetched_at";

/// What a previous run left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSession {
    pub username: String,
    pub entries: Vec<Entry>,
    pub fetched_at: DateTime<Utc>,
}

/// Last loaded shelf, persisted in a key-value store and honored for a
/// limited freshness window.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
    freshness: Duration,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>, freshness: std::time::Duration) -> Self {
        let freshness = Duration::from_std(freshness).unwrap_or_else(|_| Duration::seconds(0));
        Self { store, freshness }
    }

    pub fn from_config(config: &CacheConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, config.freshness())
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn store(&self, username: &str, entries: &[Entry]) {
        self.store_at(username, entries, Utc::now());
    }

    pub fn store_at(&self, username: &str, entries: &[Entry], fetched_at: DateTime<Utc>) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(username = %username, error = %e, "Failed to serialize shelf for cache");
                return;
            }
        };

        self.put(USERNAME_KEY, username);
        self.put(ENTRIES_KEY, &json);
        self.put(FETCHED_AT_KEY, &fetched_at.to_rfc3339());
        debug!(username = %username, entries = entries.len(), "Cached shelf");
    }

    /// Username remembered from the last successful load, fresh or not.
    pub fn remembered_username(&self) -> Option<String> {
        self.store.get(USERNAME_KEY).filter(|name| !name.is_empty())
    }

    /// Cached entries for `username` if they are still inside the window.
    pub fn load_fresh(&self, username: &str) -> Option<Vec<Entry>> {
        self.load_fresh_at(username, Utc::now())
    }

    pub fn load_fresh_at(&self, username: &str, now: DateTime<Utc>) -> Option<Vec<Entry>> {
        self.restore_at(now)
            .filter(|cached| cached.username == username)
            .map(|cached| cached.entries)
    }

    /// Whatever is cached, as long as it is fresh.
    pub fn restore(&self) -> Option<CachedSession> {
        self.restore_at(Utc::now())
    }

    pub fn restore_at(&self, now: DateTime<Utc>) -> Option<CachedSession> {
        let username = self.remembered_username()?;
        let fetched_at = self.fetched_at()?;

        let age = now.signed_duration_since(fetched_at);
        if age >= self.freshness || age < Duration::zero() {
            debug!(username = %username, age_secs = age.num_seconds(), "Cached shelf is stale");
            return None;
        }

        let raw = self.store.get(ENTRIES_KEY)?;
        let entries: Vec<Entry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Cached shelf is corrupt, discarding");
                self.drop_key(ENTRIES_KEY);
                self.drop_key(FETCHED_AT_KEY);
                return None;
            }
        };

        Some(CachedSession {
            username,
            entries,
            fetched_at,
        })
    }

    pub fn clear(&self) {
        for key in [USERNAME_KEY, ENTRIES_KEY, FETCHED_AT_KEY] {
            self.drop_key(key);
        }
    }

    fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get(FETCHED_AT_KEY)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Cached timestamp is corrupt, discarding");
                self.drop_key(FETCHED_AT_KEY);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key = %key, error = %e, "Failed to persist cache value");
        }
    }

    fn drop_key(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key = %key, error = %e, "Failed to remove cache value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_config::{FileStore, MemoryStore};
    use shelf_models::MemberRating;

    fn entry(id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            title: "Heat".to_string(),
            year: 1995,
            rating: MemberRating::from_stars(4.5),
            poster_url: "https://a.ltrbxd.com/heat.jpg".to_string(),
            review: "Still the best diner scene.".to_string(),
            watched_date: "2024-03-02".to_string(),
            link: "https://letterboxd.com/someone/film/heat/".to_string(),
            is_rewatch: true,
            is_liked: false,
        }
    }

    fn cache() -> (Arc<MemoryStore>, SessionCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = SessionCache::new(store.clone(), std::time::Duration::from_secs(300));
        (store, cache)
    }

    #[test]
    fn test_fresh_and_stale() {
        let (_, cache) = cache();
        let t0 = Utc::now();
        cache.store_at("someone", &[entry("a")], t0);

        let fresh = cache.load_fresh_at("someone", t0 + Duration::seconds(299)).unwrap();
        assert_eq!(fresh, vec![entry("a")]);

        assert_eq!(cache.load_fresh_at("someone", t0 + Duration::seconds(300)), None);
        assert_eq!(cache.load_fresh_at("someone", t0 + Duration::hours(2)), None);
        // Stale data still remembers who it belonged to
        assert_eq!(cache.remembered_username().as_deref(), Some("someone"));
    }

    #[test]
    fn test_other_username_misses() {
        let (_, cache) = cache();
        cache.store("someone", &[entry("a")]);
        assert!(cache.load_fresh("someone").is_some());
        assert_eq!(cache.load_fresh("someone_else"), None);
    }

    #[test]
    fn test_restore() {
        let (_, cache) = cache();
        assert_eq!(cache.restore(), None);

        let t0 = Utc::now();
        cache.store_at("someone", &[entry("a"), entry("b")], t0);
        let restored = cache.restore_at(t0 + Duration::seconds(10)).unwrap();
        assert_eq!(restored.username, "someone");
        assert_eq!(restored.entries.len(), 2);
        assert_eq!(restored.fetched_at.timestamp(), t0.timestamp());
    }

    #[test]
    fn test_corrupt_entries_are_discarded() {
        let (store, cache) = cache();
        cache.store("someone", &[entry("a")]);
        store.set(ENTRIES_KEY, "[{not json").unwrap();

        assert_eq!(cache.restore(), None);
        assert_eq!(store.get(ENTRIES_KEY), None);
        assert_eq!(cache.remembered_username().as_deref(), Some("someone"));
    }

    #[test]
    fn test_corrupt_timestamp_is_a_miss() {
        let (store, cache) = cache();
        cache.store("someone", &[entry("a")]);
        store.set(FETCHED_AT_KEY, "yesterday-ish").unwrap();
        assert_eq!(cache.load_fresh("someone"), None);
        assert_eq!(store.get(FETCHED_AT_KEY), None);
    }

    #[test]
    fn test_clear() {
        let (store, cache) = cache();
        cache.store("someone", &[entry("a")]);
        cache.clear();
        assert!(store.is_empty());
        assert_eq!(cache.remembered_username(), None);
    }

    #[test]
    fn test_survives_file_store_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let store = Arc::new(FileStore::open(path.clone()).unwrap());
        SessionCache::new(store, std::time::Duration::from_secs(300)).store("someone", &[entry("a")]);

        let reopened = Arc::new(FileStore::open(path).unwrap());
        let cache = SessionCache::new(reopened, std::time::Duration::from_secs(300));
        assert_eq!(cache.load_fresh("someone"), Some(vec![entry("a")]));
    }
}
