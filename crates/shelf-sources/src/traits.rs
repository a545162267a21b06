use async_trait::async_trait;
use shelf_models::Entry;

use crate::error::FeedError;

#[async_trait]
pub trait FeedSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Upstream feed URL for a (normalized) username
    fn feed_url(&self, username: &str) -> String;

    /// Fetch, parse and normalize one member's feed.
    ///
    /// Transport failures, unparseable documents and feeds without diary
    /// entries are distinct errors so callers can tell them apart.
    async fn fetch_entries(&self, username: &str) -> Result<Vec<Entry>, FeedError>;
}
