use async_trait::async_trait;
use shelf_config::FeedConfig;
use shelf_models::Entry;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::fetcher::ProxyFetcher;
use crate::normalize::normalize_items;
use crate::parser::parse_feed;
use crate::traits::FeedSource;
use crate::transport::HttpTransport;

pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// A member's public diary RSS feed on Letterboxd.
#[derive(Clone)]
pub struct LetterboxdSource {
    fetcher: ProxyFetcher,
    url_template: String,
}

impl LetterboxdSource {
    pub fn new(fetcher: ProxyFetcher, url_template: String) -> Self {
        Self { fetcher, url_template }
    }

    pub fn from_config(config: &FeedConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(ProxyFetcher::from_config(config, transport), config.url_template.clone())
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &ProxyFetcher {
        &self.fetcher
    }
}

/// Fill the `{username}` slot of a feed URL template.
pub fn feed_url_for(template: &str, username: &str) -> String {
    template.replace(USERNAME_PLACEHOLDER, &urlencoding::encode(username))
}

#[async_trait]
impl FeedSource for LetterboxdSource {
    fn source_name(&self) -> &str {
        "letterboxd"
    }

    fn feed_url(&self, username: &str) -> String {
        feed_url_for(&self.url_template, username)
    }

    async fn fetch_entries(&self, username: &str) -> Result<Vec<Entry>, FeedError> {
        let url = self.feed_url(username);
        let body = self.fetcher.fetch(&url).await?;

        let items = parse_feed(&body).map_err(|e| {
            warn!(username = %username, detail = ?e.detail(), "Feed did not parse");
            e
        })?;

        let entries = normalize_items(&items)?;
        info!(
            username = %username,
            items = items.len(),
            entries = entries.len(),
            "Loaded diary feed"
        );
        Ok(entries)
    }
}
