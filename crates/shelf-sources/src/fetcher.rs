use shelf_config::{FeedConfig, RelayEndpoint, RelayStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FeedError, TransportError};
use crate::transport::HttpTransport;

/// One way of reaching the target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Request the target directly
    Direct,
    /// Request the target wrapped in a relay URL
    Relay(RelayEndpoint),
}

impl FetchStrategy {
    pub fn request_url(&self, target: &str) -> String {
        match self {
            FetchStrategy::Direct => target.to_string(),
            FetchStrategy::Relay(relay) => match relay.style {
                RelayStyle::Encoded => format!("{}{}", relay.base, urlencoding::encode(target)),
                RelayStyle::Raw => format!("{}{}", relay.base, target),
            },
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FetchStrategy::Direct => "direct",
            FetchStrategy::Relay(relay) => &relay.base,
        }
    }
}

enum Attempt {
    Body(String),
    TryNext(String),
}

/// Retrieves a URL through an ordered list of strategies, one pass, one
/// attempt at a time. The first 2xx body wins; running off the end of the
/// list is a transport failure.
#[derive(Clone)]
pub struct ProxyFetcher {
    transport: Arc<dyn HttpTransport>,
    strategies: Vec<FetchStrategy>,
    timeout: Duration,
}

impl ProxyFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, strategies: Vec<FetchStrategy>, timeout: Duration) -> Self {
        Self {
            transport,
            strategies,
            timeout,
        }
    }

    pub fn from_config(config: &FeedConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let mut strategies = Vec::with_capacity(config.relays.len() + 1);
        if config.direct {
            strategies.push(FetchStrategy::Direct);
        }
        strategies.extend(config.relays.iter().cloned().map(FetchStrategy::Relay));
        Self::new(transport, strategies, config.timeout())
    }

    #[cfg(test)]
    pub(crate) fn strategies(&self) -> &[FetchStrategy] {
        &self.strategies
    }

    #[cfg(test)]
    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch(&self, target: &str) -> Result<String, FeedError> {
        for (position, strategy) in self.strategies.iter().enumerate() {
            match self.attempt(strategy, target).await {
                Attempt::Body(body) => {
                    info!(
                        relay = %strategy.label(),
                        position,
                        bytes = body.len(),
                        "Fetched feed"
                    );
                    return Ok(body);
                }
                Attempt::TryNext(reason) => {
                    warn!(relay = %strategy.label(), position, reason = %reason, "Fetch attempt failed, trying next");
                }
            }
        }

        warn!(url = %target, attempts = self.strategies.len(), "All fetch strategies failed");
        Err(FeedError::Transport)
    }

    async fn attempt(&self, strategy: &FetchStrategy, target: &str) -> Attempt {
        let url = strategy.request_url(target);
        debug!(url = %url, timeout = ?self.timeout, "Fetch attempt");

        let result = match tokio::time::timeout(self.timeout, self.transport.get(&url)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        };

        match result {
            Ok(response) if response.is_success() => Attempt::Body(response.text().into_owned()),
            Ok(response) => Attempt::TryNext(format!("HTTP {}", response.status)),
            Err(e) => Attempt::TryNext(e.to_string()),
        }
    }
}
