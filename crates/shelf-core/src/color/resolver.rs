use async_trait::async_trait;
use shelf_config::ColorConfig;
use shelf_models::{Entry, Palette};
use shelf_sources::HttpTransport;
use std::sync::Arc;
use tracing::trace;

use super::palette_for_entry;
use super::sample::PosterSampler;

/// One way of coloring an entry. `None` means "try the next one".
#[async_trait]
pub trait PaletteStrategy: Send + Sync {
    fn name(&self) -> &str;
    async fn palette(&self, entry: &Entry) -> Option<Palette>;
}

/// Ordered palette strategies ending in the title hash, which always
/// answers. Resolution therefore never fails.
#[derive(Default)]
pub struct PaletteResolver {
    strategies: Vec<Box<dyn PaletteStrategy>>,
}

impl PaletteResolver {
    /// Title hash only.
    pub fn deterministic() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ColorConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let mut resolver = Self::deterministic();
        if config.sample_posters {
            resolver.push(Box::new(PosterSampler::new(transport, config.sample_timeout())));
        }
        resolver
    }

    pub fn push(&mut self, strategy: Box<dyn PaletteStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, entry: &Entry, index: usize) -> Palette {
        for strategy in &self.strategies {
            if let Some(palette) = strategy.palette(entry).await {
                trace!(strategy = %strategy.name(), id = %entry.id, "Palette resolved");
                return palette;
            }
        }
        palette_for_entry(&entry.title, index)
    }
}
