pub mod clear;
pub mod config;
pub mod fetch;
pub mod palette;
pub mod serve;
pub mod show;

mod render;

use color_eyre::Result;
use shelf_config::{Config, FileStore, PathManager};
use shelf_core::{PaletteResolver, Session, SessionCache};
use shelf_sources::{HttpTransport, LetterboxdSource, ReqwestTransport};
use std::sync::Arc;

/// Everything a command needs, built from the config file.
pub(crate) struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub transport: Arc<dyn HttpTransport>,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        Ok(Self {
            paths,
            config,
            transport: Arc::new(ReqwestTransport::new()),
        })
    }

    pub fn open_session(&self) -> Result<Session> {
        let store_file = self.paths.session_store_file();
        let store = FileStore::open(store_file.clone())
            .map_err(|e| color_eyre::eyre::eyre!("Failed to open session store {}: {}", store_file.display(), e))?;

        let source = LetterboxdSource::from_config(&self.config.feed, self.transport.clone());
        let cache = SessionCache::from_config(&self.config.cache, Arc::new(store));
        Ok(Session::new(Arc::new(source), cache))
    }

    pub fn palette_resolver(&self) -> PaletteResolver {
        PaletteResolver::from_config(&self.config.colors, self.transport.clone())
    }
}
