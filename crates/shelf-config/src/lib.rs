pub mod config;
pub mod paths;
pub mod store;

pub use config::{CacheConfig, ColorConfig, Config, FeedConfig, RelayEndpoint, RelayStyle, ServerConfig, default_relays};
pub use paths::{PathManager, container_base_path};
pub use store::{FileStore, KeyValueStore, MemoryStore};
