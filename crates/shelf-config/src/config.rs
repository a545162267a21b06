use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// How a relay expects to receive the target URL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelayStyle {
    /// Append the percent-encoded target URL (`...?url=https%3A%2F%2F...`)
    Encoded,
    /// Append the target URL verbatim (`https://relay.example/https://...`)
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayEndpoint {
    pub base: String,
    #[serde(default = "default_relay_style")]
    pub style: RelayStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,
    // Tried in order, one pass
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayEndpoint>,
    // Fetch the feed itself before any relay (no cross-origin limits outside a browser)
    #[serde(default)]
    pub direct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default)]
    pub sample_posters: bool,
    #[serde(default = "default_sample_timeout_secs")]
    pub sample_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
}

fn default_relay_style() -> RelayStyle {
    RelayStyle::Encoded
}

fn default_url_template() -> String {
    "https://letterboxd.com/{username}/rss/".to_string()
}

fn default_feed_timeout_secs() -> u64 {
    8
}

pub fn default_relays() -> Vec<RelayEndpoint> {
    vec![
        RelayEndpoint {
            base: "https://api.allorigins.win/raw?url=".to_string(),
            style: RelayStyle::Encoded,
        },
        RelayEndpoint {
            base: "https://corsproxy.io/?".to_string(),
            style: RelayStyle::Encoded,
        },
    ]
}

fn default_freshness_secs() -> u64 {
    300 // 5 minutes
}

fn default_sample_timeout_secs() -> u64 {
    5
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_cache_max_age_secs() -> u64 {
    300
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            timeout_secs: default_feed_timeout_secs(),
            relays: default_relays(),
            direct: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_freshness_secs(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            sample_posters: false,
            sample_timeout_secs: default_sample_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            cache_max_age_secs: default_cache_max_age_secs(),
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}

impl ColorConfig {
    pub fn sample_timeout(&self) -> Duration {
        Duration::from_secs(self.sample_timeout_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if present, otherwise fall back to defaults.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.feed.url_template.contains("{username}") {
            return Err(anyhow::anyhow!("feed.url_template must contain {{username}}"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(anyhow::anyhow!("feed.timeout_secs must be greater than zero"));
        }
        if self.feed.relays.is_empty() && !self.feed.direct {
            return Err(anyhow::anyhow!("feed.relays is empty and feed.direct is disabled; nothing to fetch with"));
        }
        for relay in &self.feed.relays {
            if relay.base.trim().is_empty() {
                return Err(anyhow::anyhow!("feed.relays contains an empty base URL"));
            }
        }
        if self.colors.sample_timeout_secs == 0 {
            return Err(anyhow::anyhow!("colors.sample_timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.feed.direct = true;
        config.feed.relays.push(RelayEndpoint {
            base: "https://relay.example/".to_string(),
            style: RelayStyle::Raw,
        });
        config.cache.freshness_secs = 60;

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert!(loaded.feed.direct);
        assert_eq!(loaded.feed.relays.len(), 3);
        assert_eq!(loaded.feed.relays[2].style, RelayStyle::Raw);
        assert_eq!(loaded.cache.freshness(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.feed.relays, default_relays());
        assert_eq!(config.cache.freshness_secs, 300);
        assert!(!config.colors.sample_posters);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relay_style_defaults_to_encoded() {
        let config: Config = toml::from_str("[[feed.relays]]\nbase = \"https://r.example/?u=\"\n").unwrap();
        assert_eq!(config.feed.relays.len(), 1);
        assert_eq!(config.feed.relays[0].style, RelayStyle::Encoded);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.feed.url_template = "https://letterboxd.com/rss/".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.feed.timeout_secs = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.feed.relays.clear();
        assert!(config.validate().is_err());
        config.feed.direct = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.server.port, 8787);
    }
}
