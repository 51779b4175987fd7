use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use vod_cache::config::{CacheConfig, OriginConfig, StoreConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub origin: OriginConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("VOD_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., VOD__ORIGIN__BASE_URL)
            .add_source(Environment::with_prefix("VOD").separator("__"))
            .build()?;

        let mut config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let base_url = self.origin.base_url.trim();
        let Some((scheme, rest)) = base_url.split_once("://") else {
            return Err(ConfigError::Message(format!(
                "origin.base_url must be an absolute URL, got '{base_url}'"
            )));
        };
        if !matches!(scheme, "http" | "https") || rest.is_empty() || rest.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "origin.base_url must be an http(s) URL with a host, got '{base_url}'"
            )));
        }
        self.origin.base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        if self.store.host.trim().is_empty() {
            return Err(ConfigError::Message("store.host must not be empty".into()));
        }
        if self.origin.read_buffer_bytes == 0 {
            return Err(ConfigError::Message(
                "origin.read_buffer_bytes must be greater than zero".into(),
            ));
        }
        if self.cache.chunk_size_bytes == 0 {
            return Err(ConfigError::Message(
                "cache.chunk_size_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
