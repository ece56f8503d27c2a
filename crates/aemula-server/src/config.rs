//! Server configuration

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use aemula::store::{CachedStore, ContentStore, MemoryStore, PinataConfig, PinataStore, SqliteStore};
use aemula::PipelineConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration, read from TOML. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub pipeline: PipelineSection,
    pub cache: CacheConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP API binds to
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Which ContentStore backs the pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Volatile, process-local
    #[default]
    Memory,
    /// Local SQLite file
    Sqlite,
    /// Pinata pinning API plus an IPFS gateway
    Pinata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    pub sqlite_path: PathBuf,
    /// Gateway host, e.g. `example.mypinata.cloud`
    pub gateway: Option<String>,
    /// Override for the pinning upload endpoint
    pub upload_url: Option<String>,
    /// Pinning API token. Prefer the `PINATA_JWT` environment variable.
    pub jwt: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            sqlite_path: PathBuf::from("aemula.db"),
            gateway: None,
            upload_url: None,
            jwt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// Concurrent resolves per batch; 0 means unbounded
    pub max_concurrency: usize,
    pub resolve_timeout_secs: u64,
    pub publish_timeout_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            max_concurrency: defaults.max_concurrency.unwrap_or(0),
            resolve_timeout_secs: defaults.resolve_timeout.as_secs(),
            publish_timeout_secs: defaults.publish_timeout.as_secs(),
        }
    }
}

impl PipelineSection {
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_concurrency: (self.max_concurrency > 0).then_some(self.max_concurrency),
            resolve_timeout: Duration::from_secs(self.resolve_timeout_secs),
            publish_timeout: Duration::from_secs(self.publish_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Resolved blobs kept in memory; 0 disables the cache
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// The static address list served by `GET /api/articles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub cids: Vec<String>,
}

impl Config {
    /// Load from a TOML file, falling back to defaults when it doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Build the configured store, wrapped in a cache when enabled.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn ContentStore>> {
        let store: Arc<dyn ContentStore> = match self.store.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Sqlite => Arc::new(
                SqliteStore::open(&self.store.sqlite_path)
                    .with_context(|| format!("opening {}", self.store.sqlite_path.display()))?,
            ),
            Backend::Pinata => {
                let gateway = self
                    .store
                    .gateway
                    .clone()
                    .context("store.gateway is required for the pinata backend")?;
                let mut pinata = PinataConfig::new(gateway)
                    .with_timeout(Duration::from_secs(self.pipeline.publish_timeout_secs));
                if let Some(url) = &self.store.upload_url {
                    pinata = pinata.with_upload_url(url.clone());
                }
                if let Some(jwt) = &self.store.jwt {
                    pinata = pinata.with_jwt(jwt.clone());
                }
                Arc::new(PinataStore::new(pinata)?)
            }
        };

        if self.cache.capacity == 0 {
            return Ok(store);
        }
        Ok(Arc::new(CachedStore::new(store, self.cache.capacity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pipeline.to_pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:3000"

            [store]
            backend = "pinata"
            gateway = "aemula-ethglobal.mypinata.cloud"

            [pipeline]
            max_concurrency = 0
            resolve_timeout_secs = 5

            [cache]
            capacity = 0

            [feed]
            cids = ["bafA", "bafB"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.server.listen,
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.store.backend, Backend::Pinata);
        assert_eq!(config.pipeline.resolve_timeout_secs, 5);
        assert_eq!(config.pipeline.publish_timeout_secs, 30);
        assert_eq!(config.pipeline.to_pipeline_config().max_concurrency, None);
        assert_eq!(config.feed.cids, ["bafA", "bafB"]);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(toml::from_str::<Config>("[store]\nbackend = \"s3\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_pinata_requires_gateway() {
        let mut config = Config::default();
        config.store.backend = Backend::Pinata;
        assert!(config.build_store().is_err());
    }

    #[test]
    fn test_build_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.backend = Backend::Sqlite;
        config.store.sqlite_path = dir.path().join("blobs.db");

        let store = config.build_store().unwrap();
        assert_eq!(store.backend(), "sqlite");
        assert!(config.store.sqlite_path.exists());
    }
}
