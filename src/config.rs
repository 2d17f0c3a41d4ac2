use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
/// Large bookmarks can take a while on CPU-only Ollama hosts.
const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PORT: u16 = 8990;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_REINDEX_INTERVAL_HOURS: u64 = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Ollama,
    Local,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "local" => Ok(Self::Local),
            other => bail!("unknown embedding provider {other:?} (expected ollama or local)"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Ollama base url, ignored by the local provider
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    DEFAULT_OLLAMA_HOST.to_string()
}

fn default_model() -> String {
    DEFAULT_EMBED_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_EMBED_TIMEOUT_SECS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the frontend, served for every non-api path
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}

fn default_reindex_interval_hours() -> u64 {
    DEFAULT_REINDEX_INTERVAL_HOURS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub curius_user_id: String,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// 0 disables the periodic re-index
    #[serde(default = "default_reindex_interval_hours")]
    pub reindex_interval_hours: u64,

    #[serde(skip_serializing, skip_deserializing)]
    data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curius_user_id: String::new(),
            embedding: EmbeddingConfig::default(),
            server: ServerConfig::default(),
            reindex_interval_hours: default_reindex_interval_hours(),
            data_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Read `config.yaml` from `data_dir`, writing the defaults on first run.
    /// Environment overrides are applied on top.
    pub fn load_with(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("create data dir {}", data_dir.display()))?;

        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            let defaults = serde_yml::to_string(&Self::default())?;
            std::fs::write(&path, defaults)
                .with_context(|| format!("write {}", path.display()))?;
            log::info!("created default config at {}", path.display());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&raw)
            .with_context(|| format!("config {} is malformed", path.display()))?;

        config.data_dir = data_dir.to_path_buf();
        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overrides from `lookup`; blank values are ignored.
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(user_id) = var("CURIUS_USER_ID") {
            self.curius_user_id = user_id;
        }
        if let Some(host) = var("OLLAMA_HOST") {
            self.embedding.host = host;
        }
        if let Some(model) = var("EMBED_MODEL") {
            self.embedding.model = model;
        }
        if let Some(provider) = var("EMBED_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?;
        }
        if let Some(static_dir) = var("STATIC_DIR") {
            self.server.static_dir = static_dir;
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be greater than 0");
        }

        if self.server.port == 0 {
            bail!("server.port must be greater than 0");
        }

        if self.embedding.provider == EmbeddingProvider::Ollama {
            Url::parse(&self.embedding.host).with_context(|| {
                format!("embedding.host is not a valid url: {:?}", self.embedding.host)
            })?;
        }

        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }

        Ok(())
    }

    pub fn reindex_interval(&self) -> Option<Duration> {
        match self.reindex_interval_hours {
            0 => None,
            hours => Some(Duration::from_secs(hours * 60 * 60)),
        }
    }
}
