//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__TOP_K=5`). Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against the directory holding the config files.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::traits::GenerationParams;
use crate::types::{Metric, RetrievalParams};

pub struct Config {
    figment: Figment,
    env_name: String,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration files from `dir`. Missing files are skipped.
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        let overlay = match env_name.as_str() {
            "dev" | "development" => Some("config.dev.toml"),
            "prod" | "production" => Some("config.prod.toml"),
            "test" | "testing" => Some("config.test.toml"),
            _ => None,
        };
        if let Some(file) = overlay {
            figment = figment.merge(Toml::file(dir.join(file)));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self {
            figment,
            env_name,
            base_dir: dir.to_path_buf(),
        })
    }

    /// Typed settings with paths resolved against the config directory.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.paths = settings.paths.resolved(&self.base_dir);
        settings.validate_for_env(&self.env_name)?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalParams,
    pub generation: GenerationConfig,
    pub catalog: CatalogConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog: PathBuf,
    pub index_dir: PathBuf,
    pub table: String,
    pub model_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/index/entries.txt"),
            index_dir: PathBuf::from("data/index/lancedb"),
            table: "embeddings".to_string(),
            model_dir: PathBuf::from("models/bge-m3"),
        }
    }
}

impl PathsConfig {
    fn resolved(self, base: &Path) -> Self {
        Self {
            catalog: resolve_with_base(base, self.catalog.to_string_lossy()),
            index_dir: resolve_with_base(base, self.index_dir.to_string_lossy()),
            table: self.table,
            model_dir: resolve_with_base(base, self.model_dir.to_string_lossy()),
        }
    }
}

/// Which vector index serves queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Prebuilt LanceDB table under `paths.index_dir`.
    #[default]
    Lance,
    /// Embed the catalog at startup into an in-memory exact index.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub metric: Metric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub max_len: usize,
    pub fake: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_len: 512,
            fake: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible completions server.
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_new_tokens: usize,
    pub sample: bool,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            model: "glm-4-9b-chat".to_string(),
            timeout_secs: 300,
            max_new_tokens: params.max_new_tokens,
            sample: params.sample,
            temperature: params.temperature,
            top_k: params.top_k,
            seed: params.seed,
        }
    }
}

impl GenerationConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            sample: self.sample,
            temperature: self.temperature,
            top_k: self.top_k,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_source_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Queries allowed to wait for the worker before requests get 503.
    pub queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            queue_capacity: 32,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        self.retrieval
            .validate()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if self.paths.table.trim().is_empty() {
            return Err(Error::InvalidConfig("paths.table must not be empty".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig(
                "embedding.max_len must be at least 1".into(),
            ));
        }
        if self.generation.max_new_tokens == 0 {
            return Err(Error::InvalidConfig(
                "generation.max_new_tokens must be at least 1".into(),
            ));
        }
        if self.server.queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "server.queue_capacity must be at least 1".into(),
            ));
        }
        if self.generation.temperature < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "generation.temperature must be non-negative, got {}",
                self.generation.temperature
            )));
        }
        Ok(())
    }

    pub fn validate_for_env(&self, env: &str) -> Result<(), Error> {
        self.validate()?;
        if matches!(env, "prod" | "production") && self.embedding.fake {
            return Err(Error::InvalidConfig(
                "Prod config must not use fake embeddings".into(),
            ));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
