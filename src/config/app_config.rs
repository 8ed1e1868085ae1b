use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheSettings,
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
    pub pipeline: PipelineSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Two-tier answer cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Entries kept in the memory tier
    pub memory_capacity: usize,
    pub max_connections: u32,
}

/// Language model endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub num_ctx: u32,
    /// Whole-request timeout, including the streamed body
    pub timeout_secs: u64,
}

/// Vector index and query embeddings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub chroma_url: String,
    pub collection: String,
    pub embedding_url: String,
    pub embedding_model: String,
    /// Documents used as context for generative actions
    pub context_documents: usize,
    /// Result count for searches without an explicit limit
    pub default_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Capacity of the channel carrying answer fragments
    pub stream_buffer: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Serve Prometheus metrics at `/metrics`
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("cache.db"),
            memory_capacity: 100,
            max_connections: 4,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: 0.1,
            num_ctx: 4096,
            timeout_secs: 300,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chroma_url: "http://localhost:8000".to_string(),
            collection: "admin_docs".to_string(),
            embedding_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            context_documents: 5,
            default_limit: 5,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { stream_buffer: 32 }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
