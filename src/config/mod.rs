//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, LlmSettings, LogFormat, LoggingConfig, MetricsSettings,
    PipelineSettings, RetrievalSettings, ServerConfig,
};
