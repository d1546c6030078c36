pub mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, ContextSettings, FetcherSettings, IngestionSettings, LogFormat, LoggingConfig, OllamaConfig,
    RateLimitSettings,
};
