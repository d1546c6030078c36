use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    pub rate_limit: RateLimitSettings,
    pub fetcher: FetcherSettings,
    pub ingestion: IngestionSettings,
    pub cache: CacheSettings,
    pub context: ContextSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 900,
            max_requests: 100,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_jitter_ms: u64,
    pub request_delay_min_ms: u64,
    pub request_delay_max_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 2000,
            retry_max_jitter_ms: 1000,
            request_delay_min_ms: 1000,
            request_delay_max_ms: 3000,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Workers draining the URL queue per source.
    pub concurrency: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self { concurrency: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Retrieval result reuse window.
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub max_history: usize,
    pub max_doc_excerpt_chars: usize,
    pub max_context_chars: usize,
    pub max_response_chars: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_history: 5,
            max_doc_excerpt_chars: 500,
            max_context_chars: 4000,
            max_response_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_settings() {
        let config = AppConfig::default();

        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama2");
        assert_eq!(config.rate_limit.window(), Duration::from_secs(900));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.fetcher.max_retries, 3);
        assert_eq!(config.ingestion.concurrency, 5);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.context.max_context_chars, 4000);
    }
}
