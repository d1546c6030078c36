//! Ollama generation backend
//!
//! Minimal HTTP client for a local Ollama server: single-shot generation
//! via `POST /api/generate` and a connectivity probe via
//! `GET /api/version`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::generation::{GenerateRequest, GenerateResponse, GenerationBackend};
use crate::domain::DomainError;

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model served by the endpoint.
pub const DEFAULT_MODEL: &str = "llama2";

#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        Url::parse(&base_url)
            .map_err(|e| DomainError::validation(format!("Invalid Ollama base URL: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, DomainError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::backend_unavailable(format!("Ollama request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::backend_unavailable(format!(
                "Ollama returned HTTP {}",
                status.as_u16()
            )));
        }

        response.json::<GenerateResponse>().await.map_err(|e| {
            DomainError::backend_unavailable(format!("Invalid Ollama response: {e}"))
        })
    }

    async fn ping(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
