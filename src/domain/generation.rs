//! Text generation backend contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::DomainError;

/// Sampling options passed through to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stop: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 2048,
            stop: vec!["<END>".to_string()],
        }
    }
}

/// A single-shot generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            stream: false,
            options: GenerateOptions::default(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

/// The backend's answer.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
}

/// Opaque text generation endpoint (e.g. a local Ollama server).
#[async_trait]
pub trait GenerationBackend: Send + Sync + Debug {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, DomainError>;

    /// Connectivity probe; used before `generate`, never retried inline.
    async fn ping(&self) -> bool;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Canned backend for tests.
    #[derive(Debug)]
    pub struct MockGenerationBackend {
        response: Option<String>,
        error: Option<String>,
        reachable: bool,
        requests: std::sync::RwLock<Vec<GenerateRequest>>,
    }

    impl MockGenerationBackend {
        pub fn new() -> Self {
            Self {
                response: None,
                error: None,
                reachable: true,
                requests: std::sync::RwLock::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, response: impl Into<String>) -> Self {
            self.response = Some(response.into());
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn unreachable(mut self) -> Self {
            self.reachable = false;
            self
        }

        /// Requests seen so far, for prompt assertions.
        pub fn requests(&self) -> Vec<GenerateRequest> {
            self.requests.read().unwrap().clone()
        }
    }

    impl Default for MockGenerationBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl GenerationBackend for MockGenerationBackend {
        async fn generate(
            &self,
            request: GenerateRequest,
        ) -> Result<GenerateResponse, DomainError> {
            self.requests.write().unwrap().push(request.clone());

            if let Some(ref error) = self.error {
                return Err(DomainError::backend_unavailable(error));
            }

            let response = self
                .response
                .clone()
                .ok_or_else(|| DomainError::backend_unavailable("No mock response configured"))?;

            Ok(GenerateResponse {
                model: request.model,
                response,
                done: true,
                total_duration: None,
            })
        }

        async fn ping(&self) -> bool {
            self.reachable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_skips_empty_fields() {
        let request = GenerateRequest::new("llama2", "hello");
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("system").is_none());
        assert_eq!(json["model"], "llama2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2048);
    }

    #[test]
    fn test_request_with_system_prompt() {
        let request = GenerateRequest::new("llama2", "hello").with_system("You are an agent");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "You are an agent");
    }
}
