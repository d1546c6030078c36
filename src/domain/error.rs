use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error(
        "This question is not related to CDP platforms. Please ask CDP-related questions only."
    )]
    DomainMismatch,

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimitExceeded {
        remaining: u32,
        reset_at: DateTime<Utc>,
    },

    #[error("Permanent fetch error for {url}: {message}")]
    PermanentFetch { url: String, message: String },

    #[error("Fetch failed for {url} after {attempts} attempts: {message}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("Generation backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rate_limit_exceeded(reset_at: DateTime<Utc>) -> Self {
        Self::RateLimitExceeded {
            remaining: 0,
            reset_at,
        }
    }

    pub fn permanent_fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PermanentFetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn fetch_exhausted(url: impl Into<String>, attempts: u32, message: impl Into<String>) -> Self {
        Self::FetchExhausted {
            url: url.into(),
            attempts,
            message: message.into(),
        }
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
