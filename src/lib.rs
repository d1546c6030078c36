//! CDP Support Agent
//!
//! A documentation-grounded support agent for customer data platforms
//! (Segment, mParticle, Lytics, Zeotap):
//! - Documentation harvesting with retries, pacing and dedup
//! - Keyword-overlap relevance ranking over the harvested pages
//! - Bounded prompt context assembly with conversation history
//! - Sliding-window rate limiting per session
//! - Generation against a local Ollama server

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{ChatQuery, ChatResponse, CdpPlatform, DomainError};
