//! Infrastructure layer - external collaborators and service wiring

pub mod activity;
pub mod cache;
pub mod context;
pub mod extract;
pub mod fetch;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod rate_limit;
pub mod repository;
pub mod services;
