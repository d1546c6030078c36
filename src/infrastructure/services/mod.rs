//! Application services

pub mod chat;

pub use chat::{ChatService, ChatServiceConfig};
