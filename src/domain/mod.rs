//! Domain layer - entities, collaborator contracts and pure logic

pub mod activity;
pub mod conversation;
pub mod document;
pub mod error;
pub mod generation;
pub mod platform;
pub mod query;
pub mod ranking;
pub mod source;
pub mod text;

pub use activity::ActivityLog;
pub use conversation::{ConversationRepository, ConversationTurn, NewConversationTurn};
pub use document::{Document, DocumentFilter, DocumentRepository, NewDocument, RankedDocument};
pub use error::DomainError;
pub use generation::{GenerateOptions, GenerateRequest, GenerateResponse, GenerationBackend};
pub use platform::CdpPlatform;
pub use query::{validate_query, ChatQuery, ChatResponse, MAX_QUERY_CHARS};
pub use ranking::RelevanceRanker;
pub use source::{default_sources, DocSource, ExtractionRules, UrlDiscovery};
