//! Conversation history entity and repository contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::platform::CdpPlatform;
use super::DomainError;

/// One query/response exchange in a session. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub platform: Option<CdpPlatform>,
    pub timestamp: DateTime<Utc>,
}

/// Input for recording a turn; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewConversationTurn {
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub platform: Option<CdpPlatform>,
}

/// Opaque conversation store consumed by the query path.
#[async_trait]
pub trait ConversationRepository: Send + Sync + std::fmt::Debug {
    async fn create(&self, turn: NewConversationTurn) -> Result<ConversationTurn, DomainError>;

    /// Most recent turns for a session, newest first, optionally narrowed
    /// to one platform.
    async fn recent(
        &self,
        session_id: &str,
        platform: Option<CdpPlatform>,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, DomainError>;

    /// Removes all turns for a session; returns how many were deleted.
    async fn delete_session(&self, session_id: &str) -> Result<u64, DomainError>;
}
