//! Chat query orchestration
//!
//! The full query path: rate limit, validation, retrieval, context
//! assembly, generation, persistence. Retrieval and history loading
//! degrade to empty on failure; only rate limiting, validation, and the
//! backend itself are fatal to a query.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::conversation::{ConversationRepository, ConversationTurn, NewConversationTurn};
use crate::domain::document::RankedDocument;
use crate::domain::generation::{GenerateRequest, GenerationBackend};
use crate::domain::query::{self, ChatQuery, ChatResponse};
use crate::domain::{ActivityLog, CdpPlatform, DomainError, RelevanceRanker};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::context::ContextAssembler;
use crate::infrastructure::llm::DEFAULT_MODEL;
use crate::infrastructure::rate_limit::SlidingWindowLimiter;
use crate::domain::text;

/// Generation model and output sizing.
#[derive(Debug, Clone)]
pub struct ChatServiceConfig {
    pub model: String,
    pub max_response_chars: usize,
    /// Turns loaded for context assembly.
    pub history_limit: usize,
    /// How long ranked retrieval results are reused for identical queries.
    pub retrieval_cache_ttl: Duration,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_response_chars: 4000,
            history_limit: 5,
            retrieval_cache_ttl: Duration::from_secs(3600),
        }
    }
}

pub struct ChatService {
    limiter: Arc<SlidingWindowLimiter>,
    ranker: RelevanceRanker,
    retrieval_cache: TtlCache<Vec<RankedDocument>>,
    conversations: Arc<dyn ConversationRepository>,
    assembler: ContextAssembler,
    backend: Arc<dyn GenerationBackend>,
    activity: Arc<dyn ActivityLog>,
    config: ChatServiceConfig,
}

impl ChatService {
    pub fn new(
        limiter: Arc<SlidingWindowLimiter>,
        ranker: RelevanceRanker,
        conversations: Arc<dyn ConversationRepository>,
        assembler: ContextAssembler,
        backend: Arc<dyn GenerationBackend>,
        activity: Arc<dyn ActivityLog>,
        config: ChatServiceConfig,
    ) -> Self {
        Self {
            limiter,
            ranker,
            retrieval_cache: TtlCache::new(),
            conversations,
            assembler,
            backend,
            activity,
            config,
        }
    }

    /// Answers one query.
    pub async fn process_query(&self, query: ChatQuery) -> Result<ChatResponse, DomainError> {
        self.activity.activity(
            "CHAT_QUERY_RECEIVED",
            json!({
                "session_id": query.session_id,
                "platform": query.platform.map(|p| p.to_string()),
            }),
        );

        self.limiter.check(&query.session_id).await?;

        let sanitized = query::validate_query(&query.query)?;

        let relevant_docs = self.find_relevant_docs(&query, &sanitized).await;

        let history = match self
            .conversations
            .recent(&query.session_id, query.platform, self.config.history_limit)
            .await
        {
            Ok(turns) => turns,
            Err(error) => {
                self.activity.error(
                    &error,
                    json!({
                        "operation": "load_conversation_context",
                        "session_id": query.session_id,
                    }),
                );
                Vec::new()
            }
        };

        let context = self.assembler.build(&history, &relevant_docs, query.platform);

        if !self.backend.ping().await {
            return Err(DomainError::backend_unavailable(
                "Generation backend is not reachable",
            ));
        }

        let request =
            GenerateRequest::new(&self.config.model, &sanitized).with_system(context);
        let generated = self.backend.generate(request).await?;

        if generated.response.trim().is_empty() {
            return Err(DomainError::backend_unavailable(
                "Generation backend returned an empty response",
            ));
        }

        let message = text::truncate_chars(
            generated.response.trim(),
            self.config.max_response_chars,
        );

        if let Err(error) = self
            .conversations
            .create(NewConversationTurn {
                session_id: query.session_id.clone(),
                query: sanitized,
                response: message.clone(),
                platform: query.platform,
            })
            .await
        {
            // A lost turn degrades later context but not this answer.
            self.activity.error(
                &error,
                json!({
                    "operation": "persist_conversation_turn",
                    "session_id": query.session_id,
                }),
            );
        }

        self.activity.activity(
            "CHAT_QUERY_COMPLETED",
            json!({
                "session_id": query.session_id,
                "relevant_docs": relevant_docs.len(),
                "response_chars": message.chars().count(),
            }),
        );

        Ok(ChatResponse {
            message,
            relevant_docs,
        })
    }

    /// Ranked documents for the query, served from the retrieval cache for
    /// identical recent queries. Retrieval failure degrades to an answer
    /// without documents.
    async fn find_relevant_docs(
        &self,
        query: &ChatQuery,
        sanitized: &str,
    ) -> Vec<RankedDocument> {
        let key = retrieval_key(sanitized, query.platform);

        if let Some(cached) = self.retrieval_cache.get(&key).await {
            return cached;
        }

        match self.ranker.find_relevant(sanitized, query.platform).await {
            Ok(docs) => {
                self.retrieval_cache
                    .set(key, docs.clone(), self.config.retrieval_cache_ttl)
                    .await;
                docs
            }
            Err(error) => {
                self.activity.error(
                    &error,
                    json!({
                        "operation": "find_relevant_docs",
                        "session_id": query.session_id,
                    }),
                );
                Vec::new()
            }
        }
    }

    /// Recent turns for a session, newest first.
    pub async fn history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        self.conversations.recent(session_id, None, limit).await
    }

    /// Removes a session's history; returns how many turns were deleted.
    pub async fn delete_conversation(&self, session_id: &str) -> Result<u64, DomainError> {
        let deleted = self.conversations.delete_session(session_id).await?;
        self.activity.activity(
            "CONVERSATION_DELETED",
            json!({ "session_id": session_id, "deleted": deleted }),
        );
        Ok(deleted)
    }
}

fn retrieval_key(sanitized: &str, platform: Option<CdpPlatform>) -> String {
    let platform = platform.map(|p| p.to_string()).unwrap_or_default();
    format!("docs:{platform}:{}", sanitized.to_lowercase())
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
