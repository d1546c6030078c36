//! `chat` subcommand

use std::sync::Arc;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::query::ChatQuery;
use crate::domain::{ActivityLog, CdpPlatform, RelevanceRanker};
use crate::infrastructure::activity::TracingActivityLog;
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::context::{ContextAssembler, ContextAssemblerConfig};
use crate::infrastructure::fetch::HttpPageFetcher;
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::llm::OllamaClient;
use crate::infrastructure::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
use crate::infrastructure::repository::{
    InMemoryConversationRepository, InMemoryDocumentRepository,
};
use crate::infrastructure::services::{ChatService, ChatServiceConfig};

use super::ingest::fetcher_config;

#[derive(Args)]
pub struct ChatArgs {
    /// The question to ask
    pub query: String,

    /// Platform the question is about
    #[arg(long, value_enum)]
    pub platform: Option<CdpPlatform>,

    /// Session identifier for rate limiting and history
    #[arg(long, default_value = "default")]
    pub session: String,

    /// Harvest documentation before answering (slower, grounded answers)
    #[arg(long)]
    pub fetch_docs: bool,
}

pub async fn run(args: ChatArgs, config: &AppConfig) -> anyhow::Result<()> {
    let activity: Arc<dyn ActivityLog> = Arc::new(TracingActivityLog::new());
    let documents = Arc::new(InMemoryDocumentRepository::new());

    if args.fetch_docs {
        let fetcher = Arc::new(HttpPageFetcher::new(
            fetcher_config(config),
            Arc::clone(&activity),
        )?);
        let pipeline = IngestionPipeline::new(
            fetcher,
            Arc::clone(&documents) as Arc<dyn crate::domain::document::DocumentRepository>,
            Arc::clone(&activity),
        );

        let sources: Vec<_> = crate::domain::source::default_sources()
            .into_iter()
            .filter(|source| args.platform.is_none_or(|p| source.platform == p))
            .collect();
        pipeline.run_all(&sources).await;
    }

    let limiter = Arc::new(SlidingWindowLimiter::new(
        Arc::new(TtlCache::new()),
        RateLimitConfig {
            window: config.rate_limit.window(),
            max_requests: config.rate_limit.max_requests,
        },
        Arc::clone(&activity),
    ));

    let backend = Arc::new(OllamaClient::new(
        config.ollama.base_url.clone(),
        config.ollama.timeout(),
    )?);

    let service = ChatService::new(
        limiter,
        RelevanceRanker::new(documents),
        Arc::new(InMemoryConversationRepository::new()),
        ContextAssembler::new(ContextAssemblerConfig {
            max_history: config.context.max_history,
            max_doc_excerpt_chars: config.context.max_doc_excerpt_chars,
            max_context_chars: config.context.max_context_chars,
        }),
        backend,
        activity,
        ChatServiceConfig {
            model: config.ollama.model.clone(),
            max_response_chars: config.context.max_response_chars,
            history_limit: config.context.max_history,
            retrieval_cache_ttl: config.cache.ttl(),
        },
    );

    let response = service
        .process_query(ChatQuery::new(args.query, args.platform).with_session(args.session))
        .await?;

    println!("{}", response.message);

    if !response.relevant_docs.is_empty() {
        println!("\nSources:");
        for ranked in &response.relevant_docs {
            println!("  - {} ({})", ranked.document.title, ranked.document.url);
        }
    }

    Ok(())
}
