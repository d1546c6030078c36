//! `ingest` subcommand

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::source::{default_sources, DocSource};
use crate::domain::{ActivityLog, CdpPlatform};
use crate::infrastructure::activity::TracingActivityLog;
use crate::infrastructure::fetch::{FetcherConfig, HttpPageFetcher};
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::repository::InMemoryDocumentRepository;

#[derive(Args)]
pub struct IngestArgs {
    /// Restrict to one platform; all platforms when omitted
    #[arg(long, value_enum)]
    pub platform: Option<CdpPlatform>,
}

pub async fn run(args: IngestArgs, config: &AppConfig) -> anyhow::Result<()> {
    let activity: Arc<dyn ActivityLog> = Arc::new(TracingActivityLog::new());
    let fetcher = Arc::new(HttpPageFetcher::new(
        fetcher_config(config),
        Arc::clone(&activity),
    )?);
    let documents = Arc::new(InMemoryDocumentRepository::new());

    let pipeline = IngestionPipeline::new(fetcher, documents, activity)
        .with_concurrency(config.ingestion.concurrency);

    let sources: Vec<DocSource> = default_sources()
        .into_iter()
        .filter(|source| args.platform.is_none_or(|p| source.platform == p))
        .collect();

    let reports = pipeline.run_all(&sources).await;

    for report in &reports {
        info!(
            platform = %report.platform,
            discovered = report.discovered,
            persisted = report.persisted,
            skipped = report.skipped,
            failed = report.failures.len(),
            "ingestion finished"
        );
        for failure in &report.failures {
            info!(url = %failure.url, reason = %failure.reason, "url failed");
        }
    }

    Ok(())
}

pub(crate) fn fetcher_config(config: &AppConfig) -> FetcherConfig {
    FetcherConfig {
        max_retries: config.fetcher.max_retries,
        retry_base_delay: Duration::from_millis(config.fetcher.retry_base_delay_ms),
        retry_max_jitter: Duration::from_millis(config.fetcher.retry_max_jitter_ms),
        request_delay_min: Duration::from_millis(config.fetcher.request_delay_min_ms),
        request_delay_max: Duration::from_millis(config.fetcher.request_delay_max_ms),
        timeout: Duration::from_secs(config.fetcher.timeout_secs),
    }
}
