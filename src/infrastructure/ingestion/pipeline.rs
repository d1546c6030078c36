//! Documentation ingestion pipeline
//!
//! Drives URL discovery, existence check, fetch, extract, persist per
//! source. URLs are consumed from a shared work queue by a bounded pool
//! of workers; each URL's outcome is data collected into the run report.
//! A single bad page never aborts a source, and a bad source never
//! aborts the run.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, Mutex};

use crate::domain::document::{DocumentRepository, NewDocument};
use crate::domain::source::DocSource;
use crate::domain::{ActivityLog, CdpPlatform, DomainError};
use crate::infrastructure::extract::{self, NO_CONTENT};
use crate::infrastructure::fetch::PageFetcher;

use super::discovery::discover_urls;

/// Workers draining the URL queue per source.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// One URL that could not be ingested, with the reason.
#[derive(Debug, Clone)]
pub struct UrlFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome counts for one source's run.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub platform: CdpPlatform,
    pub discovered: usize,
    pub persisted: usize,
    pub skipped: usize,
    pub failures: Vec<UrlFailure>,
}

impl SourceReport {
    fn empty(platform: CdpPlatform) -> Self {
        Self {
            platform,
            discovered: 0,
            persisted: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

enum UrlOutcome {
    Persisted,
    Skipped,
    Failed(String),
}

#[derive(Debug)]
pub struct IngestionPipeline {
    fetcher: Arc<dyn PageFetcher>,
    documents: Arc<dyn DocumentRepository>,
    activity: Arc<dyn ActivityLog>,
    concurrency: usize,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        documents: Arc<dyn DocumentRepository>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            fetcher,
            documents,
            activity,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingests one source. Fails only when URL discovery itself fails;
    /// per-URL failures are recorded in the report and skipped over.
    ///
    /// The fetcher applies its inter-request delay inside each worker, so
    /// pacing toward the target site is preserved per worker.
    pub async fn run(&self, source: &DocSource) -> Result<SourceReport, DomainError> {
        self.activity.activity(
            "SCRAPE_START",
            json!({ "platform": source.platform.to_string() }),
        );

        let urls = discover_urls(self.fetcher.as_ref(), source).await?;

        let mut report = SourceReport::empty(source.platform);
        report.discovered = urls.len();

        let queue = Arc::new(Mutex::new(VecDeque::from(urls)));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<(String, UrlOutcome)>();
        let source = Arc::new(source.clone());

        let workers = self.concurrency.min(report.discovered.max(1));
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let outcome_tx = outcome_tx.clone();
            let source = Arc::clone(&source);
            let fetcher = Arc::clone(&self.fetcher);
            let documents = Arc::clone(&self.documents);
            let activity = Arc::clone(&self.activity);

            handles.push(tokio::spawn(async move {
                loop {
                    let url = { queue.lock().await.pop_front() };
                    let Some(url) = url else { break };

                    let outcome = process_url(
                        fetcher.as_ref(),
                        documents.as_ref(),
                        activity.as_ref(),
                        &source,
                        &url,
                    )
                    .await;

                    if outcome_tx.send((url, outcome)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(outcome_tx);

        while let Some((url, outcome)) = outcome_rx.recv().await {
            match outcome {
                UrlOutcome::Persisted => report.persisted += 1,
                UrlOutcome::Skipped => report.skipped += 1,
                UrlOutcome::Failed(reason) => report.failures.push(UrlFailure { url, reason }),
            }
        }

        for handle in handles {
            let _ = handle.await;
        }

        self.activity.activity(
            "SCRAPE_COMPLETE",
            json!({
                "platform": source.platform.to_string(),
                "discovered": report.discovered,
                "persisted": report.persisted,
                "skipped": report.skipped,
                "failed": report.failures.len(),
            }),
        );

        Ok(report)
    }

    /// Ingests every source in turn, continuing past sources whose
    /// discovery fails.
    pub async fn run_all(&self, sources: &[DocSource]) -> Vec<SourceReport> {
        let mut reports = Vec::with_capacity(sources.len());

        for source in sources {
            match self.run(source).await {
                Ok(report) => reports.push(report),
                Err(error) => {
                    self.activity.error(
                        &error,
                        json!({
                            "operation": "scrape_source",
                            "platform": source.platform.to_string(),
                        }),
                    );
                    let mut report = SourceReport::empty(source.platform);
                    report.failures.push(UrlFailure {
                        url: source.base_url.clone(),
                        reason: error.to_string(),
                    });
                    reports.push(report);
                }
            }
        }

        reports
    }
}

async fn process_url(
    fetcher: &dyn PageFetcher,
    documents: &dyn DocumentRepository,
    activity: &dyn ActivityLog,
    source: &DocSource,
    url: &str,
) -> UrlOutcome {
    match try_process_url(fetcher, documents, activity, source, url).await {
        Ok(outcome) => outcome,
        Err(error) => {
            activity.error(
                &error,
                json!({
                    "operation": "process_document",
                    "url": url,
                    "platform": source.platform.to_string(),
                }),
            );
            UrlOutcome::Failed(error.to_string())
        }
    }
}

async fn try_process_url(
    fetcher: &dyn PageFetcher,
    documents: &dyn DocumentRepository,
    activity: &dyn ActivityLog,
    source: &DocSource,
    url: &str,
) -> Result<UrlOutcome, DomainError> {
    if documents.exists(url, source.platform).await? {
        return Ok(UrlOutcome::Skipped);
    }

    let html = fetcher.fetch(url).await?;
    let extracted = extract::extract_document(&html, &source.rules);

    if extracted.content == NO_CONTENT
        || extracted.content.chars().count() < source.min_content_chars
    {
        return Err(DomainError::validation(format!(
            "Insufficient content extracted from {url}"
        )));
    }

    let document = documents
        .create(NewDocument::new(
            source.platform,
            extracted.title,
            extracted.content,
            url,
        ))
        .await?;

    activity.activity(
        "DOCUMENT_SAVED",
        json!({
            "platform": source.platform.to_string(),
            "url": url,
            "title": document.title,
            "content_chars": document.content.chars().count(),
        }),
    );

    Ok(UrlOutcome::Persisted)
}
