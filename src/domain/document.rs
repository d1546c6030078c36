//! Documentation page entity and repository contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::platform::CdpPlatform;
use super::DomainError;

/// A harvested documentation page.
///
/// `(url, platform)` is unique in the repository; the ingestion pipeline
/// checks existence before inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub platform: CdpPlatform,
    pub title: String,
    pub content: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a document; id and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub platform: CdpPlatform,
    pub title: String,
    pub content: String,
    pub url: String,
}

impl NewDocument {
    pub fn new(
        platform: CdpPlatform,
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            title: title.into(),
            content: content.into(),
            url: url.into(),
        }
    }
}

/// Candidate selection filter for the relevance ranker.
///
/// `keywords` is a coarse containment pre-filter: a document qualifies when
/// any keyword appears (case-insensitive) in its title or content. It
/// reduces the candidate set and never alters ranking order.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub platform: Option<CdpPlatform>,
    pub keywords: Vec<String>,
    pub limit: usize,
}

/// A document paired with its lexical similarity to a query. Transient,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    pub document: Document,
    pub score: f64,
}

/// Opaque document store consumed by ingestion and retrieval.
#[async_trait]
pub trait DocumentRepository: Send + Sync + std::fmt::Debug {
    /// Whether a document with this `(url, platform)` pair already exists.
    async fn exists(&self, url: &str, platform: CdpPlatform) -> Result<bool, DomainError>;

    async fn create(&self, document: NewDocument) -> Result<Document, DomainError>;

    /// Matching documents ordered by `updated_at` descending, capped at
    /// `filter.limit`.
    async fn find_relevant(&self, filter: &DocumentFilter) -> Result<Vec<Document>, DomainError>;
}
