//! Keyword-overlap relevance ranking

use std::sync::Arc;

use super::document::{DocumentFilter, DocumentRepository, RankedDocument};
use super::platform::CdpPlatform;
use super::text;
use super::DomainError;

/// How many documents are returned to the context assembler.
pub const DEFAULT_TOP_K: usize = 5;

/// How many pre-filtered candidates are scored.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 50;

/// Scores repository candidates against a query with Jaccard similarity
/// over keyword sets.
///
/// The repository pre-filter (platform + coarse keyword containment) only
/// reduces the candidate set; ordering is decided entirely by the score.
/// The scoring function is a substitution point: any replacement must stay
/// monotonic in shared-keyword count.
#[derive(Debug, Clone)]
pub struct RelevanceRanker {
    documents: Arc<dyn DocumentRepository>,
    top_k: usize,
    candidate_limit: usize,
}

impl RelevanceRanker {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self {
            documents,
            top_k: DEFAULT_TOP_K,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Top documents for a query, highest similarity first.
    ///
    /// Ties keep repository order (most recently updated first); documents
    /// sharing no keywords with the query score 0 but are not excluded.
    pub async fn find_relevant(
        &self,
        query: &str,
        platform: Option<CdpPlatform>,
    ) -> Result<Vec<RankedDocument>, DomainError> {
        let keywords: Vec<String> = text::extract_keywords(query).into_iter().collect();

        let filter = DocumentFilter {
            platform,
            keywords,
            limit: self.candidate_limit,
        };

        let candidates = self.documents.find_relevant(&filter).await?;

        let mut ranked: Vec<RankedDocument> = candidates
            .into_iter()
            .map(|document| {
                let score = text::jaccard_similarity(query, &document.content);
                RankedDocument { document, score }
            })
            .collect();

        // Stable sort keeps repository order for equal scores.
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.top_k);

        Ok(ranked)
    }
}
