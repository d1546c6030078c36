//! In-memory repository implementations
//!
//! Process-local stores behind the domain repository traits. They hold the
//! same contracts a database-backed implementation would, so swapping one
//! in later touches wiring only.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::conversation::{ConversationRepository, ConversationTurn, NewConversationTurn};
use crate::domain::document::{Document, DocumentFilter, DocumentRepository, NewDocument};
use crate::domain::{CdpPlatform, DomainError};

/// Documents in a process-local vector, insertion-ordered.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_filter(document: &Document, filter: &DocumentFilter) -> bool {
    if let Some(platform) = filter.platform {
        if document.platform != platform {
            return false;
        }
    }

    if filter.keywords.is_empty() {
        return true;
    }

    let title = document.title.to_lowercase();
    let content = document.content.to_lowercase();
    filter
        .keywords
        .iter()
        .any(|keyword| {
            let keyword = keyword.to_lowercase();
            title.contains(&keyword) || content.contains(&keyword)
        })
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn exists(&self, url: &str, platform: CdpPlatform) -> Result<bool, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| DomainError::persistence("Document store lock poisoned"))?;

        Ok(documents
            .iter()
            .any(|doc| doc.url == url && doc.platform == platform))
    }

    async fn create(&self, document: NewDocument) -> Result<Document, DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| DomainError::persistence("Document store lock poisoned"))?;

        if documents
            .iter()
            .any(|doc| doc.url == document.url && doc.platform == document.platform)
        {
            return Err(DomainError::persistence(format!(
                "Document already exists for {} on {}",
                document.url, document.platform
            )));
        }

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            platform: document.platform,
            title: document.title,
            content: document.content,
            url: document.url,
            created_at: now,
            updated_at: now,
        };

        documents.push(document.clone());
        Ok(document)
    }

    async fn find_relevant(&self, filter: &DocumentFilter) -> Result<Vec<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| DomainError::persistence("Document store lock poisoned"))?;

        let mut matched: Vec<Document> = documents
            .iter()
            .filter(|doc| matches_filter(doc, filter))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matched.truncate(filter.limit);

        Ok(matched)
    }
}

/// Conversation turns in a process-local vector, append-only.
#[derive(Debug, Default)]
pub struct InMemoryConversationRepository {
    turns: RwLock<Vec<ConversationTurn>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create(&self, turn: NewConversationTurn) -> Result<ConversationTurn, DomainError> {
        let mut turns = self
            .turns
            .write()
            .map_err(|_| DomainError::persistence("Conversation store lock poisoned"))?;

        let turn = ConversationTurn {
            id: Uuid::new_v4(),
            session_id: turn.session_id,
            query: turn.query,
            response: turn.response,
            platform: turn.platform,
            timestamp: Utc::now(),
        };

        turns.push(turn.clone());
        Ok(turn)
    }

    async fn recent(
        &self,
        session_id: &str,
        platform: Option<CdpPlatform>,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        let turns = self
            .turns
            .read()
            .map_err(|_| DomainError::persistence("Conversation store lock poisoned"))?;

        let mut matched: Vec<ConversationTurn> = turns
            .iter()
            .filter(|turn| {
                turn.session_id == session_id
                    && platform.is_none_or(|p| turn.platform == Some(p))
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(limit);

        Ok(matched)
    }

    async fn delete_session(&self, session_id: &str) -> Result<u64, DomainError> {
        let mut turns = self
            .turns
            .write()
            .map_err(|_| DomainError::persistence("Conversation store lock poisoned"))?;

        let before = turns.len();
        turns.retain(|turn| turn.session_id != session_id);

        Ok((before - turns.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(platform: CdpPlatform, title: &str, content: &str, url: &str) -> NewDocument {
        NewDocument::new(platform, title, content, url)
    }

    #[tokio::test]
    async fn test_create_then_exists() {
        let repo = InMemoryDocumentRepository::new();

        repo.create(doc(
            CdpPlatform::Segment,
            "Sources",
            "Sources collect events",
            "https://segment.com/docs/sources",
        ))
        .await
        .unwrap();

        assert!(repo
            .exists("https://segment.com/docs/sources", CdpPlatform::Segment)
            .await
            .unwrap());
        assert!(!repo
            .exists("https://segment.com/docs/sources", CdpPlatform::Lytics)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_url_platform_is_rejected() {
        let repo = InMemoryDocumentRepository::new();
        let url = "https://segment.com/docs/sources";

        repo.create(doc(CdpPlatform::Segment, "Sources", "body", url))
            .await
            .unwrap();

        let err = repo
            .create(doc(CdpPlatform::Segment, "Sources again", "body", url))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Persistence { .. }));

        // Same URL on another platform is a distinct document.
        repo.create(doc(CdpPlatform::Mparticle, "Sources", "body", url))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_relevant_filters_by_platform_and_keyword() {
        let repo = InMemoryDocumentRepository::new();

        repo.create(doc(
            CdpPlatform::Segment,
            "Tracking Plans",
            "Events and properties",
            "https://a.example/1",
        ))
        .await
        .unwrap();
        repo.create(doc(
            CdpPlatform::Lytics,
            "Audiences",
            "Behavioral segments",
            "https://a.example/2",
        ))
        .await
        .unwrap();

        let found = repo
            .find_relevant(&DocumentFilter {
                platform: Some(CdpPlatform::Segment),
                keywords: vec!["tracking".to_string()],
                limit: 10,
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Tracking Plans");
    }

    #[tokio::test]
    async fn test_keyword_match_is_case_insensitive_any() {
        let repo = InMemoryDocumentRepository::new();

        repo.create(doc(
            CdpPlatform::Segment,
            "Privacy Portal",
            "Classify customer information",
            "https://a.example/privacy",
        ))
        .await
        .unwrap();

        let found = repo
            .find_relevant(&DocumentFilter {
                platform: None,
                keywords: vec!["PRIVACY".to_string(), "unrelated".to_string()],
                limit: 10,
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_find_relevant_respects_limit() {
        let repo = InMemoryDocumentRepository::new();

        for i in 0..5 {
            repo.create(doc(
                CdpPlatform::Segment,
                "Doc",
                "shared keyword body",
                &format!("https://a.example/{i}"),
            ))
            .await
            .unwrap();
        }

        let found = repo
            .find_relevant(&DocumentFilter {
                platform: None,
                keywords: vec!["shared".to_string()],
                limit: 3,
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first_with_limit() {
        let repo = InMemoryConversationRepository::new();

        for i in 0..4 {
            repo.create(NewConversationTurn {
                session_id: "s1".to_string(),
                query: format!("q{i}"),
                response: format!("r{i}"),
                platform: None,
            })
            .await
            .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let recent = repo.recent("s1", None, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].query, "q3");
        assert_eq!(recent[1].query, "q2");
    }

    #[tokio::test]
    async fn test_recent_filters_by_platform() {
        let repo = InMemoryConversationRepository::new();

        repo.create(NewConversationTurn {
            session_id: "s1".to_string(),
            query: "segment question".to_string(),
            response: "answer".to_string(),
            platform: Some(CdpPlatform::Segment),
        })
        .await
        .unwrap();
        repo.create(NewConversationTurn {
            session_id: "s1".to_string(),
            query: "lytics question".to_string(),
            response: "answer".to_string(),
            platform: Some(CdpPlatform::Lytics),
        })
        .await
        .unwrap();

        let recent = repo
            .recent("s1", Some(CdpPlatform::Lytics), 10)
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "lytics question");
    }

    #[tokio::test]
    async fn test_delete_session_counts_and_isolates() {
        let repo = InMemoryConversationRepository::new();

        for session in ["s1", "s1", "s2"] {
            repo.create(NewConversationTurn {
                session_id: session.to_string(),
                query: "q".to_string(),
                response: "r".to_string(),
                platform: None,
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.delete_session("s1").await.unwrap(), 2);
        assert_eq!(repo.recent("s1", None, 10).await.unwrap().len(), 0);
        assert_eq!(repo.recent("s2", None, 10).await.unwrap().len(), 1);
    }
}
