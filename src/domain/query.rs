//! Inbound query contract and validation

use serde::{Deserialize, Serialize};

use super::document::RankedDocument;
use super::platform::CdpPlatform;
use super::text;
use super::DomainError;

/// Maximum accepted query length in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Terms that mark a query as CDP-related. Queries containing none of
/// these are rejected before any generation call.
const CDP_TERMS: &[&str] = &[
    "segment",
    "mparticle",
    "lytics",
    "zeotap",
    "cdp",
    "customer data platform",
    "integration",
    "tracking",
    "analytics",
    "audience",
    "profile",
    "source",
    "destination",
];

/// An inbound user question.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatQuery {
    pub query: String,
    pub platform: Option<CdpPlatform>,
    pub session_id: String,
}

impl ChatQuery {
    pub fn new(query: impl Into<String>, platform: Option<CdpPlatform>) -> Self {
        Self {
            query: query.into(),
            platform,
            session_id: "default".to_string(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

/// The answer returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub relevant_docs: Vec<RankedDocument>,
}

/// Whether the query mentions any recognized CDP term.
pub fn is_cdp_related(query: &str) -> bool {
    let normalized = query.to_lowercase();
    CDP_TERMS.iter().any(|term| normalized.contains(term))
}

/// Sanitizes and validates a raw query, returning the cleaned text.
///
/// Rejects empty and oversized queries, and queries with no recognized
/// CDP term (keyword-absence heuristic).
pub fn validate_query(raw: &str) -> Result<String, DomainError> {
    let sanitized = text::sanitize(raw);

    if sanitized.is_empty() {
        return Err(DomainError::validation("Query cannot be empty"));
    }

    if sanitized.chars().count() > MAX_QUERY_CHARS {
        return Err(DomainError::validation(format!(
            "Query exceeds {} characters",
            MAX_QUERY_CHARS
        )));
    }

    if !is_cdp_related(&sanitized) {
        return Err(DomainError::DomainMismatch);
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_query_is_sanitized() {
        let out = validate_query("  How do I set up   a tracking plan? ").unwrap();
        assert_eq!(out, "How do I set up a tracking plan?");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            validate_query("   "),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_oversized_query_rejected() {
        let long = format!("segment {}", "x".repeat(MAX_QUERY_CHARS));
        assert!(matches!(
            validate_query(&long),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_non_cdp_query_rejected() {
        assert!(matches!(
            validate_query("What is the weather in Paris today?"),
            Err(DomainError::DomainMismatch)
        ));
    }

    #[test]
    fn test_cdp_term_match_is_case_insensitive() {
        assert!(is_cdp_related("Compare SEGMENT and mParticle"));
        assert!(is_cdp_related("what is a Customer Data Platform"));
    }
}
