//! Prompt context assembly
//!
//! Builds the system context handed to the generation backend from the
//! role preamble, recent conversation turns, ranked documentation
//! excerpts, and platform terminology. The result is always hard-capped
//! at `max_context_chars` on a char boundary.

use crate::domain::conversation::ConversationTurn;
use crate::domain::document::RankedDocument;
use crate::domain::text;
use crate::domain::CdpPlatform;

/// Section sizing for the assembled context.
#[derive(Debug, Clone)]
pub struct ContextAssemblerConfig {
    /// Most recent turns included, oldest first in the output.
    pub max_history: usize,
    /// Per-document excerpt cap in chars.
    pub max_doc_excerpt_chars: usize,
    /// Hard cap on the assembled context in chars.
    pub max_context_chars: usize,
}

impl Default for ContextAssemblerConfig {
    fn default() -> Self {
        Self {
            max_history: 5,
            max_doc_excerpt_chars: 500,
            max_context_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: ContextAssemblerConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextAssemblerConfig) -> Self {
        Self { config }
    }

    /// Assembles the system context.
    ///
    /// `history` is expected newest first (repository order) and is
    /// reversed into chronological order. Sections with no content are
    /// omitted entirely.
    pub fn build(
        &self,
        history: &[ConversationTurn],
        documents: &[RankedDocument],
        platform: Option<CdpPlatform>,
    ) -> String {
        let mut out = preamble(platform);

        let recent: Vec<&ConversationTurn> =
            history.iter().take(self.config.max_history).collect();
        if !recent.is_empty() {
            out.push_str("\n\nPrevious conversation:\n");
            for turn in recent.iter().rev() {
                out.push_str("User: ");
                out.push_str(&turn.query);
                out.push('\n');
                out.push_str("Assistant: ");
                out.push_str(&turn.response);
                out.push('\n');
            }
        }

        if !documents.is_empty() {
            out.push_str("\nRelevant documentation:\n");
            for ranked in documents {
                out.push_str(&ranked.document.title);
                out.push('\n');
                out.push_str(&text::truncate_chars(
                    &ranked.document.content,
                    self.config.max_doc_excerpt_chars,
                ));
                out.push_str("\n\n");
            }
        }

        if let Some(platform) = platform {
            out.push_str(&format!(
                "\nRelevant {platform} terminology and concepts:\n"
            ));
            out.push_str(&platform.keywords().join(", "));
            out.push_str(&format!(
                "\n\nOfficial documentation: {}",
                platform.docs_url()
            ));
        }

        text::truncate_chars(&out, self.config.max_context_chars)
    }
}

fn preamble(platform: Option<CdpPlatform>) -> String {
    let mut prompt = String::from("You are a helpful CDP support agent. ");

    match platform {
        Some(platform) => {
            prompt.push_str(&format!(
                "You specialize in the {platform} platform and will use specific {platform} \
                 terminology and features in your responses."
            ));
        }
        None => {
            prompt.push_str(
                "You are knowledgeable about various CDP platforms including Segment, \
                 mParticle, Lytics, and Zeotap.",
            );
        }
    }

    prompt.push_str(
        "\nGuidelines:\n\
         - Provide clear, step-by-step instructions when explaining procedures\n\
         - Include relevant documentation links when available\n\
         - If uncertain, admit it and suggest checking the official documentation\n\
         - Keep responses focused on CDP-related topics\n\
         - Use technical terms accurately and consistently\n\
         - Format code examples in proper markdown code blocks\n\
         - Break down complex concepts into digestible parts",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::document::Document;

    fn turn(query: &str, response: &str) -> ConversationTurn {
        ConversationTurn {
            id: Uuid::new_v4(),
            session_id: "s1".to_string(),
            query: query.to_string(),
            response: response.to_string(),
            platform: Some(CdpPlatform::Segment),
            timestamp: Utc::now(),
        }
    }

    fn ranked(title: &str, content: &str) -> RankedDocument {
        let now = Utc::now();
        RankedDocument {
            document: Document {
                id: Uuid::new_v4(),
                platform: CdpPlatform::Segment,
                title: title.to_string(),
                content: content.to_string(),
                url: "https://segment.com/docs".to_string(),
                created_at: now,
                updated_at: now,
            },
            score: 0.5,
        }
    }

    #[test]
    fn test_empty_inputs_still_produce_preamble() {
        let context = ContextAssembler::default().build(&[], &[], None);

        assert!(context.starts_with("You are a helpful CDP support agent."));
        assert!(context.contains("Segment, mParticle, Lytics, and Zeotap"));
        assert!(!context.contains("Previous conversation:"));
        assert!(!context.contains("Relevant documentation:"));
    }

    #[test]
    fn test_platform_specializes_preamble_and_adds_terminology() {
        let context =
            ContextAssembler::default().build(&[], &[], Some(CdpPlatform::Segment));

        assert!(context.contains("You specialize in the SEGMENT platform"));
        assert!(context.contains("Relevant SEGMENT terminology and concepts:"));
        assert!(context.contains("tracking plan"));
        assert!(context.contains("Official documentation: https://segment.com/docs/"));
    }

    #[test]
    fn test_history_is_rendered_chronologically() {
        // Repository order: newest first.
        let history = vec![turn("second question", "b"), turn("first question", "a")];

        let context = ContextAssembler::default().build(&history, &[], None);

        let first = context.find("first question").unwrap();
        let second = context.find("second question").unwrap();
        assert!(first < second);
        assert!(context.contains("User: first question"));
        assert!(context.contains("Assistant: a"));
    }

    #[test]
    fn test_history_is_capped_at_max_history() {
        let history: Vec<ConversationTurn> = (0..8)
            .map(|i| turn(&format!("question {i}"), &format!("answer {i}")))
            .collect();

        let context = ContextAssembler::default().build(&history, &[], None);

        // Newest five survive; the older three are dropped.
        assert!(context.contains("question 0"));
        assert!(context.contains("question 4"));
        assert!(!context.contains("question 5"));
    }

    #[test]
    fn test_document_excerpts_are_truncated() {
        let long_content = "x".repeat(2_000);
        let docs = vec![ranked("Tracking Plans", &long_content)];

        let assembler = ContextAssembler::new(ContextAssemblerConfig {
            max_doc_excerpt_chars: 100,
            ..ContextAssemblerConfig::default()
        });
        let context = assembler.build(&[], &docs, None);

        assert!(context.contains("Tracking Plans"));
        assert!(!context.contains(&"x".repeat(101)));
        assert!(context.contains(&format!("{}...", "x".repeat(97))));
    }

    #[test]
    fn test_overall_cap_is_never_exceeded() {
        let history: Vec<ConversationTurn> = (0..5)
            .map(|_| turn(&"q".repeat(400), &"r".repeat(400)))
            .collect();
        let docs: Vec<RankedDocument> = (0..5)
            .map(|_| ranked("Doc", &"c".repeat(600)))
            .collect();

        let context = ContextAssembler::default().build(
            &history,
            &docs,
            Some(CdpPlatform::Mparticle),
        );

        assert!(context.chars().count() <= 4000);
        assert!(context.ends_with("..."));
    }

    #[test]
    fn test_cap_counts_chars_not_bytes() {
        let docs = vec![ranked("Ünïcôdé", &"é".repeat(5_000))];

        let assembler = ContextAssembler::new(ContextAssemblerConfig {
            max_context_chars: 200,
            ..ContextAssemblerConfig::default()
        });
        let context = assembler.build(&[], &docs, None);

        assert!(context.chars().count() <= 200);
    }
}
