//! Documentation source descriptors
//!
//! Each source is a small data record (base URL, URL discovery strategy,
//! extraction rules) consumed by the ingestion pipeline. Per-platform
//! behavior is data, not subclassing.

use super::platform::CdpPlatform;

/// How candidate URLs are discovered for a source.
#[derive(Debug, Clone)]
pub enum UrlDiscovery {
    /// Parse `<loc>` entries from a sitemap.
    Sitemap { url: String },
    /// Crawl anchor tags on a seed page, keeping hrefs that contain any of
    /// the given patterns.
    CrawlAnchors {
        seed: String,
        href_patterns: Vec<String>,
    },
    /// A fixed list of known entry points.
    FixedList { urls: Vec<String> },
}

/// Markup extraction rules for one source.
///
/// Selectors are either tag names (`"nav"`) or class selectors
/// (`".sidebar"`). Script and style content is always stripped regardless
/// of these rules.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub strip_selectors: &'static [&'static str],
    pub content_selectors: &'static [&'static str],
    /// Suffix removed from `<title>` fallbacks, e.g. `" | Lytics Docs"`.
    pub title_suffix: Option<&'static str>,
}

/// A documentation source for one platform.
#[derive(Debug, Clone)]
pub struct DocSource {
    pub platform: CdpPlatform,
    pub base_url: String,
    pub discovery: UrlDiscovery,
    pub rules: ExtractionRules,
    /// Pages with less extracted content than this are rejected per URL.
    pub min_content_chars: usize,
}

/// The built-in source table for the four supported platforms.
pub fn default_sources() -> Vec<DocSource> {
    vec![
        DocSource {
            platform: CdpPlatform::Segment,
            base_url: "https://segment.com".to_string(),
            discovery: UrlDiscovery::FixedList {
                urls: vec![
                    "https://segment.com/api/docs".to_string(),
                    "https://segment.com/api/reference".to_string(),
                    "https://segment.com/docs/api".to_string(),
                ],
            },
            rules: ExtractionRules {
                strip_selectors: &["nav", "header", "footer"],
                content_selectors: &[".documentation", ".content", "main"],
                title_suffix: None,
            },
            min_content_chars: 100,
        },
        DocSource {
            platform: CdpPlatform::Mparticle,
            base_url: "https://docs.mparticle.com".to_string(),
            discovery: UrlDiscovery::CrawlAnchors {
                seed: "https://docs.mparticle.com".to_string(),
                href_patterns: vec![
                    "/docs/".to_string(),
                    "/guides/".to_string(),
                    "/reference/".to_string(),
                ],
            },
            rules: ExtractionRules {
                strip_selectors: &[".navigation", ".header", ".footer"],
                content_selectors: &[".docs-content", "article", ".main-content"],
                title_suffix: None,
            },
            min_content_chars: 1,
        },
        DocSource {
            platform: CdpPlatform::Lytics,
            base_url: "https://learn.lytics.com".to_string(),
            discovery: UrlDiscovery::Sitemap {
                url: "https://learn.lytics.com/sitemap.xml".to_string(),
            },
            rules: ExtractionRules {
                strip_selectors: &[".header", ".footer", ".sidebar", ".nav"],
                content_selectors: &[".documentation-content", ".main-content", "article"],
                title_suffix: Some(" | Lytics Docs"),
            },
            min_content_chars: 1,
        },
        DocSource {
            platform: CdpPlatform::Zeotap,
            base_url: "https://docs.zeotap.com".to_string(),
            discovery: UrlDiscovery::CrawlAnchors {
                seed: "https://docs.zeotap.com".to_string(),
                href_patterns: vec!["/home/".to_string(), "/docs/".to_string()],
            },
            rules: ExtractionRules {
                strip_selectors: &[".nav", ".header", ".footer", ".sidebar"],
                content_selectors: &[".article-content", ".main-content", "article", "main"],
                title_suffix: None,
            },
            min_content_chars: 1,
        },
    ]
}
