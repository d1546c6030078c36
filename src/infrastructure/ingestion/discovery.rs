//! Candidate URL discovery

use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use url::Url;

use crate::domain::source::{DocSource, UrlDiscovery};
use crate::domain::DomainError;
use crate::infrastructure::fetch::PageFetcher;

/// Resolves a source's discovery strategy into concrete URLs.
pub async fn discover_urls(
    fetcher: &dyn PageFetcher,
    source: &DocSource,
) -> Result<Vec<String>, DomainError> {
    match &source.discovery {
        UrlDiscovery::FixedList { urls } => Ok(urls.clone()),
        UrlDiscovery::Sitemap { url } => {
            let xml = fetcher.fetch(url).await?;
            parse_sitemap(&xml)
        }
        UrlDiscovery::CrawlAnchors {
            seed,
            href_patterns,
        } => {
            let html = fetcher.fetch(seed).await?;
            Ok(collect_anchor_urls(&html, seed, href_patterns))
        }
    }
}

/// Collects `<loc>` entries from sitemap XML.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, DomainError> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => in_loc = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Ok(Event::Text(t)) if in_loc => {
                let loc = t
                    .unescape()
                    .map_err(|e| DomainError::internal(format!("Invalid sitemap text: {e}")))?;
                let loc = loc.trim();
                if !loc.is_empty() {
                    urls.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DomainError::internal(format!("Invalid sitemap XML: {e}")));
            }
            _ => {}
        }
    }

    Ok(urls)
}

/// Anchor hrefs on a seed page whose path contains any of the given
/// patterns, resolved against the seed and deduplicated in first-seen
/// order.
pub fn collect_anchor_urls(html: &str, seed: &str, href_patterns: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };
    let base = Url::parse(seed).ok();

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href_patterns.iter().any(|pattern| href.contains(pattern)) {
            continue;
        }

        let resolved = if href.starts_with("http") {
            Some(href.to_string())
        } else {
            base.as_ref()
                .and_then(|b| b.join(href).ok())
                .map(|u| u.to_string())
        };

        if let Some(url) = resolved {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }

    urls
}
