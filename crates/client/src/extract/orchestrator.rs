//! Strategy orchestration: direct feed, discovered feed, readability.
//!
//! The article URL is fetched once. Its body is first tried as a feed; if
//! that fails the same body is treated as the page HTML for feed discovery
//! and, last, for readability. Strategies run strictly in order and the
//! first one yielding non-blank text wins.

use quizify_core::{AppConfig, Error};
use url::Url;

use super::{ExtractConfig, ExtractedContent, ExtractionStrategy, Extractor, LectitoExtractor};
use crate::feed::{FeedEntryContent, FeedReader, discover_feed, parse_entry};
use crate::fetch::{FetchClient, FetchConfig};

/// Runs the extraction strategies for an article URL.
pub struct ContentExtractor {
    fetch: FetchClient,
    feeds: FeedReader,
    readability: Box<dyn Extractor>,
}

impl ContentExtractor {
    pub fn new(fetch: FetchClient, readability: Box<dyn Extractor>) -> Self {
        let feeds = FeedReader::new(fetch.clone());
        Self { fetch, feeds, readability }
    }

    /// Build with the configured fetch and readability settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let fetch = FetchClient::new(FetchConfig::from(config))?;
        Ok(Self::new(fetch, Box::new(LectitoExtractor::with_config(ExtractConfig::from(config)))))
    }

    /// Extract readable text for `url`.
    ///
    /// Never fails outright: when every strategy fails the returned value
    /// carries an `extraction_error` naming each failure.
    pub async fn extract(&self, url: &Url) -> ExtractedContent {
        let mut failures: Vec<String> = Vec::new();

        let page = match self.fetch.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "article fetch failed");
                return ExtractedContent::failure(format!("Failed to extract content: {e}"));
            }
        };

        match parse_entry(&page.bytes, &page.final_url, None) {
            Ok(Some(entry)) => {
                tracing::info!(url = %url, "extracted content from direct feed");
                return from_feed_entry(ExtractionStrategy::DirectFeed, entry);
            }
            Ok(None) => failures.push("direct feed: no entry with content".into()),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "URL is not a feed");
                failures.push(format!("direct feed: {e}"));
            }
        }

        let html = page.text();
        let requires_javascript = html.contains("Enable JavaScript");
        if requires_javascript {
            tracing::warn!(url = %url, "page asks for JavaScript; extracted content may be incomplete");
        }

        match discover_feed(&html, &page.final_url) {
            Some(feed_url) => match self.feeds.read_entry(&feed_url, Some(url)).await {
                Ok(Some(entry)) => {
                    tracing::info!(url = %url, feed = %feed_url, "extracted content from discovered feed");
                    return from_feed_entry(ExtractionStrategy::DiscoveredFeed, entry)
                        .with_requires_javascript(requires_javascript);
                }
                Ok(None) => failures.push(format!("discovered feed {feed_url}: no entry with content")),
                Err(e) => {
                    tracing::warn!(url = %url, feed = %feed_url, error = %e, "discovered feed failed");
                    failures.push(format!("discovered feed {feed_url}: {e}"));
                }
            },
            None => failures.push("feed discovery: page advertises no RSS/Atom feed".into()),
        }

        let extracted = match self.readability.extract(&html, &page.final_url) {
            Ok(article) => {
                tracing::info!(url = %url, chars = article.text.len(), "extracted content with readability");
                ExtractedContent::success(ExtractionStrategy::Readability, article.title, article.text, Some(article.html))
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "readability failed");
                failures.push(format!("readability: {e}"));
                ExtractedContent::failure(format!("Failed to extract content: {}", failures.join("; ")))
            }
        };
        extracted.with_requires_javascript(requires_javascript)
    }
}

fn from_feed_entry(strategy: ExtractionStrategy, entry: FeedEntryContent) -> ExtractedContent {
    ExtractedContent::success(strategy, entry.title, entry.text, Some(entry.html))
}
