//! RSS / Atom feed reading.
//!
//! Feeds are parsed with feed-rs. An entry's body is taken from the first
//! non-blank field in priority order:
//!
//! 1. full content (`content:encoded`, Atom `<content>`)
//! 2. summary (`<description>`, Atom `<summary>`)
//! 3. media description
//!
//! The chosen HTML is stripped to plain text; an entry whose text is blank
//! counts as having no content.

pub mod discover;

pub use discover::discover_feed;

use feed_rs::model::Entry;
use quizify_core::Error;
use url::Url;

use crate::extract::text::strip_html;
use crate::fetch::{FetchClient, same_document};

/// Content pulled from a single feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntryContent {
    pub title: Option<String>,
    /// The entry's own link, when present.
    pub link: Option<String>,
    /// The raw content field as published.
    pub html: String,
    /// `html` with markup stripped.
    pub text: String,
}

/// Fetches feeds and extracts entry content.
#[derive(Debug, Clone)]
pub struct FeedReader {
    fetch: FetchClient,
}

impl FeedReader {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Fetch `feed_url` and extract the entry for `target` (or the first).
    ///
    /// `Ok(None)` means the feed parsed but yielded no usable entry.
    pub async fn read_entry(&self, feed_url: &Url, target: Option<&Url>) -> Result<Option<FeedEntryContent>, Error> {
        let response = self.fetch.fetch(feed_url).await?;
        parse_entry(&response.bytes, &response.final_url, target)
    }
}

/// Parse feed bytes and extract the entry for `target` (or the first).
///
/// # Errors
///
/// Returns `Error::FeedParse` when the bytes are not a recognisable feed.
pub fn parse_entry(bytes: &[u8], feed_url: &Url, target: Option<&Url>) -> Result<Option<FeedEntryContent>, Error> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| Error::FeedParse(format!("{feed_url}: {e}")))?;

    tracing::debug!(feed = %feed_url, entries = feed.entries.len(), "parsed feed");

    Ok(select_entry(&feed.entries, feed_url, target).and_then(entry_content))
}

/// Prefer the entry whose link (or permalink id) names `target`, else the
/// first entry.
fn select_entry<'a>(entries: &'a [Entry], feed_url: &Url, target: Option<&Url>) -> Option<&'a Entry> {
    let matching = target.and_then(|target| {
        entries.iter().find(|entry| {
            entry.links.iter().any(|link| same_document(&link.href, Some(feed_url), target))
                || same_document(&entry.id, None, target)
        })
    });

    if target.is_some() && matching.is_none() {
        tracing::debug!(feed = %feed_url, "no entry links to the article; using the first entry");
    }

    matching.or_else(|| entries.first())
}

fn entry_content(entry: &Entry) -> Option<FeedEntryContent> {
    let full = entry.content.as_ref().and_then(|content| content.body.as_deref());
    let summary = entry.summary.as_ref().map(|text| text.content.as_str());
    let media = entry
        .media
        .iter()
        .find_map(|object| object.description.as_ref().map(|text| text.content.as_str()));

    let html = [full, summary, media].into_iter().flatten().find(|body| !body.trim().is_empty())?;
    let text = strip_html(html);
    if text.is_empty() {
        return None;
    }

    Some(FeedEntryContent {
        title: entry
            .title
            .as_ref()
            .map(|title| title.content.trim().to_string())
            .filter(|title| !title.is_empty()),
        link: entry.links.first().map(|link| link.href.clone()),
        html: html.to_string(),
        text,
    })
}
