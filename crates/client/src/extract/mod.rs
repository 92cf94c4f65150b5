//! Readable content extraction.
//!
//! Two layers live here:
//!
//! - [`Extractor`]: a stable trait over the readability engine, with the
//!   Lectito implementation (Readability.js-inspired scoring, best
//!   candidate selection, cleanup).
//! - [`ContentExtractor`]: the orchestrator that tries the direct feed,
//!   the discovered feed and finally readability, returning an
//!   [`ExtractedContent`].

pub mod orchestrator;
pub mod text;

pub use orchestrator::ContentExtractor;
pub use text::{normalize_text, strip_html};

use lectito_core::{Document, ExtractConfig as LectitoConfig};
use quizify_core::{AppConfig, Error};
use serde::{Deserialize, Serialize};
use url::Url;

/// Which strategy produced the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// The submitted URL was itself a feed.
    DirectFeed,
    /// A feed advertised by the page's `<head>`.
    DiscoveredFeed,
    /// Boilerplate stripping of the page HTML.
    Readability,
}

/// Outcome of content extraction.
///
/// Either `plain_text` is present (success) or `extraction_error` is
/// (failure), never both. Build values with [`ExtractedContent::success`]
/// and [`ExtractedContent::failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub plain_text: Option<String>,
    pub html_content: Option<String>,
    pub extraction_error: Option<String>,
    pub strategy: Option<ExtractionStrategy>,
    /// The page told visitors to enable JavaScript, so the text may be partial.
    #[serde(default)]
    pub requires_javascript: bool,
}

impl ExtractedContent {
    pub fn success(
        strategy: ExtractionStrategy, title: Option<String>, plain_text: String, html_content: Option<String>,
    ) -> Self {
        Self {
            title,
            plain_text: Some(plain_text),
            html_content,
            extraction_error: None,
            strategy: Some(strategy),
            requires_javascript: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            title: None,
            plain_text: None,
            html_content: None,
            extraction_error: Some(message.into()),
            strategy: None,
            requires_javascript: false,
        }
    }

    pub fn with_requires_javascript(mut self, requires_javascript: bool) -> Self {
        self.requires_javascript = requires_javascript;
        self
    }

    /// Non-blank plain text, if extraction succeeded.
    pub fn text(&self) -> Option<&str> {
        self.plain_text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

/// Readability tuning, loaded from `AppConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Candidates other than `article`, `section` or `main` are skipped when
    /// their text is shorter than a tenth of this.
    pub char_threshold: usize,
    pub max_top_candidates: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            char_threshold: config.readability_char_threshold,
            max_top_candidates: config.readability_max_candidates,
        }
    }
}

impl ExtractConfig {
    fn to_lectito_config(self) -> LectitoConfig {
        LectitoConfig {
            max_top_candidates: self.max_top_candidates,
            char_threshold: self.char_threshold,
            ..LectitoConfig::default()
        }
    }
}

/// Main article content of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadableArticle {
    pub title: Option<String>,
    /// Cleaned article HTML.
    pub html: String,
    /// `html` with markup stripped; never blank.
    pub text: String,
}

/// Stable extractor trait so the readability engine can be swapped.
pub trait Extractor: Send + Sync {
    /// Extract the main article from HTML.
    ///
    /// A page without readable text is an error, not an empty article.
    fn extract(&self, html: &str, base_url: &Url) -> Result<ReadableArticle, Error>;
}

/// Lectito-based extractor implementation.
#[derive(Debug, Clone, Default)]
pub struct LectitoExtractor {
    config: ExtractConfig,
}

impl LectitoExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }
}

impl Extractor for LectitoExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Result<ReadableArticle, Error> {
        let doc = Document::parse(html).map_err(|e| Error::ExtractFailed(format!("failed to parse HTML: {}", e)))?;

        let extracted = lectito_core::extract_content(&doc, &self.config.to_lectito_config())
            .map_err(|e| Error::ExtractFailed(format!("readability failed for {base_url}: {}", e)))?;

        let text = strip_html(&extracted.content);
        if text.is_empty() {
            return Err(Error::ExtractFailed(format!("no readable text found at {base_url}")));
        }

        let title = doc.extract_metadata().title.filter(|title| !title.trim().is_empty());

        Ok(ReadableArticle { title, html: extracted.content, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>How Tides Work</title></head>
        <body>
            <nav><a href="/">Home</a> <a href="/about">About</a></nav>
            <article>
                <h1>How Tides Work</h1>
                <p>Tides are the regular rise and fall of sea level caused by the gravitational
                pull of the Moon and the Sun acting on the rotating Earth. Most coastlines see two
                high tides and two low tides every lunar day, which lasts about twenty-four hours
                and fifty minutes.</p>
                <p>The Moon has the larger effect because it is much closer to the Earth than the
                Sun. When the Sun, Moon and Earth line up, their pulls combine to produce spring
                tides with an unusually large range between high and low water.</p>
                <p>When the Sun and Moon are at right angles relative to the Earth, their pulls
                partly cancel. The result is a neap tide, with a smaller than usual range. Local
                geography such as bays and estuaries can amplify or dampen these effects.</p>
            </article>
            <footer>Copyright Example Ocean Society</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_extract_config_follows_app_config() {
        assert_eq!(ExtractConfig::default(), ExtractConfig { char_threshold: 200, max_top_candidates: 5 });

        let app = AppConfig { readability_char_threshold: 100, readability_max_candidates: 3, ..Default::default() };
        let lectito_cfg = ExtractConfig::from(&app).to_lectito_config();
        assert_eq!(lectito_cfg.char_threshold, 100);
        assert_eq!(lectito_cfg.max_top_candidates, 3);
    }

    #[test]
    fn test_extractor_with_app_config() {
        let base = Url::parse("https://example.com/tides").unwrap();
        let app = AppConfig { readability_char_threshold: 100, readability_max_candidates: 3, ..Default::default() };
        let article = LectitoExtractor::with_config(ExtractConfig::from(&app)).extract(ARTICLE_HTML, &base).unwrap();
        assert!(article.text.contains("spring"));
    }

    #[test]
    fn test_lectito_extracts_article() {
        let base = Url::parse("https://example.com/tides").unwrap();
        let article = LectitoExtractor::new().extract(ARTICLE_HTML, &base).unwrap();

        assert_eq!(article.title.as_deref(), Some("How Tides Work"));
        assert!(article.text.contains("gravitational"));
        assert!(article.text.contains("neap tide"));
        assert!(!article.text.contains('<'));
    }

    #[test]
    fn test_extract_empty_html() {
        let base = Url::parse("https://example.com").unwrap();
        assert!(LectitoExtractor::new().extract("", &base).is_err());
    }

    #[test]
    fn test_extract_invalid_html() {
        let base = Url::parse("https://example.com").unwrap();
        assert!(LectitoExtractor::new().extract("not really html", &base).is_err());
    }

    #[test]
    fn test_extracted_content_invariant() {
        let ok = ExtractedContent::success(ExtractionStrategy::Readability, None, "text".into(), None);
        assert!(ok.extraction_error.is_none());
        assert_eq!(ok.text(), Some("text"));

        let failed = ExtractedContent::failure("boom");
        assert!(failed.plain_text.is_none());
        assert_eq!(failed.text(), None);
        assert_eq!(failed.extraction_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_extracted_content_wire_format() {
        let ok = ExtractedContent::success(ExtractionStrategy::DirectFeed, Some("T".into()), "body".into(), None);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["plainText"], "body");
        assert_eq!(json["strategy"], "direct_feed");
        assert!(json["extractionError"].is_null());
    }
}
