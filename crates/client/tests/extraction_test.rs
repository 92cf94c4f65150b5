//! Integration tests for the extraction strategies using wiremock
//!
//! Each test serves the article (and any feed) from a mock server and checks
//! which strategy produced the text.

use quizify_client::{ContentExtractor, ExtractionStrategy, FetchClient, FetchConfig, LectitoExtractor};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_BODY: &str = r#"
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
"#;

fn page(head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>How Tides Work</title>{head_extra}</head>
<body><nav><a href="/">Home</a></nav>{body}<footer>Example Ocean Society</footer></body>
</html>"#
    )
}

fn rss(items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Ocean Blog</title>
    <link>https://ocean.example/</link>
    <description>Posts</description>
    {items}
  </channel>
</rss>"#
    )
}

fn extractor() -> ContentExtractor {
    let fetch = FetchClient::new(FetchConfig { timeout: Duration::from_secs(5), ..FetchConfig::default() }).unwrap();
    ContentExtractor::new(fetch, Box::new(LectitoExtractor::new()))
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

/// A URL that is itself a feed is read directly
#[tokio::test]
async fn test_direct_feed() {
    let mock_server = MockServer::start().await;
    let feed = rss(r#"<item>
        <title>Spring Tides</title>
        <link>https://ocean.example/spring</link>
        <content:encoded><![CDATA[<p>Spring tides happen at <em>new</em> and full moon.</p>]]></content:encoded>
    </item>"#);

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed).insert_header("content-type", "application/rss+xml"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/feed.xml")).await;

    assert_eq!(extracted.strategy, Some(ExtractionStrategy::DirectFeed));
    assert_eq!(extracted.title.as_deref(), Some("Spring Tides"));
    assert_eq!(extracted.text(), Some("Spring tides happen at new and full moon."));
    assert!(extracted.extraction_error.is_none());
}

/// A feed advertised in the page head supplies the matching entry
#[tokio::test]
async fn test_discovered_feed_matches_article() {
    let mock_server = MockServer::start().await;
    let article_url = url(&mock_server, "/posts/tides");
    let feed = rss(&format!(
        r#"<item>
            <title>Another Post</title>
            <link>{other}</link>
            <description>Something else entirely.</description>
        </item>
        <item>
            <title>How Tides Work</title>
            <link>{article_url}</link>
            <description><![CDATA[<p>Feed copy of the tides article.</p>]]></description>
        </item>"#,
        other = url(&mock_server, "/posts/other"),
    ));

    Mock::given(method("GET"))
        .and(path("/posts/tides"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            r#"<link rel="alternate" type="application/rss+xml" href="/feed.xml">"#,
            ARTICLE_BODY,
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&article_url).await;

    assert_eq!(extracted.strategy, Some(ExtractionStrategy::DiscoveredFeed));
    assert_eq!(extracted.title.as_deref(), Some("How Tides Work"));
    assert_eq!(extracted.text(), Some("Feed copy of the tides article."));
}

/// Without a feed the page itself is run through readability
#[tokio::test]
async fn test_readability_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tides"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("", ARTICLE_BODY)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/tides")).await;

    assert_eq!(extracted.strategy, Some(ExtractionStrategy::Readability));
    let text = extracted.text().expect("readability text");
    assert!(text.contains("gravitational"));
    assert!(!text.contains('<'));
    assert!(extracted.html_content.is_some());
    assert!(!extracted.requires_javascript);
}

/// A page asking for JavaScript still extracts but is flagged
#[tokio::test]
async fn test_javascript_notice_is_flagged() {
    let mock_server = MockServer::start().await;
    let body = format!("<noscript>Enable JavaScript to view comments.</noscript>{ARTICLE_BODY}");

    Mock::given(method("GET"))
        .and(path("/tides"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("", &body)))
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/tides")).await;

    assert_eq!(extracted.strategy, Some(ExtractionStrategy::Readability));
    assert!(extracted.text().is_some_and(|text| text.contains("neap tide")));
    assert!(extracted.requires_javascript);

    let json = serde_json::to_value(&extracted).unwrap();
    assert_eq!(json["requiresJavascript"], true);
}

/// A broken discovered feed falls through to readability
#[tokio::test]
async fn test_broken_feed_falls_back_to_readability() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tides"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(
            r#"<link rel="alternate" type="application/atom+xml" href="/atom.xml">"#,
            ARTICLE_BODY,
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/atom.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/tides")).await;

    assert_eq!(extracted.strategy, Some(ExtractionStrategy::Readability));
    assert!(extracted.text().is_some());
}

/// When every strategy fails the error names each failure
#[tokio::test]
async fn test_all_strategies_fail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><head><title>Empty</title></head><body></body></html>"))
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/empty")).await;

    assert!(extracted.plain_text.is_none());
    assert!(extracted.strategy.is_none());
    let error = extracted.extraction_error.expect("extraction error");
    assert!(error.starts_with("Failed to extract content:"), "{error}");
    assert!(error.contains("direct feed"), "{error}");
    assert!(error.contains("feed discovery"), "{error}");
    assert!(error.contains("readability"), "{error}");
    assert!(!extracted.requires_javascript);
}

/// A failed page fetch is reported without trying further strategies
#[tokio::test]
async fn test_http_error_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extracted = extractor().extract(&url(&mock_server, "/missing")).await;

    let error = extracted.extraction_error.expect("extraction error");
    assert!(error.contains("404"), "{error}");
}
