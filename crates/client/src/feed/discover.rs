//! Feed autodiscovery from an HTML page.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ALTERNATE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel][href]"#).expect("invalid selector"));

const FEED_TYPES: &[&str] = &["application/rss+xml", "application/atom+xml"];

/// Find the first RSS/Atom feed advertised by the page.
///
/// Looks for `<link rel="alternate" type="application/rss+xml|atom+xml">`
/// in the document head and resolves its href against `page_url`. Only
/// http(s) results are returned.
pub fn discover_feed(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let head = document.root_element().child_elements().find(|el| el.value().name() == "head")?;

    head.select(&ALTERNATE_LINKS).find_map(|link| {
        let element = link.value();
        let is_alternate = element
            .attr("rel")
            .is_some_and(|rel| rel.split_ascii_whitespace().any(|token| token.eq_ignore_ascii_case("alternate")));
        let is_feed = element
            .attr("type")
            .is_some_and(|kind| FEED_TYPES.iter().any(|feed| kind.trim().eq_ignore_ascii_case(feed)));
        if !(is_alternate && is_feed) {
            return None;
        }

        let href = element.attr("href")?.trim();
        let resolved = page_url.join(href).ok()?;
        matches!(resolved.scheme(), "http" | "https").then_some(resolved)
    })
}
