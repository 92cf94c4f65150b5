//! HTML to plain-text conversion for LLM input.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

static INLINE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\x{A0}]+").expect("invalid regex"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid regex"));

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr", "section",
    "article", "figure", "figcaption", "hr", "table",
];

/// Strip markup from an HTML fragment, keeping block boundaries as line
/// breaks. Script and style contents are dropped; entities are decoded.
///
/// Returns an empty string when the fragment has no visible text.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len() / 2);

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_TAGS.contains(&element.name()) => out.push('\n'),
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .is_some_and(|parent| matches!(parent.name(), "script" | "style" | "noscript"));
                if !hidden {
                    out.push_str(text);
                }
            }
            _ => {}
        }
    }

    normalize_text(&out)
}

/// Fold horizontal whitespace, trim each line and cap blank runs at one
/// empty line.
pub fn normalize_text(text: &str) -> String {
    let folded = text
        .replace("\r\n", "\n")
        .lines()
        .map(|line| INLINE_WS.replace_all(line.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n");

    BLANK_LINES.replace_all(&folded, "\n\n").trim().to_string()
}
