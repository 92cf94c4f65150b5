//! URL validation and canonical comparison.

use url::Url;

/// Error type for URL validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse user input as an absolute http(s) URL.
///
/// Unlike [`canonicalize`] no scheme is assumed: `example.com/post` is
/// rejected because it is not absolute.
pub fn validate_article_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::InvalidUrl("missing host".into()));
    }

    Ok(parsed)
}

/// Canonical form used when comparing links.
///
/// Lowercases the host (the url crate already does this for http(s)),
/// drops the fragment and keeps the query string intact.
pub fn canonicalize(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical
}

/// Whether `href` (possibly relative to `base`) names the same document
/// as `target`.
pub fn same_document(href: &str, base: Option<&Url>, target: &Url) -> bool {
    let parsed = match base {
        Some(base) => base.join(href.trim()),
        None => Url::parse(href.trim()),
    };
    parsed.is_ok_and(|link| canonicalize(&link) == canonicalize(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_basic() {
        let url = validate_article_url("https://example.com/post").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_validate_trims_whitespace() {
        let url = validate_article_url("  http://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn test_validate_rejects_relative() {
        assert!(matches!(validate_article_url("example.com/post"), Err(UrlError::InvalidUrl(_))));
        assert!(matches!(validate_article_url("not a url"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_rejects_other_schemes() {
        assert!(matches!(validate_article_url("file:///etc/passwd"), Err(UrlError::UnsupportedScheme(_))));
        assert!(matches!(validate_article_url("ftp://example.com"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_article_url("   "), Err(UrlError::Empty));
    }

    #[test]
    fn test_canonicalize_drops_fragment_keeps_query() {
        let url = Url::parse("https://EXAMPLE.com/path?a=1#section").unwrap();
        assert_eq!(canonicalize(&url).as_str(), "https://example.com/path?a=1");
    }

    #[test]
    fn test_same_document() {
        let target = Url::parse("https://example.com/2024/post").unwrap();
        assert!(same_document("https://Example.com/2024/post#comments", None, &target));
        assert!(!same_document("https://example.com/2024/other", None, &target));

        let base = Url::parse("https://example.com/feed.xml").unwrap();
        assert!(same_document("/2024/post", Some(&base), &target));
        assert!(!same_document("::not a url::", None, &target));
    }
}
