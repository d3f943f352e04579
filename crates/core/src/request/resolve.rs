//! URL resolution for request identities.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a possibly relative URL against the serving origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references (`/index.html`) against `base`
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// Non-http schemes are returned as-is so the classifier can ignore them.
/// Hosts of http(s) URLs are already lowercased by the parser.
pub fn resolve_url(base: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> url::Url {
        url::Url::parse("https://app.example.com/").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve_url(&base(), "/index.html").unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/index.html");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve_url(&base(), "https://cdn.example.com/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve_url(&base(), "https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Path");
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve_url(&base(), "/docs#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/docs");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve_url(&base(), "/search?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_keeps_foreign_scheme() {
        let url = resolve_url(&base(), "chrome-extension://abcdef/script.js").unwrap();
        assert_eq!(url.scheme(), "chrome-extension");
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve_url(&base(), "   "), Err(UrlError::Empty)));
    }
}
