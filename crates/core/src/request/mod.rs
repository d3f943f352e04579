//! Intercepted requests and observed responses.
//!
//! A [`Request`] is what the host runtime hands to the worker; a [`Response`]
//! is what the network produced or what the store kept. Responses are not
//! `Clone`: handing the same body to the caller and to the store goes through
//! [`Response::snapshot`], which makes an independent copy.

mod resolve;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::Url;

pub use resolve::{UrlError, resolve_url};

use crate::store::hash::compute_cache_key;

/// How the client issued the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    /// Build a GET subresource request.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::NoCors }
    }

    /// Build a GET top-level navigation.
    pub fn navigate(url: Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Navigate }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Request identity: normalized URL plus method.
    ///
    /// The fragment never reaches the network, so it is not part of the key.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        compute_cache_key(&self.method, url.as_str())
    }
}

/// A response snapshot: status, headers and the full body.
#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status. Only these are written to the store.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Byte-identical copy that shares no buffer with `self`.
    pub fn snapshot(&self) -> Self {
        Self {
            url: self.url.clone(),
            status: self.status,
            headers: self.headers.clone(),
            body: Bytes::copy_from_slice(&self.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cache_key_ignores_fragment() {
        let a = Request::get(url("https://example.com/page#top"));
        let b = Request::get(url("https://example.com/page"));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_mode() {
        let a = Request::get(url("https://example.com/"));
        let b = Request::navigate(url("https://example.com/"));
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_depends_on_method() {
        let get = Request::get(url("https://example.com/"));
        let head = Request::get(url("https://example.com/")).with_method("HEAD");
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_is_get_case_insensitive() {
        assert!(Request::get(url("https://example.com/")).with_method("get").is_get());
        assert!(!Request::get(url("https://example.com/")).with_method("POST").is_get());
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let original = Response::new("https://example.com/", 200, "hello").with_header("Content-Type", "text/plain");
        let copy = original.snapshot();

        assert_eq!(copy, original);
        assert_ne!(copy.body.as_ptr(), original.body.as_ptr());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = Response::new("https://example.com/", 200, "").with_header("Content-Type", "text/html");
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_is_success() {
        assert!(Response::new("u", 200, "").is_success());
        assert!(Response::new("u", 204, "").is_success());
        assert!(!Response::new("u", 304, "").is_success());
        assert!(!Response::new("u", 503, "").is_success());
    }
}
