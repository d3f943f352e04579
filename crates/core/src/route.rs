//! Route classification.
//!
//! Maps an intercepted request to the branch of the strategy engine that
//! should handle it. Classification is pure: it reads the request and the
//! classifier's configuration and nothing else.
//!
//! Rules, first match wins:
//! 1. non-GET method: [`Route::Ignored`]
//! 2. scheme other than http/https: [`Route::Ignored`]
//! 3. navigate-only scope and not a navigation: [`Route::Ignored`]
//! 4. host on the always-network list: [`Route::AlwaysNetwork`]
//! 5. same origin as the served app: [`Route::SameOrigin`]
//! 6. anything else: [`Route::CrossOrigin`]

use serde::{Deserialize, Serialize};
use url::{Origin, Url};

use crate::request::Request;

/// Classification of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Not intercepted; the host handles it natively.
    Ignored,
    AlwaysNetwork,
    SameOrigin,
    CrossOrigin,
}

/// Which requests the worker intercepts at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InterceptScope {
    #[default]
    All,
    /// Only top-level navigations; subresources go straight to the network.
    NavigateOnly,
}

/// One always-network host rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRule {
    /// `example.com`: the domain itself and every subdomain.
    Domain(String),
    /// `cdn.`: any host with a `cdn` label.
    Label(String),
}

impl HostRule {
    /// Parse a rule string; blank strings yield `None`.
    pub fn parse(rule: &str) -> Option<Self> {
        let rule = rule.trim().trim_start_matches('.').to_ascii_lowercase();
        if rule.is_empty() {
            return None;
        }
        match rule.strip_suffix('.') {
            Some(label) if !label.is_empty() => Some(HostRule::Label(label.to_string())),
            Some(_) => None,
            None => Some(HostRule::Domain(rule)),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.');
        match self {
            HostRule::Domain(domain) => {
                host.eq_ignore_ascii_case(domain)
                    || (host.len() > domain.len()
                        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
                        && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain))
            }
            HostRule::Label(label) => host.split('.').any(|part| part.eq_ignore_ascii_case(label)),
        }
    }
}

/// Classifies requests against the serving origin and the host rules.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    origin: Origin,
    always_network: Vec<HostRule>,
    scope: InterceptScope,
}

impl RouteClassifier {
    pub fn new<I, S>(origin: &Url, always_network: I, scope: InterceptScope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            origin: origin.origin(),
            always_network: always_network.into_iter().filter_map(|r| HostRule::parse(r.as_ref())).collect(),
            scope,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn classify(&self, request: &Request) -> Route {
        if !request.is_get() {
            return Route::Ignored;
        }

        if !matches!(request.url.scheme(), "http" | "https") {
            return Route::Ignored;
        }

        if self.scope == InterceptScope::NavigateOnly && !request.is_navigation() {
            return Route::Ignored;
        }

        if let Some(host) = request.url.host_str()
            && self.always_network.iter().any(|rule| rule.matches(host))
        {
            return Route::AlwaysNetwork;
        }

        if request.url.origin() == self.origin {
            Route::SameOrigin
        } else {
            Route::CrossOrigin
        }
    }
}
