//! Commands the served application sends to the worker.

use serde::{Deserialize, Serialize};

/// Cross-context message, tagged by `type`.
///
/// `SKIP_WAITING` and `CACHE_URLS` (with a `payload` list) are accepted for
/// pages that still speak the older protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Skip the waiting period and activate now.
    #[serde(alias = "SKIP_WAITING")]
    ForceActivate,

    /// Precache these URLs into the current namespace, all or nothing.
    #[serde(alias = "CACHE_URLS")]
    WarmCache {
        #[serde(alias = "payload")]
        urls: Vec<String>,
    },
}
