//! cache_get tool implementation.
//!
//! Retrieves the current generation's entry for a URL.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use harbor_core::{Error, Request, Worker};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the serving origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub namespace: String,
    /// SHA-256 request identity.
    pub key: String,
    pub method: String,
    pub url: String,
    pub stored_at: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = Request::get(worker.policy().resolve(&params.url)?);
    let cache = worker.cache();

    let entry = cache
        .get(&request)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} in {}", request.url, cache.name())))?;

    let output = CacheGetOutput {
        namespace: cache.name().to_string(),
        content_type: entry.response.content_type().map(str::to_string),
        body: entry.response.text().into_owned(),
        status: entry.response.status,
        headers: entry.response.headers,
        key: entry.key,
        method: entry.method,
        url: entry.url,
        stored_at: entry.stored_at,
    };

    json_result(&output)
}
