//! cache_namespaces tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use harbor_core::{ResponseStore, Worker};

use crate::tools::json_result;

/// The tool takes no arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheNamespacesParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheNamespacesOutput {
    pub current: String,
    /// Every namespace in the store, oldest first.
    pub namespaces: Vec<String>,
}

/// Implementation of the cache_namespaces tool.
pub async fn namespaces_impl(worker: &Worker, _params: CacheNamespacesParams) -> Result<CallToolResult, McpError> {
    let namespaces = worker.context().store.list_namespaces().await?;
    let output = CacheNamespacesOutput { current: worker.policy().generation.to_string(), namespaces };
    json_result(&output)
}
