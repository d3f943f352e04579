//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use harbor_core::Worker;

use crate::tools::{
    CacheGetParams, CacheNamespacesParams, FetchParams, LifecycleParams, MessageParams, NotificationClickParams,
    PushParams, SyncParams, cache, events, fetch::fetch_impl, lifecycle::lifecycle_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for harbor.
#[derive(Clone)]
pub struct HarborServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<Worker>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HarborServer {
    /// Create a new server handler around a started worker.
    pub fn new(worker: Arc<Worker>) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    /// Dispatch a fetch event through the worker.
    ///
    /// The request is classified, then served by the strategy for its route.
    /// Requests that are not intercepted are fetched directly.
    #[tool(
        description = "Fetch a URL through the offline-first worker. Returns the response with its route and source (network, cache, fallback, pass-through)."
    )]
    async fn harbor_fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Report or drive the cache generation lifecycle. Actions: status (default), install, activate, start."
    )]
    async fn harbor_lifecycle(&self, params: Parameters<LifecycleParams>) -> Result<CallToolResult, McpError> {
        lifecycle_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Send a client message: {\"type\":\"force-activate\"} or {\"type\":\"warm-cache\",\"urls\":[...]}."
    )]
    async fn harbor_message(&self, params: Parameters<MessageParams>) -> Result<CallToolResult, McpError> {
        events::message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Fire a background sync event with the given tag.")]
    async fn harbor_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        events::sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. Returns the notification that was shown.")]
    async fn harbor_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        events::push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Click a notification, optionally on an action (explore, close).")]
    async fn harbor_notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        events::notification_click_impl(&self.worker, params.0).await
    }

    /// Look up the current generation's stored response for a URL.
    #[tool(description = "Retrieve the cached response for a URL from the current generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache namespaces (one per generation) and the current one.")]
    async fn cache_namespaces(&self, params: Parameters<CacheNamespacesParams>) -> Result<CallToolResult, McpError> {
        cache::namespaces_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for HarborServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-harbor".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{config, fixture};

    #[test]
    fn test_lists_every_tool() {
        let f = fixture(config());
        let server = HarborServer::new(f.worker);
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cache_get",
                "cache_namespaces",
                "harbor_fetch",
                "harbor_lifecycle",
                "harbor_message",
                "harbor_notification_click",
                "harbor_push",
                "harbor_sync",
            ]
        );
    }

    #[test]
    fn test_server_info() {
        let f = fixture(config());
        let info = HarborServer::new(f.worker).get_info();
        assert_eq!(info.server_info.name, "mcp-harbor");
        assert!(info.capabilities.tools.is_some());
    }
}
