//! MCP tool implementations.
//!
//! Each tool turns its parameters into a worker event (or a direct store
//! query), dispatches it and reports the outcome as pretty JSON.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;

pub use cache::{CacheGetParams, CacheNamespacesParams};
pub use events::{MessageParams, NotificationClickParams, PushParams, SyncParams};
pub use fetch::FetchParams;
pub use lifecycle::LifecycleParams;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Successful tool result carrying `output` as pretty-printed JSON.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use rmcp::model::{CallToolResult, RawContent};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use harbor_core::{AppConfig, Error, MemoryStore, Network, Policy, Request, Response, Worker, WorkerContext};

    pub(crate) const ORIGIN: &str = "https://app.example.com";

    /// Network answering from a fixed table; unknown URLs get a 404.
    #[derive(Default)]
    pub(crate) struct StubNetwork {
        routes: Mutex<HashMap<String, (u16, String)>>,
        offline: AtomicBool,
    }

    impl StubNetwork {
        pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
            self.routes.lock().unwrap().insert(url.to_string(), (status, body.to_string()));
        }

        pub(crate) fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::Network(format!("{}: offline", request.url)));
            }
            let url = request.url.as_str();
            let (status, body) = self.routes.lock().unwrap().get(url).cloned().unwrap_or((404, "not found".into()));
            Ok(Response::new(url, status, body).with_header("content-type", "text/html"))
        }
    }

    pub(crate) struct Fixture {
        pub(crate) worker: Arc<Worker>,
        pub(crate) store: MemoryStore,
        pub(crate) network: Arc<StubNetwork>,
    }

    pub(crate) fn fixture(config: AppConfig) -> Fixture {
        let store = MemoryStore::new();
        let network = Arc::new(StubNetwork::default());
        network.respond(&format!("{ORIGIN}/"), 200, "<html>home</html>");
        network.respond(&format!("{ORIGIN}/app.js"), 200, "console.log(1)");

        let policy = Policy::from_config(&config).unwrap();
        let ctx = WorkerContext::new(Arc::new(store.clone()), network.clone());
        Fixture { worker: Arc::new(Worker::new(policy, ctx)), store, network }
    }

    pub(crate) fn config() -> AppConfig {
        AppConfig {
            origin: ORIGIN.into(),
            generation: "space-v2".into(),
            precache: vec!["/".into(), "/app.js".into()],
            always_network_hosts: vec!["analytics.io".into()],
            ..Default::default()
        }
    }

    /// Parse the JSON text content of a tool result.
    pub(crate) fn output(result: &CallToolResult) -> serde_json::Value {
        let text = result
            .content
            .iter()
            .find_map(|c| match &c.raw {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .unwrap();
        serde_json::from_str(&text).unwrap()
    }
}
