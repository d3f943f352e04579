//! harbor_fetch tool implementation.
//!
//! Dispatches a fetch event through the worker. Requests the worker does not
//! intercept are fetched straight from the network, the way a host would
//! serve them natively.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use harbor_core::{Event, Network, Outcome, Request, RequestMode, ResponseSource, Route, Worker};

use super::json_result;
use crate::error::ToolError;

/// Input parameters for harbor_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL, or a path resolved against the serving origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET is intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate" for top-level documents, "no-cors" (default),
    /// "cors" or "same-origin" for subresources.
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

/// Where the host got the response from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Network,
    Cache,
    Fallback,
    /// Not intercepted; fetched by the host directly.
    PassThrough,
}

impl From<ResponseSource> for Source {
    fn from(source: ResponseSource) -> Self {
        match source {
            ResponseSource::Network => Source::Network,
            ResponseSource::Cache => Source::Cache,
            ResponseSource::Fallback => Source::Fallback,
        }
    }
}

/// Output structure for harbor_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// Final URL of the response.
    pub final_url: String,
    pub route: Route,
    pub source: Source,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the harbor_fetch tool.
pub async fn fetch_impl(worker: &Worker, params: FetchParams) -> Result<CallToolResult, McpError> {
    let url = worker.policy().resolve(&params.url)?;
    let request = Request { method: params.method.trim().to_ascii_uppercase(), url, mode: params.mode };

    let (route, source, response) = match worker.dispatch(Event::Fetch(request.clone())).await? {
        Outcome::Served { route, served } => (route, Source::from(served.source), served.response),
        Outcome::PassThrough(route) => {
            let response = worker.context().network.fetch(&request).await?;
            (route, Source::PassThrough, response)
        }
        other => return Err(ToolError::UnexpectedOutcome(format!("fetch answered with {other:?}")).into()),
    };

    let output = FetchOutput {
        url: request.url.to_string(),
        final_url: response.url.clone(),
        route,
        source,
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body: response.text().into_owned(),
        body_bytes: response.body.len(),
        headers: response.headers,
    };

    json_result(&output)
}
