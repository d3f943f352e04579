//! Tools for the non-fetch worker events: client messages, background sync,
//! push and notification clicks.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use harbor_core::generation::ActivationReport;
use harbor_core::notify::{ClickOutcome, Notification};
use harbor_core::{ClientMessage, Event, Outcome, Worker};

use super::json_result;
use crate::error::ToolError;

/// Input parameters for harbor_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageParams {
    /// `{"type":"force-activate"}` or `{"type":"warm-cache","urls":[...]}`.
    pub message: ClientMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum MessageOutput {
    SkipWaiting { activated: Option<ActivationReport> },
    Warmed { count: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    /// Whether the tag matched and the sync task ran.
    pub ran: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push payload text. The notification body falls back to a default.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// "explore", "close", or empty for a plain click.
    #[serde(default)]
    pub action: Option<String>,
}

fn unexpected(event: &str, outcome: Outcome) -> McpError {
    ToolError::UnexpectedOutcome(format!("{event} answered with {outcome:?}")).into()
}

/// Implementation of the harbor_message tool.
pub async fn message_impl(worker: &Worker, params: MessageParams) -> Result<CallToolResult, McpError> {
    let output = match worker.dispatch(Event::Message(params.message)).await? {
        Outcome::SkipWaiting { activated } => MessageOutput::SkipWaiting { activated },
        Outcome::Warmed { count } => MessageOutput::Warmed { count },
        other => return Err(unexpected("message", other)),
    };
    json_result(&output)
}

/// Implementation of the harbor_sync tool.
pub async fn sync_impl(worker: &Worker, params: SyncParams) -> Result<CallToolResult, McpError> {
    let ran = match worker.dispatch(Event::Sync { tag: params.tag.clone() }).await? {
        Outcome::Synced => true,
        Outcome::Ignored => false,
        other => return Err(unexpected("sync", other)),
    };
    json_result(&SyncOutput { tag: params.tag, ran })
}

/// Implementation of the harbor_push tool.
pub async fn push_impl(worker: &Worker, params: PushParams) -> Result<CallToolResult, McpError> {
    let notification: Notification = match worker.dispatch(Event::Push { data: params.data }).await? {
        Outcome::Notified(notification) => notification,
        other => return Err(unexpected("push", other)),
    };
    json_result(&notification)
}

/// Implementation of the harbor_notification_click tool.
pub async fn notification_click_impl(
    worker: &Worker, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let outcome: ClickOutcome = match worker.dispatch(Event::NotificationClick { action: params.action }).await? {
        Outcome::Clicked(outcome) => outcome,
        other => return Err(unexpected("notification click", other)),
    };
    json_result(&outcome)
}
