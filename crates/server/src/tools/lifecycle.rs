//! harbor_lifecycle tool implementation.
//!
//! Reports or drives the install/activate lifecycle of the current generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use harbor_core::{Event, LifecycleStatus, Outcome, Worker};

use super::json_result;
use crate::error::ToolError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleAction {
    /// Report the current state only.
    #[default]
    Status,
    Install,
    Activate,
    /// Install, then activate if skip-waiting is set.
    Start,
}

/// Input parameters for harbor_lifecycle tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleParams {
    #[serde(default)]
    pub action: LifecycleAction,
}

/// Output structure for harbor_lifecycle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleOutput {
    pub action: LifecycleAction,
    pub status: LifecycleStatus,
    /// Namespaces removed by an activation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Vec<String>>,
}

/// Implementation of the harbor_lifecycle tool.
pub async fn lifecycle_impl(worker: &Worker, params: LifecycleParams) -> Result<CallToolResult, McpError> {
    let deleted = match params.action {
        LifecycleAction::Status => None,
        LifecycleAction::Start => {
            worker.start().await?;
            None
        }
        LifecycleAction::Install => match worker.dispatch(Event::Install).await? {
            Outcome::Installed => None,
            other => return Err(ToolError::UnexpectedOutcome(format!("install answered with {other:?}")).into()),
        },
        LifecycleAction::Activate => match worker.dispatch(Event::Activate).await? {
            Outcome::Activated(report) => Some(report.deleted),
            other => return Err(ToolError::UnexpectedOutcome(format!("activate answered with {other:?}")).into()),
        },
    };

    let output = LifecycleOutput { action: params.action, status: worker.lifecycle().status(), deleted };
    json_result(&output)
}
