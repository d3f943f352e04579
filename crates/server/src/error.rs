//! Structured errors raised by the tool layer itself.
//!
//! Policy engine failures arrive as `harbor_core::Error` and convert on their
//! own; these cover what only the server can get wrong.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the harbor server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),

    /// The worker answered an event with an outcome that does not belong to it.
    #[error("UNEXPECTED_OUTCOME: {0}")]
    UnexpectedOutcome(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::Serialize(msg) => (-32603, msg.clone()),
            ToolError::UnexpectedOutcome(msg) => (-32000, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
