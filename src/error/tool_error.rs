/// Failure classes for tool invocation.
///
/// The executor's retry decision branches on this type: only `Transient`
/// failures are retried. `UnknownTool` and `UnknownFunction` are dispatch
/// failures and never reach an attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    Permanent(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown function: {function}")]
    UnknownFunction { tool: String, function: String },
}

impl ToolError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolError::Transient(_))
    }

    pub fn is_dispatch_failure(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_) | ToolError::UnknownFunction { .. }
        )
    }
}
