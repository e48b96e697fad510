//! Tool trait and output type.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::SessionContext;
pub use crate::error::ToolError;

/// Output of a tool execution.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub result: serde_json::Value,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }
}

/// A function the realtime dialogue engine can call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<ToolOutput, ToolError>;

    fn execution_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}

/// Extract the argument object, rejecting anything else.
pub fn require_object<'a>(
    tool: &str,
    params: &'a serde_json::Value,
) -> Result<&'a serde_json::Map<String, serde_json::Value>, ToolError> {
    params
        .as_object()
        .ok_or_else(|| ToolError::InvalidParameters {
            name: tool.to_string(),
            reason: "arguments must be a JSON object".to_string(),
        })
}
