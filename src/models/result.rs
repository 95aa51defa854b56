use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of executing one step. Created exactly once by the executor
/// and immutable afterwards.
///
/// `attempt` is 0 only when tool/function resolution failed before any
/// invocation. `fallback` marks data served by a degraded substitute
/// instead of the live upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: u32,
    pub tool: String,
    pub function: String,
    pub action: String,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub attempt: u32,

    #[serde(default)]
    pub fallback: bool,
}

/// Aggregate outcome of one plan execution.
///
/// `success` is true whenever at least one step succeeded; partial
/// results are deliberately preferred over all-or-nothing failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub steps_completed: u32,
    pub total_steps: u32,
    pub fallback_count: u32,
    pub step_results: Vec<StepResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A failed step as surfaced to the user and to retry decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedStep {
    pub step_id: u32,
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final judgment over one request: completeness plus the user-facing
/// answer text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_complete: bool,
    pub formatted_answer: String,

    #[serde(default)]
    pub missing_info: Vec<String>,

    #[serde(default)]
    pub failed_steps: Vec<FailedStep>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_steps: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
}
