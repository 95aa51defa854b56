use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured execution plan derived from one user query.
///
/// Request-scoped: built by the planner, consumed by the executor,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,

    pub task: String,

    pub steps: Vec<Step>,

    pub expected_output: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Plan {
    /// Plan carrying no executable steps, with the reason recorded.
    pub fn empty(task: impl Into<String>, expected_output: &str, error: &str) -> Self {
        Self {
            plan_id: uuid::Uuid::new_v4().to_string(),
            task: task.into(),
            steps: Vec::new(),
            expected_output: expected_output.to_string(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One planned tool invocation with concrete parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub step_id: u32,

    pub action: String,

    pub tool: String,

    pub function: String,

    #[serde(default)]
    pub parameters: Map<String, Value>,
}
