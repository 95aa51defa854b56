use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    llm::LanguageModel,
    models::{Plan, Step},
    tools::ToolName,
};

const DEFAULT_EXPECTED_OUTPUT: &str = "Processed results based on user query";

/// Turns free-text queries into structured execution plans.
///
/// Every model-produced plan goes through a repair pass before it is
/// usable; planning never returns an error, only a plan whose `error`
/// field explains why it carries no steps.
pub struct Planner {
    llm: Arc<dyn LanguageModel>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn create_plan(&self, user_input: &str) -> Plan {
        if user_input.trim().is_empty() {
            return Plan::empty("", "No input provided", "Empty input provided");
        }

        info!(input = %truncate(user_input, 100), "creating plan");

        match self.llm.generate_plan(user_input).await {
            Ok(raw) => {
                let plan = repair_plan(raw, user_input);
                info!(steps = plan.steps.len(), "plan created");
                plan
            }
            Err(e) => {
                error!(error = %e, "failed to create plan");
                Plan::empty(user_input, "Failed to generate plan", &e.to_string())
            }
        }
    }

    /// Full re-planning over the original task plus the feedback; the
    /// prior plan is not patched incrementally.
    pub async fn refine_plan(&self, plan: &Plan, feedback: &str) -> Plan {
        info!("refining plan based on feedback");
        let refined_input = format!("{}\n\nAdditional context: {feedback}", plan.task);
        self.create_plan(&refined_input).await
    }
}

/// Repair a model-produced plan into a well-formed one: fill missing
/// fields, drop steps referencing unregistered tools, and coerce
/// malformed shapes instead of failing the whole plan.
fn repair_plan(raw: Value, original_input: &str) -> Plan {
    let task = raw["task"]
        .as_str()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(original_input)
        .to_string();

    let expected_output = raw["expected_output"]
        .as_str()
        .filter(|o| !o.trim().is_empty())
        .unwrap_or(DEFAULT_EXPECTED_OUTPUT)
        .to_string();

    let raw_steps = raw["steps"].as_array().cloned().unwrap_or_default();

    let mut steps = Vec::new();
    for (i, raw_step) in raw_steps.iter().enumerate() {
        let Some(fields) = raw_step.as_object() else {
            continue;
        };

        let tool = fields
            .get("tool")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if ToolName::parse(&tool).is_none() {
            warn!(tool, step = i + 1, "dropping step with unregistered tool");
            continue;
        }

        let function = fields
            .get("function")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .trim()
            .to_lowercase();

        let step_id = fields
            .get("step_id")
            .and_then(Value::as_u64)
            .map(|id| id as u32)
            .unwrap_or(steps.len() as u32 + 1);

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Execute {function} on {tool}"));

        let parameters = fields
            .get("parameters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        steps.push(Step {
            step_id,
            action,
            tool,
            function,
            parameters,
        });
    }

    Plan {
        plan_id: Uuid::new_v4().to_string(),
        task,
        steps,
        expected_output,
        error: None,
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
