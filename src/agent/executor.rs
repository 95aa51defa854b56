use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    config::Config,
    models::{ExecutionResult, Plan, Step, StepResult},
    tools::{ToolPayload, ToolRegistry},
};

/// Runs a plan's steps against the tool registry with bounded retry and
/// graceful degradation.
///
/// Steps run independently and in plan order; one failure never aborts
/// later steps. The per-step state machine is Dispatch → Attempt(n) →
/// {Success, Retry, Exhausted}.
pub struct Executor {
    registry: Arc<ToolRegistry>,
    max_retries: u32,
    base_delay: Duration,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>, config: &Config) -> Self {
        Self::with_policy(registry, config.max_retries, config.retry_base_delay)
    }

    pub fn with_policy(registry: Arc<ToolRegistry>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            registry,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    pub async fn execute_plan(&self, plan: &Plan) -> ExecutionResult {
        info!(plan_id = %plan.plan_id, "starting plan execution");

        if plan.steps.is_empty() {
            return ExecutionResult {
                success: false,
                steps_completed: 0,
                total_steps: 0,
                fallback_count: 0,
                step_results: Vec::new(),
                error: Some("No steps in plan".to_string()),
            };
        }

        let mut step_results = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let result = self.execute_step(step).await;
            if result.success {
                info!(step_id = result.step_id, fallback = result.fallback, "step completed");
            } else {
                warn!(step_id = result.step_id, error = ?result.error, "step failed");
            }
            step_results.push(result);
        }

        let steps_completed = step_results.iter().filter(|r| r.success).count() as u32;
        let fallback_count = step_results
            .iter()
            .filter(|r| r.success && r.fallback)
            .count() as u32;

        ExecutionResult {
            success: steps_completed > 0,
            steps_completed,
            total_steps: step_results.len() as u32,
            fallback_count,
            step_results,
            error: None,
        }
    }

    /// Execute one step to completion, including its retry budget.
    pub async fn execute_step(&self, step: &Step) -> StepResult {
        info!(step_id = step.step_id, action = %step.action, "executing step");

        // Dispatch: an unresolvable tool/function pair is a configuration
        // error, not a transient one. No attempt is made.
        let (tool, function) = match self.registry.resolve(&step.tool, &step.function) {
            Ok(resolved) => resolved,
            Err(e) => return failed(step, 0, e.to_string()),
        };

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            let outcome = tool.invoke(function, &step.parameters).await;
            match outcome {
                // Substitute data converts an unreachable upstream into an
                // immediate success, marked so downstream can disclose it.
                Ok(payload) if payload.fallback => return succeeded(step, attempt, payload),
                // An error marker inside the payload is an API-level
                // failure surfaced as data; retried like a raised one.
                Ok(payload) if payload.has_error_marker() => {
                    last_error = payload
                        .error_message()
                        .unwrap_or_else(|| "Unknown error".to_string());
                }
                Ok(payload) => return succeeded(step, attempt, payload),
                Err(e) if e.is_retryable() => {
                    last_error = e.to_string();
                }
                Err(e) => return failed(step, attempt, e.to_string()),
            }

            warn!(step_id = step.step_id, attempt, error = %last_error, "attempt failed");
            if attempt < self.max_retries {
                self.backoff(attempt).await;
            }
        }

        failed(step, self.max_retries, last_error)
    }

    /// Exponential backoff: `base_delay * 2^(attempt_index)`.
    async fn backoff(&self, completed_attempts: u32) {
        let delay = self.base_delay * 2u32.saturating_pow(completed_attempts - 1);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn succeeded(step: &Step, attempt: u32, payload: ToolPayload) -> StepResult {
    StepResult {
        step_id: step.step_id,
        tool: step.tool.clone(),
        function: step.function.clone(),
        action: step.action.clone(),
        success: true,
        data: Some(payload.data),
        error: None,
        attempt,
        fallback: payload.fallback,
    }
}

fn failed(step: &Step, attempt: u32, error: String) -> StepResult {
    StepResult {
        step_id: step.step_id,
        tool: step.tool.clone(),
        function: step.function.clone(),
        action: step.action.clone(),
        success: false,
        data: None,
        error: Some(error),
        attempt,
        fallback: false,
    }
}
