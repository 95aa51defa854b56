use std::sync::Arc;

use crate::{
    agent::{Executor, Planner, Verifier},
    config::Config,
    error::Result,
    llm::{GroqClient, LanguageModel},
    models::{ExecutionResult, Plan, VerificationResult},
    tools::ToolRegistry,
};

/// Everything one query produces, stage by stage. Request-scoped; callers
/// render what they need and drop the rest.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub plan: Plan,
    pub execution: ExecutionResult,
    pub verification: VerificationResult,
}

/// The assembled pipeline: planner → executor → verifier.
///
/// Components are constructed once here and reused serially; they hold no
/// per-request state. No stage calls backward, so each is independently
/// testable with fixture data.
pub struct Assistant {
    planner: Planner,
    executor: Executor,
    verifier: Verifier,
}

impl Assistant {
    /// Wire up the live collaborators from configuration. Fails fast when
    /// the LLM credentials are missing.
    pub fn new(config: &Config) -> Result<Self> {
        let llm: Arc<dyn LanguageModel> = Arc::new(GroqClient::new(config)?);
        let registry = Arc::new(ToolRegistry::new(config));
        Ok(Self::with_collaborators(llm, registry, config))
    }

    /// Explicit dependency injection; tests pass mock collaborators here.
    pub fn with_collaborators(
        llm: Arc<dyn LanguageModel>,
        registry: Arc<ToolRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            planner: Planner::new(llm.clone()),
            executor: Executor::new(registry, config),
            verifier: Verifier::new(llm),
        }
    }

    /// Process one user query start-to-finish.
    pub async fn run(&self, user_input: &str) -> QueryOutcome {
        let plan = self.planner.create_plan(user_input).await;
        let execution = self.executor.execute_plan(&plan).await;
        let verification = self
            .verifier
            .verify_and_format(&plan.task, &execution.step_results)
            .await;

        QueryOutcome {
            plan,
            execution,
            verification,
        }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }
}
