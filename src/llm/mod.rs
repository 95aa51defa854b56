pub mod groq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::Result, models::StepResult};

pub use groq::GroqClient;

/// The LLM collaborator contract: produce a plan, judge results.
///
/// Implementations own their own bounded retry; callers see a single
/// `Result` per call and degrade to deterministic behavior on `Err`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Plan-shaped JSON for one user query. The planner repairs partial
    /// conformance, so the return value is raw parsed JSON.
    async fn generate_plan(&self, user_input: &str) -> Result<Value>;

    /// Completeness judgment plus a synthesized narrative answer.
    async fn verify_results(&self, task: &str, step_results: &[StepResult])
    -> Result<Verification>;
}

/// What the model returns from a verification call. Missing fields take
/// lenient defaults rather than failing the parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default = "default_complete")]
    pub is_complete: bool,

    #[serde(default = "default_answer")]
    pub formatted_answer: String,

    #[serde(default)]
    pub missing_info: Vec<String>,

    #[serde(default)]
    pub suggestions: Vec<String>,
}

fn default_complete() -> bool {
    true
}

fn default_answer() -> String {
    "Results processed successfully.".to_string()
}
