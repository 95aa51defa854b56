use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    llm::{LanguageModel, Verification},
    models::StepResult,
    prompt::builder::{
        build_planner_prompt, build_planner_request, build_verifier_prompt, build_verifier_request,
    },
    utils::string_util::StripCodeBlock,
};

/// Chat-completions client for Groq (or any OpenAI-compatible endpoint).
///
/// Each call is retried up to `max_retries` times before the failure is
/// surfaced to the planner or verifier.
pub struct GroqClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl GroqClient {
    /// Explicit construction at startup; a missing key is a typed error,
    /// not a deferred nullable client.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.llm_api_key.clone().ok_or_else(|| {
            Error::ConfigError(
                "GROQ_API_KEY not set. Please set it in your .env file.".to_string(),
            )
        })?;
        info!(model = %config.llm_model, "initialized LLM client");
        Ok(Self {
            client: reqwest::Client::new(),
            api_base: config.llm_api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.llm_model.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.7,
            "max_tokens": 4096,
        });

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            match self.send(&body).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(attempt, error = %e, "LLM call attempt failed");
                    last_error = e.to_string();
                }
            }
        }
        Err(Error::LlmError(format!(
            "LLM call failed after {} attempts: {last_error}",
            self.max_retries
        )))
    }

    async fn send(&self, body: &Value) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::LlmError("Response carried no message content".to_string()))
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn generate_plan(&self, user_input: &str) -> Result<Value> {
        let system_prompt = build_planner_prompt();
        let user_prompt = build_planner_request(user_input);

        let response = self.chat(&system_prompt, &user_prompt).await?;
        serde_json::from_str(response.strip_code_block())
            .map_err(|e| Error::LlmError(format!("Failed to parse plan JSON: {e}")))
    }

    async fn verify_results(
        &self,
        task: &str,
        step_results: &[StepResult],
    ) -> Result<Verification> {
        let system_prompt = build_verifier_prompt();
        let user_prompt = build_verifier_request(task, step_results)?;

        let response = self.chat(system_prompt, &user_prompt).await?;
        serde_json::from_str(response.strip_code_block())
            .map_err(|e| Error::LlmError(format!("Failed to parse verification JSON: {e}")))
    }
}
