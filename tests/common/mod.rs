//! Mock collaborators shared by the integration tests: a scripted
//! language model and configurable tool handlers.

// Each test binary compiles this module and uses a different subset of it.
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use opsagent::{
    Config,
    error::{Error, Result, tool_error::ToolError},
    llm::{LanguageModel, Verification},
    models::Step,
    tools::{Tool, ToolFunction, ToolName, ToolPayload},
};
use serde_json::{Map, Value};

/// Config with instant retries so tests never sleep.
pub fn test_config() -> Config {
    Config {
        llm_api_key: None,
        llm_api_base: "http://localhost".to_string(),
        llm_model: "test-model".to_string(),
        openweather_api_key: None,
        news_api_key: None,
        request_timeout: Duration::from_secs(5),
        cache_ttl: Duration::from_secs(60),
        max_retries: 3,
        retry_base_delay: Duration::ZERO,
    }
}

pub fn step(step_id: u32, tool: &str, function: &str, params: Value) -> Step {
    Step {
        step_id,
        action: format!("Execute {function} on {tool}"),
        tool: tool.to_string(),
        function: function.to_string(),
        parameters: params.as_object().cloned().unwrap_or_else(Map::new),
    }
}

/// Language model that answers from a script instead of a network call.
/// `None` for either script entry makes that call fail.
pub struct ScriptedLlm {
    plan: Option<Value>,
    verification: Option<Verification>,
    pub plan_calls: AtomicU32,
    pub verify_calls: AtomicU32,
    pub last_plan_input: Mutex<Option<String>>,
}

impl ScriptedLlm {
    pub fn new(plan: Option<Value>, verification: Option<Verification>) -> Arc<Self> {
        Arc::new(Self {
            plan,
            verification,
            plan_calls: AtomicU32::new(0),
            verify_calls: AtomicU32::new(0),
            last_plan_input: Mutex::new(None),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Self::new(None, None)
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn generate_plan(&self, user_input: &str) -> Result<Value> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_plan_input.lock().unwrap() = Some(user_input.to_string());
        self.plan
            .clone()
            .ok_or_else(|| Error::LlmError("scripted planning failure".to_string()))
    }

    async fn verify_results(
        &self,
        _task: &str,
        _step_results: &[opsagent::models::StepResult],
    ) -> Result<Verification> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verification
            .clone()
            .ok_or_else(|| Error::LlmError("scripted verification failure".to_string()))
    }
}

/// What a mock tool does on every invocation.
#[derive(Clone)]
pub enum Behavior {
    Succeed(Value),
    Fallback(Value),
    ErrorMarker(Value),
    FailTransient(String),
    FailPermanent(String),
}

pub struct MockTool {
    name: ToolName,
    behavior: Behavior,
    invocations: Arc<AtomicU32>,
}

impl MockTool {
    pub fn new(name: ToolName, behavior: Behavior) -> (Arc<Self>, Arc<AtomicU32>) {
        let invocations = Arc::new(AtomicU32::new(0));
        let tool = Arc::new(Self {
            name,
            behavior,
            invocations: invocations.clone(),
        });
        (tool, invocations)
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> ToolName {
        self.name
    }

    async fn invoke(
        &self,
        _function: ToolFunction,
        _params: &Map<String, Value>,
    ) -> std::result::Result<ToolPayload, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(data) => Ok(ToolPayload::live(data.clone())),
            Behavior::Fallback(data) => Ok(ToolPayload::fallback(data.clone())),
            Behavior::ErrorMarker(data) => Ok(ToolPayload::live(data.clone())),
            Behavior::FailTransient(message) => Err(ToolError::Transient(message.clone())),
            Behavior::FailPermanent(message) => Err(ToolError::Permanent(message.clone())),
        }
    }
}
