mod common;

use common::ScriptedLlm;
use opsagent::Planner;
use serde_json::json;

#[tokio::test]
async fn empty_input_short_circuits_without_llm_call() {
    let llm = ScriptedLlm::unavailable();
    let planner = Planner::new(llm.clone());

    let plan = planner.create_plan("").await;

    assert_eq!(plan.task, "");
    assert!(plan.steps.is_empty());
    assert_eq!(plan.expected_output, "No input provided");
    assert_eq!(plan.error.as_deref(), Some("Empty input provided"));
    assert_eq!(llm.plan_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn whitespace_only_input_is_treated_as_empty() {
    let llm = ScriptedLlm::unavailable();
    let planner = Planner::new(llm.clone());

    let plan = planner.create_plan("   \n\t ").await;

    assert!(plan.steps.is_empty());
    assert_eq!(plan.error.as_deref(), Some("Empty input provided"));
    assert_eq!(llm.plan_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn llm_failure_yields_empty_plan_with_error() {
    let llm = ScriptedLlm::unavailable();
    let planner = Planner::new(llm);

    let plan = planner.create_plan("weather in Oslo").await;

    assert_eq!(plan.task, "weather in Oslo");
    assert!(plan.steps.is_empty());
    assert_eq!(plan.expected_output, "Failed to generate plan");
    assert!(plan.error.as_deref().unwrap().contains("scripted planning failure"));
}

#[tokio::test]
async fn unregistered_tool_steps_are_dropped_and_valid_ones_kept_in_order() {
    let llm = ScriptedLlm::new(
        Some(json!({
            "task": "weather and stocks",
            "steps": [
                { "step_id": 1, "action": "Get weather", "tool": "weather",
                  "function": "get_current_weather", "parameters": { "city": "Paris" } },
                { "step_id": 2, "action": "Get quote", "tool": "stocks",
                  "function": "get_quote", "parameters": { "symbol": "ACME" } },
                { "step_id": 3, "action": "Get a joke", "tool": "jokes",
                  "function": "get_random_joke", "parameters": {} },
            ],
            "expected_output": "weather plus a joke",
        })),
        None,
    );
    let planner = Planner::new(llm);

    let plan = planner.create_plan("weather and stocks").await;

    assert!(plan.error.is_none());
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].tool, "weather");
    assert_eq!(plan.steps[1].tool, "jokes");
    assert_eq!(plan.steps[1].step_id, 3);
}

#[tokio::test]
async fn repair_fills_missing_step_fields() {
    let llm = ScriptedLlm::new(
        Some(json!({
            "steps": [
                { "tool": "Jokes", "function": "get_random_joke" },
                { "tool": "news", "function": "search_news",
                  "parameters": ["not", "a", "map"] },
            ],
        })),
        None,
    );
    let planner = Planner::new(llm);

    let plan = planner.create_plan("cheer me up").await;

    assert_eq!(plan.task, "cheer me up");
    assert_eq!(plan.expected_output, "Processed results based on user query");
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].step_id, 1);
    assert_eq!(plan.steps[0].tool, "jokes");
    assert_eq!(plan.steps[0].action, "Execute get_random_joke on jokes");
    assert_eq!(plan.steps[1].step_id, 2);
    assert!(plan.steps[1].parameters.is_empty());
}

#[tokio::test]
async fn non_list_steps_are_reset_to_empty() {
    let llm = ScriptedLlm::new(Some(json!({ "task": "t", "steps": { "oops": true } })), None);
    let planner = Planner::new(llm);

    let plan = planner.create_plan("t").await;

    assert!(plan.steps.is_empty());
    assert!(plan.error.is_none());
}

#[tokio::test]
async fn refine_plan_replans_with_feedback_appended() {
    let llm = ScriptedLlm::new(Some(json!({ "task": "t", "steps": [] })), None);
    let planner = Planner::new(llm.clone());

    let plan = planner.create_plan("weather in Paris").await;
    planner.refine_plan(&plan, "also include Berlin").await;

    let last_input = llm.last_plan_input.lock().unwrap().clone().unwrap();
    assert!(last_input.contains("weather in Paris"));
    assert!(last_input.contains("Additional context: also include Berlin"));
}
