mod common;

use std::{sync::Arc, time::Duration};

use common::{Behavior, MockTool, step, test_config};
use opsagent::{
    Executor,
    models::Plan,
    tools::{Tool, ToolName, ToolRegistry},
};
use serde_json::json;

fn executor_with(tools: Vec<Arc<MockTool>>) -> Executor {
    let tools: Vec<Arc<dyn Tool>> = tools.into_iter().map(|t| t as Arc<dyn Tool>).collect();
    Executor::with_policy(Arc::new(ToolRegistry::with_tools(tools)), 3, Duration::ZERO)
}

fn plan_with(steps: Vec<opsagent::models::Step>) -> Plan {
    Plan {
        plan_id: "test-plan".to_string(),
        task: "test task".to_string(),
        steps,
        expected_output: "results".to_string(),
        error: None,
    }
}

#[tokio::test]
async fn empty_plan_fails_immediately() {
    let executor = executor_with(vec![]);
    let plan = Plan::empty("task", "nothing", "No steps");

    let result = executor.execute_plan(&plan).await;

    assert!(!result.success);
    assert_eq!(result.total_steps, 0);
    assert!(result.step_results.is_empty());
}

#[tokio::test]
async fn always_failing_handler_uses_exactly_max_retries() {
    let (tool, invocations) = MockTool::new(
        ToolName::News,
        Behavior::FailTransient("upstream 503".to_string()),
    );
    let executor = executor_with(vec![tool]);

    let result = executor
        .execute_step(&step(1, "news", "search_news", json!({ "query": "rust" })))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempt, 3);
    assert_eq!(invocations.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(result.error.as_deref(), Some("upstream 503"));
}

#[tokio::test]
async fn error_marker_in_payload_is_retried_like_a_raised_failure() {
    let (tool, invocations) = MockTool::new(
        ToolName::Jokes,
        Behavior::ErrorMarker(json!({ "error": "No jokes found for that query." })),
    );
    let executor = executor_with(vec![tool]);

    let result = executor
        .execute_step(&step(1, "jokes", "search_jokes", json!({ "query": "zzz" })))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempt, 3);
    assert_eq!(invocations.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(result.error.as_deref(), Some("No jokes found for that query."));
}

#[tokio::test]
async fn permanent_failure_is_not_retried() {
    let (tool, invocations) = MockTool::new(
        ToolName::Weather,
        Behavior::FailPermanent("OpenWeatherMap API key not configured".to_string()),
    );
    let executor = executor_with(vec![tool]);

    let result = executor
        .execute_step(&step(1, "weather", "get_current_weather", json!({ "city": "Oslo" })))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempt, 1);
    assert_eq!(invocations.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_tool_and_function_fail_at_dispatch_with_attempt_zero() {
    let (jokes, invocations) = MockTool::new(ToolName::Jokes, Behavior::Succeed(json!({})));
    let executor = executor_with(vec![jokes]);

    let unknown_tool = executor
        .execute_step(&step(1, "stocks", "get_quote", json!({})))
        .await;
    assert!(!unknown_tool.success);
    assert_eq!(unknown_tool.attempt, 0);
    assert!(unknown_tool.error.as_deref().unwrap().contains("Unknown tool"));

    let unknown_function = executor
        .execute_step(&step(2, "jokes", "get_latest_joke", json!({})))
        .await;
    assert!(!unknown_function.success);
    assert_eq!(unknown_function.attempt, 0);
    assert!(
        unknown_function
            .error
            .as_deref()
            .unwrap()
            .contains("Unknown function")
    );
    assert_eq!(invocations.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallback_payload_counts_as_success_and_is_flagged() {
    let fallback_data = json!({
        "success": false,
        "error": "Weather service unavailable for Paris",
        "fallback": true,
    });
    let (tool, _) = MockTool::new(ToolName::Weather, Behavior::Fallback(fallback_data.clone()));
    let executor = executor_with(vec![tool]);

    let plan = plan_with(vec![step(
        1,
        "weather",
        "get_current_weather",
        json!({ "city": "Paris" }),
    )]);
    let result = executor.execute_plan(&plan).await;

    assert!(result.success);
    assert_eq!(result.steps_completed, 1);
    assert_eq!(result.fallback_count, 1);
    let step_result = &result.step_results[0];
    assert!(step_result.success);
    assert!(step_result.fallback);
    assert_eq!(step_result.attempt, 1);
    assert_eq!(step_result.data, Some(fallback_data));
}

#[tokio::test]
async fn one_failure_never_aborts_later_steps_and_order_is_kept() {
    let (news, _) = MockTool::new(
        ToolName::News,
        Behavior::Succeed(json!({ "success": true, "articles": [] })),
    );
    let (weather, _) = MockTool::new(
        ToolName::Weather,
        Behavior::FailTransient("timeout".to_string()),
    );
    let (jokes, _) = MockTool::new(
        ToolName::Jokes,
        Behavior::Succeed(json!({ "success": true, "type": "random", "joke": "Hah." })),
    );
    let executor = executor_with(vec![news, weather, jokes]);

    let plan = plan_with(vec![
        step(1, "news", "get_top_headlines", json!({})),
        step(2, "weather", "get_current_weather", json!({ "city": "Oslo" })),
        step(3, "jokes", "get_random_joke", json!({})),
    ]);
    let result = executor.execute_plan(&plan).await;

    assert!(result.success);
    assert_eq!(result.steps_completed, 2);
    assert_eq!(result.total_steps, 3);
    assert_eq!(result.fallback_count, 0);
    let ids: Vec<u32> = result.step_results.iter().map(|r| r.step_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(!result.step_results[1].success);
}

#[tokio::test]
async fn overall_success_tracks_any_completed_step() {
    let (weather, _) = MockTool::new(
        ToolName::Weather,
        Behavior::FailTransient("down".to_string()),
    );
    let executor = executor_with(vec![weather]);

    let plan = plan_with(vec![step(
        1,
        "weather",
        "get_current_weather",
        json!({ "city": "Oslo" }),
    )]);
    let result = executor.execute_plan(&plan).await;

    assert_eq!(result.success, result.steps_completed > 0);
    assert!(!result.success);
}

// default config sanity: retry policy comes from Config
#[tokio::test]
async fn executor_honors_configured_retry_bound() {
    let mut config = test_config();
    config.max_retries = 2;
    let (tool, invocations) = MockTool::new(
        ToolName::Jokes,
        Behavior::FailTransient("flaky".to_string()),
    );
    let executor = Executor::new(
        Arc::new(ToolRegistry::with_tools(vec![tool as Arc<dyn Tool>])),
        &config,
    );

    let result = executor
        .execute_step(&step(1, "jokes", "get_random_joke", json!({})))
        .await;

    assert_eq!(result.attempt, 2);
    assert_eq!(invocations.load(std::sync::atomic::Ordering::SeqCst), 2);
}
