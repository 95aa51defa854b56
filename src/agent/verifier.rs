use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::{
    llm::LanguageModel,
    models::{FailedStep, StepResult, VerificationResult},
};

/// Validates execution results and formats them into the user-facing
/// answer, degrading to deterministic templates when the model is
/// unavailable.
pub struct Verifier {
    llm: Arc<dyn LanguageModel>,
}

impl Verifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn verify_and_format(
        &self,
        original_task: &str,
        step_results: &[StepResult],
    ) -> VerificationResult {
        info!("verifying and formatting execution results");

        if step_results.is_empty() {
            return VerificationResult {
                is_complete: false,
                formatted_answer:
                    "No results were obtained. The execution plan was empty or all steps failed."
                        .to_string(),
                missing_info: vec!["All requested information".to_string()],
                failed_steps: Vec::new(),
                suggestions: vec!["Please try rephrasing your query".to_string()],
                successful_steps: None,
                total_steps: None,
            };
        }

        let failed_steps: Vec<FailedStep> = step_results
            .iter()
            .filter(|r| !r.success)
            .map(|r| FailedStep {
                step_id: r.step_id,
                action: r.action.clone(),
                error: r.error.clone(),
            })
            .collect();
        let successful_count = step_results.len() - failed_steps.len();

        if successful_count == 0 {
            return all_failed_report(original_task, failed_steps);
        }

        match self.llm.verify_results(original_task, step_results).await {
            Ok(verification) => {
                let mut formatted_answer = verification.formatted_answer;
                // Failed steps are never silently dropped from the
                // user-visible answer, whatever the model produced.
                if !failed_steps.is_empty() {
                    formatted_answer.push_str(&failure_note(&failed_steps));
                }
                VerificationResult {
                    is_complete: verification.is_complete,
                    formatted_answer,
                    missing_info: verification.missing_info,
                    suggestions: verification.suggestions,
                    successful_steps: Some(successful_count as u32),
                    total_steps: Some(step_results.len() as u32),
                    failed_steps,
                }
            }
            Err(e) => {
                error!(error = %e, "verification failed, falling back to basic formatting");
                basic_format(original_task, step_results, failed_steps)
            }
        }
    }

    /// Failed steps the caller may choose to re-execute; no automatic
    /// re-execution loop exists here.
    pub fn get_steps_to_retry<'a>(
        &self,
        verification_result: &'a VerificationResult,
    ) -> &'a [FailedStep] {
        &verification_result.failed_steps
    }
}

fn all_failed_report(original_task: &str, failed_steps: Vec<FailedStep>) -> VerificationResult {
    let error_details = failed_steps
        .iter()
        .map(|step| {
            format!(
                "- Step {}: {}",
                step.step_id,
                step.error.as_deref().unwrap_or("Unknown error")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let formatted_answer = format!(
        r#"I was unable to complete your request: "{original_task}"

All execution steps failed with the following errors:
{error_details}

**Suggestions:**
- Check that all required API keys are configured in your .env file
- Verify your internet connection
- Try simplifying your query
- Check if the requested resources exist (e.g., valid city names)"#
    );

    VerificationResult {
        is_complete: false,
        formatted_answer,
        missing_info: vec!["All requested information due to execution failures".to_string()],
        failed_steps,
        suggestions: vec![
            "Verify API keys are configured".to_string(),
            "Check internet connection".to_string(),
            "Try a simpler query".to_string(),
        ],
        successful_steps: None,
        total_steps: None,
    }
}

/// Deterministic formatting used when the model cannot be reached:
/// group successful results by tool and render each with its template.
fn basic_format(
    original_task: &str,
    step_results: &[StepResult],
    failed_steps: Vec<FailedStep>,
) -> VerificationResult {
    let mut parts = vec![format!("**Results for:** {original_task}\n")];

    for result in step_results.iter().filter(|r| r.success) {
        let heading = if result.fallback {
            format!("\n**{} Results (fallback data):**", result.tool.to_uppercase())
        } else {
            format!("\n**{} Results:**", result.tool.to_uppercase())
        };
        parts.push(heading);
        let data = result.data.clone().unwrap_or(Value::Null);
        parts.push(format_tool_data(&result.tool, &data));
    }

    if !failed_steps.is_empty() {
        parts.push(failure_note(&failed_steps));
    }

    VerificationResult {
        is_complete: failed_steps.is_empty(),
        formatted_answer: parts.join("\n"),
        missing_info: Vec::new(),
        failed_steps,
        suggestions: Vec::new(),
        successful_steps: None,
        total_steps: None,
    }
}

fn format_tool_data(tool: &str, data: &Value) -> String {
    match tool {
        "weather" => format_weather_data(data),
        "news" => format_news_data(data),
        "jokes" => format_jokes_data(data),
        _ => data.to_string(),
    }
}

fn format_weather_data(data: &Value) -> String {
    if data["success"] != true {
        return format!(
            "Error: {}",
            data["error"].as_str().unwrap_or("Unknown error")
        );
    }

    let location = &data["location"];
    let weather = &data["weather"];
    let temp = &data["temperature"]["current"];

    [
        format!(
            "**{}, {}**",
            location["city"].as_str().unwrap_or("Unknown"),
            location["country"].as_str().unwrap_or("")
        ),
        format!(
            "- Conditions: {}",
            title_case(weather["description"].as_str().unwrap_or("N/A"))
        ),
        format!(
            "- Temperature: {}°C / {}°F",
            display(&temp["celsius"]),
            display(&temp["fahrenheit"])
        ),
        format!("- Humidity: {}%", display(&data["humidity"])),
        format!("- Wind: {} m/s", display(&data["wind"]["speed_ms"])),
    ]
    .join("\n")
}

fn format_news_data(data: &Value) -> String {
    let Some(articles) = data["articles"].as_array() else {
        return data.to_string();
    };

    let mut lines = Vec::new();
    for article in articles.iter().take(5) {
        lines.push(format!(
            "- **{}**",
            article["title"].as_str().unwrap_or("No title")
        ));
        let published = article["published_at"]
            .as_str()
            .map(|d| d.chars().take(10).collect::<String>())
            .unwrap_or_else(|| "N/A".to_string());
        lines.push(format!(
            "  Source: {} | {}",
            article["source"].as_str().unwrap_or("Unknown"),
            published
        ));
        if let Some(description) = article["description"].as_str() {
            lines.push(format!(
                "  {}...",
                description.chars().take(150).collect::<String>()
            ));
        }
    }

    if lines.is_empty() {
        data.to_string()
    } else {
        lines.join("\n")
    }
}

fn format_jokes_data(data: &Value) -> String {
    if data["type"] == "random" {
        return format!("- {}", data["joke"].as_str().unwrap_or("No joke"));
    }

    let lines: Vec<String> = data["jokes"]
        .as_array()
        .map(|jokes| {
            jokes
                .iter()
                .take(5)
                .map(|j| format!("- {}", j["joke"].as_str().unwrap_or("No joke")))
                .collect()
        })
        .unwrap_or_default();

    if lines.is_empty() {
        data.to_string()
    } else {
        lines.join("\n")
    }
}

/// Exactly one note block per answer; callers append it at most once.
fn failure_note(failed_steps: &[FailedStep]) -> String {
    let mut lines = vec!["\n\n**Note:** Some information could not be retrieved:".to_string()];
    for step in failed_steps {
        lines.push(format!(
            "- {}: {}",
            step.action,
            step.error.as_deref().unwrap_or("Unknown error")
        ));
    }
    lines.join("\n")
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn weather_template_renders_normalized_data() {
        let data = json!({
            "success": true,
            "location": { "city": "Paris", "country": "FR" },
            "weather": { "description": "scattered clouds" },
            "temperature": { "current": { "celsius": 20.0, "fahrenheit": 68.0 } },
            "humidity": 60,
            "wind": { "speed_ms": 4.0 },
        });
        let text = format_weather_data(&data);
        assert!(text.contains("**Paris, FR**"));
        assert!(text.contains("Scattered Clouds"));
        assert!(text.contains("20.0°C / 68.0°F"));
    }

    #[test]
    fn jokes_template_handles_random_and_search() {
        let random = json!({ "type": "random", "joke": "A dad joke." });
        assert_eq!(format_jokes_data(&random), "- A dad joke.");

        let search = json!({ "type": "search", "jokes": [{ "joke": "One." }, { "joke": "Two." }] });
        assert_eq!(format_jokes_data(&search), "- One.\n- Two.");
    }

    #[test]
    fn failure_note_lists_each_failed_step() {
        let failed = vec![FailedStep {
            step_id: 2,
            action: "Fetch headlines".to_string(),
            error: Some("Unknown function: get_latest".to_string()),
        }];
        let note = failure_note(&failed);
        assert!(note.starts_with("\n\n**Note:**"));
        assert!(note.contains("Fetch headlines: Unknown function: get_latest"));
    }
}
