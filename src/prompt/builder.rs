use crate::{
    error::Result,
    models::StepResult,
    tools::{ToolInfo, capability_manifest},
};

/// Planner system prompt with the capability manifest embedded, so the
/// model only ever plans against the registered tool set.
pub fn build_planner_prompt() -> String {
    format!(
        r#"You are an AI task planner. Your job is to analyze user requests and create structured execution plans.

{}

IMPORTANT: You must respond with ONLY a valid JSON object in this exact format:
{{
  "task": "the original user query",
  "steps": [
    {{
      "step_id": 1,
      "action": "description of what this step does",
      "tool": "tool_name (weather, news, or jokes)",
      "function": "function_name",
      "parameters": {{"param1": "value1", "param2": "value2"}}
    }}
  ],
  "expected_output": "description of what the final result should contain"
}}

Rules:
- Analyze the user's request carefully to identify ALL required information
- Create a step for EACH piece of information needed
- Use the appropriate tool and function for each step
- Parameters must be concrete values extracted from the user's request
- For weather, extract city names or coordinates
- For news, extract search topics or categories and country codes
- For jokes, extract joke search terms or use random
- If a request mentions multiple cities or topics, create separate steps for each
- Always include realistic parameter values based on the user's request"#,
        build_tools_manifest(&capability_manifest())
    )
}

pub fn build_planner_request(user_input: &str) -> String {
    format!(
        "Create an execution plan for this request:\n\n\"{user_input}\"\n\nRespond with ONLY the JSON plan object, no other text."
    )
}

fn build_tools_manifest(tools: &[ToolInfo]) -> String {
    let tools_text = tools
        .iter()
        .map(|tool| {
            let functions = tool
                .functions
                .iter()
                .map(|f| format!("   - {}: {} — params: {}", f.name, f.description, f.params_schema))
                .collect::<Vec<_>>()
                .join("\n");
            format!(" - \"{}\": {}\n{}", tool.name, tool.description, functions)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You have access to these tools:\n{tools_text}\n\nThese are the ONLY tools available. Do not use or reference any other tools."
    )
}

pub fn build_verifier_prompt() -> &'static str {
    r#"You are a results verifier and formatter. Your job is to:
1. Check if the execution results answer the user's original question
2. Identify any missing or incomplete information
3. Format the results into a clear, user-friendly response

You must respond with ONLY a valid JSON object in this format:
{
  "is_complete": true/false,
  "missing_info": ["list of missing information if any"],
  "formatted_answer": "A well-formatted, comprehensive answer to the user's question using the provided results",
  "suggestions": ["any suggestions for the user if applicable"]
}

Rules:
- The formatted_answer should be comprehensive and directly address the user's query
- Include specific data from the results (numbers, names, descriptions)
- If results contain errors, acknowledge them gracefully
- If a result is marked as fallback data, note that it came from a degraded source
- Format the answer in a readable way with clear sections if multiple topics are covered
- Be helpful and informative in your response"#
}

pub fn build_verifier_request(task: &str, step_results: &[StepResult]) -> Result<String> {
    let results_text = serde_json::to_string_pretty(step_results)?;
    Ok(format!(
        "Original user request: \"{task}\"\n\nExecution results:\n{results_text}\n\nVerify these results and provide a formatted answer. Respond with ONLY the JSON object."
    ))
}
