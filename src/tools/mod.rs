pub mod http;
pub mod jokes;
pub mod news;
pub mod weather;

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::{config::Config, error::tool_error::ToolError};

pub use http::HttpFetcher;
pub use jokes::JokesTool;
pub use news::NewsTool;
pub use weather::WeatherTool;

/// The closed set of tool capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Weather,
    News,
    Jokes,
}

impl ToolName {
    /// Case-insensitive lookup; `None` for anything outside the closed set.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "weather" => Some(ToolName::Weather),
            "news" => Some(ToolName::News),
            "jokes" => Some(ToolName::Jokes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Weather => "weather",
            ToolName::News => "news",
            ToolName::Jokes => "jokes",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every callable function across all tools. The (tool, function) pair is
/// checked here at dispatch time; an unknown pair is a typed error, not a
/// missing-key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFunction {
    GetCurrentWeather,
    GetWeatherByCoordinates,
    SearchNews,
    GetTopHeadlines,
    GetRandomJoke,
    SearchJokes,
}

impl ToolFunction {
    pub fn tool(&self) -> ToolName {
        match self {
            ToolFunction::GetCurrentWeather | ToolFunction::GetWeatherByCoordinates => {
                ToolName::Weather
            }
            ToolFunction::SearchNews | ToolFunction::GetTopHeadlines => ToolName::News,
            ToolFunction::GetRandomJoke | ToolFunction::SearchJokes => ToolName::Jokes,
        }
    }

    pub fn parse(tool: ToolName, function: &str) -> Option<Self> {
        let function = match function.trim().to_lowercase().as_str() {
            "get_current_weather" => ToolFunction::GetCurrentWeather,
            "get_weather_by_coordinates" => ToolFunction::GetWeatherByCoordinates,
            "search_news" => ToolFunction::SearchNews,
            "get_top_headlines" => ToolFunction::GetTopHeadlines,
            "get_random_joke" => ToolFunction::GetRandomJoke,
            "search_jokes" => ToolFunction::SearchJokes,
            _ => return None,
        };
        (function.tool() == tool).then_some(function)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolFunction::GetCurrentWeather => "get_current_weather",
            ToolFunction::GetWeatherByCoordinates => "get_weather_by_coordinates",
            ToolFunction::SearchNews => "search_news",
            ToolFunction::GetTopHeadlines => "get_top_headlines",
            ToolFunction::GetRandomJoke => "get_random_joke",
            ToolFunction::SearchJokes => "search_jokes",
        }
    }
}

impl fmt::Display for ToolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data returned by a successful tool invocation.
///
/// `fallback` marks a substitute payload served because the live upstream
/// was unreachable; downstream stages must disclose the degraded quality.
#[derive(Debug, Clone)]
pub struct ToolPayload {
    pub data: Value,
    pub fallback: bool,
}

impl ToolPayload {
    pub fn live(data: Value) -> Self {
        Self {
            data,
            fallback: false,
        }
    }

    pub fn fallback(data: Value) -> Self {
        Self {
            data,
            fallback: true,
        }
    }

    /// An API-level failure surfaced as data rather than a raised error.
    pub fn has_error_marker(&self) -> bool {
        self.data.get("error").is_some()
    }

    pub fn error_message(&self) -> Option<String> {
        self.data
            .get("error")
            .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
    }
}

/// One external data capability with a small set of named functions.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    async fn invoke(
        &self,
        function: ToolFunction,
        params: &Map<String, Value>,
    ) -> Result<ToolPayload, ToolError>;
}

/// Registry mapping tool names to handler instances.
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the three live tools, configured from the environment.
    pub fn new(config: &Config) -> Self {
        Self::with_tools(vec![
            Arc::new(WeatherTool::new(config)),
            Arc::new(NewsTool::new(config)),
            Arc::new(JokesTool::new(config)),
        ])
    }

    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools.into_iter().map(|t| (t.name(), t)).collect();
        Self { tools }
    }

    /// Resolve a (tool, function) string pair to a handler, case-insensitively.
    pub fn resolve(
        &self,
        tool: &str,
        function: &str,
    ) -> Result<(Arc<dyn Tool>, ToolFunction), ToolError> {
        let name =
            ToolName::parse(tool).ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;
        let handler = self
            .tools
            .get(&name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;
        let function = ToolFunction::parse(name, function).ok_or_else(|| {
            ToolError::UnknownFunction {
                tool: tool.to_string(),
                function: function.to_string(),
            }
        })?;
        Ok((handler, function))
    }
}

/// Capability description rendered into the planner's system prompt.
pub struct ToolInfo {
    pub name: ToolName,
    pub description: &'static str,
    pub functions: Vec<FunctionSpec>,
}

pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params_schema: Value,
}

/// Manifest of the closed capability set, in registry order.
pub fn capability_manifest() -> Vec<ToolInfo> {
    vec![
        ToolInfo {
            name: ToolName::Weather,
            description: "Current weather information from OpenWeatherMap",
            functions: vec![
                FunctionSpec {
                    name: "get_current_weather",
                    description: "Get current weather for a city",
                    params_schema: json!({ "city": "string" }),
                },
                FunctionSpec {
                    name: "get_weather_by_coordinates",
                    description: "Get current weather by geographic coordinates",
                    params_schema: json!({ "lat": "number", "lon": "number" }),
                },
            ],
        },
        ToolInfo {
            name: ToolName::News,
            description: "News search and top headlines from NewsAPI",
            functions: vec![
                FunctionSpec {
                    name: "search_news",
                    description: "Search for news articles by keyword",
                    params_schema: json!({
                        "query": "string",
                        "limit": "integer (default 5)",
                        "language": "string (default 'en')"
                    }),
                },
                FunctionSpec {
                    name: "get_top_headlines",
                    description: "Get top news headlines for a country and/or category",
                    params_schema: json!({
                        "country": "string (default 'us')",
                        "category": "string (optional)",
                        "limit": "integer (default 5)"
                    }),
                },
            ],
        },
        ToolInfo {
            name: ToolName::Jokes,
            description: "Dad jokes from icanhazdadjoke.com",
            functions: vec![
                FunctionSpec {
                    name: "get_random_joke",
                    description: "Get a random dad joke",
                    params_schema: json!({}),
                },
                FunctionSpec {
                    name: "search_jokes",
                    description: "Search for dad jokes by keyword",
                    params_schema: json!({ "query": "string", "limit": "integer (default 5)" }),
                },
            ],
        },
    ]
}

pub(crate) fn param_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn param_f64(params: &Map<String, Value>, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64)
}

pub(crate) fn param_u32(params: &Map<String, Value>, key: &str, default: u32) -> u32 {
    params.get(key).and_then(Value::as_u64).map(|v| v as u32).unwrap_or(default)
}
