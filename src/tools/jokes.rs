use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::{
    config::Config,
    error::tool_error::ToolError,
    tools::{HttpFetcher, Tool, ToolFunction, ToolName, ToolPayload, param_str, param_u32},
};

const API_BASE: &str = "https://icanhazdadjoke.com";

/// icanhazdadjoke.com integration. No API key required.
pub struct JokesTool {
    fetcher: HttpFetcher,
}

impl JokesTool {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: HttpFetcher::new(API_BASE, config.request_timeout, config.cache_ttl),
        }
    }

    async fn random_joke(&self) -> Result<ToolPayload, ToolError> {
        info!("getting random dad joke");
        let payload = self
            .fetcher
            .get_json("", &[], &[("Accept", "application/json")], None)
            .await?;

        Ok(ToolPayload::live(json!({
            "success": true,
            "type": "random",
            "joke": payload.data["joke"],
            "id": payload.data["id"],
        })))
    }

    async fn search_jokes(&self, query: &str, limit: u32) -> Result<ToolPayload, ToolError> {
        info!(query, "searching dad jokes");
        let limit = limit.clamp(1, 30);
        let params = [("term", query.to_string()), ("limit", limit.to_string())];
        let payload = self
            .fetcher
            .get_json("search", &params, &[("Accept", "application/json")], None)
            .await?;

        let jokes: Vec<Value> = payload.data["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .take(limit as usize)
                    .map(|item| json!({ "joke": item["joke"], "id": item["id"] }))
                    .collect()
            })
            .unwrap_or_default();

        let returned_count = jokes.len();
        Ok(ToolPayload::live(json!({
            "success": true,
            "type": "search",
            "query": query,
            "total_results": payload.data["total_jokes"],
            "jokes": jokes,
            "returned_count": returned_count,
        })))
    }
}

#[async_trait]
impl Tool for JokesTool {
    fn name(&self) -> ToolName {
        ToolName::Jokes
    }

    async fn invoke(
        &self,
        function: ToolFunction,
        params: &Map<String, Value>,
    ) -> Result<ToolPayload, ToolError> {
        match function {
            ToolFunction::GetRandomJoke => self.random_joke().await,
            ToolFunction::SearchJokes => {
                let query = param_str(params, "query").ok_or_else(|| {
                    ToolError::Permanent("Query parameter required".to_string())
                })?;
                let limit = param_u32(params, "limit", 5);
                self.search_jokes(query, limit).await
            }
            other => Err(ToolError::UnknownFunction {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}
