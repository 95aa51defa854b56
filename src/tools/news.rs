use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::{
    config::Config,
    error::tool_error::ToolError,
    tools::{HttpFetcher, Tool, ToolFunction, ToolName, ToolPayload, param_str, param_u32},
};

const API_BASE: &str = "https://newsapi.org/v2";

const VALID_CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// NewsAPI integration: keyword search and top headlines.
pub struct NewsTool {
    fetcher: HttpFetcher,
    api_key: Option<String>,
}

impl NewsTool {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: HttpFetcher::new(API_BASE, config.request_timeout, config.cache_ttl),
            api_key: config.news_api_key.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ToolError> {
        self.api_key.as_deref().ok_or_else(|| {
            ToolError::Permanent(
                "NewsAPI key not configured. Set NEWS_API_KEY in your .env file.".to_string(),
            )
        })
    }

    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        let payload = self.fetcher.get_json(endpoint, params, &[], None).await?;
        // NewsAPI also reports failures inside a 200 body.
        if payload.data["status"] == "error" {
            let message = payload.data["message"]
                .as_str()
                .unwrap_or("Unknown error from NewsAPI")
                .to_string();
            return Err(ToolError::Transient(message));
        }
        Ok(payload.data)
    }

    async fn search_news(
        &self,
        query: &str,
        limit: u32,
        language: &str,
    ) -> Result<ToolPayload, ToolError> {
        info!(query, "searching news");
        let limit = limit.clamp(1, 100);
        let params = [
            ("q", query.to_string()),
            ("language", language.to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", limit.to_string()),
            ("apiKey", self.api_key()?.to_string()),
        ];
        let data = self.request("everything", &params).await?;
        let articles = Self::format_articles(&data, limit);

        Ok(ToolPayload::live(json!({
            "success": true,
            "query": query,
            "total_results": data["totalResults"],
            "returned_count": articles.len(),
            "articles": articles,
        })))
    }

    async fn top_headlines(
        &self,
        country: &str,
        category: Option<&str>,
        limit: u32,
    ) -> Result<ToolPayload, ToolError> {
        info!(country, ?category, "getting top headlines");
        if let Some(category) = category {
            if !VALID_CATEGORIES.contains(&category.to_lowercase().as_str()) {
                return Err(ToolError::Permanent(format!(
                    "Invalid category. Must be one of: {}",
                    VALID_CATEGORIES.join(", ")
                )));
            }
        }

        let limit = limit.clamp(1, 100);
        let mut params = vec![
            ("country", country.to_string()),
            ("pageSize", limit.to_string()),
            ("apiKey", self.api_key()?.to_string()),
        ];
        if let Some(category) = category {
            params.push(("category", category.to_lowercase()));
        }

        let data = self.request("top-headlines", &params).await?;
        let articles = Self::format_articles(&data, limit);

        Ok(ToolPayload::live(json!({
            "success": true,
            "country": country,
            "category": category,
            "total_results": data["totalResults"],
            "returned_count": articles.len(),
            "articles": articles,
        })))
    }

    fn format_articles(data: &Value, limit: u32) -> Vec<Value> {
        data["articles"]
            .as_array()
            .map(|articles| {
                articles
                    .iter()
                    .take(limit as usize)
                    .map(Self::format_article)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn format_article(article: &Value) -> Value {
        json!({
            "title": article["title"],
            "description": article["description"],
            "source": article["source"]["name"],
            "author": article["author"],
            "url": article["url"],
            "image_url": article["urlToImage"],
            "published_at": article["publishedAt"],
            "content_preview": article["content"],
        })
    }
}

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> ToolName {
        ToolName::News
    }

    async fn invoke(
        &self,
        function: ToolFunction,
        params: &Map<String, Value>,
    ) -> Result<ToolPayload, ToolError> {
        match function {
            ToolFunction::SearchNews => {
                let query = param_str(params, "query").ok_or_else(|| {
                    ToolError::Permanent("Query parameter required".to_string())
                })?;
                let limit = param_u32(params, "limit", 5);
                let language = param_str(params, "language").unwrap_or("en");
                self.search_news(query, limit, language).await
            }
            ToolFunction::GetTopHeadlines => {
                let country = param_str(params, "country").unwrap_or("us");
                let category = param_str(params, "category");
                let limit = param_u32(params, "limit", 5);
                self.top_headlines(country, category, limit).await
            }
            other => Err(ToolError::UnknownFunction {
                tool: self.name().to_string(),
                function: other.to_string(),
            }),
        }
    }
}
