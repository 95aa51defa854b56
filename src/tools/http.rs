use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{error::tool_error::ToolError, tools::ToolPayload};

struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

/// Shared HTTP GET plumbing for the tools: JSON fetching, status mapping,
/// a bounded-lifetime response cache, and optional fallback data on timeout.
///
/// The cache is private to one tool instance; there is no concurrent
/// request model in scope, so a plain mutex around the map is enough.
pub struct HttpFetcher {
    client: reqwest::Client,
    api_base: String,
    timeout: Duration,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl HttpFetcher {
    pub fn new(api_base: impl Into<String>, timeout: Duration, cache_ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            timeout,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// GET `{api_base}/{endpoint}` and parse the body as JSON.
    ///
    /// A timeout with `fallback` configured returns the substitute payload
    /// marked `fallback = true` instead of an error.
    pub async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
        fallback: Option<Value>,
    ) -> Result<ToolPayload, ToolError> {
        let cache_key = Self::cache_key(endpoint, params);
        if let Some(data) = self.cached(&cache_key) {
            debug!(endpoint, "cache hit");
            return Ok(ToolPayload::live(data));
        }

        let url = format!("{}/{}", self.api_base.trim_end_matches('/'), endpoint);
        let mut request = self.client.get(&url).query(params).timeout(self.timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(endpoint, "request timed out");
                if let Some(data) = fallback {
                    info!(endpoint, "returning fallback data after timeout");
                    return Ok(ToolPayload::fallback(data));
                }
                return Err(ToolError::Transient(format!(
                    "Timeout requesting {endpoint}"
                )));
            }
            Err(e) => {
                return Err(ToolError::Transient(format!("Request failed: {e}")));
            }
        };

        if let Some(error) = Self::map_status(response.status()) {
            warn!(endpoint, status = %response.status(), "upstream returned an error status");
            return Err(error);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Transient(format!("Invalid JSON response: {e}")))?;

        self.store(cache_key, data.clone());
        Ok(ToolPayload::live(data))
    }

    fn map_status(status: StatusCode) -> Option<ToolError> {
        match status {
            StatusCode::UNAUTHORIZED => Some(ToolError::Permanent(
                "Unauthorized: invalid or missing API key".to_string(),
            )),
            StatusCode::NOT_FOUND => Some(ToolError::Transient(
                "Not found: the requested resource doesn't exist".to_string(),
            )),
            StatusCode::UPGRADE_REQUIRED => Some(ToolError::Transient(
                "The API plan does not support this request".to_string(),
            )),
            StatusCode::TOO_MANY_REQUESTS => Some(ToolError::Transient(
                "API rate limit exceeded".to_string(),
            )),
            s if s.is_client_error() || s.is_server_error() => {
                Some(ToolError::Transient(format!("HTTP error: {}", s.as_u16())))
            }
            _ => None,
        }
    }

    fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<_> = params.iter().collect();
        sorted.sort();
        format!("{endpoint}:{sorted:?}")
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.data.clone())
    }

    fn store(&self, key: String, data: Value) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            key,
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }
}
