use std::{env, time::Duration};

/// Process configuration, read once at startup from the environment.
///
/// Per-tool API keys stay optional here: a missing key is a per-step
/// configuration error at execution time, not a startup failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_model: String,

    pub openweather_api_key: Option<String>,
    pub news_api_key: Option<String>,

    pub request_timeout: Duration,
    pub cache_ttl: Duration,

    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            llm_api_key: read_key("GROQ_API_KEY"),
            llm_api_base: env::var("GROQ_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            llm_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            openweather_api_key: read_key("OPENWEATHER_API_KEY"),
            news_api_key: read_key("NEWS_API_KEY"),
            request_timeout: Duration::from_secs(read_u64("REQUEST_TIMEOUT_SECS", 30)),
            cache_ttl: Duration::from_secs(read_u64("CACHE_TTL_SECS", 300)),
            max_retries: read_u64("MAX_RETRIES", 3) as u32,
            retry_base_delay: Duration::from_millis(read_u64("RETRY_BASE_DELAY_MS", 1000)),
        }
    }
}

/// Placeholder values from a copied .env template count as unset.
fn read_key(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() && !v.starts_with("your_") => Some(v),
        _ => None,
    }
}

fn read_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
