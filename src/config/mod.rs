use crate::error::{ApiError, Result};
use serde::Deserialize;
use tracing::error;

pub const DEFAULT_CATALOG_API_URL: &str = "https://graphql.anilist.co";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const DEV_JWT_SECRET: &str = "secret-key";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of an OpenAI-compatible API, e.g. `https://openrouter.ai/api/v1`
    #[serde(default)]
    pub llm_api_endpoint: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub default_model: String,
    pub llm_timeout_secs: u64,
    pub llm_retry_attempts: u32,
    pub catalog_api_url: String,
    pub catalog_timeout_secs: u64,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    pub supabase_url: String,
    pub supabase_key: String,
    pub extractor_timeout_secs: u64,
    pub recommendation_page_size: u32,
}

impl Config {
    /// Load configuration from `.env` and `APP_*` environment variables.
    ///
    /// Fails when the LLM endpoint or key is missing: the service cannot
    /// answer a single search without them.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("default_model", DEFAULT_MODEL)?
            .set_default("llm_timeout_secs", 60)?
            .set_default("llm_retry_attempts", 3)?
            .set_default("catalog_api_url", DEFAULT_CATALOG_API_URL)?
            .set_default("catalog_timeout_secs", 30)?
            .set_default("extractor_timeout_secs", 20)?
            .set_default("recommendation_page_size", 10)?
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm_endpoint().is_none() {
            return Err(ApiError::ConfigError(
                "APP_LLM_API_ENDPOINT is not set".to_string(),
            ));
        }
        if self.llm_key().is_none() {
            return Err(ApiError::ConfigError(
                "APP_LLM_API_KEY is not set".to_string(),
            ));
        }
        if self.llm_retry_attempts == 0 {
            return Err(ApiError::ConfigError(
                "APP_LLM_RETRY_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn llm_endpoint(&self) -> Option<&str> {
        non_empty(&self.llm_api_endpoint)
    }

    pub fn llm_key(&self) -> Option<&str> {
        non_empty(&self.llm_api_key)
    }

    pub fn jwt_secret(&self) -> &str {
        match non_empty(&self.jwt_secret) {
            Some(secret) => secret,
            None => {
                error!("APP_JWT_SECRET is not set, using a development secret");
                DEV_JWT_SECRET
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
