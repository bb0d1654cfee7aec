use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_CONNECTION_TIMEOUT_SECONDS: u64 = 15;

/// JSON schema the provider must constrain its answer to.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

/// Text-completion provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion. `Ok(None)` means the provider answered without
    /// any text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        model: &str,
        response_schema: Option<&ResponseSchema>,
    ) -> Result<Option<String>>;

    /// Models offered by the provider, as returned by its `/models` route.
    async fn list_models(&self) -> Result<Vec<Value>>;
}

/// Client for any OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECONDS))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initialized LLM client for {} (timeout: {}s)",
            base_url, timeout_seconds
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<Value>,
}

fn build_chat_request(
    system_prompt: &str,
    user_content: &str,
    model: &str,
    response_schema: Option<&ResponseSchema>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "developer", "content": system_prompt },
            { "role": "user", "content": user_content },
        ],
    });

    if let Some(schema) = response_schema {
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "strict": true,
                "schema": schema.schema,
            },
        });
    }

    body
}

fn first_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        model: &str,
        response_schema: Option<&ResponseSchema>,
    ) -> Result<Option<String>> {
        let body = build_chat_request(system_prompt, user_content, model, response_schema);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmError(format!(
                "LLM API error {}: {}",
                status, text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::LlmError(e.to_string()))?;

        let content = first_content(chat);
        debug!("LLM ({}) answered: {:?}", model, content);
        Ok(content)
    }

    async fn list_models(&self) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmError(format!(
                "LLM API error {}: {}",
                status, text
            )));
        }

        let models: ModelsResponse = response.json().await?;
        Ok(models.data)
    }
}
