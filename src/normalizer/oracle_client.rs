//! Oracle API HTTP client
//!
//! Structured HTTP client for an OpenRouter-compatible chat completions
//! endpoint, used as the text-generation oracle behind query normalization:
//! - Bearer token authentication
//! - Request/response serialization
//! - Error handling with network vs API error distinction
//! - Bounded retry with exponential backoff

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Oracle call errors
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network error (connection failed, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (4xx/5xx responses)
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimit { retry_after_secs: u64 },

    /// Invalid API key
    #[error("Invalid API key")]
    Unauthorized,
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Network(err.to_string())
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Oracle API client
pub struct OracleClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl OracleClient {
    /// Default API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";

    /// Create a new client with default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Create a client with custom configuration
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
        max_retries: Option<u32>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            timeout: timeout.unwrap_or(Duration::from_secs(30)),
            max_retries: max_retries.unwrap_or(3),
        }
    }

    /// Build the request body for a chat completion
    pub fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: usize,
    ) -> serde_json::Value {
        json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    /// Send a chat completion request, returning the reply text
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(model, &messages, temperature, max_tokens);

        let mut last_error = None;
        let mut retry_count = 0;

        while retry_count <= self.max_retries {
            match self.send_request(&url, &body).await {
                Ok(content) => return Ok(content),
                Err(OracleError::RateLimit { retry_after_secs }) => {
                    let wait_time = std::cmp::max(retry_after_secs, 2_u64.pow(retry_count));
                    tracing::warn!(wait_time, "oracle rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs(wait_time)).await;
                    retry_count += 1;
                    last_error = Some(OracleError::RateLimit { retry_after_secs });
                }
                Err(OracleError::Network(msg)) if retry_count < self.max_retries => {
                    let wait_time = 2_u64.pow(retry_count);
                    tracing::warn!(error = %msg, wait_time, "oracle network error, retrying");
                    tokio::time::sleep(Duration::from_secs(wait_time)).await;
                    retry_count += 1;
                    last_error = Some(OracleError::Network(msg));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(OracleError::Network("Max retries exceeded".to_string())))
    }

    async fn send_request(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<String, OracleError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(OracleError::RateLimit {
                retry_after_secs: retry_after,
            });
        }

        if status.as_u16() == 401 {
            return Err(OracleError::Unauthorized);
        }

        let response_text = response.text().await?;
        let api_response: ApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| OracleError::Parse(format!("{}: {}", e, response_text)))?;

        if let Some(error) = api_response.error {
            return Err(OracleError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(OracleError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        api_response
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.message.as_ref())
            .and_then(|msg| msg.content.clone())
            .ok_or_else(|| OracleError::Parse("No content in response".to_string()))
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
