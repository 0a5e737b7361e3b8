use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{ChatRequest, ChatResponse, Provider};
use crate::errors::ProviderError;

/// Default public endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible chat completion APIs
#[derive(Debug, Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API base URL
    endpoint: String,
}

impl OpenAI {
    /// Create a new client. An empty endpoint selects the public API.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: if endpoint.trim().is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
        }
    }

    /// Full URL of the chat completions route
    pub fn completions_url(&self) -> Result<Url, ProviderError> {
        let base = format!("{}/", self.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|url| url.join("chat/completions"))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", self.endpoint, e)))
    }
}

/// Map a non-success HTTP status to a provider error
pub fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        429 => ProviderError::RateLimitExceeded(body),
        401 | 403 => ProviderError::AuthenticationError(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, api_key: &str, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = self.completions_url()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Translation API error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}
