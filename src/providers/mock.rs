/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the indexed JSON map from the last line of the request's
 * user message and answers according to its behavior:
 * - `MockProvider::working()` - translates every index
 * - `MockProvider::fenced()` - same, wrapped in a markdown code fence
 * - `MockProvider::partial()` - translates only the first index
 * - `MockProvider::apologizing()` - answers with prose instead of a map
 * - `MockProvider::failing()` - always fails with a connection error
 *
 * Individual credentials can additionally be scripted to fail.
 */

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{ChatRequest, ChatResponse, Provider};
use crate::errors::ProviderError;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Plain JSON map with every index translated
    Working,
    /// Working, but wrapped in a ```json fence
    Fenced,
    /// Only the first index translated
    Partial,
    /// Refusal prose instead of a map
    Apologizing,
    /// Always fails with an error
    Failing,
}

/// Scripted failure for one credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFailure {
    /// HTTP 429
    RateLimited,
    /// HTTP 401/403
    Unauthorized,
    /// Network failure
    Connection,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Requests received, including failed ones
    request_count: Arc<AtomicUsize>,
    /// Credential used by every request, in order
    keys_used: Arc<Mutex<Vec<String>>>,
    /// Most recent request
    last_request: Arc<Mutex<Option<ChatRequest>>>,
    /// Per-credential failures
    key_failures: HashMap<String, KeyFailure>,
    /// Translation of one source string
    translate: fn(&str) -> String,
    /// Simulated latency
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            keys_used: Arc::new(Mutex::new(Vec::new())),
            last_request: Arc::new(Mutex::new(None)),
            key_failures: HashMap::new(),
            translate: default_translation,
            delay: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fences its answers
    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Create a mock that answers only the first index
    pub fn partial() -> Self {
        Self::new(MockBehavior::Partial)
    }

    /// Create a mock that refuses in prose
    pub fn apologizing() -> Self {
        Self::new(MockBehavior::Apologizing)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Make one credential fail every request
    pub fn with_key_failure(mut self, key: &str, failure: KeyFailure) -> Self {
        self.key_failures.insert(key.to_string(), failure);
        self
    }

    /// Set a custom per-string translation
    pub fn with_translation(mut self, translate: fn(&str) -> String) -> Self {
        self.translate = translate;
        self
    }

    /// Delay every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Credentials used, in request order
    pub fn keys_used(&self) -> Vec<String> {
        self.keys_used.lock().clone()
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().clone()
    }

    fn answer(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let payload = request.user_content().lines().last().unwrap_or_default();
        let items: IndexMap<String, String> = serde_json::from_str(payload)
            .map_err(|e| ProviderError::RequestFailed(format!("mock expects an index map: {}", e)))?;

        let translated: IndexMap<&String, String> = match self.behavior {
            MockBehavior::Partial => items
                .iter()
                .take(1)
                .map(|(index, text)| (index, (self.translate)(text)))
                .collect(),
            _ => items
                .iter()
                .map(|(index, text)| (index, (self.translate)(text)))
                .collect(),
        };
        let json = serde_json::to_string(&translated)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(match self.behavior {
            MockBehavior::Fenced => format!("```json\n{}\n```", json),
            MockBehavior::Apologizing => {
                "I'm sorry, but I can't help with translating this content.".to_string()
            }
            _ => json,
        })
    }
}

fn default_translation(text: &str) -> String {
    format!("译{}", text)
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, api_key: &str, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.keys_used.lock().push(api_key.to_string());
        *self.last_request.lock() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.key_failures.get(api_key) {
            Some(KeyFailure::RateLimited) => {
                return Err(ProviderError::RateLimitExceeded("mock rate limit".to_string()));
            }
            Some(KeyFailure::Unauthorized) => {
                return Err(ProviderError::AuthenticationError("mock verification".to_string()));
            }
            Some(KeyFailure::Connection) => {
                return Err(ProviderError::ConnectionError("mock connection reset".to_string()));
            }
            None => {}
        }

        if self.behavior == MockBehavior::Failing {
            return Err(ProviderError::ConnectionError("mock provider failure".to_string()));
        }

        let answer = self.answer(&request)?;
        let usage = (
            request.user_content().chars().count() as u32,
            answer.chars().count() as u32,
        );
        Ok(ChatResponse::from_text(answer).with_usage(usage.0, usage.1))
    }
}
