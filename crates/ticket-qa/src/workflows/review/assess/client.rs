use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::config::AssessorConfig;

/// One logical request to the text-judgment capability.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Output schema identifier, also the criterion key.
    pub schema_name: &'static str,
    pub max_points: u16,
}

/// Failure modes of the narrative backend.
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error("rate limited by narrative backend")]
    RateLimited,
    #[error("request to narrative backend failed: {0}")]
    Connection(String),
    #[error("narrative assessment timed out")]
    Timeout,
    #[error("narrative backend returned {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("narrative backend response was not usable: {0}")]
    InvalidResponse(String),
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl AssessError {
    /// Transient failures are retried with backoff; everything else fails
    /// fast.
    fn is_transient(&self) -> bool {
        match self {
            AssessError::RateLimited | AssessError::Connection(_) | AssessError::Timeout => true,
            AssessError::Api { status, .. } => *status >= 500,
            AssessError::InvalidResponse(_) | AssessError::RetriesExhausted { .. } => false,
        }
    }
}

/// Seam between the assessor and whatever produces judgments, so tests can
/// script responses without a network.
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<serde_json::Value, AssessError>;
}

/// Accumulated token usage across requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub request_count: u64,
}

impl TokenUsage {
    fn record(&mut self, usage: &serde_json::Value) {
        self.prompt_tokens += usage["prompt_tokens"].as_u64().unwrap_or(0);
        self.completion_tokens += usage["completion_tokens"].as_u64().unwrap_or(0);
        self.total_tokens += usage["total_tokens"].as_u64().unwrap_or(0);
        self.request_count += 1;
    }
}

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// The retry loop is an explicit bounded loop: attempt counter, computed
/// delay doubling from one second, capped attempts from configuration.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    config: AssessorConfig,
    api_key: String,
    usage: Mutex<TokenUsage>,
}

impl OpenAiChatClient {
    pub fn new(config: AssessorConfig) -> Result<Self, AssessError> {
        let api_key = config
            .require_api_key()
            .map_err(|err| AssessError::Connection(err.to_string()))?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AssessError::Connection(err.to_string()))?;

        Ok(Self {
            http,
            config,
            api_key,
            usage: Mutex::new(TokenUsage::default()),
        })
    }

    pub fn usage(&self) -> TokenUsage {
        *self.usage.lock().expect("usage mutex poisoned")
    }

    fn retry_delay(attempt: u32) -> Duration {
        RETRY_BASE_DELAY * 2u32.saturating_pow(attempt)
    }

    async fn request_once(&self, request: &ChatRequest) -> Result<serde_json::Value, AssessError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
        });

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AssessError::Timeout
                } else {
                    AssessError::Connection(err.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AssessError::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AssessError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| AssessError::InvalidResponse(err.to_string()))?;

        if let Some(usage) = payload.get("usage") {
            self.usage.lock().expect("usage mutex poisoned").record(usage);
        }

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AssessError::InvalidResponse("empty completion content".to_string()))?;

        serde_json::from_str(content)
            .map_err(|err| AssessError::InvalidResponse(format!("content is not JSON: {err}")))
    }
}

#[async_trait]
impl NarrativeBackend for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<serde_json::Value, AssessError> {
        let mut last_error: Option<AssessError> = None;

        for attempt in 0..self.config.max_retries {
            match self.request_once(request).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    let delay = Self::retry_delay(attempt);
                    warn!(
                        criterion = request.schema_name,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "transient narrative backend failure, retrying"
                    );
                    last_error = Some(err);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(AssessError::RetriesExhausted {
            attempts: self.config.max_retries,
            last: last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        })
    }
}
