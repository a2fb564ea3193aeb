/// LLM Gateway — the single point of entry for all model calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through `LlmGateway::call`.
///
/// One gateway is constructed at startup and shared behind an `Arc`. It owns
/// the response cache and lazily builds its provider client exactly once.
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub mod cache;
pub mod provider;
pub mod retry;
#[cfg(test)]
pub mod testing;

use cache::{fingerprint, ResponseCache};
use provider::{ChatProvider, OpenAiProvider, ProviderFailure, ProviderRequest};
use retry::{jittered_backoff, RetryPolicy, RetryState};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM call failed after {attempts} attempt(s): {message}")]
    Provider { attempts: u32, message: String },
}

/// Failure of a single attempt. Every variant is retried identically.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderFailure),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[cfg(test)]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A logical chat completion request. Unset knobs fall back to the gateway
/// defaults; the cache key depends only on model, JSON-mode and messages.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
    retries: Option<u32>,
    json_mode: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            timeout: None,
            retries: None,
            json_mode: false,
        }
    }

    /// Single user-message request, the shape every prompt in this service uses.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::user(content)])
    }

    #[cfg(test)]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[cfg(test)]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[cfg(test)]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Result of a gateway call. `json` is populated only for JSON-mode requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub text: String,
    pub model: String,
    pub latency_ms: u64,
    pub attempt: u32,
    pub json_mode: bool,
    pub cache_hit: bool,
    pub json: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    pub timeout: Duration,
    pub retries: u32,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
}

pub struct LlmGateway {
    settings: GatewaySettings,
    cache: ResponseCache,
    provider: OnceCell<Arc<dyn ChatProvider>>,
}

impl LlmGateway {
    /// The provider client is built on first use from `settings.api_key`.
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            cache: ResponseCache::new(settings.cache_ttl),
            settings,
            provider: OnceCell::new(),
        }
    }

    /// Gateway over an already-constructed provider.
    #[cfg(test)]
    pub fn with_provider(settings: GatewaySettings, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            cache: ResponseCache::new(settings.cache_ttl),
            settings,
            provider: OnceCell::with_value(provider),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.settings.default_model
    }

    fn provider(&self) -> Result<&Arc<dyn ChatProvider>, LlmError> {
        self.provider.get_or_try_init(|| {
            let api_key = self
                .settings
                .api_key
                .as_deref()
                .ok_or_else(|| LlmError::Configuration("Missing OPENAI_API_KEY".to_string()))?;
            let client = OpenAiProvider::new(api_key, &self.settings.base_url).map_err(|e| {
                LlmError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;
            info!(base_url = %self.settings.base_url, "LLM provider client initialized");
            Ok(Arc::new(client) as Arc<dyn ChatProvider>)
        })
    }

    fn resolve(&self, request: &ChatRequest) -> ProviderRequest {
        ProviderRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.settings.default_model.clone()),
            messages: request.messages.clone(),
            temperature: request
                .temperature
                .unwrap_or(self.settings.default_temperature),
            max_tokens: request
                .max_tokens
                .unwrap_or(self.settings.default_max_tokens),
            timeout: request.timeout.unwrap_or(self.settings.timeout),
            json_mode: request.json_mode,
        }
    }

    /// Issues one logical chat completion: cache lookup, then up to
    /// `retries + 1` provider attempts with exponential backoff and jitter.
    pub async fn call(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let provider = self.provider()?;
        let resolved = self.resolve(request);
        let retries = request.retries.unwrap_or(self.settings.retries);
        let key = fingerprint(&resolved.model, resolved.json_mode, &resolved.messages);

        if self.settings.cache_enabled {
            if let Some(mut hit) = self.cache.get(&key) {
                debug!(model = %resolved.model, json_mode = resolved.json_mode, "llm_cache_hit");
                hit.cache_hit = true;
                return Ok(hit);
            }
        }

        let policy = RetryPolicy::new(retries);
        let started = Instant::now();
        let mut last_error = String::new();
        let mut reply: Option<(String, Option<serde_json::Value>, u64)> = None;
        let mut state = RetryState::Pending;

        loop {
            match state {
                RetryState::Pending => state = policy.advance(state, false),
                RetryState::Attempting(attempt) => {
                    let outcome = attempt_once(&**provider, &resolved).await;
                    let latency_ms = started.elapsed().as_millis() as u64;

                    match outcome {
                        Ok((text, json)) => {
                            info!(
                                model = %resolved.model,
                                latency_ms,
                                attempt,
                                json_mode = resolved.json_mode,
                                "llm_call_ok"
                            );
                            reply = Some((text, json, latency_ms));
                            state = policy.advance(state, true);
                        }
                        Err(e) => {
                            warn!(
                                model = %resolved.model,
                                latency_ms,
                                attempt,
                                json_mode = resolved.json_mode,
                                error = %e,
                                "llm_call_failed"
                            );
                            last_error = e.to_string();
                            state = policy.advance(state, false);
                            if matches!(state, RetryState::Attempting(_)) {
                                tokio::time::sleep(jittered_backoff(attempt)).await;
                            }
                        }
                    }
                }
                RetryState::Succeeded(attempt) => {
                    let (text, json, latency_ms) = reply.take().ok_or_else(|| LlmError::Provider {
                        attempts: attempt + 1,
                        message: "succeeded without a recorded reply".to_string(),
                    })?;
                    let response = ChatResponse {
                        text,
                        model: resolved.model.clone(),
                        latency_ms,
                        attempt,
                        json_mode: resolved.json_mode,
                        cache_hit: false,
                        json,
                    };
                    if self.settings.cache_enabled {
                        self.cache.insert(key, response.clone());
                    }
                    return Ok(response);
                }
                RetryState::Exhausted { attempts } => {
                    return Err(LlmError::Provider {
                        attempts,
                        message: last_error,
                    });
                }
            }
        }
    }
}

async fn attempt_once(
    provider: &dyn ChatProvider,
    request: &ProviderRequest,
) -> Result<(String, Option<serde_json::Value>), AttemptError> {
    let text = tokio::time::timeout(request.timeout, provider.complete(request))
        .await
        .map_err(|_| AttemptError::Timeout(request.timeout))??;

    let json = if request.json_mode {
        Some(serde_json::from_str(strip_json_fences(&text))?)
    } else {
        None
    };
    Ok((text, json))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
