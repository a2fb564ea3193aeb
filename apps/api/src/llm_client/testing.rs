//! In-process provider double for gateway, extraction and pipeline tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{ChatProvider, ProviderFailure, ProviderRequest};
use super::GatewaySettings;

pub fn test_settings() -> GatewaySettings {
    GatewaySettings {
        api_key: Some("sk-test".to_string()),
        base_url: "http://127.0.0.1:9".to_string(),
        default_model: "gpt-4o-mini".to_string(),
        default_temperature: 0.2,
        default_max_tokens: 900,
        timeout: Duration::from_secs(5),
        retries: 2,
        cache_enabled: true,
        cache_ttl: Duration::from_secs(60),
    }
}

/// Replies from a fixed script, then from `otherwise` once the script runs out.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Err(message.into()));
        self
    }

    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProviderFailure::Api {
                status: 503,
                message,
            }),
            None => self.fallback.clone().ok_or(ProviderFailure::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
