//! TextService trait and common types
//!
//! 생성 파이프라인은 이 trait만 알고, 실제 엔드포인트(Codex Responses)나
//! 테스트용 스크립트 서비스는 구현체로 교체된다.

use crate::error::ProviderError;
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One text completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model ID (e.g., "gpt-5-codex")
    pub model: String,

    /// System-level instructions
    pub instructions: String,

    /// User input
    pub input: String,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: input.into(),
        }
    }
}

/// Image returned by the service
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    /// Raw encoded image bytes (PNG/JPEG)
    pub bytes: Vec<u8>,

    /// Where the image came from (URL or "inline")
    pub source: String,
}

/// External AI text service
#[async_trait]
pub trait TextService: Send + Sync {
    /// Service name for logs
    fn name(&self) -> &str;

    /// Run one completion and return the final text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Generate an illustration. Services without image support return `None`.
    async fn generate_image(
        &self,
        _model: &str,
        _prompt: &str,
    ) -> Result<Option<ImagePayload>, ProviderError> {
        Ok(None)
    }
}

/// Retry and timeout policy applied around each call
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub retry: RetryConfig,

    /// Upper bound for a single attempt (request + streamed body)
    pub attempt_timeout: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            attempt_timeout: Duration::from_secs(300),
        }
    }
}

impl CallPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            retry: RetryConfig::from_attempts(max_attempts),
            attempt_timeout,
        }
    }
}

/// Complete with per-attempt timeout and retry/backoff
pub async fn complete_with_policy(
    service: &dyn TextService,
    request: &CompletionRequest,
    policy: &CallPolicy,
) -> Result<String, ProviderError> {
    let timeout = policy.attempt_timeout;
    with_retry(&policy.retry, service.name(), || async move {
        match tokio::time::timeout(timeout, service.complete(request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(ProviderError::EmptyResponse),
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::ScriptedService;

    fn fast_policy(attempts: u32, timeout_ms: u64) -> CallPolicy {
        CallPolicy {
            retry: RetryConfig {
                max_retries: attempts - 1,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                jitter: false,
                ..Default::default()
            },
            attempt_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out_then_retries() {
        let service = ScriptedService::new()
            .then_delay(Duration::from_millis(200), "too late")
            .then_text("on time");
        let request = CompletionRequest::new("m", "sys", "hi");

        let text = complete_with_policy(&service, &request, &fast_policy(3, 50))
            .await
            .unwrap();
        assert_eq!(text, "on time");
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_is_retried() {
        let service = ScriptedService::new().then_text("   ").then_text("real");
        let request = CompletionRequest::new("m", "sys", "hi");

        let text = complete_with_policy(&service, &request, &fast_policy(3, 1000))
            .await
            .unwrap();
        assert_eq!(text, "real");
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let service = ScriptedService::new()
            .then_error(ProviderError::Network("a".into()))
            .then_error(ProviderError::ServerError("b".into()))
            .then_error(ProviderError::ServerError("last".into()));
        let request = CompletionRequest::new("m", "sys", "hi");

        let err = complete_with_policy(&service, &request, &fast_policy(3, 1000))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::ServerError("last".into()));
        assert_eq!(service.call_count(), 3);
    }
}
