//! Provider-specific error types
//!
//! ProviderError는 AI 서비스 호출 관련 세부 에러를 관리합니다.
//! bookforge_foundation::Error와의 변환을 지원합니다.

use crate::retry::{RetryClassification, RetryableError};
use bookforge_foundation::Error as FoundationError;
use thiserror::Error;

/// Errors that can occur while calling the AI text service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Token missing, expired or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded{}", .retry_after_ms.map(|ms| format!(", retry after {}ms", ms)).unwrap_or_default())]
    RateLimited { retry_after_ms: Option<u64> },

    /// Server error (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network error (connection failed, DNS, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Attempt exceeded its time budget
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Prompt rejected (bad parameters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response could not be read as the expected event stream
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Stream finished without any text
    #[error("Response contained no text")]
    EmptyResponse,

    /// Streaming error
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Provider not configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RetryableError for ProviderError {
    fn classify(&self) -> RetryClassification {
        match self {
            // Rate limited - definitely retry
            ProviderError::RateLimited { retry_after_ms } => RetryClassification::RateLimited {
                retry_after_ms: *retry_after_ms,
            },

            // Transient failures - retry
            ProviderError::ServerError(_)
            | ProviderError::Network(_)
            | ProviderError::Timeout(_)
            | ProviderError::StreamError(_)
            | ProviderError::EmptyResponse => RetryClassification::Retry,

            // Everything else - don't retry
            ProviderError::Authentication(_)
            | ProviderError::InvalidRequest(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::NotConfigured(_)
            | ProviderError::Unknown(_) => RetryClassification::NoRetry,
        }
    }
}

impl ProviderError {
    /// Create from HTTP status code and body
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let body = truncate_body(body);
        match status {
            401 | 403 => ProviderError::Authentication(body),
            429 => {
                let retry_after = extract_retry_after(&body);
                ProviderError::RateLimited {
                    retry_after_ms: retry_after,
                }
            }
            400 | 404 | 413 | 422 => ProviderError::InvalidRequest(body),
            408 => ProviderError::Network(format!("HTTP 408: {}", body)),
            500..=599 => ProviderError::ServerError(format!("HTTP {}: {}", status, body)),
            _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
        }
    }
}

/// Keep error bodies short enough for logs
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 500;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        let mut cut: String = body.chars().take(MAX_CHARS).collect();
        cut.push('…');
        cut
    }
}

/// Try to extract retry-after value from error body (in milliseconds)
fn extract_retry_after(body: &str) -> Option<u64> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(secs) = json
            .get("error")
            .and_then(|e| e.get("retry_after").or_else(|| e.get("resets_in_seconds")))
            .and_then(|v| v.as_f64())
        {
            return Some((secs * 1000.0) as u64);
        }
    }

    if let Some(idx) = body.find("retry") {
        let after = &body[idx..];
        let num_str: String = after
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if let Ok(secs) = num_str.parse::<f64>() {
            return Some((secs * 1000.0) as u64);
        }
    }

    None
}

// ============================================================================
// bookforge_foundation::Error 변환
// ============================================================================

impl From<ProviderError> for FoundationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication(msg) => FoundationError::Auth(msg),
            ProviderError::NotConfigured(msg) => FoundationError::Auth(msg),
            other => FoundationError::AiService(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ProviderError::from_http_status(401, "nope"),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(400, "bad prompt"),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(503, "busy"),
            ProviderError::ServerError(_)
        ));
        assert_eq!(
            ProviderError::from_http_status(429, r#"{"error":{"retry_after":1.5}}"#),
            ProviderError::RateLimited {
                retry_after_ms: Some(1500)
            }
        );
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            ProviderError::Timeout(300).classify(),
            RetryClassification::Retry
        );
        assert_eq!(
            ProviderError::Network("reset".into()).classify(),
            RetryClassification::Retry
        );
        assert_eq!(
            ProviderError::Authentication("expired".into()).classify(),
            RetryClassification::NoRetry
        );
        assert_eq!(
            ProviderError::InvalidRequest("rejected".into()).classify(),
            RetryClassification::NoRetry
        );
    }

    #[test]
    fn test_foundation_conversion() {
        let auth: FoundationError = ProviderError::Authentication("401".into()).into();
        assert!(matches!(auth, FoundationError::Auth(_)));

        let svc: FoundationError = ProviderError::ServerError("500".into()).into();
        assert!(matches!(svc, FoundationError::AiService(msg) if msg.contains("500")));
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(2000);
        match ProviderError::from_http_status(500, &body) {
            ProviderError::ServerError(msg) => assert!(msg.chars().count() < 600),
            other => panic!("unexpected {:?}", other),
        }
    }
}
