//! Scripted text service
//!
//! 네트워크 없이 파이프라인을 돌리기 위한 구현체.
//! 큐에 쌓인 응답을 순서대로 돌려주고, 큐가 비면 responder로 넘어간다.

use crate::{
    error::ProviderError,
    r#trait::{CompletionRequest, ImagePayload, TextService},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync;

#[derive(Debug, Clone)]
enum Step {
    Text(String),
    Error(ProviderError),
    Delay(Duration, String),
}

/// Service that replays a fixed script
#[derive(Clone, Default)]
pub struct ScriptedService {
    steps: Arc<Mutex<VecDeque<Step>>>,
    responder: Option<Arc<Responder>>,
    image: Option<Vec<u8>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.steps.lock().push_back(Step::Text(text.into()));
        self
    }

    pub fn then_error(self, error: ProviderError) -> Self {
        self.steps.lock().push_back(Step::Error(error));
        self
    }

    /// Answer only after `delay` (for timeout tests)
    pub fn then_delay(self, delay: Duration, text: impl Into<String>) -> Self {
        self.steps.lock().push_back(Step::Delay(delay, text.into()));
        self
    }

    /// Fallback used once the queued steps run out
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Bytes returned by `generate_image`
    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TextService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().push(request.clone());

        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Text(text)) => Ok(text),
            Some(Step::Error(error)) => Err(error),
            Some(Step::Delay(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => match &self.responder {
                Some(responder) => responder(request),
                None => Err(ProviderError::Unknown("script exhausted".to_string())),
            },
        }
    }

    async fn generate_image(
        &self,
        _model: &str,
        _prompt: &str,
    ) -> Result<Option<ImagePayload>, ProviderError> {
        Ok(self.image.clone().map(|bytes| ImagePayload {
            bytes,
            source: "scripted".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_responder() {
        let service = ScriptedService::new()
            .then_text("first")
            .with_responder(|req| Ok(format!("echo {}", req.input)));
        let req = CompletionRequest::new("m", "s", "two");

        assert_eq!(service.complete(&req).await.unwrap(), "first");
        assert_eq!(service.complete(&req).await.unwrap(), "echo two");
        assert_eq!(service.call_count(), 2);
        assert_eq!(service.requests()[1].input, "two");
    }

    #[tokio::test]
    async fn test_exhausted_without_responder() {
        let service = ScriptedService::new();
        let req = CompletionRequest::new("m", "s", "x");
        assert!(service.complete(&req).await.is_err());
        assert!(service.generate_image("m", "p").await.unwrap().is_none());
    }
}
