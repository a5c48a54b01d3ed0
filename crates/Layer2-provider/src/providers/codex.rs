//! ChatGPT Codex Responses provider (SSE streaming)
//!
//! `POST /backend-api/codex/responses` with `stream: true`. The final text is
//! taken from `response.completed`, or assembled from `output_text` deltas
//! when the completed event carries no text.

use crate::{
    error::ProviderError,
    r#trait::{CompletionRequest, ImagePayload, TextService},
};
use async_trait::async_trait;
use base64::Engine as _;
use bookforge_foundation::AuthGate;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::StreamReader;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const IMAGE_INSTRUCTIONS: &str = "이미지 생성 요청을 처리해주세요.";

// ============================================================================
// Request body
// ============================================================================

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    stream: bool,
    store: bool,
    prompt_cache_key: String,
    input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    role: &'static str,
    content: &'a str,
}

impl<'a> ResponsesRequest<'a> {
    fn new(model: &'a str, instructions: &'a str, input: &'a str) -> Self {
        Self {
            model,
            instructions,
            stream: true,
            store: false,
            prompt_cache_key: uuid::Uuid::new_v4().to_string(),
            input: vec![InputMessage {
                kind: "message",
                role: "user",
                content: input,
            }],
        }
    }
}

// ============================================================================
// Stream events
// ============================================================================

/// Events of interest in the Responses SSE stream
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsesEvent {
    /// `response.completed` with the final response object
    Completed(Value),

    /// Text delta
    TextDelta(String),

    /// One output_text block finished
    TextDone(String),

    /// `error` / `response.failed`
    Failed(String),

    /// Anything else
    Other,
}

/// Parse one `data:` payload. Returns `None` for payloads that are not JSON.
pub fn parse_event(data: &str) -> Option<ResponsesEvent> {
    let event: Value = serde_json::from_str(data).ok()?;
    let kind = event.get("type").and_then(Value::as_str).unwrap_or_default();

    let parsed = match kind {
        "response.completed" => {
            let response = event.get("response").cloned().unwrap_or(event);
            ResponsesEvent::Completed(response)
        }
        "response.output_text.delta" | "output_text.delta" => ResponsesEvent::TextDelta(
            event
                .get("delta")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "response.output_text.done" => ResponsesEvent::TextDone(
            event
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "error" | "response.failed" => {
            let message = event
                .pointer("/response/error/message")
                .or_else(|| event.pointer("/error/message"))
                .or_else(|| event.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("response failed")
                .to_string();
            ResponsesEvent::Failed(message)
        }
        _ => ResponsesEvent::Other,
    };
    Some(parsed)
}

/// Extract the text of a completed response object
pub fn extract_response_text(response: &Value) -> Option<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    if let Some(items) = response.get("output").and_then(Value::as_array) {
        for item in items {
            match item.get("type").and_then(Value::as_str) {
                Some("message") => {
                    let contents = item.get("content").and_then(Value::as_array);
                    for content in contents.into_iter().flatten() {
                        if content.get("type").and_then(Value::as_str) == Some("output_text") {
                            return content
                                .get("text")
                                .and_then(Value::as_str)
                                .map(str::to_string);
                        }
                    }
                }
                Some("text") => {
                    return item.get("text").and_then(Value::as_str).map(str::to_string);
                }
                _ => {}
            }
        }
    }

    response
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Image reference found in a completed response
#[derive(Debug, Clone, PartialEq)]
enum ImageSource {
    Url(String),
    Inline(String),
}

fn extract_response_image(response: &Value) -> Option<ImageSource> {
    let items = response.get("output").and_then(Value::as_array)?;
    for item in items {
        if item.get("type").and_then(Value::as_str) == Some("image_generation_call") {
            if let Some(result) = item.get("result").and_then(Value::as_str) {
                return Some(ImageSource::Inline(result.to_string()));
            }
        }
        let contents = item.get("content").and_then(Value::as_array);
        for content in contents.into_iter().flatten() {
            if content.get("type").and_then(Value::as_str) == Some("image") {
                if let Some(url) = content
                    .get("url")
                    .or_else(|| content.get("image_url"))
                    .and_then(Value::as_str)
                {
                    return Some(ImageSource::Url(url.to_string()));
                }
            }
        }
    }
    None
}

/// Folds stream events into the final text
#[derive(Debug, Default)]
pub struct TextAccumulator {
    text: String,
}

impl TextAccumulator {
    /// Apply one event. Returns the final text once the response is complete.
    pub fn apply(&mut self, event: &ResponsesEvent) -> Option<String> {
        match event {
            ResponsesEvent::Completed(response) => extract_response_text(response)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            ResponsesEvent::TextDelta(delta) => {
                self.text.push_str(delta);
                None
            }
            ResponsesEvent::TextDone(text) => {
                if !text.is_empty() {
                    self.text = text.clone();
                }
                None
            }
            ResponsesEvent::Failed(_) | ResponsesEvent::Other => None,
        }
    }

    /// Text gathered so far (used when the stream ends without a completed text)
    pub fn finish(self) -> Result<String, ProviderError> {
        let text = self.text.trim();
        if text.is_empty() {
            Err(ProviderError::EmptyResponse)
        } else {
            Ok(text.to_string())
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Codex Responses provider
pub struct CodexProvider {
    client: Client,
    api_url: String,
    auth: Arc<dyn AuthGate>,
}

impl CodexProvider {
    pub fn new(api_url: impl Into<String>, auth: Arc<dyn AuthGate>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_url: api_url.into(),
            auth,
        }
    }

    /// Stream parsed events for one request
    fn events<'a>(
        &'a self,
        body: ResponsesRequest<'a>,
    ) -> Pin<Box<dyn Stream<Item = Result<ResponsesEvent, ProviderError>> + Send + 'a>> {
        Box::pin(async_stream::stream! {
            let credentials = match self.auth.credentials() {
                Some(c) => c,
                None => {
                    yield Err(ProviderError::Authentication("not logged in".to_string()));
                    return;
                }
            };

            let session_id = uuid::Uuid::new_v4().to_string();
            let mut request = self
                .client
                .post(&self.api_url)
                .header("Authorization", format!("Bearer {}", credentials.access_token))
                .header("Content-Type", "application/json")
                .header("Accept", "text/event-stream")
                .header("originator", "codex_cli_rs")
                .header("session_id", session_id.as_str())
                .json(&body);
            if let Some(account_id) = &credentials.account_id {
                request = request.header("chatgpt-account-id", account_id.as_str());
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_timeout() => {
                    yield Err(ProviderError::Network(format!("timeout: {}", e)));
                    return;
                }
                Err(e) => {
                    yield Err(ProviderError::Network(e.to_string()));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                yield Err(ProviderError::from_http_status(status.as_u16(), &body));
                return;
            }

            // Convert response body to async reader for SSE parsing
            let byte_stream = response.bytes_stream();
            let stream_reader = StreamReader::new(
                byte_stream.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
            );
            let mut reader = BufReader::new(stream_reader);
            let mut line_buffer = String::new();

            loop {
                line_buffer.clear();
                match reader.read_line(&mut line_buffer).await {
                    Ok(0) => break, // EOF
                    Ok(_) => {
                        let line = line_buffer.trim();

                        // Skip empty lines, comments and `event:` lines
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let data = data.trim();
                        if data == "[DONE]" {
                            break;
                        }

                        match parse_event(data) {
                            Some(event) => yield Ok(event),
                            None => tracing::debug!("Skipping non-JSON SSE payload"),
                        }
                    }
                    Err(e) => {
                        yield Err(ProviderError::StreamError(format!("Stream read error: {}", e)));
                        break;
                    }
                }
            }
        })
    }

    async fn fetch_image(&self, source: ImageSource) -> Result<ImagePayload, ProviderError> {
        match source {
            ImageSource::Inline(data) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data.trim())
                    .map_err(|e| ProviderError::InvalidResponse(format!("image base64: {}", e)))?;
                Ok(ImagePayload {
                    bytes,
                    source: "inline".to_string(),
                })
            }
            ImageSource::Url(url) => {
                let response = self
                    .client
                    .get(&url)
                    .timeout(Duration::from_secs(30))
                    .send()
                    .await
                    .map_err(|e| ProviderError::Network(e.to_string()))?;
                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    return Err(ProviderError::from_http_status(status, "image download"));
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ProviderError::Network(e.to_string()))?;
                Ok(ImagePayload {
                    bytes: bytes.to_vec(),
                    source: url,
                })
            }
        }
    }
}

#[async_trait]
impl TextService for CodexProvider {
    fn name(&self) -> &str {
        "codex"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ResponsesRequest::new(&request.model, &request.instructions, &request.input);
        let mut events = self.events(body);
        let mut accumulator = TextAccumulator::default();

        while let Some(event) = events.next().await {
            let event = event?;
            if let ResponsesEvent::Failed(message) = &event {
                return Err(ProviderError::ServerError(message.clone()));
            }
            if let Some(text) = accumulator.apply(&event) {
                return Ok(text);
            }
        }

        accumulator.finish()
    }

    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Option<ImagePayload>, ProviderError> {
        let body = ResponsesRequest::new(model, IMAGE_INSTRUCTIONS, prompt);
        let mut events = self.events(body);

        let mut source = None;
        while let Some(event) = events.next().await {
            if let ResponsesEvent::Completed(response) = event? {
                source = extract_response_image(&response);
                break;
            }
        }
        drop(events);

        match source {
            Some(source) => self.fetch_image(source).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(lines: &[&str]) -> Result<String, ProviderError> {
        let mut acc = TextAccumulator::default();
        for line in lines {
            if let Some(event) = parse_event(line) {
                if let Some(text) = acc.apply(&event) {
                    return Ok(text);
                }
            }
        }
        acc.finish()
    }

    #[test]
    fn test_completed_event_wins() {
        let completed = json!({
            "type": "response.completed",
            "response": {
                "output": [{
                    "type": "message",
                    "content": [{"type": "output_text", "text": " 최종 본문 "}]
                }]
            }
        })
        .to_string();
        let delta = json!({"type": "response.output_text.delta", "delta": "partial"}).to_string();

        assert_eq!(feed(&[&delta, &completed]).unwrap(), "최종 본문");
    }

    #[test]
    fn test_deltas_then_done_replaces() {
        let d1 = json!({"type": "output_text.delta", "delta": "안녕"}).to_string();
        let d2 = json!({"type": "output_text.delta", "delta": "하세"}).to_string();
        assert_eq!(feed(&[&d1, &d2]).unwrap(), "안녕하세");

        let done = json!({"type": "response.output_text.done", "text": "안녕하세요"}).to_string();
        assert_eq!(feed(&[&d1, &done]).unwrap(), "안녕하세요");
    }

    #[test]
    fn test_completed_without_text_falls_back_to_deltas() {
        let d1 = json!({"type": "output_text.delta", "delta": "abc"}).to_string();
        let completed = json!({"type": "response.completed", "response": {"output": []}}).to_string();
        assert_eq!(feed(&[&d1, &completed]).unwrap(), "abc");
    }

    #[test]
    fn test_garbage_and_empty_stream() {
        assert_eq!(feed(&["not json", "{"]), Err(ProviderError::EmptyResponse));
    }

    #[test]
    fn test_extract_text_variants() {
        assert_eq!(
            extract_response_text(&json!({"output_text": "direct"})).as_deref(),
            Some("direct")
        );
        assert_eq!(
            extract_response_text(&json!({"output": [{"type": "text", "text": "item"}]})).as_deref(),
            Some("item")
        );
        assert_eq!(
            extract_response_text(&json!({"text": "plain"})).as_deref(),
            Some("plain")
        );
        assert_eq!(extract_response_text(&json!({})), None);
    }

    #[test]
    fn test_extract_image_sources() {
        let inline = json!({"output": [{"type": "image_generation_call", "result": "aGk="}]});
        assert_eq!(
            extract_response_image(&inline),
            Some(ImageSource::Inline("aGk=".into()))
        );

        let url = json!({"output": [{"type": "message", "content": [{"type": "image", "image_url": "https://x/y.png"}]}]});
        assert_eq!(
            extract_response_image(&url),
            Some(ImageSource::Url("https://x/y.png".into()))
        );
    }

    #[test]
    fn test_failed_event_message() {
        let failed = json!({"type": "response.failed", "response": {"error": {"message": "overloaded"}}}).to_string();
        assert_eq!(
            parse_event(&failed),
            Some(ResponsesEvent::Failed("overloaded".into()))
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = ResponsesRequest::new("gpt-5-codex", "sys", "user text");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], json!(true));
        assert_eq!(value["store"], json!(false));
        assert_eq!(value["input"][0]["type"], json!("message"));
        assert_eq!(value["input"][0]["role"], json!("user"));
        assert_eq!(value["input"][0]["content"], json!("user text"));
    }

    #[tokio::test]
    async fn test_logged_out_is_authentication_error() {
        let provider = CodexProvider::new(
            "http://127.0.0.1:9/unused",
            Arc::new(bookforge_foundation::StaticAuth::logged_out()),
        );
        let err = provider
            .complete(&CompletionRequest::new("m", "s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }
}
