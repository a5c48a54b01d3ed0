//! HTTP adapter
//!
//! 모든 응답은 `{success, ...}` JSON. 실패 시 `error`에는 분류 메시지만 담는다.
//! 진행 상황은 polling(`/api/progress/{id}`)으로만 제공한다.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use bookforge_document::FormatKind;
use bookforge_engine::{BookEdit, GenerationRequest, Orchestrator, ReferenceBundle, ReferenceFile};
use bookforge_foundation::{ConfigUpdate, Error, TokenStore};
use bookforge_task::TaskId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Upload limit for reference files
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Orchestrator,
    tokens: TokenStore,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, tokens: TokenStore) -> Self {
        Self {
            orchestrator,
            tokens,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/generate/upload", post(generate_upload))
        .route("/api/test_generate", post(test_generate))
        .route("/api/progress/{task_id}", get(progress))
        .route("/api/result/{task_id}", get(result))
        .route("/api/regenerate_format/{task_id}", post(regenerate_format))
        .route("/api/edit/{task_id}", get(edit_content).post(edit_book))
        .route("/api/config", get(get_config).post(update_config))
        .route("/api/config/reset_prompts", post(reset_prompts))
        .route("/api/auth/status", get(auth_status))
        .route("/api/download/{filename}", get(download))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// ============================================================================
// Error response
// ============================================================================

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "success": false, "error": error_message(&self.0) })))
            .into_response()
    }
}

/// Validation 메시지는 사용자 입력에 대한 안내이므로 그대로, 나머지는 분류만
fn error_message(error: &Error) -> String {
    match error {
        Error::Validation(message) => message.clone(),
        other => other.category().to_string(),
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>().map_err(ApiError::from)
}

/// 본문이 깨진 JSON이면 axum 기본 응답 대신 `{success:false, error}`
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError(Error::Validation(format!(
            "잘못된 요청 형식입니다: {}",
            rejection.body_text()
        )))),
    }
}

// ============================================================================
// Submission
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateBody {
    topic: String,
    include_images: bool,
    output_formats: Vec<String>,
    ref_links: String,
    ref_files: Vec<RefFileBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefFileBody {
    filename: String,
    content_base64: String,
}

impl GenerateBody {
    fn into_request(self) -> Result<GenerationRequest, Error> {
        let mut references = ReferenceBundle::new().links_from_text(&self.ref_links);
        for file in self.ref_files {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(file.content_base64.trim())
                .map_err(|_| {
                    Error::Validation(format!("참고 파일을 읽을 수 없습니다: {}", file.filename))
                })?;
            references = references.file(ReferenceFile::new(file.filename, bytes));
        }
        GenerationRequest::new(
            self.topic,
            self.include_images,
            split_formats(&self.output_formats),
            references,
        )
    }
}

/// Accept both repeated values and comma-separated lists
fn split_formats(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

fn submitted(id: TaskId) -> Json<Value> {
    Json(json!({ "success": true, "taskId": id.to_string() }))
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> ApiResult {
    let request = json_body(payload)?.into_request()?;
    let id = state.orchestrator.submit(request)?;
    Ok(submitted(id))
}

async fn generate_upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult {
    let mut body = GenerateBody::default();
    let mut references = ReferenceBundle::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("잘못된 업로드 요청입니다: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "refFiles" => {
                let filename = field.file_name().unwrap_or("reference").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("참고 파일 업로드 실패: {}", e)))?;
                if !bytes.is_empty() {
                    references = references.file(ReferenceFile::new(filename, bytes.to_vec()));
                }
            }
            "topic" | "includeImages" | "outputFormats" | "refLinks" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::Validation(format!("잘못된 입력 값입니다: {}", e)))?;
                match name.as_str() {
                    "topic" => body.topic = text,
                    "includeImages" => body.include_images = is_truthy(&text),
                    "outputFormats" => body.output_formats.push(text),
                    _ => body.ref_links = text,
                }
            }
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    references = references.links_from_text(&body.ref_links);
    let request = GenerationRequest::new(
        body.topic,
        body.include_images,
        split_formats(&body.output_formats),
        references,
    )?;
    let id = state.orchestrator.submit(request)?;
    Ok(submitted(id))
}

async fn test_generate(State(state): State<AppState>) -> ApiResult {
    let id = state.orchestrator.submit_test()?;
    Ok(submitted(id))
}

// ============================================================================
// Progress / result
// ============================================================================

async fn progress(State(state): State<AppState>, Path(task_id): Path<String>) -> ApiResult {
    let id = parse_task_id(&task_id)?;
    let progress = state.orchestrator.get_progress(&id)?;
    Ok(Json(json!({ "success": true, "data": progress })))
}

fn file_names(outputs: &BTreeMap<FormatKind, std::path::PathBuf>) -> BTreeMap<FormatKind, String> {
    outputs
        .iter()
        .filter_map(|(format, path)| {
            let name = path.file_name()?.to_str()?.to_string();
            Some((*format, name))
        })
        .collect()
}

async fn result(State(state): State<AppState>, Path(task_id): Path<String>) -> ApiResult {
    let id = parse_task_id(&task_id)?;
    let view = state.orchestrator.get_result(&id)?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "title": view.title,
            "subtitle": view.subtitle,
            "chapterCount": view.chapter_count,
            "files": file_names(&view.outputs),
            "failedFormats": view.failed_formats,
        }
    })))
}

#[derive(Debug, Deserialize)]
struct RegenerateBody {
    format: String,
}

async fn regenerate_format(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: Result<Json<RegenerateBody>, JsonRejection>,
) -> ApiResult {
    let id = parse_task_id(&task_id)?;
    let format: FormatKind = json_body(payload)?.format.parse()?;
    let path = state.orchestrator.regenerate_format(&id, format).await?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(Json(json!({ "success": true, "format": format, "filename": filename })))
}

// ============================================================================
// Edit
// ============================================================================

async fn edit_content(State(state): State<AppState>, Path(task_id): Path<String>) -> ApiResult {
    let id = parse_task_id(&task_id)?;
    let content = state.orchestrator.get_content(&id)?;
    Ok(Json(json!({ "success": true, "data": content })))
}

async fn edit_book(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: Result<Json<BookEdit>, JsonRejection>,
) -> ApiResult {
    let id = parse_task_id(&task_id)?;
    let edit = json_body(payload)?;
    let outcome = state.orchestrator.edit_and_regenerate(&id, edit).await?;
    Ok(Json(json!({
        "success": true,
        "data": outcome.content,
        "files": file_names(&outcome.outputs),
        "failedFormats": outcome.failed_formats,
    })))
}

// ============================================================================
// Config / auth
// ============================================================================

async fn get_config(State(state): State<AppState>) -> ApiResult {
    Ok(Json(json!({ "success": true, "config": state.orchestrator.config() })))
}

async fn update_config(
    State(state): State<AppState>,
    payload: Result<Json<ConfigUpdate>, JsonRejection>,
) -> ApiResult {
    let config = state.orchestrator.update_config(json_body(payload)?)?;
    Ok(Json(json!({ "success": true, "config": config })))
}

async fn reset_prompts(State(state): State<AppState>) -> ApiResult {
    let config = state.orchestrator.reset_prompts()?;
    Ok(Json(json!({ "success": true, "config": config })))
}

async fn auth_status(State(state): State<AppState>) -> ApiResult {
    Ok(Json(json!({ "success": true, "data": state.tokens.status() })))
}

// ============================================================================
// Download
// ============================================================================

/// Plain file name only (no separators, no parent references)
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.starts_with('.')
}

/// RFC 5987 `filename*` value
fn encode_rfc5987(name: &str) -> String {
    let mut out = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !is_safe_file_name(&filename) {
        return Err(Error::Validation("잘못된 파일 이름입니다.".to_string()).into());
    }

    let path = state.orchestrator.output_dir().join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(filename).into());
        }
        Err(e) => return Err(Error::Io(e).into()),
    };

    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse::<FormatKind>().ok())
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");
    let disposition = format!("attachment; filename*=UTF-8''{}", encode_rfc5987(&filename));

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(bytes),
    )
        .into_response())
}
