//! Orchestrator - 작업 생성 및 파이프라인 실행
//!
//! ## 흐름
//!
//! ```text
//! submit() ── 검증 / 로그인 확인 ── TaskStore.create (Pending) ── TaskId 즉시 반환
//!                                         │
//!                                  tokio::spawn
//!                                         │
//!    step 1        step 2             step 3..N-1            step N
//!   ingest  →  generate + build  →  encode (포맷별)  →   Completed
//! ```
//!
//! - 작업 상태는 파이프라인이 가진 `TaskWriter` 하나로만 바뀐다.
//! - 포맷별 인코딩 실패는 해당 포맷만 실패로 기록한다. 전부 실패하면 작업이 `Error`.
//! - 각 작업은 `CancellationToken`을 가진다. 단계 사이와 AI 호출 중에 확인한다.

use crate::edit::{BookContent, BookEdit, EditOutcome};
use crate::generator::{ContentGenerator, GeneratedBook};
use crate::ingest::{ContextBlob, ReferenceIngestor};
use crate::request::GenerationRequest;
use crate::sample::{sample_book, SAMPLE_TOPIC};
use bookforge_document::{encode, file_name, safe_stem, DocumentModel, EncodeOptions, FormatKind};
use bookforge_foundation::{
    AuthGate, BookForgeConfig, ConfigUpdate, Error, JsonStore, Result,
};
use bookforge_provider::{CallPolicy, TextService};
use bookforge_task::{Progress, Task, TaskId, TaskStatus, TaskStore, TaskWriter};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Message recorded on a cancelled task
pub const CANCELLED_MESSAGE: &str = "cancelled";

const COMPLETED_MESSAGE: &str = "전자책 생성 완료!";

/// Steps outside the per-format encoding steps (ingest, generate, complete)
const FIXED_STEPS: u32 = 3;

// ============================================================================
// Result registry
// ============================================================================

/// What a completed task leaves behind for result queries, regeneration and edits
#[derive(Debug, Clone)]
struct StoredResult {
    topic: String,
    book: Arc<GeneratedBook>,
    document: Arc<DocumentModel>,
    stem: String,
    outputs: BTreeMap<FormatKind, PathBuf>,
    failed_formats: Vec<FormatKind>,
}

/// Result summary of a completed task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub title: String,
    pub subtitle: Option<String>,
    pub chapter_count: usize,
    pub outputs: BTreeMap<FormatKind, PathBuf>,
    pub failed_formats: Vec<FormatKind>,
}

/// Where the document comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Ai,
    Sample,
}

// ============================================================================
// Orchestrator
// ============================================================================

struct Inner {
    tasks: TaskStore,
    service: Arc<dyn TextService>,
    auth: Arc<dyn AuthGate>,
    config: RwLock<BookForgeConfig>,
    config_store: Option<JsonStore>,
    output_dir: PathBuf,
    call_policy: Option<CallPolicy>,
    results: RwLock<HashMap<TaskId, StoredResult>>,
    cancels: RwLock<HashMap<TaskId, CancellationToken>>,
}

/// Entry point for every generation request
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    service: Arc<dyn TextService>,
    auth: Arc<dyn AuthGate>,
    config: BookForgeConfig,
    config_store: Option<JsonStore>,
    output_dir: Option<PathBuf>,
    call_policy: Option<CallPolicy>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: BookForgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist config changes here; also the default output location
    pub fn config_store(mut self, store: JsonStore) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Override the retry/timeout policy derived from the config
    pub fn call_policy(mut self, policy: CallPolicy) -> Self {
        self.call_policy = Some(policy);
        self
    }

    pub fn build(self) -> Orchestrator {
        let output_dir = match (self.output_dir, &self.config_store) {
            (Some(dir), _) => dir,
            (None, Some(store)) => self.config.resolve_output_dir(store),
            (None, None) => self
                .config
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("output")),
        };

        Orchestrator {
            inner: Arc::new(Inner {
                tasks: TaskStore::new(),
                service: self.service,
                auth: self.auth,
                config: RwLock::new(self.config),
                config_store: self.config_store,
                output_dir,
                call_policy: self.call_policy,
                results: RwLock::new(HashMap::new()),
                cancels: RwLock::new(HashMap::new()),
            }),
        }
    }
}

impl Orchestrator {
    pub fn builder(service: Arc<dyn TextService>, auth: Arc<dyn AuthGate>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            service,
            auth,
            config: BookForgeConfig::default(),
            config_store: None,
            output_dir: None,
            call_policy: None,
        }
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.inner.tasks
    }

    pub fn output_dir(&self) -> &Path {
        &self.inner.output_dir
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.auth.is_logged_in()
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit a real generation request
    ///
    /// `Validation`/`Auth` 에러는 작업을 만들기 전에 바로 반환된다.
    pub fn submit(&self, request: GenerationRequest) -> Result<TaskId> {
        if !self.inner.auth.is_logged_in() {
            return Err(Error::Auth("ChatGPT login required".to_string()));
        }
        Ok(self.spawn(request, Source::Ai))
    }

    /// Submit the built-in sample book for every format (no AI, no login)
    pub fn submit_test(&self) -> Result<TaskId> {
        let formats = FormatKind::ALL.iter().map(FormatKind::extension);
        let request = GenerationRequest::new(SAMPLE_TOPIC, false, formats, Default::default())?;
        Ok(self.spawn(request, Source::Sample))
    }

    fn spawn(&self, request: GenerationRequest, source: Source) -> TaskId {
        let formats = u32::try_from(request.formats().len()).unwrap_or(u32::MAX);
        let writer = self
            .inner
            .tasks
            .create(FIXED_STEPS.saturating_add(formats), "작업 대기 중...");
        let id = writer.id();

        let token = CancellationToken::new();
        self.inner.cancels.write().insert(id, token.clone());

        info!(
            "Task {} submitted: topic='{}', formats={:?}, source={:?}",
            id.short(),
            request.topic(),
            request.formats(),
            source
        );

        let config = self.inner.config.read().clone();
        let this = self.clone();
        tokio::spawn(async move {
            this.run(writer, request, config, token, source).await;
        });
        id
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Task snapshot
    pub fn get_task(&self, id: &TaskId) -> Result<Task> {
        self.inner.tasks.snapshot(id)
    }

    /// Poller view `{status, step, totalSteps, message}`
    pub fn get_progress(&self, id: &TaskId) -> Result<Progress> {
        Ok(self.inner.tasks.snapshot(id)?.progress())
    }

    /// Summary of a completed task, including regenerated formats
    pub fn get_result(&self, id: &TaskId) -> Result<ResultView> {
        let task = self.inner.tasks.snapshot(id)?;
        if task.status != TaskStatus::Completed {
            return Err(Error::Validation(format!(
                "task {} is {}",
                id.short(),
                task.status
            )));
        }

        let results = self.inner.results.read();
        let stored = results
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("result for task {}", id)))?;
        Ok(ResultView {
            title: stored.document.title().to_string(),
            subtitle: stored.document.subtitle().map(str::to_string),
            chapter_count: stored.document.chapters().len(),
            outputs: stored.outputs.clone(),
            failed_formats: stored.failed_formats.clone(),
        })
    }

    /// Editable content of a completed task
    pub fn get_content(&self, id: &TaskId) -> Result<BookContent> {
        let results = self.inner.results.read();
        let stored = results
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("result for task {}", id)))?;
        Ok(BookContent::from_book(&stored.topic, &stored.book))
    }

    // ========================================================================
    // Edit / regenerate / cancel / cleanup
    // ========================================================================

    /// Apply an edit to the stored book and re-encode the requested formats
    ///
    /// 포맷별 실패는 `failed_formats`로 돌려준다. 전부 실패하면 저장된 결과는 그대로 두고 `Encoding`.
    pub async fn edit_and_regenerate(&self, id: &TaskId, edit: BookEdit) -> Result<EditOutcome> {
        let formats = edit.formats()?;
        let (topic, mut book, stem, previous) = {
            let results = self.inner.results.read();
            let stored = results
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("result for task {}", id)))?;
            (
                stored.topic.clone(),
                GeneratedBook::clone(&stored.book),
                stored.stem.clone(),
                stored.outputs.clone(),
            )
        };

        let changed = edit.apply(&mut book);
        let document = Arc::new(book.to_document(&topic)?);
        info!(
            "Task {} edited: {} chapter(s) changed, re-encoding {:?}",
            id.short(),
            changed,
            formats
        );

        tokio::fs::create_dir_all(&self.inner.output_dir).await?;
        let options = EncodeOptions::new(self.inner.config.read().pdf.clone()).generated_at(Utc::now());
        let mut outputs = BTreeMap::new();
        let mut failed = Vec::new();
        for format in formats {
            let target = match previous.get(&format) {
                Some(path) => Target::Overwrite(path.clone()),
                None => Target::New(self.inner.output_dir.join(file_name(&stem, format))),
            };
            match encode_and_write(Arc::clone(&document), format, options.clone(), target, *id).await {
                Ok(path) => {
                    outputs.insert(format, path);
                }
                Err(e) => {
                    warn!("Task {} edit: format {} failed: {}", id.short(), format, e);
                    failed.push(format);
                }
            }
        }

        if outputs.is_empty() {
            return Err(Error::encoding("all", "every requested format failed"));
        }

        let content = BookContent::from_book(&topic, &book);
        let mut results = self.inner.results.write();
        if let Some(stored) = results.get_mut(id) {
            stored.book = Arc::new(book);
            stored.document = document;
            for (format, path) in &outputs {
                stored.outputs.insert(*format, path.clone());
            }
            stored.failed_formats.retain(|f| !outputs.contains_key(f));
        }
        Ok(EditOutcome {
            content,
            outputs,
            failed_formats: failed,
        })
    }

    // ========================================================================

    /// Re-encode one format from a completed task's stored document
    ///
    /// 현재 설정의 PDF/문서 옵션을 사용한다. 같은 작업이 만든 파일은 덮어쓴다.
    pub async fn regenerate_format(&self, id: &TaskId, format: FormatKind) -> Result<PathBuf> {
        let (document, stem, previous) = {
            let results = self.inner.results.read();
            let stored = results
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("result for task {}", id)))?;
            (
                Arc::clone(&stored.document),
                stored.stem.clone(),
                stored.outputs.get(&format).cloned(),
            )
        };

        let options = EncodeOptions::new(self.inner.config.read().pdf.clone()).generated_at(Utc::now());
        let target = match previous {
            Some(path) => Target::Overwrite(path),
            None => Target::New(self.inner.output_dir.join(file_name(&stem, format))),
        };
        let path = encode_and_write(document, format, options, target, *id).await?;
        info!("Task {} regenerated {} → {}", id.short(), format, path.display());

        let mut results = self.inner.results.write();
        if let Some(stored) = results.get_mut(id) {
            stored.outputs.insert(format, path.clone());
            stored.failed_formats.retain(|f| *f != format);
        }
        Ok(path)
    }

    /// Trigger the task's cancellation token
    ///
    /// 이미 끝난 작업이면 `false`.
    pub fn cancel(&self, id: &TaskId) -> Result<bool> {
        if !self.inner.tasks.contains(id) {
            return Err(Error::NotFound(format!("task {}", id)));
        }
        match self.inner.cancels.read().get(id) {
            Some(token) => {
                info!("Task {} cancellation requested", id.short());
                token.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop terminal tasks (and their results) older than `age`
    pub fn cleanup_older_than(&self, age: Duration) -> Vec<TaskId> {
        let age = chrono::Duration::from_std(age).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff: DateTime<Utc> = Utc::now() - age;
        let removed = self.inner.tasks.cleanup_older_than(cutoff);

        if !removed.is_empty() {
            let mut results = self.inner.results.write();
            for id in &removed {
                results.remove(id);
            }
            info!("Cleaned up {} task(s)", removed.len());
        }
        removed
    }

    // ========================================================================
    // Config
    // ========================================================================

    pub fn config(&self) -> BookForgeConfig {
        self.inner.config.read().clone()
    }

    /// Apply a partial update; affects tasks submitted afterwards
    pub fn update_config(&self, update: ConfigUpdate) -> Result<BookForgeConfig> {
        let mut config = self.inner.config.write();
        config.merge(update);
        self.persist(&config)?;
        Ok(config.clone())
    }

    pub fn reset_prompts(&self) -> Result<BookForgeConfig> {
        let mut config = self.inner.config.write();
        config.reset_prompts();
        self.persist(&config)?;
        Ok(config.clone())
    }

    fn persist(&self, config: &BookForgeConfig) -> Result<()> {
        match &self.inner.config_store {
            Some(store) => config.save(store),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    async fn run(
        self,
        writer: TaskWriter,
        request: GenerationRequest,
        config: BookForgeConfig,
        token: CancellationToken,
        source: Source,
    ) {
        let id = writer.id();
        match self.execute(&writer, request, &config, &token, source).await {
            Ok(()) => info!("Task {} completed", id.short()),
            Err(e) => {
                let message = if matches!(e, Error::Cancelled) {
                    CANCELLED_MESSAGE
                } else {
                    e.category()
                };
                error!("Task {} failed: {}", id.short(), e);
                if let Err(e) = writer.fail(message) {
                    warn!("Task {} could not record failure: {}", id.short(), e);
                }
            }
        }
        self.inner.cancels.write().remove(&id);
    }

    async fn execute(
        &self,
        writer: &TaskWriter,
        mut request: GenerationRequest,
        config: &BookForgeConfig,
        token: &CancellationToken,
        source: Source,
    ) -> Result<()> {
        let id = writer.id();
        let topic = request.topic().to_string();

        // 1. 참고 자료
        writer.start("참고 자료 분석 중...")?;
        let bundle = request.take_references();
        let context = if bundle.is_empty() {
            ContextBlob::default()
        } else {
            let ingestor = ReferenceIngestor::new(config.context_char_budget);
            tokio::task::spawn_blocking(move || ingestor.ingest(bundle))
                .await
                .map_err(|e| Error::Internal(format!("ingest worker: {}", e)))?
        };
        debug!(
            "Task {} context: {} chars from {:?}",
            id.short(),
            context.char_count(),
            context.sources
        );
        check_cancelled(token)?;

        // 2. 콘텐츠 생성 + 문서 조립
        writer.advance(2, "콘텐츠 생성 중...")?;
        let book = match source {
            Source::Sample => sample_book(),
            Source::Ai => {
                self.generate(writer, config, &topic, &context, request.include_images(), token)
                    .await?
            }
        };
        let document = Arc::new(book.to_document(&topic)?);
        let book = Arc::new(book);
        info!(
            "Task {} document ready: '{}' ({} chapters)",
            id.short(),
            document.title(),
            document.chapters().len()
        );
        check_cancelled(token)?;

        // 3..N-1. 포맷별 인코딩
        tokio::fs::create_dir_all(&self.inner.output_dir).await?;
        let options = EncodeOptions::new(config.pdf.clone()).generated_at(Utc::now());
        let mut stem = self.choose_stem(document.title(), request.formats(), id);
        let mut outputs = BTreeMap::new();
        let mut failed = Vec::new();

        for (i, &format) in request.formats().iter().enumerate() {
            check_cancelled(token)?;
            let step = FIXED_STEPS + u32::try_from(i).unwrap_or(u32::MAX);
            writer.advance(step, format!("{} 파일 생성 중...", format.display_name()))?;

            let path = self.inner.output_dir.join(file_name(&stem, format));
            let result = encode_and_write(
                Arc::clone(&document),
                format,
                options.clone(),
                Target::New(path),
                id,
            )
            .await;

            match result {
                Ok(path) => {
                    debug!("Task {} wrote {}", id.short(), path.display());
                    // 경합으로 접미사가 붙었으면 나머지 포맷도 같은 이름을 쓴다
                    if let Some(actual) = path.file_stem().and_then(|s| s.to_str()) {
                        stem = actual.to_string();
                    }
                    outputs.insert(format, path);
                }
                Err(e) => {
                    warn!("Task {} format {} failed: {}", id.short(), format, e);
                    failed.push(format);
                }
            }
        }

        if outputs.is_empty() {
            return Err(Error::encoding("all", "every requested format failed"));
        }

        self.inner.results.write().insert(
            id,
            StoredResult {
                topic,
                book,
                document,
                stem,
                outputs: outputs.clone(),
                failed_formats: failed.clone(),
            },
        );
        writer.complete(outputs, failed, COMPLETED_MESSAGE)?;
        Ok(())
    }

    async fn generate(
        &self,
        writer: &TaskWriter,
        config: &BookForgeConfig,
        topic: &str,
        context: &ContextBlob,
        include_images: bool,
        token: &CancellationToken,
    ) -> Result<GeneratedBook> {
        let mut generator = ContentGenerator::from_config(Arc::clone(&self.inner.service), config);
        if let Some(policy) = &self.inner.call_policy {
            generator = generator.with_policy(policy.clone());
        }

        let progress = |message: String| {
            if let Err(e) = writer.message(message) {
                debug!("Progress update dropped: {}", e);
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            book = generator.generate(topic, context, include_images, &progress) => book,
        }
    }

    /// Title stem, suffixed with the short task id when any target already exists
    fn choose_stem(&self, title: &str, formats: &[FormatKind], id: TaskId) -> String {
        let stem = safe_stem(title);
        let taken = formats
            .iter()
            .any(|f| self.inner.output_dir.join(file_name(&stem, *f)).exists());
        if taken {
            let suffixed = format!("{}-{}", stem, id.short());
            debug!("Output name '{}' taken, using '{}'", stem, suffixed);
            suffixed
        } else {
            stem
        }
    }
}

fn check_cancelled(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

// ============================================================================
// Encode + write
// ============================================================================

enum Target {
    /// Never replace an existing file; fall back to `<stem>-<id>.<ext>`
    New(PathBuf),
    /// The task's own earlier output
    Overwrite(PathBuf),
}

async fn encode_and_write(
    document: Arc<DocumentModel>,
    format: FormatKind,
    options: EncodeOptions,
    target: Target,
    id: TaskId,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        let bytes = encode(&document, format, &options)?;
        match target {
            Target::Overwrite(path) => {
                std::fs::write(&path, &bytes)?;
                Ok(path)
            }
            Target::New(path) => match write_new(&path, &bytes) {
                Err(Error::Io(e)) if e.kind() == ErrorKind::AlreadyExists => {
                    let fallback = suffixed_path(&path, id);
                    write_new(&fallback, &bytes)?;
                    Ok(fallback)
                }
                other => other.map(|()| path),
            },
        }
    })
    .await
    .map_err(|e| Error::encoding(format.extension(), format!("encoder worker: {}", e)))?
}

fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

fn suffixed_path(path: &Path, id: TaskId) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
    let suffix = format!("-{}", id.short());
    let name = if stem.ends_with(&suffix) {
        // 이미 접미사가 붙은 이름이면 전체 id로
        format!("{}-{}.{}", stem, id, ext)
    } else {
        format!("{}{}.{}", stem, suffix, ext)
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_path() {
        let id = TaskId::new();
        let path = suffixed_path(Path::new("/out/책.pdf"), id);
        assert_eq!(
            path,
            PathBuf::from(format!("/out/책-{}.pdf", id.short()))
        );

        let again = suffixed_path(&path, id);
        assert_eq!(again, PathBuf::from(format!("/out/책-{}-{}.pdf", id.short(), id)));
    }

    #[test]
    fn test_write_new_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        write_new(&path, b"first").unwrap();

        let err = write_new(&path, b"second").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == ErrorKind::AlreadyExists));
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }
}
