//! # bookforge-engine
//!
//! Generation pipeline for BookForge.
//!
//! ## Components
//! - `ReferenceIngestor`: 참고 파일/링크 → 길이 제한된 컨텍스트
//! - `ContentGenerator`: 가치 분석 → 목차 → 챕터 본문 → 마케팅 (AI 호출)
//! - `Orchestrator`: 작업 생성, 비동기 파이프라인 실행, 결과 보관
//! - `BookEdit`: 완성된 책 수정 후 재인코딩 (AI 호출 없음)
//!
//! ## Example
//!
//! ```ignore
//! let orchestrator = Orchestrator::builder(service, auth)
//!     .config(config)
//!     .output_dir("/tmp/books")
//!     .build();
//!
//! let request = GenerationRequest::new("퇴근 후 부업", false, ["pdf", "docx"], ReferenceBundle::new())?;
//! let id = orchestrator.submit(request)?;
//!
//! // poll
//! let progress = orchestrator.get_progress(&id)?;
//! ```

pub mod edit;
pub mod generator;
pub mod ingest;
pub mod orchestrator;
pub mod request;
pub mod sample;

pub use edit::{BookContent, BookEdit, ChapterContent, ChapterEdit, EditOutcome};
pub use generator::{ContentGenerator, GeneratedBook, PageTarget, WrittenChapter};
pub use ingest::{ContextBlob, ReferenceIngestor, DEFAULT_CONTEXT_BUDGET};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, ResultView, CANCELLED_MESSAGE};
pub use request::{GenerationRequest, ReferenceBundle, ReferenceFile};
pub use sample::{sample_book, SAMPLE_TOPIC};
