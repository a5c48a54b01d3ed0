//! ContentGenerator - topic + context → generated book
//!
//! ## 단계
//!
//! ```text
//! 1. 가치 분석 (JSON)      ─┐
//! 2. 목차 설계 (JSON)       ├─ 실패 시 작업 중단
//! 3. 챕터 본문 (2회/챕터)  ─┘
//! 4. 마케팅 (JSON)         ── 실패해도 부록만 생략
//! 5. 챕터 이미지 (선택)    ── 실패해도 이미지만 생략
//! ```
//!
//! 각 AI 호출은 `CallPolicy`(시도당 타임아웃 + 재시도)로 감싼다.
//! JSON 파싱 실패는 재시도하지 않고 `ContentParse`로 끝난다.

mod json;
pub mod prompts;
pub mod types;

pub use json::{extract_json, parse_reply};
pub use prompts::PageTarget;
pub use types::{
    BookOutline, FreeVsPaid, Marketing, OutlineChapter, ProblemSolved, ValueAnalysis, ValueSummary,
};

use crate::ingest::ContextBlob;
use bookforge_document::{Chapter, DocumentModel, ImageRef};
use bookforge_foundation::{BookForgeConfig, DefaultPrompts, Error, Result};
use bookforge_provider::{complete_with_policy, CallPolicy, CompletionRequest, TextService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sub-stage progress sink (task message only, step stays put)
pub type ProgressFn<'a> = dyn Fn(String) + Send + Sync + 'a;

const FRONT_CHAPTER_HEADING: &str = "이 책이 주는 가치";
const APPENDIX_HEADING: &str = "부록: 이 책에 대하여";
const PROGRESS_TITLE_CHARS: usize = 30;

// ============================================================================
// Generated book
// ============================================================================

/// One written chapter
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenChapter {
    pub outline: OutlineChapter,
    pub body: String,
    pub image: Option<ImageRef>,
}

/// Everything the AI stages produced
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBook {
    pub analysis: ValueAnalysis,
    pub outline: BookOutline,
    pub chapters: Vec<WrittenChapter>,

    /// `None` when the marketing stage failed
    pub marketing: Option<Marketing>,

    /// Cover illustration (image stage only)
    pub cover: Option<ImageRef>,
}

impl GeneratedBook {
    /// Book title, falling back to the topic
    pub fn title<'a>(&'a self, topic: &'a str) -> &'a str {
        let title = self.outline.book_title.trim();
        if title.is_empty() {
            topic.trim()
        } else {
            title
        }
    }

    /// Assemble the format-neutral document
    ///
    /// 쓸 수 있는 본문이 하나도 없으면 `ContentParse`.
    pub fn to_document(&self, topic: &str) -> Result<DocumentModel> {
        let mut builder =
            DocumentModel::builder(self.title(topic)).subtitle(self.outline.subtitle.clone());
        if let Some(cover) = &self.cover {
            builder = builder.cover(cover.clone());
        }

        if self.analysis.has_content() {
            builder = builder.chapter(value_chapter(&self.analysis));
        }

        for (i, written) in self.chapters.iter().enumerate() {
            let outline = &written.outline;
            let heading = if outline.title.trim().is_empty() {
                format!("챕터 {}", i + 1)
            } else {
                outline.title.clone()
            };

            let mut chapter = Chapter::new(heading).label(outline.phase.clone());
            if !outline.before_state.trim().is_empty() {
                chapter = chapter.paragraph(format!("읽기 전: {}", outline.before_state.trim()));
            }
            if !outline.after_state.trim().is_empty() {
                chapter = chapter.paragraph(format!("읽고 난 후: {}", outline.after_state.trim()));
            }
            chapter = chapter.body(&written.body);
            if let Some(image) = &written.image {
                chapter = chapter.image(image.clone());
            }
            builder = builder.chapter(chapter);
        }

        if let Some(marketing) = self.marketing.as_ref().filter(|m| m.has_content()) {
            builder = builder.chapter(appendix_chapter(marketing));
        }

        builder.build()
    }
}

fn push_if(paragraphs: &mut Vec<String>, prefix: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        paragraphs.push(format!("{}{}", prefix, value));
    }
}

fn value_chapter(analysis: &ValueAnalysis) -> Chapter {
    let mut paragraphs = Vec::new();
    push_if(&mut paragraphs, "[대상 독자] ", &analysis.target_reader);

    let solved = &analysis.problem_solved;
    if !(solved.time.trim().is_empty()
        && solved.money.trim().is_empty()
        && solved.emotion.trim().is_empty())
    {
        paragraphs.push("== 이 책이 해결하는 문제 ==".to_string());
        push_if(&mut paragraphs, "- 시간: ", &solved.time);
        push_if(&mut paragraphs, "- 비용: ", &solved.money);
        push_if(&mut paragraphs, "- 감정: ", &solved.emotion);
    }

    if !analysis.why_pay.trim().is_empty() {
        paragraphs.push("== 왜 이 책이어야 하는가 ==".to_string());
        paragraphs.push(analysis.why_pay.trim().to_string());
    }

    Chapter::new(FRONT_CHAPTER_HEADING).paragraphs(paragraphs)
}

fn appendix_chapter(marketing: &Marketing) -> Chapter {
    let mut chapter = Chapter::new(APPENDIX_HEADING).body(&marketing.sales_copy);

    let summary = &marketing.value_summary;
    let mut lines = Vec::new();
    push_if(&mut lines, "- 절약 시간: ", &summary.time_saved);
    push_if(&mut lines, "- 절약 비용: ", &summary.money_saved);
    push_if(&mut lines, "- 방지하는 실수: ", &summary.mistakes_prevented);
    if !lines.is_empty() {
        chapter = chapter.paragraph("== 이 책의 가치 요약 ==").paragraphs(lines);
    }
    chapter
}

// ============================================================================
// ContentGenerator
// ============================================================================

/// Drives the AI stages
#[derive(Clone)]
pub struct ContentGenerator {
    service: Arc<dyn TextService>,
    policy: CallPolicy,
    model: String,
    prompts: DefaultPrompts,
    target: PageTarget,
}

impl ContentGenerator {
    pub fn new(service: Arc<dyn TextService>, model: impl Into<String>) -> Self {
        Self {
            service,
            policy: CallPolicy::default(),
            model: model.into(),
            prompts: DefaultPrompts::default(),
            target: PageTarget::new(100, 150),
        }
    }

    /// Model, prompts, page targets and call policy from the config
    pub fn from_config(service: Arc<dyn TextService>, config: &BookForgeConfig) -> Self {
        Self {
            service,
            policy: CallPolicy::new(
                config.max_attempts,
                Duration::from_secs(config.request_timeout_secs),
            ),
            model: config.model.clone(),
            prompts: config.prompts(),
            target: PageTarget::new(config.target_pages_min, config.target_pages_max),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompts(mut self, prompts: DefaultPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    /// Run every stage
    pub async fn generate(
        &self,
        topic: &str,
        context: &ContextBlob,
        include_images: bool,
        progress: &ProgressFn<'_>,
    ) -> Result<GeneratedBook> {
        // 1. 가치 분석
        progress("주제 분석 및 유료 가치 판단 중...".to_string());
        let raw = self
            .call(
                &self.prompts.value_system,
                prompts::value_analysis(topic, context),
            )
            .await?;
        let analysis: ValueAnalysis = parse_reply("value analysis", &raw)?;
        debug!("Value analysis: {}", analysis.topic_refined);

        // 2. 목차
        progress("구매자 관점 목차 설계 중...".to_string());
        let raw = self
            .call(
                prompts::outline_system(),
                prompts::outline(topic, &analysis, self.target, &self.prompts.toc_rules, context),
            )
            .await?;
        let outline: BookOutline = parse_reply("outline", &raw)?;
        if outline.chapters.is_empty() {
            return Err(Error::ContentParse("outline has no chapters".into()));
        }
        info!(
            "Outline ready: '{}' with {} chapter(s)",
            outline.book_title,
            outline.chapters.len()
        );

        // 3. 챕터 본문
        let total = outline.chapters.len();
        let min_chars = self.target.min_chars_per_half(total);
        let mut chapters = Vec::with_capacity(total);
        for (i, chapter) in outline.chapters.iter().enumerate() {
            let short: String = chapter.title.chars().take(PROGRESS_TITLE_CHARS).collect();
            progress(format!("챕터 {}/{} 집필 중: {}...", i + 1, total, short));

            let first = self
                .call(
                    &self.prompts.chapter_system,
                    prompts::chapter_first_half(&outline, chapter, i, min_chars, context),
                )
                .await?;
            let second = self
                .call(
                    &self.prompts.chapter_system,
                    prompts::chapter_second_half(&outline, chapter, i, min_chars),
                )
                .await?;
            debug!(
                "Chapter {}/{} written ({} chars)",
                i + 1,
                total,
                first.chars().count() + second.chars().count()
            );

            chapters.push(WrittenChapter {
                outline: chapter.clone(),
                body: format!("{}\n\n{}", first.trim(), second.trim()),
                image: None,
            });
        }

        // 4. 마케팅 (선택)
        progress("자연 유통 분석 및 판매 소개문 작성 중...".to_string());
        let title = if outline.book_title.trim().is_empty() {
            topic
        } else {
            outline.book_title.as_str()
        };
        let marketing = match self
            .call(&self.prompts.marketing_system, prompts::marketing(title, &analysis))
            .await
            .and_then(|raw| parse_reply::<Marketing>("marketing", &raw))
        {
            Ok(marketing) => Some(marketing),
            Err(e) => {
                warn!("Marketing stage skipped: {}", e);
                None
            }
        };

        // 5. 이미지 (선택, 실패해도 진행)
        let mut cover = None;
        if include_images {
            progress("전자책 표지 이미지 생성 중...".to_string());
            let prompt = prompts::cover_image(title, &outline.subtitle);
            cover = self.image(title, &prompt).await;

            for (i, written) in chapters.iter_mut().enumerate() {
                progress(format!("챕터 {} 이미지 생성 중...", i + 1));
                let prompt = prompts::chapter_image(&written.outline);
                written.image = self.image(&written.outline.title, &prompt).await;
            }
        }

        Ok(GeneratedBook {
            analysis,
            outline,
            chapters,
            marketing,
            cover,
        })
    }

    async fn call(&self, instructions: &str, input: String) -> Result<String> {
        let request = CompletionRequest::new(&self.model, instructions, input);
        let text = complete_with_policy(self.service.as_ref(), &request, &self.policy).await?;
        Ok(text)
    }

    /// One image call; `alt` doubles as the caption
    async fn image(&self, alt: &str, prompt: &str) -> Option<ImageRef> {
        let call = self.service.generate_image(&self.model, prompt);
        match tokio::time::timeout(self.policy.attempt_timeout, call).await {
            Ok(Ok(Some(image))) if !image.bytes.is_empty() => {
                debug!("Image for '{}' from {}", alt, image.source);
                Some(ImageRef::new(alt.to_string(), image.bytes))
            }
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                warn!("Image for '{}' failed: {}", alt, e);
                None
            }
            Err(_) => {
                warn!("Image for '{}' timed out", alt);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookforge_provider::{ProviderError, RetryConfig, ScriptedService};
    use parking_lot::Mutex;

    const ANALYSIS: &str = r#"{"topic_refined": "부업", "why_pay": "시행착오를 줄인다",
        "problem_solved": {"time": "3개월 단축"}}"#;
    const OUTLINE: &str = r#"```json
{"book_title": "부업 가이드", "subtitle": "첫 달 수익",
 "chapters": [
   {"phase": "문제인식", "chapter_num": 1, "title": "왜 부업인가",
    "before_state": "막막함", "after_state": "확신", "sections": ["a", "b"]},
   {"phase": "실행", "chapter_num": 2, "title": "시작하기", "sections": ["c"]}
 ]}
```"#;
    const MARKETING: &str = r#"{"sales_copy": "광고 없이 팔리는 이유", "value_summary": {"time_saved": "6개월"}}"#;

    fn fast_policy() -> CallPolicy {
        CallPolicy {
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                jitter: false,
                ..Default::default()
            },
            attempt_timeout: Duration::from_secs(5),
        }
    }

    fn happy_service() -> ScriptedService {
        ScriptedService::new()
            .then_text(ANALYSIS)
            .then_text(OUTLINE)
            .then_text("도입부\n=== a ===\n본문 A")
            .then_text("=== b ===\n본문 B\n=== 핵심 요약 ===\n- 요약")
            .then_text("둘째 장 전반")
            .then_text("둘째 장 후반")
            .then_text(MARKETING)
    }

    fn generator(service: ScriptedService) -> ContentGenerator {
        ContentGenerator::new(Arc::new(service), "test-model").with_policy(fast_policy())
    }

    #[tokio::test]
    async fn test_generate_and_assemble() {
        let service = happy_service();
        let messages = Mutex::new(Vec::new());
        let book = generator(service.clone())
            .generate("부업", &ContextBlob::default(), false, &|m| messages.lock().push(m))
            .await
            .unwrap();

        assert_eq!(service.call_count(), 7);
        assert_eq!(book.chapters.len(), 2);
        assert!(book.chapters[0].body.contains("본문 A\n\n=== b ==="));
        assert!(book.marketing.is_some());

        let messages = messages.lock();
        assert_eq!(messages[0], "주제 분석 및 유료 가치 판단 중...");
        assert_eq!(messages[2], "챕터 1/2 집필 중: 왜 부업인가...");

        let doc = book.to_document("부업").unwrap();
        assert_eq!(doc.title(), "부업 가이드");
        assert_eq!(doc.subtitle(), Some("첫 달 수익"));
        let headings: Vec<&str> = doc.chapters().iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![FRONT_CHAPTER_HEADING, "왜 부업인가", "시작하기", APPENDIX_HEADING]
        );
        assert_eq!(doc.chapters()[1].label.as_deref(), Some("문제인식"));
        assert_eq!(doc.chapters()[1].paragraphs[0], "읽기 전: 막막함");
    }

    #[tokio::test]
    async fn test_marketing_failure_tolerated() {
        let service = ScriptedService::new()
            .then_text(ANALYSIS)
            .then_text(OUTLINE)
            .then_text("1a")
            .then_text("1b")
            .then_text("2a")
            .then_text("2b")
            .then_text("JSON이 아닌 응답");
        let book = generator(service)
            .generate("부업", &ContextBlob::default(), false, &|_| {})
            .await
            .unwrap();

        assert!(book.marketing.is_none());
        let doc = book.to_document("부업").unwrap();
        assert!(doc.chapters().iter().all(|c| c.heading != APPENDIX_HEADING));
    }

    #[tokio::test]
    async fn test_outline_parse_failure_not_retried() {
        let service = ScriptedService::new()
            .then_text(ANALYSIS)
            .then_text("목차를 만들 수 없습니다");
        let err = generator(service.clone())
            .generate("부업", &ContextBlob::default(), false, &|_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ContentParse(_)));
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_outline_is_content_parse() {
        let service = ScriptedService::new()
            .then_text(ANALYSIS)
            .then_text(r#"{"book_title": "빈 책", "chapters": []}"#);
        let err = generator(service)
            .generate("부업", &ContextBlob::default(), false, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ContentParse(_)));
    }

    #[tokio::test]
    async fn test_auth_failure_is_auth() {
        let service =
            ScriptedService::new().then_error(ProviderError::Authentication("expired".into()));
        let err = generator(service.clone())
            .generate("부업", &ContextBlob::default(), false, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_is_ai_service() {
        let service = ScriptedService::new()
            .then_error(ProviderError::ServerError("1".into()))
            .then_error(ProviderError::ServerError("2".into()))
            .then_error(ProviderError::ServerError("last".into()));
        let err = generator(service.clone())
            .generate("부업", &ContextBlob::default(), false, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiService(ref m) if m.contains("last")));
        assert_eq!(service.call_count(), 3);
    }

    #[tokio::test]
    async fn test_images_attached() {
        let service = happy_service().with_image(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        let book = generator(service)
            .generate("부업", &ContextBlob::default(), true, &|_| {})
            .await
            .unwrap();
        assert!(book.chapters.iter().all(|c| c.image.is_some()));
        assert_eq!(
            book.chapters[0].image.as_ref().map(|i| i.alt.as_str()),
            Some("왜 부업인가")
        );
        assert_eq!(book.cover.as_ref().map(|i| i.alt.as_str()), Some("부업 가이드"));

        let doc = book.to_document("부업").unwrap();
        assert!(doc.cover().is_some());
    }

    #[tokio::test]
    async fn test_cover_stage_reports_before_chapter_images() {
        let messages = Mutex::new(Vec::new());
        let book = generator(happy_service())
            .generate("부업", &ContextBlob::default(), true, &|m| messages.lock().push(m))
            .await
            .unwrap();
        // no image configured: every image call yields nothing, generation still completes
        assert!(book.cover.is_none());
        assert!(book.chapters.iter().all(|c| c.image.is_none()));

        let messages = messages.into_inner();
        let cover = messages.iter().position(|m| m == "전자책 표지 이미지 생성 중...").unwrap();
        let first = messages.iter().position(|m| m == "챕터 1 이미지 생성 중...").unwrap();
        assert!(cover < first);
    }

    #[test]
    fn test_whitespace_bodies_fail_assembly() {
        let book = GeneratedBook {
            analysis: ValueAnalysis::default(),
            outline: BookOutline::default(),
            chapters: vec![WrittenChapter {
                outline: OutlineChapter::new("빈 장"),
                body: "  \n\n ".into(),
                image: None,
            }],
            marketing: None,
            cover: None,
        };
        assert!(matches!(book.to_document("주제"), Err(Error::ContentParse(_))));
        assert_eq!(book.title("주제"), "주제");
    }
}
