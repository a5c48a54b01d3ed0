//! Prompt builders
//!
//! 시스템 프롬프트는 설정(`DefaultPrompts`)에서 오고, 여기서는 단계별
//! 사용자 입력만 조립한다.

use super::types::{BookOutline, OutlineChapter, ValueAnalysis};
use crate::ingest::ContextBlob;

/// A4 한 페이지 기준 글자 수
pub const CHARS_PER_PAGE: u32 = 550;

/// 표지, 목차 등 본문이 아닌 페이지
const NON_CONTENT_PAGES: u32 = 4;

const MIN_PAGES_PER_CHAPTER: u32 = 6;
const MIN_CHARS_PER_HALF: u32 = 3000;

const OUTLINE_SYSTEM: &str = "당신은 베스트셀러 전자책 기획 전문가입니다.
구매자 관점에서 목차를 설계합니다. 반드시 JSON 형식으로만 응답하세요.";

/// Page targets used to size chapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTarget {
    pub min: u32,
    pub max: u32,
}

impl PageTarget {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Minimum characters for each half of a chapter
    pub fn min_chars_per_half(&self, total_chapters: usize) -> u32 {
        let content_pages = ((self.min + self.max) / 2).saturating_sub(NON_CONTENT_PAGES);
        let chapters = u32::try_from(total_chapters.max(1)).unwrap_or(u32::MAX);
        let pages_per_chapter = (content_pages / chapters).max(MIN_PAGES_PER_CHAPTER);
        (pages_per_chapter * CHARS_PER_PAGE / 2).max(MIN_CHARS_PER_HALF)
    }
}

fn with_context(mut prompt: String, context: &ContextBlob) -> String {
    if !context.is_empty() {
        prompt.push_str("\n\n아래 참고 자료의 내용을 우선적으로 반영하세요.\n\n");
        prompt.push_str(&context.text);
    }
    prompt
}

fn quoted_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| items.join(", "))
}

// ============================================================================
// Stage 1
// ============================================================================

pub fn value_analysis(topic: &str, context: &ContextBlob) -> String {
    let prompt = format!(
        r#"다음 주제/키워드에 대해 분석하세요: "{topic}"

JSON 형식:
{{
  "topic_refined": "정제된 주제 (구체적이고 판매 가능한 형태로)",
  "free_vs_paid": {{
    "free_consumption_risk": "무료로 소비될 확률과 그 이유",
    "paid_conversion_points": ["유료 전환 포인트 1", "포인트 2", "포인트 3"],
    "verdict": "유료 가치 판단 결론 (1~2문장)"
  }},
  "problem_solved": {{
    "time": "독자의 시간을 얼마나 줄여주는지",
    "money": "독자의 돈을 얼마나 아껴주는지",
    "emotion": "독자의 어떤 감정적 고통을 해결하는지"
  }},
  "why_pay": "왜 돈 주고 사야 하는지 (2~3문장)",
  "target_reader": "이 책을 살 사람의 구체적 프로필 (1~2문장)"
}}"#
    );
    with_context(prompt, context)
}

// ============================================================================
// Stage 2
// ============================================================================

pub fn outline_system() -> &'static str {
    OUTLINE_SYSTEM
}

pub fn outline(
    topic: &str,
    analysis: &ValueAnalysis,
    target: PageTarget,
    toc_rules: &str,
    context: &ContextBlob,
) -> String {
    let analysis_json = serde_json::to_string(analysis).unwrap_or_default();
    let prompt = format!(
        r#"주제: "{topic}"
분석 결과: {analysis_json}

아래 JSON 형식으로 응답하세요:
{{
  "book_title": "전자책 제목 (구매 욕구를 자극하는, 30자 내외)",
  "subtitle": "부제목 (구체적 결과를 약속하는)",
  "chapters": [
    {{
      "phase": "문제인식",
      "chapter_num": 1,
      "title": "안 사면 손해라고 느끼게 하는 챕터 제목",
      "purpose": "이 챕터를 읽으면 독자가 얻는 것",
      "before_state": "읽기 전 독자 상태",
      "after_state": "읽고 난 후 독자 상태",
      "sections": ["소제목1", "소제목2", "소제목3"]
    }}
  ]
}}

목표 페이지 수: {min}~{max}페이지

{toc_rules}"#,
        min = target.min,
        max = target.max,
    );
    with_context(prompt, context)
}

// ============================================================================
// Stage 3
// ============================================================================

fn chapter_header(book_title: &str, chapter: &OutlineChapter, index: usize, total: usize) -> String {
    format!(
        "전자책: \"{book_title}\"\n현재 챕터: {current}/{total}\n챕터 제목: {title}",
        current = index + 1,
        title = chapter.title,
    )
}

/// First call: introduction plus the first half of the sections
pub fn chapter_first_half(
    outline: &BookOutline,
    chapter: &OutlineChapter,
    index: usize,
    min_chars: u32,
    context: &ContextBlob,
) -> String {
    let total = outline.chapters.len();
    let (first, _) = chapter.section_halves();
    let prompt = format!(
        r#"{header}

챕터 정보:
- 단계: {phase}
- 목적: {purpose}
- 읽기 전: {before}
- 읽고 후: {after}

지금 작성할 소제목들 (전반부): {sections}

규칙:
1. 먼저 챕터 도입부(300~500자)를 작성하세요. 독자의 현재 상태를 공감하며 시작합니다.
2. 각 소제목 시작 시 === 소제목 === 형태로 구분
3. 각 소제목 안에 실제 사례, 구체적 숫자, 비교 예시를 반드시 포함
4. 각 소제목마다 [핵심 포인트] 또는 [실전 팁] 박스를 1개 이상 넣으세요
5. 반드시 한국어로 작성
6. 최소 {min_chars}자 이상 작성"#,
        header = chapter_header(&outline.book_title, chapter, index, total),
        phase = chapter.phase,
        purpose = chapter.purpose,
        before = chapter.before_state,
        after = chapter.after_state,
        sections = quoted_list(first),
    );
    with_context(prompt, context)
}

/// Second call: remaining sections, summary and checklist
pub fn chapter_second_half(
    outline: &BookOutline,
    chapter: &OutlineChapter,
    index: usize,
    min_chars: u32,
) -> String {
    let total = outline.chapters.len();
    let (_, second) = chapter.section_halves();
    format!(
        r#"{header}

앞서 작성된 전반부 내용에 이어서 후반부를 작성합니다.

지금 작성할 소제목들 (후반부): {sections}

규칙:
1. 각 소제목 시작 시 === 소제목 === 형태로 구분
2. 각 소제목 안에 실제 사례, 구체적 숫자, 비교 예시를 반드시 포함
3. 각 소제목마다 [핵심 포인트] 또는 [실전 팁] 박스를 1개 이상 넣으세요
4. 마지막에 다음을 추가하세요:
   === 핵심 요약 ===
   이 챕터에서 배운 5가지 핵심 내용을 정리 (각 2~3문장)

   === 실행 체크리스트 ===
   독자가 바로 실행할 수 있는 5~7가지 구체적 행동 목록
5. 반드시 한국어로 작성
6. 최소 {min_chars}자 이상 작성"#,
        header = chapter_header(&outline.book_title, chapter, index, total),
        sections = quoted_list(second),
    )
}

// ============================================================================
// Stage 4 / images
// ============================================================================

pub fn marketing(book_title: &str, analysis: &ValueAnalysis) -> String {
    let analysis_json = serde_json::to_string(analysis).unwrap_or_default();
    format!(
        r#"전자책: "{book_title}"
분석: {analysis_json}

JSON 형식으로 응답:
{{
  "sales_copy": "이 전자책이 왜 광고 없이도 팔릴 수 있는지 한 문단 (논리적, 담백하게, 구조 중심)",
  "value_summary": {{
    "time_saved": "절약 시간 요약",
    "money_saved": "절약 비용 요약",
    "mistakes_prevented": "방지 실수 요약"
  }}
}}"#
    )
}

pub fn cover_image(title: &str, subtitle: &str) -> String {
    format!(
        "다음 전자책의 표지에 어울리는 이미지를 생성해주세요. 제목: \"{}\", 부제목: \"{}\". 깔끔하고 현대적인 스타일.",
        title, subtitle
    )
}

pub fn chapter_image(chapter: &OutlineChapter) -> String {
    format!(
        "다음 챕터 내용에 어울리는 간단한 일러스트를 생성해주세요. 챕터: \"{}\" - {}. 미니멀 플랫 스타일.",
        chapter.title, chapter.purpose
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_chars_per_half() {
        // (100+150)/2 - 4 = 121 pages over 12 chapters → 10 pages → 2750 → floor 3000
        assert_eq!(PageTarget::new(100, 150).min_chars_per_half(12), 3000);
        // 121 / 4 = 30 pages → 8250
        assert_eq!(PageTarget::new(100, 150).min_chars_per_half(4), 8250);
        // zero chapters counts as one
        assert_eq!(PageTarget::new(10, 10).min_chars_per_half(0), 3000);
    }

    #[test]
    fn test_max_never_below_min() {
        assert_eq!(PageTarget::new(120, 80), PageTarget { min: 120, max: 120 });
    }

    #[test]
    fn test_context_appended() {
        let context = ContextBlob {
            text: "[참고 자료: a.txt]\n메모".into(),
            ..Default::default()
        };
        let prompt = value_analysis("부업", &context);
        assert!(prompt.contains("\"부업\""));
        assert!(prompt.ends_with("[참고 자료: a.txt]\n메모"));

        let bare = value_analysis("부업", &ContextBlob::default());
        assert!(!bare.contains("참고 자료"));
    }

    #[test]
    fn test_chapter_prompts_split_sections() {
        let mut chapter = OutlineChapter::new("1장");
        chapter.sections = vec!["가".into(), "나".into(), "다".into()];
        let outline = BookOutline {
            book_title: "책".into(),
            chapters: vec![chapter.clone()],
            ..Default::default()
        };

        let first = chapter_first_half(&outline, &chapter, 0, 3000, &ContextBlob::default());
        let second = chapter_second_half(&outline, &chapter, 0, 3000);
        assert!(first.contains("[\"가\"]"));
        assert!(second.contains("[\"나\",\"다\"]"));
        assert!(second.contains("=== 실행 체크리스트 ==="));
        assert!(first.contains("현재 챕터: 1/1"));
    }
}
