//! 완성된 책의 내용 조회와 수정
//!
//! 수정은 저장된 `GeneratedBook`에 적용한 뒤 문서를 다시 조립한다.
//! AI는 다시 호출하지 않는다.

use crate::generator::{GeneratedBook, Marketing, ValueAnalysis};
use bookforge_document::FormatKind;
use bookforge_foundation::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Read side
// ============================================================================

/// Editable view of a completed book
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookContent {
    pub topic: String,
    pub book_title: String,
    pub subtitle: String,
    pub chapters: Vec<ChapterContent>,
    pub analysis: ValueAnalysis,
    pub marketing: Option<Marketing>,
    pub has_cover: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub phase: String,
    pub title: String,
    pub before_state: String,
    pub after_state: String,
    pub body: String,
    pub has_image: bool,
}

impl BookContent {
    pub fn from_book(topic: &str, book: &GeneratedBook) -> Self {
        Self {
            topic: topic.to_string(),
            book_title: book.outline.book_title.clone(),
            subtitle: book.outline.subtitle.clone(),
            chapters: book
                .chapters
                .iter()
                .map(|written| ChapterContent {
                    phase: written.outline.phase.clone(),
                    title: written.outline.title.clone(),
                    before_state: written.outline.before_state.clone(),
                    after_state: written.outline.after_state.clone(),
                    body: written.body.clone(),
                    has_image: written.image.is_some(),
                })
                .collect(),
            analysis: book.analysis.clone(),
            marketing: book.marketing.clone(),
            has_cover: book.cover.is_some(),
        }
    }
}

// ============================================================================
// Write side
// ============================================================================

/// Partial edit; absent fields stay as they are
///
/// `chapters`는 위치 기준으로 적용되고, 책보다 긴 부분은 무시된다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookEdit {
    pub book_title: Option<String>,
    pub subtitle: Option<String>,
    pub chapters: Vec<ChapterEdit>,

    /// Formats to re-encode; empty means PDF only
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterEdit {
    pub phase: Option<String>,
    pub title: Option<String>,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub body: Option<String>,
}

impl BookEdit {
    /// Apply to `book`; returns how many chapters changed
    pub fn apply(&self, book: &mut GeneratedBook) -> usize {
        if let Some(title) = &self.book_title {
            book.outline.book_title = title.clone();
        }
        if let Some(subtitle) = &self.subtitle {
            book.outline.subtitle = subtitle.clone();
        }

        let mut changed = 0;
        for (edit, written) in self.chapters.iter().zip(book.chapters.iter_mut()) {
            let before = (written.outline.clone(), written.body.clone());
            set(&mut written.outline.phase, &edit.phase);
            set(&mut written.outline.title, &edit.title);
            set(&mut written.outline.before_state, &edit.before_state);
            set(&mut written.outline.after_state, &edit.after_state);
            set(&mut written.body, &edit.body);
            if before != (written.outline.clone(), written.body.clone()) {
                changed += 1;
            }
        }
        changed
    }

    /// Requested formats, deduplicated in request order
    pub fn formats(&self) -> Result<Vec<FormatKind>> {
        let mut formats = Vec::new();
        for raw in self.output_formats.iter().flat_map(|v| v.split(',')) {
            if raw.trim().is_empty() {
                continue;
            }
            let format: FormatKind = raw.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            formats.push(FormatKind::Pdf);
        }
        Ok(formats)
    }
}

fn set(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}

/// Outcome of an edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub content: BookContent,

    /// Files written by this edit
    pub outputs: BTreeMap<FormatKind, PathBuf>,
    pub failed_formats: Vec<FormatKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{sample_book, SAMPLE_TOPIC};

    #[test]
    fn test_apply_by_position() {
        let mut book = sample_book();
        let original_second = book.chapters[1].clone();

        let edit = BookEdit {
            book_title: Some("새 제목".into()),
            chapters: vec![
                ChapterEdit {
                    body: Some("고친 본문".into()),
                    ..Default::default()
                },
                ChapterEdit::default(),
            ],
            ..Default::default()
        };
        assert_eq!(edit.apply(&mut book), 1);
        assert_eq!(book.outline.book_title, "새 제목");
        assert_eq!(book.chapters[0].body, "고친 본문");
        assert_eq!(book.chapters[1], original_second);
    }

    #[test]
    fn test_extra_chapter_edits_ignored() {
        let mut book = sample_book();
        let count = book.chapters.len();
        let edit = BookEdit {
            chapters: vec![
                ChapterEdit {
                    title: Some("x".into()),
                    ..Default::default()
                };
                count + 3
            ],
            ..Default::default()
        };
        assert_eq!(edit.apply(&mut book), count);
        assert_eq!(book.chapters.len(), count);
    }

    #[test]
    fn test_formats_default_and_dedup() {
        assert_eq!(BookEdit::default().formats().unwrap(), vec![FormatKind::Pdf]);

        let edit = BookEdit {
            output_formats: vec!["docx, pdf".into(), "docx".into()],
            ..Default::default()
        };
        assert_eq!(edit.formats().unwrap(), vec![FormatKind::Docx, FormatKind::Pdf]);

        let bad = BookEdit {
            output_formats: vec!["txt".into()],
            ..Default::default()
        };
        assert!(bad.formats().is_err());
    }

    #[test]
    fn test_edit_body_deserializes_camel_case() {
        let edit: BookEdit = serde_json::from_str(
            r#"{"bookTitle": "t", "chapters": [{"beforeState": "b"}, {}], "outputFormats": ["hwpx"]}"#,
        )
        .unwrap();
        assert_eq!(edit.book_title.as_deref(), Some("t"));
        assert_eq!(edit.chapters[0].before_state.as_deref(), Some("b"));
        assert_eq!(edit.chapters[1], ChapterEdit::default());
        assert_eq!(edit.formats().unwrap(), vec![FormatKind::Hwpx]);
    }

    #[test]
    fn test_content_view() {
        let content = BookContent::from_book(SAMPLE_TOPIC, &sample_book());
        assert_eq!(content.book_title, "퇴근 후 100만원 만들기");
        assert!(!content.has_cover);
        assert!(content.chapters.iter().all(|c| !c.body.is_empty()));

        let json = serde_json::to_value(&content).unwrap();
        assert!(json["chapters"][0].get("beforeState").is_some());
    }
}
