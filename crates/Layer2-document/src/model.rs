//! DocumentModel - 포맷 중립 문서 표현
//!
//! 모든 인코더의 공통 입력. `DocumentBuilder::build()`만 모델을 만들 수 있고,
//! 빌드 시점에 "본문이 있는 챕터가 최소 1개" 불변식을 검사한다.

use bookforge_foundation::{Error, Result};

/// Image attached to a chapter or the cover
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Caption / alt text
    pub alt: String,

    /// Encoded bytes (PNG or JPEG)
    pub data: Vec<u8>,
}

impl ImageRef {
    pub fn new(alt: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            alt: alt.into(),
            data,
        }
    }
}

/// One chapter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chapter {
    pub heading: String,

    /// Small label shown above the heading (e.g. "PART 1")
    pub label: Option<String>,

    /// Paragraph strings, possibly carrying markup (see [`crate::markup`])
    pub paragraphs: Vec<String>,

    pub images: Vec<ImageRef>,
}

impl Chapter {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = if label.trim().is_empty() {
            None
        } else {
            Some(label)
        };
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn paragraphs<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paragraphs.extend(items.into_iter().map(Into::into));
        self
    }

    /// Split a body into one paragraph per non-empty line
    pub fn body(self, text: &str) -> Self {
        self.paragraphs(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    pub fn image(mut self, image: ImageRef) -> Self {
        self.images.push(image);
        self
    }

    fn has_content(&self) -> bool {
        self.paragraphs.iter().any(|p| !p.trim().is_empty())
    }
}

/// Validated document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    title: String,
    subtitle: Option<String>,
    cover: Option<ImageRef>,
    chapters: Vec<Chapter>,
}

impl DocumentModel {
    pub fn builder(title: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(title)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Cover illustration, if one was generated
    pub fn cover(&self) -> Option<&ImageRef> {
        self.cover.as_ref()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Total characters of paragraph text
    pub fn char_count(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| c.paragraphs.iter())
            .map(|p| p.chars().count())
            .sum()
    }
}

/// Builder for [`DocumentModel`]
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    title: String,
    subtitle: Option<String>,
    cover: Option<ImageRef>,
    chapters: Vec<Chapter>,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        let subtitle = subtitle.into();
        if !subtitle.trim().is_empty() {
            self.subtitle = Some(subtitle.trim().to_string());
        }
        self
    }

    /// Empty image data is ignored
    pub fn cover(mut self, image: ImageRef) -> Self {
        if !image.data.is_empty() {
            self.cover = Some(image);
        }
        self
    }

    pub fn chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    pub fn chapters(mut self, chapters: impl IntoIterator<Item = Chapter>) -> Self {
        self.chapters.extend(chapters);
        self
    }

    /// Validate and build
    ///
    /// Blank paragraphs are dropped. Fails with `ContentParse` when the title
    /// is empty or no chapter carries any text.
    pub fn build(self) -> Result<DocumentModel> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::ContentParse("document title is empty".into()));
        }

        let chapters: Vec<Chapter> = self
            .chapters
            .into_iter()
            .map(|mut chapter| {
                chapter.heading = chapter.heading.trim().to_string();
                chapter.paragraphs.retain(|p| !p.trim().is_empty());
                chapter
            })
            .filter(|c| !c.heading.is_empty() || c.has_content())
            .collect();

        if chapters.is_empty() {
            return Err(Error::ContentParse("document has no chapters".into()));
        }
        if !chapters.iter().any(Chapter::has_content) {
            return Err(Error::ContentParse(
                "document has no chapter with body text".into(),
            ));
        }

        Ok(DocumentModel {
            title,
            subtitle: self.subtitle,
            cover: self.cover,
            chapters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_valid() {
        let doc = DocumentModel::builder(" 제목 ")
            .subtitle("부제")
            .chapter(Chapter::new("1장").label("PART 1").body("첫 줄\n\n  둘째 줄 "))
            .build()
            .unwrap();

        assert_eq!(doc.title(), "제목");
        assert_eq!(doc.subtitle(), Some("부제"));
        assert_eq!(doc.chapters()[0].paragraphs, vec!["첫 줄", "둘째 줄"]);
        assert_eq!(doc.chapters()[0].label.as_deref(), Some("PART 1"));
    }

    #[test]
    fn test_cover_image() {
        let doc = DocumentModel::builder("t")
            .cover(ImageRef::new("표지", vec![0xFF, 0xD8]))
            .chapter(Chapter::new("h").paragraph("x"))
            .build()
            .unwrap();
        assert_eq!(doc.cover().map(|c| c.alt.as_str()), Some("표지"));

        let doc = DocumentModel::builder("t")
            .cover(ImageRef::new("빈 표지", Vec::new()))
            .chapter(Chapter::new("h").paragraph("x"))
            .build()
            .unwrap();
        assert!(doc.cover().is_none());
    }

    #[test]
    fn test_zero_chapters_rejected() {
        let err = DocumentModel::builder("t").build().unwrap_err();
        assert!(matches!(err, Error::ContentParse(_)));
    }

    #[test]
    fn test_only_blank_paragraphs_rejected() {
        let err = DocumentModel::builder("t")
            .chapter(Chapter::new("h").paragraph("   ").paragraph(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ContentParse(_)));
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = DocumentModel::builder("  ")
            .chapter(Chapter::new("h").paragraph("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ContentParse(_)));
    }

    #[test]
    fn test_empty_chapter_dropped_when_others_have_text() {
        let doc = DocumentModel::builder("t")
            .chapter(Chapter::new(""))
            .chapter(Chapter::new("h").paragraph("body"))
            .build()
            .unwrap();
        assert_eq!(doc.chapters().len(), 1);
        assert_eq!(doc.char_count(), 4);
    }
}
