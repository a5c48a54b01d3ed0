//! Generation request

use bookforge_document::FormatKind;
use bookforge_foundation::{Error, Result};

/// One uploaded reference file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ReferenceFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Reference material attached to a request
///
/// 요청에서 만들어져 Ingestor가 한 번 소비한 뒤 버려진다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBundle {
    pub files: Vec<ReferenceFile>,
    pub links: Vec<String>,
}

impl ReferenceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, file: ReferenceFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = url.trim();
        if !url.is_empty() {
            self.links.push(url.to_string());
        }
        self
    }

    /// Split a free-form link field (newline, comma or whitespace separated)
    pub fn links_from_text(mut self, text: &str) -> Self {
        self.links.extend(
            text.split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.links.is_empty()
    }
}

/// Validated generation request
///
/// 제출 후에는 변경되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    include_images: bool,
    formats: Vec<FormatKind>,
    references: ReferenceBundle,
}

impl GenerationRequest {
    /// Build a request; fails with `Validation` on an empty topic or unknown format
    pub fn new<I, S>(
        topic: impl Into<String>,
        include_images: bool,
        formats: I,
        references: ReferenceBundle,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(Error::Validation("주제/키워드를 입력해주세요.".to_string()));
        }
        let formats = FormatKind::parse_list(formats)?;

        Ok(Self {
            topic,
            include_images,
            formats,
            references,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn include_images(&self) -> bool {
        self.include_images
    }

    /// Requested formats, deduplicated, never empty
    pub fn formats(&self) -> &[FormatKind] {
        &self.formats
    }

    pub fn references(&self) -> &ReferenceBundle {
        &self.references
    }

    /// Hand the bundle to the ingestor
    pub(crate) fn take_references(&mut self) -> ReferenceBundle {
        std::mem::take(&mut self.references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_topic_rejected() {
        let err = GenerationRequest::new("   ", false, Vec::<String>::new(), ReferenceBundle::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_formats_default_to_pdf() {
        let req =
            GenerationRequest::new("부업", false, Vec::<String>::new(), ReferenceBundle::new())
                .unwrap();
        assert_eq!(req.formats(), &[FormatKind::Pdf]);
        assert_eq!(req.topic(), "부업");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = GenerationRequest::new("x", false, ["pdf", "epub"], ReferenceBundle::new())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_links_from_text() {
        let bundle = ReferenceBundle::new()
            .links_from_text("https://a.example\nhttps://b.example, https://c.example ");
        assert_eq!(bundle.links.len(), 3);
        assert_eq!(bundle.links[2], "https://c.example");
    }
}
