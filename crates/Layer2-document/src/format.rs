//! Output formats and encoder options

use bookforge_foundation::{Error, PdfSettings, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Pdf,
    /// Word-processor (WordprocessingML)
    Docx,
    /// Slide deck (PresentationML)
    Pptx,
    /// Hangul word-processor (OWPML)
    Hwpx,
}

impl FormatKind {
    pub const ALL: [FormatKind; 4] = [
        FormatKind::Pdf,
        FormatKind::Docx,
        FormatKind::Pptx,
        FormatKind::Hwpx,
    ];

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            FormatKind::Pdf => "pdf",
            FormatKind::Docx => "docx",
            FormatKind::Pptx => "pptx",
            FormatKind::Hwpx => "hwpx",
        }
    }

    /// Human-readable name for progress messages
    pub fn display_name(&self) -> &'static str {
        match self {
            FormatKind::Pdf => "PDF",
            FormatKind::Docx => "Word",
            FormatKind::Pptx => "PowerPoint",
            FormatKind::Hwpx => "한글(HWPX)",
        }
    }

    /// MIME type for downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatKind::Pdf => "application/pdf",
            FormatKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FormatKind::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            FormatKind::Hwpx => "application/hwp+zip",
        }
    }

    /// Parse a list of format names, defaulting to PDF when empty
    ///
    /// Duplicates are removed, order of first appearance is kept.
    pub fn parse_list<I, S>(names: I) -> Result<Vec<FormatKind>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut formats = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let kind: FormatKind = name.parse()?;
            if !formats.contains(&kind) {
                formats.push(kind);
            }
        }
        if formats.is_empty() {
            formats.push(FormatKind::Pdf);
        }
        Ok(formats)
    }
}

impl FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(FormatKind::Pdf),
            "docx" | "word" => Ok(FormatKind::Docx),
            "pptx" | "ppt" | "powerpoint" => Ok(FormatKind::Pptx),
            "hwpx" | "hwp" => Ok(FormatKind::Hwpx),
            other => Err(Error::Validation(format!("unsupported format: {}", other))),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// EncodeOptions
// ============================================================================

/// Options shared by every encoder
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Typography and page margins (PDF uses all of it, others use sizes only)
    pub pdf: PdfSettings,

    /// Timestamp written into document metadata.
    /// `None` writes a fixed epoch so output is reproducible.
    pub generated_at: Option<DateTime<Utc>>,
}

impl EncodeOptions {
    pub fn new(pdf: PdfSettings) -> Self {
        Self {
            pdf,
            generated_at: None,
        }
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Timestamp to embed
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.generated_at.unwrap_or_else(fixed_epoch)
    }
}

/// 1980-01-01T00:00:00Z, the earliest ZIP timestamp
pub fn fixed_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1980, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("PDF".parse::<FormatKind>().unwrap(), FormatKind::Pdf);
        assert_eq!(".hwpx".parse::<FormatKind>().unwrap(), FormatKind::Hwpx);
        assert!(matches!(
            "txt".parse::<FormatKind>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_parse_list_defaults_to_pdf() {
        let empty: Vec<&str> = vec![];
        assert_eq!(FormatKind::parse_list(empty).unwrap(), vec![FormatKind::Pdf]);
        assert_eq!(
            FormatKind::parse_list(["", " "]).unwrap(),
            vec![FormatKind::Pdf]
        );
        assert_eq!(
            FormatKind::parse_list(["docx", "pdf", "docx"]).unwrap(),
            vec![FormatKind::Docx, FormatKind::Pdf]
        );
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&FormatKind::Pptx).unwrap(),
            "\"pptx\""
        );
    }

    #[test]
    fn test_timestamp_fixed_when_unset() {
        let opts = EncodeOptions::default();
        assert_eq!(opts.timestamp(), fixed_epoch());
        assert_eq!(fixed_epoch().format("%Y").to_string(), "1980");
    }
}
