//! Format encoders
//!
//! 각 인코더는 상태가 없고 서로 독립적이다. 한 포맷의 실패가 다른 포맷에
//! 영향을 주지 않도록 호출 측(Orchestrator)에서 개별적으로 호출한다.

pub mod docx;
pub mod hwpx;
pub mod pdf;
pub mod pptx;

use crate::format::{EncodeOptions, FormatKind};
use crate::model::DocumentModel;
use bookforge_foundation::Result;

pub use docx::DocxEncoder;
pub use hwpx::HwpxEncoder;
pub use pdf::PdfEncoder;
pub use pptx::PptxEncoder;

/// DocumentModel → bytes
pub trait Encoder: Send + Sync {
    fn format(&self) -> FormatKind;

    fn encode(&self, doc: &DocumentModel, options: &EncodeOptions) -> Result<Vec<u8>>;
}

/// Encoder for a format
pub fn encoder_for(format: FormatKind) -> Box<dyn Encoder> {
    match format {
        FormatKind::Pdf => Box::new(PdfEncoder),
        FormatKind::Docx => Box::new(DocxEncoder),
        FormatKind::Pptx => Box::new(PptxEncoder),
        FormatKind::Hwpx => Box::new(HwpxEncoder),
    }
}

/// Encode with the encoder registered for `format`
pub fn encode(doc: &DocumentModel, format: FormatKind, options: &EncodeOptions) -> Result<Vec<u8>> {
    encoder_for(format).encode(doc, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_format() {
        for format in FormatKind::ALL {
            assert_eq!(encoder_for(format).format(), format);
        }
    }
}
