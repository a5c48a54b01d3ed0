//! # bookforge-document
//!
//! Format-neutral document model and file encoders.
//!
//! ## Features
//! - `DocumentModel` builder with validation
//! - Shared paragraph markup classifier
//! - PDF (embedded TrueType), DOCX, PPTX and HWPX encoders
//! - Deterministic output: fixed timestamps and entry order
//!
//! ```text
//! DocumentModel ──► Encoder (pdf | docx | pptx | hwpx) ──► Vec<u8>
//! ```

mod container;
pub mod encoders;
pub mod format;
pub mod image;
pub mod markup;
pub mod model;
pub mod naming;
pub mod xml;

// Model
pub use model::{Chapter, DocumentBuilder, DocumentModel, ImageRef};

// Markup
pub use markup::{classify, sanitize_text, Block};

// Formats and encoders
pub use encoders::{
    encode, encoder_for, DocxEncoder, Encoder, HwpxEncoder, PdfEncoder, PptxEncoder,
};
pub use format::{fixed_epoch, EncodeOptions, FormatKind};

// Images
pub use image::{ImageInfo, ImageKind};

// Naming
pub use naming::{file_name, safe_stem, FALLBACK_STEM};
