//! PDF encoder
//!
//! 표지 → 목차 → 챕터 순서로 A4 페이지를 만든다. 한글 폰트는 TrueType 파일을
//! 통째로 임베드하고(Identity-H), `.ttc`는 첫 번째 face만 꺼낸다.
//! 설정 폰트와 대체 한글 폰트가 모두 없을 때만 Helvetica를 쓴다.

mod font;
mod layout;
mod writer;

use super::Encoder;
use crate::format::{EncodeOptions, FormatKind};
use crate::model::DocumentModel;
use bookforge_foundation::{Error, Result};
use font::{standalone_face, EmbeddedFont, PdfFont};
use layout::{footer, toc_page_count, Geometry, Layout, PAGE_HEIGHT, PAGE_WIDTH};
use std::fmt::Write as _;
use tracing::{debug, warn};
use writer::{num, text_string, PdfWriter};

/// PDF encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEncoder;

impl PdfEncoder {
    /// First candidate that yields an embeddable TrueType face
    fn load_font_data(options: &EncodeOptions) -> Option<Vec<u8>> {
        options
            .pdf
            .font_candidates()
            .into_iter()
            .find_map(|path| Self::read_embeddable(&path))
    }

    fn read_embeddable(path: &std::path::Path) -> Option<Vec<u8>> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to read font {}: {}", path.display(), e);
                return None;
            }
        };
        let Some(data) = standalone_face(data) else {
            debug!("Unreadable font collection {}", path.display());
            return None;
        };
        if EmbeddedFont::parse(&data, "").is_none() {
            debug!("Skipping non-TrueType font {}", path.display());
            return None;
        }
        debug!("Using font {}", path.display());
        Some(data)
    }
}

impl Encoder for PdfEncoder {
    fn format(&self) -> FormatKind {
        FormatKind::Pdf
    }

    fn encode(&self, doc: &DocumentModel, options: &EncodeOptions) -> Result<Vec<u8>> {
        let settings = &options.pdf;
        let geo = Geometry::a4(settings)
            .ok_or_else(|| Error::encoding("pdf", "page margins leave no room for text"))?;

        let font_data = Self::load_font_data(options);
        let mut font = match font_data
            .as_deref()
            .and_then(|data| EmbeddedFont::parse(data, &settings.font_name))
        {
            Some(embedded) => PdfFont::Embedded(Box::new(embedded)),
            None => {
                warn!(
                    "No embeddable TrueType font for '{}' or fallbacks, using Helvetica",
                    settings.font_name
                );
                PdfFont::Helvetica
            }
        };

        // Chapters first so the table of contents knows their page numbers
        let toc_pages = toc_page_count(settings, &geo, doc.chapters().len());
        let first_body_page = 1 + toc_pages;

        let mut body = Layout::new(&mut font, settings, &geo);
        let mut toc = Vec::with_capacity(doc.chapters().len());
        for chapter in doc.chapters() {
            let page_number = first_body_page + body.page_count() + 1;
            toc.push((chapter.label.clone(), chapter.heading.clone(), page_number));
            body.chapter(chapter);
        }
        let (body_pages, body_images) = body.finish();

        let mut front = Layout::new(&mut font, settings, &geo).image_base(body_images.len());
        front.cover(doc.title(), doc.subtitle(), doc.cover());
        front.toc(&toc);
        let (front_pages, front_images) = front.finish();
        let images: Vec<_> = body_images.into_iter().chain(front_images).collect();

        let mut pages: Vec<String> = front_pages.into_iter().chain(body_pages).collect();
        for (index, page) in pages.iter_mut().enumerate().skip(1) {
            page.push_str(&footer(&mut font, settings, index + 1));
        }

        debug!(
            "PDF layout: {} pages, {} images, embedded font: {}",
            pages.len(),
            images.len(),
            font.is_embedded()
        );

        // ---------------------------------------------------------------- objects
        let mut w = PdfWriter::new();
        let catalog = w.reserve();
        let pages_id = w.reserve();
        let resources = w.reserve();
        let info = w.reserve();

        let font_id = font.write(&mut w);

        let mut xobjects = String::new();
        for (i, image) in images.iter().enumerate() {
            let id = w.reserve();
            image.write(&mut w, id);
            let _ = write!(xobjects, "/Im{} {} ", i + 1, id.r());
        }

        let resources_body = if xobjects.is_empty() {
            format!("<< /Font << /F1 {} >> >>", font_id.r())
        } else {
            format!(
                "<< /Font << /F1 {} >> /XObject << {}>> >>",
                font_id.r(),
                xobjects
            )
        };
        w.object(resources, &resources_body);

        let media_box = format!("[0 0 {} {}]", num(PAGE_WIDTH), num(PAGE_HEIGHT));
        let mut kids = Vec::with_capacity(pages.len());
        for content in &pages {
            let page_id = w.reserve();
            let content_id = w.reserve();
            w.stream(content_id, "", content.as_bytes());
            w.object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent {} /MediaBox {} /Resources {} /Contents {} >>",
                    pages_id.r(),
                    media_box,
                    resources.r(),
                    content_id.r()
                ),
            );
            kids.push(page_id.r());
        }

        w.object(
            pages_id,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                kids.len()
            ),
        );
        w.object(
            catalog,
            &format!("<< /Type /Catalog /Pages {} >>", pages_id.r()),
        );

        let created = options.timestamp().format("D:%Y%m%d%H%M%SZ").to_string();
        w.object(
            info,
            &format!(
                "<< /Title {} /Producer (BookForge) /CreationDate ({}) /ModDate ({}) >>",
                text_string(doc.title()),
                created,
                created
            ),
        );

        Ok(w.finish(catalog, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Chapter;
    use bookforge_foundation::PdfSettings;

    fn helvetica_options() -> EncodeOptions {
        let settings = PdfSettings {
            font_name: "__missing__".to_string(),
            font_path: Some("/nonexistent/font.ttf".into()),
            font_fallback: false,
            ..Default::default()
        };
        EncodeOptions::new(settings)
    }

    fn doc() -> DocumentModel {
        DocumentModel::builder("Test Book")
            .subtitle("Sub")
            .chapter(
                Chapter::new("Intro")
                    .label("PART 1")
                    .paragraph("== Section ==")
                    .paragraph("[Tip] keep going")
                    .paragraph("- bullet"),
            )
            .chapter(Chapter::new("Next").paragraph("1. first"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_structure() {
        let bytes = PdfEncoder.encode(&doc(), &helvetica_options()).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.7"));
        assert!(text.contains("/Type /Catalog"));
        // cover + toc + 2 chapters
        assert!(text.contains("/Count 4"));
        assert!(text.contains("/CreationDate (D:19800101000000Z)"));
    }

    #[test]
    fn test_toc_points_at_chapter_pages() {
        let bytes = PdfEncoder.encode(&doc(), &helvetica_options()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        // chapter pages 3 and 4 appear in the footer and in the toc
        assert!(text.contains("(- 3 -)"));
        assert!(text.contains("(4)"));
    }

    #[test]
    fn test_deterministic() {
        let a = PdfEncoder.encode(&doc(), &helvetica_options()).unwrap();
        let b = PdfEncoder.encode(&doc(), &helvetica_options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_margins_is_encoding_error() {
        let mut options = helvetica_options();
        options.pdf.margin_top = 500.0;
        options.pdf.margin_bottom = 500.0;
        let err = PdfEncoder.encode(&doc(), &options).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_unusable_font_files_fall_through_to_helvetica() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.ttc");
        std::fs::write(&broken, b"ttcf\0\x01\0\0\0\0\0\x01").unwrap();

        let mut options = helvetica_options();
        options.pdf.font_path = Some(broken);
        assert!(PdfEncoder::load_font_data(&options).is_none());

        let bytes = PdfEncoder.encode(&doc(), &options).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica"));
    }
}
