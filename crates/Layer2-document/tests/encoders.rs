//! Container structure and determinism across all encoders

use bookforge_document::{
    encode, file_name, safe_stem, Chapter, DocumentModel, EncodeOptions, FormatKind, ImageRef,
};
use bookforge_foundation::PdfSettings;
use chrono::{TimeZone, Utc};
use std::io::Cursor;

fn options() -> EncodeOptions {
    EncodeOptions::new(PdfSettings {
        font_name: "__missing__".to_string(),
        font_path: Some("/nonexistent/font.ttf".into()),
        font_fallback: false,
        ..Default::default()
    })
}

fn sample() -> DocumentModel {
    DocumentModel::builder("퇴근 후 100만원 만들기")
        .subtitle("직장인을 위한 부업 가이드")
        .chapter(
            Chapter::new("왜 지금 시작해야 하는가")
                .label("준비")
                .body("== 시작하기 ==\n[핵심 포인트] 작은 실행이 중요하다\n- 하루 30분\n1. 목표 정하기\n평범한 문단"),
        )
        .chapter(
            Chapter::new("첫 수익 만들기")
                .label("실행")
                .paragraph("== 실행 체크리스트 ==")
                .paragraph("- 계좌 개설")
                .image(ImageRef::new("흐름도", b"not an image".to_vec())),
        )
        .build()
        .unwrap()
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn test_zip_containers_have_required_parts() {
    let doc = sample();

    let docx = encode(&doc, FormatKind::Docx, &options()).unwrap();
    let names = entry_names(&docx);
    for part in ["[Content_Types].xml", "_rels/.rels", "word/document.xml", "word/styles.xml"] {
        assert!(names.iter().any(|n| n == part), "docx missing {}", part);
    }

    let pptx = encode(&doc, FormatKind::Pptx, &options()).unwrap();
    let names = entry_names(&pptx);
    for part in ["[Content_Types].xml", "ppt/presentation.xml", "ppt/slides/slide1.xml"] {
        assert!(names.iter().any(|n| n == part), "pptx missing {}", part);
    }

    let hwpx = encode(&doc, FormatKind::Hwpx, &options()).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(hwpx)).unwrap();
    assert_eq!(archive.name_for_index(0), Some("mimetype"));
}

#[test]
fn test_pdf_is_well_formed() {
    let pdf = encode(&sample(), FormatKind::Pdf, &options()).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.ends_with(b"%%EOF\n"));
}

#[test]
fn test_all_formats_are_byte_identical_across_runs() {
    let doc = sample();
    for format in FormatKind::ALL {
        let a = encode(&doc, format, &options()).unwrap();
        let b = encode(&doc, format, &options()).unwrap();
        assert_eq!(a, b, "{} output differs between runs", format);
    }
}

#[test]
fn test_generated_at_changes_metadata_only_when_set() {
    let doc = sample();
    let fixed = encode(&doc, FormatKind::Docx, &options()).unwrap();
    let stamped = encode(
        &doc,
        FormatKind::Docx,
        &options().generated_at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
    )
    .unwrap();
    assert_ne!(fixed, stamped);
}

#[test]
fn test_written_files_use_safe_names() {
    let dir = tempfile::tempdir().unwrap();
    let doc = sample();
    let stem = safe_stem(doc.title());

    for format in FormatKind::ALL {
        let path = dir.path().join(file_name(&stem, format));
        std::fs::write(&path, encode(&doc, format, &options()).unwrap()).unwrap();
        assert!(path.exists());
    }

    assert!(dir.path().join("퇴근 후 100만원 만들기.hwpx").exists());
}

/// SOI, SOF0 and EOI are enough for a passthrough JPEG
fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 8];
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.push(3);
    out.extend_from_slice(&[0; 9]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

#[test]
fn test_cover_image_lands_in_every_container() {
    let doc = DocumentModel::builder("표지 있는 책")
        .cover(ImageRef::new("표지", tiny_jpeg(600, 800)))
        .chapter(Chapter::new("첫 장").paragraph("본문"))
        .build()
        .unwrap();

    let pdf = encode(&doc, FormatKind::Pdf, &options()).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/XObject << /Im1 "));
    assert!(text.contains("/DCTDecode"));

    let docx = encode(&doc, FormatKind::Docx, &options()).unwrap();
    assert!(entry_names(&docx).iter().any(|n| n == "word/media/image1.jpeg"));

    let pptx = encode(&doc, FormatKind::Pptx, &options()).unwrap();
    assert!(entry_names(&pptx).iter().any(|n| n == "ppt/media/image1.jpeg"));
}
