//! ReferenceIngestor - reference files and links → bounded context text
//!
//! - 텍스트 파일: 그대로 (HTML은 태그 제거)
//! - DOCX / PPTX / HWPX: ZIP 안의 본문 XML에서 텍스트만 추출
//! - PDF: 압축되지 않은 스트림의 `(..) Tj` 문자열만 추출
//! - 링크: URL 그대로 포함 (내용은 가져오지 않음)
//!
//! 읽을 수 없는 파일은 경고만 남기고 건너뛴다. 전체 길이는 예산(문자 수)을
//! 넘지 않도록 뒤쪽부터 잘라낸다.

use crate::request::{ReferenceBundle, ReferenceFile};
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Default character budget
pub const DEFAULT_CONTEXT_BUDGET: usize = 12_000;

/// Upper bound for a single decompressed XML part
const MAX_PART_BYTES: u64 = 16 * 1024 * 1024;

/// Ingested reference text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlob {
    pub text: String,

    /// Files that contributed text, in order
    pub sources: Vec<String>,

    /// Files that were skipped
    pub skipped: Vec<String>,

    /// Budget cut off part of the material
    pub truncated: bool,
}

impl ContextBlob {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Reference ingestor
#[derive(Debug, Clone)]
pub struct ReferenceIngestor {
    budget: usize,
}

impl Default for ReferenceIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_BUDGET)
    }
}

impl ReferenceIngestor {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Consume a bundle
    ///
    /// 파일 순서 → 링크 순서로 이어 붙이고, 예산을 넘는 뒷부분은 버린다.
    pub fn ingest(&self, bundle: ReferenceBundle) -> ContextBlob {
        let mut blob = ContextBlob::default();
        let mut sections = Vec::new();

        for file in &bundle.files {
            match extract_text(file) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Reference {}: {} chars", file.filename, text.chars().count());
                    sections.push(format!("[참고 자료: {}]\n{}", file.filename, text.trim()));
                    blob.sources.push(file.filename.clone());
                }
                Ok(_) => {
                    warn!("Skipping reference {}: no text found", file.filename);
                    blob.skipped.push(file.filename.clone());
                }
                Err(reason) => {
                    warn!("Skipping reference {}: {}", file.filename, reason);
                    blob.skipped.push(file.filename.clone());
                }
            }
        }

        if !bundle.links.is_empty() {
            let mut links = String::from("[참고 링크]");
            for link in &bundle.links {
                links.push('\n');
                links.push_str(link);
            }
            sections.push(links);
        }

        let joined = sections.join("\n\n");
        let (text, truncated) = truncate_chars(&joined, self.budget);
        if truncated {
            debug!(
                "Reference context truncated to {} of {} chars",
                self.budget,
                joined.chars().count()
            );
        }
        blob.text = text;
        blob.truncated = truncated;
        blob
    }
}

fn truncate_chars(text: &str, budget: usize) -> (String, bool) {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

// ============================================================================
// Extraction
// ============================================================================

fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn extract_text(file: &ReferenceFile) -> std::result::Result<String, String> {
    match extension(&file.filename).as_str() {
        "txt" | "md" | "markdown" | "csv" | "tsv" | "json" | "log" | "rst" | "" => {
            utf8(&file.bytes)
        }
        "html" | "htm" | "xml" => utf8(&file.bytes).map(|s| strip_markup(&s)),
        "docx" => zip_text(&file.bytes, |name| name == "word/document.xml"),
        "pptx" => zip_text(&file.bytes, |name| {
            name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
        }),
        "hwpx" => zip_text(&file.bytes, |name| {
            name.starts_with("Contents/section") && name.ends_with(".xml")
        }),
        "pdf" => Ok(pdf_text(&file.bytes)),
        other => Err(format!("unsupported file type '.{}'", other)),
    }
}

fn utf8(bytes: &[u8]) -> std::result::Result<String, String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|_| "not valid UTF-8 text".to_string())
}

/// Concatenate the text of every matching XML part, in natural part order
fn zip_text<F>(bytes: &[u8], wanted: F) -> std::result::Result<String, String>
where
    F: Fn(&str) -> bool,
{
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("bad archive: {}", e))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| wanted(name))
        .map(str::to_string)
        .collect();
    // slide10.xml이 slide2.xml 뒤에 오도록
    names.sort_by_key(|name| (name.len(), name.clone()));

    if names.is_empty() {
        return Err("no document parts found".to_string());
    }

    let mut parts = Vec::with_capacity(names.len());
    for name in names {
        let entry = archive
            .by_name(&name)
            .map_err(|e| format!("{}: {}", name, e))?;
        let mut xml = String::new();
        entry
            .take(MAX_PART_BYTES)
            .read_to_string(&mut xml)
            .map_err(|e| format!("{}: {}", name, e))?;
        parts.push(strip_markup(&xml));
    }
    Ok(parts.join("\n"))
}

struct Markup {
    paragraph_end: Regex,
    tag: Regex,
    blank_lines: Regex,
    pdf_show: Regex,
}

impl Markup {
    fn compile() -> Option<Self> {
        Some(Self {
            paragraph_end: Regex::new(r"(?i)</(w:p|a:p|hp:p|p|div|li|h[1-6])>|<br\s*/?>").ok()?,
            tag: Regex::new(r"<[^>]*>").ok()?,
            blank_lines: Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").ok()?,
            pdf_show: Regex::new(r"\(((?:\\.|[^\\)])*)\)\s*Tj").ok()?,
        })
    }
}

static MARKUP: OnceLock<Option<Markup>> = OnceLock::new();

fn markup() -> Option<&'static Markup> {
    MARKUP.get_or_init(Markup::compile).as_ref()
}

/// Tags → text, paragraph ends → newlines, entities decoded
fn strip_markup(xml: &str) -> String {
    let Some(m) = markup() else {
        return xml.to_string();
    };
    let with_breaks = m.paragraph_end.replace_all(xml, "\n");
    let text = m.tag.replace_all(&with_breaks, "");
    let text = decode_entities(&text);
    let text = m.blank_lines.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Text-showing operators from uncompressed content streams
fn pdf_text(bytes: &[u8]) -> String {
    let Some(m) = markup() else {
        return String::new();
    };
    let raw = String::from_utf8_lossy(bytes);
    let mut lines = Vec::new();
    for caps in m.pdf_show.captures_iter(&raw) {
        if let Some(s) = caps.get(1) {
            let text = s
                .as_str()
                .replace("\\(", "(")
                .replace("\\)", ")")
                .replace("\\\\", "\\");
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_plain_text_and_links() {
        let bundle = ReferenceBundle::new()
            .file(ReferenceFile::new("note.txt", "첫 번째 메모".as_bytes().to_vec()))
            .link("https://example.com/a");
        let blob = ReferenceIngestor::default().ingest(bundle);

        assert!(blob.text.starts_with("[참고 자료: note.txt]\n첫 번째 메모"));
        assert!(blob.text.ends_with("[참고 링크]\nhttps://example.com/a"));
        assert_eq!(blob.sources, vec!["note.txt"]);
        assert!(!blob.truncated);
    }

    #[test]
    fn test_docx_text() {
        let docx = zip_with(&[(
            "word/document.xml",
            "<w:document><w:body><w:p><w:r><w:t>가 &amp; 나</w:t></w:r></w:p><w:p><w:r><w:t>둘째</w:t></w:r></w:p></w:body></w:document>",
        )]);
        let blob = ReferenceIngestor::default()
            .ingest(ReferenceBundle::new().file(ReferenceFile::new("ref.DOCX", docx)));
        assert!(blob.text.contains("가 & 나\n둘째"));
    }

    #[test]
    fn test_pptx_slides_in_natural_order() {
        let pptx = zip_with(&[
            ("ppt/slides/slide10.xml", "<a:p>ten</a:p>"),
            ("ppt/slides/slide2.xml", "<a:p>two</a:p>"),
        ]);
        let blob = ReferenceIngestor::default()
            .ingest(ReferenceBundle::new().file(ReferenceFile::new("deck.pptx", pptx)));
        let two = blob.text.find("two").unwrap();
        let ten = blob.text.find("ten").unwrap();
        assert!(two < ten);
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let bundle = ReferenceBundle::new()
            .file(ReferenceFile::new("broken.docx", b"not a zip".to_vec()))
            .file(ReferenceFile::new("image.png", vec![0x89, 0x50]))
            .file(ReferenceFile::new("binary.txt", vec![0xff, 0xfe, 0x00]))
            .file(ReferenceFile::new("ok.md", b"# fine".to_vec()));
        let blob = ReferenceIngestor::default().ingest(bundle);

        assert_eq!(blob.sources, vec!["ok.md"]);
        assert_eq!(blob.skipped.len(), 3);
        assert!(blob.text.contains("# fine"));
    }

    #[test]
    fn test_budget_keeps_earliest() {
        let bundle = ReferenceBundle::new()
            .file(ReferenceFile::new("a.txt", "A".repeat(50).into_bytes()))
            .file(ReferenceFile::new("b.txt", "B".repeat(50).into_bytes()));
        let blob = ReferenceIngestor::new(40).ingest(bundle);

        assert!(blob.truncated);
        assert_eq!(blob.char_count(), 40);
        assert!(blob.text.starts_with("[참고 자료: a.txt]"));
        assert!(!blob.text.contains('B'));
    }

    #[test]
    fn test_pdf_literal_strings() {
        let pdf = b"%PDF-1.4\nBT /F1 12 Tf (Hello \\(world\\)) Tj ET\nBT (Second) Tj ET";
        assert_eq!(pdf_text(pdf), "Hello (world)\nSecond");
    }

    #[test]
    fn test_html_stripped() {
        assert_eq!(
            strip_markup("<html><body><p>one</p><p>two &lt;3</p></body></html>"),
            "one\ntwo <3"
        );
    }
}
