//! Minimal PDF 1.7 object writer
//!
//! 객체 번호를 먼저 예약하고 나중에 본문을 쓸 수 있다. xref는 번호 순으로 쓴다.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ObjId(pub usize);

impl ObjId {
    /// Indirect reference (`N 0 R`)
    pub fn r(&self) -> String {
        format!("{} 0 R", self.0)
    }
}

pub(crate) struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<Option<usize>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Reserve an object number
    pub fn reserve(&mut self) -> ObjId {
        self.offsets.push(None);
        ObjId(self.offsets.len())
    }

    fn begin(&mut self, id: ObjId) {
        if let Some(slot) = self.offsets.get_mut(id.0 - 1) {
            *slot = Some(self.buf.len());
        }
        self.buf
            .extend_from_slice(format!("{} 0 obj\n", id.0).as_bytes());
    }

    /// Write a dictionary (or any direct object) body
    pub fn object(&mut self, id: ObjId, body: &str) {
        self.begin(id);
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    /// Write a stream object. `dict` holds extra entries without `/Length`.
    pub fn stream(&mut self, id: ObjId, dict: &str, data: &[u8]) {
        self.begin(id);
        let header = if dict.is_empty() {
            format!("<< /Length {} >>\nstream\n", data.len())
        } else {
            format!("<< {} /Length {} >>\nstream\n", dict, data.len())
        };
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    /// Write xref + trailer and return the file bytes
    pub fn finish(mut self, root: ObjId, info: ObjId) -> Vec<u8> {
        let xref_at = self.buf.len();
        let mut xref = String::new();
        let _ = writeln!(xref, "xref\n0 {}", self.offsets.len() + 1);
        xref.push_str("0000000000 65535 f \n");
        for offset in &self.offsets {
            match offset {
                Some(at) => {
                    let _ = write!(xref, "{:010} 00000 n \n", at);
                }
                None => xref.push_str("0000000000 00000 f \n"),
            }
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {} /Info {} >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            root.r(),
            info.r(),
            xref_at
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// PDF text string as UTF-16BE hex with BOM (for /Info and outlines)
pub(crate) fn text_string(text: &str) -> String {
    let mut out = String::from("<FEFF");
    for unit in text.encode_utf16() {
        let _ = write!(out, "{:04X}", unit);
    }
    out.push('>');
    out
}

/// Format a coordinate without trailing zeros
pub(crate) fn num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xref_offsets() {
        let mut w = PdfWriter::new();
        let a = w.reserve();
        let b = w.reserve();
        w.object(b, "<< /Type /Pages >>");
        w.object(a, "<< /Type /Catalog >>");
        let bytes = w.finish(a, b);
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.7"));
        assert!(text.contains("xref\n0 3\n"));
        assert!(text.contains("/Root 1 0 R /Info 2 0 R"));
        assert!(text.trim_end().ends_with("%%EOF"));

        // xref offsets are byte positions; the binary header line is not UTF-8
        for marker in [&b"1 0 obj"[..], &b"2 0 obj"[..]] {
            let pos = bytes
                .windows(marker.len())
                .position(|window| window == marker)
                .unwrap();
            assert!(text.contains(&format!("{:010} 00000 n", pos)));
        }
    }

    #[test]
    fn test_stream_length() {
        let mut w = PdfWriter::new();
        let id = w.reserve();
        w.stream(id, "/Filter /DCTDecode", b"abcd");
        let bytes = w.finish(id, id);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("<< /Filter /DCTDecode /Length 4 >>"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(text_string("A가"), "<FEFF0041AC00>");
        assert_eq!(num(12.0), "12");
        assert_eq!(num(595.276), "595.28");
        assert_eq!(num(0.5), "0.5");
    }
}
