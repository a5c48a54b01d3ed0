//! PDF fonts: embedded TrueType (Type0 / Identity-H) or built-in Helvetica

use super::writer::{num, ObjId, PdfWriter};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use ttf_parser::{Face, GlyphId};

/// Helvetica advance widths for ASCII 32..=126 (1/1000 em)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const LATIN1_WIDTH: u16 = 556;

/// Parsed TrueType font borrowed from the caller's file buffer
pub(crate) struct EmbeddedFont<'a> {
    data: &'a [u8],
    face: Face<'a>,
    base_name: String,
    scale: f32,
    cache: HashMap<char, (u16, u16)>,
    used: BTreeMap<u16, (char, u16)>,
}

impl<'a> EmbeddedFont<'a> {
    /// Parse a single-face TrueType font with `glyf` outlines.
    /// Collections must go through [`standalone_face`] first; CFF-based fonts are rejected.
    pub fn parse(data: &'a [u8], name: &str) -> Option<Self> {
        if ttf_parser::fonts_in_collection(data).is_some() {
            return None;
        }
        let face = Face::parse(data, 0).ok()?;
        if face.tables().glyf.is_none() {
            return None;
        }

        let units = face.units_per_em();
        if units == 0 {
            return None;
        }

        let base_name: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        Some(Self {
            data,
            face,
            base_name: if base_name.is_empty() {
                "BookForgeFont".to_string()
            } else {
                base_name
            },
            scale: 1000.0 / units as f32,
            cache: HashMap::new(),
            used: BTreeMap::new(),
        })
    }

    fn glyph(&mut self, c: char) -> (u16, u16) {
        if let Some(hit) = self.cache.get(&c) {
            return *hit;
        }
        let gid = self
            .face
            .glyph_index(c)
            .or_else(|| self.face.glyph_index('?'))
            .unwrap_or(GlyphId(0));
        let advance = self.face.glyph_hor_advance(gid).unwrap_or(0);
        let width = (advance as f32 * self.scale).round() as u16;
        self.cache.insert(c, (gid.0, width));
        (gid.0, width)
    }

    fn write(&self, w: &mut PdfWriter) -> ObjId {
        let type0 = w.reserve();
        let cid_font = w.reserve();
        let descriptor = w.reserve();
        let font_file = w.reserve();
        let to_unicode = w.reserve();

        let scale = self.scale;
        let bbox = self.face.global_bounding_box();
        let ascent = self.face.ascender() as f32 * scale;
        let descent = self.face.descender() as f32 * scale;
        let cap_height = self
            .face
            .capital_height()
            .map(|h| h as f32 * scale)
            .unwrap_or(ascent);

        // 폰트 전체를 임베드하므로 subset 태그 없이 원래 이름을 쓴다
        let name = &self.base_name;

        w.object(
            type0,
            &format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
                 /DescendantFonts [{}] /ToUnicode {} >>",
                name,
                cid_font.r(),
                to_unicode.r()
            ),
        );

        let mut widths = String::new();
        for (gid, (_, width)) in &self.used {
            let _ = write!(widths, "{} [{}] ", gid, width);
        }
        w.object(
            cid_font,
            &format!(
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor {} /DW 1000 /W [{}] /CIDToGIDMap /Identity >>",
                name,
                descriptor.r(),
                widths.trim_end()
            ),
        );

        w.object(
            descriptor,
            &format!(
                "<< /Type /FontDescriptor /FontName /{} /Flags 4 /FontBBox [{} {} {} {}] \
                 /ItalicAngle 0 /Ascent {} /Descent {} /CapHeight {} /StemV 80 /FontFile2 {} >>",
                name,
                num(bbox.x_min as f32 * scale),
                num(bbox.y_min as f32 * scale),
                num(bbox.x_max as f32 * scale),
                num(bbox.y_max as f32 * scale),
                num(ascent),
                num(descent),
                num(cap_height),
                font_file.r()
            ),
        );

        w.stream(
            font_file,
            &format!("/Length1 {}", self.data.len()),
            self.data,
        );
        w.stream(to_unicode, "", self.to_unicode_cmap().as_bytes());

        type0
    }

    fn to_unicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );

        let entries: Vec<_> = self.used.iter().collect();
        for chunk in entries.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for (gid, (c, _)) in chunk {
                let mut utf16 = String::new();
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(utf16, "{:04X}", unit);
                }
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }
}

/// Face 0 of a TrueType collection rebuilt as a standalone sfnt file.
///
/// `FontFile2` must hold a single font, so `.ttc` data is unpacked here.
/// Non-collection data is returned unchanged.
pub(crate) fn standalone_face(data: Vec<u8>) -> Option<Vec<u8>> {
    if ttf_parser::fonts_in_collection(&data).is_none() {
        return Some(data);
    }

    // ttcf header: tag, version, numFonts, offsets[numFonts]
    let face_offset = read_u32(&data, 12)? as usize;
    let num_tables = read_u16(&data, face_offset + 4)? as usize;
    let header_len = 12 + 16 * num_tables;

    let mut records = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let record = face_offset + 12 + 16 * i;
        let tag = data.get(record..record + 8)?; // tag + checksum
        let offset = read_u32(&data, record + 8)? as usize;
        let length = read_u32(&data, record + 12)? as usize;
        let body = data.get(offset..offset.checked_add(length)?)?;
        records.push((tag, body));
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(data.get(face_offset..face_offset + 12)?);

    let mut next = header_len;
    for (tag, body) in &records {
        out.extend_from_slice(tag);
        out.extend_from_slice(&u32::try_from(next).ok()?.to_be_bytes());
        out.extend_from_slice(&u32::try_from(body.len()).ok()?.to_be_bytes());
        next += padded(body.len());
    }
    for (_, body) in &records {
        out.extend_from_slice(body);
        out.resize(out.len() + padded(body.len()) - body.len(), 0);
    }
    Some(out)
}

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

/// Font used for every text run in a document
pub(crate) enum PdfFont<'a> {
    Embedded(Box<EmbeddedFont<'a>>),
    Helvetica,
}

impl<'a> PdfFont<'a> {
    pub fn is_embedded(&self) -> bool {
        matches!(self, PdfFont::Embedded(_))
    }

    /// Advance width of one character in points
    pub fn char_width(&mut self, c: char, size: f32) -> f32 {
        let units = match self {
            PdfFont::Embedded(font) => font.glyph(c).1,
            PdfFont::Helvetica => helvetica_width(helvetica_char(c)),
        };
        units as f32 * size / 1000.0
    }

    pub fn text_width(&mut self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, size)).sum()
    }

    /// String operand for `Tj`. Records used glyphs for the embedded font.
    pub fn encode(&mut self, text: &str) -> String {
        match self {
            PdfFont::Embedded(font) => {
                let mut out = String::with_capacity(text.len() * 4 + 2);
                out.push('<');
                for c in text.chars() {
                    let (gid, width) = font.glyph(c);
                    font.used.entry(gid).or_insert((c, width));
                    let _ = write!(out, "{:04X}", gid);
                }
                out.push('>');
                out
            }
            PdfFont::Helvetica => {
                let mut out = String::with_capacity(text.len() + 2);
                out.push('(');
                for c in text.chars().map(helvetica_char) {
                    match c {
                        '(' | ')' | '\\' => {
                            out.push('\\');
                            out.push(c);
                        }
                        c if (c as u32) > 0x7E => {
                            let _ = write!(out, "\\{:03o}", c as u32);
                        }
                        c => out.push(c),
                    }
                }
                out.push(')');
                out
            }
        }
    }

    /// Write font objects and return the font dictionary id
    pub fn write(&self, w: &mut PdfWriter) -> ObjId {
        match self {
            PdfFont::Embedded(font) => font.write(w),
            PdfFont::Helvetica => {
                let id = w.reserve();
                w.object(
                    id,
                    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
                );
                id
            }
        }
    }
}

/// Map to a WinAnsi-representable character (Latin-1 subset), else `?`
fn helvetica_char(c: char) -> char {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => c,
        _ => '?',
    }
}

fn helvetica_width(c: char) -> u16 {
    match c as u32 {
        cp @ 0x20..=0x7E => HELVETICA_WIDTHS[(cp - 0x20) as usize],
        _ => LATIN1_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_encoding() {
        let mut font = PdfFont::Helvetica;
        assert_eq!(font.encode("a(b)"), "(a\\(b\\))");
        assert_eq!(font.encode("가é"), "(?\\351)");
        assert!(!font.is_embedded());
    }

    #[test]
    fn test_helvetica_widths() {
        let mut font = PdfFont::Helvetica;
        assert_eq!(font.char_width(' ', 1000.0), 278.0);
        assert_eq!(font.char_width('W', 1000.0), 944.0);
        assert_eq!(font.char_width('~', 1000.0), 584.0);
        assert!((font.text_width("ab", 10.0) - 11.12).abs() < 0.001);
    }

    #[test]
    fn test_invalid_font_data_rejected() {
        assert!(EmbeddedFont::parse(b"not a font", "x").is_none());
    }

    /// sfnt table directory for `tables`, placed at `base` within the file
    fn table_directory(base: usize, tables: &[(&[u8; 4], &[u8])]) -> (Vec<u8>, Vec<u8>) {
        let mut dir = vec![0, 1, 0, 0];
        dir.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        dir.extend_from_slice(&[0; 6]);
        let mut bodies = Vec::new();
        let mut offset = base + 12 + 16 * tables.len();
        for (tag, body) in tables {
            dir.extend_from_slice(*tag);
            dir.extend_from_slice(&[0xAA; 4]);
            dir.extend_from_slice(&(offset as u32).to_be_bytes());
            dir.extend_from_slice(&(body.len() as u32).to_be_bytes());
            bodies.extend_from_slice(body);
            offset += body.len();
        }
        (dir, bodies)
    }

    #[test]
    fn test_collection_face_zero_is_unpacked() {
        // ttcf, version 1.0, one font at offset 16
        let mut ttc = b"ttcf".to_vec();
        ttc.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 16]);
        let (dir, bodies) = table_directory(
            16,
            &[(b"head", &b"HEAD!"[..]), (b"glyf", &b"GLYFDATA"[..])],
        );
        ttc.extend_from_slice(&dir);
        ttc.extend_from_slice(&bodies);

        let face = standalone_face(ttc).unwrap();
        assert_eq!(&face[..4], &[0, 1, 0, 0]);
        assert_eq!(read_u16(&face, 4), Some(2));

        // 첫 테이블은 디렉토리 바로 뒤, 다음 테이블은 4바이트 정렬
        let header = 12 + 16 * 2;
        assert_eq!(&face[12..16], b"head");
        assert_eq!(read_u32(&face, 12 + 8), Some(header as u32));
        assert_eq!(read_u32(&face, 28 + 8), Some((header + 8) as u32));
        assert_eq!(&face[header..header + 5], b"HEAD!");
        assert_eq!(&face[header + 8..header + 16], b"GLYFDATA");
        assert!(ttf_parser::fonts_in_collection(&face).is_none());
    }

    #[test]
    fn test_single_font_passes_through() {
        let (mut data, bodies) = table_directory(0, &[(b"head", &b"x"[..])]);
        data.extend_from_slice(&bodies);
        assert_eq!(standalone_face(data.clone()), Some(data));
    }

    #[test]
    fn test_truncated_collection_rejected() {
        let mut ttc = b"ttcf".to_vec();
        ttc.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 16, 0, 1]);
        assert!(standalone_face(ttc).is_none());
    }
}
