//! Image header inspection (PNG / JPEG)
//!
//! 디코딩은 하지 않는다. 크기와 PDF에 그대로 넣을 수 있는지만 판단한다.

/// Detected image container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

/// Basic image facts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,

    /// Color components (1 gray, 3 RGB, 4 CMYK/RGBA)
    pub components: u8,

    pub bits_per_component: u8,
}

impl ImageInfo {
    /// Inspect image bytes. Returns `None` for unknown or truncated data.
    pub fn inspect(data: &[u8]) -> Option<Self> {
        if data.starts_with(PNG_SIGNATURE) {
            png_info(data)
        } else if data.starts_with(&[0xFF, 0xD8]) {
            jpeg_info(data)
        } else {
            None
        }
    }
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

// ============================================================================
// PNG
// ============================================================================

/// PNG chunks needed to embed without re-encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngData {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub interlaced: bool,

    /// Concatenated IDAT payload (zlib stream)
    pub idat: Vec<u8>,
}

impl PngData {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if !data.starts_with(PNG_SIGNATURE) {
            return None;
        }

        let mut pos = PNG_SIGNATURE.len();
        let mut header = None;
        let mut idat = Vec::new();

        while pos + 8 <= data.len() {
            let len = be_u32(data, pos)? as usize;
            let kind = data.get(pos + 4..pos + 8)?;
            let body = data.get(pos + 8..pos + 8 + len)?;

            match kind {
                b"IHDR" if body.len() >= 13 => {
                    header = Some((
                        be_u32(body, 0)?,
                        be_u32(body, 4)?,
                        body[8],
                        body[9],
                        body[12] != 0,
                    ));
                }
                b"IDAT" => idat.extend_from_slice(body),
                b"IEND" => break,
                _ => {}
            }

            // length + type + body + crc
            pos += 12 + len;
        }

        let (width, height, bit_depth, color_type, interlaced) = header?;
        Some(Self {
            width,
            height,
            bit_depth,
            color_type,
            interlaced,
            idat,
        })
    }

    /// Components for gray (0) / RGB (2); `None` for palette or alpha types
    pub fn flate_components(&self) -> Option<u8> {
        match self.color_type {
            0 => Some(1),
            2 => Some(3),
            _ => None,
        }
    }

    /// Whether the IDAT stream can be used directly as a FlateDecode image
    pub fn is_passthrough(&self) -> bool {
        self.bit_depth == 8
            && !self.interlaced
            && self.flate_components().is_some()
            && !self.idat.is_empty()
    }
}

fn png_info(data: &[u8]) -> Option<ImageInfo> {
    let png = PngData::parse(data)?;
    let components = match png.color_type {
        0 => 1,
        2 => 3,
        3 => 1,
        4 => 2,
        6 => 4,
        _ => return None,
    };
    Some(ImageInfo {
        kind: ImageKind::Png,
        width: png.width,
        height: png.height,
        components,
        bits_per_component: png.bit_depth,
    })
}

// ============================================================================
// JPEG
// ============================================================================

fn jpeg_info(data: &[u8]) -> Option<ImageInfo> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // padding
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // standalone markers
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let len = be_u16(data, pos + 2)? as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let bits = *data.get(pos + 4)?;
            let height = be_u16(data, pos + 5)? as u32;
            let width = be_u16(data, pos + 7)? as u32;
            let components = *data.get(pos + 9)?;
            return Some(ImageInfo {
                kind: ImageKind::Jpeg,
                width,
                height,
                components,
                bits_per_component: bits,
            });
        }
        pos += 2 + len;
    }
    None
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Build a minimal PNG (no valid CRCs needed for our parser)
    pub fn png(width: u32, height: u32, color_type: u8, idat: &[u8]) -> Vec<u8> {
        let mut out = super::PNG_SIGNATURE.to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
        push_chunk(&mut out, b"IHDR", &ihdr);
        push_chunk(&mut out, b"IDAT", idat);
        push_chunk(&mut out, b"IEND", &[]);
        out
    }

    fn push_chunk(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        out.extend_from_slice(&[0, 0, 0, 0]);
    }

    /// SOI + SOF0 header for a baseline JPEG
    pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        // APP0 (empty payload)
        out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x02]);
        out.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 8]);
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.push(3);
        out.extend_from_slice(&[0; 9]);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{jpeg, png};
    use super::*;

    #[test]
    fn test_png_info() {
        let data = png(640, 480, 2, &[1, 2, 3]);
        let info = ImageInfo::inspect(&data).unwrap();
        assert_eq!(info.kind, ImageKind::Png);
        assert_eq!((info.width, info.height), (640, 480));
        assert_eq!(info.components, 3);

        let png = PngData::parse(&data).unwrap();
        assert_eq!(png.idat, vec![1, 2, 3]);
        assert!(png.is_passthrough());
    }

    #[test]
    fn test_png_with_alpha_not_passthrough() {
        let png = PngData::parse(&png(10, 10, 6, &[0])).unwrap();
        assert!(!png.is_passthrough());
    }

    #[test]
    fn test_jpeg_info() {
        let info = ImageInfo::inspect(&jpeg(1024, 768)).unwrap();
        assert_eq!(info.kind, ImageKind::Jpeg);
        assert_eq!((info.width, info.height), (1024, 768));
        assert_eq!(info.components, 3);
    }

    #[test]
    fn test_unknown() {
        assert!(ImageInfo::inspect(b"GIF89a").is_none());
        assert!(ImageInfo::inspect(&[0x89, b'P']).is_none());
    }
}
