//! Page layout: wrapping, pagination and content stream generation

use super::font::PdfFont;
use super::writer::{num, ObjId, PdfWriter};
use crate::image::{ImageInfo, ImageKind, PngData};
use crate::markup::{classify, sanitize_text, Block};
use crate::model::{Chapter, ImageRef};
use bookforge_foundation::PdfSettings;
use std::fmt::Write as _;

/// A4 in points
pub(crate) const PAGE_WIDTH: f32 = 595.28;
pub(crate) const PAGE_HEIGHT: f32 = 841.89;

/// Smallest usable text box (points)
const MIN_CONTENT: f32 = 100.0;

const FONT_RES: &str = "/F1";

#[derive(Debug, Clone, Copy)]
struct Color(f32, f32, f32);

const BLACK: Color = Color(0.0, 0.0, 0.0);
const GRAY: Color = Color(0.45, 0.45, 0.45);
const ACCENT: Color = Color(0.16, 0.36, 0.75);
const CALLOUT_FILL: Color = Color(0.94, 0.96, 1.0);

#[derive(Debug, Clone, Copy)]
struct Style {
    size: f32,
    bold: bool,
    color: Color,
}

impl Style {
    fn plain(size: f32) -> Self {
        Self {
            size,
            bold: false,
            color: BLACK,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Page box derived from the settings
#[derive(Debug, Clone)]
pub(crate) struct Geometry {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Geometry {
    /// `None` when the margins leave no usable area
    pub fn a4(settings: &PdfSettings) -> Option<Self> {
        let geometry = Self {
            left: settings.margin_left,
            right: PAGE_WIDTH - settings.margin_right,
            top: PAGE_HEIGHT - settings.margin_top,
            bottom: settings.margin_bottom,
        };
        if geometry.width() < MIN_CONTENT || geometry.height() < MIN_CONTENT {
            return None;
        }
        Some(geometry)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

// ============================================================================
// Images
// ============================================================================

/// Image XObject ready to be written
pub(crate) enum PdfImage {
    Jpeg {
        data: Vec<u8>,
        width: u32,
        height: u32,
        components: u8,
    },
    Png {
        idat: Vec<u8>,
        width: u32,
        height: u32,
        components: u8,
    },
}

impl PdfImage {
    /// Embeddable image, or `None` when it must be shown as a caption
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let info = ImageInfo::inspect(data)?;
        if info.width == 0 || info.height == 0 {
            return None;
        }
        match info.kind {
            ImageKind::Jpeg if info.bits_per_component == 8 => Some(PdfImage::Jpeg {
                data: data.to_vec(),
                width: info.width,
                height: info.height,
                components: info.components,
            }),
            ImageKind::Jpeg => None,
            ImageKind::Png => {
                let png = PngData::parse(data)?;
                if !png.is_passthrough() {
                    return None;
                }
                Some(PdfImage::Png {
                    components: png.flate_components()?,
                    width: png.width,
                    height: png.height,
                    idat: png.idat,
                })
            }
        }
    }

    fn size(&self) -> (u32, u32) {
        match self {
            PdfImage::Jpeg { width, height, .. } | PdfImage::Png { width, height, .. } => {
                (*width, *height)
            }
        }
    }

    pub fn write(&self, w: &mut PdfWriter, id: ObjId) {
        match self {
            PdfImage::Jpeg {
                data,
                width,
                height,
                components,
            } => {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
                     /BitsPerComponent 8 /Filter /DCTDecode",
                    width,
                    height,
                    color_space(*components)
                );
                w.stream(id, &dict, data);
            }
            PdfImage::Png {
                idat,
                width,
                height,
                components,
            } => {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
                     /BitsPerComponent 8 /Filter /FlateDecode \
                     /DecodeParms << /Predictor 15 /Colors {} /BitsPerComponent 8 /Columns {} >>",
                    width,
                    height,
                    color_space(*components),
                    components,
                    width
                );
                w.stream(id, &dict, idat);
            }
        }
    }
}

fn color_space(components: u8) -> &'static str {
    match components {
        1 => "/DeviceGray",
        4 => "/DeviceCMYK",
        _ => "/DeviceRGB",
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Lays out text into page content streams
pub(crate) struct Layout<'f, 'a> {
    font: &'f mut PdfFont<'a>,
    settings: &'f PdfSettings,
    geo: &'f Geometry,
    pages: Vec<String>,
    current: Option<String>,
    y: f32,
    images: Vec<PdfImage>,
    /// XObject names continue after images placed by an earlier layout
    image_base: usize,
}

impl<'f, 'a> Layout<'f, 'a> {
    pub fn new(font: &'f mut PdfFont<'a>, settings: &'f PdfSettings, geo: &'f Geometry) -> Self {
        Self {
            font,
            settings,
            geo,
            pages: Vec::new(),
            current: None,
            y: geo.top,
            images: Vec::new(),
            image_base: 0,
        }
    }

    /// Number image XObjects from `base + 1`
    pub fn image_base(mut self, base: usize) -> Self {
        self.image_base = base;
        self
    }

    /// Pages started so far (including the open one)
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.current.is_some())
    }

    /// Finish and return page contents and image XObjects
    pub fn finish(mut self) -> (Vec<String>, Vec<PdfImage>) {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
        (self.pages, self.images)
    }

    fn new_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
        self.current = Some(String::new());
        self.y = self.geo.top;
    }

    fn ops(&mut self) -> &mut String {
        if self.current.is_none() {
            self.new_page();
        }
        self.current.get_or_insert_with(String::new)
    }

    /// Start a new page unless `height` still fits
    fn ensure(&mut self, height: f32) {
        if self.current.is_none() || self.y - height < self.geo.bottom {
            self.new_page();
        }
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.settings.line_spacing
    }

    // ------------------------------------------------------------------------
    // primitives
    // ------------------------------------------------------------------------

    fn draw_text(&mut self, x: f32, baseline: f32, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        let operand = self.font.encode(text);
        let Color(r, g, b) = style.color;
        let render = if style.bold {
            format!("{} w 2 Tr ", num(style.size * 0.03))
        } else {
            String::new()
        };
        let op = format!(
            "q {} {} {} rg {} {} {} RG {}BT {} {} Tf {} {} Td {} Tj ET Q\n",
            num(r),
            num(g),
            num(b),
            num(r),
            num(g),
            num(b),
            render,
            FONT_RES,
            num(style.size),
            num(x),
            num(baseline),
            operand
        );
        self.ops().push_str(&op);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Color(r, g, b) = color;
        let op = format!(
            "q {} {} {} rg {} {} {} {} re f Q\n",
            num(r),
            num(g),
            num(b),
            num(x),
            num(y),
            num(w),
            num(h)
        );
        self.ops().push_str(&op);
    }

    fn rule(&mut self, y: f32, color: Color) {
        let Color(r, g, b) = color;
        let op = format!(
            "q {} {} {} RG 0.6 w {} {} m {} {} l S Q\n",
            num(r),
            num(g),
            num(b),
            num(self.geo.left),
            num(y),
            num(self.geo.right),
            num(y)
        );
        self.ops().push_str(&op);
    }

    /// Greedy wrap by measured advance, preferring breaks at spaces
    pub fn wrap(&mut self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line: Vec<char> = Vec::new();
        let mut width = 0.0;
        let mut last_space: Option<usize> = None;

        for c in text.chars() {
            let advance = self.font.char_width(c, size);

            if width + advance > max_width && !line.is_empty() {
                if c == ' ' {
                    lines.push(line.iter().collect::<String>().trim_end().to_string());
                    line.clear();
                    width = 0.0;
                    last_space = None;
                    continue;
                }
                match last_space {
                    Some(at) if at > 0 => {
                        let rest = line.split_off(at + 1);
                        lines.push(line.iter().collect::<String>().trim_end().to_string());
                        line = rest;
                        width = line.iter().map(|ch| self.font.char_width(*ch, size)).sum();
                    }
                    _ => {
                        lines.push(line.iter().collect());
                        line.clear();
                        width = 0.0;
                    }
                }
                last_space = None;
            }

            if c == ' ' && line.is_empty() {
                continue;
            }
            line.push(c);
            width += advance;
            if c == ' ' {
                last_space = Some(line.len() - 1);
            }
        }

        let tail: String = line.iter().collect();
        let tail = tail.trim_end();
        if !tail.is_empty() {
            lines.push(tail.to_string());
        }
        lines
    }

    /// Wrapped paragraph with an optional hanging prefix
    fn paragraph(&mut self, prefix: Option<&str>, text: &str, style: Style, indent: f32) {
        let line_h = self.line_height(style.size);
        let prefix_w = prefix
            .map(|p| self.font.text_width(p, style.size))
            .unwrap_or(0.0);
        let x = self.geo.left + indent;
        let width = self.geo.width() - indent - prefix_w;
        let lines = self.wrap(text, style.size, width);

        for (i, line) in lines.iter().enumerate() {
            self.ensure(line_h);
            let baseline = self.y - style.size;
            if i == 0 {
                if let Some(p) = prefix {
                    self.draw_text(x, baseline, p, style);
                }
            }
            self.draw_text(x + prefix_w, baseline, line, style);
            self.y -= line_h;
        }
        self.y -= self.settings.font_size * 0.5;
    }

    // ------------------------------------------------------------------------
    // blocks
    // ------------------------------------------------------------------------

    fn block(&mut self, block: Block<'_>) {
        let body = self.settings.font_size;
        match block {
            Block::Subheading(text) => {
                let style = Style::plain(self.settings.subheading_size)
                    .bold()
                    .color(ACCENT);
                // keep the heading with at least one following line
                self.ensure(
                    self.line_height(style.size) + self.line_height(body) + body,
                );
                self.y -= body * 0.6;
                self.paragraph(None, &sanitize_text(text), style, 0.0);
            }
            Block::Callout { label, text } => self.callout(label, text),
            Block::Bullet(text) => {
                self.paragraph(Some("• "), &sanitize_text(text), Style::plain(body), body)
            }
            Block::Numbered { n, text } => {
                let prefix = format!("{}. ", n);
                self.paragraph(Some(&prefix), &sanitize_text(text), Style::plain(body), body)
            }
            Block::Text(text) => self.paragraph(None, &sanitize_text(text), Style::plain(body), 0.0),
        }
    }

    fn callout(&mut self, label: &str, text: &str) {
        let body = self.settings.font_size;
        let pad = body * 0.8;
        let label_style = Style::plain(body * 0.9).bold().color(ACCENT);
        let text_style = Style::plain(body);

        let label = sanitize_text(label);
        let text = sanitize_text(text);
        let lines = self.wrap(&text, body, self.geo.width() - pad * 2.0 - 4.0);
        let label_h = self.line_height(label_style.size);
        let text_h = self.line_height(body) * lines.len() as f32;
        let box_h = pad * 2.0 + label_h + text_h;

        if box_h > self.geo.height() {
            // does not fit on any page: degrade to plain paragraphs
            self.paragraph(None, &label, label_style, 0.0);
            self.paragraph(None, &text, text_style, 0.0);
            return;
        }

        self.ensure(box_h + body);
        let top = self.y;
        self.fill_rect(self.geo.left, top - box_h, self.geo.width(), box_h, CALLOUT_FILL);
        self.fill_rect(self.geo.left, top - box_h, 3.0, box_h, ACCENT);

        let x = self.geo.left + pad + 4.0;
        let mut y = top - pad;
        self.draw_text(x, y - label_style.size, &label, label_style);
        y -= label_h;
        for line in &lines {
            self.draw_text(x, y - body, line, text_style);
            y -= self.line_height(body);
        }

        self.y = top - box_h - body;
    }

    fn image(&mut self, image: &ImageRef) {
        let caption_style = Style::plain(self.settings.font_size * 0.85).color(GRAY);
        let caption = sanitize_text(image.alt.trim());

        let Some(pdf_image) = PdfImage::from_bytes(&image.data) else {
            let text = if caption.is_empty() {
                "[이미지]".to_string()
            } else {
                format!("[이미지: {}]", caption)
            };
            self.paragraph(None, &text, caption_style, 0.0);
            return;
        };

        let (px_w, px_h) = pdf_image.size();
        // 96 dpi -> points, capped to the text box
        let mut w = (px_w as f32 * 0.75).min(self.geo.width());
        let mut h = w * px_h as f32 / px_w as f32;
        let max_h = self.geo.height() * 0.6;
        if h > max_h {
            w *= max_h / h;
            h = max_h;
        }

        let caption_h = if caption.is_empty() {
            0.0
        } else {
            self.line_height(caption_style.size)
        };
        self.ensure(h + caption_h + self.settings.font_size);

        self.place_image(pdf_image, w, h);
        self.y -= h + self.settings.font_size * 0.4;

        if !caption.is_empty() {
            self.centered(&caption, caption_style);
        }
        self.y -= self.settings.font_size * 0.6;
    }

    /// Draw centered at the cursor (top edge at `y`); cursor is not moved
    fn place_image(&mut self, pdf_image: PdfImage, w: f32, h: f32) {
        self.images.push(pdf_image);
        let name = format!("/Im{}", self.image_base + self.images.len());
        let x = self.geo.left + (self.geo.width() - w) / 2.0;
        let op = format!(
            "q {} 0 0 {} {} {} cm {} Do Q\n",
            num(w),
            num(h),
            num(x),
            num(self.y - h),
            name
        );
        self.ops().push_str(&op);
    }

    fn centered(&mut self, text: &str, style: Style) {
        let lines = self.wrap(text, style.size, self.geo.width());
        for line in lines {
            let line_h = self.line_height(style.size);
            self.ensure(line_h);
            let w = self.font.text_width(&line, style.size);
            let x = self.geo.left + (self.geo.width() - w) / 2.0;
            self.draw_text(x, self.y - style.size, &line, style);
            self.y -= line_h;
        }
    }

    // ------------------------------------------------------------------------
    // document parts
    // ------------------------------------------------------------------------

    /// Cover page with optional illustration, title and subtitle
    pub fn cover(&mut self, title: &str, subtitle: Option<&str>, image: Option<&ImageRef>) {
        self.new_page();
        let has_art = image.is_some_and(|image| self.cover_image(image));
        if has_art {
            self.y -= self.settings.heading_size * 2.0;
        } else {
            self.y = PAGE_HEIGHT * 0.64;
        }

        let title_style = Style::plain(self.settings.heading_size * 1.75).bold();
        self.centered(&sanitize_text(title), title_style);

        self.y -= self.settings.font_size;
        let rule_y = self.y;
        self.rule(rule_y, ACCENT);
        self.y -= self.settings.font_size * 1.5;

        if let Some(subtitle) = subtitle {
            let style = Style::plain(self.settings.subheading_size).color(GRAY);
            self.centered(&sanitize_text(subtitle), style);
        }
    }

    /// Illustration in the upper part of the cover; `false` if undecodable
    fn cover_image(&mut self, image: &ImageRef) -> bool {
        let Some(pdf_image) = PdfImage::from_bytes(&image.data) else {
            return false;
        };
        let (px_w, px_h) = pdf_image.size();
        let max_h = self.geo.height() * 0.45;
        let mut w = self.geo.width() * 0.7;
        let mut h = w * px_h as f32 / px_w as f32;
        if h > max_h {
            w *= max_h / h;
            h = max_h;
        }

        self.y = self.geo.top;
        self.place_image(pdf_image, w, h);
        self.y -= h;
        true
    }

    /// Table of contents; `entries` are (label, heading, page number)
    pub fn toc(&mut self, entries: &[(Option<String>, String, usize)]) {
        let size = self.settings.font_size;
        let line_h = self.line_height(size) * 1.2;
        let heading = Style::plain(self.settings.heading_size).bold();
        let per_first = toc_rows_first_page(self.settings, self.geo);
        let per_page = toc_rows_per_page(self.settings, self.geo);

        self.new_page();
        self.draw_text(self.geo.left, self.y - heading.size, "목차", heading);
        self.y -= toc_header_height(self.settings);

        for (i, (label, title, page)) in entries.iter().enumerate() {
            if i >= per_first && (i - per_first) % per_page == 0 {
                self.new_page();
            }

            let number = page.to_string();
            let number_w = self.font.text_width(&number, size);
            let text = match label {
                Some(label) => format!("{}  {}", sanitize_text(label), sanitize_text(title)),
                None => sanitize_text(title),
            };
            let room = self.geo.width() - number_w - size * 2.0;
            let text = self.truncate(&text, size, room);

            let baseline = self.y - size;
            self.draw_text(self.geo.left, baseline, &text, Style::plain(size));
            self.draw_text(
                self.geo.right - number_w,
                baseline,
                &number,
                Style::plain(size).color(GRAY),
            );
            self.y -= line_h;
        }
    }

    fn truncate(&mut self, text: &str, size: f32, max_width: f32) -> String {
        if self.font.text_width(text, size) <= max_width {
            return text.to_string();
        }
        let ellipsis_w = self.font.text_width("...", size);
        let mut out = String::new();
        let mut width = 0.0;
        for c in text.chars() {
            let w = self.font.char_width(c, size);
            if width + w + ellipsis_w > max_width {
                break;
            }
            out.push(c);
            width += w;
        }
        out.push_str("...");
        out
    }

    /// One chapter starting on a fresh page
    pub fn chapter(&mut self, chapter: &Chapter) {
        self.new_page();

        if let Some(label) = &chapter.label {
            let style = Style::plain(self.settings.font_size * 0.9).color(ACCENT);
            self.paragraph(None, &sanitize_text(label), style, 0.0);
        }

        let heading = Style::plain(self.settings.heading_size).bold();
        self.paragraph(None, &sanitize_text(&chapter.heading), heading, 0.0);
        let rule_y = self.y + self.settings.font_size * 0.2;
        self.rule(rule_y, GRAY);
        self.y -= self.settings.font_size;

        for paragraph in &chapter.paragraphs {
            self.block(classify(paragraph));
        }

        for image in &chapter.images {
            self.image(image);
        }
    }
}

fn toc_header_height(settings: &PdfSettings) -> f32 {
    settings.heading_size * settings.line_spacing + settings.font_size * 1.5
}

fn toc_rows_first_page(settings: &PdfSettings, geo: &Geometry) -> usize {
    let line_h = settings.font_size * settings.line_spacing * 1.2;
    (((geo.height() - toc_header_height(settings)) / line_h).floor() as usize).max(1)
}

fn toc_rows_per_page(settings: &PdfSettings, geo: &Geometry) -> usize {
    let line_h = settings.font_size * settings.line_spacing * 1.2;
    ((geo.height() / line_h).floor() as usize).max(1)
}

/// Pages the table of contents will take for `entries` rows
pub(crate) fn toc_page_count(settings: &PdfSettings, geo: &Geometry, entries: usize) -> usize {
    let first = toc_rows_first_page(settings, geo);
    if entries <= first {
        1
    } else {
        let per_page = toc_rows_per_page(settings, geo);
        1 + (entries - first).div_ceil(per_page)
    }
}

/// Footer with a centered page number
pub(crate) fn footer(font: &mut PdfFont<'_>, settings: &PdfSettings, number: usize) -> String {
    let size = settings.font_size * 0.8;
    let text = format!("- {} -", number);
    let width = font.text_width(&text, size);
    let x = (PAGE_WIDTH - width) / 2.0;
    let y = (settings.margin_bottom / 2.0).max(size);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "q 0.45 0.45 0.45 rg BT {} {} Tf {} {} Td {} Tj ET Q",
        FONT_RES,
        num(size),
        num(x),
        num(y),
        font.encode(&text)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PdfSettings {
        PdfSettings::default()
    }

    #[test]
    fn test_wrap_prefers_spaces() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        // "aaaa " is 2.502pt at size 1, one more glyph overflows 3pt
        let lines = layout.wrap("aaaa bbbb cccc", 1.0, 3.0);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        let lines = layout.wrap("aaaaaaaaaa", 1.0, 2.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "aaaaaaaaaa");
    }

    #[test]
    fn test_chapter_starts_new_page() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        layout.chapter(&Chapter::new("One").paragraph("text"));
        layout.chapter(&Chapter::new("Two").paragraph("- bullet"));
        let (pages, images) = layout.finish();
        assert_eq!(pages.len(), 2);
        assert!(images.is_empty());
    }

    #[test]
    fn test_long_chapter_paginates() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        let body: Vec<String> = (0..200).map(|i| format!("Paragraph number {}", i)).collect();
        layout.chapter(&Chapter::new("Long").paragraphs(body));
        assert!(layout.page_count() > 1);
    }

    #[test]
    fn test_bad_margins_rejected() {
        let mut settings = settings();
        settings.margin_left = 300.0;
        settings.margin_right = 300.0;
        assert!(Geometry::a4(&settings).is_none());
    }

    #[test]
    fn test_toc_page_count() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let first = toc_rows_first_page(&settings, &geo);
        assert_eq!(toc_page_count(&settings, &geo, 1), 1);
        assert_eq!(toc_page_count(&settings, &geo, first), 1);
        assert_eq!(toc_page_count(&settings, &geo, first + 1), 2);
    }

    #[test]
    fn test_cover_image_numbered_after_base() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo).image_base(2);

        let art = ImageRef::new("표지", crate::image::fixtures::jpeg(800, 600));
        layout.cover("Title", Some("Sub"), Some(&art));
        let (pages, images) = layout.finish();
        assert_eq!(images.len(), 1);
        assert!(pages[0].contains("/Im3 Do"));
        assert!(pages[0].contains("(Title)"));
    }

    #[test]
    fn test_undecodable_cover_image_skipped() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        let art = ImageRef::new("표지", b"GIF89a".to_vec());
        layout.cover("Title", None, Some(&art));
        let (pages, images) = layout.finish();
        assert!(images.is_empty());
        assert!(!pages[0].contains(" Do "));
    }

    #[test]
    fn test_caption_for_unknown_image() {
        let settings = settings();
        let geo = Geometry::a4(&settings).unwrap();
        let mut font = PdfFont::Helvetica;
        let mut layout = Layout::new(&mut font, &settings, &geo);

        layout.chapter(
            &Chapter::new("c")
                .paragraph("x")
                .image(ImageRef::new("cat", b"GIF89a".to_vec())),
        );
        let (pages, images) = layout.finish();
        assert!(images.is_empty());
        assert!(pages[0].contains("([???: cat])"));
    }
}
