//! Word-processor encoder (WordprocessingML / .docx)

use super::Encoder;
use crate::container::Package;
use crate::format::{EncodeOptions, FormatKind};
use crate::image::ImageInfo;
use crate::markup::{classify, Block};
use crate::model::{DocumentModel, ImageRef};
use crate::xml::{escape, DECLARATION};
use bookforge_foundation::{PdfSettings, Result};
use std::fmt::Write as _;

const EMU_PER_PX: u64 = 9525;
const EMU_PER_PT: f32 = 12700.0;
const A4_WIDTH_TWIPS: u32 = 11906;
const A4_HEIGHT_TWIPS: u32 = 16838;

/// DOCX encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxEncoder;

/// Image stored under `word/media`
struct Media {
    rel_id: String,
    file_name: String,
    data: Vec<u8>,
}

struct DocxBuilder<'a> {
    settings: &'a PdfSettings,
    body: String,
    media: Vec<Media>,
}

impl<'a> DocxBuilder<'a> {
    fn new(settings: &'a PdfSettings) -> Self {
        Self {
            settings,
            body: String::new(),
            media: Vec::new(),
        }
    }

    fn paragraph(&mut self, style: Option<&str>, page_break: bool, runs: &str) {
        self.body.push_str("<w:p>");
        if style.is_some() || page_break {
            self.body.push_str("<w:pPr>");
            if let Some(style) = style {
                let _ = write!(self.body, r#"<w:pStyle w:val="{}"/>"#, style);
            }
            if page_break {
                self.body.push_str("<w:pageBreakBefore/>");
            }
            self.body.push_str("</w:pPr>");
        }
        self.body.push_str(runs);
        self.body.push_str("</w:p>");
    }

    fn block(&mut self, block: Block<'_>) {
        match block {
            Block::Subheading(text) => self.paragraph(Some("Heading2"), false, &run(text, false)),
            Block::Callout { label, text } => {
                let runs = format!("{}{}", run(label, true), run(&format!("  {}", text), false));
                self.paragraph(Some("Callout"), false, &runs);
            }
            Block::Bullet(text) => {
                self.paragraph(Some("ListBullet"), false, &run(&format!("• {}", text), false))
            }
            Block::Numbered { n, text } => self.paragraph(
                Some("ListBullet"),
                false,
                &run(&format!("{}. {}", n, text), false),
            ),
            Block::Text(text) => self.paragraph(None, false, &run(text, false)),
        }
    }

    fn image(&mut self, image: &ImageRef) {
        let Some(drawing) = self.drawing(image) else {
            let caption = format!("[이미지: {}]", image.alt);
            self.paragraph(Some("Caption"), false, &run(&caption, false));
            return;
        };

        self.paragraph(Some("Figure"), false, &drawing);
        if !image.alt.trim().is_empty() {
            self.paragraph(Some("Caption"), false, &run(image.alt.trim(), false));
        }
    }

    /// Inline picture run; registers the media part. `None` for unknown formats
    fn drawing(&mut self, image: &ImageRef) -> Option<String> {
        let info = ImageInfo::inspect(&image.data)?;

        let index = self.media.len() + 1;
        let rel_id = format!("rIdImg{}", index);
        let file_name = format!("image{}.{}", index, info.kind.extension());

        let max_cx = (self.text_width_pt() * EMU_PER_PT) as u64;
        let mut cx = info.width as u64 * EMU_PER_PX;
        let mut cy = info.height as u64 * EMU_PER_PX;
        if cx > max_cx && cx > 0 {
            cy = cy * max_cx / cx;
            cx = max_cx;
        }

        let drawing = format!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{id}" name="Picture {id}" descr="{alt}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{file}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
            cx = cx,
            cy = cy,
            id = index,
            alt = escape(&image.alt),
            file = file_name,
            rel = rel_id,
        );

        self.media.push(Media {
            rel_id,
            file_name,
            data: image.data.clone(),
        });
        Some(drawing)
    }

    fn text_width_pt(&self) -> f32 {
        (A4_WIDTH_TWIPS as f32 / 20.0 - self.settings.margin_left - self.settings.margin_right)
            .max(72.0)
    }

    fn document(&mut self, doc: &DocumentModel) {
        // 표지 이미지는 캡션 없이 제목 위에
        if let Some(drawing) = doc.cover().and_then(|cover| self.drawing(cover)) {
            self.paragraph(Some("Figure"), false, &drawing);
        }
        self.paragraph(Some("Title"), false, &run(doc.title(), false));
        if let Some(subtitle) = doc.subtitle() {
            self.paragraph(Some("Subtitle"), false, &run(subtitle, false));
        }

        for chapter in doc.chapters() {
            let mut page_break = true;
            if let Some(label) = &chapter.label {
                self.paragraph(Some("ChapterLabel"), true, &run(label, false));
                page_break = false;
            }
            self.paragraph(Some("Heading1"), page_break, &run(&chapter.heading, false));

            for paragraph in &chapter.paragraphs {
                self.block(classify(paragraph));
            }
            for image in &chapter.images {
                self.image(image);
            }
        }
    }

    fn document_xml(&self) -> String {
        let twips = |pt: f32| (pt * 20.0).round() as u32;
        format!(
            r#"{decl}
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{body}<w:sectPr><w:pgSz w:w="{pw}" w:h="{ph}"/><w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            decl = DECLARATION,
            body = self.body,
            pw = A4_WIDTH_TWIPS,
            ph = A4_HEIGHT_TWIPS,
            top = twips(self.settings.margin_top),
            right = twips(self.settings.margin_right),
            bottom = twips(self.settings.margin_bottom),
            left = twips(self.settings.margin_left),
        )
    }
}

fn run(text: &str, bold: bool) -> String {
    let props = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(
        r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        props,
        escape(text)
    )
}

fn styles_xml(settings: &PdfSettings) -> String {
    let font = escape(&settings.font_name);
    let half = |pt: f32| (pt * 2.0).round() as u32;
    let line = (settings.line_spacing * 240.0).round() as u32;

    let style = |id: &str, name: &str, ppr: &str, rpr: &str| {
        format!(
            r#"<w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr>{ppr}</w:pPr><w:rPr>{rpr}</w:rPr></w:style>"#,
        )
    };

    let mut styles = String::new();
    styles.push_str(&style(
        "Title",
        "Title",
        r#"<w:jc w:val="center"/><w:spacing w:before="2400" w:after="240"/>"#,
        &format!(r#"<w:b/><w:sz w:val="{}"/>"#, half(settings.heading_size * 1.75)),
    ));
    styles.push_str(&style(
        "Subtitle",
        "Subtitle",
        r#"<w:jc w:val="center"/><w:spacing w:after="480"/>"#,
        &format!(
            r#"<w:color w:val="737373"/><w:sz w:val="{}"/>"#,
            half(settings.subheading_size)
        ),
    ));
    styles.push_str(&style(
        "ChapterLabel",
        "Chapter Label",
        r#"<w:spacing w:after="60"/>"#,
        &format!(
            r#"<w:color w:val="295CBF"/><w:sz w:val="{}"/>"#,
            half(settings.font_size * 0.9)
        ),
    ));
    styles.push_str(&style(
        "Heading1",
        "heading 1",
        r#"<w:keepNext/><w:spacing w:after="240"/><w:outlineLvl w:val="0"/>"#,
        &format!(r#"<w:b/><w:sz w:val="{}"/>"#, half(settings.heading_size)),
    ));
    styles.push_str(&style(
        "Heading2",
        "heading 2",
        r#"<w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="1"/>"#,
        &format!(
            r#"<w:b/><w:color w:val="295CBF"/><w:sz w:val="{}"/>"#,
            half(settings.subheading_size)
        ),
    ));
    styles.push_str(&style(
        "ListBullet",
        "List Bullet",
        r#"<w:ind w:left="400" w:hanging="300"/>"#,
        "",
    ));
    styles.push_str(&style(
        "Callout",
        "Callout",
        r#"<w:pBdr><w:left w:val="single" w:sz="18" w:space="8" w:color="295CBF"/></w:pBdr><w:shd w:val="clear" w:color="auto" w:fill="F0F5FF"/><w:spacing w:before="120" w:after="120"/><w:ind w:left="200"/>"#,
        "",
    ));
    styles.push_str(&style("Figure", "Figure", r#"<w:jc w:val="center"/>"#, ""));
    styles.push_str(&style(
        "Caption",
        "caption",
        r#"<w:jc w:val="center"/>"#,
        r#"<w:i/><w:color w:val="737373"/>"#,
    ));

    format!(
        r#"{decl}
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:lang w:val="ko-KR" w:eastAsia="ko-KR"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120" w:line="{line}" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>{styles}</w:styles>"#,
        decl = DECLARATION,
        font = font,
        size = half(settings.font_size),
        line = line,
        styles = styles,
    )
}

fn content_types_xml() -> String {
    format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#,
        DECLARATION
    )
}

fn root_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        DECLARATION
    )
}

fn document_rels_xml(media: &[Media]) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    );
    for m in media {
        let _ = write!(
            rels,
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{}"/>"#,
            m.rel_id, m.file_name
        );
    }
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        DECLARATION, rels
    )
}

/// `docProps/core.xml`, shared with the PPTX encoder
pub(crate) fn core_props_xml(title: &str, options: &EncodeOptions) -> String {
    let created = options.timestamp().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"{decl}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>BookForge</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
        decl = DECLARATION,
        title = escape(title),
        created = created,
    )
}

/// `docProps/app.xml`, shared with the PPTX encoder
pub(crate) fn app_props_xml() -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>BookForge</Application></Properties>"#,
        DECLARATION
    )
}

impl Encoder for DocxEncoder {
    fn format(&self) -> FormatKind {
        FormatKind::Docx
    }

    fn encode(&self, doc: &DocumentModel, options: &EncodeOptions) -> Result<Vec<u8>> {
        let mut builder = DocxBuilder::new(&options.pdf);
        builder.document(doc);

        let mut pkg = Package::new(FormatKind::Docx);
        pkg.deflated("[Content_Types].xml", content_types_xml().as_bytes())?;
        pkg.deflated("_rels/.rels", root_rels_xml().as_bytes())?;
        pkg.deflated("docProps/core.xml", core_props_xml(doc.title(), options).as_bytes())?;
        pkg.deflated("docProps/app.xml", app_props_xml().as_bytes())?;
        pkg.deflated("word/document.xml", builder.document_xml().as_bytes())?;
        pkg.deflated("word/styles.xml", styles_xml(&options.pdf).as_bytes())?;
        pkg.deflated(
            "word/_rels/document.xml.rels",
            document_rels_xml(&builder.media).as_bytes(),
        )?;
        for media in &builder.media {
            pkg.deflated(&format!("word/media/{}", media.file_name), &media.data)?;
        }
        pkg.finish()
    }
}
