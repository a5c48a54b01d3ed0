//! Slide-deck encoder (PresentationML / .pptx)
//!
//! 슬라이드 구성:
//! 표지 → 목차 → 챕터마다 (인트로 → 소제목 섹션별 요약 → 이미지)

use super::docx::{app_props_xml, core_props_xml};
use super::Encoder;
use crate::container::Package;
use crate::format::{EncodeOptions, FormatKind};
use crate::image::ImageInfo;
use crate::markup::{classify, Block};
use crate::model::{Chapter, DocumentModel};
use crate::xml::{escape, DECLARATION};
use bookforge_foundation::Result;
use std::fmt::Write as _;

/// 16:9 slide size in EMU
const SLIDE_CX: u64 = 12_192_000;
const SLIDE_CY: u64 = 6_858_000;

const MAX_BULLETS: usize = 5;
const MAX_BULLET_CHARS: usize = 95;
const CONTENTS_PER_SLIDE: usize = 10;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// PPTX encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxEncoder;

// ============================================================================
// Slide model
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Slide {
    Cover {
        title: String,
        subtitle: Option<String>,
        art: Option<Vec<u8>>,
    },
    Contents {
        items: Vec<String>,
    },
    ChapterIntro {
        label: Option<String>,
        heading: String,
    },
    Section {
        title: String,
        bullets: Vec<String>,
    },
    Image {
        caption: String,
        data: Vec<u8>,
    },
}

/// Shorten to about `max` chars, cutting at a word boundary when possible
fn trim_bullet(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let cut = match cut.rfind(' ') {
        Some(at) if at > cut.len() / 2 => &cut[..at],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

fn section_slides(chapter: &Chapter) -> Vec<Slide> {
    let mut slides = Vec::new();
    let mut title = chapter.heading.clone();
    let mut bullets: Vec<String> = Vec::new();

    let mut flush = |title: &str, bullets: &mut Vec<String>| {
        if !bullets.is_empty() {
            slides.push(Slide::Section {
                title: title.to_string(),
                bullets: std::mem::take(bullets),
            });
        }
    };

    for paragraph in &chapter.paragraphs {
        match classify(paragraph) {
            Block::Subheading(text) => {
                flush(&title, &mut bullets);
                title = text.to_string();
            }
            block => {
                if bullets.len() < MAX_BULLETS {
                    let text = match block {
                        Block::Callout { label, text } => format!("{}: {}", label, text),
                        other => other.text().to_string(),
                    };
                    bullets.push(trim_bullet(&text, MAX_BULLET_CHARS));
                }
            }
        }
    }
    flush(&title, &mut bullets);
    slides
}

fn plan(doc: &DocumentModel) -> Vec<Slide> {
    let mut slides = vec![Slide::Cover {
        title: doc.title().to_string(),
        subtitle: doc.subtitle().map(str::to_string),
        art: doc.cover().map(|cover| cover.data.clone()),
    }];

    let items: Vec<String> = doc
        .chapters()
        .iter()
        .map(|c| match &c.label {
            Some(label) => format!("{}  {}", label, c.heading),
            None => c.heading.clone(),
        })
        .collect();
    for chunk in items.chunks(CONTENTS_PER_SLIDE) {
        slides.push(Slide::Contents {
            items: chunk.to_vec(),
        });
    }

    for chapter in doc.chapters() {
        slides.push(Slide::ChapterIntro {
            label: chapter.label.clone(),
            heading: chapter.heading.clone(),
        });
        slides.extend(section_slides(chapter));
        for image in &chapter.images {
            slides.push(Slide::Image {
                caption: image.alt.clone(),
                data: image.data.clone(),
            });
        }
    }
    slides
}

// ============================================================================
// XML
// ============================================================================

struct TextRun<'a> {
    text: &'a str,
    size_pt: u32,
    bold: bool,
    color: &'a str,
}

struct SlideWriter<'a> {
    font: &'a str,
    shapes: String,
    next_id: u32,
}

impl<'a> SlideWriter<'a> {
    fn new(font: &'a str) -> Self {
        Self {
            font,
            shapes: String::new(),
            next_id: 2,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn paragraph(&self, run: &TextRun<'_>, align: &str, bullet: bool) -> String {
        let ppr = if bullet {
            format!(
                r#"<a:pPr marL="342900" indent="-342900" algn="{}"><a:buFont typeface="Arial"/><a:buChar char="•"/></a:pPr>"#,
                align
            )
        } else {
            format!(r#"<a:pPr algn="{}"><a:buNone/></a:pPr>"#, align)
        };
        format!(
            r#"<a:p>{ppr}<a:r><a:rPr lang="ko-KR" sz="{sz}" b="{b}" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:latin typeface="{font}"/><a:ea typeface="{font}"/></a:rPr><a:t>{text}</a:t></a:r></a:p>"#,
            ppr = ppr,
            sz = run.size_pt * 100,
            b = u8::from(run.bold),
            color = run.color,
            font = self.font,
            text = escape(run.text),
        )
    }

    fn text_box(
        &mut self,
        name: &str,
        (x, y, cx, cy): (u64, u64, u64, u64),
        anchor: &str,
        fill: Option<&str>,
        paragraphs: &str,
    ) {
        let id = self.id();
        let fill = fill
            .map(|c| format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, c))
            .unwrap_or_else(|| "<a:noFill/>".to_string());
        let _ = write!(
            self.shapes,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>{fill}</p:spPr><p:txBody><a:bodyPr wrap="square" lIns="182880" rIns="182880" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        );
    }

    fn rect(&mut self, (x, y, cx, cy): (u64, u64, u64, u64), color: &str) {
        let id = self.id();
        let _ = write!(
            self.shapes,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Bar {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#,
        );
    }

    fn picture(&mut self, rel_id: &str, (x, y, cx, cy): (u64, u64, u64, u64)) {
        let id = self.id();
        let _ = write!(
            self.shapes,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        );
    }

    fn finish(self) -> String {
        format!(
            r#"{decl}
<p:sld {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            decl = DECLARATION,
            ns = NS,
            shapes = self.shapes,
        )
    }
}

const MARGIN: u64 = 609_600;
const INK: &str = "111827";
const MUTED: &str = "6B7280";
const ACCENT: &str = "295CBF";

/// Scale into `area` keeping the aspect ratio, centered
fn fit(info: &ImageInfo, (ax, ay, aw, ah): (u64, u64, u64, u64)) -> (u64, u64, u64, u64) {
    let scale = (aw as f64 / info.width as f64).min(ah as f64 / info.height as f64);
    let cx = (info.width as f64 * scale) as u64;
    let cy = (info.height as f64 * scale) as u64;
    let x = ax + (aw - cx.min(aw)) / 2;
    let y = ay + (ah - cy.min(ah)) / 2;
    (x, y, cx, cy)
}

/// Render one slide; returns slide XML and an optional image (extension, bytes)
fn render(slide: &Slide, font: &str, slide_no: usize) -> (String, Option<(String, Vec<u8>)>) {
    let mut w = SlideWriter::new(font);
    let full_width = SLIDE_CX - MARGIN * 2;
    let mut media = None;

    match slide {
        Slide::Cover {
            title,
            subtitle,
            art,
        } => {
            w.rect((0, 0, SLIDE_CX, 228_600), ACCENT);
            let mut title_area = (MARGIN, 1_828_800, full_width, 3_200_400);
            let info = art.as_deref().and_then(ImageInfo::inspect);
            if let (Some(data), Some(info)) = (art, info.filter(|i| i.width > 0 && i.height > 0)) {
                w.picture("rIdImg", fit(&info, (MARGIN, 457_200, full_width, 3_017_520)));
                media = Some((
                    format!("image{}.{}", slide_no, info.kind.extension()),
                    data.clone(),
                ));
                title_area = (MARGIN, 3_566_160, full_width, 2_651_760);
            }
            let mut paras = w.paragraph(
                &TextRun {
                    text: title,
                    size_pt: 40,
                    bold: true,
                    color: INK,
                },
                "ctr",
                false,
            );
            if let Some(subtitle) = subtitle {
                paras.push_str(&w.paragraph(
                    &TextRun {
                        text: subtitle,
                        size_pt: 22,
                        bold: false,
                        color: MUTED,
                    },
                    "ctr",
                    false,
                ));
            }
            w.text_box("Title", title_area, "ctr", None, &paras);
        }
        Slide::Contents { items } => {
            let title = w.paragraph(
                &TextRun {
                    text: "목차",
                    size_pt: 32,
                    bold: true,
                    color: INK,
                },
                "l",
                false,
            );
            w.text_box("Title", (MARGIN, 457_200, full_width, 914_400), "b", None, &title);
            let body: String = items
                .iter()
                .map(|item| {
                    w.paragraph(
                        &TextRun {
                            text: item,
                            size_pt: 18,
                            bold: false,
                            color: INK,
                        },
                        "l",
                        false,
                    )
                })
                .collect();
            w.text_box("Contents", (MARGIN, 1_554_480, full_width, 4_754_880), "t", None, &body);
        }
        Slide::ChapterIntro { label, heading } => {
            w.rect((0, 0, 228_600, SLIDE_CY), ACCENT);
            let mut paras = String::new();
            if let Some(label) = label {
                paras.push_str(&w.paragraph(
                    &TextRun {
                        text: label,
                        size_pt: 20,
                        bold: false,
                        color: ACCENT,
                    },
                    "l",
                    false,
                ));
            }
            paras.push_str(&w.paragraph(
                &TextRun {
                    text: heading,
                    size_pt: 36,
                    bold: true,
                    color: INK,
                },
                "l",
                false,
            ));
            w.text_box("Chapter", (MARGIN * 2, 2_286_000, full_width - MARGIN, 2_286_000), "ctr", None, &paras);
        }
        Slide::Section { title, bullets } => {
            let head = w.paragraph(
                &TextRun {
                    text: title,
                    size_pt: 28,
                    bold: true,
                    color: INK,
                },
                "l",
                false,
            );
            w.text_box("Title", (MARGIN, 365_760, full_width, 914_400), "b", None, &head);
            w.rect((MARGIN, 1_325_880, 1_219_200, 45_720), ACCENT);
            let body: String = bullets
                .iter()
                .map(|b| {
                    w.paragraph(
                        &TextRun {
                            text: b,
                            size_pt: 20,
                            bold: false,
                            color: INK,
                        },
                        "l",
                        true,
                    )
                })
                .collect();
            w.text_box("Body", (MARGIN, 1_600_200, full_width, 4_663_440), "t", None, &body);
        }
        Slide::Image { caption, data } => {
            let area = (MARGIN, 457_200, full_width, 5_212_080);
            match ImageInfo::inspect(data) {
                Some(info) if info.width > 0 && info.height > 0 => {
                    w.picture("rIdImg", fit(&info, area));
                    media = Some((
                        format!("image{}.{}", slide_no, info.kind.extension()),
                        data.clone(),
                    ));
                }
                _ => {
                    let text = format!("[이미지: {}]", caption);
                    let para = w.paragraph(
                        &TextRun {
                            text: &text,
                            size_pt: 20,
                            bold: false,
                            color: MUTED,
                        },
                        "ctr",
                        false,
                    );
                    w.text_box("Placeholder", area, "ctr", None, &para);
                }
            }
            if !caption.trim().is_empty() {
                let para = w.paragraph(
                    &TextRun {
                        text: caption.trim(),
                        size_pt: 16,
                        bold: false,
                        color: MUTED,
                    },
                    "ctr",
                    false,
                );
                w.text_box("Caption", (MARGIN, 5_852_160, full_width, 548_640), "t", None, &para);
            }
        }
    }

    (w.finish(), media)
}

fn slide_rels_xml(media_name: Option<&str>) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    );
    if let Some(name) = media_name {
        let _ = write!(
            rels,
            r#"<Relationship Id="rIdImg" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
            name
        );
    }
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        DECLARATION, rels
    )
}

fn content_types_xml(slide_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=slide_count {
        let _ = write!(
            overrides,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i
        );
    }
    format!(
        r#"{}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{}<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#,
        DECLARATION, overrides
    )
}

fn root_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        DECLARATION
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let mut ids = String::new();
    for i in 0..slide_count {
        let _ = write!(ids, r#"<p:sldId id="{}" r:id="rIdSlide{}"/>"#, 256 + i, i + 1);
    }
    format!(
        r#"{decl}
<p:presentation {ns} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rIdMaster"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        decl = DECLARATION,
        ns = NS,
        ids = ids,
        cx = SLIDE_CX,
        cy = SLIDE_CY,
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rIdMaster" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rIdTheme" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#,
    );
    for i in 1..=slide_count {
        let _ = write!(
            rels,
            r#"<Relationship Id="rIdSlide{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#,
        );
    }
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        DECLARATION, rels
    )
}

const EMPTY_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#;

fn slide_master_xml() -> String {
    format!(
        r#"{decl}
<p:sldMaster {ns}><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{tree}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        decl = DECLARATION,
        ns = NS,
        tree = EMPTY_TREE,
    )
}

fn slide_master_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#,
        DECLARATION
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{decl}
<p:sldLayout {ns} type="blank" preserve="1"><p:cSld name="Blank">{tree}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        decl = DECLARATION,
        ns = NS,
        tree = EMPTY_TREE,
    )
}

fn slide_layout_rels_xml() -> String {
    format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#,
        DECLARATION
    )
}

fn theme_xml(font: &str) -> String {
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let font = escape(font);
    format!(
        r#"{decl}
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="BookForge"><a:themeElements><a:clrScheme name="BookForge"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F2937"/></a:dk2><a:lt2><a:srgbClr val="F3F4F6"/></a:lt2><a:accent1><a:srgbClr val="295CBF"/></a:accent1><a:accent2><a:srgbClr val="F59E0B"/></a:accent2><a:accent3><a:srgbClr val="10B981"/></a:accent3><a:accent4><a:srgbClr val="EF4444"/></a:accent4><a:accent5><a:srgbClr val="8B5CF6"/></a:accent5><a:accent6><a:srgbClr val="6B7280"/></a:accent6><a:hlink><a:srgbClr val="2563EB"/></a:hlink><a:folHlink><a:srgbClr val="7C3AED"/></a:folHlink></a:clrScheme><a:fontScheme name="BookForge"><a:majorFont><a:latin typeface="{font}"/><a:ea typeface="{font}"/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{font}"/><a:ea typeface="{font}"/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="BookForge"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        decl = DECLARATION,
    )
}

impl Encoder for PptxEncoder {
    fn format(&self) -> FormatKind {
        FormatKind::Pptx
    }

    fn encode(&self, doc: &DocumentModel, options: &EncodeOptions) -> Result<Vec<u8>> {
        let font = escape(&options.pdf.font_name);
        let slides = plan(doc);
        let count = slides.len();

        let mut pkg = Package::new(FormatKind::Pptx);
        pkg.deflated("[Content_Types].xml", content_types_xml(count).as_bytes())?;
        pkg.deflated("_rels/.rels", root_rels_xml().as_bytes())?;
        pkg.deflated("docProps/core.xml", core_props_xml(doc.title(), options).as_bytes())?;
        pkg.deflated("docProps/app.xml", app_props_xml().as_bytes())?;
        pkg.deflated("ppt/presentation.xml", presentation_xml(count).as_bytes())?;
        pkg.deflated(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(count).as_bytes(),
        )?;
        pkg.deflated("ppt/slideMasters/slideMaster1.xml", slide_master_xml().as_bytes())?;
        pkg.deflated(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            slide_master_rels_xml().as_bytes(),
        )?;
        pkg.deflated("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml().as_bytes())?;
        pkg.deflated(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            slide_layout_rels_xml().as_bytes(),
        )?;
        pkg.deflated("ppt/theme/theme1.xml", theme_xml(&options.pdf.font_name).as_bytes())?;

        let mut media = Vec::new();
        for (i, slide) in slides.iter().enumerate() {
            let number = i + 1;
            let (xml, image) = render(slide, &font, number);
            pkg.deflated(&format!("ppt/slides/slide{}.xml", number), xml.as_bytes())?;
            pkg.deflated(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                slide_rels_xml(image.as_ref().map(|(name, _)| name.as_str())).as_bytes(),
            )?;
            if let Some(image) = image {
                media.push(image);
            }
        }
        for (name, data) in &media {
            pkg.deflated(&format!("ppt/media/{}", name), data)?;
        }

        pkg.finish()
    }
}
