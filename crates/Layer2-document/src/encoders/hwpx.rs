//! Hangul word-processor encoder (OWPML / .hwpx)
//!
//! 한컴오피스가 여는 최소 패키지 구성:
//! `mimetype`(STORED, 첫 엔트리) → META-INF/container.xml → version.xml →
//! settings.xml → Contents/content.hpf → Contents/header.xml →
//! Contents/section0.xml → Preview/PrvText.txt
//!
//! 단위는 HWPUNIT (1pt = 100).

use super::Encoder;
use crate::container::Package;
use crate::format::{EncodeOptions, FormatKind};
use crate::markup::{classify, Block};
use crate::model::DocumentModel;
use crate::xml::escape;
use bookforge_foundation::{PdfSettings, Result};
use std::fmt::Write as _;

const MIMETYPE: &str = "application/hwp+zip";

/// A4 portrait in HWPUNIT
const PAGE_WIDTH: u32 = 59528;
const PAGE_HEIGHT: u32 = 84186;

/// header / footer margin (15mm)
const HEADER_MARGIN: u32 = 4252;

const PREVIEW_CHARS: usize = 500;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_ALL: &str = concat!(
    r#" xmlns:ha="http://www.hancom.co.kr/hwpml/2011/app""#,
    r#" xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph""#,
    r#" xmlns:hp10="http://www.hancom.co.kr/hwpml/2016/paragraph""#,
    r#" xmlns:hs="http://www.hancom.co.kr/hwpml/2011/section""#,
    r#" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core""#,
    r#" xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head""#,
    r#" xmlns:hhs="http://www.hancom.co.kr/hwpml/2011/history""#,
    r#" xmlns:hm="http://www.hancom.co.kr/hwpml/2011/master-page""#,
    r#" xmlns:hpf="http://www.hancom.co.kr/schema/2011/hpf""#,
    r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:opf="http://www.idpf.org/2007/opf/""#,
    r#" xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0""#,
);

/// HWPX encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct HwpxEncoder;

// ============================================================================
// Paragraph kinds
// ============================================================================

/// (paraPr, charPr, style) triple declared in header.xml
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Para {
    Body,
    H1,
    H2,
    Label,
    Bold,
    Toc,
    Bullet,
    Empty,
}

impl Para {
    fn refs(self) -> (u8, u8, u8) {
        match self {
            Para::Body => (0, 0, 1),
            Para::H1 => (1, 1, 2),
            Para::H2 => (2, 2, 3),
            Para::Label => (0, 3, 0),
            Para::Bold => (0, 4, 1),
            Para::Toc => (3, 5, 4),
            Para::Bullet => (4, 0, 5),
            Para::Empty => (0, 0, 0),
        }
    }
}

// ============================================================================
// Section builder
// ============================================================================

struct SectionBuilder {
    next_id: u32,
    body: String,
    plain: String,
}

impl SectionBuilder {
    fn new() -> Self {
        Self {
            // 0번은 secPr 문단
            next_id: 1,
            body: String::new(),
            plain: String::new(),
        }
    }

    fn para(&mut self, kind: Para, text: &str, page_break: bool) {
        let (para_pr, char_pr, style) = kind.refs();
        let id = self.next_id;
        self.next_id += 1;

        let _ = write!(
            self.body,
            r#"<hp:p id="{}" paraPrIDRef="{}" styleIDRef="{}" pageBreak="{}" columnBreak="0" merged="0">"#,
            id,
            para_pr,
            style,
            u8::from(page_break)
        );
        if text.is_empty() {
            let _ = write!(self.body, r#"<hp:run charPrIDRef="{}"/>"#, char_pr);
        } else {
            let _ = write!(
                self.body,
                r#"<hp:run charPrIDRef="{}"><hp:t>{}</hp:t></hp:run>"#,
                char_pr,
                escape(text)
            );
            self.plain.push_str(text);
        }
        self.body.push_str("</hp:p>");
        self.plain.push('\n');
    }

    fn block(&mut self, block: Block<'_>) {
        match block {
            Block::Subheading(text) => self.para(Para::H2, text, false),
            Block::Callout { label, text } => {
                self.para(Para::Bold, &format!("[ {} ]", label), false);
                if !text.is_empty() {
                    self.para(Para::Body, text, false);
                }
            }
            Block::Bullet(text) => self.para(Para::Bullet, &format!("• {}", text), false),
            Block::Numbered { n, text } => {
                self.para(Para::Bullet, &format!("{}. {}", n, text), false)
            }
            Block::Text(text) => self.para(Para::Body, text, false),
        }
    }

    fn document(&mut self, doc: &DocumentModel) {
        // cover
        if let Some(cover) = doc.cover() {
            self.para(Para::Label, &format!("[표지 이미지: {}]", cover.alt), false);
        }
        self.para(Para::H1, doc.title(), false);
        if let Some(subtitle) = doc.subtitle() {
            self.para(Para::H2, subtitle, false);
        }
        self.para(Para::Empty, "", false);

        // contents
        self.para(Para::H1, "목  차", true);
        for (i, chapter) in doc.chapters().iter().enumerate() {
            let line = match &chapter.label {
                Some(label) => format!("[{}]  CHAPTER {}  {}", label, i + 1, chapter.heading),
                None => format!("CHAPTER {}  {}", i + 1, chapter.heading),
            };
            self.para(Para::Toc, &line, false);
        }
        self.para(Para::Empty, "", false);

        for (i, chapter) in doc.chapters().iter().enumerate() {
            self.para(Para::H1, &chapter.heading, true);
            let label = match &chapter.label {
                Some(label) => format!("CHAPTER {}  ·  {}", i + 1, label),
                None => format!("CHAPTER {}", i + 1),
            };
            self.para(Para::Label, &label, false);
            self.para(Para::Empty, "", false);

            for paragraph in &chapter.paragraphs {
                self.block(classify(paragraph));
            }
            for image in &chapter.images {
                self.para(Para::Label, &format!("[이미지: {}]", image.alt), false);
            }
        }
    }

    fn preview(&self) -> String {
        self.plain.chars().take(PREVIEW_CHARS).collect()
    }

    fn section_xml(&self, settings: &PdfSettings) -> String {
        format!(
            r#"{decl}
<hs:sec{ns}><hp:p id="0" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0">{sec_pr}<hp:ctrl><hp:colPr id="0" type="NEWSPAPER" layout="LEFT" colCount="1" sameSz="1" sameGap="0"/></hp:ctrl></hp:run><hp:run charPrIDRef="0"><hp:t/></hp:run></hp:p>{body}</hs:sec>"#,
            decl = XML_DECL,
            ns = NS_ALL,
            sec_pr = sec_pr(settings),
            body = self.body,
        )
    }
}

fn hwpunit(pt: f32) -> u32 {
    (pt.max(0.0) * 100.0).round() as u32
}

fn sec_pr(settings: &PdfSettings) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<hp:secPr id="0" textDirection="HORIZONTAL" spaceColumns="1134" tabStop="8000" tabStopVal="4000" tabStopUnit="HWPUNIT" outlineShapeIDRef="0" memoShapeIDRef="0" textVerticalWidthHead="0" masterPageCnt="0">"#);
    xml.push_str(r#"<hp:grid lineGrid="0" charGrid="0" wonggojiFormat="0"/>"#);
    xml.push_str(r#"<hp:startNum pageStartsOn="BOTH" page="0" pic="0" tbl="0" equation="0"/>"#);
    xml.push_str(r#"<hp:visibility hideFirstHeader="0" hideFirstFooter="0" hideFirstMasterPage="0" border="SHOW_ALL" fill="SHOW_ALL" hideFirstPageNum="0" hideFirstEmptyLine="0" showLineNumber="0"/>"#);
    xml.push_str(r#"<hp:lineNumberShape restartType="0" countBy="0" distance="0" startNumber="0"/>"#);
    let _ = write!(
        xml,
        r#"<hp:pagePr landscape="WIDELY" width="{}" height="{}" gutterType="LEFT_ONLY"><hp:margin header="{hm}" footer="{hm}" gutter="0" left="{}" right="{}" top="{}" bottom="{}"/></hp:pagePr>"#,
        PAGE_WIDTH,
        PAGE_HEIGHT,
        hwpunit(settings.margin_left),
        hwpunit(settings.margin_right),
        hwpunit(settings.margin_top),
        hwpunit(settings.margin_bottom),
        hm = HEADER_MARGIN,
    );
    for (tag, length, between, place) in [
        ("footNotePr", "-1", "283", "EACH_COLUMN"),
        ("endNotePr", "14692344", "0", "END_OF_DOCUMENT"),
    ] {
        let _ = write!(
            xml,
            r##"<hp:{tag}><hp:autoNumFormat type="DIGIT" userChar="" prefixChar="" suffixChar=")" supscript="0"/><hp:noteLine length="{length}" type="SOLID" width="0.12 mm" color="#000000"/><hp:noteSpacing betweenNotes="{between}" belowLine="567" aboveLine="850"/><hp:numbering type="CONTINUOUS" newNum="1"/><hp:placement place="{place}" beneathText="0"/></hp:{tag}>"##,
        );
    }
    for kind in ["BOTH", "EVEN", "ODD"] {
        let _ = write!(
            xml,
            r#"<hp:pageBorderFill type="{}" borderFillIDRef="0" textBorder="PAPER" headerInside="0" footerInside="0" fillArea="PAPER"><hp:offset left="1417" right="1417" top="1417" bottom="1417"/></hp:pageBorderFill>"#,
            kind
        );
    }
    xml.push_str("</hp:secPr>");
    xml
}

// ============================================================================
// Package parts
// ============================================================================

fn container_xml() -> String {
    format!(
        r#"{}
<ocf:container xmlns:ocf="urn:oasis:names:tc:opendocument:xmlns:container" xmlns:hpf="http://www.hancom.co.kr/schema/2011/hpf"><ocf:rootfiles><ocf:rootfile full-path="Contents/content.hpf" media-type="application/hwpml-package+xml"/><ocf:rootfile full-path="Preview/PrvText.txt" media-type="text/plain"/></ocf:rootfiles></ocf:container>"#,
        XML_DECL
    )
}

fn version_xml() -> String {
    format!(
        r#"{}
<hv:HCFVersion xmlns:hv="http://www.hancom.co.kr/hwpml/2011/version" tagetApplication="WORDPROCESSOR" major="5" minor="1" micro="1" buildNumber="0" os="1" xmlVersion="1.5" application="Hancom Office Hangul" appVersion="13, 0, 0, 1408"/>"#,
        XML_DECL
    )
}

fn settings_xml() -> String {
    format!(
        r#"{}
<ha:HWPApplicationSetting xmlns:ha="http://www.hancom.co.kr/hwpml/2011/app" xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0"><ha:CaretPosition listIDRef="0" paraIDRef="0" pos="0"/></ha:HWPApplicationSetting>"#,
        XML_DECL
    )
}

fn content_hpf(doc: &DocumentModel, options: &EncodeOptions) -> String {
    let stamp = options.timestamp().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"{decl}
<opf:package{ns} version="" unique-identifier="" id=""><opf:metadata><opf:title>{title}</opf:title><opf:language>ko</opf:language><opf:meta name="creator" content="text">BookForge</opf:meta><opf:meta name="description" content="text">{subtitle}</opf:meta><opf:meta name="CreatedDate" content="text">{stamp}</opf:meta><opf:meta name="ModifiedDate" content="text">{stamp}</opf:meta></opf:metadata><opf:manifest><opf:item id="header" href="Contents/header.xml" media-type="application/xml"/><opf:item id="section0" href="Contents/section0.xml" media-type="application/xml"/><opf:item id="settings" href="settings.xml" media-type="application/xml"/></opf:manifest><opf:spine><opf:itemref idref="header" linear="yes"/><opf:itemref idref="section0" linear="yes"/></opf:spine></opf:package>"#,
        decl = XML_DECL,
        ns = NS_ALL,
        title = escape(doc.title()),
        subtitle = escape(doc.subtitle().unwrap_or_default()),
        stamp = stamp,
    )
}

/// 언어별 글꼴 목록
const FONT_FACES: [(&str, &[&str]); 7] = [
    ("HANGUL", &["함초롬돋움", "함초롬바탕", "맑은 고딕"]),
    ("LATIN", &["Arial", "Times New Roman"]),
    ("HANJA", &["함초롬돋움", "함초롬바탕"]),
    ("JAPANESE", &["함초롬돋움", "함초롬바탕"]),
    ("OTHER", &["함초롬돋움"]),
    ("SYMBOL", &["함초롬돋움"]),
    ("USER", &["함초롬돋움"]),
];

fn fontfaces_xml() -> String {
    let mut xml = format!(r#"<hh:fontfaces itemCnt="{}">"#, FONT_FACES.len());
    for (lang, fonts) in FONT_FACES {
        let _ = write!(xml, r#"<hh:fontface lang="{}" fontCnt="{}">"#, lang, fonts.len());
        for (id, face) in fonts.iter().enumerate() {
            let _ = write!(
                xml,
                r#"<hh:font id="{}" face="{}" type="TTF" isEmbedded="0"><hh:typeInfo familyType="FCAT_GOTHIC" weight="6" proportion="4" contrast="0" strokeVariation="1" armStyle="1" letterform="1" midline="1" xHeight="1"/></hh:font>"#,
                id, face
            );
        }
        xml.push_str("</hh:fontface>");
    }
    xml.push_str("</hh:fontfaces>");
    xml
}

fn border_fills_xml() -> String {
    let mut xml = String::from(r#"<hh:borderFills itemCnt="2">"#);
    for id in 1..=2 {
        let _ = write!(
            xml,
            r##"<hh:borderFill id="{}" threeD="0" shadow="0" centerLine="NONE" breakCellSeparateLine="0"><hh:slash type="NONE" Crooked="0" isCounter="0"/><hh:backSlash type="NONE" Crooked="0" isCounter="0"/><hh:leftBorder type="NONE" width="0.1 mm" color="#000000"/><hh:rightBorder type="NONE" width="0.1 mm" color="#000000"/><hh:topBorder type="NONE" width="0.1 mm" color="#000000"/><hh:bottomBorder type="NONE" width="0.1 mm" color="#000000"/><hh:diagonal type="SOLID" width="0.1 mm" color="#000000"/></hh:borderFill>"##,
            id
        );
    }
    xml.push_str("</hh:borderFills>");
    xml
}

/// (height, color, hangul font ref, bold)
fn char_props(settings: &PdfSettings) -> [(u32, &'static str, u8, bool); 6] {
    let body = hwpunit(settings.font_size);
    let small = hwpunit((settings.font_size - 1.5).max(8.0));
    [
        (body, "#000000", 0, false),
        (hwpunit(settings.heading_size), "#1A1A2E", 2, true),
        (hwpunit(settings.subheading_size), "#1A1A2E", 2, true),
        (small, "#646464", 0, false),
        (body, "#000000", 0, true),
        (body, "#000000", 0, false),
    ]
}

fn char_properties_xml(settings: &PdfSettings) -> String {
    let props = char_props(settings);
    let mut xml = format!(r#"<hh:charProperties itemCnt="{}">"#, props.len());
    for (id, (height, color, font, bold)) in props.iter().enumerate() {
        let _ = write!(
            xml,
            r##"<hh:charPr id="{id}" height="{height}" textColor="{color}" shadeColor="#FFFFFF" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="1"><hh:fontRef hangul="{font}" latin="0" hanja="0" japanese="0" other="0" symbol="0" user="0"/><hh:ratio hangul="100" latin="100" hanja="100" japanese="100" other="100" symbol="100" user="100"/><hh:spacing hangul="0" latin="0" hanja="0" japanese="0" other="0" symbol="0" user="0"/><hh:relSz hangul="100" latin="100" hanja="100" japanese="100" other="100" symbol="100" user="100"/><hh:offset hangul="0" latin="0" hanja="0" japanese="0" other="0" symbol="0" user="0"/>{bold}</hh:charPr>"##,
            bold = if *bold { "<hh:bold/>" } else { "" },
        );
    }
    xml.push_str("</hh:charProperties>");
    xml
}

/// (left, prev, next, indent, tabPr)
const PARA_PROPS: [(i32, i32, i32, i32, u8); 5] = [
    (0, 0, 200, 0, 0),
    (0, 1000, 600, 0, 1),
    (0, 600, 300, 0, 0),
    (0, 0, 100, 0, 0),
    (400, 0, 100, -400, 0),
];

fn para_properties_xml(settings: &PdfSettings) -> String {
    let line_spacing = (settings.line_spacing * 100.0).round() as u32;
    let mut xml = format!(r#"<hh:paraProperties itemCnt="{}">"#, PARA_PROPS.len());
    for (id, (left, prev, next, indent, tab)) in PARA_PROPS.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<hh:paraPr id="{id}" tabPrIDRef="{tab}" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0"><hh:align horizontal="JUSTIFY" vertical="BASELINE"/><hh:heading type="NONE" idRef="0" level="0"/><hh:breakSetting breakLatinWord="KEEP_WORD" breakNonLatinWord="KEEP_WORD" widowOrphan="0" keepWithNext="0" keepLines="0" pageBreakBefore="0" lineWrap="BREAK"/><hh:autoSpacing eAsianEng="0" eAsianNum="0"/><hh:lineSpacing type="PERCENT" value="{line_spacing}" unit="HWPUNIT"/><hh:margin><hc:left value="{left}" unit="HWPUNIT"/><hc:right value="0" unit="HWPUNIT"/><hc:prev value="{prev}" unit="HWPUNIT"/><hc:next value="{next}" unit="HWPUNIT"/><hc:indent value="{indent}" unit="HWPUNIT"/></hh:margin><hh:border borderFillIDRef="1" offsetLeft="0" offsetRight="0" offsetTop="0" offsetBottom="0"/></hh:paraPr>"#,
        );
    }
    xml.push_str("</hh:paraProperties>");
    xml
}

/// (name, engName, paraPr, charPr, next)
const STYLES: [(&str, &str, u8, u8, u8); 6] = [
    ("바탕글", "Normal", 0, 0, 0),
    ("본문", "Body", 0, 0, 1),
    ("개요 1", "Outline 1", 1, 1, 0),
    ("개요 2", "Outline 2", 2, 2, 1),
    ("목차", "TOC", 3, 5, 4),
    ("목록 들여쓰기", "List Indent", 4, 0, 5),
];

fn styles_xml() -> String {
    let mut xml = format!(r#"<hh:styles itemCnt="{}">"#, STYLES.len());
    for (id, (name, eng, para, char_pr, next)) in STYLES.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<hh:style id="{id}" type="PARA" name="{name}" engName="{eng}" paraPrIDRef="{para}" charPrIDRef="{char_pr}" nextStyleIDRef="{next}" langID="1042" lockForm="0"/>"#,
        );
    }
    xml.push_str("</hh:styles>");
    xml
}

fn header_xml(settings: &PdfSettings) -> String {
    format!(
        r#"{decl}
<hh:head{ns} version="1.5" secCnt="1"><hh:beginNum page="1" footnote="1" endnote="1" pic="1" tbl="1" equation="1"/><hh:refList>{fonts}{borders}{chars}<hh:tabProperties itemCnt="2"><hh:tabPr id="0" autoTabLeft="0" autoTabRight="0"/><hh:tabPr id="1" autoTabLeft="1" autoTabRight="0"/></hh:tabProperties><hh:numberings itemCnt="1"><hh:numbering id="1" start="0"><hh:paraHead start="1" level="1" align="LEFT" useInstWidth="1" autoIndent="1" widthAdjust="0" textOffsetType="PERCENT" textOffset="50" numFormat="DIGIT" charPrIDRef="4294967295" checkable="0">^1.</hh:paraHead></hh:numbering></hh:numberings>{paras}{styles}</hh:refList></hh:head>"#,
        decl = XML_DECL,
        ns = NS_ALL,
        fonts = fontfaces_xml(),
        borders = border_fills_xml(),
        chars = char_properties_xml(settings),
        paras = para_properties_xml(settings),
        styles = styles_xml(),
    )
}

impl Encoder for HwpxEncoder {
    fn format(&self) -> FormatKind {
        FormatKind::Hwpx
    }

    fn encode(&self, doc: &DocumentModel, options: &EncodeOptions) -> Result<Vec<u8>> {
        let mut section = SectionBuilder::new();
        section.document(doc);

        let mut pkg = Package::new(FormatKind::Hwpx);
        pkg.stored("mimetype", MIMETYPE.as_bytes())?;
        pkg.deflated("META-INF/container.xml", container_xml().as_bytes())?;
        pkg.deflated("version.xml", version_xml().as_bytes())?;
        pkg.deflated("settings.xml", settings_xml().as_bytes())?;
        pkg.deflated("Contents/content.hpf", content_hpf(doc, options).as_bytes())?;
        pkg.deflated("Contents/header.xml", header_xml(&options.pdf).as_bytes())?;
        pkg.deflated(
            "Contents/section0.xml",
            section.section_xml(&options.pdf).as_bytes(),
        )?;
        pkg.deflated("Preview/PrvText.txt", section.preview().as_bytes())?;
        pkg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, ImageRef};
    use std::io::{Cursor, Read};

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    fn doc() -> DocumentModel {
        DocumentModel::builder("한글 & 책")
            .subtitle("부제")
            .chapter(
                Chapter::new("첫 장")
                    .label("준비")
                    .paragraph("== 소제목 ==")
                    .paragraph("[핵심] 내용")
                    .paragraph("- 항목")
                    .paragraph("2) 둘째")
                    .image(ImageRef::new("도표", vec![1, 2, 3])),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_entry_order() {
        let bytes = HwpxEncoder.encode(&doc(), &EncodeOptions::default()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "mimetype",
                "META-INF/container.xml",
                "version.xml",
                "settings.xml",
                "Contents/content.hpf",
                "Contents/header.xml",
                "Contents/section0.xml",
                "Preview/PrvText.txt",
            ]
        );
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            zip::CompressionMethod::Stored
        );
    }

    #[test]
    fn test_section_paragraphs() {
        let bytes = HwpxEncoder.encode(&doc(), &EncodeOptions::default()).unwrap();
        let xml = read_entry(&bytes, "Contents/section0.xml");

        assert!(xml.contains(r#"width="59528" height="84186""#));
        assert!(xml.contains(r#"left="6000" right="6000" top="7200" bottom="7200""#));
        assert!(xml.contains("<hp:colPr"));
        assert!(xml.contains("한글 &amp; 책"));
        assert!(xml.contains(
            r#"paraPrIDRef="1" styleIDRef="2" pageBreak="1" columnBreak="0" merged="0"><hp:run charPrIDRef="1"><hp:t>첫 장</hp:t>"#
        ));
        assert!(xml.contains("[ 핵심 ]"));
        assert!(xml.contains("• 항목"));
        assert!(xml.contains("2. 둘째"));
        assert!(xml.contains("[이미지: 도표]"));
    }

    #[test]
    fn test_header_sizes_follow_settings() {
        let bytes = HwpxEncoder.encode(&doc(), &EncodeOptions::default()).unwrap();
        let xml = read_entry(&bytes, "Contents/header.xml");
        assert!(xml.contains(r#"<hh:charPr id="0" height="1100""#));
        assert!(xml.contains(r#"<hh:charPr id="1" height="1600""#));
        assert!(xml.contains(r#"<hh:lineSpacing type="PERCENT" value="160""#));
        assert!(xml.contains(r#"<hh:styles itemCnt="6">"#));
    }

    #[test]
    fn test_preview_is_plain_and_bounded() {
        let long = "가".repeat(800);
        let doc = DocumentModel::builder("t")
            .chapter(Chapter::new("c").paragraph(long))
            .build()
            .unwrap();
        let bytes = HwpxEncoder.encode(&doc, &EncodeOptions::default()).unwrap();
        let preview = read_entry(&bytes, "Preview/PrvText.txt");
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
        assert!(!preview.contains('<'));
        assert!(preview.starts_with("t\n"));
    }

    #[test]
    fn test_cover_noted_before_title() {
        let doc = DocumentModel::builder("표지 책")
            .cover(ImageRef::new("푸른 표지", vec![9, 9]))
            .chapter(Chapter::new("첫 장").paragraph("본문"))
            .build()
            .unwrap();
        let bytes = HwpxEncoder.encode(&doc, &EncodeOptions::default()).unwrap();
        let xml = read_entry(&bytes, "Contents/section0.xml");

        let note = xml.find("[표지 이미지: 푸른 표지]").unwrap();
        assert!(note < xml.find("표지 책").unwrap());
    }
}
