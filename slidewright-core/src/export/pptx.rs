//! PPTX package writer.
//!
//! Produces a minimal OOXML presentation: one master, one blank layout, one
//! theme, and one slide part per [`Slide`]. Positions are given in inches
//! and converted to EMUs (914400 per inch).

use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{SlidewrightError, SlidewrightResult};
use crate::models::Slide;

use super::{ExportArtifact, ExportSettings, PPTX_CONTENT_TYPE};

pub const EMU_PER_INCH: f64 = 914_400.0;
/// 10 inches.
pub const SLIDE_WIDTH_EMU: i64 = 9_144_000;
/// 7.5 inches.
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

const BACKGROUND_COLOR: &str = "1A1A2E";
const TITLE_COLOR: &str = "FFFFFF";
const BODY_COLOR: &str = "E0E0E0";
const FOOTER_COLOR: &str = "888888";
const FONT_FACE: &str = "Arial";

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

const TITLE_FRAME: Frame = Frame { x: 0.5, y: 0.5, w: 9.0, h: 1.0 };
const BODY_FRAME: Frame = Frame { x: 0.5, y: 1.8, w: 9.0, h: 5.0 };
const BODY_BESIDE_IMAGE_FRAME: Frame = Frame { x: 0.5, y: 1.8, w: 4.8, h: 5.0 };
const IMAGE_FRAME: Frame = Frame { x: 5.5, y: 1.8, w: 4.0, h: 5.0 };
const FOOTER_FRAME: Frame = Frame { x: 0.5, y: 7.0, w: 9.0, h: 0.4 };

pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// Split a `data:<mime>;base64,<payload>` URI and decode the payload.
pub fn decode_data_uri(uri: &str) -> SlidewrightResult<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SlidewrightError::InvalidDataUri("missing 'data:' scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SlidewrightError::InvalidDataUri("missing ',' separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| SlidewrightError::InvalidDataUri("payload is not base64".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| SlidewrightError::InvalidDataUri(e.to_string()))?;

    Ok((mime.to_string(), bytes))
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

struct EmbeddedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

struct TextStyle<'a> {
    size_hundredths: u32,
    bold: bool,
    color: &'a str,
    font: Option<&'a str>,
    align: Option<&'a str>,
    anchor: &'a str,
}

/// Writes decks as PPTX packages.
pub struct PptxWriter {
    footer_text: String,
}

impl PptxWriter {
    pub fn new(footer_text: impl Into<String>) -> Self {
        Self {
            footer_text: footer_text.into(),
        }
    }

    pub fn write(&self, slides: &[Slide]) -> SlidewrightResult<Vec<u8>> {
        let images: Vec<Option<EmbeddedImage>> = slides
            .iter()
            .enumerate()
            .map(|(index, slide)| embeddable_image(index, slide))
            .collect();

        let mut package = ZipWriter::new(Cursor::new(Vec::new()));

        let mut add = |path: &str, content: &[u8]| -> SlidewrightResult<()> {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            package.start_file(path, options)?;
            package.write_all(content)?;
            Ok(())
        };

        add("[Content_Types].xml", content_types_xml(slides.len()).as_bytes())?;
        add("_rels/.rels", root_rels_xml().as_bytes())?;
        add("docProps/core.xml", core_props_xml().as_bytes())?;
        add("docProps/app.xml", app_props_xml(slides.len()).as_bytes())?;
        add("ppt/presentation.xml", presentation_xml(slides.len()).as_bytes())?;
        add(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(slides.len()).as_bytes(),
        )?;
        add("ppt/slideMasters/slideMaster1.xml", slide_master_xml().as_bytes())?;
        add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            slide_master_rels_xml().as_bytes(),
        )?;
        add("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml().as_bytes())?;
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            slide_layout_rels_xml().as_bytes(),
        )?;
        add("ppt/theme/theme1.xml", theme_xml().as_bytes())?;

        for (index, (slide, image)) in slides.iter().zip(images.iter()).enumerate() {
            let number = index + 1;
            let image_target = image
                .as_ref()
                .map(|img| format!("image{}.{}", number, img.format.extension()));

            add(
                &format!("ppt/slides/slide{}.xml", number),
                self.slide_xml(slide, image.is_some()).as_bytes(),
            )?;
            add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                slide_rels_xml(image_target.as_deref()).as_bytes(),
            )?;

            if let (Some(img), Some(target)) = (image, image_target) {
                add(&format!("ppt/media/{}", target), &img.bytes)?;
            }
        }

        let cursor = package.finish()?;
        let bytes = cursor.into_inner();
        debug!("Wrote PPTX package with {} slides ({} bytes)", slides.len(), bytes.len());
        Ok(bytes)
    }

    fn slide_xml(&self, slide: &Slide, has_image: bool) -> String {
        let mut xml = String::with_capacity(4096);
        xml.push_str(XML_DECL);
        let _ = write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            NS_A, NS_R, NS_P
        );
        xml.push_str("<p:cSld>");
        let _ = write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            BACKGROUND_COLOR
        );
        xml.push_str("<p:spTree>");
        push_group_properties(&mut xml);

        let mut shape_id = 2;

        if slide.layout.has_title() {
            push_text_shape(
                &mut xml,
                shape_id,
                "Title",
                TITLE_FRAME,
                &slide.title,
                &TextStyle {
                    size_hundredths: 4400,
                    bold: true,
                    color: TITLE_COLOR,
                    font: Some(FONT_FACE),
                    align: None,
                    anchor: "ctr",
                },
            );
            shape_id += 1;
        }

        if slide.layout.has_body() {
            let frame = if has_image {
                BODY_BESIDE_IMAGE_FRAME
            } else {
                BODY_FRAME
            };
            push_text_shape(
                &mut xml,
                shape_id,
                "Content",
                frame,
                &slide.content,
                &TextStyle {
                    size_hundredths: 1800,
                    bold: false,
                    color: BODY_COLOR,
                    font: Some(FONT_FACE),
                    align: None,
                    anchor: "t",
                },
            );
            shape_id += 1;
        }

        if has_image {
            push_picture(&mut xml, shape_id, IMAGE_FRAME, "rId2");
            shape_id += 1;
        }

        push_text_shape(
            &mut xml,
            shape_id,
            "Footer",
            FOOTER_FRAME,
            &self.footer_text,
            &TextStyle {
                size_hundredths: 1000,
                bold: false,
                color: FOOTER_COLOR,
                font: None,
                align: Some("r"),
                anchor: "ctr",
            },
        );

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new(ExportSettings::default().footer_text)
    }
}

pub fn export_pptx(slides: &[Slide], settings: &ExportSettings) -> SlidewrightResult<ExportArtifact> {
    let bytes = PptxWriter::new(settings.footer_text.clone()).write(slides)?;
    Ok(ExportArtifact {
        filename: "presentation.pptx".to_string(),
        content_type: PPTX_CONTENT_TYPE,
        bytes,
    })
}

fn embeddable_image(index: usize, slide: &Slide) -> Option<EmbeddedImage> {
    let uri = slide.image_url.as_deref()?;
    let (mime, bytes) = match decode_data_uri(uri) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(slide = index, error_code = %e.error_code(), "Skipping slide image: {}", e);
            return None;
        }
    };

    match ImageFormat::from_mime(&mime) {
        Some(format) if !bytes.is_empty() => Some(EmbeddedImage { format, bytes }),
        _ => {
            warn!(slide = index, mime = %mime, "Skipping slide image with unsupported type");
            None
        }
    }
}

fn push_group_properties(xml: &mut String) {
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
}

fn push_xfrm(xml: &mut String, frame: Frame) {
    let _ = write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.w),
        emu(frame.h)
    );
}

fn push_run_properties(xml: &mut String, tag: &str, style: &TextStyle<'_>) {
    let _ = write!(
        xml,
        r#"<a:{} lang="en-US" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        tag,
        style.size_hundredths,
        if style.bold { 1 } else { 0 },
        style.color
    );
    if let Some(font) = style.font {
        let _ = write!(xml, r#"<a:latin typeface="{}"/><a:cs typeface="{}"/>"#, font, font);
    }
    let _ = write!(xml, "</a:{}>", tag);
}

fn push_text_shape(
    xml: &mut String,
    id: u32,
    name: &str,
    frame: Frame,
    text: &str,
    style: &TextStyle<'_>,
) {
    xml.push_str("<p:sp><p:nvSpPr>");
    let _ = write!(xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, id, name, id);
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
    push_xfrm(xml, frame);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
    let _ = write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0" anchor="{}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
        style.anchor
    );

    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        xml.push_str("<a:p>");
        if let Some(align) = style.align {
            let _ = write!(xml, r#"<a:pPr algn="{}"/>"#, align);
        }
        if !line.is_empty() {
            xml.push_str("<a:r>");
            push_run_properties(xml, "rPr", style);
            let _ = write!(xml, "<a:t>{}</a:t>", escape_xml(line));
            xml.push_str("</a:r>");
        }
        push_run_properties(xml, "endParaRPr", style);
        xml.push_str("</a:p>");
    }

    xml.push_str("</p:txBody></p:sp>");
}

fn push_picture(xml: &mut String, id: u32, frame: Frame, rel_id: &str) {
    xml.push_str("<p:pic><p:nvPicPr>");
    let _ = write!(xml, r#"<p:cNvPr id="{}" name="Picture {}"/>"#, id, id);
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
    let _ = write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        rel_id
    );
    xml.push_str("<p:spPr>");
    push_xfrm(xml, frame);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif] {
        let _ = write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        );
    }
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for number in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            number
        );
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn relationships_xml(entries: &[(String, String, String)]) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, kind, target) in entries {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, kind, target
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn rel(id: &str, kind: &str, target: &str) -> (String, String, String) {
    (id.to_string(), kind.to_string(), target.to_string())
}

fn root_rels_xml() -> String {
    relationships_xml(&[
        rel(
            "rId1",
            &format!("{}/officeDocument", REL_BASE),
            "ppt/presentation.xml",
        ),
        rel(
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        rel(
            "rId3",
            &format!("{}/extended-properties", REL_BASE),
            "docProps/app.xml",
        ),
    ])
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut entries = vec![rel(
        "rId1",
        &format!("{}/slideMaster", REL_BASE),
        "slideMasters/slideMaster1.xml",
    )];
    for number in 1..=slide_count {
        entries.push(rel(
            &format!("rId{}", number + 1),
            &format!("{}/slide", REL_BASE),
            &format!("slides/slide{}.xml", number),
        ));
    }
    entries.push(rel(
        &format!("rId{}", slide_count + 2),
        &format!("{}/theme", REL_BASE),
        "theme/theme1.xml",
    ));
    relationships_xml(&entries)
}

fn slide_master_rels_xml() -> String {
    relationships_xml(&[
        rel(
            "rId1",
            &format!("{}/slideLayout", REL_BASE),
            "../slideLayouts/slideLayout1.xml",
        ),
        rel("rId2", &format!("{}/theme", REL_BASE), "../theme/theme1.xml"),
    ])
}

fn slide_layout_rels_xml() -> String {
    relationships_xml(&[rel(
        "rId1",
        &format!("{}/slideMaster", REL_BASE),
        "../slideMasters/slideMaster1.xml",
    )])
}

fn slide_rels_xml(image_target: Option<&str>) -> String {
    let mut entries = vec![rel(
        "rId1",
        &format!("{}/slideLayout", REL_BASE),
        "../slideLayouts/slideLayout1.xml",
    )];
    if let Some(target) = image_target {
        entries.push(rel(
            "rId2",
            &format!("{}/image", REL_BASE),
            &format!("../media/{}", target),
        ));
    }
    relationships_xml(&entries)
}

fn presentation_xml(slide_count: usize) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    );
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            let _ = write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + index,
                index + 2
            );
        }
        xml.push_str("</p:sldIdLst>");
    }
    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/>"#,
        SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU
    );
    xml.push_str("</p:presentation>");
    xml
}

fn slide_master_xml() -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    );
    let _ = write!(
        xml,
        r#"<p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree>"#,
        BACKGROUND_COLOR
    );
    push_group_properties(&mut xml);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str(r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#);
    xml.push_str("</p:sldMaster>");
    xml
}

fn slide_layout_xml() -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">"#,
        NS_A, NS_R, NS_P
    );
    xml.push_str(r#"<p:cSld name="Blank"><p:spTree>"#);
    push_group_properties(&mut xml);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sldLayout>");
    xml
}

fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    let _ = write!(xml, r#"<a:theme xmlns:a="{}" name="Slidewright">"#, NS_A);
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Slidewright">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (name, color) in [
        ("dk2", "1A1A2E"),
        ("lt2", "E0E0E0"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        let _ = write!(xml, r#"<a:{n}><a:srgbClr val="{c}"/></a:{n}>"#, n = name, c = color);
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Slidewright">"#);
    for slot in ["majorFont", "minorFont"] {
        let _ = write!(
            xml,
            r#"<a:{s}><a:latin typeface="{f}"/><a:ea typeface=""/><a:cs typeface=""/></a:{s}>"#,
            s = slot,
            f = FONT_FACE
        );
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Slidewright">"#);
    xml.push_str("<a:fillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:fillStyleLst>");
    xml.push_str("<a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        let _ = write!(
            xml,
            r#"<a:ln w="{}" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln>"#,
            width
        );
    }
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str("<a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    xml
}

fn core_props_xml() -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    xml.push_str("<dc:title>AI Generated Presentation</dc:title>");
    xml.push_str("<dc:creator>Slidewright</dc:creator>");
    let _ = write!(
        xml,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
        now = now
    );
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_props_xml(slide_count: usize) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
    xml.push_str("<Application>Slidewright</Application>");
    let _ = write!(xml, "<Slides>{}</Slides>", slide_count);
    xml.push_str("<PresentationFormat>On-screen Show (4:3)</PresentationFormat>");
    xml.push_str("</Properties>");
    xml
}
