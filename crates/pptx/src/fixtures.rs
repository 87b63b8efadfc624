//! In-memory PPTX packages for tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

struct FixtureSlide {
    shapes: String,
    media: Vec<(String, String, Vec<u8>)>,
}

/// Builds a minimal but structurally valid PPTX package.
pub struct DeckBuilder {
    slides: Vec<FixtureSlide>,
    reversed: bool,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            reversed: false,
        }
    }

    /// Add a slide made of the given shape elements.
    pub fn slide(self, shapes: &[String]) -> Self {
        self.slide_with_media(shapes, &[])
    }

    /// Add a slide whose pictures reference `(rId, file name, bytes)` media parts.
    pub fn slide_with_media(mut self, shapes: &[String], media: &[(&str, &str, &[u8])]) -> Self {
        self.slides.push(FixtureSlide {
            shapes: shapes.concat(),
            media: media
                .iter()
                .map(|(r_id, name, bytes)| (r_id.to_string(), name.to_string(), bytes.to_vec()))
                .collect(),
        });
        self
    }

    /// Store slides under part names (and relationship ids) running opposite
    /// to presentation order.
    pub fn reverse_part_names(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let count = self.slides.len();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let mut slide_ids = String::new();
        let mut presentation_rels = format!(
            r#"<Relationship Id="rId1" Type="{}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
            REL_TYPE
        );

        for (idx, slide) in self.slides.iter().enumerate() {
            let part_number = if self.reversed { count - idx } else { idx + 1 };
            let r_id = format!("rId{}", part_number + 1);

            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + idx, r_id));
            presentation_rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}/slide" Target="slides/slide{}.xml"/>"#,
                r_id, REL_TYPE, part_number
            ));

            let slide_xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                NS, slide.shapes
            );
            put(&mut zip, &format!("ppt/slides/slide{}.xml", part_number), slide_xml.as_bytes());

            let mut slide_rels = format!(
                r#"<Relationship Id="rId1" Type="{}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
                REL_TYPE
            );
            for (media_id, name, bytes) in &slide.media {
                slide_rels.push_str(&format!(
                    r#"<Relationship Id="{}" Type="{}/image" Target="../media/{}"/>"#,
                    media_id, REL_TYPE, name
                ));
                put(&mut zip, &format!("ppt/media/{}", name), bytes);
            }
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", part_number),
                relationships(&slide_rels).as_bytes(),
            );
        }

        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            NS, slide_ids
        );
        put(&mut zip, "ppt/presentation.xml", presentation.as_bytes());
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            relationships(&presentation_rels).as_bytes(),
        );

        zip.finish().unwrap().into_inner()
    }

    /// A valid ZIP archive that is not a presentation.
    pub fn empty_archive() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        put(&mut zip, "readme.txt", b"not a deck");
        zip.finish().unwrap().into_inner()
    }
}

fn put(zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) {
    zip.start_file(name, FileOptions::default()).unwrap();
    zip.write_all(bytes).unwrap();
}

fn relationships(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">{}</Relationships>"#,
        REL_NS, body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A `p:sp` text box holding one paragraph (or an empty one).
pub fn text_box(id: u32, text: &str) -> String {
    let paragraph = if text.is_empty() {
        "<a:p/>".to_string()
    } else {
        format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(text))
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraph}</p:txBody></p:sp>"#
    )
}

/// A `p:pic` shape embedding the image behind `r_id`.
pub fn picture(id: u32, r_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr/></p:pic>"#
    )
}

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
