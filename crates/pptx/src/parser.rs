//! PPTX file parser implementation.

use deck_core::{Error, ParsedSlide, PictureShape, Result, Shape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Parser for PPTX (Office Open XML) files.
///
/// Yields every slide in presentation order with its top-level shapes in
/// document order. Group contents are not descended into.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX package from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<ParsedSlide>> {
        let mut slides = Vec::new();
        self.for_each_slide(reader, |_, slide| slides.push(slide))?;
        Ok(slides)
    }

    /// Parse a PPTX package slide by slide.
    ///
    /// `visit` receives each slide with its 1-based position as soon as that
    /// slide is parsed. A failing slide stops the walk; slides before it
    /// have already been visited.
    pub fn for_each_slide<R, F>(&self, reader: R, mut visit: F) -> Result<()>
    where
        R: Read + Seek,
        F: FnMut(usize, ParsedSlide),
    {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_order.len());

        for (index, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path)?;
            visit(index + 1, slide);
        }

        Ok(())
    }

    /// Get the ordered list of slide part paths.
    ///
    /// Order comes from `p:sldIdLst` in presentation.xml; each entry's `r:id`
    /// is resolved through the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let presentation = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let slide_ids = parse_slide_id_list(&presentation)?;

        let rels_path = rels_path_for(PRESENTATION_PART);
        let rels = match self.read_optional_file(archive, &rels_path)? {
            Some(content) => parse_relationships(&content)?,
            None if slide_ids.is_empty() => HashMap::new(),
            None => {
                return Err(Error::CorruptedFile(format!(
                    "missing part '{}'",
                    rels_path
                )));
            }
        };

        slide_ids
            .iter()
            .map(|r_id| {
                rels.get(r_id)
                    .map(|rel| resolve_part_path(PRESENTATION_PART, &rel.target))
                    .ok_or_else(|| {
                        Error::CorruptedFile(format!("slide relationship '{}' not found", r_id))
                    })
            })
            .collect()
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<ParsedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let raw_shapes = extract_shapes_from_xml(&content)
            .map_err(|e| Error::XmlError(format!("{}: {}", slide_path, e)))?;

        let rels = match self.read_optional_file(archive, &rels_path_for(slide_path))? {
            Some(content) => parse_relationships(&content)?,
            None => HashMap::new(),
        };

        let mut slide = ParsedSlide::new();
        for raw in raw_shapes {
            let shape = match raw {
                RawShape::Text(text) => Shape::Text(text),
                RawShape::Picture { embed } => {
                    Shape::Picture(self.resolve_picture(archive, slide_path, &rels, embed))
                }
                RawShape::Other => Shape::Other,
            };
            slide.add_shape(shape);
        }

        Ok(slide)
    }

    /// Locate the image part behind a picture's `r:embed` relationship.
    fn resolve_picture<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        rels: &HashMap<String, Relationship>,
        embed: Option<String>,
    ) -> PictureShape {
        let Some(r_id) = embed else {
            log::debug!("{}: picture without embedded image", slide_path);
            return PictureShape::unresolved(format!("{} (linked image)", slide_path));
        };

        let target = match rels.get(&r_id) {
            Some(rel) if !rel.external => resolve_part_path(slide_path, &rel.target),
            _ => {
                log::debug!("{}: image relationship '{}' not resolvable", slide_path, r_id);
                return PictureShape::unresolved(r_id);
            }
        };

        match self.read_bytes_from_archive(archive, &target) {
            Ok(blob) => PictureShape::new(target, blob),
            Err(e) => {
                log::debug!("{}: {}", slide_path, e);
                PictureShape::unresolved(target)
            }
        }
    }

    /// Read a mandatory text part from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        self.read_optional_file(archive, path)?
            .ok_or_else(|| Error::CorruptedFile(format!("missing part '{}'", path)))
    }

    /// Read a text part that may legitimately be absent.
    fn read_optional_file<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Option<String>> {
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(Error::ZipError(format!("Failed to open '{}': {}", path, e)));
            }
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(Some(content))
    }

    /// Read a binary part from the ZIP archive.
    fn read_bytes_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Vec<u8>> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(bytes)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A package relationship entry.
#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    external: bool,
}

/// A top-level shape before its picture payload is resolved.
#[derive(Debug, PartialEq)]
enum RawShape {
    Text(String),
    Picture { embed: Option<String> },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ShapeKind {
    Text,
    Picture,
    Other,
    /// Shape-tree properties (`nvGrpSpPr`, `grpSpPr`, `extLst`), not shapes.
    Skip,
}

/// Accumulates one top-level shape while its XML subtree is read.
struct ShapeBuilder {
    kind: ShapeKind,
    depth: usize,
    paragraphs: Vec<String>,
    in_text_body: bool,
    in_run_text: bool,
    placeholder: bool,
    embed: Option<String>,
}

impl ShapeBuilder {
    fn new(element: &[u8], depth: usize) -> Self {
        let kind = match element {
            b"sp" => ShapeKind::Text,
            b"pic" => ShapeKind::Picture,
            b"nvGrpSpPr" | b"grpSpPr" | b"extLst" => ShapeKind::Skip,
            _ => ShapeKind::Other,
        };

        Self {
            kind,
            depth,
            paragraphs: Vec::new(),
            in_text_body: false,
            in_run_text: false,
            placeholder: false,
            embed: None,
        }
    }

    /// Handle a start or empty element inside the shape.
    fn open(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        match (self.kind, local_name(name.as_ref())) {
            (ShapeKind::Text, b"txBody") if !empty => self.in_text_body = true,
            (ShapeKind::Text, b"p") if self.in_text_body => self.paragraphs.push(String::new()),
            (ShapeKind::Text, b"t") if self.in_text_body && !empty => self.in_run_text = true,
            (ShapeKind::Text, b"br") if self.in_text_body => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.push('\u{0B}');
                }
            }
            (ShapeKind::Picture, b"ph") => self.placeholder = true,
            (ShapeKind::Picture, b"blip") => {
                self.embed = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.local_name().as_ref() == b"embed")
                    .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
            }
            _ => {}
        }
    }

    fn close(&mut self, element: &[u8]) {
        match element {
            b"txBody" => self.in_text_body = false,
            b"t" => self.in_run_text = false,
            _ => {}
        }
    }

    fn wants_text(&self) -> bool {
        self.kind == ShapeKind::Text && self.in_run_text
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.push_str(text);
        }
    }

    fn finish(self) -> Option<RawShape> {
        match self.kind {
            ShapeKind::Text => Some(RawShape::Text(self.paragraphs.join("\n"))),
            // Placeholder pictures are not reported as picture-typed shapes.
            ShapeKind::Picture if self.placeholder => Some(RawShape::Other),
            ShapeKind::Picture => Some(RawShape::Picture { embed: self.embed }),
            ShapeKind::Other => Some(RawShape::Other),
            ShapeKind::Skip => None,
        }
    }
}

/// Walk the slide's shape tree and collect its top-level shapes in order.
fn extract_shapes_from_xml(xml_content: &str) -> std::result::Result<Vec<RawShape>, String> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(false);

    let mut depth = 0usize;
    // Depth at which direct children of p:spTree open.
    let mut tree_depth: Option<usize> = None;
    let mut tree_done = false;
    let mut current: Option<ShapeBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.name();
                let name = local_name(name.as_ref());

                if let Some(shape) = current.as_mut() {
                    shape.open(e, false);
                } else if tree_depth == Some(depth) {
                    current = Some(ShapeBuilder::new(name, depth));
                } else if !tree_done && tree_depth.is_none() && name == b"spTree" {
                    tree_depth = Some(depth + 1);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let name = local_name(name.as_ref());

                if let Some(shape) = current.as_mut() {
                    shape.open(e, true);
                } else if tree_depth == Some(depth + 1) {
                    shapes.extend(ShapeBuilder::new(name, depth + 1).finish());
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(shape) = current.as_mut().filter(|s| s.wants_text()) {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    shape.push_text(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                if current.as_ref().is_some_and(|s| s.depth == depth) {
                    shapes.extend(current.take().and_then(ShapeBuilder::finish));
                } else if let Some(shape) = current.as_mut() {
                    let name = e.name();
                    shape.close(local_name(name.as_ref()));
                } else if tree_depth == Some(depth + 1) {
                    // Only the first shape tree of the slide is walked.
                    tree_depth = None;
                    tree_done = true;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Ok(shapes)
}

/// Collect the `r:id` of every `p:sldId` in presentation order.
fn parse_slide_id_list(xml_content: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // `id` is the slide id; the prefixed `r:id` is the relationship.
                let r_id = e.attributes().flatten().find(|attr| {
                    attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id"
                });
                if let Some(attr) = r_id {
                    ids.push(String::from_utf8_lossy(&attr.value).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Parse a `.rels` part into a map keyed by relationship id.
fn parse_relationships(xml_content: &str) -> Result<HashMap<String, Relationship>> {
    let mut rels = HashMap::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|e| Error::XmlError(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = value.into_owned(),
                        b"Target" => target = value.into_owned(),
                        b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }

                if !id.is_empty() {
                    rels.insert(id, Relationship { target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Path of the relationships part belonging to `part`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_part_path(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
