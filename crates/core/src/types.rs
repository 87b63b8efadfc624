//! Domain types for representing a deck's slides and the model request
//! assembled from them.

use image::DynamicImage;

/// A content element on a slide, classified by what it can offer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A shape with a text frame. The text may be empty.
    Text(String),

    /// A picture shape with an embedded image payload.
    Picture(PictureShape),

    /// Anything else (groups, tables, connectors, placeholder pictures...).
    Other,
}

impl Shape {
    /// Text exposed by this shape, if it is text-capable.
    pub fn text(&self) -> Option<&str> {
        match self {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a picture shape.
    pub fn is_picture(&self) -> bool {
        matches!(self, Shape::Picture(_))
    }
}

/// A picture shape as yielded by the document parser.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureShape {
    /// Package path of the image part, or the unresolved relationship id.
    pub source: String,

    /// Raw bytes of the image part. `None` when the part could not be located.
    pub blob: Option<Vec<u8>>,
}

impl PictureShape {
    /// Create a picture whose payload was found in the package.
    pub fn new(source: impl Into<String>, blob: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            blob: Some(blob),
        }
    }

    /// Create a picture whose payload could not be located.
    pub fn unresolved(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            blob: None,
        }
    }
}

/// One slide as yielded by the document parser: its shapes in native order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSlide {
    /// Top-level shapes in document order.
    pub shapes: Vec<Shape>,
}

impl ParsedSlide {
    /// Create an empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}

impl From<Vec<Shape>> for ParsedSlide {
    fn from(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }
}

/// Normalized content of a single slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideRecord {
    /// 1-based slide number (position in the deck + 1).
    pub slide_number: usize,

    /// Newline-joined text of every text-capable shape, in shape order.
    pub text: String,

    /// Successfully decoded pictures, in shape order.
    pub images: Vec<DynamicImage>,
}

impl SlideRecord {
    /// Create a record.
    pub fn new(slide_number: usize, text: impl Into<String>, images: Vec<DynamicImage>) -> Self {
        Self {
            slide_number,
            text: text.into(),
            images,
        }
    }

    /// Whether the slide contributed neither text nor images.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }
}

/// One atomic unit of a model request.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image(DynamicImage),
}

impl PromptPart {
    /// Convenience constructor for a text part.
    pub fn text(text: impl Into<String>) -> Self {
        PromptPart::Text(text.into())
    }

    /// The text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PromptPart::Text(text) => Some(text),
            PromptPart::Image(_) => None,
        }
    }
}

impl From<&str> for PromptPart {
    fn from(text: &str) -> Self {
        PromptPart::Text(text.to_string())
    }
}

impl From<String> for PromptPart {
    fn from(text: String) -> Self {
        PromptPart::Text(text)
    }
}

impl From<DynamicImage> for PromptPart {
    fn from(image: DynamicImage) -> Self {
        PromptPart::Image(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_capabilities() {
        assert_eq!(Shape::Text("Title".into()).text(), Some("Title"));
        assert_eq!(Shape::Text(String::new()).text(), Some(""));
        assert_eq!(Shape::Other.text(), None);

        let pic = Shape::Picture(PictureShape::new("ppt/media/image1.png", vec![1, 2, 3]));
        assert!(pic.is_picture());
        assert_eq!(pic.text(), None);
        assert!(!Shape::Other.is_picture());
    }

    #[test]
    fn test_unresolved_picture_has_no_blob() {
        let pic = PictureShape::unresolved("rId7");
        assert_eq!(pic.source, "rId7");
        assert!(pic.blob.is_none());
    }

    #[test]
    fn test_blank_record() {
        assert!(SlideRecord::new(3, "", Vec::new()).is_blank());
        assert!(!SlideRecord::new(3, "x", Vec::new()).is_blank());

        let image = DynamicImage::new_rgb8(1, 1);
        assert!(!SlideRecord::new(3, "", vec![image]).is_blank());
    }

    #[test]
    fn test_prompt_part_conversions() {
        assert_eq!(PromptPart::from("TEXT:").as_text(), Some("TEXT:"));
        assert_eq!(PromptPart::from(String::from("a")), PromptPart::text("a"));
        assert_eq!(PromptPart::from(DynamicImage::new_rgb8(1, 1)).as_text(), None);
    }
}
