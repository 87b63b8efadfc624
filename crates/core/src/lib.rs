//! Core domain types for slide-deck content extraction and
//! inconsistency analysis.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ParsedSlide, PictureShape, PromptPart, Shape, SlideRecord};
