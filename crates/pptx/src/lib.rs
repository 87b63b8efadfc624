//! PPTX (Office Open XML) backend for slide-deck extraction.
//!
//! Parses .pptx files (ZIP archives containing XML documents) into shapes,
//! then maps each slide's shapes to a [`deck_core::SlideRecord`].

pub mod extractor;
pub mod parser;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::SlideExtractor;
pub use parser::PptxParser;
