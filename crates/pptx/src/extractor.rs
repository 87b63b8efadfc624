//! Mapping from parsed slides to [`SlideRecord`]s.

use crate::parser::PptxParser;
use deck_core::{Error, ParsedSlide, PictureShape, Result, Shape, SlideRecord};
use image::DynamicImage;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Extracts per-slide text and images from a deck file.
pub struct SlideExtractor {
    parser: PptxParser,
}

impl SlideExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self {
            parser: PptxParser::new(),
        }
    }

    /// Extract one record per slide, in deck order.
    ///
    /// Progress is reported through the `log` facade.
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<Vec<SlideRecord>> {
        self.extract_with_progress(path, |slide_number| {
            log::info!("Processing slide {}", slide_number)
        })
    }

    /// Extract one record per slide, calling `progress` with each slide
    /// number before that slide is processed.
    ///
    /// Slides are mapped as the package is read, so a failure on slide N is
    /// raised after progress for slides 1..N-1 has been reported.
    pub fn extract_with_progress<F>(
        &self,
        path: impl AsRef<Path>,
        mut progress: F,
    ) -> Result<Vec<SlideRecord>>
    where
        F: FnMut(usize),
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::IoError(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            )));
        }

        let file = File::open(path)?;
        let mut records = Vec::new();
        self.parser
            .for_each_slide(BufReader::new(file), |slide_number, slide| {
                progress(slide_number);
                records.push(slide_record(slide_number, &slide));
            })?;

        Ok(records)
    }

    /// Map already parsed slides to records without reporting progress.
    pub fn records_from_slides(slides: Vec<ParsedSlide>) -> Vec<SlideRecord> {
        map_slides(slides, |_| {})
    }
}

impl Default for SlideExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn map_slides<F: FnMut(usize)>(slides: Vec<ParsedSlide>, mut progress: F) -> Vec<SlideRecord> {
    slides
        .iter()
        .enumerate()
        .map(|(idx, slide)| {
            let slide_number = idx + 1;
            progress(slide_number);
            slide_record(slide_number, slide)
        })
        .collect()
}

/// Build the record for one slide.
///
/// Every text-capable shape contributes one line, empty or not. Every picture
/// that decodes contributes one image; the rest are skipped with a warning.
pub fn slide_record(slide_number: usize, slide: &ParsedSlide) -> SlideRecord {
    let text = slide
        .shapes
        .iter()
        .filter_map(Shape::text)
        .collect::<Vec<_>>()
        .join("\n");

    let images = slide
        .shapes
        .iter()
        .filter_map(|shape| match shape {
            Shape::Picture(picture) => decode_picture(slide_number, picture),
            _ => None,
        })
        .collect();

    SlideRecord::new(slide_number, text, images)
}

fn decode_picture(slide_number: usize, picture: &PictureShape) -> Option<DynamicImage> {
    let Some(blob) = picture.blob.as_deref() else {
        log::warn!(
            "Could not process an image on slide {}: image data for {} not found",
            slide_number,
            picture.source
        );
        return None;
    };

    match image::load_from_memory(blob) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Could not process an image on slide {}: {}", slide_number, e);
            None
        }
    }
}
