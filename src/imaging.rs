//! Image byte handling: format sniffing, PNG normalization, dimensions.
//!
//! Generated files are always PNG. The service usually answers PNG already,
//! in which case the bytes are kept untouched; anything else is decoded and
//! re-encoded with the `image` crate.

use image::{ImageFormat, ImageReader};
use serde::Serialize;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("unrecognized image data")]
    UnknownFormat,
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Detect the format of encoded image bytes from their magic number.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    image::guess_format(data).ok()
}

/// Return PNG-encoded bytes, converting when the input is another format.
pub fn ensure_png(data: Vec<u8>) -> Result<Vec<u8>, ImagingError> {
    match detect_format(&data) {
        Some(ImageFormat::Png) => Ok(data),
        Some(format) => {
            tracing::debug!(?format, "re-encoding generated image as PNG");
            let decoded = image::load_from_memory_with_format(&data, format)?;
            let mut out = Cursor::new(Vec::new());
            decoded.write_to(&mut out, ImageFormat::Png)?;
            Ok(out.into_inner())
        }
        None => Err(ImagingError::UnknownFormat),
    }
}

/// Read dimensions from the image header without decoding pixels.
pub fn dimensions(data: &[u8]) -> Result<Dimensions, ImagingError> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()?;
    Ok(Dimensions { width, height })
}
