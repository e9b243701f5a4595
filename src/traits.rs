//! Image file collaborators.
//!
//! The comparator never reads or writes image files itself. Loading
//! ground-truth images and saving diagnostics go through these traits,
//! which are object-safe so a test harness can pick an implementation at
//! runtime (`&dyn ImageDecoder`).

use std::path::Path;

use crate::buffer::{PixelBuffer, PixelView};
use crate::error::BoxedError;
use crate::format::PixelFormat;

/// Writes pixel data to an image file.
///
/// Used to save the actual image of a failed comparison so it can be
/// inspected or promoted to the new ground truth.
pub trait ImageEncoder {
    /// Whether this encoder can write `format` without conversion.
    fn supports(&self, format: PixelFormat) -> bool;

    /// Write `image` to `path`.
    fn encode(&self, image: PixelView<'_>, path: &Path) -> Result<(), BoxedError>;
}

/// Reads an image file into pixel data.
pub trait ImageDecoder {
    /// Load the image at `path`.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, BoxedError>;
}

impl<T: ImageEncoder + ?Sized> ImageEncoder for &T {
    fn supports(&self, format: PixelFormat) -> bool {
        (**self).supports(format)
    }

    fn encode(&self, image: PixelView<'_>, path: &Path) -> Result<(), BoxedError> {
        (**self).encode(image, path)
    }
}

impl<T: ImageDecoder + ?Sized> ImageDecoder for &T {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, BoxedError> {
        (**self).decode(path)
    }
}
