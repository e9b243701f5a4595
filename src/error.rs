//! Comparison errors.

use alloc::boxed::Box;
use core::fmt;
use std::path::PathBuf;

use crate::buffer::BufferError;
use crate::format::PixelFormat;

/// Type-erased error returned by encoder and decoder collaborators.
pub type BoxedError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Which side of a comparison an image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The image under test.
    Actual,
    /// The ground-truth image.
    Expected,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Actual => "Actual",
            Self::Expected => "Expected",
        })
    }
}

/// Errors from comparing images and saving diagnostics.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompareError {
    /// Depth/stencil or implementation-specific format.
    #[error("unsupported pixel format {format}")]
    UnsupportedFormat { format: PixelFormat },

    /// Channel counts differ between the two images.
    #[error("different format, actual {actual} but {expected} expected")]
    FormatMismatch {
        actual: PixelFormat,
        expected: PixelFormat,
    },

    /// Logical sizes differ.
    #[error(
        "different size, actual {}x{} but {}x{} expected",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    SizeMismatch {
        actual: (u32, u32),
        expected: (u32, u32),
    },

    /// A typed element has no format compatible with the expected image.
    #[error("no pixel format for {element} matches expected {expected}")]
    NoMatchingFormat {
        element: crate::element::ElementType,
        expected: PixelFormat,
    },

    /// No encoder, or the encoder can't write the actual format.
    #[error("no image encoder available for {format}")]
    EncoderUnavailable { format: PixelFormat },

    /// The comparison produced no deltas to diagnose.
    #[error("comparison has no diagnostic to save")]
    NotDiagnosable,

    /// Thresholds failed [`CompareConfig::validate`](crate::CompareConfig::validate).
    #[error("invalid thresholds: max {max}, mean {mean}")]
    InvalidThresholds { max: f32, mean: f32 },

    /// The decoder collaborator failed.
    #[error("{side} image {} could not be loaded: {source}", .path.display())]
    ImageLoad {
        side: Side,
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    /// The encoder collaborator failed.
    #[error("failed to save {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    /// A view or buffer had invalid geometry.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
