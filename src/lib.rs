//! Tolerance-based image comparison for test suites.
//!
//! Compares an "actual" rendered image against an "expected" ground-truth
//! image and decides whether they match within a max and a mean delta
//! threshold. When they don't, the result renders a compact diagnostic:
//! an ASCII heat-map of where the deltas are and a list of the worst
//! pixels.
//!
//! - [`PixelFormat`] / [`PixelFormatInfo`] — format tags and their channel layout
//! - [`PixelView`] / [`PixelBuffer`] — strided pixel storage, borrowed and owned
//! - [`ImageDelta`] — per-pixel deltas with max/mean statistics
//! - [`PixelElement`] / [`resolve`] — typed buffers and format autodetection
//! - [`Comparator`] / [`Comparison`] — thresholds, evaluation and reporting
//! - [`ImageEncoder`] / [`ImageDecoder`] — file collaborators supplied by the caller
//!
//! All channel values decode to `f32`: normalized formats into `0..=1` or
//! `-1..=1`, integer formats as-is, float formats bit-exact. NaN and
//! infinity are valid inputs. Matching specials compare equal, anything
//! else poisons the mean so the comparison fails.

#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod compare;
mod config;
mod delta;
mod diagnostic;
mod element;
mod error;
mod format;
mod pixel;
mod traits;

pub use buffer::{BufferError, PixelBuffer, PixelView};
pub use compare::{Comparator, Comparison, ComparisonFlags, Status};
pub use config::CompareConfig;
pub use delta::{DeltaStatistics, ImageDelta};
pub use diagnostic::{HeatMap, PixelList};
pub use element::{ElementType, PixelElement, ScalarType, resolve, typed_view};
pub use error::{BoxedError, CompareError, Side};
pub use format::{ComponentKind, PixelFormat, PixelFormatInfo};
pub use pixel::PixelValue;
pub use traits::{ImageDecoder, ImageEncoder};

// Re-exports for typed comparisons.
pub use half::f16;
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::{Rgb, Rgba};
