//! Per-pixel delta computation.
//!
//! Each pixel of both images is decoded into a float vector and reduced to
//! one scalar: the mean absolute channel difference. NaN and infinity
//! follow the scalar float comparison rules: equal specials are a zero
//! delta, anything else propagates through ordinary arithmetic.

use alloc::vec::Vec;

use crate::buffer::PixelView;
use crate::error::CompareError;
use crate::pixel::PixelValue;

/// Aggregate statistics over a delta image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaStatistics {
    /// Largest finite pixel delta, `0` when there is none.
    pub max: f32,
    /// Mean over all pixel deltas. Non-finite if any delta is non-finite.
    pub mean: f32,
    /// Number of pixels.
    pub count: usize,
}

/// Per-pixel deltas in row-major order plus their statistics.
#[derive(Clone, Debug)]
pub struct ImageDelta {
    samples: Vec<f32>,
    width: u32,
    height: u32,
    stats: DeltaStatistics,
}

impl ImageDelta {
    /// Compute the delta between two views.
    ///
    /// # Errors
    ///
    /// - [`CompareError::UnsupportedFormat`] if either format is not comparable
    /// - [`CompareError::SizeMismatch`] if the logical sizes differ
    /// - [`CompareError::FormatMismatch`] if the channel counts differ
    pub fn compute(actual: &PixelView<'_>, expected: &PixelView<'_>) -> Result<Self, CompareError> {
        let actual_info = actual.format().info()?;
        let expected_info = expected.format().info()?;
        if actual.size() != expected.size() {
            return Err(CompareError::SizeMismatch {
                actual: actual.size(),
                expected: expected.size(),
            });
        }
        if actual_info.channel_count != expected_info.channel_count {
            return Err(CompareError::FormatMismatch {
                actual: actual.format(),
                expected: expected.format(),
            });
        }

        let (width, height) = expected.size();
        let mut samples = Vec::with_capacity(expected.pixel_count());
        for y in 0..height {
            for x in 0..width {
                let a = PixelValue::decode(actual_info, actual.pixel(x, y));
                let e = PixelValue::decode(expected_info, expected.pixel(x, y));
                samples.push(pixel_delta(a.channels(), e.channels()));
            }
        }

        let stats = statistics(&samples);
        Ok(Self {
            samples,
            width,
            height,
            stats,
        })
    }

    /// Wrap precomputed deltas. Returns `None` if `samples` doesn't hold
    /// exactly `width * height` values.
    pub fn from_samples(samples: Vec<f32>, width: u32, height: u32) -> Option<Self> {
        if samples.len() != width as usize * height as usize {
            return None;
        }
        let stats = statistics(&samples);
        Some(Self {
            samples,
            width,
            height,
            stats,
        })
    }

    /// Deltas in row-major order, one per pixel.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Delta at `(x, y)`.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.samples[y as usize * self.width as usize + x as usize]
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Max / mean / count.
    #[inline]
    pub fn statistics(&self) -> DeltaStatistics {
        self.stats
    }
}

/// Delta of one channel, before averaging.
#[inline]
pub fn channel_delta(actual: f32, expected: f32) -> f32 {
    if actual.is_nan() && expected.is_nan() {
        return 0.0;
    }
    // Same-signed infinities compare equal; inf - inf would be NaN.
    if actual.is_infinite() && actual == expected {
        return 0.0;
    }
    (actual - expected).abs()
}

/// Mean absolute channel difference of one pixel.
pub fn pixel_delta(actual: &[f32], expected: &[f32]) -> f32 {
    debug_assert_eq!(actual.len(), expected.len());
    let count = actual.len() as f32;
    actual
        .iter()
        .zip(expected)
        .map(|(&a, &e)| channel_delta(a, e) / count)
        .sum()
}

/// Max over finite samples, compensated mean over all of them.
pub fn statistics(samples: &[f32]) -> DeltaStatistics {
    let max = samples
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);

    // Kahan summation; a plain sum loses enough precision on large images
    // to push a borderline mean over its threshold.
    let mut sum = 0.0f32;
    let mut compensation = 0.0f32;
    for &v in samples {
        let y = v - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }

    let mean = if samples.is_empty() {
        0.0
    } else {
        sum / samples.len() as f32
    };

    DeltaStatistics {
        max,
        mean,
        count: samples.len(),
    }
}
