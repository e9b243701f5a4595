//! Comparison tolerances and diagnostic settings.
//!
//! [`CompareConfig`] is a plain value: build it with [`new`](CompareConfig::new)
//! and the `with_*` methods, then hand it to a [`Comparator`](crate::Comparator).

use crate::error::CompareError;

/// Thresholds and report settings for a comparison.
///
/// Both thresholds are inclusive: a comparison passes when the max delta
/// is `<= max_threshold` and the mean delta is `<= mean_threshold`.
///
/// # Example
///
/// ```
/// use imgcompare::CompareConfig;
///
/// let config = CompareConfig::new(0.01, 0.001)
///     .with_max_listed_pixels(5)
///     .with_colors(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct CompareConfig {
    /// Largest tolerated single-pixel delta.
    pub max_threshold: f32,
    /// Largest tolerated mean delta.
    pub mean_threshold: f32,
    /// Cap on entries in the diagnostic pixel list.
    pub max_listed_pixels: usize,
    /// Cap on heat-map columns.
    pub heatmap_columns: u32,
    /// Emit ANSI colors in the heat-map.
    pub colors: bool,
}

impl Default for CompareConfig {
    /// Exact match, with default report settings.
    fn default() -> Self {
        Self {
            max_threshold: 0.0,
            mean_threshold: 0.0,
            max_listed_pixels: 10,
            heatmap_columns: 64,
            colors: true,
        }
    }
}

impl CompareConfig {
    /// Config with the given thresholds and default report settings.
    pub fn new(max_threshold: f32, mean_threshold: f32) -> Self {
        Self {
            max_threshold,
            mean_threshold,
            ..Self::default()
        }
    }

    /// Set the max delta threshold.
    pub fn with_max_threshold(mut self, threshold: f32) -> Self {
        self.max_threshold = threshold;
        self
    }

    /// Set the mean delta threshold.
    pub fn with_mean_threshold(mut self, threshold: f32) -> Self {
        self.mean_threshold = threshold;
        self
    }

    /// Set how many pixels the diagnostic lists at most.
    pub fn with_max_listed_pixels(mut self, count: usize) -> Self {
        self.max_listed_pixels = count;
        self
    }

    /// Set the heat-map column cap.
    pub fn with_heatmap_columns(mut self, columns: u32) -> Self {
        self.heatmap_columns = columns;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Check that the thresholds are finite and non-negative, that mean
    /// doesn't exceed max, and that both caps are non-zero.
    pub fn validate(&self) -> Result<(), CompareError> {
        let (max, mean) = (self.max_threshold, self.mean_threshold);
        let valid = max.is_finite() && mean.is_finite() && mean >= 0.0 && mean <= max;
        if !valid || self.heatmap_columns == 0 || self.max_listed_pixels == 0 {
            return Err(CompareError::InvalidThresholds { max, mean });
        }
        Ok(())
    }
}
