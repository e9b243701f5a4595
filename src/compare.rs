//! Comparator façade.
//!
//! [`Comparator`] holds the thresholds. Each `compare*` call computes the
//! delta once and returns a [`Comparison`], which can then render its
//! message or save a diagnostic any number of times without recomputing.

use alloc::string::String;
use core::fmt::Write as _;
use std::path::{Path, PathBuf};

use imgref::ImgRef;

use crate::buffer::{PixelBuffer, PixelView};
use crate::config::CompareConfig;
use crate::delta::{DeltaStatistics, ImageDelta};
use crate::diagnostic::{HeatMap, PixelList};
use crate::element::{PixelElement, resolve, typed_view};
use crate::error::{CompareError, Side};
use crate::pixel::Sig6;
use crate::traits::{ImageDecoder, ImageEncoder};

// ---------------------------------------------------------------------------
// Status and flags
// ---------------------------------------------------------------------------

/// Outcome of evaluating computed deltas against the thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Max and mean are both within their thresholds.
    Passed,
    /// Both max and mean exceed their thresholds.
    AboveThresholds,
    /// Only the max delta exceeds its threshold.
    AboveMaxThreshold,
    /// Only the mean delta exceeds its threshold.
    AboveMeanThreshold,
}

impl Status {
    /// Evaluate statistics against thresholds. Both bounds are inclusive
    /// and a NaN mean never passes.
    pub fn evaluate(stats: DeltaStatistics, config: &CompareConfig) -> Self {
        let max_ok = stats.max <= config.max_threshold;
        let mean_ok = stats.mean <= config.mean_threshold;
        match (max_ok, mean_ok) {
            (true, true) => Self::Passed,
            (false, false) => Self::AboveThresholds,
            (false, true) => Self::AboveMaxThreshold,
            (true, false) => Self::AboveMeanThreshold,
        }
    }
}

/// What a test harness should do with a [`Comparison`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComparisonFlags {
    /// The comparison did not pass.
    pub failed: bool,
    /// Deltas exist and are worth reporting or saving.
    pub diagnosable: bool,
    /// Passed, but with non-zero deltas worth showing in verbose mode.
    pub verbose: bool,
}

impl ComparisonFlags {
    /// No flag set: an exact pass.
    pub fn is_empty(&self) -> bool {
        !(self.failed || self.diagnosable || self.verbose)
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Compares an actual image against an expected one.
///
/// # Example
///
/// ```
/// use imgcompare::{Comparator, CompareConfig, PixelFormat, PixelView};
///
/// let actual = PixelView::packed(&[128], 1, 1, PixelFormat::R8Unorm)?;
/// let expected = PixelView::packed(&[127], 1, 1, PixelFormat::R8Unorm)?;
///
/// let comparator = Comparator::new(CompareConfig::new(0.01, 0.01))?;
/// let comparison = comparator.compare(actual, expected);
/// assert!(!comparison.flags().failed);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    /// Create a comparator.
    ///
    /// # Errors
    ///
    /// [`CompareError::InvalidThresholds`] if `config` fails
    /// [`CompareConfig::validate`].
    pub fn new(config: CompareConfig) -> Result<Self, CompareError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two in-memory images.
    pub fn compare<'a>(&self, actual: PixelView<'a>, expected: PixelView<'a>) -> Comparison<'a> {
        self.evaluate(
            Some(Image::View(actual)),
            Some(Image::View(expected)),
            Files::default(),
        )
    }

    /// Compare a typed image against an in-memory image, picking the
    /// actual format from the element type and the expected format.
    pub fn compare_pixels<'a, T: PixelElement>(
        &self,
        actual: ImgRef<'a, T>,
        expected: PixelView<'a>,
    ) -> Comparison<'a> {
        self.compare_typed(actual, Image::View(expected), Files::default())
    }

    /// Compare an in-memory image against an image file.
    pub fn compare_with_file<'a>(
        &self,
        actual: PixelView<'a>,
        expected: &Path,
        decoder: &dyn ImageDecoder,
    ) -> Comparison<'a> {
        let files = Files {
            actual: None,
            expected: Some(expected.to_path_buf()),
        };
        match load(decoder, Side::Expected, expected) {
            Ok(buffer) => self.evaluate(Some(Image::View(actual)), Some(Image::Owned(buffer)), files),
            Err(err) => self.terminal(Some(Image::View(actual)), None, files, err),
        }
    }

    /// Compare an image file against an in-memory image.
    pub fn compare_file_with<'a>(
        &self,
        actual: &Path,
        expected: PixelView<'a>,
        decoder: &dyn ImageDecoder,
    ) -> Comparison<'a> {
        let files = Files {
            actual: Some(actual.to_path_buf()),
            expected: None,
        };
        match load(decoder, Side::Actual, actual) {
            Ok(buffer) => self.evaluate(Some(Image::Owned(buffer)), Some(Image::View(expected)), files),
            Err(err) => self.terminal(None, Some(Image::View(expected)), files, err),
        }
    }

    /// Compare two image files.
    pub fn compare_files(
        &self,
        actual: &Path,
        expected: &Path,
        decoder: &dyn ImageDecoder,
    ) -> Comparison<'static> {
        let files = Files {
            actual: Some(actual.to_path_buf()),
            expected: Some(expected.to_path_buf()),
        };
        let actual = match load(decoder, Side::Actual, actual) {
            Ok(buffer) => buffer,
            Err(err) => return self.terminal(None, None, files, err),
        };
        match load(decoder, Side::Expected, expected) {
            Ok(buffer) => self.evaluate(Some(Image::Owned(actual)), Some(Image::Owned(buffer)), files),
            Err(err) => self.terminal(Some(Image::Owned(actual)), None, files, err),
        }
    }

    /// Compare a typed image against an image file.
    pub fn compare_pixels_with_file<'a, T: PixelElement>(
        &self,
        actual: ImgRef<'a, T>,
        expected: &Path,
        decoder: &dyn ImageDecoder,
    ) -> Comparison<'a> {
        let files = Files {
            actual: None,
            expected: Some(expected.to_path_buf()),
        };
        match load(decoder, Side::Expected, expected) {
            Ok(buffer) => self.compare_typed(actual, Image::Owned(buffer), files),
            Err(err) => self.terminal(None, None, files, err),
        }
    }

    fn compare_typed<'a, T: PixelElement>(
        &self,
        actual: ImgRef<'a, T>,
        expected: Image<'a>,
        files: Files,
    ) -> Comparison<'a> {
        let view = resolve(T::ELEMENT, expected.view().format())
            .and_then(|format| typed_view(actual, format).map_err(CompareError::from));
        match view {
            Ok(view) => self.evaluate(Some(Image::View(view)), Some(expected), files),
            Err(err) => self.terminal(None, Some(expected), files, err),
        }
    }

    fn evaluate<'a>(
        &self,
        actual: Option<Image<'a>>,
        expected: Option<Image<'a>>,
        files: Files,
    ) -> Comparison<'a> {
        let computed = match (&actual, &expected) {
            (Some(a), Some(e)) => ImageDelta::compute(&a.view(), &e.view()),
            _ => Err(CompareError::NotDiagnosable),
        };
        let outcome = match computed {
            Ok(delta) => {
                let stats = delta.statistics();
                let status = Status::evaluate(stats, &self.config);
                log::debug!(
                    "{}x{} image: max delta {}, mean delta {}: {status:?}",
                    delta.width(),
                    delta.height(),
                    Sig6(stats.max),
                    Sig6(stats.mean),
                );
                Outcome::Computed { delta, status }
            }
            Err(err) => {
                log::debug!("comparison ended early: {err}");
                Outcome::Error(err)
            }
        };
        Comparison {
            config: self.config,
            actual,
            expected,
            files,
            outcome,
        }
    }

    fn terminal<'a>(
        &self,
        actual: Option<Image<'a>>,
        expected: Option<Image<'a>>,
        files: Files,
        err: CompareError,
    ) -> Comparison<'a> {
        log::debug!("comparison ended early: {err}");
        Comparison {
            config: self.config,
            actual,
            expected,
            files,
            outcome: Outcome::Error(err),
        }
    }
}

fn load(decoder: &dyn ImageDecoder, side: Side, path: &Path) -> Result<PixelBuffer, CompareError> {
    decoder.decode(path).map_err(|source| {
        log::warn!("{side} image {} could not be loaded: {source}", path.display());
        CompareError::ImageLoad {
            side,
            path: path.to_path_buf(),
            source,
        }
    })
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Image<'a> {
    View(PixelView<'a>),
    Owned(PixelBuffer),
}

impl Image<'_> {
    fn view(&self) -> PixelView<'_> {
        match self {
            Self::View(view) => *view,
            Self::Owned(buffer) => buffer.as_view(),
        }
    }
}

#[derive(Debug, Default)]
struct Files {
    actual: Option<PathBuf>,
    expected: Option<PathBuf>,
}

#[derive(Debug)]
enum Outcome {
    Computed { delta: ImageDelta, status: Status },
    Error(CompareError),
}

/// Result of one comparison.
///
/// Holds the images (borrowed or loaded), the delta image and the
/// evaluated status, so reporting never recomputes anything.
#[derive(Debug)]
pub struct Comparison<'a> {
    config: CompareConfig,
    actual: Option<Image<'a>>,
    expected: Option<Image<'a>>,
    files: Files,
    outcome: Outcome,
}

impl<'a> Comparison<'a> {
    /// Threshold status, or `None` if the comparison ended with an error.
    pub fn status(&self) -> Option<Status> {
        match &self.outcome {
            Outcome::Computed { status, .. } => Some(*status),
            Outcome::Error(_) => None,
        }
    }

    /// The error that ended the comparison before deltas were computed.
    pub fn error(&self) -> Option<&CompareError> {
        match &self.outcome {
            Outcome::Computed { .. } => None,
            Outcome::Error(err) => Some(err),
        }
    }

    /// Computed per-pixel deltas.
    pub fn delta(&self) -> Option<&ImageDelta> {
        match &self.outcome {
            Outcome::Computed { delta, .. } => Some(delta),
            Outcome::Error(_) => None,
        }
    }

    /// Max / mean statistics of the computed deltas.
    pub fn statistics(&self) -> Option<DeltaStatistics> {
        self.delta().map(ImageDelta::statistics)
    }

    pub fn passed(&self) -> bool {
        self.status() == Some(Status::Passed)
    }

    pub fn flags(&self) -> ComparisonFlags {
        match &self.outcome {
            Outcome::Error(_) => ComparisonFlags {
                failed: true,
                diagnosable: false,
                verbose: false,
            },
            Outcome::Computed { delta, status } => {
                let failed = *status != Status::Passed;
                let nonzero = delta.statistics().max > 0.0;
                ComparisonFlags {
                    failed,
                    diagnosable: failed || nonzero,
                    verbose: !failed && nonzero,
                }
            }
        }
    }

    /// Path the actual image was loaded from, if any.
    pub fn actual_path(&self) -> Option<&Path> {
        self.files.actual.as_deref()
    }

    /// Path the expected image was loaded from, if any.
    pub fn expected_path(&self) -> Option<&Path> {
        self.files.expected.as_deref()
    }

    /// Render the report, naming the images `actual_name` and
    /// `expected_name`.
    ///
    /// Errors produce a single line. Computed comparisons produce a header
    /// line followed by the heat-map and, if any pixel qualifies, the
    /// pixel list.
    pub fn message(&self, actual_name: &str, expected_name: &str) -> String {
        let mut out = String::new();
        let (a, b) = (actual_name, expected_name);
        let (delta, status) = match &self.outcome {
            Outcome::Error(err) => {
                self.write_error(&mut out, err, a, b);
                return out;
            }
            Outcome::Computed { delta, status } => (delta, *status),
        };

        let stats = delta.statistics();
        let (max, mean) = (Sig6(stats.max), Sig6(stats.mean));
        let (max_t, mean_t) = (
            Sig6(self.config.max_threshold),
            Sig6(self.config.mean_threshold),
        );
        let _ = match status {
            Status::Passed if stats.max <= 0.0 => {
                let _ = write!(out, "Images {a} and {b} are identical.");
                return out;
            }
            Status::Passed => write!(
                out,
                "Images {a} and {b} have deltas {max}/{mean} below threshold {max_t}/{mean_t}."
            ),
            Status::AboveThresholds => write!(
                out,
                "Images {a} and {b} have both max and mean delta above threshold, \
                 actual {max}/{mean} but at most {max_t}/{mean_t} expected."
            ),
            Status::AboveMaxThreshold => write!(
                out,
                "Images {a} and {b} have max delta above threshold, actual {max} but at most \
                 {max_t} expected. Mean delta {mean} is within threshold {mean_t}."
            ),
            Status::AboveMeanThreshold => write!(
                out,
                "Images {a} and {b} have mean delta above threshold, actual {mean} but at most \
                 {mean_t} expected. Max delta {max} is within threshold {max_t}."
            ),
        };
        out.push_str(" Delta image:\n");
        let _ = write!(out, "{}", HeatMap::new(delta, stats.max, &self.config));

        if let (Some(actual), Some(expected)) = (&self.actual, &self.expected) {
            let list = PixelList::new(delta, actual.view(), expected.view(), &self.config);
            if !list.is_empty() {
                let _ = write!(out, "\n{list}");
            }
        }
        out
    }

    fn write_error(&self, out: &mut String, err: &CompareError, a: &str, b: &str) {
        let _ = match err {
            CompareError::SizeMismatch { actual, expected } => write!(
                out,
                "Images {a} and {b} have different size, actual {}x{} but {}x{} expected.",
                actual.0, actual.1, expected.0, expected.1
            ),
            CompareError::FormatMismatch { actual, expected } => write!(
                out,
                "Images {a} and {b} have different format, actual {actual} but {expected} expected."
            ),
            CompareError::NoMatchingFormat { element, expected } => write!(
                out,
                "Images {a} and {b} have different format, actual {element} but {expected} expected."
            ),
            CompareError::UnsupportedFormat { format } => {
                let actual_format = self.actual.as_ref().map(|image| image.view().format());
                let name = if actual_format == Some(*format) { a } else { b };
                write!(out, "Image {name} has unsupported pixel format {format}.")
            }
            CompareError::ImageLoad { side, path, source } => {
                let name = match side {
                    Side::Actual => a,
                    Side::Expected => b,
                };
                write!(
                    out,
                    "{side} image {name} ({}) could not be loaded: {source}",
                    path.display()
                )
            }
            other => write!(out, "Images {a} and {b} could not be compared: {other}."),
        };
    }

    /// Save the actual image through `encoder`.
    ///
    /// If `path` is an existing directory and the expected image came from
    /// a file, the expected file name is appended, so a failed comparison
    /// can be saved straight over a copy of the ground-truth tree. Returns
    /// the path written.
    ///
    /// # Errors
    ///
    /// - [`CompareError::NotDiagnosable`] if no deltas were computed
    /// - [`CompareError::EncoderUnavailable`] if `encoder` is `None` or
    ///   doesn't support the actual format
    /// - [`CompareError::Encode`] if the encoder fails
    pub fn save_diagnostic(
        &self,
        encoder: Option<&dyn ImageEncoder>,
        path: &Path,
    ) -> Result<PathBuf, CompareError> {
        let actual = match (&self.outcome, &self.actual) {
            (Outcome::Computed { .. }, Some(actual)) => actual.view(),
            _ => return Err(CompareError::NotDiagnosable),
        };
        let format = actual.format();
        let encoder = encoder
            .filter(|encoder| encoder.supports(format))
            .ok_or(CompareError::EncoderUnavailable { format })?;

        let target = match self.files.expected.as_deref().and_then(Path::file_name) {
            Some(name) if path.is_dir() => path.join(name),
            _ => path.to_path_buf(),
        };

        match encoder.encode(actual, &target) {
            Ok(()) => {
                log::debug!("saved actual {format} image to {}", target.display());
                Ok(target)
            }
            Err(source) => {
                log::warn!("failed to save diagnostic to {}: {source}", target.display());
                Err(CompareError::Encode {
                    path: target,
                    source,
                })
            }
        }
    }
}
