//! Strided pixel storage.
//!
//! [`PixelView`] is a borrowed, format-tagged view over rows of pixel
//! bytes. Rows may carry trailing padding and views may be cropped out of
//! a larger image, so two images with different storage layouts compare
//! pixel-for-pixel as long as their logical size matches.
//! [`PixelBuffer`] is the owned counterpart returned by image decoders.

use alloc::vec::Vec;
use core::fmt;

use crate::format::PixelFormat;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from constructing pixel views and buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// Data slice is too small for the given dimensions and stride.
    InsufficientData,
    /// Stride is smaller than `width * bytes_per_pixel`.
    StrideTooSmall,
    /// Width or height causes overflow.
    InvalidDimensions,
    /// Format has no known pixel size.
    UnsupportedFormat,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "data slice is too small for the given dimensions")
            }
            Self::StrideTooSmall => write!(f, "stride is smaller than width * bytes_per_pixel"),
            Self::InvalidDimensions => write!(f, "width or height causes overflow"),
            Self::UnsupportedFormat => write!(f, "pixel format has no known size"),
        }
    }
}

impl core::error::Error for BufferError {}

/// Validate geometry and return bytes per pixel.
fn check_layout(
    len: usize,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
) -> Result<usize, BufferError> {
    let bpp = format
        .bytes_per_pixel()
        .ok_or(BufferError::UnsupportedFormat)?;
    let min_stride = (width as usize)
        .checked_mul(bpp)
        .ok_or(BufferError::InvalidDimensions)?;
    if stride < min_stride {
        return Err(BufferError::StrideTooSmall);
    }
    if height > 0 && width > 0 {
        // The last row only needs its pixels, not its padding.
        let required = (height as usize - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(min_stride))
            .ok_or(BufferError::InvalidDimensions)?;
        if len < required {
            return Err(BufferError::InsufficientData);
        }
    }
    Ok(bpp)
}

// ---------------------------------------------------------------------------
// PixelView (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Borrowed view of pixel data.
///
/// Owns no memory. All rows share the same stride; the first row is the
/// bottom row of the image when coordinates are reported.
#[derive(Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
    bpp: usize,
    format: PixelFormat,
}

impl<'a> PixelView<'a> {
    /// Create a view with an explicit row stride in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride is smaller than a row of pixels, the
    /// data is too short, or the format has no known pixel size.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, BufferError> {
        let bpp = check_layout(data.len(), width, height, stride, format)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            bpp,
            format,
        })
    }

    /// Create a view over tightly packed rows.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn packed(
        data: &'a [u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, BufferError> {
        let bpp = format
            .bytes_per_pixel()
            .ok_or(BufferError::UnsupportedFormat)?;
        let stride = (width as usize)
            .checked_mul(bpp)
            .ok_or(BufferError::InvalidDimensions)?;
        Self::new(data, width, height, stride, format)
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

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per pixel.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.bpp
    }

    /// Pixel format tag.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel bytes for row `y` (no padding, exactly `width * bpp` bytes).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let len = self.width as usize * self.bpp;
        if len == 0 {
            return &[];
        }
        let start = y as usize * self.stride;
        &self.data[start..start + len]
    }

    /// Bytes of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &'a [u8] {
        assert!(
            x < self.width,
            "column index {x} out of bounds (width: {})",
            self.width
        );
        let start = x as usize * self.bpp;
        &self.row(y)[start..start + self.bpp]
    }

    /// Zero-copy crop view. Stride stays the same as the parent.
    ///
    /// # Panics
    ///
    /// Panics if the crop region is out of bounds.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> PixelView<'a> {
        assert!(
            x.checked_add(w).is_some_and(|end| end <= self.width),
            "crop x={x} w={w} exceeds width {}",
            self.width
        );
        assert!(
            y.checked_add(h).is_some_and(|end| end <= self.height),
            "crop y={y} h={h} exceeds height {}",
            self.height
        );
        if h == 0 || w == 0 {
            return PixelView {
                data: &[],
                width: w,
                height: h,
                stride: self.stride,
                bpp: self.bpp,
                format: self.format,
            };
        }
        let start = y as usize * self.stride + x as usize * self.bpp;
        let end = (y as usize + h as usize - 1) * self.stride + (x as usize + w as usize) * self.bpp;
        PixelView {
            data: &self.data[start..end],
            width: w,
            height: h,
            stride: self.stride,
            bpp: self.bpp,
            format: self.format,
        }
    }

    /// Same bytes reinterpreted as another format with the same pixel size.
    ///
    /// Returns `None` if the pixel sizes differ.
    pub fn with_format(&self, format: PixelFormat) -> Option<PixelView<'a>> {
        (format.bytes_per_pixel() == Some(self.bpp)).then_some(PixelView {
            format,
            ..*self
        })
    }

    /// Copy into a tightly packed owned buffer.
    pub fn to_buffer(&self) -> PixelBuffer {
        let row_bytes = self.width as usize * self.bpp;
        let mut data = Vec::with_capacity(row_bytes * self.height as usize);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        PixelBuffer {
            data,
            width: self.width,
            height: self.height,
            stride: row_bytes,
            format: self.format,
        }
    }
}

impl fmt::Debug for PixelView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelView({}x{}, {}, stride {})",
            self.width, self.height, self.format, self.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer (owned)
// ---------------------------------------------------------------------------

/// Owned pixel buffer with format metadata.
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl PixelBuffer {
    /// Wrap an existing `Vec<u8>` with an explicit stride.
    ///
    /// # Errors
    ///
    /// Same validation as [`PixelView::new`].
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, BufferError> {
        check_layout(data.len(), width, height, stride, format)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    /// Wrap a `Vec<u8>` of tightly packed rows.
    ///
    /// # Errors
    ///
    /// Same validation as [`PixelView::new`].
    pub fn packed(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, BufferError> {
        let bpp = format
            .bytes_per_pixel()
            .ok_or(BufferError::UnsupportedFormat)?;
        let stride = (width as usize)
            .checked_mul(bpp)
            .ok_or(BufferError::InvalidDimensions)?;
        Self::from_vec(data, width, height, stride, format)
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

    /// Pixel format tag.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Borrow as a [`PixelView`].
    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            bpp: self.format.bytes_per_pixel().unwrap_or(0),
            format: self.format,
        }
    }

    /// Consume the buffer and return the backing bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {})",
            self.width, self.height, self.format
        )
    }
}
