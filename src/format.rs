//! Pixel format tags and the static metadata table behind them.
//!
//! Every comparable format maps to exactly one [`PixelFormatInfo`] entry.
//! Depth/stencil and implementation-specific formats are known to the
//! table but rejected by [`PixelFormat::info`].

use core::fmt;

use crate::error::CompareError;

/// Numeric interpretation of a channel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ComponentKind {
    /// Unsigned normalized, `raw / max` in `[0, 1]`.
    Unorm,
    /// Signed normalized, `raw / max_positive` clamped to `[-1, 1]`.
    Snorm,
    /// Unsigned integer, compared as-is.
    UInt,
    /// Signed integer, compared as-is.
    Int,
    /// IEEE half or single precision float.
    Float,
    /// sRGB-encoded unsigned normalized. Compared like [`Unorm`](Self::Unorm),
    /// without gamma decoding.
    Srgb,
}

impl ComponentKind {
    /// Whether values are normalized into a `[-1, 1]` or `[0, 1]` range.
    #[inline]
    pub const fn is_normalized(self) -> bool {
        matches!(self, Self::Unorm | Self::Snorm | Self::Srgb)
    }
}

/// Static description of a [`PixelFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormatInfo {
    /// Number of channels, 1 to 4.
    pub channel_count: u8,
    /// Bytes used by a single channel.
    pub bytes_per_channel: u8,
    /// How channel bytes turn into a number.
    pub kind: ComponentKind,
    /// Depth and/or stencil data, never compared.
    pub is_depth_stencil: bool,
}

impl PixelFormatInfo {
    const fn color(channel_count: u8, bytes_per_channel: u8, kind: ComponentKind) -> Self {
        Self {
            channel_count,
            bytes_per_channel,
            kind,
            is_depth_stencil: false,
        }
    }

    const fn depth_stencil(channel_count: u8, bytes_per_channel: u8, kind: ComponentKind) -> Self {
        Self {
            channel_count,
            bytes_per_channel,
            kind,
            is_depth_stencil: true,
        }
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.channel_count as usize * self.bytes_per_channel as usize
    }
}

/// Pixel format tag.
///
/// Naming follows `<channels><bits><kind>`, e.g. [`Rgb8Srgb`](Self::Rgb8Srgb)
/// is three 8-bit sRGB-encoded channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    Rgb8Unorm,
    Rgba8Unorm,
    R8Snorm,
    Rg8Snorm,
    Rgb8Snorm,
    Rgba8Snorm,
    R8Srgb,
    Rg8Srgb,
    Rgb8Srgb,
    Rgba8Srgb,
    R8UI,
    Rg8UI,
    Rgb8UI,
    Rgba8UI,
    R8I,
    Rg8I,
    Rgb8I,
    Rgba8I,
    R16Unorm,
    Rg16Unorm,
    Rgb16Unorm,
    Rgba16Unorm,
    R16Snorm,
    Rg16Snorm,
    Rgb16Snorm,
    Rgba16Snorm,
    R16UI,
    Rg16UI,
    Rgb16UI,
    Rgba16UI,
    R16I,
    Rg16I,
    Rgb16I,
    Rgba16I,
    R32UI,
    Rg32UI,
    Rgb32UI,
    Rgba32UI,
    R32I,
    Rg32I,
    Rgb32I,
    Rgba32I,
    R16F,
    Rg16F,
    Rgb16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgb32F,
    Rgba32F,
    Depth16Unorm,
    Depth24Unorm,
    Depth32F,
    Stencil8UI,
    Depth16UnormStencil8UI,
    Depth24UnormStencil8UI,
    Depth32FStencil8UI,
    /// Opaque API- or vendor-specific format value. Never comparable.
    ImplementationSpecific(u32),
}

impl PixelFormat {
    /// Raw table lookup, including depth/stencil entries.
    ///
    /// Returns `None` only for [`ImplementationSpecific`](Self::ImplementationSpecific).
    pub const fn describe(self) -> Option<PixelFormatInfo> {
        use ComponentKind::*;
        use PixelFormatInfo as I;
        let info = match self {
            Self::R8Unorm => I::color(1, 1, Unorm),
            Self::Rg8Unorm => I::color(2, 1, Unorm),
            Self::Rgb8Unorm => I::color(3, 1, Unorm),
            Self::Rgba8Unorm => I::color(4, 1, Unorm),
            Self::R8Snorm => I::color(1, 1, Snorm),
            Self::Rg8Snorm => I::color(2, 1, Snorm),
            Self::Rgb8Snorm => I::color(3, 1, Snorm),
            Self::Rgba8Snorm => I::color(4, 1, Snorm),
            Self::R8Srgb => I::color(1, 1, Srgb),
            Self::Rg8Srgb => I::color(2, 1, Srgb),
            Self::Rgb8Srgb => I::color(3, 1, Srgb),
            Self::Rgba8Srgb => I::color(4, 1, Srgb),
            Self::R8UI => I::color(1, 1, UInt),
            Self::Rg8UI => I::color(2, 1, UInt),
            Self::Rgb8UI => I::color(3, 1, UInt),
            Self::Rgba8UI => I::color(4, 1, UInt),
            Self::R8I => I::color(1, 1, Int),
            Self::Rg8I => I::color(2, 1, Int),
            Self::Rgb8I => I::color(3, 1, Int),
            Self::Rgba8I => I::color(4, 1, Int),
            Self::R16Unorm => I::color(1, 2, Unorm),
            Self::Rg16Unorm => I::color(2, 2, Unorm),
            Self::Rgb16Unorm => I::color(3, 2, Unorm),
            Self::Rgba16Unorm => I::color(4, 2, Unorm),
            Self::R16Snorm => I::color(1, 2, Snorm),
            Self::Rg16Snorm => I::color(2, 2, Snorm),
            Self::Rgb16Snorm => I::color(3, 2, Snorm),
            Self::Rgba16Snorm => I::color(4, 2, Snorm),
            Self::R16UI => I::color(1, 2, UInt),
            Self::Rg16UI => I::color(2, 2, UInt),
            Self::Rgb16UI => I::color(3, 2, UInt),
            Self::Rgba16UI => I::color(4, 2, UInt),
            Self::R16I => I::color(1, 2, Int),
            Self::Rg16I => I::color(2, 2, Int),
            Self::Rgb16I => I::color(3, 2, Int),
            Self::Rgba16I => I::color(4, 2, Int),
            Self::R32UI => I::color(1, 4, UInt),
            Self::Rg32UI => I::color(2, 4, UInt),
            Self::Rgb32UI => I::color(3, 4, UInt),
            Self::Rgba32UI => I::color(4, 4, UInt),
            Self::R32I => I::color(1, 4, Int),
            Self::Rg32I => I::color(2, 4, Int),
            Self::Rgb32I => I::color(3, 4, Int),
            Self::Rgba32I => I::color(4, 4, Int),
            Self::R16F => I::color(1, 2, Float),
            Self::Rg16F => I::color(2, 2, Float),
            Self::Rgb16F => I::color(3, 2, Float),
            Self::Rgba16F => I::color(4, 2, Float),
            Self::R32F => I::color(1, 4, Float),
            Self::Rg32F => I::color(2, 4, Float),
            Self::Rgb32F => I::color(3, 4, Float),
            Self::Rgba32F => I::color(4, 4, Float),
            Self::Depth16Unorm => I::depth_stencil(1, 2, Unorm),
            // 24 significant bits stored in 32
            Self::Depth24Unorm => I::depth_stencil(1, 4, Unorm),
            Self::Depth32F => I::depth_stencil(1, 4, Float),
            Self::Stencil8UI => I::depth_stencil(1, 1, UInt),
            // Packed: the per-channel size is the padded storage split evenly.
            Self::Depth16UnormStencil8UI => I::depth_stencil(2, 2, Unorm),
            Self::Depth24UnormStencil8UI => I::depth_stencil(2, 2, Unorm),
            Self::Depth32FStencil8UI => I::depth_stencil(2, 4, Float),
            Self::ImplementationSpecific(_) => return None,
        };
        Some(info)
    }

    /// Metadata for a comparable format.
    ///
    /// # Errors
    ///
    /// [`CompareError::UnsupportedFormat`] for depth/stencil and
    /// implementation-specific formats.
    pub fn info(self) -> Result<PixelFormatInfo, CompareError> {
        match self.describe() {
            Some(info) if !info.is_depth_stencil => Ok(info),
            _ => Err(CompareError::UnsupportedFormat { format: self }),
        }
    }

    /// Whether [`info`](Self::info) succeeds for this format.
    #[inline]
    pub fn is_comparable(self) -> bool {
        self.info().is_ok()
    }

    /// Bytes per pixel, `None` for implementation-specific formats.
    #[inline]
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self.describe() {
            Some(info) => Some(info.bytes_per_pixel()),
            None => None,
        }
    }

    /// Every format with a table entry, in declaration order.
    pub const ALL: [PixelFormat; 59] = [
        Self::R8Unorm,
        Self::Rg8Unorm,
        Self::Rgb8Unorm,
        Self::Rgba8Unorm,
        Self::R8Snorm,
        Self::Rg8Snorm,
        Self::Rgb8Snorm,
        Self::Rgba8Snorm,
        Self::R8Srgb,
        Self::Rg8Srgb,
        Self::Rgb8Srgb,
        Self::Rgba8Srgb,
        Self::R8UI,
        Self::Rg8UI,
        Self::Rgb8UI,
        Self::Rgba8UI,
        Self::R8I,
        Self::Rg8I,
        Self::Rgb8I,
        Self::Rgba8I,
        Self::R16Unorm,
        Self::Rg16Unorm,
        Self::Rgb16Unorm,
        Self::Rgba16Unorm,
        Self::R16Snorm,
        Self::Rg16Snorm,
        Self::Rgb16Snorm,
        Self::Rgba16Snorm,
        Self::R16UI,
        Self::Rg16UI,
        Self::Rgb16UI,
        Self::Rgba16UI,
        Self::R16I,
        Self::Rg16I,
        Self::Rgb16I,
        Self::Rgba16I,
        Self::R32UI,
        Self::Rg32UI,
        Self::Rgb32UI,
        Self::Rgba32UI,
        Self::R32I,
        Self::Rg32I,
        Self::Rgb32I,
        Self::Rgba32I,
        Self::R16F,
        Self::Rg16F,
        Self::Rgb16F,
        Self::Rgba16F,
        Self::R32F,
        Self::Rg32F,
        Self::Rgb32F,
        Self::Rgba32F,
        Self::Depth16Unorm,
        Self::Depth24Unorm,
        Self::Depth32F,
        Self::Stencil8UI,
        Self::Depth16UnormStencil8UI,
        Self::Depth24UnormStencil8UI,
        Self::Depth32FStencil8UI,
    ];
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImplementationSpecific(raw) => write!(f, "ImplementationSpecific({raw:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}
