//! Typed pixel elements and format autodetection.
//!
//! [`PixelElement`] maps a Rust element type (a scalar, a `[T; N]`
//! vector, or an [`rgb`] color) to an [`ElementType`]. [`resolve`] then
//! picks the concrete [`PixelFormat`] a typed buffer should be read as,
//! given the format of the image it is compared against.

use core::fmt;
use core::mem::size_of;

use half::f16;
use imgref::ImgRef;
use rgb::{Rgb, Rgba};

use crate::buffer::{BufferError, PixelView};
use crate::error::CompareError;
use crate::format::{ComponentKind, PixelFormat};

/// Scalar component type of a typed element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F16,
    F32,
}

impl ScalarType {
    /// Size of one component in bytes.
    pub const fn size(self) -> u8 {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
        }
    }

    /// Whether this is `f16` or `f32`.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }

    /// Whether this is a signed integer type.
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F16 => "f16",
            Self::F32 => "f32",
        }
    }
}

/// Shape of a typed pixel element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementType {
    pub scalar: ScalarType,
    /// 1 to 4.
    pub channels: u8,
    /// Color vector (`Rgb`/`Rgba`) rather than a plain vector.
    pub color: bool,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.scalar.name();
        match (self.color, self.channels) {
            (true, 3) => write!(f, "Rgb<{s}>"),
            (true, _) => write!(f, "Rgba<{s}>"),
            (false, 1) => f.write_str(s),
            (false, n) => write!(f, "[{s}; {n}]"),
        }
    }
}

/// A Rust type usable as one pixel of a typed image.
pub trait PixelElement: bytemuck::Pod {
    /// Shape of this element.
    const ELEMENT: ElementType;
}

macro_rules! impl_pixel_element {
    ($($t:ty => $scalar:ident),* $(,)?) => {$(
        impl PixelElement for $t {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 1, color: false };
        }
        impl PixelElement for [$t; 2] {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 2, color: false };
        }
        impl PixelElement for [$t; 3] {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 3, color: false };
        }
        impl PixelElement for [$t; 4] {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 4, color: false };
        }
        impl PixelElement for Rgb<$t> {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 3, color: true };
        }
        impl PixelElement for Rgba<$t> {
            const ELEMENT: ElementType = ElementType { scalar: ScalarType::$scalar, channels: 4, color: true };
        }
    )*};
}

impl_pixel_element! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f16 => F16,
    f32 => F32,
}

/// Find the comparable format with this shape.
fn find_format(channels: u8, bytes_per_channel: u8, kind: ComponentKind) -> Option<PixelFormat> {
    PixelFormat::ALL.into_iter().find(|f| {
        f.info().is_ok_and(|info| {
            info.channel_count == channels
                && info.bytes_per_channel == bytes_per_channel
                && info.kind == kind
        })
    })
}

/// Pick the format a typed buffer of `element` is read as when compared
/// against an image in `expected`.
///
/// In priority order:
///
/// 1. float elements use the matching float format;
/// 2. an sRGB expected format selects the sRGB format of an 8-bit unsigned element;
/// 3. a normalized expected format selects the normalized format of an 8/16-bit element;
/// 4. plain vectors fall back to the integer format;
/// 5. color vectors matching none of the above fail.
///
/// # Errors
///
/// [`CompareError::UnsupportedFormat`] if `expected` is not comparable and
/// [`CompareError::NoMatchingFormat`] for rule 5.
pub fn resolve(element: ElementType, expected: PixelFormat) -> Result<PixelFormat, CompareError> {
    let expected_kind = expected.info()?.kind;
    let ElementType {
        scalar,
        channels,
        color,
    } = element;
    let size = scalar.size();

    let resolved = if scalar.is_float() {
        find_format(channels, size, ComponentKind::Float)
    } else if expected_kind == ComponentKind::Srgb && scalar == ScalarType::U8 {
        find_format(channels, size, ComponentKind::Srgb)
    } else if expected_kind.is_normalized() && size <= 2 {
        let kind = if scalar.is_signed_int() {
            ComponentKind::Snorm
        } else {
            ComponentKind::Unorm
        };
        find_format(channels, size, kind)
    } else if !color {
        let kind = if scalar.is_signed_int() {
            ComponentKind::Int
        } else {
            ComponentKind::UInt
        };
        find_format(channels, size, kind)
    } else {
        None
    };

    match resolved {
        Some(format) => {
            log::trace!("resolved {element} against {expected} as {format}");
            Ok(format)
        }
        None => Err(CompareError::NoMatchingFormat { element, expected }),
    }
}

/// View a typed image as raw bytes tagged with `format`.
///
/// # Errors
///
/// Returns [`BufferError`] if the image dimensions don't fit in `u32` or
/// `format` has a different pixel size than `T`.
pub fn typed_view<'a, T: PixelElement>(
    img: ImgRef<'a, T>,
    format: PixelFormat,
) -> Result<PixelView<'a>, BufferError> {
    if format.bytes_per_pixel() != Some(size_of::<T>()) {
        return Err(BufferError::UnsupportedFormat);
    }
    let width = u32::try_from(img.width()).map_err(|_| BufferError::InvalidDimensions)?;
    let height = u32::try_from(img.height()).map_err(|_| BufferError::InvalidDimensions)?;
    let stride = img
        .stride()
        .checked_mul(size_of::<T>())
        .ok_or(BufferError::InvalidDimensions)?;
    let data: &'a [u8] = bytemuck::cast_slice(img.into_buf());
    PixelView::new(data, width, height, stride, format)
}
