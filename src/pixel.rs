//! Channel decoding and pixel value formatting.
//!
//! Raw channel bytes are native-endian. Every format decodes into up to
//! four `f32` values according to its [`ComponentKind`].

use alloc::string::String;
use core::fmt::{self, Write as _};

use half::f16;

use crate::format::{ComponentKind, PixelFormatInfo};

/// Decoded pixel, one `f32` per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelValue {
    channels: [f32; 4],
    len: u8,
}

impl PixelValue {
    /// Decode a pixel from its raw bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `info.bytes_per_pixel()`.
    pub fn decode(info: PixelFormatInfo, bytes: &[u8]) -> Self {
        let size = info.bytes_per_channel as usize;
        let mut channels = [0.0f32; 4];
        for (i, value) in channels
            .iter_mut()
            .take(info.channel_count as usize)
            .enumerate()
        {
            *value = decode_channel(info.kind, &bytes[i * size..(i + 1) * size]);
        }
        Self {
            channels,
            len: info.channel_count,
        }
    }

    /// Decoded channel values.
    #[inline]
    pub fn channels(&self) -> &[f32] {
        &self.channels[..self.len as usize]
    }
}

impl fmt::Display for PixelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Vector(")?;
        for (i, v) in self.channels().iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Sig6(*v))?;
        }
        f.write_str(")")
    }
}

/// Decode one channel. `bytes` holds exactly one channel.
pub fn decode_channel(kind: ComponentKind, bytes: &[u8]) -> f32 {
    match (kind, bytes.len()) {
        (ComponentKind::Unorm | ComponentKind::Srgb, 1) => bytes[0] as f32 / u8::MAX as f32,
        (ComponentKind::Unorm | ComponentKind::Srgb, 2) => {
            bytemuck::pod_read_unaligned::<u16>(bytes) as f32 / u16::MAX as f32
        }
        (ComponentKind::Unorm | ComponentKind::Srgb, _) => {
            (bytemuck::pod_read_unaligned::<u32>(bytes) as f64 / u32::MAX as f64) as f32
        }
        (ComponentKind::Snorm, 1) => (bytes[0] as i8 as f32 / i8::MAX as f32).max(-1.0),
        (ComponentKind::Snorm, 2) => {
            (bytemuck::pod_read_unaligned::<i16>(bytes) as f32 / i16::MAX as f32).max(-1.0)
        }
        (ComponentKind::Snorm, _) => {
            ((bytemuck::pod_read_unaligned::<i32>(bytes) as f64 / i32::MAX as f64) as f32)
                .max(-1.0)
        }
        (ComponentKind::UInt, 1) => bytes[0] as f32,
        (ComponentKind::UInt, 2) => bytemuck::pod_read_unaligned::<u16>(bytes) as f32,
        (ComponentKind::UInt, _) => bytemuck::pod_read_unaligned::<u32>(bytes) as f32,
        (ComponentKind::Int, 1) => bytes[0] as i8 as f32,
        (ComponentKind::Int, 2) => bytemuck::pod_read_unaligned::<i16>(bytes) as f32,
        (ComponentKind::Int, _) => bytemuck::pod_read_unaligned::<i32>(bytes) as f32,
        (ComponentKind::Float, 2) => {
            f16::from_bits(bytemuck::pod_read_unaligned::<u16>(bytes)).to_f32()
        }
        (ComponentKind::Float, _) => bytemuck::pod_read_unaligned::<f32>(bytes),
    }
}

/// Format raw pixel bytes for the diagnostic pixel list.
///
/// 8-bit normalized RGB/RGBA prints as a hex color, everything else as the
/// decoded channel values.
pub fn format_pixel(info: PixelFormatInfo, bytes: &[u8]) -> String {
    let mut out = String::new();
    let hex = info.bytes_per_channel == 1
        && matches!(info.kind, ComponentKind::Unorm | ComponentKind::Srgb)
        && matches!(info.channel_count, 3 | 4);
    if hex {
        out.push('#');
        for b in &bytes[..info.channel_count as usize] {
            let _ = write!(out, "{b:02x}");
        }
    } else {
        let _ = write!(out, "{}", PixelValue::decode(info, bytes));
    }
    out
}

/// `printf("%g")`-style float: six significant digits, trailing zeros
/// trimmed, `nan` / `inf` / `-inf` for specials.
#[derive(Clone, Copy, Debug)]
pub struct Sig6(pub f32);

impl fmt::Display for Sig6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
        }
        if v == 0.0 {
            return f.write_str(if v.is_sign_negative() { "-0" } else { "0" });
        }

        let v = v as f64;
        // Let the formatter do the rounding so the exponent accounts for
        // carries like 9.999999 -> 1e1.
        let sci = alloc::format!("{v:.5e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);

        if !(-4..6).contains(&exp) {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
        } else {
            let decimals = (5 - exp) as usize;
            let fixed = alloc::format!("{v:.decimals$}");
            f.write_str(trim_zeros(&fixed))
        }
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use alloc::string::ToString;

    fn info(format: PixelFormat) -> PixelFormatInfo {
        format.info().unwrap()
    }

    #[test]
    fn unorm_decoding() {
        let v = PixelValue::decode(info(PixelFormat::R8Unorm), &[255]);
        assert_eq!(v.channels(), &[1.0]);
        let v = PixelValue::decode(info(PixelFormat::R8Unorm), &[128]);
        assert!((v.channels()[0] - 0.501_960_8).abs() < 1e-6);
        let v = PixelValue::decode(info(PixelFormat::R16Unorm), &u16::MAX.to_ne_bytes());
        assert_eq!(v.channels(), &[1.0]);
    }

    #[test]
    fn srgb_decodes_like_unorm() {
        let a = PixelValue::decode(info(PixelFormat::Rgb8Srgb), &[10, 200, 77]);
        let b = PixelValue::decode(info(PixelFormat::Rgb8Unorm), &[10, 200, 77]);
        assert_eq!(a, b);
    }

    #[test]
    fn snorm_decoding_clamps() {
        let v = PixelValue::decode(info(PixelFormat::Rg8Snorm), &[127, (-128i8) as u8]);
        assert_eq!(v.channels(), &[1.0, -1.0]);
        let v = PixelValue::decode(info(PixelFormat::R16Snorm), &(-32767i16).to_ne_bytes());
        assert_eq!(v.channels(), &[-1.0]);
    }

    #[test]
    fn integer_decoding() {
        let v = PixelValue::decode(info(PixelFormat::R8I), &[(-5i8) as u8]);
        assert_eq!(v.channels(), &[-5.0]);
        let v = PixelValue::decode(info(PixelFormat::R32UI), &70000u32.to_ne_bytes());
        assert_eq!(v.channels(), &[70000.0]);
        let v = PixelValue::decode(info(PixelFormat::R16I), &(-300i16).to_ne_bytes());
        assert_eq!(v.channels(), &[-300.0]);
    }

    #[test]
    fn float_decoding() {
        let v = PixelValue::decode(info(PixelFormat::R16F), &f16::from_f32(0.5).to_bits().to_ne_bytes());
        assert_eq!(v.channels(), &[0.5]);

        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&1.25f32.to_ne_bytes());
        bytes[4..].copy_from_slice(&f32::NEG_INFINITY.to_ne_bytes());
        let v = PixelValue::decode(info(PixelFormat::Rg32F), &bytes);
        assert_eq!(v.channels(), &[1.25, f32::NEG_INFINITY]);
    }

    #[test]
    fn decoding_unaligned_bytes() {
        let mut bytes = [0u8; 5];
        bytes[1..].copy_from_slice(&3.5f32.to_ne_bytes());
        let v = PixelValue::decode(info(PixelFormat::R32F), &bytes[1..]);
        assert_eq!(v.channels(), &[3.5]);
    }

    #[test]
    fn sig6_formatting() {
        assert_eq!(Sig6(39.0).to_string(), "39");
        assert_eq!(Sig6(18.5).to_string(), "18.5");
        assert_eq!(Sig6(56.0 / 3.0).to_string(), "18.6667");
        assert_eq!(Sig6(0.3).to_string(), "0.3");
        assert_eq!(Sig6(-0.1).to_string(), "-0.1");
        assert_eq!(Sig6(1.0 / 255.0).to_string(), "0.00392157");
        assert_eq!(Sig6(0.0).to_string(), "0");
        assert_eq!(Sig6(1_000_000.0).to_string(), "1e+06");
        assert_eq!(Sig6(0.00001).to_string(), "1e-05");
        assert_eq!(Sig6(f32::NAN).to_string(), "nan");
        assert_eq!(Sig6(f32::INFINITY).to_string(), "inf");
        assert_eq!(Sig6(f32::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn pixel_formatting() {
        assert_eq!(
            format_pixel(info(PixelFormat::Rgb8Unorm), &[0xab, 0xcd, 0x85]),
            "#abcd85"
        );
        assert_eq!(
            format_pixel(info(PixelFormat::Rgba8Srgb), &[1, 2, 3, 0xff]),
            "#010203ff"
        );
        assert_eq!(
            format_pixel(info(PixelFormat::R32F), &0.3f32.to_ne_bytes()),
            "Vector(0.3)"
        );
        assert_eq!(
            format_pixel(info(PixelFormat::Rg8UI), &[3, 250]),
            "Vector(3, 250)"
        );
    }
}
