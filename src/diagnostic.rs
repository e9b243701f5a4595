//! Human-readable rendering of a delta image.
//!
//! [`HeatMap`] draws a downscaled ASCII picture of where the deltas are,
//! [`PixelList`] lists the worst offenders with their actual and expected
//! values. Both are [`Display`](fmt::Display) adapters so callers can
//! write them into any sink.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::buffer::PixelView;
use crate::config::CompareConfig;
use crate::delta::ImageDelta;
use crate::pixel::{Sig6, format_pixel};

/// Palette from zero delta to the scale maximum.
const PALETTE: &[u8; 17] = b" .,:~=+?7IZ$08DNM";

/// Left margin of every heat-map and pixel-list line.
const INDENT: &str = "          ";

const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

fn severity_color(value: f32, config: &CompareConfig) -> Option<&'static str> {
    if !value.is_finite() || value > config.max_threshold {
        Some(RED)
    } else if value > config.mean_threshold {
        Some(YELLOW)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// HeatMap
// ---------------------------------------------------------------------------

/// ASCII heat-map of a delta image.
///
/// Each character covers a block of `n` columns by `2n` rows, since
/// terminal cells are about twice as tall as they are wide. The block
/// shows the largest delta it covers, relative to `scale`. The bottom
/// image row is printed first.
pub struct HeatMap<'a> {
    delta: &'a ImageDelta,
    scale: f32,
    config: &'a CompareConfig,
}

impl<'a> HeatMap<'a> {
    /// Heat-map with the palette spanning `0..=scale`.
    pub fn new(delta: &'a ImageDelta, scale: f32, config: &'a CompareConfig) -> Self {
        Self {
            delta,
            scale,
            config,
        }
    }

    /// Pixels per block horizontally and vertically.
    fn block_size(&self) -> (u32, u32) {
        let columns = self.config.heatmap_columns.max(1);
        let px = self.delta.width().div_ceil(columns).max(1);
        (px, 2 * px)
    }

    /// Largest delta in a block. Any non-finite sample wins outright.
    fn block_value(&self, x0: u32, y0: u32, w: u32, h: u32) -> f32 {
        let mut value = 0.0f32;
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let d = self.delta.at(x, y);
                if !d.is_finite() {
                    return f32::INFINITY;
                }
                value = value.max(d);
            }
        }
        value
    }

    fn glyph(&self, value: f32) -> char {
        let last = PALETTE.len() - 1;
        if !value.is_finite() {
            return PALETTE[last] as char;
        }
        let ratio = if self.scale > 0.0 {
            (value / self.scale).min(1.0)
        } else {
            0.0
        };
        let index = (ratio * last as f32).round() as usize;
        PALETTE[index.min(last)] as char
    }
}

impl fmt::Display for HeatMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = (self.delta.width(), self.delta.height());
        let (bw, bh) = self.block_size();
        let (cols, rows) = (width.div_ceil(bw), height.div_ceil(bh));

        for row in 0..rows {
            if row != 0 {
                f.write_str("\n")?;
            }
            f.write_str(INDENT)?;
            f.write_str("|")?;
            let y0 = (rows - row - 1) * bh;
            let h = bh.min(height - y0);
            for col in 0..cols {
                let x0 = col * bw;
                let w = bw.min(width - x0);
                let value = self.block_value(x0, y0, w, h);
                let glyph = self.glyph(value);
                match severity_color(value, self.config).filter(|_| self.config.colors) {
                    Some(color) => write!(f, "{color}{glyph}{RESET}")?,
                    None => write!(f, "{glyph}")?,
                }
            }
            f.write_str("|")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PixelList
// ---------------------------------------------------------------------------

/// List of the largest pixel deltas with their actual and expected values.
///
/// Lists pixels above the mean threshold plus every non-finite one,
/// non-finite first, then by descending delta. Renders nothing when no
/// pixel qualifies.
pub struct PixelList<'a> {
    delta: &'a ImageDelta,
    actual: PixelView<'a>,
    expected: PixelView<'a>,
    config: &'a CompareConfig,
}

impl<'a> PixelList<'a> {
    pub fn new(
        delta: &'a ImageDelta,
        actual: PixelView<'a>,
        expected: PixelView<'a>,
        config: &'a CompareConfig,
    ) -> Self {
        Self {
            delta,
            actual,
            expected,
            config,
        }
    }

    /// Row-major indices of all qualifying pixels, in listing order.
    pub fn candidates(&self) -> Vec<usize> {
        let samples = self.delta.samples();
        let threshold = self.config.mean_threshold;
        let mut indices: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|&(_, d)| !d.is_finite() || *d > threshold)
            .map(|(i, _)| i)
            .collect();
        indices.sort_by(|&a, &b| {
            let (da, db) = (samples[a], samples[b]);
            da.is_finite()
                .cmp(&db.is_finite())
                .then_with(|| {
                    if da.is_finite() && db.is_finite() {
                        db.total_cmp(&da)
                    } else {
                        Ordering::Equal
                    }
                })
                .then(a.cmp(&b))
        });
        indices
    }

    /// Whether at least one pixel would be listed.
    pub fn is_empty(&self) -> bool {
        let threshold = self.config.mean_threshold;
        !self
            .delta
            .samples()
            .iter()
            .any(|d| !d.is_finite() || *d > threshold)
    }
}

impl fmt::Display for PixelList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates = self.candidates();
        if candidates.is_empty() {
            return Ok(());
        }
        // Formats were validated when the delta was computed.
        let (Ok(actual_info), Ok(expected_info)) =
            (self.actual.format().info(), self.expected.format().info())
        else {
            return Err(fmt::Error);
        };

        let limit = self.config.max_listed_pixels;
        if candidates.len() > limit {
            write!(
                f,
                "        Top {limit} out of {} pixels above max/mean threshold:",
                candidates.len()
            )?;
        } else {
            f.write_str("        Pixels above max/mean threshold:")?;
        }

        let width = self.delta.width() as usize;
        for &index in candidates.iter().take(limit) {
            let (x, y) = ((index % width) as u32, (index / width) as u32);
            let d = self.delta.samples()[index];
            write!(
                f,
                "\n{INDENT}[{x},{y}] {}, expected {} (Δ = ",
                format_pixel(actual_info, self.actual.pixel(x, y)),
                format_pixel(expected_info, self.expected.pixel(x, y)),
            )?;
            match severity_color(d, self.config).filter(|_| self.config.colors) {
                Some(color) => write!(f, "{color}{}{RESET})", Sig6(d))?,
                None => write!(f, "{})", Sig6(d))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use alloc::string::ToString;
    use alloc::vec;

    const INF: f32 = f32::INFINITY;
    const NAN: f32 = f32::NAN;

    fn plain(max: f32, mean: f32) -> CompareConfig {
        CompareConfig::new(max, mean).with_colors(false)
    }

    fn delta(samples: &[f32], width: u32, height: u32) -> ImageDelta {
        ImageDelta::from_samples(samples.to_vec(), width, height).unwrap()
    }

    fn gradient(width: u32, height: u32, norm: f32) -> ImageDelta {
        let mut samples = vec![0.0f32; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let (fx, fy) = (x as f32, y as f32);
                samples[(y * width + x) as usize] = (fx * fx + fy * fy).sqrt() / norm;
            }
        }
        ImageDelta::from_samples(samples, width, height).unwrap()
    }

    #[test]
    fn heatmap_gradient() {
        let d = gradient(32, 32, (2.0f32 * 32.0 * 32.0).sqrt());
        let config = plain(0.0, 0.0);
        assert_eq!(
            HeatMap::new(&d, 1.0, &config).to_string(),
            "          |$$$$$$$$$$0000000888888DDDDNNNNM|\n\
             \x20         |ZZZZZZZ$$$$$$$$0000008888DDDDNNN|\n\
             \x20         |ZZZZZZZZZZZZZ$$$$$$00008888DDDDN|\n\
             \x20         |IIIIIIIIIIZZZZZZZ$$$$00008888DDD|\n\
             \x20         |7777777IIIIIIIZZZZZ$$$$00008888D|\n\
             \x20         |???777777777IIIIIZZZZ$$$$0000888|\n\
             \x20         |??????????77777IIIIZZZZ$$$$00088|\n\
             \x20         |+++++++??????7777IIIIZZZZ$$$0008|\n\
             \x20         |=====++++++????7777IIIIZZZ$$$000|\n\
             \x20         |=========++++????7777IIIZZZ$$$00|\n\
             \x20         |~~~~~~~====++++????777IIIZZZ$$$0|\n\
             \x20         |:::::~~~~====++++???777IIIZZZ$$$|\n\
             \x20         |,::::::~~~~===+++????77IIIZZZ$$$|\n\
             \x20         |,,,,,::::~~~===+++???777IIIZZZ$$|\n\
             \x20         |...,,,,:::~~~===+++??777IIIZZZ$$|\n\
             \x20         | ....,,:::~~~===+++???777IIZZZ$$|"
        );
    }

    #[test]
    fn heatmap_downscales_wide_images() {
        let d = gradient(65, 40, (65.0f32 * 65.0 + 40.0 * 40.0).sqrt());
        let config = plain(0.0, 0.0);
        assert_eq!(
            HeatMap::new(&d, 1.0, &config).to_string(),
            "          |777777IIIIIIZZZZ$$$0000888DDDNNMM|\n\
             \x20         |????777777IIIIZZZZ$$$000888DDDNNN|\n\
             \x20         |?????????7777IIIIZZZ$$$00888DDDNN|\n\
             \x20         |++++++++????777IIIZZZ$$$00088DDDN|\n\
             \x20         |======++++????777IIIZZ$$$00088DDD|\n\
             \x20         |~~~~~====+++???777IIIZZ$$$00888DD|\n\
             \x20         |::::~~~~===+++??777IIZZZ$$00088DD|\n\
             \x20         |,,::::~~~===++???777IIZZ$$$00888D|\n\
             \x20         |.,,,,:::~~===++???77IIZZZ$$000888|\n\
             \x20         |...,,,::~~~==++???77IIIZZ$$000888|"
        );
    }

    const DELTA_RED: [f32; 9] = [0.35, 0.0, 0.3, 0.01, 0.0, 0.1, 0.12, 1.0, 0.0];

    #[test]
    fn heatmap_merges_row_pairs() {
        let d = delta(&DELTA_RED, 3, 3);
        let config = plain(0.5, 0.2);
        assert_eq!(
            HeatMap::new(&d, 2.0, &config).to_string(),
            "          |.7 |\n          |: ,|"
        );
    }

    #[test]
    fn heatmap_colors() {
        let d = delta(&DELTA_RED, 3, 3);
        let config = CompareConfig::new(0.5, 0.2);
        let out = HeatMap::new(&d, 2.0, &config).to_string();
        // 1.0 is above max, 0.35 and 0.3 above mean, the rest plain.
        assert_eq!(
            out,
            "          |.\x1b[1;31m7\x1b[0m |\n          \
             |\x1b[1;33m:\x1b[0m \x1b[1;33m,\x1b[0m|"
        );
    }

    #[test]
    fn heatmap_specials() {
        let d = delta(
            &[
                0.7, INF, 2.5, //
                0.7, NAN, 2.5, //
                NAN, INF, 0.0, //
                NAN, INF, 0.0,
            ],
            3,
            4,
        );
        let config = plain(0.0, 0.0);
        assert_eq!(
            HeatMap::new(&d, 3.0, &config).to_string(),
            "          |MM |\n          |~M8|"
        );
    }

    #[test]
    fn heatmap_column_cap() {
        let d = delta(&[1.0; 8], 8, 1);
        let config = plain(0.0, 0.0).with_heatmap_columns(4);
        assert_eq!(HeatMap::new(&d, 1.0, &config).to_string(), "          |MMMM|");
    }

    #[test]
    fn heatmap_zero_scale() {
        let d = delta(&[0.0, 0.0], 2, 1);
        let config = plain(0.0, 0.0);
        assert_eq!(HeatMap::new(&d, 0.0, &config).to_string(), "          |  |");
    }

    fn red_views() -> (Vec<u8>, Vec<u8>) {
        let actual: [f32; 9] = [0.3, 1.0, 0.9, 0.9, 0.6, 0.2, -0.1, 1.0, 0.0];
        let expected: [f32; 9] = [0.65, 1.0, 0.6, 0.91, 0.6, 0.1, 0.02, 0.0, 0.0];
        (
            actual.iter().flat_map(|v| v.to_ne_bytes()).collect(),
            expected.iter().flat_map(|v| v.to_ne_bytes()).collect(),
        )
    }

    #[test]
    fn pixel_list() {
        let (a, e) = red_views();
        let actual = PixelView::packed(&a, 3, 3, PixelFormat::R32F).unwrap();
        let expected = PixelView::packed(&e, 3, 3, PixelFormat::R32F).unwrap();
        let d = delta(&DELTA_RED, 3, 3);
        let config = plain(0.5, 0.1);
        assert_eq!(
            PixelList::new(&d, actual, expected, &config).to_string(),
            "        Pixels above max/mean threshold:\n\
             \x20         [1,2] Vector(1), expected Vector(0) (Δ = 1)\n\
             \x20         [0,0] Vector(0.3), expected Vector(0.65) (Δ = 0.35)\n\
             \x20         [2,0] Vector(0.9), expected Vector(0.6) (Δ = 0.3)\n\
             \x20         [0,2] Vector(-0.1), expected Vector(0.02) (Δ = 0.12)"
        );
    }

    #[test]
    fn pixel_list_empty() {
        let (a, e) = red_views();
        let actual = PixelView::packed(&a, 3, 3, PixelFormat::R32F).unwrap();
        let expected = PixelView::packed(&e, 3, 3, PixelFormat::R32F).unwrap();
        let d = delta(&DELTA_RED, 3, 3);
        let config = plain(1.0, 1.0);
        let list = PixelList::new(&d, actual, expected, &config);
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "");
    }

    #[test]
    fn pixel_list_overflow() {
        let (a, e) = red_views();
        let actual = PixelView::packed(&a, 3, 3, PixelFormat::R32F).unwrap();
        let expected = PixelView::packed(&e, 3, 3, PixelFormat::R32F).unwrap();
        let d = delta(&DELTA_RED, 3, 3);
        let config = plain(0.5, 0.1).with_max_listed_pixels(3);
        assert_eq!(
            PixelList::new(&d, actual, expected, &config).to_string(),
            "        Top 3 out of 4 pixels above max/mean threshold:\n\
             \x20         [1,2] Vector(1), expected Vector(0) (Δ = 1)\n\
             \x20         [0,0] Vector(0.3), expected Vector(0.65) (Δ = 0.35)\n\
             \x20         [2,0] Vector(0.9), expected Vector(0.6) (Δ = 0.3)"
        );
    }

    #[test]
    fn pixel_list_specials_first() {
        let a: Vec<u8> = [INF, 0.3, NAN, 0.3, -INF, -INF, NAN, 0.3, 3.0]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let e: Vec<u8> = [1.0, -INF, 0.3, NAN, -INF, INF, NAN, 0.65, -0.1]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let actual = PixelView::packed(&a, 9, 1, PixelFormat::R32F).unwrap();
        let expected = PixelView::packed(&e, 9, 1, PixelFormat::R32F).unwrap();
        let d = ImageDelta::compute(&actual, &expected).unwrap();
        let config = plain(1.5, 0.5);
        assert_eq!(
            PixelList::new(&d, actual, expected, &config).to_string(),
            "        Pixels above max/mean threshold:\n\
             \x20         [0,0] Vector(inf), expected Vector(1) (Δ = inf)\n\
             \x20         [1,0] Vector(0.3), expected Vector(-inf) (Δ = inf)\n\
             \x20         [2,0] Vector(nan), expected Vector(0.3) (Δ = nan)\n\
             \x20         [3,0] Vector(0.3), expected Vector(nan) (Δ = nan)\n\
             \x20         [5,0] Vector(-inf), expected Vector(inf) (Δ = inf)\n\
             \x20         [8,0] Vector(3), expected Vector(-0.1) (Δ = 3.1)"
        );
    }

    #[test]
    fn pixel_list_hex_colors() {
        let a = [0x56u8, 0xf8, 0x3a, 0xab, 0xcd, 0x85];
        let e = [0x55u8, 0xf8, 0x3a, 0xab, 0xcd, 0xfa];
        let actual = PixelView::packed(&a, 2, 1, PixelFormat::Rgb8UI).unwrap();
        let expected = PixelView::packed(&e, 2, 1, PixelFormat::Rgb8UI).unwrap();
        let d = ImageDelta::compute(&actual, &expected).unwrap();
        let config = plain(20.0, 10.0);
        // Integer formats print values, not hex.
        assert_eq!(
            PixelList::new(&d, actual, expected, &config).to_string(),
            "        Pixels above max/mean threshold:\n\
             \x20         [1,0] Vector(171, 205, 133), expected Vector(171, 205, 250) (Δ = 39)"
        );

        let actual = actual.with_format(PixelFormat::Rgb8Unorm).unwrap();
        let expected = expected.with_format(PixelFormat::Rgb8Unorm).unwrap();
        let d = ImageDelta::compute(&actual, &expected).unwrap();
        let config = plain(0.1, 0.1);
        assert_eq!(
            PixelList::new(&d, actual, expected, &config).to_string(),
            "        Pixels above max/mean threshold:\n\
             \x20         [1,0] #abcd85, expected #abcdfa (Δ = 0.152941)"
        );
    }

    #[test]
    fn ties_keep_row_major_order() {
        let a = [0u8; 4];
        let actual = PixelView::packed(&a, 2, 2, PixelFormat::R8UI).unwrap();
        let d = delta(&[0.5, 1.0, 1.0, 0.5], 2, 2);
        let config = plain(1.0, 0.0);
        let list = PixelList::new(&d, actual, actual, &config);
        assert_eq!(list.candidates(), vec![1, 2, 0, 3]);
    }
}
