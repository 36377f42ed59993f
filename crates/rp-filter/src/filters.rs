use core::str::FromStr;

use rp_core::{RasterView, RowRange};
use serde::{Deserialize, Serialize};

use crate::border::BorderPolicy;
use crate::conv3x3::{saturate, sweep};
use crate::kernel::{BLUR, SHARPEN, SOBEL_X, SOBEL_Y};

/// RGB weights used to collapse color to luma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LumaWeights {
    /// `0.299 R + 0.587 G + 0.114 B`
    #[default]
    Rec601,
    /// `0.2126 R + 0.7152 G + 0.0722 B`
    Rec709,
}

impl LumaWeights {
    pub fn coefficients(self) -> [f32; 3] {
        match self {
            Self::Rec601 => [0.299, 0.587, 0.114],
            Self::Rec709 => [0.2126, 0.7152, 0.0722],
        }
    }

    #[inline]
    pub fn luma(self, r: u8, g: u8, b: u8) -> u8 {
        let [wr, wg, wb] = self.coefficients();
        saturate(wr * r as f32 + wg * g as f32 + wb * b as f32)
    }
}

impl FromStr for LumaWeights {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '.', '_'], "").as_str() {
            "rec601" | "bt601" => Ok(Self::Rec601),
            "rec709" | "bt709" => Ok(Self::Rec709),
            other => Err(format!("unknown luma weights '{other}', expected rec601|rec709")),
        }
    }
}

/// One pipeline filter together with its parameters.
///
/// Filters are stateless; [`Filter::apply_rows`] can be called concurrently
/// on disjoint row ranges of the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Grayscale(LumaWeights),
    Blur(BorderPolicy),
    Sharpen(BorderPolicy),
    Edge(BorderPolicy),
    /// Signed offset added to every color channel.
    Brightness(i16),
}

impl Filter {
    pub const DEFAULT_BRIGHTNESS: i16 = 50;

    /// Grayscale, Blur, Sharpen, Edge, Brightness, in that order.
    pub fn standard_chain(luma: LumaWeights, border: BorderPolicy, brightness: i16) -> [Filter; 5] {
        [
            Filter::Grayscale(luma),
            Filter::Blur(border),
            Filter::Sharpen(border),
            Filter::Edge(border),
            Filter::Brightness(brightness),
        ]
    }

    /// Short name, also used as the output file prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale(_) => "gray",
            Self::Blur(_) => "blur",
            Self::Sharpen(_) => "sharp",
            Self::Edge(_) => "edge",
            Self::Brightness(_) => "bright",
        }
    }

    /// Filters `rows` of `src` into `out`, which holds exactly those rows.
    pub fn apply_rows(&self, src: &RasterView<'_>, rows: RowRange, out: &mut [u8]) {
        match *self {
            Self::Grayscale(weights) => grayscale_rows(src, weights, rows, out),
            Self::Blur(border) => blur_rows(src, border, rows, out),
            Self::Sharpen(border) => sharpen_rows(src, border, rows, out),
            Self::Edge(border) => edge_rows(src, border, rows, out),
            Self::Brightness(offset) => brightness_rows(src, offset, rows, out),
        }
    }
}

/// Writes the luma of each pixel to R, G and B; alpha is passed through.
/// Rasters with fewer than 3 channels are copied unchanged.
pub fn grayscale_rows(src: &RasterView<'_>, weights: LumaWeights, rows: RowRange, out: &mut [u8]) {
    let span = rows.byte_span(src.row_len());
    let input = &src.data()[span];
    debug_assert_eq!(out.len(), input.len());

    if src.channels() < 3 {
        out.copy_from_slice(input);
        return;
    }

    let ch = src.channels();
    for (px_in, px_out) in input.chunks_exact(ch).zip(out.chunks_exact_mut(ch)) {
        let gray = weights.luma(px_in[0], px_in[1], px_in[2]);
        px_out[..3].fill(gray);
        if ch == 4 {
            px_out[3] = px_in[3];
        }
    }
}

/// Adds `offset` to every color channel with saturation; alpha is passed
/// through.
pub fn brightness_rows(src: &RasterView<'_>, offset: i16, rows: RowRange, out: &mut [u8]) {
    let span = rows.byte_span(src.row_len());
    let input = &src.data()[span];
    debug_assert_eq!(out.len(), input.len());

    let ch = src.channels();
    let colors = src.color_channels();
    let offset = offset as i32;
    for (px_in, px_out) in input.chunks_exact(ch).zip(out.chunks_exact_mut(ch)) {
        for c in 0..ch {
            px_out[c] = if c < colors {
                (px_in[c] as i32 + offset).clamp(0, 255) as u8
            } else {
                px_in[c]
            };
        }
    }
}

pub fn blur_rows(src: &RasterView<'_>, border: BorderPolicy, rows: RowRange, out: &mut [u8]) {
    sweep(src, rows, out, border, |nb| BLUR.apply(nb));
}

pub fn sharpen_rows(src: &RasterView<'_>, border: BorderPolicy, rows: RowRange, out: &mut [u8]) {
    sweep(src, rows, out, border, |nb| SHARPEN.apply(nb));
}

/// Sobel gradient magnitude `sqrt(gx^2 + gy^2)` per color channel. Both
/// gradients come from one neighborhood read.
pub fn edge_rows(src: &RasterView<'_>, border: BorderPolicy, rows: RowRange, out: &mut [u8]) {
    sweep(src, rows, out, border, |nb| {
        let gx = SOBEL_X.apply(nb);
        let gy = SOBEL_Y.apply(nb);
        (gx * gx + gy * gy).sqrt()
    });
}

#[cfg(test)]
mod tests {
    use rp_core::{RasterBuffer, RowRange};

    use super::{Filter, LumaWeights, brightness_rows, edge_rows, grayscale_rows};
    use crate::border::BorderPolicy;

    fn full(img: &RasterBuffer) -> RowRange {
        RowRange::new(0, img.height())
    }

    fn run(filter: Filter, src: &RasterBuffer, prefill: u8) -> RasterBuffer {
        let mut out =
            RasterBuffer::new_fill(src.width(), src.height(), src.channels(), prefill).expect("valid");
        filter.apply_rows(&src.as_view(), full(src), out.data_mut());
        out
    }

    #[test]
    fn luma_of_reference_color() {
        assert_eq!(LumaWeights::Rec601.luma(100, 150, 200), 141);
        assert_eq!(LumaWeights::Rec709.luma(100, 150, 200), 143);
        assert_eq!(LumaWeights::Rec601.luma(255, 255, 255), 255);
    }

    #[test]
    fn grayscale_is_stable_on_gray_input() {
        let data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v]).collect();
        let src = RasterBuffer::from_vec(16, 16, 3, data).expect("valid");
        for weights in [LumaWeights::Rec601, LumaWeights::Rec709] {
            let out = run(Filter::Grayscale(weights), &src, 0);
            assert_eq!(out.data(), src.data());
        }
    }

    #[test]
    fn grayscale_keeps_alpha_and_copies_single_channel() {
        let src = RasterBuffer::from_vec(1, 1, 4, vec![100, 150, 200, 9]).expect("valid");
        let out = run(Filter::Grayscale(LumaWeights::Rec601), &src, 0);
        assert_eq!(out.data(), &[141, 141, 141, 9]);

        let luma = RasterBuffer::from_vec(2, 1, 1, vec![3, 250]).expect("valid");
        let mut out = vec![0u8; 2];
        grayscale_rows(&luma.as_view(), LumaWeights::Rec601, full(&luma), &mut out);
        assert_eq!(out, vec![3, 250]);
    }

    #[test]
    fn brightness_saturates_both_ways() {
        let src = RasterBuffer::from_vec(2, 1, 3, vec![250, 10, 128, 0, 255, 205]).expect("valid");
        let mut out = vec![0u8; 6];
        brightness_rows(&src.as_view(), 50, full(&src), &mut out);
        assert_eq!(out, vec![255, 60, 178, 50, 255, 255]);

        brightness_rows(&src.as_view(), -50, full(&src), &mut out);
        assert_eq!(out, vec![200, 0, 78, 0, 205, 155]);
    }

    #[test]
    fn brightness_passes_alpha_through() {
        let src = RasterBuffer::from_vec(1, 1, 4, vec![250, 10, 0, 250]).expect("valid");
        let out = run(Filter::Brightness(50), &src, 0);
        assert_eq!(out.data(), &[255, 60, 50, 250]);
    }

    #[test]
    fn edge_on_flat_image_is_zero_inside() {
        let src = RasterBuffer::new_fill(6, 5, 3, 90).expect("valid");
        let out = run(Filter::Edge(BorderPolicy::Untouched), &src, 77);
        for y in 0..5 {
            for x in 0..6 {
                let border = x == 0 || y == 0 || x == 5 || y == 4;
                let expected = if border { 77 } else { 0 };
                assert_eq!(out.as_view().pixel(x, y), &[expected; 3], "({x},{y})");
            }
        }

        let clamped = run(Filter::Edge(BorderPolicy::Clamp), &src, 77);
        assert!(clamped.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn edge_responds_to_vertical_step() {
        #[rustfmt::skip]
        let data = vec![
            0, 0, 10, 10,
            0, 0, 10, 10,
            0, 0, 10, 10,
        ];
        let src = RasterBuffer::from_vec(4, 3, 1, data).expect("valid");
        let mut out = vec![0u8; 4];
        edge_rows(&src.as_view(), BorderPolicy::Untouched, RowRange::new(1, 2), &mut out);
        assert_eq!(out, vec![0, 40, 40, 0]);
    }

    #[test]
    fn border_policies_on_uniform_input() {
        let src = RasterBuffer::new_fill(5, 5, 3, 128).expect("valid");
        for filter in [
            Filter::Blur(BorderPolicy::Untouched),
            Filter::Sharpen(BorderPolicy::Untouched),
        ] {
            let out = run(filter, &src, 3);
            assert_eq!(out.get(0, 0, 0), Some(3));
            assert_eq!(out.get(4, 2, 1), Some(3));
            assert_eq!(out.get(2, 2, 2), Some(128));
        }

        for border in [BorderPolicy::CopyThrough, BorderPolicy::Clamp, BorderPolicy::Reflect101] {
            for filter in [Filter::Blur(border), Filter::Sharpen(border)] {
                let out = run(filter, &src, 3);
                assert_eq!(out.data(), src.data(), "{filter:?}");
            }
        }
    }

    #[test]
    fn tiny_rasters_are_all_border() {
        let src = RasterBuffer::from_vec(2, 1, 1, vec![40, 200]).expect("valid");
        let copied = run(Filter::Sharpen(BorderPolicy::CopyThrough), &src, 0);
        assert_eq!(copied.data(), &[40, 200]);

        let untouched = run(Filter::Blur(BorderPolicy::Untouched), &src, 5);
        assert_eq!(untouched.data(), &[5, 5]);

        let clamped = run(Filter::Blur(BorderPolicy::Clamp), &src, 0);
        // 0.75 * 40 + 0.25 * 200 and 0.25 * 40 + 0.75 * 200
        assert_eq!(clamped.data(), &[80, 160]);
    }

    #[test]
    fn names_match_output_prefixes() {
        let chain = Filter::standard_chain(LumaWeights::Rec601, BorderPolicy::CopyThrough, 50);
        let names: Vec<_> = chain.iter().map(Filter::name).collect();
        assert_eq!(names, ["gray", "blur", "sharp", "edge", "bright"]);
        assert_eq!("BT.709".parse::<LumaWeights>(), Ok(LumaWeights::Rec709));
    }
}
