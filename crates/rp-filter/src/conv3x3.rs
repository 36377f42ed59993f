use rp_core::{RasterView, RowRange};

use crate::border::{BorderPolicy, map_index};
use crate::kernel::{Kernel3x3, Neighborhood};

/// Clamps to `[0, 255]` and rounds to the nearest byte value.
#[inline]
pub fn saturate(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

/// Neighborhood of channel `c` around an interior pixel.
///
/// Requires `1 <= x < width - 1` and `1 <= y < height - 1`.
#[inline]
pub fn neighborhood(src: &RasterView<'_>, x: usize, y: usize, c: usize) -> Neighborhood {
    debug_assert!(x >= 1 && x + 1 < src.width());
    debug_assert!(y >= 1 && y + 1 < src.height());

    let data = src.data();
    let ch = src.channels();
    let row_len = src.row_len();
    let mut nb = [[0.0f32; 3]; 3];
    for (dy, nb_row) in nb.iter_mut().enumerate() {
        let base = (y + dy - 1) * row_len + (x - 1) * ch + c;
        nb_row[0] = data[base] as f32;
        nb_row[1] = data[base + ch] as f32;
        nb_row[2] = data[base + 2 * ch] as f32;
    }
    nb
}

/// Neighborhood of channel `c` around any pixel, with taps outside the raster
/// resolved by `policy`. `None` for policies that do not extend the raster.
pub fn neighborhood_extended(
    src: &RasterView<'_>,
    x: usize,
    y: usize,
    c: usize,
    policy: BorderPolicy,
) -> Option<Neighborhood> {
    let mut nb = [[0.0f32; 3]; 3];
    for (dy, nb_row) in nb.iter_mut().enumerate() {
        let sy = map_index(y as isize + dy as isize - 1, src.height(), policy)?;
        for (dx, v) in nb_row.iter_mut().enumerate() {
            let sx = map_index(x as isize + dx as isize - 1, src.width(), policy)?;
            *v = src.at(sx, sy, c) as f32;
        }
    }
    Some(nb)
}

/// Writes `clamp(sum(input * kernel))` for every interior pixel in `rows`.
///
/// `out` holds exactly the bytes of `rows`. Border pixels are not written.
pub fn convolve3x3(src: &RasterView<'_>, kernel: &Kernel3x3, rows: RowRange, out: &mut [u8]) {
    sweep(src, rows, out, BorderPolicy::Untouched, |nb| kernel.apply(nb));
}

/// Runs `response` over every pixel of `rows` and stores the saturated result.
///
/// Interior pixels read their neighborhood directly; border pixels follow
/// `border`. Alpha is copied wherever a pixel is written.
pub(crate) fn sweep<F>(
    src: &RasterView<'_>,
    rows: RowRange,
    out: &mut [u8],
    border: BorderPolicy,
    response: F,
) where
    F: Fn(&Neighborhood) -> f32,
{
    let w = src.width();
    let h = src.height();
    let ch = src.channels();
    let colors = src.color_channels();
    let row_len = src.row_len();
    debug_assert_eq!(out.len(), rows.len() * row_len, "band must cover rows");

    for (y, dst_row) in rows.rows().zip(out.chunks_exact_mut(row_len)) {
        let edge_row = y == 0 || y + 1 == h;
        for (x, px) in dst_row.chunks_exact_mut(ch).enumerate() {
            if edge_row || x == 0 || x + 1 == w {
                write_border(src, x, y, border, &response, px);
                continue;
            }

            for (c, v) in px.iter_mut().enumerate().take(colors) {
                *v = saturate(response(&neighborhood(src, x, y, c)));
            }
            if src.has_alpha() {
                px[3] = src.at(x, y, 3);
            }
        }
    }
}

fn write_border<F>(
    src: &RasterView<'_>,
    x: usize,
    y: usize,
    border: BorderPolicy,
    response: &F,
    px: &mut [u8],
) where
    F: Fn(&Neighborhood) -> f32,
{
    match border {
        BorderPolicy::Untouched => {}
        BorderPolicy::CopyThrough => px.copy_from_slice(src.pixel(x, y)),
        BorderPolicy::Clamp | BorderPolicy::Reflect101 => {
            for (c, v) in px.iter_mut().enumerate().take(src.color_channels()) {
                if let Some(nb) = neighborhood_extended(src, x, y, c, border) {
                    *v = saturate(response(&nb));
                }
            }
            if src.has_alpha() {
                px[3] = src.at(x, y, 3);
            }
        }
    }
}
