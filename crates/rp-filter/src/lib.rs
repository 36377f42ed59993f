//! Per-pixel filter kernels that run on an arbitrary contiguous row range.
//!
//! Every kernel reads a frozen input [`RasterView`](rp_core::RasterView) and
//! writes only the bytes of the rows it was given, so disjoint row ranges can
//! be processed concurrently and the result does not depend on how the rows
//! were split.
//!
//! ## Convolution
//! [`convolve3x3`] computes `clamp(sum(input * kernel), 0, 255)` for interior
//! pixels only. Pixels on the outer ring are handled by the caller's
//! [`BorderPolicy`]: left untouched, copied from the input, or computed with a
//! clamp-to-edge / reflect-101 extended neighborhood.
//!
//! ## Alpha
//! For 4-channel rasters only channels 0..3 are filtered. Channel 3 is copied
//! from the input by every kernel.
//!
//! ## Narrowing
//! Results are clamped to `[0, 255]` and rounded to the nearest integer.

mod border;
mod conv3x3;
mod filters;
mod kernel;

pub use border::{BorderPolicy, map_index};
pub use conv3x3::{convolve3x3, neighborhood, neighborhood_extended, saturate};
pub use filters::{
    Filter, LumaWeights, blur_rows, brightness_rows, edge_rows, grayscale_rows, sharpen_rows,
};
pub use kernel::{BLUR, Kernel3x3, Neighborhood, SHARPEN, SOBEL_X, SOBEL_Y};
