//! Foundational types for the row-parallel filter pipeline.
//!
//! ## Raster Layout
//! A raster is a flat `u8` array in row-major, channel-interleaved order.
//! Channel `c` of pixel `(x, y)` lives at `(y * width + x) * channels + c`, so
//! one row occupies `width * channels` contiguous bytes and a block of rows is
//! a contiguous sub-slice. Supported channel counts are 1 (luma), 3 (RGB) and
//! 4 (RGBA, alpha last).
//!
//! ## Row Ranges
//! [`RowRange`] is a half-open interval of rows. Workers are handed disjoint
//! ranges together with the matching disjoint byte band of the output raster,
//! which is what makes lock-free parallel writes sound.
//!
//! ## Scratch Buffers
//! [`RasterBuffer::with_capacity`] allocates a fixed byte budget up front;
//! [`RasterBuffer::reshape`] re-labels the buffer for a new image without
//! reallocating and fails with [`Error::BufferOverflow`] if the image does not
//! fit.

mod error;
mod raster;
mod rows;

pub use error::Error;
pub use raster::{RasterBuffer, RasterView, raster_len};
pub use rows::RowRange;
