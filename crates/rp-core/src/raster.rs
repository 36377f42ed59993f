use crate::{Error, RowRange};

/// Number of bytes needed for a `width x height` raster with `channels`
/// interleaved channels.
///
/// Fails for zero dimensions, unsupported channel counts and sizes that
/// overflow `usize`.
pub fn raster_len(width: usize, height: usize, channels: usize) -> Result<usize, Error> {
    let invalid = Error::InvalidDimensions {
        width,
        height,
        channels,
    };

    if width == 0 || height == 0 || !matches!(channels, 1 | 3 | 4) {
        return Err(invalid);
    }

    width
        .checked_mul(height)
        .and_then(|px| px.checked_mul(channels))
        .ok_or(invalid)
}

/// Owned raster with an optional fixed scratch capacity.
///
/// A buffer built with [`RasterBuffer::with_capacity`] starts unshaped
/// (`0x0`) and must be [`reshape`](RasterBuffer::reshape)d before use.
/// Equality compares shape and pixels; reserved capacity is ignored.
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    channels: usize,
    capacity: usize,
    data: Vec<u8>,
}

impl RasterBuffer {
    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        let expected = raster_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            capacity: expected,
            data,
        })
    }

    pub fn new_fill(width: usize, height: usize, channels: usize, value: u8) -> Result<Self, Error> {
        let len = raster_len(width, height, channels)?;
        Self::from_vec(width, height, channels, vec![value; len])
    }

    /// Reserves `bytes` of scratch memory without committing to dimensions.
    pub fn with_capacity(bytes: usize) -> Result<Self, Error> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| Error::AllocationFailure { bytes })?;

        Ok(Self {
            width: 0,
            height: 0,
            channels: 0,
            capacity: bytes,
            data,
        })
    }

    /// Re-labels the buffer as a `width x height x channels` raster.
    ///
    /// Never reallocates. Bytes carried over from a previous shape are left as
    /// they were; callers that need defined contents must overwrite them.
    pub fn reshape(&mut self, width: usize, height: usize, channels: usize) -> Result<(), Error> {
        let required = raster_len(width, height, channels)?;
        if required > self.capacity {
            return Err(Error::BufferOverflow {
                required,
                capacity: self.capacity,
            });
        }

        self.data.resize(required, 0);
        self.width = width;
        self.height = height;
        self.channels = channels;
        Ok(())
    }

    /// Reshapes to `src`'s dimensions and copies its bytes.
    pub fn copy_from(&mut self, src: &RasterView<'_>) -> Result<(), Error> {
        self.reshape(src.width(), src.height(), src.channels())?;
        self.data.copy_from_slice(src.data());
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_view(&self) -> RasterView<'_> {
        RasterView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<u8> {
        self.as_view().get(x, y, c)
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row index out of bounds");
        let row_len = self.row_len();
        &mut self.data[y * row_len..(y + 1) * row_len]
    }

    /// Mutable bytes of the rows in `rows`.
    pub fn band_mut(&mut self, rows: RowRange) -> &mut [u8] {
        assert!(rows.end <= self.height, "row range out of bounds");
        let span = rows.byte_span(self.row_len());
        &mut self.data[span]
    }
}

impl PartialEq for RasterBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.channels == other.channels
            && self.data == other.data
    }
}

impl Eq for RasterBuffer {}

/// Borrowed, read-only raster.
#[derive(Debug, Clone, Copy)]
pub struct RasterView<'a> {
    width: usize,
    height: usize,
    channels: usize,
    data: &'a [u8],
}

impl<'a> RasterView<'a> {
    pub fn from_slice(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, Error> {
        let expected = raster_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of color channels; alpha is excluded for 4-channel rasters.
    pub fn color_channels(&self) -> usize {
        if self.channels == 4 { 3 } else { self.channels }
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    #[inline]
    pub fn offset(&self, x: usize, y: usize, c: usize) -> usize {
        (y * self.width + x) * self.channels + c
    }

    pub fn row(&self, y: usize) -> &'a [u8] {
        assert!(y < self.height, "row index out of bounds");
        let row_len = self.row_len();
        &self.data[y * row_len..(y + 1) * row_len]
    }

    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let start = self.offset(x, y, 0);
        &self.data[start..start + self.channels]
    }

    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || c >= self.channels {
            return None;
        }
        self.data.get(self.offset(x, y, c)).copied()
    }

    /// Channel value at `(x, y, c)`; panics when out of bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize, c: usize) -> u8 {
        self.data[self.offset(x, y, c)]
    }

    pub fn to_buffer(&self) -> RasterBuffer {
        RasterBuffer {
            width: self.width,
            height: self.height,
            channels: self.channels,
            capacity: self.data.len(),
            data: self.data.to_vec(),
        }
    }
}
