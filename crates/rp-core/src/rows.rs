use core::ops::Range;

/// Half-open interval `[start, end)` of raster rows.
///
/// An empty range (`start == end`) is valid and means "nothing to do"; it shows
/// up when there are more workers than rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "row range start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, y: usize) -> bool {
        self.start <= y && y < self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Byte span covered by these rows in a raster whose rows are `row_len`
    /// bytes long.
    pub fn byte_span(&self, row_len: usize) -> Range<usize> {
        self.start * row_len..self.end * row_len
    }
}

#[cfg(test)]
mod tests {
    use super::RowRange;

    #[test]
    fn empty_range_has_no_rows() {
        let r = RowRange::new(3, 3);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.rows().count(), 0);
        assert!(!r.contains(3));
    }

    #[test]
    fn byte_span_scales_by_row_len() {
        let r = RowRange::new(2, 5);
        assert_eq!(r.len(), 3);
        assert_eq!(r.byte_span(12), 24..60);
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
    }
}
