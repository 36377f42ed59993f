use rp_core::{Error, RowRange};

/// Iterator over the row ranges handed to each worker.
#[derive(Debug, Clone)]
pub struct RowPartition {
    workers: usize,
    total_rows: usize,
    rows_per_worker: usize,
    next: usize,
}

impl RowPartition {
    pub fn new(workers: usize, total_rows: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::InvalidArgument("worker count must be at least 1"));
        }

        Ok(Self {
            workers,
            total_rows,
            rows_per_worker: total_rows / workers,
            next: 0,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Range of worker `i`; the last worker runs to `total_rows`.
    pub fn range(&self, i: usize) -> RowRange {
        debug_assert!(i < self.workers);
        let start = i * self.rows_per_worker;
        let end = if i + 1 == self.workers {
            self.total_rows
        } else {
            (i + 1) * self.rows_per_worker
        };
        RowRange::new(start, end)
    }
}

impl Iterator for RowPartition {
    type Item = RowRange;

    fn next(&mut self) -> Option<RowRange> {
        if self.next >= self.workers {
            return None;
        }
        let r = self.range(self.next);
        self.next += 1;
        Some(r)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.workers - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RowPartition {}

/// Collects the `workers` ranges covering `[0, total_rows)`.
pub fn partition(workers: usize, total_rows: usize) -> Result<Vec<RowRange>, Error> {
    Ok(RowPartition::new(workers, total_rows)?.collect())
}
