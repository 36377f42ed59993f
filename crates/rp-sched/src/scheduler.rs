use core::str::FromStr;

use log::{debug, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};
use rp_core::{Error, RowRange};
use serde::{Deserialize, Serialize};

use crate::partition::RowPartition;

/// How worker threads are provided for each fork-join call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// A bounded pool of `workers` threads, built once and reused by every call.
    #[default]
    Pooled,
    /// Fresh scoped threads spawned and joined on every call.
    Spawned,
}

impl FromStr for Dispatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pooled" | "pool" => Ok(Self::Pooled),
            "spawned" | "spawn" => Ok(Self::Spawned),
            other => Err(format!("unknown dispatch '{other}', expected pooled|spawned")),
        }
    }
}

/// Splits row work into `workers` contiguous ranges and runs them in parallel.
#[derive(Debug)]
pub struct RowScheduler {
    workers: usize,
    dispatch: Dispatch,
    pool: Option<ThreadPool>,
}

impl RowScheduler {
    pub fn new(workers: usize, dispatch: Dispatch) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::InvalidArgument("worker count must be at least 1"));
        }

        let pool = match dispatch {
            Dispatch::Pooled => Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("rp-worker-{i}"))
                    .build()
                    .map_err(|e| Error::WorkerPool(e.to_string()))?,
            ),
            Dispatch::Spawned => None,
        };

        debug!("row scheduler ready: workers={workers} dispatch={dispatch:?}");
        Ok(Self {
            workers,
            dispatch,
            pool,
        })
    }

    pub fn pooled(workers: usize) -> Result<Self, Error> {
        Self::new(workers, Dispatch::Pooled)
    }

    pub fn spawned(workers: usize) -> Result<Self, Error> {
        Self::new(workers, Dispatch::Spawned)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    /// Calls `worker` once per non-empty range of `[0, total_rows)` and waits
    /// for all of them.
    pub fn run<F>(&self, total_rows: usize, worker: F) -> Result<(), Error>
    where
        F: Fn(RowRange) + Sync,
    {
        let ranges: Vec<RowRange> = RowPartition::new(self.workers, total_rows)?
            .filter(|r| !r.is_empty())
            .collect();
        trace!("run: {} rows over {} range(s)", total_rows, ranges.len());

        let worker = &worker;
        match &self.pool {
            Some(pool) => pool.scope(|s| {
                for range in ranges {
                    s.spawn(move |_| worker(range));
                }
            }),
            None => std::thread::scope(|s| {
                for range in ranges {
                    s.spawn(move || worker(range));
                }
            }),
        }
        Ok(())
    }

    /// Splits `out` into rows of `row_len` bytes and hands every worker its
    /// row range together with the exclusive bytes of exactly those rows.
    ///
    /// The band passed to `worker` starts at row `range.start`.
    pub fn run_bands<F>(&self, out: &mut [u8], row_len: usize, worker: F) -> Result<(), Error>
    where
        F: Fn(RowRange, &mut [u8]) + Sync,
    {
        if row_len == 0 {
            return Err(Error::InvalidArgument("row length must be non-zero"));
        }
        if !out.len().is_multiple_of(row_len) {
            return Err(Error::SizeMismatch {
                expected: out.len() - out.len() % row_len,
                actual: out.len(),
            });
        }

        let total_rows = out.len() / row_len;
        let mut bands = Vec::with_capacity(self.workers);
        let mut rest = out;
        for range in RowPartition::new(self.workers, total_rows)? {
            let (band, tail) = core::mem::take(&mut rest).split_at_mut(range.len() * row_len);
            rest = tail;
            if !range.is_empty() {
                bands.push((range, band));
            }
        }
        trace!("run_bands: {} rows over {} band(s)", total_rows, bands.len());

        let worker = &worker;
        match &self.pool {
            Some(pool) => pool.scope(|s| {
                for (range, band) in bands {
                    s.spawn(move |_| worker(range, band));
                }
            }),
            None => std::thread::scope(|s| {
                for (range, band) in bands {
                    s.spawn(move || worker(range, band));
                }
            }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rp_core::{Error, RowRange};

    use super::{Dispatch, RowScheduler};

    fn both(workers: usize) -> [RowScheduler; 2] {
        [
            RowScheduler::pooled(workers).expect("pool"),
            RowScheduler::spawned(workers).expect("spawned"),
        ]
    }

    #[test]
    fn zero_workers_is_rejected() {
        for dispatch in [Dispatch::Pooled, Dispatch::Spawned] {
            assert!(matches!(
                RowScheduler::new(0, dispatch),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn run_visits_every_row_once() {
        for sched in both(4) {
            let hits: Vec<AtomicUsize> = (0..37).map(|_| AtomicUsize::new(0)).collect();
            sched
                .run(37, |range| {
                    for y in range.rows() {
                        hits[y].fetch_add(1, Ordering::Relaxed);
                    }
                })
                .expect("run");
            assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
        }
    }

    #[test]
    fn empty_ranges_are_not_dispatched() {
        for sched in both(8) {
            let seen = Mutex::new(Vec::new());
            sched
                .run(3, |range| seen.lock().expect("lock").push(range))
                .expect("run");
            assert_eq!(seen.into_inner().expect("lock"), vec![RowRange::new(0, 3)]);
        }
    }

    #[test]
    fn bands_line_up_with_ranges() {
        let row_len = 5;
        for sched in both(3) {
            let mut out = vec![0u8; 11 * row_len];
            sched
                .run_bands(&mut out, row_len, |range, band| {
                    assert_eq!(band.len(), range.len() * row_len);
                    for (i, row) in band.chunks_exact_mut(row_len).enumerate() {
                        row.fill((range.start + i) as u8);
                    }
                })
                .expect("run_bands");

            for (y, row) in out.chunks_exact(row_len).enumerate() {
                assert!(row.iter().all(|&v| v as usize == y), "row {y}");
            }
        }
    }

    #[test]
    fn run_bands_validates_geometry() {
        let sched = RowScheduler::spawned(2).expect("spawned");
        let mut out = vec![0u8; 10];
        assert!(matches!(
            sched.run_bands(&mut out, 0, |_, _| {}),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            sched.run_bands(&mut out, 3, |_, _| {}),
            Err(Error::SizeMismatch {
                expected: 9,
                actual: 10
            })
        );
    }

    #[test]
    fn dispatch_parses_from_config_names() {
        assert_eq!("pooled".parse::<Dispatch>(), Ok(Dispatch::Pooled));
        assert_eq!("Spawned".parse::<Dispatch>(), Ok(Dispatch::Spawned));
        assert!("omp".parse::<Dispatch>().is_err());
    }

    #[test]
    fn pool_is_reused_across_calls() {
        let sched = RowScheduler::pooled(2).expect("pool");
        let total = AtomicUsize::new(0);
        for _ in 0..50 {
            sched
                .run(10, |range| {
                    total.fetch_add(range.len(), Ordering::Relaxed);
                })
                .expect("run");
        }
        assert_eq!(total.load(Ordering::Relaxed), 500);
        assert_eq!(sched.dispatch(), Dispatch::Pooled);
        assert_eq!(sched.workers(), 2);
    }
}
