//! Fork-join row scheduling.
//!
//! `[0, height)` is split into `workers` contiguous ranges: every range gets
//! `height / workers` rows and the last one absorbs the remainder. With more
//! workers than rows the leading ranges are empty.
//!
//! [`RowScheduler::run_bands`] pairs each range with its disjoint `&mut`
//! band of the output bytes, so workers write without locks and the borrow
//! checker proves the bands do not overlap. Every call blocks until all
//! workers have returned.

mod partition;
mod scheduler;

pub use partition::{RowPartition, partition};
pub use scheduler::{Dispatch, RowScheduler};
