//! Multi-stage filter pipeline over two reusable scratch buffers.
//!
//! A [`StagePlan`] names, for every stage, the slot it reads and the slot it
//! writes: the caller's image (`Source`) or one of the scratch buffers `A`
//! and `B`. Plans are validated when built, so a stage can never read and
//! write the same buffer. [`PipelineRunner`] owns the buffers and a
//! [`RowScheduler`](rp_sched::RowScheduler); each stage is a fork-join call
//! that returns only after every row of its output is written, and the next
//! stage starts from that frozen result.
//!
//! Scratch memory is reserved once. Images larger than the reservation fail
//! with [`BufferOverflow`](rp_core::Error::BufferOverflow) before any stage
//! runs, and the runner stays usable for the next image.

mod plan;
mod runner;

pub use plan::{PlanMode, Slot, Stage, StagePlan};
pub use runner::{PipelineConfig, PipelineRunner, StageTiming, apply_filter, process};
