//! Batch driver for the row-parallel filter pipeline.
//!
//! Scans a directory for images, sizes the pipeline's scratch buffers for the
//! largest one from the file headers, then decodes, filters and encodes the
//! images one after another. Each stage's output is written as
//! `<stage>_<filename>` (`gray`, `blur`, `sharp`, `edge`, `bright`).
//!
//! A file that cannot be decoded, does not fit the scratch buffers or cannot
//! be written is skipped; configuration and resource errors end the run.

mod batch;
pub mod codec;
mod config;
mod discover;
mod error;

pub use batch::{
    BatchSummary, ImageEvent, SweepRow, render_sweep_table, run_batch, sweep, write_json,
};
pub use config::{BatchConfig, load_config};
pub use discover::discover_images;
pub use error::BatchError;
