//! Umbrella crate for the `rowpipe` workspace.
//!
//! Re-exports the raster types, the row scheduler, the filter kernels and the
//! pipeline runner so applications depend on a single crate.

pub use rp_core::*;
pub use rp_filter::*;
pub use rp_pipeline::*;
pub use rp_sched::*;
