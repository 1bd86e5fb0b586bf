//! The lecture-processing pipeline.
//!
//! [`RunState`] is the record threaded through the stages; [`Pipeline`]
//! sequences the stages for one file and isolates failures across a batch.

mod driver;
mod state;

pub use driver::{BatchSummary, Pipeline, RunSummary};
pub use state::RunState;
