//! Analysis phases, run in order by the pipeline.

pub mod activity;
pub mod architecture;
pub mod communities;
pub mod graph;
pub mod metrics;
