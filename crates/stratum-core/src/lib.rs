//! Stratum Core: architecture analysis over module dependency graphs.
//!
//! This crate contains all analysis logic: namespace graph construction,
//! community detection, community metrics, commit activity, and layering
//! rule checks over classifier role predictions.

pub mod aggregate;
pub mod config;
pub mod graph;
pub mod naming;
pub mod output;
pub mod phases;
pub mod pipeline;
pub mod taxonomy;
