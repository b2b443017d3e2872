//! Module dependency graph and its identifiers.

pub mod module_graph;
pub mod node_id;
