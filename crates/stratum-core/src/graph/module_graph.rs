//! In-memory module dependency graph backed by petgraph::DiGraph.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::node_id::NodeId;

/// Human-facing names of a module node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    pub qualified: String,
    pub short: String,
    /// Enclosing namespace, used for purity.
    pub package: String,
}

impl DisplayName {
    pub fn for_node(id: &NodeId) -> Self {
        Self {
            qualified: id.as_str().to_string(),
            short: id.short_name().to_string(),
            package: id.enclosing_namespace().to_string(),
        }
    }
}

/// Node data stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: NodeId,
    pub name: DisplayName,
}

/// Directed graph of coarse-grained modules.
///
/// Edges are deduplicated, never self-loops, and keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, ()>,
    /// O(1) NodeId → NodeIndex lookup.
    id_index: HashMap<NodeId, NodeIndex>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a node by id.
    pub fn ensure_node(&mut self, id: &NodeId) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(id) {
            idx
        } else {
            let idx = self.graph.add_node(ModuleNode {
                id: id.clone(),
                name: DisplayName::for_node(id),
            });
            self.id_index.insert(id.clone(), idx);
            idx
        }
    }

    /// Add a directed edge, creating both endpoints.
    ///
    /// Returns false when the edge was rejected (empty id, self-loop) or
    /// already present.
    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) -> bool {
        if from.is_empty() || to.is_empty() || from == to {
            return false;
        }
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if self.graph.find_edge(from_idx, to_idx).is_some() {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        true
    }

    // --- Queries ---

    pub fn has_node(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&ModuleNode> {
        self.id_index
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.graph.node_weights().map(|n| &n.id).collect();
        ids.sort();
        ids
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> Vec<&ModuleNode> {
        let mut nodes: Vec<&ModuleNode> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Outgoing neighbours of a node in insertion order.
    pub fn outgoing(&self, id: &str) -> Vec<&NodeId> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Incoming neighbours of a node in insertion order.
    pub fn incoming(&self, id: &str) -> Vec<&NodeId> {
        self.neighbours(id, Direction::Incoming)
    }

    fn neighbours(&self, id: &str, direction: Direction) -> Vec<&NodeId> {
        let Some(&idx) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|(edge, _)| *edge);
        edges
            .into_iter()
            .map(|(_, other)| &self.graph[other].id)
            .collect()
    }

    /// All directed edges as (from, to), grouped by ascending source id.
    pub fn edges(&self) -> Vec<(&NodeId, &NodeId)> {
        let mut out = Vec::with_capacity(self.graph.edge_count());
        for id in self.node_ids() {
            for to in self.outgoing(id.as_str()) {
                out.push((id, to));
            }
        }
        out
    }

    /// Symmetric adjacency: every node mapped to its distinct undirected
    /// neighbours in ascending order.
    pub fn undirected_adjacency(&self) -> HashMap<&NodeId, Vec<&NodeId>> {
        let mut adj: HashMap<&NodeId, Vec<&NodeId>> = self
            .graph
            .node_weights()
            .map(|n| (&n.id, Vec::new()))
            .collect();
        for edge in self.graph.edge_references() {
            let a = &self.graph[edge.source()].id;
            let b = &self.graph[edge.target()].id;
            if let Some(list) = adj.get_mut(a) {
                list.push(b);
            }
            if let Some(list) = adj.get_mut(b) {
                list.push(a);
            }
        }
        for list in adj.values_mut() {
            list.sort();
            list.dedup();
        }
        adj
    }
}
