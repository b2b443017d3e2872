//! Directed, weighted graph of communities.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::InterCommunityEdge;
use crate::graph::node_id::CommunityId;

/// Communities as dense indices (ascending id order) with aggregated
/// inter-community edge weights.
#[derive(Debug, Clone, Default)]
pub struct CommunityGraph {
    ids: Vec<CommunityId>,
    index: HashMap<CommunityId, usize>,
    /// source → (target → weight), targets ascending.
    out: Vec<BTreeMap<usize, usize>>,
}

impl CommunityGraph {
    pub fn new<'a>(
        communities: impl IntoIterator<Item = &'a CommunityId>,
        edges: &[InterCommunityEdge],
    ) -> Self {
        let mut ids: Vec<CommunityId> = communities.into_iter().cloned().collect();
        ids.sort();
        ids.dedup();
        let index: HashMap<CommunityId, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let mut out = vec![BTreeMap::new(); ids.len()];
        for edge in edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
                continue;
            };
            if from == to || edge.edges == 0 {
                continue;
            }
            *out[from].entry(to).or_insert(0) += edge.edges;
        }

        Self { ids, index, out }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, i: usize) -> &CommunityId {
        &self.ids[i]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Weighted successors of community `i`.
    pub fn successors(&self, i: usize) -> &BTreeMap<usize, usize> {
        &self.out[i]
    }

    /// Total outgoing weight of community `i`.
    pub fn out_weight(&self, i: usize) -> usize {
        self.out[i].values().sum()
    }

    /// Number of communities with an edge into each community.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut indeg = vec![0; self.len()];
        for targets in &self.out {
            for &to in targets.keys() {
                indeg[to] += 1;
            }
        }
        indeg
    }

    /// Distinct undirected neighbours per community, ascending.
    pub fn undirected(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.len()];
        for (from, targets) in self.out.iter().enumerate() {
            for &to in targets.keys() {
                adj[from].push(to);
                adj[to].push(from);
            }
        }
        for list in &mut adj {
            list.sort_unstable();
            list.dedup();
        }
        adj
    }

    /// petgraph view where node index `i` is community `i`.
    pub fn to_digraph(&self) -> DiGraph<usize, usize> {
        let mut g = DiGraph::with_capacity(self.len(), 0);
        for i in 0..self.len() {
            g.add_node(i);
        }
        for (from, targets) in self.out.iter().enumerate() {
            for (&to, &weight) in targets {
                g.add_edge(NodeIndex::new(from), NodeIndex::new(to), weight);
            }
        }
        g
    }
}

/// Build a community graph straight from `(from, to, weight)` triples.
#[cfg(test)]
pub(crate) fn from_edges(nodes: &[&str], edges: &[(&str, &str, usize)]) -> CommunityGraph {
    let ids: Vec<CommunityId> = nodes.iter().map(|n| CommunityId::from(*n)).collect();
    let edges: Vec<InterCommunityEdge> = edges
        .iter()
        .map(|(f, t, w)| InterCommunityEdge {
            from: CommunityId::from(*f),
            to: CommunityId::from(*t),
            edges: *w,
        })
        .collect();
    CommunityGraph::new(&ids, &edges)
}
