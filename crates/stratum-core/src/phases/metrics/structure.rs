//! Structural community KPIs computed on the module graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::aggregate::InterCommunityEdge;
use crate::graph::module_graph::ModuleGraph;
use crate::graph::node_id::{CommunityId, NodeId};

/// Distinct undirected edges `(a, b)` with `a < b`.
fn undirected_edges(graph: &ModuleGraph) -> BTreeSet<(&NodeId, &NodeId)> {
    graph
        .edges()
        .into_iter()
        .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
        .collect()
}

/// Undirected density: 2m / (n(n-1)), 0 for fewer than two nodes.
pub fn graph_density(graph: &ModuleGraph) -> f64 {
    let n = graph.node_count() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let m = undirected_edges(graph).len() as f64;
    2.0 * m / (n * (n - 1.0))
}

/// Newman-Girvan modularity on the undirected simple graph, summed over
/// intra-community edges only.
pub fn modularity(graph: &ModuleGraph, node_to_community: &BTreeMap<NodeId, CommunityId>) -> f64 {
    let edges = undirected_edges(graph);
    if edges.is_empty() {
        return 0.0;
    }
    let mut degree: HashMap<&NodeId, usize> = HashMap::new();
    for (a, b) in &edges {
        *degree.entry(*a).or_insert(0) += 1;
        *degree.entry(*b).or_insert(0) += 1;
    }
    let two_m = 2.0 * edges.len() as f64;

    let mut q = 0.0;
    for (a, b) in &edges {
        let (Some(ca), Some(cb)) = (node_to_community.get(*a), node_to_community.get(*b)) else {
            continue;
        };
        if ca == cb {
            let ka = degree[a] as f64;
            let kb = degree[b] as f64;
            q += 1.0 - ka * kb / two_m;
        }
    }
    q / two_m
}

/// Share of members in the most common enclosing namespace, with that
/// namespace (ties → smallest namespace).
pub fn purity(graph: &ModuleGraph, members: &[NodeId]) -> (f64, Option<String>) {
    if members.is_empty() {
        return (0.0, None);
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in members {
        let package = graph
            .node(member.as_str())
            .map(|n| n.name.package.as_str())
            .unwrap_or_else(|| member.enclosing_namespace());
        if !package.is_empty() {
            *counts.entry(package).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (package, count) in counts {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((package, count)),
        }
    }
    match best {
        Some((package, count)) => (
            count as f64 / members.len() as f64,
            Some(package.to_string()),
        ),
        None => (0.0, None),
    }
}

/// Edge counts around each community.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossEdges {
    pub internal: BTreeMap<CommunityId, usize>,
    pub inbound: BTreeMap<CommunityId, usize>,
    pub outbound: BTreeMap<CommunityId, usize>,
    /// Aggregated community → community edges, sorted by (from, to).
    pub between: Vec<InterCommunityEdge>,
}

impl CrossEdges {
    /// outbound / (internal + inbound + outbound), 0 for an unconnected community.
    pub fn coupling_ratio(&self, community: &CommunityId) -> f64 {
        let internal = self.internal.get(community).copied().unwrap_or(0);
        let inbound = self.inbound.get(community).copied().unwrap_or(0);
        let outbound = self.outbound.get(community).copied().unwrap_or(0);
        let total = internal + inbound + outbound;
        if total == 0 {
            0.0
        } else {
            outbound as f64 / total as f64
        }
    }
}

/// Classify every graph edge as internal or crossing, per community.
pub fn cross_community_edges(
    graph: &ModuleGraph,
    node_to_community: &BTreeMap<NodeId, CommunityId>,
) -> CrossEdges {
    let mut cross = CrossEdges::default();
    for community in node_to_community.values() {
        cross.internal.entry(community.clone()).or_insert(0);
        cross.inbound.entry(community.clone()).or_insert(0);
        cross.outbound.entry(community.clone()).or_insert(0);
    }

    let mut between: BTreeMap<(&CommunityId, &CommunityId), usize> = BTreeMap::new();
    for (from, to) in graph.edges() {
        let (Some(cu), Some(cv)) = (node_to_community.get(from), node_to_community.get(to)) else {
            continue;
        };
        if cu == cv {
            *cross.internal.entry(cu.clone()).or_insert(0) += 1;
            continue;
        }
        *cross.outbound.entry(cu.clone()).or_insert(0) += 1;
        *cross.inbound.entry(cv.clone()).or_insert(0) += 1;
        *between.entry((cu, cv)).or_insert(0) += 1;
    }

    cross.between = between
        .into_iter()
        .map(|((from, to), edges)| InterCommunityEdge {
            from: from.clone(),
            to: to.clone(),
            edges,
        })
        .collect();
    cross
}

/// Nodes whose outgoing neighbours lie in at least two other communities.
pub fn boundary_nodes(
    graph: &ModuleGraph,
    node_to_community: &BTreeMap<NodeId, CommunityId>,
) -> Vec<NodeId> {
    let mut boundary = Vec::new();
    for node in graph.node_ids() {
        let own = node_to_community.get(node);
        let foreign: BTreeSet<&CommunityId> = graph
            .outgoing(node.as_str())
            .into_iter()
            .filter_map(|to| node_to_community.get(to))
            .filter(|c| Some(*c) != own)
            .collect();
        if foreign.len() >= 2 {
            boundary.push(node.clone());
        }
    }
    boundary
}
