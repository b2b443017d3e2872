//! Phase 2: Community detection via Label Propagation.
//!
//! Pure Rust implementation over the symmetric closure of the module graph.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::{Aggregate, CommunityMetrics};
use crate::config::{AnalysisConfig, LpaOptions, TieBreak};
use crate::graph::module_graph::ModuleGraph;
use crate::graph::node_id::{CommunityId, NodeId};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the communities phase: partition the graph and seed the community metrics.
pub fn run_communities_phase(config: &AnalysisConfig, agg: &mut Aggregate) {
    if agg.graph.is_empty() {
        agg.community = None;
        return;
    }

    let partition = detect_communities(&agg.graph, &config.lpa);
    debug!(
        "label propagation settled after {} iterations into {} communities",
        partition.iterations,
        partition.communities.len()
    );

    agg.community = Some(CommunityMetrics {
        communities: partition.communities,
        node_to_community: partition.node_to_community,
        ..Default::default()
    });
}

/// Outcome of community detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Community id → members in ascending order.
    pub communities: BTreeMap<CommunityId, Vec<NodeId>>,
    pub node_to_community: BTreeMap<NodeId, CommunityId>,
    /// Label Propagation iterations actually run.
    pub iterations: usize,
}

/// Detect communities: Label Propagation followed by the small-community merge.
pub fn detect_communities(graph: &ModuleGraph, opts: &LpaOptions) -> Partition {
    let (labels, iterations) = label_propagation(graph, opts);

    let mut node_to_community: BTreeMap<NodeId, CommunityId> = labels
        .into_iter()
        .map(|(node, label)| (node, CommunityId::from(&label)))
        .collect();

    if opts.min_community_size > 1 {
        merge_small_communities(graph, &mut node_to_community, opts.min_community_size);
    }

    let mut partition = normalize(node_to_community);
    partition.iterations = iterations;
    partition
}

// ---------------------------------------------------------------------------
// Label Propagation
// ---------------------------------------------------------------------------

/// Run Label Propagation and return each node's final label.
///
/// Every node starts labelled with its own id. In each iteration a node
/// adopts the label with the heaviest neighbour vote, where neighbour v
/// votes with 1/deg(v)^(resolution/2) so hubs cannot swallow the graph.
pub fn label_propagation(graph: &ModuleGraph, opts: &LpaOptions) -> (BTreeMap<NodeId, NodeId>, usize) {
    let nodes = graph.node_ids();
    let index: HashMap<&NodeId, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let undirected = graph.undirected_adjacency();
    let adj: Vec<Vec<usize>> = nodes
        .iter()
        .map(|n| {
            undirected
                .get(n)
                .map(|ns| ns.iter().filter_map(|m| index.get(m).copied()).collect())
                .unwrap_or_default()
        })
        .collect();

    let exponent = opts.resolution / 2.0;
    let vote_weight: Vec<f64> = adj
        .iter()
        .map(|neighbours| {
            if neighbours.is_empty() {
                1.0
            } else {
                1.0 / (neighbours.len() as f64).powf(exponent)
            }
        })
        .collect();

    // Labels are node indices; nodes are sorted so index order is id order.
    let mut labels: Vec<usize> = (0..nodes.len()).collect();
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    let mut rng = match (opts.shuffle, opts.seed) {
        (true, Some(seed)) => Some(StdRng::seed_from_u64(seed)),
        _ => None,
    };

    let mut iterations = 0;
    let mut changed = true;
    while changed && iterations < opts.max_iters {
        changed = false;
        iterations += 1;

        if let Some(rng) = rng.as_mut() {
            order.shuffle(rng);
        }

        for &u in &order {
            if adj[u].is_empty() {
                continue;
            }
            let mut votes: BTreeMap<usize, f64> = BTreeMap::new();
            for &v in &adj[u] {
                *votes.entry(labels[v]).or_insert(0.0) += vote_weight[v];
            }
            let Some(best) = pick_label(&votes, opts.tie_break) else {
                continue;
            };
            if best != labels[u] {
                labels[u] = best;
                changed = true;
            }
        }
    }

    let result = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| ((*n).clone(), nodes[labels[i]].clone()))
        .collect();
    (result, iterations)
}

/// Heaviest label; ties resolved by the configured favour.
fn pick_label(votes: &BTreeMap<usize, f64>, tie_break: TieBreak) -> Option<usize> {
    let max = votes.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut tied = votes.iter().filter(|(_, w)| **w == max).map(|(l, _)| *l);
    match tie_break {
        TieBreak::Small => tied.next(),
        TieBreak::Large => tied.last(),
    }
}

// ---------------------------------------------------------------------------
// Small-community merge
// ---------------------------------------------------------------------------

/// Fold communities below `min_size` into the neighbour community with the
/// strongest combined outbound + inbound edge count (ties → smallest id).
///
/// Connectivity is measured on the assignment before any merge. A community
/// without neighbours stays as it is.
pub fn merge_small_communities(
    graph: &ModuleGraph,
    node_to_community: &mut BTreeMap<NodeId, CommunityId>,
    min_size: usize,
) {
    let mut sizes: BTreeMap<CommunityId, usize> = BTreeMap::new();
    for community in node_to_community.values() {
        *sizes.entry(community.clone()).or_insert(0) += 1;
    }
    let small: Vec<CommunityId> = sizes
        .iter()
        .filter(|(_, &size)| size > 0 && size < min_size)
        .map(|(c, _)| c.clone())
        .collect();
    if small.is_empty() {
        return;
    }

    let snapshot = node_to_community.clone();
    // community → neighbour community → combined weight
    let mut combined: BTreeMap<&CommunityId, BTreeMap<&CommunityId, usize>> = BTreeMap::new();
    for (from, to) in graph.edges() {
        let (Some(cu), Some(cv)) = (snapshot.get(from), snapshot.get(to)) else {
            continue;
        };
        if cu == cv {
            continue;
        }
        *combined.entry(cu).or_default().entry(cv).or_insert(0) += 1;
        *combined.entry(cv).or_default().entry(cu).or_insert(0) += 1;
    }

    let mut merged_into: HashMap<CommunityId, CommunityId> = HashMap::new();
    for community in &small {
        let Some(neighbours) = combined.get(community) else {
            continue;
        };
        let mut best: Option<(&CommunityId, usize)> = None;
        for (&candidate, &weight) in neighbours {
            match best {
                Some((_, w)) if weight <= w => {}
                _ => best = Some((candidate, weight)),
            }
        }
        let Some((best, _)) = best else {
            continue;
        };

        let mut target = best.clone();
        while let Some(next) = merged_into.get(&target) {
            target = next.clone();
        }
        if &target == community {
            continue;
        }

        for (node, assigned) in node_to_community.iter_mut() {
            if assigned == community {
                *assigned = target.clone();
            }
        }
        debug!("merged small community {community} into {target}");
        merged_into.insert(community.clone(), target);
    }
}

/// Group nodes by community and rename each community after its smallest member.
fn normalize(node_to_community: BTreeMap<NodeId, CommunityId>) -> Partition {
    let mut groups: BTreeMap<CommunityId, Vec<NodeId>> = BTreeMap::new();
    for (node, community) in node_to_community {
        groups.entry(community).or_default().push(node);
    }

    let mut partition = Partition::default();
    for (_, mut members) in groups {
        members.sort();
        let id = CommunityId::from(&members[0]);
        for member in &members {
            partition
                .node_to_community
                .insert(member.clone(), id.clone());
        }
        partition.communities.insert(id, members);
    }
    partition
}
