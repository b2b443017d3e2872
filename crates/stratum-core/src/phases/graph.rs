//! Phase 1: Build the filtered module dependency graph.

use log::debug;
use std::collections::BTreeMap;

use crate::aggregate::Aggregate;
use crate::config::{AnalysisConfig, AnalyzedFile};
use crate::graph::module_graph::ModuleGraph;
use crate::graph::node_id::NodeId;

/// Run the graph phase: replace the aggregate's graph with one built from `files`.
pub fn run_graph_phase(config: &AnalysisConfig, files: &[AnalyzedFile], agg: &mut Aggregate) {
    agg.graph = build_module_graph(config, files);
    debug!(
        "module graph: {} nodes, {} edges",
        agg.graph.node_count(),
        agg.graph.edge_count()
    );
}

/// Tally raw dependency weights between truncated namespaces.
///
/// Targets keep the order in which they were first seen for each source.
pub fn tally_dependencies(
    config: &AnalysisConfig,
    files: &[AnalyzedFile],
) -> BTreeMap<NodeId, Vec<(NodeId, usize)>> {
    let depth = config.namespace_depth;
    let mut weights: BTreeMap<NodeId, Vec<(NodeId, usize)>> = BTreeMap::new();

    for file in files {
        for dep in &file.dependencies {
            let (Some(from), Some(to)) = (
                NodeId::from_namespace(&dep.from, depth),
                NodeId::from_namespace(&dep.to, depth),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            let targets = weights.entry(from).or_default();
            if let Some(entry) = targets.iter_mut().find(|(t, _)| *t == to) {
                entry.1 += 1;
            } else {
                targets.push((to, 1));
            }
        }
    }

    weights
}

/// Pick which outgoing candidates of one source survive filtering.
///
/// Candidates are ranked by weight (ties keep their order). A candidate is
/// kept when it ranks in the top K, is heavier than the absolute threshold,
/// or carries at least the relative share of the source's total weight. When
/// nothing survives the heaviest candidate is kept.
pub fn select_edges<'a>(
    candidates: &'a [(NodeId, usize)],
    config: &AnalysisConfig,
) -> Vec<&'a NodeId> {
    let total: usize = candidates.iter().map(|(_, w)| *w).sum();
    let relative_floor = config.rel_edge_threshold * total as f64;

    let mut ranked: Vec<&(NodeId, usize)> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut kept: Vec<&NodeId> = ranked
        .iter()
        .copied()
        .enumerate()
        .filter(|&(rank, &(_, weight))| {
            rank < config.top_k_edges
                || weight > config.abs_edge_threshold
                || weight as f64 >= relative_floor
        })
        .map(|(_, (to, _))| to)
        .collect();

    if kept.is_empty() {
        if let Some(heaviest) = ranked.first().copied() {
            kept.push(&heaviest.0);
        }
    }
    kept
}

/// Build the filtered graph from per-file dependency facts.
pub fn build_module_graph(config: &AnalysisConfig, files: &[AnalyzedFile]) -> ModuleGraph {
    let weights = tally_dependencies(config, files);
    let mut graph = ModuleGraph::new();
    let mut dropped = 0usize;

    for (source, candidates) in &weights {
        graph.ensure_node(source);
        // Every referenced target stays visible even if its edge is filtered
        for (target, _) in candidates {
            graph.ensure_node(target);
        }
        let kept = select_edges(candidates, config);
        dropped += candidates.len() - kept.len();
        for target in kept {
            graph.add_edge(source, target);
        }
    }

    debug!("graph filtering dropped {dropped} candidate edges");
    graph
}
