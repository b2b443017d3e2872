//! Phase 3: Community metrics, community-graph analysis and suggestions.

pub mod centrality;
pub mod community_graph;
pub mod layering;
pub mod ordering;
pub mod paths;
pub mod structure;
pub mod suggestions;

use log::debug;
use std::collections::BTreeMap;

use crate::aggregate::{Aggregate, CommunityMetrics};
use crate::config::AnalysisConfig;
use crate::graph::module_graph::ModuleGraph;
use crate::naming::DisplayNamer;

use community_graph::CommunityGraph;
use paths::PathLimits;

/// Members listed per community as a sample.
const SAMPLE_MEMBERS: usize = 5;

/// Run the metrics phase on the partition produced by the communities phase.
///
/// Without a namer every community is displayed under its raw id.
pub fn run_metrics_phase(
    config: &AnalysisConfig,
    agg: &mut Aggregate,
    namer: Option<&dyn DisplayNamer>,
) {
    let Some(metrics) = agg.community.as_mut() else {
        return;
    };
    compute_community_metrics(config, &agg.graph, metrics, namer);
    let suggestions = suggestions::community_suggestions(config, metrics);
    suggestions::push_unique(&mut agg.suggestions, suggestions);
}

/// Fill every KPI of `metrics` from its `communities` / `node_to_community`.
pub fn compute_community_metrics(
    config: &AnalysisConfig,
    graph: &ModuleGraph,
    metrics: &mut CommunityMetrics,
    namer: Option<&dyn DisplayNamer>,
) {
    let communities = &metrics.communities;
    let n2c = &metrics.node_to_community;

    // --- Sizes and graph-wide scores ---
    metrics.communities_count = communities.len();
    metrics.max_size = communities.values().map(Vec::len).max().unwrap_or(0);
    metrics.avg_size = if communities.is_empty() {
        0.0
    } else {
        communities.values().map(Vec::len).sum::<usize>() as f64 / communities.len() as f64
    };
    metrics.graph_density = structure::graph_density(graph);
    metrics.modularity_q = structure::modularity(graph, n2c);

    // --- Per-community composition ---
    let mut purity = BTreeMap::new();
    let mut top_namespace = BTreeMap::new();
    let mut sample_members = BTreeMap::new();
    for (community, members) in communities {
        let (p, namespace) = structure::purity(graph, members);
        purity.insert(community.clone(), p);
        if let Some(namespace) = namespace {
            top_namespace.insert(community.clone(), namespace);
        }
        sample_members.insert(
            community.clone(),
            members.iter().take(SAMPLE_MEMBERS).cloned().collect(),
        );
    }

    // --- Cross-community edges ---
    let cross = structure::cross_community_edges(graph, n2c);
    let coupling_ratio = communities
        .keys()
        .map(|c| (c.clone(), cross.coupling_ratio(c)))
        .collect();
    let boundary_nodes = structure::boundary_nodes(graph, n2c);

    // --- Community graph ---
    let cg = CommunityGraph::new(communities.keys(), &cross.between);
    let betweenness = centrality::betweenness(&cg)
        .into_iter()
        .enumerate()
        .map(|(i, b)| (cg.id(i).clone(), b))
        .collect();
    let levels = layering::levels(&cg)
        .into_iter()
        .enumerate()
        .map(|(i, l)| (cg.id(i).clone(), l))
        .collect();
    let matrix_order = ordering::reverse_cuthill_mckee(&cg)
        .into_iter()
        .map(|i| cg.id(i).clone())
        .collect();

    let limits = PathLimits::from_config(config);
    let top_paths = paths::entry_communities(&cg)
        .into_iter()
        .map(|entry| (cg.id(entry).clone(), paths::top_paths(&cg, entry, &limits)))
        .collect();

    let display_names = communities
        .iter()
        .map(|(community, members)| {
            let name = match namer {
                Some(namer) => namer.name(members),
                None => community.to_string(),
            };
            (community.clone(), name)
        })
        .collect();

    debug!(
        "community metrics: {} communities, {} inter-community edges, {} boundary nodes",
        communities.len(),
        cross.between.len(),
        boundary_nodes.len()
    );

    metrics.purity = purity;
    metrics.top_namespace = top_namespace;
    metrics.sample_members = sample_members;
    metrics.inbound_edges = cross.inbound;
    metrics.outbound_edges = cross.outbound;
    metrics.boundary_nodes = boundary_nodes;
    metrics.edges_between_communities = cross.between;
    metrics.coupling_ratio = coupling_ratio;
    metrics.betweenness = betweenness;
    metrics.levels = levels;
    metrics.matrix_order = matrix_order;
    metrics.top_paths = top_paths;
    metrics.display_names = display_names;
}
