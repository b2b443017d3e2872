//! The aggregated result enriched by each analysis phase.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::module_graph::ModuleGraph;
use crate::graph::node_id::{CommunityId, NodeId};

/// Shared state of one analysis run.
///
/// Built fresh per run and owned by a single pipeline; phases mutate it in
/// order and nothing is updated incrementally.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub graph: ModuleGraph,
    pub community: Option<CommunityMetrics>,
    pub architecture: Option<ArchitectureMetrics>,
    pub activity: Option<RepositoryActivity>,
    pub suggestions: Vec<Suggestion>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Aggregated directed edge between two communities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterCommunityEdge {
    pub from: CommunityId,
    pub to: CommunityId,
    /// Number of distinct node pairs crossing the boundary.
    pub edges: usize,
}

/// A probable walk through the community graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPath {
    pub path: Vec<CommunityId>,
    /// Cumulative probability in [0, 1].
    pub probability: f64,
}

impl CommunityPath {
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub commits: usize,
}

/// Community-level KPIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityMetrics {
    /// Community id → members (ascending).
    pub communities: BTreeMap<CommunityId, Vec<NodeId>>,
    pub node_to_community: BTreeMap<NodeId, CommunityId>,
    pub communities_count: usize,
    pub avg_size: f64,
    pub max_size: usize,
    pub graph_density: f64,
    pub modularity_q: f64,
    pub purity: BTreeMap<CommunityId, f64>,
    pub top_namespace: BTreeMap<CommunityId, String>,
    pub sample_members: BTreeMap<CommunityId, Vec<NodeId>>,
    pub inbound_edges: BTreeMap<CommunityId, usize>,
    pub outbound_edges: BTreeMap<CommunityId, usize>,
    pub boundary_nodes: Vec<NodeId>,
    pub edges_between_communities: Vec<InterCommunityEdge>,
    pub coupling_ratio: BTreeMap<CommunityId, f64>,
    pub betweenness: BTreeMap<CommunityId, f64>,
    /// Level in the SCC condensation layering (0 = entry layer).
    pub levels: BTreeMap<CommunityId, usize>,
    pub matrix_order: Vec<CommunityId>,
    pub top_paths: BTreeMap<CommunityId, Vec<CommunityPath>>,
    pub display_names: BTreeMap<CommunityId, String>,
    /// Committer → commits, sorted by commits descending.
    pub top_committers: BTreeMap<CommunityId, Vec<Committer>>,
    pub bus_factor: BTreeMap<CommunityId, usize>,
}

/// Repository-wide commit activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryActivity {
    pub bus_factor: usize,
    pub top_committers: Vec<Committer>,
}

/// A dependency that breaks a layering rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureViolation {
    pub from: NodeId,
    pub to: NodeId,
    pub from_role: String,
    pub to_role: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// A class whose two best role predictions are too close to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub class_name: String,
    pub file: String,
    pub top_labels: Vec<LabelScore>,
    /// Probability gap between the first and second prediction.
    pub gap: f64,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlow {
    pub from_role: String,
    pub to_role: String,
    pub count: usize,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureMetrics {
    pub violations: Vec<ArchitectureViolation>,
    pub ambiguities: Vec<Ambiguity>,
    pub role_flows: Vec<RoleFlow>,
}

/// A refactoring recommendation derived from metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Short actionable sentence.
    pub summary: String,
    /// Subject: community id or node id.
    pub location: String,
    /// Metrics and thresholds that triggered it.
    pub rationale: String,
    pub guidance: String,
}
