//! Core input types and configuration for Stratum analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::{ArchitectureMetrics, CommunityMetrics, RepositoryActivity, Suggestion};
use crate::graph::node_id::NodeId;

/// A resolved dependency between two namespaces, found in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    /// Namespace of the depending code.
    pub from: String,
    /// Namespace being depended on.
    pub to: String,
}

/// A commit touching a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    #[serde(default)]
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// An analyzed source file as handed over by the parsing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub path: String,
    /// First namespace/package declaration of the file.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub commits: Option<Vec<Commit>>,
}

/// One ranked role guess for a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePrediction {
    /// `category:subcategory:variant`, e.g. `component:domain:entity`.
    pub label: String,
    pub probability: f64,
}

/// Ranked role predictions for one class, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPrediction {
    pub file: String,
    /// Fully-qualified class name.
    pub class: String,
    #[serde(default)]
    pub predictions: Vec<RolePrediction>,
}

impl ClassPrediction {
    pub fn top_label(&self) -> Option<&str> {
        self.predictions.first().map(|p| p.label.as_str())
    }
}

/// Everything an analysis run consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub files: Vec<AnalyzedFile>,
    #[serde(default)]
    pub predictions: Vec<ClassPrediction>,
}

/// Which label wins a tied Label Propagation vote.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Lexicographically smallest label; favours splitting.
    #[default]
    Small,
    /// Lexicographically largest label; favours merging.
    Large,
}

/// Label Propagation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpaOptions {
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Seed for the optional visiting-order shuffle.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Shuffle the visiting order each iteration (needs a seed).
    #[serde(default)]
    pub shuffle: bool,
    /// Hub dampening exponent: a neighbour votes with 1/deg^(resolution/2).
    /// Above 1.0 yields more, smaller communities.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Communities smaller than this are merged into their strongest neighbour.
    #[serde(default = "default_min_community_size")]
    pub min_community_size: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_max_iters() -> usize {
    15
}
fn default_resolution() -> f64 {
    1.0
}
fn default_min_community_size() -> usize {
    1
}

impl Default for LpaOptions {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            seed: None,
            shuffle: false,
            resolution: default_resolution(),
            min_community_size: default_min_community_size(),
            tie_break: TieBreak::default(),
        }
    }
}

/// Configuration for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Namespace segments kept in node ids.
    #[serde(default = "default_namespace_depth")]
    pub namespace_depth: usize,
    #[serde(default = "default_top_k_edges")]
    pub top_k_edges: usize,
    /// Edges heavier than this always survive filtering.
    #[serde(default = "default_abs_edge_threshold")]
    pub abs_edge_threshold: usize,
    /// Edges carrying at least this share of the source's weight survive.
    #[serde(default = "default_rel_edge_threshold")]
    pub rel_edge_threshold: f64,
    #[serde(default)]
    pub lpa: LpaOptions,
    #[serde(default = "default_path_max_depth")]
    pub path_max_depth: usize,
    #[serde(default = "default_path_prob_cutoff")]
    pub path_prob_cutoff: f64,
    #[serde(default = "default_path_max_accumulated")]
    pub path_max_accumulated: usize,
    #[serde(default = "default_top_paths")]
    pub top_paths: usize,
    #[serde(default = "default_facade_coupling_threshold")]
    pub facade_coupling_threshold: f64,
    #[serde(default = "default_split_min_size")]
    pub split_min_size: usize,
    #[serde(default = "default_split_max_purity")]
    pub split_max_purity: f64,
    #[serde(default = "default_max_boundary_suggestions")]
    pub max_boundary_suggestions: usize,
    #[serde(default = "default_ambiguity_threshold")]
    pub ambiguity_threshold: f64,
    /// Commit authors ignored by activity metrics.
    #[serde(default)]
    pub excluded_authors: Vec<String>,
    /// W2V1 word-vector file used to name communities.
    #[serde(default)]
    pub vectors_path: Option<String>,
}

fn default_namespace_depth() -> usize {
    3
}
fn default_top_k_edges() -> usize {
    5
}
fn default_abs_edge_threshold() -> usize {
    1
}
fn default_rel_edge_threshold() -> f64 {
    0.10
}
fn default_path_max_depth() -> usize {
    8
}
fn default_path_prob_cutoff() -> f64 {
    1e-3
}
fn default_path_max_accumulated() -> usize {
    5000
}
fn default_top_paths() -> usize {
    5
}
fn default_facade_coupling_threshold() -> f64 {
    0.70
}
fn default_split_min_size() -> usize {
    50
}
fn default_split_max_purity() -> f64 {
    0.60
}
fn default_max_boundary_suggestions() -> usize {
    5
}
fn default_ambiguity_threshold() -> f64 {
    0.10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            namespace_depth: default_namespace_depth(),
            top_k_edges: default_top_k_edges(),
            abs_edge_threshold: default_abs_edge_threshold(),
            rel_edge_threshold: default_rel_edge_threshold(),
            lpa: LpaOptions::default(),
            path_max_depth: default_path_max_depth(),
            path_prob_cutoff: default_path_prob_cutoff(),
            path_max_accumulated: default_path_max_accumulated(),
            top_paths: default_top_paths(),
            facade_coupling_threshold: default_facade_coupling_threshold(),
            split_min_size: default_split_min_size(),
            split_max_purity: default_split_max_purity(),
            max_boundary_suggestions: default_max_boundary_suggestions(),
            ambiguity_threshold: default_ambiguity_threshold(),
            excluded_authors: Vec::new(),
            vectors_path: None,
        }
    }
}

/// A graph node in the output JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    pub id: NodeId,
    pub short: String,
    pub package: String,
    pub edges: Vec<NodeId>,
}

/// Result of an analysis run, serialized as the JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub graph: Vec<NodeOutput>,
    #[serde(default)]
    pub community: Option<CommunityMetrics>,
    #[serde(default)]
    pub architecture: Option<ArchitectureMetrics>,
    #[serde(default)]
    pub activity: Option<RepositoryActivity>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            version: default_version(),
            metadata: HashMap::new(),
            stats: HashMap::new(),
            graph: Vec::new(),
            community: None,
            architecture: None,
            activity: None,
            suggestions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_config_defaults() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.namespace_depth, 3);
        assert_eq!(cfg.top_k_edges, 5);
        assert_eq!(cfg.abs_edge_threshold, 1);
        assert_eq!(cfg.rel_edge_threshold, 0.10);
        assert_eq!(cfg.path_max_depth, 8);
        assert_eq!(cfg.path_max_accumulated, 5000);
        assert_eq!(cfg.top_paths, 5);
        assert!(cfg.vectors_path.is_none());
    }

    #[test]
    fn lpa_defaults_are_inert() {
        let lpa = LpaOptions::default();
        assert_eq!(lpa.max_iters, 15);
        assert_eq!(lpa.min_community_size, 1);
        assert_eq!(lpa.resolution, 1.0);
        assert_eq!(lpa.tie_break, TieBreak::Small);
        assert!(lpa.seed.is_none());
        assert!(!lpa.shuffle);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{"namespace_depth": 2, "lpa": {"tie_break": "large"}}"#)
                .unwrap();
        assert_eq!(cfg.namespace_depth, 2);
        assert_eq!(cfg.top_k_edges, 5);
        assert_eq!(cfg.lpa.tie_break, TieBreak::Large);
        assert_eq!(cfg.lpa.max_iters, 15);
    }

    #[test]
    fn input_deserializes_optional_fields() {
        let input: AnalysisInput = serde_json::from_str(
            r#"{"files": [{"path": "src/a.php", "dependencies": [{"from": "A\\B", "to": "C\\D"}]}]}"#,
        )
        .unwrap();
        assert_eq!(input.files.len(), 1);
        assert!(input.files[0].namespace.is_none());
        assert!(input.files[0].commits.is_none());
        assert!(input.predictions.is_empty());
    }

    #[test]
    fn top_label_is_first_prediction() {
        let pred = ClassPrediction {
            file: "a.php".to_string(),
            class: "App\\Domain\\User".to_string(),
            predictions: vec![
                RolePrediction {
                    label: "component:domain:entity".to_string(),
                    probability: 0.7,
                },
                RolePrediction {
                    label: "component:app:service".to_string(),
                    probability: 0.2,
                },
            ],
        };
        assert_eq!(pred.top_label(), Some("component:domain:entity"));
    }

    #[test]
    fn analysis_result_default() {
        let result = AnalysisResult::default();
        assert_eq!(result.version, "1.0");
        assert!(result.graph.is_empty());
        assert!(result.community.is_none());
        assert!(result.suggestions.is_empty());
    }
}
