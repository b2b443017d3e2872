//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use stratum_core::config::{
    AnalysisInput, AnalyzedFile, ClassPrediction, Commit, Dependency, RolePrediction,
};
use stratum_core::graph::module_graph::ModuleGraph;
use stratum_core::graph::node_id::NodeId;

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

/// Load a JSON analysis input from the fixtures directory.
pub fn load_input(name: &str) -> AnalysisInput {
    let text = std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture");
    serde_json::from_str(&text).expect("Failed to parse fixture")
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Graph with the given directed edges.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> ModuleGraph {
    let mut graph = ModuleGraph::new();
    for (from, to) in edges {
        graph.add_edge(&NodeId::new(*from), &NodeId::new(*to));
    }
    graph
}

/// A file whose dependencies are `(from, to)` namespace pairs.
pub fn file_with_deps(path: &str, deps: &[(&str, &str)]) -> AnalyzedFile {
    AnalyzedFile {
        path: path.to_string(),
        namespace: None,
        dependencies: deps
            .iter()
            .map(|(from, to)| Dependency {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect(),
        commits: None,
    }
}

/// A file declaring `namespace` with one commit per author entry.
pub fn file_with_commits(path: &str, namespace: &str, authors: &[&str]) -> AnalyzedFile {
    AnalyzedFile {
        path: path.to_string(),
        namespace: Some(namespace.to_string()),
        dependencies: Vec::new(),
        commits: Some(
            authors
                .iter()
                .enumerate()
                .map(|(i, author)| Commit {
                    hash: format!("{i:040x}"),
                    author: author.to_string(),
                    timestamp: chrono::DateTime::from_timestamp(1_700_000_000 + i as i64, 0)
                        .expect("valid timestamp"),
                })
                .collect(),
        ),
    }
}

/// A class prediction with ranked `(label, probability)` pairs.
pub fn prediction(class: &str, ranked: &[(&str, f64)]) -> ClassPrediction {
    ClassPrediction {
        file: format!("src/{}.php", class.replace('\\', "/")),
        class: class.to_string(),
        predictions: ranked
            .iter()
            .map(|(label, probability)| RolePrediction {
                label: label.to_string(),
                probability: *probability,
            })
            .collect(),
    }
}

/// Node ids as plain strings.
pub fn ids<'a>(nodes: impl IntoIterator<Item = &'a NodeId>) -> Vec<String> {
    nodes.into_iter().map(|n| n.to_string()).collect()
}
