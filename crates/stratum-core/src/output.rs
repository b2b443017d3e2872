//! JSON serialisation of an analysis run.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;

use crate::aggregate::Aggregate;
use crate::config::{AnalysisConfig, AnalysisInput, AnalysisResult, NodeOutput};
use crate::graph::module_graph::ModuleGraph;
use crate::taxonomy;

/// Graph nodes in ascending id order, each with its outgoing edges.
fn graph_nodes(graph: &ModuleGraph) -> Vec<NodeOutput> {
    graph
        .nodes()
        .into_iter()
        .map(|node| NodeOutput {
            id: node.id.clone(),
            short: node.name.short.clone(),
            package: node.name.package.clone(),
            edges: graph
                .outgoing(node.id.as_str())
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect()
}

/// Count classes per role family.
fn classes_per_family(input: &AnalysisInput) -> HashMap<String, usize> {
    taxonomy::group_by_family(&input.predictions)
        .into_iter()
        .map(|(family, labels)| {
            (
                family.to_string(),
                labels.values().map(Vec::len).sum::<usize>(),
            )
        })
        .collect()
}

/// Build the AnalysisResult from a finished aggregate.
pub fn build_result(
    config: &AnalysisConfig,
    input: &AnalysisInput,
    agg: Aggregate,
    timings: &HashMap<String, f64>,
    total_ms: f64,
) -> AnalysisResult {
    // Build metadata
    let mut metadata = HashMap::new();
    metadata.insert(
        "analysed_at".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    metadata.insert(
        "stratum_version".to_string(),
        serde_json::Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    metadata.insert(
        "namespace_depth".to_string(),
        serde_json::json!(config.namespace_depth),
    );
    metadata.insert(
        "analysis_duration_ms".to_string(),
        serde_json::json!(((total_ms * 10.0).round() / 10.0)),
    );
    metadata.insert(
        "phase_timings".to_string(),
        serde_json::to_value(timings).unwrap_or_default(),
    );

    // Build stats
    let mut stats = HashMap::new();
    stats.insert("files".to_string(), serde_json::json!(input.files.len()));
    stats.insert(
        "classes".to_string(),
        serde_json::json!(input.predictions.len()),
    );
    stats.insert("nodes".to_string(), serde_json::json!(agg.graph.node_count()));
    stats.insert("edges".to_string(), serde_json::json!(agg.graph.edge_count()));
    stats.insert(
        "communities".to_string(),
        serde_json::json!(agg.community.as_ref().map_or(0, |c| c.communities.len())),
    );
    stats.insert(
        "violations".to_string(),
        serde_json::json!(agg.architecture.as_ref().map_or(0, |a| a.violations.len())),
    );
    stats.insert(
        "ambiguities".to_string(),
        serde_json::json!(agg.architecture.as_ref().map_or(0, |a| a.ambiguities.len())),
    );
    stats.insert(
        "suggestions".to_string(),
        serde_json::json!(agg.suggestions.len()),
    );
    stats.insert(
        "families".to_string(),
        serde_json::to_value(classes_per_family(input)).unwrap_or_default(),
    );

    AnalysisResult {
        version: "1.0".to_string(),
        metadata,
        stats,
        graph: graph_nodes(&agg.graph),
        community: agg.community,
        architecture: agg.architecture,
        activity: agg.activity,
        suggestions: agg.suggestions,
    }
}

/// Write the analysis result as pretty-printed JSON.
pub fn write_output(result: &AnalysisResult, output_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(output_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
    std::fs::write(output_path, json)
}
