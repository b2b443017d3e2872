//! Refactoring suggestions derived from community metrics.

use std::collections::HashSet;

use crate::aggregate::{CommunityMetrics, Suggestion};
use crate::config::AnalysisConfig;

const FACADE_GUIDANCE: &str = "This community depends on many others. Introduce a façade or API \
boundary to reduce direct dependencies and stabilize interactions.";

const SPLIT_GUIDANCE: &str = "This community aggregates several concerns. Consider splitting it \
into smaller, cohesive modules aligned by domain or namespace to improve purity and maintainability.";

const BOUNDARY_GUIDANCE: &str = "This node connects multiple communities and can create tight \
coupling. Consider introducing anti-corruption layers, moving responsibilities, or clarifying \
ownership to reduce boundary crossings.";

fn percent(ratio: f64) -> i64 {
    (ratio * 100.0).round() as i64
}

/// Façade, split and boundary-node suggestions, in that order.
pub fn community_suggestions(config: &AnalysisConfig, metrics: &CommunityMetrics) -> Vec<Suggestion> {
    let mut out = Vec::new();

    for (community, &coupling) in &metrics.coupling_ratio {
        if coupling > config.facade_coupling_threshold {
            out.push(Suggestion {
                summary: format!("Introduce façade for community {community}"),
                location: community.to_string(),
                rationale: format!(
                    "High outbound coupling ratio: {}% (> {}%)",
                    percent(coupling),
                    percent(config.facade_coupling_threshold)
                ),
                guidance: FACADE_GUIDANCE.to_string(),
            });
        }
    }

    for (community, members) in &metrics.communities {
        let size = members.len();
        let purity = metrics.purity.get(community).copied().unwrap_or(0.0);
        if size > config.split_min_size && purity < config.split_max_purity {
            out.push(Suggestion {
                summary: format!("Split module for community {community}"),
                location: community.to_string(),
                rationale: format!(
                    "Large and impure community: size={size} (>{}), purity={}% (<{}%)",
                    config.split_min_size,
                    percent(purity),
                    percent(config.split_max_purity)
                ),
                guidance: SPLIT_GUIDANCE.to_string(),
            });
        }
    }

    for node in metrics
        .boundary_nodes
        .iter()
        .take(config.max_boundary_suggestions)
    {
        out.push(Suggestion {
            summary: format!("Refactor boundary node {node}"),
            location: node.to_string(),
            rationale: "Boundary node detected: participates in edges crossing communities"
                .to_string(),
            guidance: BOUNDARY_GUIDANCE.to_string(),
        });
    }

    out
}

/// Append suggestions whose summary is not already present.
pub fn push_unique(target: &mut Vec<Suggestion>, suggestions: Vec<Suggestion>) {
    let mut seen: HashSet<String> = target.iter().map(|s| s.summary.clone()).collect();
    for suggestion in suggestions {
        if seen.insert(suggestion.summary.clone()) {
            target.push(suggestion);
        }
    }
}
