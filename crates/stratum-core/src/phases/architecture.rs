//! Phase 5: Layering rules, ambiguous classes and role flows.
//!
//! Graph nodes are namespaces while predictions are per class. Each class is
//! truncated to the analysis depth and a node takes the most frequent top
//! label of its classes.

use log::debug;
use std::collections::BTreeMap;

use crate::aggregate::{
    Aggregate, Ambiguity, ArchitectureMetrics, ArchitectureViolation, LabelScore, RoleFlow,
};
use crate::config::{AnalysisConfig, ClassPrediction};
use crate::graph::module_graph::ModuleGraph;
use crate::graph::node_id::NodeId;
use crate::taxonomy::RoleLabel;

/// Labels kept per ambiguous class.
const AMBIGUITY_TOP_LABELS: usize = 3;

/// Run the architecture phase over the module graph and class predictions.
pub fn run_architecture_phase(
    config: &AnalysisConfig,
    predictions: &[ClassPrediction],
    agg: &mut Aggregate,
) {
    let roles = node_roles(config, &agg.graph, predictions);
    let metrics = ArchitectureMetrics {
        violations: detect_violations(&agg.graph, &roles),
        ambiguities: detect_ambiguities(predictions, config.ambiguity_threshold),
        role_flows: role_flows(&agg.graph, &roles),
    };
    debug!(
        "architecture: {} roles assigned, {} violations, {} ambiguous classes",
        roles.len(),
        metrics.violations.len(),
        metrics.ambiguities.len()
    );
    agg.architecture = Some(metrics);
}

// ---------------------------------------------------------------------------
// Class → node join
// ---------------------------------------------------------------------------

/// Role of every graph node that has at least one classified class.
///
/// Ties between labels go to the smallest label.
pub fn node_roles(
    config: &AnalysisConfig,
    graph: &ModuleGraph,
    predictions: &[ClassPrediction],
) -> BTreeMap<NodeId, String> {
    let mut votes: BTreeMap<NodeId, BTreeMap<&str, usize>> = BTreeMap::new();
    for prediction in predictions {
        let Some(label) = prediction.top_label() else {
            continue;
        };
        let Some(node) = NodeId::from_namespace(&prediction.class, config.namespace_depth) else {
            continue;
        };
        if !graph.has_node(node.as_str()) {
            continue;
        }
        *votes.entry(node).or_default().entry(label).or_insert(0) += 1;
    }

    votes
        .into_iter()
        .filter_map(|(node, labels)| {
            let mut best: Option<(&str, usize)> = None;
            for (label, count) in labels {
                match best {
                    Some((_, c)) if count <= c => {}
                    _ => best = Some((label, count)),
                }
            }
            best.map(|(label, _)| (node, label.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layering rules
// ---------------------------------------------------------------------------

/// A layering rule a dependency can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRule {
    /// Interface controllers may not reach into infrastructure.
    ControllerToInfrastructure,
    /// The domain never depends on the application layer.
    DomainToApplication,
    /// Data access never calls back into the interface layer.
    DataAccessToInterface,
    /// Domain rules only see entities and value objects.
    DomainRuleOutsideModel,
}

impl LayerRule {
    pub fn description(&self) -> &'static str {
        match self {
            Self::ControllerToInfrastructure => {
                "interface controllers must not depend on infrastructure"
            }
            Self::DomainToApplication => "the domain must never depend on the application layer",
            Self::DataAccessToInterface => "data access must not depend on the interface layer",
            Self::DomainRuleOutsideModel => {
                "domain rules may only depend on domain entities or value objects"
            }
        }
    }
}

/// The rule a dependency from `from_role` to `to_role` breaks, if any.
///
/// Labels with fewer than two segments are never judged.
pub fn broken_rule(from_role: &str, to_role: &str) -> Option<LayerRule> {
    let from = RoleLabel::parse(from_role);
    let to = RoleLabel::parse(to_role);
    let (Some(from_sub), Some(to_sub)) = (from.subcategory(), to.subcategory()) else {
        return None;
    };

    if from_sub == "interface"
        && from.variant() == Some("controller")
        && to.category() == "infrastructure"
    {
        return Some(LayerRule::ControllerToInfrastructure);
    }
    if from_sub == "domain" && to_sub == "app" {
        return Some(LayerRule::DomainToApplication);
    }
    if from_sub == "data_access" && to_sub == "interface" {
        return Some(LayerRule::DataAccessToInterface);
    }
    if from_sub == "domain"
        && from.variant() == Some("rule")
        && !(to_sub == "domain" && matches!(to.variant(), Some("entity" | "value_object")))
    {
        return Some(LayerRule::DomainRuleOutsideModel);
    }
    None
}

pub fn is_valid_dependency(from_role: &str, to_role: &str) -> bool {
    broken_rule(from_role, to_role).is_none()
}

/// Every graph edge whose endpoint roles break a layering rule.
pub fn detect_violations(
    graph: &ModuleGraph,
    roles: &BTreeMap<NodeId, String>,
) -> Vec<ArchitectureViolation> {
    let mut violations = Vec::new();
    for (from, to) in graph.edges() {
        let (Some(from_role), Some(to_role)) = (roles.get(from), roles.get(to)) else {
            continue;
        };
        if let Some(rule) = broken_rule(from_role, to_role) {
            violations.push(ArchitectureViolation {
                from: from.clone(),
                to: to.clone(),
                from_role: from_role.clone(),
                to_role: to_role.clone(),
                rule: format!(
                    "{from_role} must not depend on {to_role}: {}",
                    rule.description()
                ),
            });
        }
    }
    violations
}

// ---------------------------------------------------------------------------
// Ambiguity
// ---------------------------------------------------------------------------

/// Classes whose two best predictions are closer than `threshold`, most
/// ambiguous first.
pub fn detect_ambiguities(predictions: &[ClassPrediction], threshold: f64) -> Vec<Ambiguity> {
    let mut ambiguities: Vec<Ambiguity> = predictions
        .iter()
        .filter(|p| p.predictions.len() >= 2)
        .filter_map(|p| {
            let gap = p.predictions[0].probability - p.predictions[1].probability;
            if gap >= threshold {
                return None;
            }
            let top_labels: Vec<LabelScore> = p
                .predictions
                .iter()
                .take(AMBIGUITY_TOP_LABELS)
                .map(|r| LabelScore {
                    label: r.label.clone(),
                    score: r.probability,
                })
                .collect();
            Some(Ambiguity {
                class_name: p.class.clone(),
                file: p.file.clone(),
                pattern: confusion_pattern(&top_labels),
                top_labels,
                gap,
            })
        })
        .collect();

    ambiguities.sort_by(|a, b| a.gap.total_cmp(&b.gap));
    ambiguities
}

/// Name the confusion between the two leading labels.
pub fn confusion_pattern(labels: &[LabelScore]) -> String {
    let [first, second, ..] = labels else {
        return "unknown".to_string();
    };
    let a = RoleLabel::parse(&first.label);
    let b = RoleLabel::parse(&second.label);
    let (Some(variant_a), Some(variant_b)) = (a.variant(), b.variant()) else {
        return format!("{} + {}", first.label, second.label);
    };

    let pair = |x: &str, y: &str| {
        (variant_a == x && variant_b == y) || (variant_a == y && variant_b == x)
    };
    if pair("entity", "repository") {
        return "entity containing persistence code".to_string();
    }

    let is_app = |r: &RoleLabel| r.subcategory() == Some("app");
    let is_infra = |r: &RoleLabel| r.family() == "infrastructure";
    if (is_app(&a) && is_infra(&b)) || (is_infra(&a) && is_app(&b)) {
        return "service doing infrastructure work".to_string();
    }

    if matches!(variant_a, "handler" | "controller") && is_app(&b) {
        return "handler orchestrating too much logic".to_string();
    }

    format!("{variant_a} + {variant_b}")
}

// ---------------------------------------------------------------------------
// Role flows
// ---------------------------------------------------------------------------

/// Edge counts between role pairs, most frequent first.
pub fn role_flows(graph: &ModuleGraph, roles: &BTreeMap<NodeId, String>) -> Vec<RoleFlow> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for (from, to) in graph.edges() {
        if let (Some(from_role), Some(to_role)) = (roles.get(from), roles.get(to)) {
            *counts
                .entry((from_role.as_str(), to_role.as_str()))
                .or_insert(0) += 1;
        }
    }

    let mut flows: Vec<RoleFlow> = counts
        .into_iter()
        .map(|((from_role, to_role), count)| RoleFlow {
            from_role: from_role.to_string(),
            to_role: to_role.to_string(),
            count,
            is_valid: is_valid_dependency(from_role, to_role),
        })
        .collect();
    // counts iterate in role order, so the stable sort keeps it for ties
    flows.sort_by(|a, b| b.count.cmp(&a.count));
    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RolePrediction;

    const CONTROLLER: &str = "component:interface:controller";
    const DATABASE: &str = "infrastructure:client:database";
    const ENTITY: &str = "component:domain:entity";
    const REPOSITORY: &str = "component:data_access:repository";

    fn prediction(class: &str, ranked: &[(&str, f64)]) -> ClassPrediction {
        ClassPrediction {
            file: format!("{}.php", class.replace('\\', "/")),
            class: class.to_string(),
            predictions: ranked
                .iter()
                .map(|(l, p)| RolePrediction {
                    label: l.to_string(),
                    probability: *p,
                })
                .collect(),
        }
    }

    fn scores(labels: &[&str]) -> Vec<LabelScore> {
        labels
            .iter()
            .map(|l| LabelScore {
                label: l.to_string(),
                score: 0.5,
            })
            .collect()
    }

    #[test]
    fn controller_may_not_use_database() {
        assert_eq!(
            broken_rule(CONTROLLER, DATABASE),
            Some(LayerRule::ControllerToInfrastructure)
        );
        assert!(is_valid_dependency(DATABASE, CONTROLLER));
    }

    #[test]
    fn domain_rules() {
        assert_eq!(
            broken_rule(ENTITY, "component:app:service"),
            Some(LayerRule::DomainToApplication)
        );
        assert_eq!(
            broken_rule("component:domain:rule", "component:domain:service"),
            Some(LayerRule::DomainRuleOutsideModel)
        );
        assert!(is_valid_dependency("component:domain:rule", ENTITY));
        assert!(is_valid_dependency(
            "component:domain:rule",
            "component:domain:value_object"
        ));
    }

    #[test]
    fn data_access_may_not_call_interface() {
        assert_eq!(
            broken_rule(REPOSITORY, "component:interface:view"),
            Some(LayerRule::DataAccessToInterface)
        );
    }

    #[test]
    fn malformed_labels_are_valid() {
        assert!(is_valid_dependency("controller", DATABASE));
        assert!(is_valid_dependency(ENTITY, ""));
    }

    #[test]
    fn ambiguity_gap_threshold() {
        let preds = vec![
            prediction("App\\Domain\\User", &[(ENTITY, 0.55), (REPOSITORY, 0.50)]),
            prediction("App\\Domain\\Order", &[(ENTITY, 0.80), (REPOSITORY, 0.50)]),
            prediction("App\\Domain\\Lone", &[(ENTITY, 0.40)]),
        ];
        let found = detect_ambiguities(&preds, 0.10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_name, "App\\Domain\\User");
        assert_eq!(found[0].pattern, "entity containing persistence code");
        assert!((found[0].gap - 0.05).abs() < 1e-9);
        assert_eq!(found[0].top_labels.len(), 2);
    }

    #[test]
    fn ambiguities_sorted_by_gap() {
        let preds = vec![
            prediction("A\\B\\One", &[(ENTITY, 0.40), (CONTROLLER, 0.35), (DATABASE, 0.2)]),
            prediction("A\\B\\Two", &[(ENTITY, 0.40), (CONTROLLER, 0.39)]),
        ];
        let found = detect_ambiguities(&preds, 0.10);
        let names: Vec<&str> = found.iter().map(|a| a.class_name.as_str()).collect();
        assert_eq!(names, vec!["A\\B\\Two", "A\\B\\One"]);
        assert_eq!(found[1].top_labels.len(), 3);
    }

    #[test]
    fn confusion_patterns() {
        assert_eq!(
            confusion_pattern(&scores(&[REPOSITORY, ENTITY])),
            "entity containing persistence code"
        );
        assert_eq!(
            confusion_pattern(&scores(&["component:app:service", "infrastructure:cache:manager"])),
            "service doing infrastructure work"
        );
        assert_eq!(
            confusion_pattern(&scores(&[CONTROLLER, "component:app:use_case"])),
            "handler orchestrating too much logic"
        );
        assert_eq!(
            confusion_pattern(&scores(&[CONTROLLER, ENTITY])),
            "controller + entity"
        );
        assert_eq!(
            confusion_pattern(&scores(&["component:domain", ENTITY])),
            "component:domain + component:domain:entity"
        );
        assert_eq!(confusion_pattern(&scores(&[ENTITY])), "unknown");
    }

    #[test]
    fn roles_join_classes_to_nodes() {
        let mut graph = ModuleGraph::new();
        graph.add_edge(&NodeId::new("App\\Http\\Web"), &NodeId::new("App\\Infra\\Db"));
        let preds = vec![
            prediction("App\\Http\\Web\\HomeController", &[(CONTROLLER, 0.9)]),
            prediction("App\\Http\\Web\\UserController", &[(CONTROLLER, 0.8)]),
            prediction("App\\Http\\Web\\Dto", &[(REPOSITORY, 0.8)]),
            prediction("App\\Infra\\Db\\Connection", &[(DATABASE, 0.9)]),
            prediction("App\\Other\\Thing\\X", &[(ENTITY, 0.9)]),
        ];
        let roles = node_roles(&AnalysisConfig::default(), &graph, &preds);
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[&NodeId::new("App\\Http\\Web")], CONTROLLER);
        assert_eq!(roles[&NodeId::new("App\\Infra\\Db")], DATABASE);
    }

    #[test]
    fn phase_reports_violations_and_flows() {
        let mut agg = Aggregate::new();
        agg.graph
            .add_edge(&NodeId::new("App\\Http\\Web"), &NodeId::new("App\\Infra\\Db"));
        agg.graph
            .add_edge(&NodeId::new("App\\Infra\\Db"), &NodeId::new("App\\Http\\Web"));
        let preds = vec![
            prediction("App\\Http\\Web\\HomeController", &[(CONTROLLER, 0.9)]),
            prediction("App\\Infra\\Db\\Connection", &[(DATABASE, 0.9)]),
        ];
        run_architecture_phase(&AnalysisConfig::default(), &preds, &mut agg);

        let arch = agg.architecture.unwrap();
        assert_eq!(arch.violations.len(), 1);
        let v = &arch.violations[0];
        assert_eq!(v.from.as_str(), "App\\Http\\Web");
        assert_eq!(v.to.as_str(), "App\\Infra\\Db");
        assert!(v.rule.starts_with(&format!("{CONTROLLER} must not depend on {DATABASE}")));

        assert_eq!(arch.role_flows.len(), 2);
        let invalid: Vec<&RoleFlow> = arch.role_flows.iter().filter(|f| !f.is_valid).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].from_role, CONTROLLER);
    }

    #[test]
    fn role_flows_sorted_by_count() {
        let mut graph = ModuleGraph::new();
        for (a, b) in [("a", "x"), ("b", "x"), ("c", "y")] {
            graph.add_edge(&NodeId::new(a), &NodeId::new(b));
        }
        let mut roles = BTreeMap::new();
        for (n, r) in [
            ("a", ENTITY),
            ("b", ENTITY),
            ("c", CONTROLLER),
            ("x", REPOSITORY),
            ("y", DATABASE),
        ] {
            roles.insert(NodeId::new(n), r.to_string());
        }
        let flows = role_flows(&graph, &roles);
        assert_eq!(flows[0].count, 2);
        assert_eq!(flows[0].from_role, ENTITY);
        assert_eq!(flows[1].count, 1);
        assert!(!flows[1].is_valid);
    }
}
