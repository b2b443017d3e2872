//! Role taxonomy used by the class classifier.
//!
//! Labels follow `category:subcategory:variant`, e.g. `component:domain:entity`.
//! Families group labels into architectural layers.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ClassPrediction;

/// Family key for labels outside every family.
pub const UNKNOWN_FAMILY: &str = "unknown";

/// Label used when a class has no prediction.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Classifier output labels, in model output order (line 1 first).
pub const LABELS: [&str; 64] = [
    "component:interface:controller",
    "component:interface:presenter",
    "component:interface:view",
    "component:interface:view_model",
    "component:app:use_case",
    "component:app:service",
    "component:app:flow_orchestrator",
    "component:app:transaction_manager",
    "component:app:mapper",
    "component:app:converter",
    "component:domain:entity",
    "component:domain:value_object",
    "component:domain:aggregate_root",
    "component:domain:service",
    "component:domain:rule",
    "component:domain:policy",
    "component:domain:specification",
    "component:data_access:repository",
    "component:data_access:gateway",
    "component:data_access:mapper",
    "component:data_access:dto",
    "component:messaging:handler",
    "component:messaging:publisher",
    "component:messaging:subscriber",
    "component:messaging:bus",
    "construction:factory:abstract",
    "construction:factory:method",
    "construction:builder:fluent",
    "construction:builder:configurator",
    "construction:adapter:external",
    "construction:adapter:internal",
    "construction:transformer:data",
    "construction:transformer:view",
    "infrastructure:client:http",
    "infrastructure:client:database",
    "infrastructure:client:queue",
    "infrastructure:system:file_io",
    "infrastructure:system:environment",
    "infrastructure:logging:logger",
    "infrastructure:monitoring:metric",
    "infrastructure:security:token_handler",
    "infrastructure:security:authenticator",
    "infrastructure:security:authorizer",
    "infrastructure:cache:manager",
    "infrastructure:configuration:loader",
    "infrastructure:configuration:model",
    "infrastructure:error:handler",
    "component:core:library",
    "component:core:algorithm",
    "component:core:utility",
    "component:core:runtime_support",
    "utility:helper:string",
    "utility:helper:date_time",
    "utility:helper:math",
    "utility:helper:component",
    "utility:converter:format",
    "utility:validator:input",
    "utility:validator:model",
    "utility:serialization:serializer",
    "utility:serialization:deserializer",
    "framework:internal:infrastructure",
    "development:test:case",
    "development:test:fixture",
    "development:test:mock",
];

/// Label for a 1-indexed classifier output line.
pub fn label_at(line: usize) -> Option<&'static str> {
    line.checked_sub(1).and_then(|i| LABELS.get(i)).copied()
}

/// A high-level architectural grouping of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Family {
    pub key: &'static str,
    pub description: &'static str,
    /// Hex colour used when rendering the family.
    pub color: &'static str,
    pub labels: &'static [&'static str],
}

pub const FAMILIES: [Family; 7] = [
    Family {
        key: "interface",
        description: "Entry points and presentation components. They expose the system through \
controllers, views, presenters, and transform data for display.",
        color: "#2196F3",
        labels: &[
            "component:interface:controller",
            "component:interface:presenter",
            "component:interface:view",
            "component:interface:view_model",
            "construction:transformer:view",
        ],
    },
    Family {
        key: "application",
        description: "Application orchestration layer. Coordinates use cases, services, \
workflows, transactions, and message handlers.",
        color: "#4CAF50",
        labels: &[
            "component:app:use_case",
            "component:app:service",
            "component:app:flow_orchestrator",
            "component:app:transaction_manager",
            "component:app:mapper",
            "component:app:converter",
            "component:messaging:handler",
        ],
    },
    Family {
        key: "domain",
        description: "Pure domain logic and business rules: entities, value objects, aggregates, \
policies, rules, specifications, and domain services.",
        color: "#FFC107",
        labels: &[
            "component:domain:entity",
            "component:domain:value_object",
            "component:domain:aggregate_root",
            "component:domain:service",
            "component:domain:rule",
            "component:domain:policy",
            "component:domain:specification",
        ],
    },
    Family {
        key: "infrastructure",
        description: "Technical implementation details: persistence, gateways, external systems, \
clients, caching, security, configuration, monitoring, logging, and messaging infrastructure.",
        color: "#9C27B0",
        labels: &[
            "component:data_access:repository",
            "component:data_access:gateway",
            "component:data_access:mapper",
            "component:data_access:dto",
            "component:messaging:publisher",
            "component:messaging:subscriber",
            "component:messaging:bus",
            "infrastructure:client:http",
            "infrastructure:client:database",
            "infrastructure:client:queue",
            "infrastructure:system:file_io",
            "infrastructure:system:environment",
            "infrastructure:logging:logger",
            "infrastructure:monitoring:metric",
            "infrastructure:security:token_handler",
            "infrastructure:security:authenticator",
            "infrastructure:security:authorizer",
            "infrastructure:cache:manager",
            "infrastructure:configuration:loader",
            "infrastructure:configuration:model",
            "infrastructure:error:handler",
            "framework:internal:infrastructure",
        ],
    },
    Family {
        key: "core",
        description: "Low-level reusable components, algorithms, utilities, and runtime support \
structures used internally by the system.",
        color: "#F44336",
        labels: &[
            "component:core:library",
            "component:core:algorithm",
            "component:core:utility",
            "component:core:runtime_support",
        ],
    },
    Family {
        key: "utility",
        description: "General-purpose helpers, validators, serializers, converters and any \
cross-cutting utility unrelated to domain or application logic.",
        color: "#607D8B",
        labels: &[
            "utility:helper:string",
            "utility:helper:date_time",
            "utility:helper:math",
            "utility:helper:component",
            "utility:converter:format",
            "utility:validator:input",
            "utility:validator:model",
            "utility:serialization:serializer",
            "utility:serialization:deserializer",
        ],
    },
    Family {
        key: "development",
        description: "Testing-related artefacts: test cases, fixtures, mocks, and \
development-only classes.",
        color: "#795548",
        labels: &[
            "development:test:case",
            "development:test:fixture",
            "development:test:mock",
        ],
    },
];

/// Family key of a label, or [`UNKNOWN_FAMILY`].
pub fn family_for_label(label: &str) -> &'static str {
    FAMILIES
        .iter()
        .find(|f| f.labels.contains(&label))
        .map_or(UNKNOWN_FAMILY, |f| f.key)
}

/// A role label split into its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleLabel<'a> {
    raw: &'a str,
    category: &'a str,
    subcategory: Option<&'a str>,
    variant: Option<&'a str>,
}

impl<'a> RoleLabel<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let mut parts = raw.split(':');
        Self {
            raw,
            category: parts.next().unwrap_or_default(),
            subcategory: parts.next(),
            variant: parts.next(),
        }
    }

    /// First segment (`component`, `infrastructure`, ...).
    pub fn category(&self) -> &'a str {
        self.category
    }

    /// Second segment (`interface`, `domain`, `app`, `data_access`, ...).
    pub fn subcategory(&self) -> Option<&'a str> {
        self.subcategory
    }

    /// Third segment (`controller`, `entity`, ...).
    pub fn variant(&self) -> Option<&'a str> {
        self.variant
    }

    /// Whether the label has at least `category:subcategory`.
    pub fn is_structured(&self) -> bool {
        self.subcategory.is_some()
    }

    pub fn family(&self) -> &'static str {
        family_for_label(self.raw)
    }
}

/// Second label segment, or `unknown`.
pub fn role_category(label: &str) -> &str {
    RoleLabel::parse(label).subcategory().unwrap_or("unknown")
}

/// Third label segment, falling back to the second, or `unknown`.
pub fn role_layer(label: &str) -> &str {
    let role = RoleLabel::parse(label);
    role.variant()
        .or(role.subcategory())
        .unwrap_or("unknown")
}

/// Predictions grouped by family key then by top label.
///
/// Every family appears (possibly empty), plus [`UNKNOWN_FAMILY`].
pub fn group_by_family(
    predictions: &[ClassPrediction],
) -> BTreeMap<&'static str, BTreeMap<String, Vec<&ClassPrediction>>> {
    let mut grouped: BTreeMap<&'static str, BTreeMap<String, Vec<&ClassPrediction>>> = FAMILIES
        .iter()
        .map(|f| (f.key, BTreeMap::new()))
        .collect();
    grouped.insert(UNKNOWN_FAMILY, BTreeMap::new());

    for prediction in predictions {
        let label = prediction.top_label().unwrap_or(UNKNOWN_LABEL);
        grouped
            .entry(family_for_label(label))
            .or_default()
            .entry(label.to_string())
            .or_default()
            .push(prediction);
    }
    grouped
}
