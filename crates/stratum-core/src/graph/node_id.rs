//! Strongly-typed identifiers shared by every analysis layer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

/// Runs of non-alphanumeric characters separate namespace segments
/// (`App\Domain`, `com.acme.billing`, `src/api/http`).
static NAMESPACE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

const GITHUB_HOST: &str = "github.com";
const GITHUB_PLACEHOLDER: &str = "githubcom";

/// Truncate a namespace (or path) to its first `depth` segments.
///
/// The first separator found in the namespace is reused to join the kept
/// segments. A namespace with no more than `depth` segments is returned
/// unchanged. Go-style import paths rooted at `github.com` keep the host as a
/// single segment.
pub fn reduce_namespace_depth(namespace: &str, depth: usize) -> String {
    let mut depth = depth;
    let mut namespace = namespace.to_string();
    if namespace.starts_with(GITHUB_HOST) {
        namespace = namespace.replace(GITHUB_HOST, GITHUB_PLACEHOLDER);
        depth += 1;
    }

    let separator = NAMESPACE_SEPARATOR
        .find(&namespace)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let parts: Vec<&str> = NAMESPACE_SEPARATOR.split(&namespace).collect();

    if depth >= parts.len() {
        return namespace.replace(GITHUB_PLACEHOLDER, GITHUB_HOST);
    }

    let mut result = String::new();
    for part in parts.iter().take(depth) {
        result.push_str(part);
        result.push_str(&separator);
    }
    if namespace.starts_with(GITHUB_PLACEHOLDER) {
        result = result.replace(GITHUB_PLACEHOLDER, GITHUB_HOST);
    }

    if separator.is_empty() {
        result
    } else {
        result.trim_matches(|c| separator.contains(c)).to_string()
    }
}

/// Identifier of a graph node: a namespace truncated to the analysis depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a node id from a raw namespace, or `None` when it truncates to nothing.
    pub fn from_namespace(namespace: &str, depth: usize) -> Option<Self> {
        let reduced = reduce_namespace_depth(namespace.trim(), depth);
        if reduced.is_empty() {
            None
        } else {
            Some(Self(reduced))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last namespace segment (`Billing` for `Acme\Billing`).
    pub fn short_name(&self) -> &str {
        match NAMESPACE_SEPARATOR.find_iter(&self.0).last() {
            Some(m) if m.end() < self.0.len() => &self.0[m.end()..],
            _ => &self.0,
        }
    }

    /// Namespace enclosing this node, or the node itself for a single segment.
    pub fn enclosing_namespace(&self) -> &str {
        match NAMESPACE_SEPARATOR.find_iter(&self.0).last() {
            Some(m) if m.start() > 0 => &self.0[..m.start()],
            _ => &self.0,
        }
    }

    /// Non-empty namespace segments in order.
    pub fn segments(&self) -> Vec<&str> {
        NAMESPACE_SEPARATOR
            .split(&self.0)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a detected community: its smallest member node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityId(String);

impl CommunityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CommunityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&NodeId> for CommunityId {
    fn from(node: &NodeId) -> Self {
        Self(node.as_str().to_string())
    }
}

impl From<&str> for CommunityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
