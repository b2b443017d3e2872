//! Most probable walks through the community graph.
//!
//! From each entry community (no incoming community edge) the search follows
//! outgoing edges with probability weight/total outgoing weight of the
//! source, never revisiting a community already on the current path.

use crate::aggregate::CommunityPath;
use crate::config::AnalysisConfig;

use super::community_graph::CommunityGraph;

/// Bounds on the path search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLimits {
    /// Maximum path length in communities.
    pub max_depth: usize,
    /// Paths are cut once their probability drops below this.
    pub prob_cutoff: f64,
    /// Paths accumulated per entry before the search stops.
    pub max_accumulated: usize,
    /// Paths kept per entry.
    pub top_k: usize,
}

impl PathLimits {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_depth: config.path_max_depth,
            prob_cutoff: config.path_prob_cutoff,
            max_accumulated: config.path_max_accumulated,
            top_k: config.top_paths,
        }
    }
}

/// Communities with no incoming community edge.
pub fn entry_communities(cg: &CommunityGraph) -> Vec<usize> {
    cg.in_degrees()
        .into_iter()
        .enumerate()
        .filter(|&(_, indeg)| indeg == 0)
        .map(|(i, _)| i)
        .collect()
}

/// Top paths from `entry`, most probable first (ties keep discovery order).
pub fn top_paths(cg: &CommunityGraph, entry: usize, limits: &PathLimits) -> Vec<CommunityPath> {
    let mut search = PathSearch {
        cg,
        limits,
        path: Vec::new(),
        on_path: vec![false; cg.len()],
        stack: Vec::new(),
        found: Vec::new(),
    };
    search.run(entry);

    let mut found = search.found;
    found.sort_by(|a, b| b.1.total_cmp(&a.1));
    found.truncate(limits.top_k);
    found
        .into_iter()
        .map(|(path, probability)| CommunityPath {
            path: path.into_iter().map(|i| cg.id(i).clone()).collect(),
            probability,
        })
        .collect()
}

struct Frame {
    prob: f64,
    /// Candidate (community, edge probability), most probable first.
    next: Vec<(usize, f64)>,
    cursor: usize,
}

struct PathSearch<'a> {
    cg: &'a CommunityGraph,
    limits: &'a PathLimits,
    path: Vec<usize>,
    on_path: Vec<bool>,
    stack: Vec<Frame>,
    found: Vec<(Vec<usize>, f64)>,
}

impl PathSearch<'_> {
    fn run(&mut self, entry: usize) {
        self.enter(entry, 1.0);

        while let Some(frame) = self.stack.last_mut() {
            if self.found.len() >= self.limits.max_accumulated {
                break;
            }
            let Some(&(v, p)) = frame.next.get(frame.cursor) else {
                self.stack.pop();
                self.leave();
                continue;
            };
            frame.cursor += 1;
            let prob = frame.prob * p;
            if !self.on_path[v] {
                self.enter(v, prob);
            }
        }
    }

    /// Step onto `node`: either record the path or open a frame to extend it.
    ///
    /// A frame whose successors are all on the path is popped without
    /// recording anything.
    fn enter(&mut self, node: usize, prob: f64) {
        self.path.push(node);
        self.on_path[node] = true;

        let successors = self.cg.successors(node);
        let total = self.cg.out_weight(node);
        let terminal = successors.is_empty()
            || total == 0
            || self.path.len() >= self.limits.max_depth
            || prob < self.limits.prob_cutoff;

        if terminal {
            self.record(prob);
            self.leave();
            return;
        }

        let mut next: Vec<(usize, f64)> = successors
            .iter()
            .map(|(&v, &w)| (v, w as f64 / total as f64))
            .collect();
        // successors iterate in id order, so the stable sort breaks ties by id
        next.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.stack.push(Frame {
            prob,
            next,
            cursor: 0,
        });
    }

    fn leave(&mut self) {
        if let Some(node) = self.path.pop() {
            self.on_path[node] = false;
        }
    }

    fn record(&mut self, prob: f64) {
        if self.found.len() < self.limits.max_accumulated {
            self.found.push((self.path.clone(), prob));
        }
    }
}
