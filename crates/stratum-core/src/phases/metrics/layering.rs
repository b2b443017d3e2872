//! Strongly connected components and layering of the community graph.

use petgraph::algo::kosaraju_scc;
use std::collections::{BTreeSet, VecDeque};

use super::community_graph::CommunityGraph;

/// Component index of every community, components numbered in discovery order.
pub fn strongly_connected_components(cg: &CommunityGraph) -> Vec<usize> {
    let digraph = cg.to_digraph();
    let mut component = vec![0; cg.len()];
    for (c, members) in kosaraju_scc(&digraph).into_iter().enumerate() {
        for node in members {
            component[digraph[node]] = c;
        }
    }
    component
}

/// Level of every community in the condensation DAG.
///
/// A component's level is the longest path to it from any component with no
/// incoming edges; communities inherit the level of their component.
pub fn levels(cg: &CommunityGraph) -> Vec<usize> {
    if cg.is_empty() {
        return Vec::new();
    }
    let component = strongly_connected_components(cg);
    let components = component.iter().max().map_or(0, |m| m + 1);

    let mut condensed: BTreeSet<(usize, usize)> = BTreeSet::new();
    for from in 0..cg.len() {
        for &to in cg.successors(from).keys() {
            let (cu, cv) = (component[from], component[to]);
            if cu != cv {
                condensed.insert((cu, cv));
            }
        }
    }

    let mut successors = vec![Vec::new(); components];
    let mut indegree = vec![0usize; components];
    for &(cu, cv) in &condensed {
        successors[cu].push(cv);
        indegree[cv] += 1;
    }

    let mut level = vec![0usize; components];
    let mut queue: VecDeque<usize> = (0..components).filter(|&c| indegree[c] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for &v in &successors[u] {
            level[v] = level[v].max(level[u] + 1);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    component.iter().map(|&c| level[c]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::metrics::community_graph::from_edges;

    #[test]
    fn cycle_fed_by_entry() {
        let cg = from_edges(
            &["A", "B", "C", "D"],
            &[("A", "B", 1), ("B", "C", 1), ("C", "A", 1), ("D", "A", 1)],
        );
        let component = strongly_connected_components(&cg);
        assert_eq!(component[0], component[1]);
        assert_eq!(component[1], component[2]);
        assert_ne!(component[0], component[3]);
        assert_eq!(levels(&cg), vec![1, 1, 1, 0]);
    }

    #[test]
    fn longest_path_wins() {
        // a → b → c and a → c: c sits at level 2
        let cg = from_edges(&["a", "b", "c"], &[("a", "b", 1), ("b", "c", 1), ("a", "c", 1)]);
        assert_eq!(levels(&cg), vec![0, 1, 2]);
    }

    #[test]
    fn isolated_communities_are_entry_level() {
        let cg = from_edges(&["x", "y"], &[]);
        assert_eq!(levels(&cg), vec![0, 0]);
        assert!(levels(&from_edges(&[], &[])).is_empty());
    }
}
