//! Dependency-matrix ordering (simplified Reverse Cuthill-McKee).

use std::collections::VecDeque;

use super::community_graph::CommunityGraph;

/// Order communities so that connected ones sit close together.
///
/// Each connected component is walked breadth-first from its lowest-degree
/// community, lower-degree neighbours first (ties → smallest id); each
/// component's visit order is reversed before being appended.
pub fn reverse_cuthill_mckee(cg: &CommunityGraph) -> Vec<usize> {
    let adj = cg.undirected();
    let degree: Vec<usize> = adj.iter().map(Vec::len).collect();
    let mut visited = vec![false; cg.len()];
    let mut order = Vec::with_capacity(cg.len());

    // Indices follow id order, so min_by_key keeps the smallest id on ties
    while let Some(start) = (0..cg.len())
        .filter(|&i| !visited[i])
        .min_by_key(|&i| degree[i])
    {
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(u) = queue.pop_front() {
            component.push(u);
            let mut next: Vec<usize> = adj[u].iter().copied().filter(|&v| !visited[v]).collect();
            next.sort_by_key(|&v| (degree[v], v));
            for v in next {
                visited[v] = true;
                queue.push_back(v);
            }
        }

        component.reverse();
        order.extend(component);
    }
    order
}
