//! Betweenness centrality of communities (Brandes).

use std::collections::VecDeque;

use super::community_graph::CommunityGraph;

/// Betweenness of each community on the undirected projection.
///
/// Scores are normalized by 1/((c-1)(c-2)) when there are more than two
/// communities; with two or fewer no community can sit between others.
pub fn betweenness(cg: &CommunityGraph) -> Vec<f64> {
    let n = cg.len();
    let adj = cg.undirected();
    let mut scores = vec![0.0; n];

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adj[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                if sigma[w] > 0.0 {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let norm = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        scores.iter_mut().for_each(|b| *b *= norm);
    }
    scores
}
