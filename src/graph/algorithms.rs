use std::collections::HashMap;

use serde::Serialize;

use crate::graph::types::{Edge, EdgeStatus, Node, NodeMetrics, NodeStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Degree {
    pub in_degree: usize,
    pub out_degree: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Strength {
    pub incoming: f64,
    pub outgoing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    pub path: Vec<String>,
    pub total_weight: f64,
}

fn index_of(nodes: &[Node]) -> HashMap<&str, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect()
}

/// Undirected weighted adjacency, neighbours in edge order.
fn undirected(nodes: &[Node], edges: &[Edge]) -> Vec<Vec<(usize, f64)>> {
    let index = index_of(nodes);
    let mut adj = vec![Vec::new(); nodes.len()];
    for edge in edges {
        if let (Some(&s), Some(&t)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) {
            if s != t {
                adj[s].push((t, edge.weight));
                adj[t].push((s, edge.weight));
            }
        }
    }
    adj
}

/// Dijkstra over the undirected view of the graph.
///
/// Plain O(V²) selection: among unvisited nodes the one with the smallest
/// tentative distance wins, ties going to the earlier node in `nodes`.
/// Returns `None` when either endpoint is absent or unreachable.
pub fn shortest_path(
    nodes: &[Node],
    edges: &[Edge],
    start_id: &str,
    end_id: &str,
) -> Option<ShortestPath> {
    let index = index_of(nodes);
    let start = *index.get(start_id)?;
    let end = *index.get(end_id)?;

    let adj = undirected(nodes, edges);
    let n = nodes.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    dist[start] = 0.0;

    loop {
        let mut current = None;
        for i in 0..n {
            if !visited[i] && dist[i].is_finite() {
                match current {
                    Some(c) if dist[c] <= dist[i] => {}
                    _ => current = Some(i),
                }
            }
        }
        let Some(u) = current else { break };
        if u == end {
            break;
        }
        visited[u] = true;

        for &(v, weight) in &adj[u] {
            // negative or NaN weights would break the greedy invariant
            let weight = if weight.is_finite() && weight >= 0.0 { weight } else { continue };
            let candidate = dist[u] + weight;
            if !visited[v] && candidate < dist[v] {
                dist[v] = candidate;
                prev[v] = Some(u);
            }
        }
    }

    if !dist[end].is_finite() {
        return None;
    }

    let mut path = vec![end];
    let mut at = end;
    while let Some(p) = prev[at] {
        path.push(p);
        at = p;
    }
    path.reverse();

    Some(ShortestPath {
        path: path.into_iter().map(|i| nodes[i].id.clone()).collect(),
        total_weight: dist[end],
    })
}

/// Directed in/out degree per node, one pass over the edges.
pub fn centrality(nodes: &[Node], edges: &[Edge]) -> HashMap<String, Degree> {
    let mut degrees: HashMap<String, Degree> = nodes
        .iter()
        .map(|node| (node.id.clone(), Degree::default()))
        .collect();

    for edge in edges {
        if !(degrees.contains_key(&edge.source) && degrees.contains_key(&edge.target)) {
            continue;
        }
        if let Some(d) = degrees.get_mut(&edge.source) {
            d.out_degree += 1;
        }
        if let Some(d) = degrees.get_mut(&edge.target) {
            d.in_degree += 1;
        }
    }
    degrees
}

/// Weighted counterpart of `centrality`: sums of incident edge weights.
pub fn strength(nodes: &[Node], edges: &[Edge]) -> HashMap<String, Strength> {
    let mut strengths: HashMap<String, Strength> = nodes
        .iter()
        .map(|node| (node.id.clone(), Strength::default()))
        .collect();

    for edge in edges {
        if !(strengths.contains_key(&edge.source) && strengths.contains_key(&edge.target)) {
            continue;
        }
        if let Some(s) = strengths.get_mut(&edge.source) {
            s.outgoing += edge.weight;
        }
        if let Some(s) = strengths.get_mut(&edge.target) {
            s.incoming += edge.weight;
        }
    }
    strengths
}

/// MICMAC motricity and dependence over a raw matrix, before any threshold:
/// `outgoing` is the sum of row `i`, `incoming` the sum of column `i`, with
/// `ids[i]` naming both. Short rows count their missing cells as 0.
pub fn matrix_strength(ids: &[String], matrix: &[Vec<f64>]) -> HashMap<String, Strength> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let outgoing = matrix.get(i).map_or(0.0, |row| row.iter().sum());
            let incoming = matrix.iter().filter_map(|row| row.get(i)).sum();
            (id.clone(), Strength { incoming, outgoing })
        })
        .collect()
}

/// Copies degree centrality into each node's `metrics`
/// (influence = out-degree, dependence = in-degree).
pub fn annotate_metrics(nodes: &mut [Node], edges: &[Edge]) {
    let degrees = centrality(nodes, edges);
    for node in nodes.iter_mut() {
        let d = degrees.get(&node.id).copied().unwrap_or_default();
        node.metrics = Some(NodeMetrics {
            influence: d.out_degree,
            dependence: d.in_degree,
        });
    }
}

/// `|E| / (|V|·(|V|-1)/2)`, or 0 for fewer than two nodes.
pub fn density(nodes: &[Node], edges: &[Edge]) -> f64 {
    let v = nodes.len() as f64;
    if nodes.len() < 2 {
        return 0.0;
    }
    edges.len() as f64 / (v * (v - 1.0) / 2.0)
}

pub fn average_degree(nodes: &[Node], edges: &[Edge]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    2.0 * edges.len() as f64 / nodes.len() as f64
}

/// Greedy single-pass label propagation.
///
/// Nodes are visited in slice order. A node takes the label carrying the most
/// incident edge weight among its already-labelled neighbours (ties go to the
/// lowest label); with no labelled neighbour it opens a new label. This is a
/// heuristic: the result depends on node order and is not modularity-optimal.
pub fn detect_communities(nodes: &[Node], edges: &[Edge]) -> HashMap<String, usize> {
    let adj = undirected(nodes, edges);
    let mut labels: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut next_label = 0;

    for u in 0..nodes.len() {
        let mut votes: HashMap<usize, f64> = HashMap::new();
        for &(v, weight) in &adj[u] {
            if let Some(label) = labels[v] {
                *votes.entry(label).or_insert(0.0) += weight;
            }
        }

        let best = votes
            .into_iter()
            .max_by(|(la, wa), (lb, wb)| wa.total_cmp(wb).then(lb.cmp(la)))
            .map(|(label, _)| label);

        labels[u] = Some(best.unwrap_or_else(|| {
            next_label += 1;
            next_label - 1
        }));
    }

    nodes
        .iter()
        .zip(labels)
        .filter_map(|(node, label)| label.map(|l| (node.id.clone(), l)))
        .collect()
}

/// Iterative PageRank over the directed edges.
///
/// d = 0.85 is the standard damping factor.
/// Returns scores aligned with `nodes`.
pub fn pagerank(nodes: &[Node], edges: &[Edge], iterations: usize, damping: f64) -> Vec<f64> {
    let n = nodes.len();
    if n == 0 {
        return vec![];
    }

    let index = index_of(nodes);
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in edges {
        if let (Some(&s), Some(&t)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) {
            out[s].push(t);
        }
    }

    let mut scores = vec![1.0 / n as f64; n];

    for _ in 0..iterations {
        let mut next = vec![(1.0 - damping) / n as f64; n];

        for (i, targets) in out.iter().enumerate() {
            if targets.is_empty() {
                // Dangling node: distribute evenly
                let share = scores[i] * damping / n as f64;
                for s in next.iter_mut() {
                    *s += share;
                }
            } else {
                let share = scores[i] * damping / targets.len() as f64;
                for &j in targets {
                    next[j] += share;
                }
            }
        }

        scores = next;
    }

    scores
}

/// Display status of an edge: degraded when either endpoint is unhealthy.
pub fn edge_status(edge: &Edge, nodes: &[Node], degraded_below: f32) -> EdgeStatus {
    let unhealthy = |id: &str| {
        nodes.iter().find(|n| n.id == id).is_some_and(|n| {
            n.attributes.status != NodeStatus::Online
                || n.attributes.health.is_some_and(|h| h < degraded_below)
        })
    };
    if unhealthy(&edge.source) || unhealthy(&edge.target) {
        EdgeStatus::Degraded
    } else {
        EdgeStatus::Healthy
    }
}
