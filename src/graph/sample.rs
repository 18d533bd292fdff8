use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::graph::types::{Edge, Node, NodeAttributes, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub nodes: usize,
    /// Chance that any unordered pair is linked.
    pub edge_probability: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            nodes: 12,
            edge_probability: 0.2,
            seed: 42,
        }
    }
}

const SAMPLE_KINDS: [NodeKind; 5] = [
    NodeKind::Server,
    NodeKind::Workstation,
    NodeKind::Router,
    NodeKind::Firewall,
    NodeKind::Database,
];

/// Random demo network. The same config always yields the same graph.
pub fn generate(config: &SampleConfig) -> (Vec<Node>, Vec<Edge>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let p = config.edge_probability.clamp(0.0, 1.0);

    let nodes: Vec<Node> = (0..config.nodes)
        .map(|i| {
            let kind = SAMPLE_KINDS[rng.gen_range(0..SAMPLE_KINDS.len())];
            let attributes = NodeAttributes {
                kind,
                health: Some(rng.gen_range(60.0..=100.0)),
                vulnerability: Some(rng.gen_range(0.0..=10.0)),
                security_level: Some(rng.gen_range(1.0..=5.0_f32).round()),
                importance: Some(rng.gen_range(0.0..=1.0)),
                ..Default::default()
            };
            Node::new(format!("node_{}", i + 1), format!("{} {}", kind.as_str(), i + 1))
                .with_attributes(attributes)
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if rng.gen_bool(p) {
                let weight = rng.gen_range(1..=5) as f64;
                edges.push(Edge::weighted(nodes[i].id.clone(), nodes[j].id.clone(), weight));
            }
        }
    }

    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_graph() {
        let config = SampleConfig::default();
        assert_eq!(generate(&config), generate(&config));
    }

    #[test]
    fn edges_are_valid() {
        let config = SampleConfig {
            nodes: 30,
            edge_probability: 0.5,
            seed: 7,
        };
        let (nodes, edges) = generate(&config);
        assert_eq!(nodes.len(), 30);
        assert!(!edges.is_empty());
        for e in &edges {
            assert_ne!(e.source, e.target);
            assert!(nodes.iter().any(|n| n.id == e.source));
            assert!(nodes.iter().any(|n| n.id == e.target));
        }
    }

    #[test]
    fn no_edges_at_zero_probability() {
        let config = SampleConfig {
            edge_probability: 0.0,
            ..Default::default()
        };
        assert!(generate(&config).1.is_empty());
    }
}
