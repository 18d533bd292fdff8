//! Cosmetic failure/recovery demo. Nothing here feeds back into graph
//! structure; a timer outside the crate calls `tick` and redraws.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::types::{Node, NodeStatus};

const FULL_HEALTH: f32 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Per tick chance that an online node fails.
    pub failure_probability: f64,
    /// Per tick chance that an online node is compromised.
    pub compromise_probability: f64,
    /// Per tick chance that a failed or compromised node comes back.
    pub recovery_rate: f64,
    /// Edges touching a node below this health are drawn degraded.
    pub degraded_below: f32,
    /// Seed of the random source the engine drives `tick` with.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.05,
            compromise_probability: 0.02,
            recovery_rate: 0.3,
            degraded_below: 50.0,
            seed: 7,
        }
    }
}

impl SimulationConfig {
    pub fn is_valid(&self) -> bool {
        let p = |v: f64| (0.0..=1.0).contains(&v);
        p(self.failure_probability)
            && p(self.compromise_probability)
            && p(self.recovery_rate)
            && self.failure_probability + self.compromise_probability <= 1.0
    }
}

/// Advances every node's status by one step and returns the new nodes.
///
/// Online nodes fail (health 0) or get compromised (health halved);
/// failed and compromised nodes recover to full health at `recovery_rate`.
pub fn tick<R: Rng>(nodes: &[Node], config: &SimulationConfig, rng: &mut R) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut next = node.clone();
            let attrs = &mut next.attributes;
            let health = attrs.health.unwrap_or(FULL_HEALTH);
            let roll: f64 = rng.gen_range(0.0..1.0);

            match attrs.status {
                NodeStatus::Online if roll < config.failure_probability => {
                    attrs.status = NodeStatus::Failed;
                    attrs.health = Some(0.0);
                }
                NodeStatus::Online
                    if roll < config.failure_probability + config.compromise_probability =>
                {
                    attrs.status = NodeStatus::Compromised;
                    attrs.health = Some(health / 2.0);
                }
                NodeStatus::Failed | NodeStatus::Compromised if roll < config.recovery_rate => {
                    attrs.status = NodeStatus::Online;
                    attrs.health = Some(FULL_HEALTH);
                }
                _ => {}
            }
            next
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(format!("n{i}"), "n")).collect()
    }

    #[test]
    fn certain_failure_then_certain_recovery() {
        let mut rng = StdRng::seed_from_u64(1);
        let fail = SimulationConfig {
            failure_probability: 1.0,
            compromise_probability: 0.0,
            recovery_rate: 0.0,
            ..Default::default()
        };
        let failed = tick(&nodes(5), &fail, &mut rng);
        assert!(failed.iter().all(|n| n.attributes.status == NodeStatus::Failed));
        assert!(failed.iter().all(|n| n.attributes.health == Some(0.0)));

        let recover = SimulationConfig {
            failure_probability: 0.0,
            recovery_rate: 1.0,
            ..fail
        };
        let back = tick(&failed, &recover, &mut rng);
        assert!(back.iter().all(|n| n.attributes.status == NodeStatus::Online));
        assert!(back.iter().all(|n| n.attributes.health == Some(FULL_HEALTH)));
    }

    #[test]
    fn zero_rates_change_nothing() {
        let config = SimulationConfig {
            failure_probability: 0.0,
            compromise_probability: 0.0,
            recovery_rate: 0.0,
            ..Default::default()
        };
        let input = nodes(8);
        let out = tick(&input, &config, &mut StdRng::seed_from_u64(3));
        assert_eq!(out, input);
    }

    #[test]
    fn seeded_ticks_are_reproducible() {
        let config = SimulationConfig::default();
        let a = tick(&nodes(50), &config, &mut StdRng::seed_from_u64(9));
        let b = tick(&nodes(50), &config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn validity() {
        assert!(SimulationConfig::default().is_valid());
        let bad = SimulationConfig {
            failure_probability: 0.8,
            compromise_probability: 0.5,
            ..Default::default()
        };
        assert!(!bad.is_valid());
    }
}
