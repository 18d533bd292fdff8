//! Position assignment. Every strategy is a pure function of
//! `(nodes, edges, bounds, config)`; pinned nodes keep their position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::spatial::AABB;
use crate::graph::types::{Edge, Node, Point};

pub mod circular;
pub mod force;
pub mod hierarchical;

pub type Positions = HashMap<String, Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Force,
    Circular,
    Hierarchical,
}

impl std::str::FromStr for Strategy {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "force" => Ok(Strategy::Force),
            "circular" => Ok(Strategy::Circular),
            "hierarchical" => Ok(Strategy::Hierarchical),
            other => Err(GraphError::InvalidConfig {
                reason: format!("unknown layout strategy {other:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Number of bands for the hierarchical strategy.
    pub levels: usize,
    pub iterations: usize,
    /// Force layout stops early once the mean squared step falls below this.
    pub energy_threshold: f32,
    /// Negative values repel.
    pub charge: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub center_strength: f32,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 40.0,
            levels: 3,
            iterations: 300,
            energy_threshold: 0.01,
            charge: -300.0,
            link_distance: 80.0,
            link_strength: 0.1,
            center_strength: 0.05,
            seed: 0x5EED,
        }
    }
}

impl LayoutConfig {
    pub fn bounds(&self) -> AABB {
        AABB::from_size(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(GraphError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        let finite = self.width.is_finite() && self.height.is_finite();
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return invalid("layout bounds must be positive");
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return invalid("layout margin must be non-negative");
        }
        if self.levels == 0 {
            return invalid("hierarchical layout needs at least one level");
        }
        if self.link_distance < 0.0 || self.link_strength < 0.0 || self.center_strength < 0.0 {
            return invalid("force parameters must be non-negative");
        }
        Ok(())
    }
}

/// Lays out `nodes` inside `bounds` with the chosen strategy.
pub fn layout(
    nodes: &[Node],
    edges: &[Edge],
    strategy: Strategy,
    bounds: AABB,
    config: &LayoutConfig,
) -> Positions {
    log::debug!("{:?} layout over {} nodes", strategy, nodes.len());
    match strategy {
        Strategy::Circular => circular::layout(nodes, bounds, config.margin),
        Strategy::Force => force::layout(nodes, edges, bounds, config),
        Strategy::Hierarchical => hierarchical::layout(nodes, bounds, config.levels),
    }
}

/// Inserts `computed` for free nodes and the pinned position for pinned ones.
fn place(positions: &mut Positions, node: &Node, computed: Point) {
    let p = node.fixed_position().unwrap_or(computed);
    positions.insert(node.id.clone(), p);
}
