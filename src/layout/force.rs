use std::collections::HashMap;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{LayoutConfig, Positions, place};
use crate::graph::spatial::AABB;
use crate::graph::types::{Edge, Node};

const ALPHA_MIN: f32 = 0.001;
const VELOCITY_DECAY: f32 = 0.4;

/// Force-directed relaxation: pairwise repulsion, springs along edges and a
/// pull towards the centre of `bounds`.
///
/// Nodes without a position start at a random spot drawn from `config.seed`,
/// so equal inputs give equal output. The run stops after `config.iterations`
/// steps or once the mean squared velocity drops below
/// `config.energy_threshold`. Pinned nodes exert force but never move.
pub fn layout(nodes: &[Node], edges: &[Edge], bounds: AABB, config: &LayoutConfig) -> Positions {
    let mut positions = Positions::with_capacity(nodes.len());
    if nodes.is_empty() {
        return positions;
    }

    let (points, steps) = relax(nodes, edges, bounds, config);
    log::debug!("force layout settled after {steps} steps");

    for (node, p) in nodes.iter().zip(points) {
        place(&mut positions, node, p.into());
    }
    positions
}

/// Runs the simulation; returns the final points in node order and the
/// number of steps taken.
fn relax(
    nodes: &[Node],
    edges: &[Edge],
    bounds: AABB,
    config: &LayoutConfig,
) -> (Vec<Vec2>, usize) {
    let n = nodes.len();
    let area = inner(bounds, config.margin);
    let center = area.center();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut pos: Vec<Vec2> = nodes
        .iter()
        .map(|node| match node.position {
            Some(p) => Vec2::from(p),
            None => Vec2::new(
                rng.gen_range(area.min_x..=area.max_x),
                rng.gen_range(area.min_y..=area.max_y),
            ),
        })
        .collect();
    let fixed: Vec<bool> = nodes.iter().map(|node| node.fixed_position().is_some()).collect();
    let mut vel = vec![Vec2::ZERO; n];

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();
    let links: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
        .filter(|(s, t)| s != t)
        .collect();

    let iterations = config.iterations.max(1);
    let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / iterations as f32);
    let mut alpha = 1.0_f32;
    let mut steps = 0;

    for _ in 0..iterations {
        steps += 1;
        let mut force = vec![Vec2::ZERO; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let mut delta = pos[i] - pos[j];
                if delta.length_squared() < 1e-6 {
                    delta = Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
                }
                let d2 = delta.length_squared().max(1.0);
                let push = delta * (-config.charge * alpha / d2);
                force[i] += push;
                force[j] -= push;
            }
        }

        for &(s, t) in &links {
            let delta = pos[t] - pos[s];
            let d = delta.length().max(1e-3);
            let stretch = (d - config.link_distance) / d;
            let pull = delta * (stretch * config.link_strength * alpha * 0.5);
            force[s] += pull;
            force[t] -= pull;
        }

        let mut energy = 0.0;
        let mut moving = 0;
        for i in 0..n {
            if fixed[i] {
                continue;
            }
            force[i] += (center - pos[i]) * config.center_strength * alpha;
            vel[i] = (vel[i] + force[i]) * (1.0 - VELOCITY_DECAY);
            pos[i] = area.clamp(pos[i] + vel[i]);
            energy += vel[i].length_squared();
            moving += 1;
        }

        alpha *= 1.0 - alpha_decay;
        if moving == 0 || energy / (moving as f32) < config.energy_threshold {
            break;
        }
    }
    (pos, steps)
}

/// `bounds` shrunk by `margin`, or `bounds` itself when the margin would
/// leave nothing.
fn inner(bounds: AABB, margin: f32) -> AABB {
    if bounds.width() <= 2.0 * margin || bounds.height() <= 2.0 * margin {
        return bounds;
    }
    AABB {
        min_x: bounds.min_x + margin,
        min_y: bounds.min_y + margin,
        max_x: bounds.max_x - margin,
        max_y: bounds.max_y - margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Point;

    fn ring(n: usize) -> (Vec<Node>, Vec<Edge>) {
        let nodes: Vec<Node> = (0..n).map(|i| Node::new(format!("n{i}"), "n")).collect();
        let edges = (0..n)
            .map(|i| Edge::new(format!("n{i}"), format!("n{}", (i + 1) % n)))
            .collect();
        (nodes, edges)
    }

    #[test]
    fn same_seed_same_layout() {
        let (nodes, edges) = ring(8);
        let config = LayoutConfig::default();
        let a = layout(&nodes, &edges, config.bounds(), &config);
        let b = layout(&nodes, &edges, config.bounds(), &config);
        assert_eq!(a, b);

        let other = LayoutConfig {
            seed: 99,
            ..config.clone()
        };
        assert_ne!(a, layout(&nodes, &edges, other.bounds(), &other));
    }

    #[test]
    fn stays_inside_margin_and_separates_nodes() {
        let (nodes, edges) = ring(10);
        let config = LayoutConfig::default();
        let positions = layout(&nodes, &edges, config.bounds(), &config);
        let area = inner(config.bounds(), config.margin);

        let points: Vec<Point> = nodes.iter().map(|n| positions[&n.id]).collect();
        for p in &points {
            assert!(area.contains(p.x, p.y), "{p:?}");
        }
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.distance(*b) > 1.0);
            }
        }
    }

    #[test]
    fn coincident_start_positions_are_pulled_apart() {
        let nodes: Vec<Node> = (0..3)
            .map(|i| Node::new(format!("n{i}"), "n").with_position(Point::new(400.0, 300.0)))
            .collect();
        let config = LayoutConfig::default();
        let positions = layout(&nodes, &[], config.bounds(), &config);
        assert!(positions["n0"].distance(positions["n1"]) > 1.0);
        assert!(positions["n1"].distance(positions["n2"]) > 1.0);
    }

    #[test]
    fn stops_early_once_energy_drops() {
        let nodes = vec![Node::new("solo", "n").with_position(Point::new(400.0, 300.0))];
        let config = LayoutConfig::default();
        let (points, steps) = relax(&nodes, &[], config.bounds(), &config);
        assert_eq!(steps, 1);
        assert_eq!(points, vec![Vec2::new(400.0, 300.0)]);

        let exhaustive = LayoutConfig {
            energy_threshold: 0.0,
            ..config
        };
        let (_, steps) = relax(&nodes, &[], exhaustive.bounds(), &exhaustive);
        assert_eq!(steps, exhaustive.iterations);
    }

    #[test]
    fn oversized_margin_falls_back_to_bounds() {
        let b = AABB::from_size(10.0, 10.0);
        assert_eq!(inner(b, 20.0), b);
    }
}
