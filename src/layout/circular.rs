use std::f32::consts::TAU;

use glam::Vec2;

use super::{Positions, place};
use crate::graph::spatial::AABB;
use crate::graph::types::Node;

/// Node `i` of `n` sits at angle `2π·i/n` on a circle of radius
/// `min(width, height)/2 - margin` around the centre of `bounds`.
pub fn layout(nodes: &[Node], bounds: AABB, margin: f32) -> Positions {
    let n = nodes.len();
    let center = bounds.center();
    let radius = (bounds.width().min(bounds.height()) / 2.0 - margin).max(0.0);

    let mut positions = Positions::with_capacity(n);
    for (i, node) in nodes.iter().enumerate() {
        let angle = TAU * i as f32 / n as f32;
        let p = center + Vec2::from_angle(angle) * radius;
        place(&mut positions, node, p.into());
    }
    positions
}
