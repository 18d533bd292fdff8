use super::{Positions, place};
use crate::graph::spatial::AABB;
use crate::graph::types::{Node, Point};

/// Splits the nodes, in order, into `levels` consecutive groups whose sizes
/// differ by at most one; node `i` of `n` lands on level `i * levels / n`.
/// Each group occupies one horizontal band and is spread evenly across it.
/// With at least `levels` nodes every band is used.
pub fn layout(nodes: &[Node], bounds: AABB, levels: usize) -> Positions {
    let n = nodes.len();
    let mut positions = Positions::with_capacity(n);
    if n == 0 {
        return positions;
    }

    let levels = levels.max(1);
    let band = bounds.height() / levels as f32;

    let mut start = 0;
    while start < n {
        let level = start * levels / n;
        let end = (start..n).find(|&i| i * levels / n != level).unwrap_or(n);
        let group = &nodes[start..end];

        let y = bounds.min_y + band * (level as f32 + 0.5);
        let step = bounds.width() / (group.len() + 1) as f32;
        for (j, node) in group.iter().enumerate() {
            let x = bounds.min_x + step * (j + 1) as f32;
            place(&mut positions, node, Point::new(x, y));
        }
        start = end;
    }
    positions
}
