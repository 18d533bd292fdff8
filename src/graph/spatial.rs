use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::graph::types::Point;

/// Axis-aligned box. Also serves as the layout bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl AABB {
    /// Box anchored at the origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Smallest box holding every point, padded by `pad` on each side.
    pub fn around(points: impl IntoIterator<Item = Point>, pad: f32) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<AABB>, p| {
            Some(match acc {
                None => AABB {
                    min_x: p.x - pad,
                    min_y: p.y - pad,
                    max_x: p.x + pad,
                    max_y: p.y + pad,
                },
                Some(b) => AABB {
                    min_x: b.min_x.min(p.x - pad),
                    min_y: b.min_y.min(p.y - pad),
                    max_x: b.max_x.max(p.x + pad),
                    max_y: b.max_y.max(p.y + pad),
                },
            })
        })
    }

    pub fn intersects_circle(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let nearest_x = cx.clamp(self.min_x, self.max_x);
        let nearest_y = cy.clamp(self.min_y, self.max_y);
        let dx = cx - nearest_x;
        let dy = cy - nearest_y;
        dx * dx + dy * dy <= radius * radius
    }
}

const MAX_DEPTH: usize = 12;

/// Point quadtree over node positions, used for pointer hit-testing.
pub struct Quadtree {
    bounds: AABB,
    capacity: usize,
    depth: usize,
    entries: Vec<(usize, Point)>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(bounds: AABB, capacity: usize) -> Self {
        Self::with_depth(bounds, capacity.max(1), 0)
    }

    fn with_depth(bounds: AABB, capacity: usize, depth: usize) -> Self {
        Self {
            bounds,
            capacity,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }

    /// Builds a tree over every positioned node; the item is the node index.
    pub fn build(
        positions: impl IntoIterator<Item = (usize, Point)>,
        capacity: usize,
    ) -> Option<Self> {
        let items: Vec<(usize, Point)> = positions.into_iter().collect();
        let bounds = AABB::around(items.iter().map(|&(_, p)| p), 1.0)?;
        let mut tree = Quadtree::new(bounds, capacity);
        for (idx, p) in items {
            tree.insert(idx, p);
        }
        Some(tree)
    }

    pub fn insert(&mut self, idx: usize, p: Point) -> bool {
        if !self.bounds.contains(p.x, p.y) {
            return false;
        }
        // stacked points cannot be separated by subdividing
        let has_room = self.entries.len() < self.capacity || self.depth >= MAX_DEPTH;
        if has_room && self.children.is_none() {
            self.entries.push((idx, p));
            return true;
        }
        if self.children.is_none() {
            self.subdivide();
        }
        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                if child.insert(idx, p) {
                    return true;
                }
            }
        }
        false
    }

    /// Items within `radius` of `(x, y)`.
    pub fn query_point(&self, x: f32, y: f32, radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        self.collect(Point::new(x, y), radius, &mut found);
        found.into_iter().map(|(idx, _)| idx).collect()
    }

    /// Closest item within `radius` of `(x, y)`.
    pub fn nearest(&self, x: f32, y: f32, radius: f32) -> Option<usize> {
        let target = Point::new(x, y);
        let mut found = Vec::new();
        self.collect(target, radius, &mut found);
        found
            .into_iter()
            .min_by(|(ia, a), (ib, b)| {
                a.distance(target)
                    .total_cmp(&b.distance(target))
                    .then(ia.cmp(ib))
            })
            .map(|(idx, _)| idx)
    }

    fn collect(&self, target: Point, radius: f32, out: &mut Vec<(usize, Point)>) {
        if !self.bounds.intersects_circle(target.x, target.y, radius) {
            return;
        }

        out.extend(
            self.entries
                .iter()
                .filter(|(_, p)| p.distance(target) <= radius)
                .copied(),
        );

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.collect(target, radius, out);
            }
        }
    }

    fn subdivide(&mut self) {
        let AABB {
            min_x,
            min_y,
            max_x,
            max_y,
        } = self.bounds;
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;
        let (capacity, depth) = (self.capacity, self.depth + 1);

        let quad = |min_x, min_y, max_x, max_y| {
            Quadtree::with_depth(
                AABB {
                    min_x,
                    min_y,
                    max_x,
                    max_y,
                },
                capacity,
                depth,
            )
        };

        self.children = Some(Box::new([
            quad(min_x, min_y, mid_x, mid_y),
            quad(mid_x, min_y, max_x, mid_y),
            quad(min_x, mid_y, mid_x, max_y),
            quad(mid_x, mid_y, max_x, max_y),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_points_inside_radius_only() {
        let points = (0..50).map(|i| (i, Point::new(i as f32 * 10.0, 0.0)));
        let tree = Quadtree::build(points, 4).unwrap();

        let mut hits = tree.query_point(100.0, 0.0, 10.5);
        hits.sort();
        assert_eq!(hits, vec![9, 10, 11]);
        assert_eq!(tree.nearest(101.0, 1.0, 5.0), Some(10));
        assert_eq!(tree.nearest(1000.0, 1000.0, 5.0), None);
    }

    #[test]
    fn stacked_points_do_not_recurse_forever() {
        let points = (0..20).map(|i| (i, Point::new(3.0, 3.0)));
        let tree = Quadtree::build(points, 2).unwrap();
        assert_eq!(tree.query_point(3.0, 3.0, 0.1).len(), 20);
    }

    #[test]
    fn bounds_helpers() {
        let b = AABB::from_size(800.0, 600.0);
        assert_eq!(b.center(), Vec2::new(400.0, 300.0));
        assert_eq!(b.clamp(Vec2::new(-5.0, 700.0)), Vec2::new(0.0, 600.0));
        assert!(AABB::around(std::iter::empty(), 1.0).is_none());
    }
}
