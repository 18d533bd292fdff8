use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::types::{Edge, Node, NodeAttributes, Point, Snapshot};
use crate::error::{GraphError, Result};

/// What a `toggle_edge` call did to the edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    /// Number of edges removed between the pair (both directions count).
    Removed(usize),
}

/// Counts of edges `replace_all` dropped because they failed validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub nodes: usize,
    pub edges: usize,
    pub discarded_edges: usize,
}

/// Canonical node and edge set.
///
/// Edges are stored directed. Every mutation validates first and then applies,
/// so a failed call leaves the store exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    id_to_index: HashMap<String, usize>,
    next_id: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.id_to_index.get(id).map(|&i| &self.nodes[i])
    }
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }
    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Number of edges between `a` and `b` in either direction.
    pub fn edge_count_between(&self, a: &str, b: &str) -> usize {
        self.edges.iter().filter(|e| e.connects(a, b)).count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Adds a node. Without an explicit id a fresh `node_{n}` id is generated.
    pub fn add_node(
        &mut self,
        id: Option<&str>,
        label: &str,
        attributes: NodeAttributes,
    ) -> Result<Node> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GraphError::EmptyLabel);
        }

        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() => {
                if self.contains(id) {
                    return Err(GraphError::DuplicateId { id: id.to_string() });
                }
                id.to_string()
            }
            _ => self.fresh_id(),
        };

        let node = Node::new(id, label).with_attributes(attributes);
        self.id_to_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node.clone());
        debug!("added node {} ({})", node.id, node.label);
        Ok(node)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("node_{}", self.next_id);
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Removes a node together with every edge that references it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let index = self.node_index(id).ok_or_else(|| GraphError::NotFound {
            what: format!("node {id}"),
        })?;

        let node = self.nodes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        self.reindex();
        debug!(
            "removed node {} and {} incident edges",
            id,
            before - self.edges.len()
        );
        Ok(node)
    }

    /// Adds a directed edge `source -> target`.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Result<()> {
        self.check_endpoints(source, target)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { weight });
        }
        if self.has_edge(source, target) {
            return Err(GraphError::DuplicateEdge {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        self.edges.push(Edge::weighted(source, target, weight));
        debug!("added edge {source} -> {target} ({weight})");
        Ok(())
    }

    /// Removes the directed edge `source -> target`.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<Edge> {
        let pos = self
            .edges
            .iter()
            .position(|e| e.source == source && e.target == target)
            .ok_or_else(|| GraphError::NotFound {
                what: format!("edge {source} -> {target}"),
            })?;
        Ok(self.edges.remove(pos))
    }

    /// Undirected toggle: removes every edge between the pair if any exists,
    /// otherwise adds `a -> b`.
    pub fn toggle_edge(&mut self, a: &str, b: &str) -> Result<Toggle> {
        self.check_endpoints(a, b)?;

        let before = self.edges.len();
        self.edges.retain(|e| !e.connects(a, b));
        let removed = before - self.edges.len();

        if removed > 0 {
            debug!("toggle {a} <-> {b}: removed {removed}");
            Ok(Toggle::Removed(removed))
        } else {
            self.edges.push(Edge::new(a, b));
            debug!("toggle {a} <-> {b}: added");
            Ok(Toggle::Added)
        }
    }

    fn check_endpoints(&self, a: &str, b: &str) -> Result<()> {
        if a == b {
            return Err(GraphError::SelfLoop { id: a.to_string() });
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(GraphError::unknown(id));
            }
        }
        Ok(())
    }

    /// Pins a node at `position`; layouts will leave it there.
    pub fn pin_node(&mut self, id: &str, position: Point) -> Result<()> {
        let node = self.node_mut(id)?;
        node.position = Some(position);
        node.pinned = true;
        Ok(())
    }

    pub fn unpin_node(&mut self, id: &str) -> Result<()> {
        self.node_mut(id)?.pinned = false;
        Ok(())
    }

    /// Writes layout output back. Ids not in the store are rejected before
    /// anything is written; pinned nodes are skipped.
    pub fn set_positions(&mut self, positions: &HashMap<String, Point>) -> Result<()> {
        if let Some(missing) = positions.keys().find(|id| !self.contains(id)) {
            return Err(GraphError::unknown(missing));
        }
        for node in self.nodes.iter_mut().filter(|n| !n.pinned) {
            if let Some(&p) = positions.get(&node.id) {
                node.position = Some(p);
            }
        }
        Ok(())
    }

    /// Replaces node attributes wholesale, e.g. after a simulation tick.
    /// The node id sequence must match the current one.
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) -> Result<()> {
        if nodes.len() != self.nodes.len()
            || nodes.iter().zip(&self.nodes).any(|(a, b)| a.id != b.id)
        {
            return Err(GraphError::malformed(
                "replacement nodes do not match the current node set",
            ));
        }
        self.nodes = nodes;
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        let index = self.node_index(id).ok_or_else(|| GraphError::unknown(id))?;
        Ok(&mut self.nodes[index])
    }

    /// Bulk replacement used by import and regenerate.
    ///
    /// Duplicate or blank node ids reject the whole call. Edges that dangle,
    /// loop, repeat an ordered pair or carry an invalid weight are discarded
    /// and counted in the report.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<ReplaceReport> {
        let mut id_to_index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(GraphError::malformed(format!("node {i} has a blank id")));
            }
            if node.label.trim().is_empty() {
                return Err(GraphError::EmptyLabel);
            }
            if id_to_index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::malformed(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(edges.len());
        let mut discarded = 0;
        for edge in edges {
            let valid = edge.source != edge.target
                && id_to_index.contains_key(&edge.source)
                && id_to_index.contains_key(&edge.target)
                && edge.weight.is_finite()
                && edge.weight >= 0.0
                && seen.insert((edge.source.clone(), edge.target.clone()));
            if valid {
                kept.push(edge);
            } else {
                warn!("discarding edge {} -> {}", edge.source, edge.target);
                discarded += 1;
            }
        }

        self.nodes = nodes;
        self.edges = kept;
        self.id_to_index = id_to_index;
        self.next_id = 0;

        let report = ReplaceReport {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            discarded_edges: discarded,
        };
        info!(
            "graph replaced: {} nodes, {} edges ({} discarded)",
            report.nodes, report.edges, report.discarded_edges
        );
        Ok(report)
    }

    fn reindex(&mut self) {
        self.id_to_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> GraphStore {
        let mut g = GraphStore::new();
        for id in ["A", "B", "C"] {
            g.add_node(Some(id), id, NodeAttributes::default()).unwrap();
        }
        g
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut g = GraphStore::new();
        g.add_node(Some("node_1"), "taken", NodeAttributes::default())
            .unwrap();
        let a = g.add_node(None, "a", NodeAttributes::default()).unwrap();
        let b = g.add_node(None, "b", NodeAttributes::default()).unwrap();
        assert_eq!(a.id, "node_2");
        assert_eq!(b.id, "node_3");
    }

    #[test]
    fn add_node_rejects_duplicates_and_blank_labels() {
        let mut g = abc();
        assert_eq!(
            g.add_node(Some("A"), "again", NodeAttributes::default()),
            Err(GraphError::DuplicateId { id: "A".into() })
        );
        assert_eq!(
            g.add_node(None, "   ", NodeAttributes::default()),
            Err(GraphError::EmptyLabel)
        );
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn toggle_twice_restores_pair_count() {
        let mut g = abc();
        g.add_edge("B", "A", 1.0).unwrap();
        let before = g.edge_count_between("A", "B");

        assert_eq!(g.toggle_edge("A", "B"), Ok(Toggle::Removed(1)));
        assert_eq!(g.toggle_edge("A", "B"), Ok(Toggle::Added));
        assert_eq!(g.edge_count_between("A", "B"), before);

        assert_eq!(g.toggle_edge("B", "C"), Ok(Toggle::Added));
        assert_eq!(g.toggle_edge("B", "C"), Ok(Toggle::Removed(1)));
        assert_eq!(g.edge_count_between("B", "C"), 0);
    }

    #[test]
    fn toggle_rejects_self_loops_and_unknown_nodes() {
        let mut g = abc();
        assert_eq!(
            g.toggle_edge("A", "A"),
            Err(GraphError::SelfLoop { id: "A".into() })
        );
        assert_eq!(
            g.toggle_edge("A", "Z"),
            Err(GraphError::UnknownNode { id: "Z".into() })
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn remove_node_cascades() {
        let mut g = abc();
        g.toggle_edge("A", "B").unwrap();
        g.toggle_edge("B", "C").unwrap();
        g.toggle_edge("A", "C").unwrap();

        g.remove_node("B").unwrap();

        assert_eq!(g.edges(), &[Edge::new("A", "C")]);
        assert_eq!(g.node_index("C"), Some(1));
        assert!(matches!(
            g.remove_node("B"),
            Err(GraphError::NotFound { .. })
        ));
    }

    #[test]
    fn add_edge_validates() {
        let mut g = abc();
        g.add_edge("A", "B", 2.5).unwrap();
        assert!(matches!(
            g.add_edge("A", "B", 1.0),
            Err(GraphError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            g.add_edge("B", "C", -1.0),
            Err(GraphError::InvalidWeight { .. })
        ));
        // reverse direction is a different ordered pair
        g.add_edge("B", "A", 1.0).unwrap();
        assert_eq!(g.edge_count_between("A", "B"), 2);
        g.remove_edge("A", "B").unwrap();
        assert!(!g.has_edge("A", "B"));
    }

    #[test]
    fn replace_all_discards_invalid_edges() {
        let mut g = abc();
        let nodes = vec![Node::new("x", "X"), Node::new("y", "Y")];
        let edges = vec![
            Edge::new("x", "y"),
            Edge::new("x", "y"),
            Edge::new("x", "x"),
            Edge::new("x", "missing"),
            Edge::weighted("y", "x", f64::NAN),
        ];
        let report = g.replace_all(nodes, edges).unwrap();
        assert_eq!(
            report,
            ReplaceReport {
                nodes: 2,
                edges: 1,
                discarded_edges: 4
            }
        );
        assert!(!g.contains("A"));
    }

    #[test]
    fn failed_replace_keeps_current_graph() {
        let mut g = abc();
        g.toggle_edge("A", "B").unwrap();
        let before = g.snapshot();

        let err = g.replace_all(vec![Node::new("x", "X"), Node::new("x", "X2")], vec![]);
        assert!(matches!(err, Err(GraphError::MalformedImport { .. })));
        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn set_positions_skips_pinned_nodes() {
        let mut g = abc();
        g.pin_node("A", Point::new(5.0, 5.0)).unwrap();
        let positions: HashMap<String, Point> = [
            ("A".to_string(), Point::new(0.0, 0.0)),
            ("B".to_string(), Point::new(1.0, 1.0)),
        ]
        .into_iter()
        .collect();
        g.set_positions(&positions).unwrap();
        assert_eq!(g.node("A").unwrap().position, Some(Point::new(5.0, 5.0)));
        assert_eq!(g.node("B").unwrap().position, Some(Point::new(1.0, 1.0)));

        g.unpin_node("A").unwrap();
        g.set_positions(&positions).unwrap();
        assert_eq!(g.node("A").unwrap().position, Some(Point::new(0.0, 0.0)));
    }
}
