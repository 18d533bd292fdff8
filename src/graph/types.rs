use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D position in layout space.
///
/// `#[repr(C)]` so a slice of points can be handed to a renderer as a packed
/// `[x0, y0, x1, y1, ...]` buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        Vec2::from(self).distance(Vec2::from(other))
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Descriptive category of a node. Drives display colour only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Server,
    Workstation,
    Router,
    Firewall,
    Database,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Server => "server",
            NodeKind::Workstation => "workstation",
            NodeKind::Router => "router",
            NodeKind::Firewall => "firewall",
            NodeKind::Database => "database",
            NodeKind::Unknown => "unknown",
        }
    }

    /// Lenient parse used for tabular imports; anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "server" => NodeKind::Server,
            "workstation" => NodeKind::Workstation,
            "router" => NodeKind::Router,
            "firewall" => NodeKind::Firewall,
            "database" | "db" => NodeKind::Database,
            _ => NodeKind::Unknown,
        }
    }

    /// Fill colour for the node glyph.
    pub fn color(self) -> &'static str {
        match self {
            NodeKind::Server => "#3b82f6",
            NodeKind::Workstation => "#22c55e",
            NodeKind::Router => "#ef4444",
            NodeKind::Firewall => "#f97316",
            NodeKind::Database => "#a855f7",
            NodeKind::Unknown => "#6b7280",
        }
    }

    /// Keyword categorisation of a MICMAC variable name.
    ///
    /// Planning and policy variables are drawn as servers, information and
    /// tooling variables as routers, everything else as workstations.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let planning = [
            "planificación",
            "planificacion",
            "estratégica",
            "estrategica",
            "políticas",
            "politicas",
        ];
        if any(&planning) {
            NodeKind::Server
        } else if any(&["información", "informacion", "digital", "herramientas"]) {
            NodeKind::Router
        } else {
            NodeKind::Workstation
        }
    }
}

/// Cosmetic operational state driven by the demo simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Online,
    Failed,
    Compromised,
}

/// Optional display attributes. None of them affect graph semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttributes {
    pub kind: NodeKind,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerability: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_level: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<f32>,
}

impl NodeAttributes {
    pub fn of_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Derived degree statistics ("influence" and "dependence").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub influence: usize,
    pub dependence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub attributes: NodeAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// A pinned node keeps its position across layout runs.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<NodeMetrics>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: NodeAttributes::default(),
            position: None,
            pinned: false,
            metrics: None,
        }
    }

    pub fn with_attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Position the layout engines must not move.
    pub fn fixed_position(&self) -> Option<Point> {
        if self.pinned { self.position } else { None }
    }
}

pub const DEFAULT_WEIGHT: f64 = 1.0;

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: DEFAULT_WEIGHT,
            kind: None,
        }
    }

    pub fn weighted(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            weight,
            ..Self::new(source, target)
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Healthy,
    Degraded,
}

/// Immutable copy of the graph handed to matrix, layout and algorithm code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_falls_back() {
        let attrs: NodeAttributes = serde_json::from_str(r#"{"kind":"mainframe"}"#).unwrap();
        assert_eq!(attrs.kind, NodeKind::Unknown);
        assert_eq!(NodeKind::parse(" Router "), NodeKind::Router);
        assert_eq!(NodeKind::parse("toaster"), NodeKind::Unknown);
    }

    #[test]
    fn every_kind_has_its_own_colour() {
        assert_eq!(NodeKind::Router.color(), "#ef4444");
        assert_eq!(NodeKind::parse("mainframe").color(), NodeKind::Unknown.color());
        let kinds = ["server", "workstation", "router", "firewall", "database", "other"];
        let colours: std::collections::HashSet<&str> =
            kinds.iter().map(|k| NodeKind::parse(k).color()).collect();
        assert_eq!(colours.len(), kinds.len());
    }

    #[test]
    fn classify_micmac_variables() {
        assert_eq!(NodeKind::classify("Planificación estratégica"), NodeKind::Server);
        assert_eq!(NodeKind::classify("Herramientas digitales"), NodeKind::Router);
        assert_eq!(NodeKind::classify("Clima laboral"), NodeKind::Workstation);
    }

    #[test]
    fn edge_weight_defaults_to_one() {
        let e: Edge = serde_json::from_str(r#"{"source":"a","target":"b"}"#).unwrap();
        assert_eq!(e.weight, DEFAULT_WEIGHT);
        assert!(e.connects("b", "a"));
        assert!(!e.connects("a", "c"));
    }

    #[test]
    fn only_pinned_nodes_have_fixed_positions() {
        let mut n = Node::new("a", "A").with_position(Point::new(1.0, 2.0));
        assert_eq!(n.fixed_position(), None);
        n.pinned = true;
        assert_eq!(n.fixed_position(), Some(Point::new(1.0, 2.0)));
    }
}
