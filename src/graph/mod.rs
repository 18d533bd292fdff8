pub mod algorithms;
pub mod matrix;
pub mod sample;
pub mod spatial;
pub mod store;
pub mod types;

pub use matrix::{AdjacencyMatrix, AdjacencyMatrixView, MatrixMode};
pub use store::{GraphStore, ReplaceReport, Toggle};
pub use types::{
    Edge, EdgeStatus, Node, NodeAttributes, NodeKind, NodeMetrics, NodeStatus, Point, Snapshot,
};
