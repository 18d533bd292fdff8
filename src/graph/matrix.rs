use serde::{Deserialize, Serialize};

use super::store::{GraphStore, Toggle};
use super::types::{Edge, Node};
use crate::error::{GraphError, Result};

/// How edges map onto matrix cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixMode {
    /// `m[i][j] = 1` only for an edge `i -> j`.
    #[default]
    Directed,
    /// Every edge also marks the mirrored cell.
    Symmetric,
}

/// Adjacency matrix derived from a node/edge snapshot, indexed by node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    pub matrix: Vec<Vec<u8>>,
    pub names: Vec<String>,
    /// Edge weights in the same layout, 0.0 where there is no edge.
    pub weights: Vec<Vec<f64>>,
}

impl AdjacencyMatrix {
    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.matrix.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Row sums of the weight matrix (weighted out-strength per node).
    pub fn row_sums(&self) -> Vec<f64> {
        self.weights.iter().map(|r| r.iter().sum()).collect()
    }

    /// Column sums of the weight matrix (weighted in-strength per node).
    pub fn col_sums(&self) -> Vec<f64> {
        let n = self.size();
        (0..n)
            .map(|j| self.weights.iter().map(|r| r[j]).sum())
            .collect()
    }
}

/// Read-side view over a `GraphStore`. It holds no matrix state of its own:
/// every call recomputes from the current nodes and edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyMatrixView {
    mode: MatrixMode,
}

impl AdjacencyMatrixView {
    pub fn new(mode: MatrixMode) -> Self {
        Self { mode }
    }

    pub fn compute(&self, nodes: &[Node], edges: &[Edge]) -> AdjacencyMatrix {
        compute(nodes, edges, self.mode)
    }

    /// Translates a cell click into `GraphStore::toggle_edge`. The diagonal is
    /// a no-op and returns `None`.
    pub fn toggle_cell(
        &self,
        store: &mut GraphStore,
        row: usize,
        col: usize,
    ) -> Result<Option<Toggle>> {
        let size = store.node_count();
        if row >= size || col >= size {
            return Err(GraphError::IndexOutOfRange { row, col, size });
        }
        if row == col {
            return Ok(None);
        }
        let a = store.nodes()[row].id.clone();
        let b = store.nodes()[col].id.clone();
        store.toggle_edge(&a, &b).map(Some)
    }
}

pub fn compute(nodes: &[Node], edges: &[Edge], mode: MatrixMode) -> AdjacencyMatrix {
    let n = nodes.len();
    let index: std::collections::HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut matrix = vec![vec![0u8; n]; n];
    let mut weights = vec![vec![0.0; n]; n];

    for edge in edges {
        let (Some(&i), Some(&j)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if i == j {
            continue;
        }
        matrix[i][j] = 1;
        weights[i][j] = edge.weight;
        if mode == MatrixMode::Symmetric {
            matrix[j][i] = 1;
            if weights[j][i] == 0.0 {
                weights[j][i] = edge.weight;
            }
        }
    }

    AdjacencyMatrix {
        matrix,
        names: nodes.iter().map(|node| node.label.clone()).collect(),
        weights,
    }
}
