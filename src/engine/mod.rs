//! Command surface for the UI layer.
//!
//! A `NetworkGraph` owns the store and hands out read-only snapshots, matrices,
//! positions and algorithm results. Every user gesture maps to one method here;
//! there are no callbacks or subscriptions.

use std::collections::HashMap;

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::algorithms::{self, Degree, ShortestPath, Strength};
use crate::graph::matrix::{AdjacencyMatrix, AdjacencyMatrixView, MatrixMode};
use crate::graph::sample;
use crate::graph::spatial::Quadtree;
use crate::graph::store::{GraphStore, ReplaceReport, Toggle};
use crate::graph::types::{EdgeStatus, Node, NodeAttributes, Point, Snapshot};
use crate::layout::{self, Positions, Strategy};
use crate::protocol::{self, Decoder, Delimiter, ImportedGraph, Table};

pub mod simulation;

const PAGERANK_ITERATIONS: usize = 50;
const PAGERANK_DAMPING: f64 = 0.85;
const QUADTREE_CAPACITY: usize = 8;

/// Whole-graph summary numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub average_degree: f64,
    pub communities: usize,
}

/// Raw matrix of the last matrix import, kept for MICMAC scoring.
struct ImportedMatrix {
    ids: Vec<String>,
    values: Vec<Vec<f64>>,
}

pub struct NetworkGraph {
    store: GraphStore,
    matrix: AdjacencyMatrixView,
    imported: Option<ImportedMatrix>,
    config: EngineConfig,
    rng: StdRng,
}

impl NetworkGraph {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: GraphStore::new(),
            matrix: AdjacencyMatrixView::new(config.matrix_mode),
            imported: None,
            rng: StdRng::seed_from_u64(config.simulation.seed),
            config,
        })
    }

    /// Engine pre-seeded with the configured sample network.
    pub fn with_sample(config: EngineConfig) -> Result<Self> {
        let mut graph = Self::new(config)?;
        graph.regenerate()?;
        Ok(graph)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Snapshot whose nodes carry fresh influence/dependence metrics.
    pub fn snapshot_with_metrics(&self) -> Snapshot {
        let mut snapshot = self.store.snapshot();
        algorithms::annotate_metrics(&mut snapshot.nodes, &snapshot.edges);
        snapshot
    }

    // mutations

    pub fn add_node(
        &mut self,
        id: Option<&str>,
        label: &str,
        attributes: NodeAttributes,
    ) -> Result<Node> {
        self.store.add_node(id, label, attributes)
    }

    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        self.store.remove_node(id)
    }

    pub fn toggle_edge(&mut self, a: &str, b: &str) -> Result<Toggle> {
        self.store.toggle_edge(a, b)
    }

    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Result<()> {
        self.store.add_edge(source, target, weight)
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<()> {
        self.store.remove_edge(source, target).map(|_| ())
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<Option<Toggle>> {
        self.matrix.toggle_cell(&mut self.store, row, col)
    }

    pub fn pin_node(&mut self, id: &str, position: Point) -> Result<()> {
        self.store.pin_node(id, position)
    }

    pub fn unpin_node(&mut self, id: &str) -> Result<()> {
        self.store.unpin_node(id)
    }

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.matrix = AdjacencyMatrixView::new(mode);
        self.config.matrix_mode = mode;
    }

    // derived views

    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        self.matrix.compute(self.store.nodes(), self.store.edges())
    }

    /// Computes a layout and stores the positions on the nodes.
    pub fn run_layout(&mut self, strategy: Strategy) -> Result<Positions> {
        let positions = layout::layout(
            self.store.nodes(),
            self.store.edges(),
            strategy,
            self.config.layout.bounds(),
            &self.config.layout,
        );
        self.store.set_positions(&positions)?;
        self.config.strategy = strategy;
        Ok(positions)
    }

    /// Node positions packed as `[x0, y0, x1, y1, ...]` in node order.
    /// Nodes without a position read as the origin.
    pub fn position_buffer(&self) -> Vec<f32> {
        let points: Vec<Point> = self
            .store
            .nodes()
            .iter()
            .map(|n| n.position.unwrap_or_default())
            .collect();
        bytemuck::cast_slice::<Point, f32>(&points).to_vec()
    }

    /// The node drawn closest to `(x, y)`, if any lies within `radius`.
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<&Node> {
        let tree = Quadtree::build(
            self.store
                .nodes()
                .iter()
                .enumerate()
                .filter_map(|(i, n)| n.position.map(|p| (i, p))),
            QUADTREE_CAPACITY,
        )?;
        let index = tree.nearest(x, y, radius)?;
        self.store.nodes().get(index)
    }

    pub fn shortest_path(&self, start: &str, end: &str) -> Option<ShortestPath> {
        algorithms::shortest_path(self.store.nodes(), self.store.edges(), start, end)
    }

    pub fn centrality(&self) -> HashMap<String, Degree> {
        algorithms::centrality(self.store.nodes(), self.store.edges())
    }

    /// Weighted in/out sums per node.
    pub fn strength(&self) -> HashMap<String, Strength> {
        algorithms::strength(self.store.nodes(), self.store.edges())
    }

    /// Motricity (`outgoing`) and dependence (`incoming`) of each variable
    /// over the full matrix of the last matrix import, before thresholding.
    /// `None` unless the current graph came from a matrix. Variables whose
    /// node has since been removed are left out.
    pub fn micmac_scores(&self) -> Option<HashMap<String, Strength>> {
        let imported = self.imported.as_ref()?;
        let mut scores = algorithms::matrix_strength(&imported.ids, &imported.values);
        scores.retain(|id, _| self.store.contains(id));
        Some(scores)
    }

    pub fn communities(&self) -> HashMap<String, usize> {
        algorithms::detect_communities(self.store.nodes(), self.store.edges())
    }

    /// PageRank scores keyed by node id.
    pub fn pagerank(&self) -> HashMap<String, f64> {
        let scores = algorithms::pagerank(
            self.store.nodes(),
            self.store.edges(),
            PAGERANK_ITERATIONS,
            PAGERANK_DAMPING,
        );
        self.store
            .nodes()
            .iter()
            .map(|n| n.id.clone())
            .zip(scores)
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let (nodes, edges) = (self.store.nodes(), self.store.edges());
        let communities = self.communities().into_values().max().map_or(0, |m| m + 1);
        GraphStats {
            nodes: nodes.len(),
            edges: edges.len(),
            density: algorithms::density(nodes, edges),
            average_degree: algorithms::average_degree(nodes, edges),
            communities,
        }
    }

    /// Display status per edge, in edge order.
    pub fn edge_statuses(&self) -> Vec<EdgeStatus> {
        let nodes = self.store.nodes();
        self.store
            .edges()
            .iter()
            .map(|e| algorithms::edge_status(e, nodes, self.config.simulation.degraded_below))
            .collect()
    }

    // simulation and bulk replacement

    /// One step of the cosmetic failure simulation.
    pub fn tick(&mut self) -> Result<()> {
        let next = simulation::tick(self.store.nodes(), &self.config.simulation, &mut self.rng);
        self.store.replace_nodes(next)
    }

    /// Throws the current graph away and builds the configured sample.
    pub fn regenerate(&mut self) -> Result<ReplaceReport> {
        let (nodes, edges) = sample::generate(&self.config.sample);
        self.apply(ImportedGraph {
            nodes,
            edges,
            ..Default::default()
        })
    }

    /// Imports a correlation matrix from delimited text.
    pub fn import_matrix(&mut self, data: &[u8]) -> Result<ReplaceReport> {
        let table = Decoder::new(data)?.decode_table()?;
        self.import_matrix_table(&table)
    }

    /// Imports a correlation matrix already split into cells, e.g. by a
    /// spreadsheet reader.
    pub fn import_matrix_table(&mut self, table: &Table) -> Result<ReplaceReport> {
        let imported = protocol::decode_matrix(table, &self.config.import)?;
        self.apply(imported)
    }

    pub fn import_edge_list(&mut self, data: &[u8]) -> Result<ReplaceReport> {
        let table = Decoder::new(data)?.decode_table()?;
        let imported = protocol::decode_edge_list(&table)?;
        self.apply(imported)
    }

    pub fn import_json(&mut self, data: &[u8]) -> Result<ReplaceReport> {
        let imported = protocol::decode_json(data)?;
        self.apply(imported)
    }

    fn apply(&mut self, imported: ImportedGraph) -> Result<ReplaceReport> {
        let matrix = imported.matrix.map(|values| ImportedMatrix {
            ids: imported.nodes.iter().map(|n| n.id.clone()).collect(),
            values,
        });
        let report = self.store.replace_all(imported.nodes, imported.edges)?;
        self.imported = matrix;
        if self.store.nodes().iter().any(|n| n.position.is_none()) {
            self.run_layout(self.config.strategy)?;
        }
        info!(
            "loaded graph with {} nodes and {} edges",
            report.nodes, report.edges
        );
        Ok(report)
    }

    pub fn export_json(&self) -> Result<Vec<u8>> {
        protocol::encode_json(&self.snapshot_with_metrics())
    }

    pub fn export_matrix(&self, delimiter: Delimiter) -> Vec<u8> {
        protocol::encode_matrix(&self.adjacency_matrix(), delimiter)
    }
}
