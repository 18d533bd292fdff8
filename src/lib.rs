use wasm_bindgen::prelude::*;

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod layout;
pub mod protocol;

pub use config::EngineConfig;
pub use engine::NetworkGraph;
pub use error::{GraphError, Result};
pub use graph::{Edge, GraphStore, Node, Point, Snapshot};

/// JavaScript handle over a `NetworkGraph`.
///
/// Structured results cross the boundary as JSON strings; positions go out as
/// a `Float32Array`.
#[wasm_bindgen]
pub struct NetgraphEngine {
    graph: NetworkGraph,
}

type JsResult<T> = std::result::Result<T, JsError>;

fn to_json<T: serde::Serialize>(value: &T) -> JsResult<String> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

#[wasm_bindgen]
impl NetgraphEngine {
    /// `config` is an optional JSON `EngineConfig`; the engine starts with
    /// the configured sample network.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> JsResult<NetgraphEngine> {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Netgraph engine initializing");
        let config = match config {
            Some(text) => EngineConfig::from_json(&text)?,
            None => EngineConfig::default(),
        };
        Ok(NetgraphEngine {
            graph: NetworkGraph::with_sample(config)?,
        })
    }

    /// Returns the id of the new node.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(
        &mut self,
        id: Option<String>,
        label: &str,
        kind: Option<String>,
    ) -> JsResult<String> {
        let attributes = graph::NodeAttributes::of_kind(
            kind.as_deref().map(graph::NodeKind::parse).unwrap_or_default(),
        );
        Ok(self.graph.add_node(id.as_deref(), label, attributes)?.id)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> JsResult<()> {
        self.graph.remove_node(id)?;
        Ok(())
    }

    /// `true` when the toggle added an edge.
    #[wasm_bindgen(js_name = toggleEdge)]
    pub fn toggle_edge(&mut self, a: &str, b: &str) -> JsResult<bool> {
        Ok(self.graph.toggle_edge(a, b)? == graph::Toggle::Added)
    }

    #[wasm_bindgen(js_name = toggleCell)]
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> JsResult<()> {
        self.graph.toggle_cell(row, col)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, id: &str, x: f32, y: f32) -> JsResult<()> {
        Ok(self.graph.pin_node(id, Point::new(x, y))?)
    }

    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, id: &str) -> JsResult<()> {
        Ok(self.graph.unpin_node(id)?)
    }

    /// `strategy` is `force`, `circular` or `hierarchical`.
    pub fn layout(&mut self, strategy: &str) -> JsResult<()> {
        let strategy: layout::Strategy = strategy.parse()?;
        self.graph.run_layout(strategy)?;
        Ok(())
    }

    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.graph.position_buffer().as_slice())
    }

    /// Id of the node under the pointer, if any.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<String> {
        self.graph.node_at(x, y, radius).map(|n| n.id.clone())
    }

    pub fn snapshot(&self) -> JsResult<String> {
        to_json(&self.graph.snapshot_with_metrics())
    }

    pub fn matrix(&self) -> JsResult<String> {
        to_json(&self.graph.adjacency_matrix())
    }

    #[wasm_bindgen(js_name = setSymmetric)]
    pub fn set_symmetric(&mut self, symmetric: bool) {
        let mode = if symmetric {
            graph::MatrixMode::Symmetric
        } else {
            graph::MatrixMode::Directed
        };
        self.graph.set_matrix_mode(mode);
    }

    /// JSON `{path, total_weight}`, or `undefined` when there is no path.
    #[wasm_bindgen(js_name = shortestPath)]
    pub fn shortest_path(&self, start: &str, end: &str) -> JsResult<Option<String>> {
        self.graph
            .shortest_path(start, end)
            .map(|p| to_json(&p))
            .transpose()
    }

    /// JSON map of id to `{incoming, outgoing}` row/column sums of the last
    /// imported matrix, or `undefined` when the graph did not come from one.
    #[wasm_bindgen(js_name = micmacScores)]
    pub fn micmac_scores(&self) -> JsResult<Option<String>> {
        self.graph.micmac_scores().map(|s| to_json(&s)).transpose()
    }

    pub fn communities(&self) -> JsResult<String> {
        to_json(&self.graph.communities())
    }

    pub fn centrality(&self) -> JsResult<String> {
        to_json(&self.graph.centrality())
    }

    pub fn stats(&self) -> JsResult<String> {
        to_json(&self.graph.stats())
    }

    /// Advances the cosmetic simulation; returns the edge statuses as JSON.
    pub fn tick(&mut self) -> JsResult<String> {
        self.graph.tick()?;
        to_json(&self.graph.edge_statuses())
    }

    pub fn regenerate(&mut self) -> JsResult<()> {
        self.graph.regenerate()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = importMatrix)]
    pub fn import_matrix(&mut self, data: &[u8]) -> JsResult<()> {
        self.graph.import_matrix(data)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = importEdgeList)]
    pub fn import_edge_list(&mut self, data: &[u8]) -> JsResult<()> {
        self.graph.import_edge_list(data)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, data: &[u8]) -> JsResult<()> {
        self.graph.import_json(data)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> JsResult<Vec<u8>> {
        Ok(self.graph.export_json()?)
    }

    /// Fill colour for a node kind such as `router`; unknown kinds share the
    /// fallback colour.
    #[wasm_bindgen(js_name = kindColor)]
    pub fn kind_color(kind: &str) -> String {
        graph::NodeKind::parse(kind).color().to_string()
    }

    #[wasm_bindgen(js_name = exportMatrix)]
    pub fn export_matrix(&self) -> Vec<u8> {
        self.graph.export_matrix(protocol::Delimiter::Comma)
    }
}
