use super::format::{Delimiter, GraphDocument};
use crate::error::{GraphError, Result};
use crate::graph::matrix::AdjacencyMatrix;
use crate::graph::types::Snapshot;

/// Serialises the graph as a pretty-printed `{nodes, edges}` JSON document.
pub fn encode_json(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let doc = GraphDocument {
        nodes: snapshot.nodes.clone(),
        edges: snapshot.edges.clone(),
    };
    serde_json::to_vec_pretty(&doc)
        .map_err(|e| GraphError::malformed(format!("export failed: {e}")))
}

/// Writes the 0/1 matrix as delimited text with a header row and a label
/// column, the same shape `decode_matrix` reads back.
pub fn encode_matrix(matrix: &AdjacencyMatrix, delimiter: Delimiter) -> Vec<u8> {
    let d = delimiter.as_char();
    let mut out = String::new();

    for name in &matrix.names {
        out.push(d);
        out.push_str(&quote(name, d));
    }
    out.push('\n');

    for (name, row) in matrix.names.iter().zip(&matrix.matrix) {
        out.push_str(&quote(name, d));
        for cell in row {
            out.push(d);
            out.push_str(&cell.to_string());
        }
        out.push('\n');
    }
    out.into_bytes()
}

fn quote(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
