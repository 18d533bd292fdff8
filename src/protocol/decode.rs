use log::{debug, warn};

use super::format::{
    Cell, Delimiter, GraphDocument, ImportOptions, ImportedGraph, Row, Table, UTF8_BOM,
    VARIABLE_ID_PREFIX,
};
use crate::error::{GraphError, Result};
use crate::graph::types::{DEFAULT_WEIGHT, Edge, Node, NodeAttributes, NodeKind};

/// Reads delimited text (CSV, semicolon or tab separated) into a `Table`.
///
/// Quoted fields may contain delimiters, doubled quotes and line breaks.
/// Blank lines are skipped.
pub struct Decoder<'a> {
    data: &'a str,
    offset: usize,
    delimiter: Delimiter,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| GraphError::malformed(format!("invalid UTF-8: {e}")))?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(text: &'a str) -> Self {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        Self {
            data: text,
            offset: 0,
            delimiter: Delimiter::detect(first_line),
        }
    }

    pub fn decode_table(&mut self) -> Result<Table> {
        let mut rows = Vec::new();
        while let Some(fields) = self.read_record()? {
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            rows.push(fields.iter().map(|f| Cell::parse(f)).collect());
        }
        debug!("decoded {} rows ({:?})", rows.len(), self.delimiter);
        Ok(Table::new(rows))
    }

    /// Next record, or `None` at end of input.
    fn read_record(&mut self) -> Result<Option<Vec<String>>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }

        let delimiter = self.delimiter.as_char();
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let start = self.offset;
        let data = self.data;
        let mut chars = data[start..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            self.offset = start + i + c.len_utf8();
            if quoted {
                match c {
                    '"' if chars.peek().map(|&(_, n)| n) == Some('"') => {
                        field.push('"');
                        chars.next();
                        self.offset += 1;
                    }
                    '"' => quoted = false,
                    _ => field.push(c),
                }
                continue;
            }
            match c {
                '"' if field.trim().is_empty() => {
                    field.clear();
                    quoted = true;
                }
                '\r' => {}
                '\n' => {
                    fields.push(field);
                    return Ok(Some(fields));
                }
                c if c == delimiter => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }

        if quoted {
            return Err(GraphError::malformed(format!(
                "unterminated quoted field starting in record at byte {start}"
            )));
        }
        self.offset = self.data.len();
        fields.push(field);
        Ok(Some(fields))
    }
}

/// Interprets `table` as a square correlation matrix.
///
/// An optional header row and an optional leading label column carry the
/// variable names. Cells that are not numbers count as 0. Variable `i` gets
/// the id `var_{i}`; a cell at or above `options.threshold` becomes an edge.
pub fn decode_matrix(table: &Table, options: &ImportOptions) -> Result<ImportedGraph> {
    if !options.threshold.is_finite() {
        return Err(GraphError::InvalidConfig {
            reason: format!("import threshold must be finite, got {}", options.threshold),
        });
    }
    if table.is_empty() {
        return Err(GraphError::malformed("matrix is empty"));
    }

    let mut rows: Vec<&Row> = table
        .rows
        .iter()
        .filter(|row| !row.iter().all(Cell::is_empty))
        .collect();
    let header = if is_header(rows[0]) {
        Some(rows.remove(0))
    } else {
        None
    };
    if rows.is_empty() {
        return Err(GraphError::malformed("matrix has a header but no rows"));
    }

    let has_label_column = rows.iter().all(|row| row.first().is_some_and(Cell::is_text))
        || header.is_some_and(|h| h.first().is_some_and(Cell::is_empty));

    let n = rows.len();
    let skip = usize::from(has_label_column);
    let mut values = Vec::with_capacity(n);
    for (i, row) in rows.iter().enumerate() {
        let cells = row.get(skip..).unwrap_or(&[]);
        let width = trimmed_len(cells);
        if width > n || cells.len() < n {
            return Err(GraphError::malformed(format!(
                "matrix is not square: row {} has {} values, expected {n}",
                i + 1,
                if width > n { width } else { cells.len() }
            )));
        }
        let mut parsed = Vec::with_capacity(n);
        for (j, cell) in cells[..n].iter().enumerate() {
            if cell.is_text() {
                warn!("non-numeric matrix cell ({}, {}) read as 0", i + 1, j + 1);
            }
            parsed.push(cell.number_or_zero());
        }
        values.push(parsed);
    }

    let variables = variable_names(header, &rows, has_label_column, n)?;
    let nodes = variables
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Node::new(format!("{VARIABLE_ID_PREFIX}{i}"), name.clone())
                .with_attributes(NodeAttributes::of_kind(NodeKind::classify(name)))
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (forward, backward) = (values[i][j], values[j][i]);
            let keep = if options.directed {
                forward >= options.threshold
            } else {
                // one edge per pair, oriented along the stronger cell
                i < j && forward.max(backward) >= options.threshold
            };
            if !keep {
                continue;
            }
            let (s, t, w) = if options.directed || forward >= backward {
                (i, j, forward)
            } else {
                (j, i, backward)
            };
            edges.push(Edge::weighted(nodes[s].id.clone(), nodes[t].id.clone(), w));
        }
    }

    debug!("matrix import: {n} variables, {} edges", edges.len());
    Ok(ImportedGraph {
        nodes,
        edges,
        matrix: Some(values),
    })
}

/// A header row leads with a name or a blank corner and holds more text than
/// numbers. A stray text cell in a numeric row does not make it a header.
fn is_header(row: &Row) -> bool {
    let leads_with_number = matches!(row.first(), Some(Cell::Number(_)));
    let text = row.iter().filter(|c| c.is_text()).count();
    let numbers = row.iter().filter(|c| matches!(c, Cell::Number(_))).count();
    !leads_with_number && text > numbers
}

/// Length of `cells` without trailing empty cells.
fn trimmed_len(cells: &[Cell]) -> usize {
    cells.iter().rposition(|c| !c.is_empty()).map_or(0, |p| p + 1)
}

fn variable_names(
    header: Option<&Row>,
    rows: &[&Row],
    has_label_column: bool,
    n: usize,
) -> Result<Vec<String>> {
    if let Some(header) = header {
        let skip = usize::from(has_label_column);
        let names: Vec<String> = header
            .iter()
            .skip(skip)
            .take(n)
            .map(|c| c.as_id().unwrap_or_default())
            .collect();
        if names.len() < n || trimmed_len(&header[skip.min(header.len())..]) > n {
            return Err(GraphError::malformed(format!(
                "header names {} variables, matrix has {n}",
                trimmed_len(&header[skip.min(header.len())..])
            )));
        }
        return Ok(fill_blank_names(names));
    }
    if has_label_column {
        let names = rows
            .iter()
            .map(|row| row.first().and_then(Cell::as_id).unwrap_or_default())
            .collect();
        return Ok(fill_blank_names(names));
    }
    Ok((1..=n).map(|i| format!("Variable {i}")).collect())
}

fn fill_blank_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().to_string();
            if name.is_empty() { format!("Variable {}", i + 1) } else { name }
        })
        .collect()
}

/// Interprets `table` as an edge list.
///
/// A header row naming `source` and `target` (and optionally `weight`,
/// `type`) selects columns; without one the columns are source, target,
/// weight. Nodes are created for each distinct endpoint in order of
/// appearance.
pub fn decode_edge_list(table: &Table) -> Result<ImportedGraph> {
    if table.is_empty() {
        return Err(GraphError::malformed("edge list is empty"));
    }

    let mut rows = table.rows.iter().filter(|row| !row.iter().all(Cell::is_empty));
    let first = rows.next().ok_or_else(|| GraphError::malformed("edge list is empty"))?;

    let column = |name: &str| {
        first.iter().position(|c| match c {
            Cell::Text(t) => t.eq_ignore_ascii_case(name),
            _ => false,
        })
    };
    let (columns, data): (Columns, Vec<&Row>) = match (column("source"), column("target")) {
        (Some(source), Some(target)) => (
            Columns {
                source,
                target,
                weight: column("weight"),
                kind: column("type"),
            },
            rows.collect(),
        ),
        _ => (
            Columns {
                source: 0,
                target: 1,
                weight: Some(2),
                kind: None,
            },
            std::iter::once(first).chain(rows).collect(),
        ),
    };
    if data.is_empty() {
        return Err(GraphError::malformed("edge list has a header but no rows"));
    }

    let mut nodes: Vec<Node> = Vec::new();
    let mut edges = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let endpoint = |col: usize, what: &str| {
            row.get(col)
                .and_then(Cell::as_id)
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .ok_or_else(|| GraphError::malformed(format!("row {}: missing {what}", i + 1)))
        };
        let source = endpoint(columns.source, "source")?;
        let target = endpoint(columns.target, "target")?;
        let weight = match columns.weight.and_then(|c| row.get(c)) {
            None | Some(Cell::Empty) => DEFAULT_WEIGHT,
            Some(cell) => cell.number_or_zero(),
        };

        for id in [&source, &target] {
            if !nodes.iter().any(|n| &n.id == id) {
                nodes.push(Node::new(id.clone(), id.clone()));
            }
        }
        let mut edge = Edge::weighted(source, target, weight);
        edge.kind = columns
            .kind
            .and_then(|c| row.get(c))
            .and_then(Cell::as_id)
            .filter(|k| !k.is_empty());
        edges.push(edge);
    }

    debug!("edge list import: {} nodes, {} edges", nodes.len(), edges.len());
    Ok(ImportedGraph {
        nodes,
        edges,
        ..Default::default()
    })
}

struct Columns {
    source: usize,
    target: usize,
    weight: Option<usize>,
    kind: Option<usize>,
}

/// Parses an exported `{nodes, edges}` JSON document.
pub fn decode_json(data: &[u8]) -> Result<ImportedGraph> {
    let doc: GraphDocument = serde_json::from_slice(data)
        .map_err(|e| GraphError::malformed(format!("invalid graph document: {e}")))?;
    Ok(ImportedGraph {
        nodes: doc.nodes,
        edges: doc.edges,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        Decoder::from_text(text).decode_table().unwrap()
    }

    #[test]
    fn decodes_quoted_fields_and_blank_lines() {
        let t = table("name,value\r\n\"a, b\",1\n\n\"say \"\"hi\"\"\",2\n");
        assert_eq!(
            t.rows,
            vec![
                vec![Cell::Text("name".into()), Cell::Text("value".into())],
                vec![Cell::Text("a, b".into()), Cell::Number(1.0)],
                vec![Cell::Text("say \"hi\"".into()), Cell::Number(2.0)],
            ]
        );
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let err = Decoder::from_text("a,\"b\n").decode_table();
        assert!(matches!(err, Err(GraphError::MalformedImport { .. })));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert!(matches!(
            Decoder::new(&[0xff, 0xfe, 0x00]),
            Err(GraphError::MalformedImport { .. })
        ));
    }

    #[test]
    fn threshold_keeps_one_edge_per_pair() {
        let t = Table::from_numbers(&[
            vec![0.0, 3.0, 1.0],
            vec![3.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0],
        ]);
        let g = decode_matrix(&t, &ImportOptions::default()).unwrap();

        let labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Variable 1", "Variable 2", "Variable 3"]);
        assert_eq!(g.edges, vec![Edge::weighted("var_0", "var_1", 3.0)]);
    }

    #[test]
    fn directed_import_keeps_both_directions() {
        let t = Table::from_numbers(&[
            vec![0.0, 3.0, 1.0],
            vec![3.0, 0.0, 0.0],
            vec![2.0, 0.0, 0.0],
        ]);
        let options = ImportOptions {
            directed: true,
            ..Default::default()
        };
        let g = decode_matrix(&t, &options).unwrap();
        assert_eq!(
            g.edges,
            vec![
                Edge::weighted("var_0", "var_1", 3.0),
                Edge::weighted("var_1", "var_0", 3.0),
                Edge::weighted("var_2", "var_0", 2.0),
            ]
        );
    }

    #[test]
    fn undirected_import_follows_stronger_cell() {
        let t = Table::from_numbers(&[vec![0.0, 1.0], vec![4.0, 0.0]]);
        let g = decode_matrix(&t, &ImportOptions::default()).unwrap();
        assert_eq!(g.edges, vec![Edge::weighted("var_1", "var_0", 4.0)]);
    }

    #[test]
    fn header_and_label_column_name_variables() {
        let t = table(
            ";Planificación estratégica;Herramientas digitales;Clima\n\
             Planificación estratégica;0;2;x\n\
             Herramientas digitales;0;0;0\n\
             Clima;1;0;0\n",
        );
        let g = decode_matrix(&t, &ImportOptions::default()).unwrap();
        assert_eq!(g.nodes[0].label, "Planificación estratégica");
        assert_eq!(g.nodes[0].attributes.kind, NodeKind::Server);
        assert_eq!(g.nodes[1].attributes.kind, NodeKind::Router);
        assert_eq!(g.nodes[2].attributes.kind, NodeKind::Workstation);
        // "x" reads as 0
        assert_eq!(g.matrix.as_ref().unwrap()[0][2], 0.0);
        assert_eq!(g.edges, vec![Edge::weighted("var_0", "var_1", 2.0)]);
    }

    #[test]
    fn stray_text_in_first_row_reads_as_zero() {
        let g = decode_matrix(&table("0,x,1\n3,0,0\n1,0,0\n"), &ImportOptions::default()).unwrap();
        assert_eq!(g.nodes.len(), 3);
        assert_eq!(g.nodes[0].label, "Variable 1");
        let matrix = g.matrix.unwrap();
        assert_eq!(matrix[0], vec![0.0, 0.0, 1.0]);
        assert_eq!(g.edges, vec![Edge::weighted("var_1", "var_0", 3.0)]);
    }

    #[test]
    fn label_column_without_header_row() {
        let g = decode_matrix(&table("A,0,3\nB,3,0\n"), &ImportOptions::default()).unwrap();
        let labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(g.edges, vec![Edge::weighted("var_0", "var_1", 3.0)]);
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let t = table("0,1,2\n1,0,2\n");
        assert!(matches!(
            decode_matrix(&t, &ImportOptions::default()),
            Err(GraphError::MalformedImport { .. })
        ));
        let short = table("0,1\n1\n");
        assert!(decode_matrix(&short, &ImportOptions::default()).is_err());
        assert!(decode_matrix(&Table::default(), &ImportOptions::default()).is_err());
    }

    #[test]
    fn trailing_empty_cells_are_ignored() {
        let t = table("0,5,,\n5,0,,\n");
        let g = decode_matrix(&t, &ImportOptions::default()).unwrap();
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn edge_list_with_header() {
        let t = table("Target,Source,Weight,Type\nb,a,2,uplink\nc,b,,\n");
        let g = decode_edge_list(&t).unwrap();
        let ids: Vec<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(g.edges[0].source, "a");
        assert_eq!(g.edges[0].weight, 2.0);
        assert_eq!(g.edges[0].kind.as_deref(), Some("uplink"));
        assert_eq!(g.edges[1].weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn edge_list_without_header_and_missing_target() {
        let g = decode_edge_list(&table("1,2,0.5\n2,3\n")).unwrap();
        assert_eq!(g.edges[0], Edge::weighted("1", "2", 0.5));
        assert_eq!(g.nodes.len(), 3);

        let err = decode_edge_list(&table("source,target\na,\n"));
        assert!(matches!(err, Err(GraphError::MalformedImport { .. })));
    }

    #[test]
    fn json_document_requires_both_arrays() {
        let g = decode_json(br#"{"nodes":[{"id":"a","label":"A","kind":"router"}],"edges":[]}"#)
            .unwrap();
        assert_eq!(g.nodes[0].attributes.kind, NodeKind::Router);
        assert!(matches!(
            decode_json(br#"{"nodes":[]}"#),
            Err(GraphError::MalformedImport { .. })
        ));
    }
}
