use serde::{Deserialize, Serialize};

use crate::graph::types::{Edge, Node};

/// Prefix of generated variable ids in matrix imports: `var_0`, `var_1`, ...
pub const VARIABLE_ID_PREFIX: &str = "var_";

/// Correlation strength at or above which a matrix cell becomes an edge.
pub const DEFAULT_THRESHOLD: f64 = 2.0;

pub const UTF8_BOM: &str = "\u{feff}";

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            Cell::Empty
        } else if let Ok(v) = s.parse::<f64>() {
            Cell::Number(v)
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// Numeric value; anything non-numeric counts as 0.
    pub fn number_or_zero(&self) -> f64 {
        match self {
            Cell::Number(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Cell rendered as an identifier: text as-is, integral numbers without
    /// a fractional part.
    pub fn as_id(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{}", *v as i64)),
            Cell::Number(v) => Some(v.to_string()),
        }
    }
}

pub type Row = Vec<Cell>;

/// Rows of cells, as read from a sheet or delimited text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Builds a purely numeric table, e.g. from an in-memory matrix.
    pub fn from_numbers(values: &[Vec<f64>]) -> Self {
        Self::new(
            values
                .iter()
                .map(|row| row.iter().map(|&v| Cell::Number(v)).collect())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Cell::is_empty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }

    /// Picks the delimiter occurring most often in `line`, outside quotes.
    /// Comma wins ties and empty lines.
    pub fn detect(line: &str) -> Self {
        let mut counts = [0usize; 3];
        let mut quoted = false;
        for c in line.chars() {
            match c {
                '"' => quoted = !quoted,
                ',' if !quoted => counts[0] += 1,
                ';' if !quoted => counts[1] += 1,
                '\t' if !quoted => counts[2] += 1,
                _ => {}
            }
        }
        let candidates = [Delimiter::Comma, Delimiter::Semicolon, Delimiter::Tab];
        let mut best = 0;
        for i in 1..3 {
            if counts[i] > counts[best] {
                best = i;
            }
        }
        candidates[best]
    }
}

/// How a correlation matrix turns into edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub threshold: f64,
    /// `false`: one edge per unordered pair whose stronger cell passes.
    /// `true`: one edge per ordered pair whose cell passes.
    pub directed: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            directed: false,
        }
    }
}

/// Validated import result, ready for `GraphStore::replace_all`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Numeric matrix as read, before thresholding.
    pub matrix: Option<Vec<Vec<f64>>>,
}

/// The `{nodes, edges}` export document. Both arrays are required on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_by_content() {
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse(" 2.5 "), Cell::Number(2.5));
        assert_eq!(Cell::parse("high"), Cell::Text("high".into()));
        assert_eq!(Cell::parse("high").number_or_zero(), 0.0);
        assert_eq!(Cell::Number(3.0).as_id().as_deref(), Some("3"));
    }

    #[test]
    fn detects_delimiters() {
        assert_eq!(Delimiter::detect("a;b;c"), Delimiter::Semicolon);
        assert_eq!(Delimiter::detect("a\tb"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("\"x;y;z\",b"), Delimiter::Comma);
        assert_eq!(Delimiter::detect(""), Delimiter::Comma);
    }
}
