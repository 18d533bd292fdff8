#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("node id already exists: {id}")]
    DuplicateId { id: String },

    #[error("node label must not be blank")]
    EmptyLabel,

    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    #[error("self loops are not allowed: {id}")]
    SelfLoop { id: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("edge already exists: {from} -> {to}")]
    DuplicateEdge { from: String, to: String },

    #[error("edge weight must be finite and non-negative, got {weight}")]
    InvalidWeight { weight: f64 },

    #[error("matrix cell ({row}, {col}) is outside a {size}x{size} matrix")]
    IndexOutOfRange { row: usize, col: usize, size: usize },

    #[error("malformed import: {reason}")]
    MalformedImport { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl GraphError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GraphError::MalformedImport {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(id: &str) -> Self {
        GraphError::UnknownNode { id: id.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
