pub mod decode;
pub mod encode;
pub mod format;

pub use decode::{decode_edge_list, decode_json, decode_matrix, Decoder};
pub use encode::{encode_json, encode_matrix};
pub use format::{Cell, Delimiter, GraphDocument, ImportOptions, ImportedGraph, Table};
