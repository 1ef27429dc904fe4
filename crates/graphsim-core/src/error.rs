//! Error types for graphsim-core.

use thiserror::Error;

/// Error type for graph construction and validation.
#[derive(Error, Debug)]
pub enum Error {
    /// Graph has no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// Node type id is outside the vocabulary.
    #[error("node {node} has type {node_type}, vocabulary size is {vocab_size}")]
    NodeTypeOutOfRange {
        node: usize,
        node_type: u32,
        vocab_size: usize,
    },

    /// Edge endpoint does not address an existing node.
    #[error("edge {edge} ({src} -> {dst}) references a node outside 0..{num_nodes}")]
    EdgeEndpointOutOfRange {
        edge: usize,
        src: u32,
        dst: u32,
        num_nodes: usize,
    },

    /// Edge type list length differs from edge count.
    #[error("expected {edges} edge types, got {types}")]
    EdgeTypeCountMismatch { edges: usize, types: usize },

    /// Edge type id is outside the edge vocabulary.
    #[error("edge {edge} has type {edge_type}, edge vocabulary size is {vocab_size}")]
    EdgeTypeOutOfRange {
        edge: usize,
        edge_type: u32,
        vocab_size: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
