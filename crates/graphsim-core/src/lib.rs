// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]

//! Graph data types for graph-similarity encoders.
//!
//! This crate holds the tensor-free side of the pipeline:
//!
//! - [`Graph`] - typed nodes, directed edges, optional edge types
//! - [`GraphPair`] - two graphs to compare
//! - [`GraphStats`] - degree summaries
//!
//! Graphs are plain vocabulary ids. Turning them into tensors happens in
//! `graphsim-nn`.
//!
//! # Example
//!
//! ```rust
//! use graphsim_core::{Graph, DEFAULT_EDGE_VOCAB_SIZE};
//!
//! // if-statement AST: If -> Cond, If -> Body
//! let g = Graph::new(vec![4, 11, 2], vec![(0, 1), (0, 2)]);
//! g.validate(16, DEFAULT_EDGE_VOCAB_SIZE).unwrap();
//!
//! let g = g.to_undirected();
//! assert_eq!(g.num_edges(), 4);
//! ```

mod error;
mod graph;
mod pair;

pub use error::{Error, Result};
pub use graph::{Graph, GraphStats};
pub use pair::GraphPair;

/// Number of edge kinds the encoders embed by default.
pub const DEFAULT_EDGE_VOCAB_SIZE: usize = 20;
