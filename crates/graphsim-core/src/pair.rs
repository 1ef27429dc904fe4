use crate::{Graph, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Two graphs to be compared, e.g. a candidate code-clone pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPair {
    pub left: Graph,
    pub right: Graph,
}

impl GraphPair {
    pub fn new(left: Graph, right: Graph) -> Self {
        Self { left, right }
    }

    /// Validate both sides against the same vocabularies.
    pub fn validate(&self, vocab_size: usize, edge_vocab_size: usize) -> Result<()> {
        self.left.validate(vocab_size, edge_vocab_size)?;
        self.right.validate(vocab_size, edge_vocab_size)
    }

    /// Load from a JSON file of the form `{"left": {...}, "right": {...}}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
