//! Model configuration.

use crate::{Error, Result};
use graphsim_core::DEFAULT_EDGE_VOCAB_SIZE;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Which encoder architecture to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Graph matching network: cross-graph attention between the pair.
    Gmn,
    /// Gated graph neural network: each graph encoded on its own.
    Ggnn,
}

/// Encoder hyperparameters.
///
/// Missing fields fall back to [`Default`] when deserialized, so a config
/// file only needs the keys it changes:
///
/// ```rust
/// use graphsim_nn::{ModelConfig, ModelKind};
///
/// let config: ModelConfig = serde_json::from_str(r#"{"kind": "ggnn", "vocab_size": 300}"#).unwrap();
/// assert_eq!(config.kind, ModelKind::Ggnn);
/// assert_eq!(config.embedding_dim, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Architecture.
    pub kind: ModelKind,
    /// Number of distinct node types.
    pub vocab_size: usize,
    /// Node state and embedding width.
    pub embedding_dim: usize,
    /// Message-passing rounds (GMN) or gated propagation steps (GGNN).
    pub num_layers: usize,
    /// Number of distinct edge types.
    pub edge_vocab_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Gmn,
            vocab_size: 256,
            embedding_dim: 100,
            num_layers: 4,
            edge_vocab_size: DEFAULT_EDGE_VOCAB_SIZE,
        }
    }
}

impl ModelConfig {
    /// Reject zero-sized dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(Error::InvalidConfig("vocab_size must be positive".into()));
        }
        if self.embedding_dim == 0 {
            return Err(Error::InvalidConfig("embedding_dim must be positive".into()));
        }
        if self.num_layers == 0 {
            return Err(Error::InvalidConfig("num_layers must be positive".into()));
        }
        if self.edge_vocab_size == 0 {
            return Err(Error::InvalidConfig(
                "edge_vocab_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
