//! Graph encoders.
//!
//! | Model | Pair interaction | Node update | Readout |
//! |-------|------------------|-------------|---------|
//! | [`GMNNet`] | cross-graph attention every round | GRU([m \|\| u], h) | gated attention |
//! | [`GGNN`] | none (graphs encoded independently) | GRU(m, h) | gated attention |
//!
//! Both implement [`PairEncoder`], so similarity code can be written once.

mod ggnn_net;
mod gmn_net;

pub use ggnn_net::GGNN;
pub use gmn_net::GMNNet;

use crate::config::{ModelConfig, ModelKind};
use crate::data::GraphTensors;
use crate::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;

/// Encode two graphs to `(1 x D)` embeddings each.
pub trait PairEncoder {
    fn encode_pair(&self, left: &GraphTensors, right: &GraphTensors) -> Result<(Tensor, Tensor)>;
}

impl PairEncoder for GMNNet {
    fn encode_pair(&self, left: &GraphTensors, right: &GraphTensors) -> Result<(Tensor, Tensor)> {
        self.forward(left, right)
    }
}

impl PairEncoder for GGNN {
    fn encode_pair(&self, left: &GraphTensors, right: &GraphTensors) -> Result<(Tensor, Tensor)> {
        Ok((self.forward(left)?, self.forward(right)?))
    }
}

/// Either encoder, chosen by [`ModelConfig::kind`].
pub enum GraphSimModel {
    Gmn(GMNNet),
    Ggnn(GGNN),
}

impl GraphSimModel {
    pub fn new(config: &ModelConfig, vb: VarBuilder) -> Result<Self> {
        Ok(match config.kind {
            ModelKind::Gmn => Self::Gmn(GMNNet::new(config, vb)?),
            ModelKind::Ggnn => Self::Ggnn(GGNN::new(config, vb)?),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        match self {
            Self::Gmn(m) => m.config(),
            Self::Ggnn(m) => m.config(),
        }
    }

    /// Embed a single graph.
    ///
    /// A GMN needs a partner, so the graph is matched against itself.
    pub fn encode(&self, graph: &GraphTensors) -> Result<Tensor> {
        match self {
            Self::Gmn(m) => Ok(m.forward(graph, graph)?.0),
            Self::Ggnn(m) => m.forward(graph),
        }
    }
}

impl PairEncoder for GraphSimModel {
    fn encode_pair(&self, left: &GraphTensors, right: &GraphTensors) -> Result<(Tensor, Tensor)> {
        match self {
            Self::Gmn(m) => m.encode_pair(left, right),
            Self::Ggnn(m) => m.encode_pair(left, right),
        }
    }
}
