//! Gated graph neural network encoder.

use crate::config::ModelConfig;
use crate::data::{GraphBatch, GraphTensors};
use crate::ggnn::GatedGraphConv;
use crate::pool::GlobalAttentionPool;
use crate::Result;
use candle_core::Tensor;
use candle_nn::{embedding, Embedding, Module, VarBuilder};
use tracing::debug;

/// Gated graph neural network.
///
/// Embeds node types, runs a [`GatedGraphConv`] for `num_layers` steps and
/// pools to one vector per graph. Edge types are accepted but not used.
pub struct GGNN {
    embed: Embedding,
    conv: GatedGraphConv,
    pool: GlobalAttentionPool,
    config: ModelConfig,
}

impl GGNN {
    pub fn new(config: &ModelConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;
        let dim = config.embedding_dim;
        Ok(Self {
            embed: embedding(config.vocab_size, dim, vb.pp("embed"))?,
            conv: GatedGraphConv::new(dim, config.num_layers, vb.pp("ggnnlayer"))?,
            pool: GlobalAttentionPool::new(dim, vb.pp("pool"))?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Embed one graph: `(1 x D)`.
    pub fn forward(&self, graph: &GraphTensors) -> Result<Tensor> {
        let x = self.node_states(graph)?;
        self.pool.forward(&x, None, 1)
    }

    /// Embed every graph of a batch in one pass: `(num_graphs x D)`.
    pub fn forward_batch(&self, batch: &GraphBatch) -> Result<Tensor> {
        let x = self.node_states(&batch.graphs)?;
        debug!(graphs = batch.num_graphs, nodes = batch.graphs.num_nodes, "ggnn batch encoded");
        self.pool.forward(&x, Some(&batch.batch), batch.num_graphs)
    }

    fn node_states(&self, graph: &GraphTensors) -> Result<Tensor> {
        graph.check(self.config.vocab_size, self.config.edge_vocab_size)?;
        let x = self.embed.forward(&graph.node_ids)?;
        self.conv.forward(&x, &graph.edge_index, None)
    }
}
