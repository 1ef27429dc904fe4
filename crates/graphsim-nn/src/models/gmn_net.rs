//! Graph matching network over a pair of graphs.

use crate::config::ModelConfig;
use crate::data::GraphTensors;
use crate::gmn::GMNLayer;
use crate::pool::GlobalAttentionPool;
use crate::Result;
use candle_core::Tensor;
use candle_nn::{embedding, Embedding, Module, VarBuilder};
use tracing::{debug, trace};

/// Graph matching network.
///
/// Embeds node types (and edge types, when both graphs have them), runs one
/// shared [`GMNLayer`] for `num_layers` rounds so the graphs attend to each
/// other, then pools each graph to a single vector.
pub struct GMNNet {
    embed: Embedding,
    edge_embed: Embedding,
    layer: GMNLayer,
    pool: GlobalAttentionPool,
    config: ModelConfig,
}

impl GMNNet {
    pub fn new(config: &ModelConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;
        let dim = config.embedding_dim;
        Ok(Self {
            embed: embedding(config.vocab_size, dim, vb.pp("embed"))?,
            edge_embed: embedding(config.edge_vocab_size, dim, vb.pp("edge_embed"))?,
            layer: GMNLayer::new(dim, dim, vb.pp("gmnlayer"))?,
            pool: GlobalAttentionPool::new(dim, vb.pp("pool"))?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Embed a graph pair: `((1 x D), (1 x D))`.
    pub fn forward(&self, g1: &GraphTensors, g2: &GraphTensors) -> Result<(Tensor, Tensor)> {
        g1.check(self.config.vocab_size, self.config.edge_vocab_size)?;
        g2.check(self.config.vocab_size, self.config.edge_vocab_size)?;

        let mut x1 = self.embed.forward(&g1.node_ids)?;
        let mut x2 = self.embed.forward(&g2.node_ids)?;

        let (w1, w2) = if g1.edge_types.is_some() && g2.edge_types.is_some() {
            (self.embed_edges(g1)?, self.embed_edges(g2)?)
        } else {
            (None, None)
        };

        for round in 0..self.config.num_layers {
            (x1, x2) = self.layer.forward(
                &x1,
                &x2,
                &g1.edge_index,
                &g2.edge_index,
                w1.as_ref(),
                w2.as_ref(),
            )?;
            trace!(round, "gmn round");
        }
        debug!(
            rounds = self.config.num_layers,
            left_nodes = g1.num_nodes,
            right_nodes = g2.num_nodes,
            "gmn pair encoded"
        );

        let hg1 = self.pool.forward(&x1, None, 1)?;
        let hg2 = self.pool.forward(&x2, None, 1)?;
        Ok((hg1, hg2))
    }

    fn embed_edges(&self, g: &GraphTensors) -> Result<Option<Tensor>> {
        match &g.edge_types {
            Some(types) if g.num_edges > 0 => Ok(Some(self.edge_embed.forward(types)?)),
            _ => Ok(None),
        }
    }
}
