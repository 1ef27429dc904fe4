//! Graph matching layer: per-graph message passing plus cross-graph attention.
//!
//! One round updates the nodes of both graphs together:
//!
//! ```text
//! m_i  = SUM_j relu(W_msg [h_i || h_j || e_ij])          (within each graph)
//! u_i  = h_i - SUM_k softmax_k(h_i . h'_k) h'_k          (against the other graph)
//! h_i' = GRU([m_i || u_i], h_i)
//! ```
//!
//! `u_i` measures how far node `i` is from its soft best match in the other
//! graph; nodes with a close counterpart get a small cross-graph signal.
//!
//! # Reference
//!
//! Li et al., "Graph Matching Networks for Learning the Similarity of Graph
//! Structured Objects", ICML 2019.

use crate::gru::GRUCell;
use crate::message::MessagePassing;
use crate::{Error, Result};
use candle_core::{Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, Module, VarBuilder};

/// Cross-graph attention residuals.
///
/// With `S = x1 x2^T`:
/// - `u1 = x1 - softmax(S, dim=1) x2`
/// - `u2 = x2 - softmax(S, dim=0)^T x1`
///
/// Both directions share the same score matrix.
pub fn cross_graph_attention(x1: &Tensor, x2: &Tensor) -> Result<(Tensor, Tensor)> {
    let d1 = x1.dim(D::Minus1)?;
    let d2 = x2.dim(D::Minus1)?;
    if d1 != d2 {
        return Err(Error::DimensionMismatch {
            expected: d1,
            got: d2,
        });
    }

    let scores = x1.matmul(&x2.t()?)?;
    let attn_1 = softmax(&scores, 1)?;
    let attn_2 = softmax(&scores, 0)?.t()?;

    let u1 = (x1 - attn_1.matmul(x2)?)?;
    let u2 = (x2 - attn_2.matmul(x1)?)?;
    Ok((u1, u2))
}

/// Graph matching layer.
///
/// A single instance is applied repeatedly by [`crate::models::GMNNet`];
/// the same parameters serve both graphs and every round.
pub struct GMNLayer {
    /// Message network over `[x_i || x_j || e_ij]`.
    fmessage: Linear,
    /// Node update over `[m_i || u_i]`.
    fnode: GRUCell,
    in_channels: usize,
    out_channels: usize,
}

impl GMNLayer {
    /// Create a matching layer.
    ///
    /// The GRU hidden state is the node state itself, so `in_channels` must
    /// equal `out_channels`.
    pub fn new(in_channels: usize, out_channels: usize, vb: VarBuilder) -> Result<Self> {
        if in_channels != out_channels {
            return Err(Error::InvalidConfig(format!(
                "GMN layer needs in_channels == out_channels, got {in_channels} and {out_channels}"
            )));
        }
        let fmessage = linear(3 * in_channels, out_channels, vb.pp("fmessage"))?;
        let fnode = GRUCell::new(2 * out_channels, out_channels, vb.pp("fnode"))?;
        Ok(Self {
            fmessage,
            fnode,
            in_channels,
            out_channels,
        })
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// One matching round over a graph pair.
    ///
    /// # Arguments
    /// - `x1`, `x2`: node states (N1 x D), (N2 x D)
    /// - `edge_index1`, `edge_index2`: (2 x E) u32, row 0 = source
    /// - `edge_weight1`, `edge_weight2`: optional edge embeddings (E x D)
    ///
    /// # Returns
    /// - Updated states with the input shapes
    pub fn forward(
        &self,
        x1: &Tensor,
        x2: &Tensor,
        edge_index1: &Tensor,
        edge_index2: &Tensor,
        edge_weight1: Option<&Tensor>,
        edge_weight2: Option<&Tensor>,
    ) -> Result<(Tensor, Tensor)> {
        let m1 = self.propagate(x1, edge_index1, edge_weight1)?;
        let m2 = self.propagate(x2, edge_index2, edge_weight2)?;

        let (u1, u2) = cross_graph_attention(x1, x2)?;

        let h1 = self.fnode.forward(&Tensor::cat(&[&m1, &u1], 1)?, x1)?;
        let h2 = self.fnode.forward(&Tensor::cat(&[&m2, &u2], 1)?, x2)?;
        Ok((h1, h2))
    }
}

impl MessagePassing for GMNLayer {
    fn message_dim(&self) -> usize {
        self.out_channels
    }

    /// `relu(fmessage([x_i || x_j || w]))`, with `w = 1` when the graph has
    /// no edge embeddings.
    fn message(&self, x_i: &Tensor, x_j: &Tensor, edge_attr: Option<&Tensor>) -> Result<Tensor> {
        let ones;
        let edge_weight = match edge_attr {
            Some(w) => {
                let got = w.dim(D::Minus1)?;
                if got != self.in_channels {
                    return Err(Error::DimensionMismatch {
                        expected: self.in_channels,
                        got,
                    });
                }
                w
            }
            None => {
                ones = x_i.ones_like()?;
                &ones
            }
        };
        let input = Tensor::cat(&[x_i, x_j, edge_weight], 1)?;
        Ok(self.fmessage.forward(&input)?.relu()?)
    }
}
