//! Message-passing protocol over an edge index.
//!
//! All layers follow the message-passing paradigm:
//!
//! 1. **Gather**: select endpoint rows `x_i` (target) and `x_j` (source) per edge
//! 2. **Message**: compute one message per edge from `(x_i, x_j, e_ij)`
//! 3. **Aggregate**: sum messages at their receiving node
//! 4. **Update**: transform the aggregated messages
//!
//! ```text
//! h_i^{(l+1)} = UPDATE(SUM({MESSAGE(h_i^{(l)}, h_j^{(l)}, e_ij) : j in N(i)}))
//! ```
//!
//! Gather is `index_select` and aggregation is `index_add`, so gradients flow
//! through both when the inputs are tracked variables.

use crate::{Error, Result};
use candle_core::Tensor;

/// Direction messages travel along an edge `(row 0, row 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Row 0 sends, row 1 receives.
    #[default]
    SourceToTarget,
    /// Row 1 sends, row 0 receives.
    TargetToSource,
}

impl Flow {
    /// `(i, j)`: the edge-index rows of the receiving and sending node.
    pub fn rows(self) -> (usize, usize) {
        match self {
            Flow::SourceToTarget => (1, 0),
            Flow::TargetToSource => (0, 1),
        }
    }
}

/// Select rows of `x` by `index` (`x[index]`).
pub fn gather(x: &Tensor, index: &Tensor) -> Result<Tensor> {
    Ok(x.index_select(index, 0)?)
}

/// Sum rows of `src` into `dim_size` buckets chosen by `index`.
///
/// Buckets that receive nothing stay zero.
pub fn scatter_add(src: &Tensor, index: &Tensor, dim_size: usize) -> Result<Tensor> {
    let (num_items, width) = src.dims2()?;
    let num_index = index.dim(0)?;
    if num_items != num_index {
        return Err(Error::DimensionMismatch {
            expected: num_index,
            got: num_items,
        });
    }
    let out = Tensor::zeros((dim_size, width), src.dtype(), src.device())?;
    if num_items == 0 {
        return Ok(out);
    }
    Ok(out.index_add(index, src, 0)?)
}

/// A layer that can be driven by [`MessagePassing::propagate`].
pub trait MessagePassing {
    /// Width of the messages [`MessagePassing::message`] returns.
    fn message_dim(&self) -> usize;

    /// Compute per-edge messages.
    ///
    /// `x_i` and `x_j` are `[E, D]`; `edge_attr` is whatever the caller
    /// passed to `propagate`, unchanged.
    fn message(&self, x_i: &Tensor, x_j: &Tensor, edge_attr: Option<&Tensor>) -> Result<Tensor>;

    /// Transform aggregated messages. Identity by default.
    fn update(&self, aggr: Tensor) -> Result<Tensor> {
        Ok(aggr)
    }

    fn flow(&self) -> Flow {
        Flow::SourceToTarget
    }

    /// Run one round: gather, message, sum at the receiving node, update.
    ///
    /// Returns `[N, message_dim]`. With no edges every node aggregates to
    /// zero.
    fn propagate(
        &self,
        x: &Tensor,
        edge_index: &Tensor,
        edge_attr: Option<&Tensor>,
    ) -> Result<Tensor> {
        let num_nodes = x.dim(0)?;
        let (rows, num_edges) = edge_index.dims2()?;
        if rows != 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                got: rows,
            });
        }

        if num_edges == 0 {
            let aggr = Tensor::zeros((num_nodes, self.message_dim()), x.dtype(), x.device())?;
            return self.update(aggr);
        }

        let max = edge_index.flatten_all()?.max(0)?.to_scalar::<u32>()? as usize;
        if max >= num_nodes {
            return Err(Error::InvalidInput(format!(
                "edge index {max} out of range for {num_nodes} nodes"
            )));
        }

        let (i, j) = self.flow().rows();
        let index_i = edge_index.get(i)?;
        let index_j = edge_index.get(j)?;

        let x_i = gather(x, &index_i)?;
        let x_j = gather(x, &index_j)?;
        let messages = self.message(&x_i, &x_j, edge_attr)?;

        let aggr = scatter_add(&messages, &index_i, num_nodes)?;
        self.update(aggr)
    }
}
