//! Gated graph convolution.
//!
//! ```text
//! h^(0) = [x || 0]                       (zero-padded to out_channels)
//! m^(l) = SUM_j w_ji * (h_j^(l) W_l)     (sum over incoming edges)
//! h^(l+1) = GRU(m^(l), h^(l))
//! ```
//!
//! Each step has its own propagation matrix `W_l`; the GRU is shared across
//! steps.
//!
//! # Reference
//!
//! Li et al., "Gated Graph Sequence Neural Networks", ICLR 2016.

use crate::gru::GRUCell;
use crate::message::MessagePassing;
use crate::{Error, Result};
use candle_core::{Tensor, D};
use candle_nn::{init::DEFAULT_KAIMING_UNIFORM, VarBuilder};
use tracing::trace;

/// Gated graph convolution over `num_steps` propagation steps.
pub struct GatedGraphConv {
    /// Per-step propagation matrices `[num_steps, D, D]`.
    weight: Tensor,
    rnn: GRUCell,
    out_channels: usize,
    num_steps: usize,
}

impl GatedGraphConv {
    pub fn new(out_channels: usize, num_steps: usize, vb: VarBuilder) -> Result<Self> {
        if num_steps == 0 {
            return Err(Error::InvalidConfig(
                "gated graph conv needs at least one step".into(),
            ));
        }
        let weight = vb.get_with_hints(
            (num_steps, out_channels, out_channels),
            "weight",
            DEFAULT_KAIMING_UNIFORM,
        )?;
        let rnn = GRUCell::new(out_channels, out_channels, vb.pp("rnn"))?;
        Ok(Self {
            weight,
            rnn,
            out_channels,
            num_steps,
        })
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// - `x`: node features (N x C), `C <= out_channels`
    /// - `edge_index`: (2 x E) u32, row 0 = source
    /// - `edge_weight`: optional scalar weight per edge (E)
    ///
    /// # Returns
    /// - Node states (N x out_channels)
    pub fn forward(
        &self,
        x: &Tensor,
        edge_index: &Tensor,
        edge_weight: Option<&Tensor>,
    ) -> Result<Tensor> {
        let (n, c) = x.dims2()?;
        if c > self.out_channels {
            return Err(Error::InvalidInput(format!(
                "input width {c} exceeds out_channels {}",
                self.out_channels
            )));
        }

        let mut h = if c < self.out_channels {
            let pad = Tensor::zeros((n, self.out_channels - c), x.dtype(), x.device())?;
            Tensor::cat(&[x, &pad], 1)?
        } else {
            x.clone()
        };

        for step in 0..self.num_steps {
            let m = h.matmul(&self.weight.get(step)?)?;
            let m = self.propagate(&m, edge_index, edge_weight)?;
            h = self.rnn.forward(&m, &h)?;
            trace!(step, dims = ?h.dims(), "gated graph conv step");
        }
        Ok(h)
    }
}

impl MessagePassing for GatedGraphConv {
    fn message_dim(&self) -> usize {
        self.out_channels
    }

    fn message(&self, _x_i: &Tensor, x_j: &Tensor, edge_attr: Option<&Tensor>) -> Result<Tensor> {
        match edge_attr {
            Some(w) => {
                let w = if w.rank() == 1 { w.unsqueeze(1)? } else { w.clone() };
                if w.dim(D::Minus1)? != 1 {
                    return Err(Error::DimensionMismatch {
                        expected: 1,
                        got: w.dim(D::Minus1)?,
                    });
                }
                Ok(x_j.broadcast_mul(&w)?)
            }
            None => Ok(x_j.clone()),
        }
    }
}
