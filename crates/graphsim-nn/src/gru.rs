//! Gated recurrent unit cell used as the node-update function.
//!
//! Gate order in the stacked weights is (reset, update, new):
//!
//! ```text
//! r  = sigmoid(W_ir x + b_ir + W_hr h + b_hr)
//! z  = sigmoid(W_iz x + b_iz + W_hz h + b_hz)
//! n  = tanh(W_in x + b_in + r * (W_hn h + b_hn))
//! h' = (1 - z) * n + z * h
//! ```

use crate::{Error, Result};
use candle_core::{Tensor, D};
use candle_nn::{ops::sigmoid, Init, Linear, Module, VarBuilder};

/// Single-step GRU over a batch of rows (one row per node).
pub struct GRUCell {
    input_proj: Linear,
    hidden_proj: Linear,
    input_dim: usize,
    hidden_dim: usize,
}

impl GRUCell {
    /// Create a GRU cell.
    ///
    /// Parameters are `weight_ih [3H, I]`, `weight_hh [3H, H]`, `bias_ih`
    /// and `bias_hh`, all drawn from `U(-1/sqrt(H), 1/sqrt(H))`.
    pub fn new(input_dim: usize, hidden_dim: usize, vb: VarBuilder) -> Result<Self> {
        if input_dim == 0 || hidden_dim == 0 {
            return Err(Error::InvalidConfig(
                "GRU dimensions must be positive".into(),
            ));
        }
        let bound = 1.0 / (hidden_dim as f64).sqrt();
        let init = Init::Uniform {
            lo: -bound,
            up: bound,
        };

        let weight_ih = vb.get_with_hints((3 * hidden_dim, input_dim), "weight_ih", init)?;
        let weight_hh = vb.get_with_hints((3 * hidden_dim, hidden_dim), "weight_hh", init)?;
        let bias_ih = vb.get_with_hints(3 * hidden_dim, "bias_ih", init)?;
        let bias_hh = vb.get_with_hints(3 * hidden_dim, "bias_hh", init)?;

        Ok(Self {
            input_proj: Linear::new(weight_ih, Some(bias_ih)),
            hidden_proj: Linear::new(weight_hh, Some(bias_hh)),
            input_dim,
            hidden_dim,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// One step: `input [N, I]`, `hidden [N, H]` -> `[N, H]`.
    pub fn forward(&self, input: &Tensor, hidden: &Tensor) -> Result<Tensor> {
        let got = input.dim(D::Minus1)?;
        if got != self.input_dim {
            return Err(Error::DimensionMismatch {
                expected: self.input_dim,
                got,
            });
        }
        let got = hidden.dim(D::Minus1)?;
        if got != self.hidden_dim {
            return Err(Error::DimensionMismatch {
                expected: self.hidden_dim,
                got,
            });
        }

        let gi = self.input_proj.forward(input)?.chunk(3, D::Minus1)?;
        let gh = self.hidden_proj.forward(hidden)?.chunk(3, D::Minus1)?;

        let r = sigmoid(&(&gi[0] + &gh[0])?)?;
        let z = sigmoid(&(&gi[1] + &gh[1])?)?;
        let n = (&gi[2] + (r * &gh[2])?)?.tanh()?;

        // h' = n + z * (h - n)
        let h = (&n + (z * (hidden - &n)?)?)?;
        Ok(h)
    }
}
