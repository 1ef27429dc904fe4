//! Graph-level readout via gated attention.
//!
//! ```text
//! g_i   = sigmoid(w^T x_i + b)
//! a_i   = exp(g_i) / SUM_{k in graph(i)} exp(g_k)
//! out_b = SUM_{i in graph b} a_i x_i
//! ```
//!
//! # Reference
//!
//! Li et al., "Gated Graph Sequence Neural Networks", ICLR 2016.

use crate::message::{gather, scatter_add};
use crate::{Error, Result};
use candle_core::{Tensor, D};
use candle_nn::{linear, ops::sigmoid, Linear, Module, VarBuilder};

/// Attention pooling with a sigmoid gate network.
pub struct GlobalAttentionPool {
    gate: Linear,
    dim: usize,
}

impl GlobalAttentionPool {
    pub fn new(dim: usize, vb: VarBuilder) -> Result<Self> {
        let gate = linear(dim, 1, vb.pp("gate"))?;
        Ok(Self { gate, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Per-node attention weights `(N x 1)`, summing to one within each graph.
    ///
    /// # Arguments
    /// - `x`: node states (N x dim)
    /// - `batch`: graph index per node (N) u32; `None` puts every node in graph 0
    /// - `num_graphs`: number of graphs addressed by `batch`
    pub fn attention_weights(
        &self,
        x: &Tensor,
        batch: Option<&Tensor>,
        num_graphs: usize,
    ) -> Result<Tensor> {
        let got = x.dim(D::Minus1)?;
        if got != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got,
            });
        }
        let gate = sigmoid(&self.gate.forward(x)?)?;

        match batch {
            None => Ok(candle_nn::ops::softmax(&gate, 0)?),
            Some(batch) => {
                let n = x.dim(0)?;
                let got = batch.dim(0)?;
                if got != n {
                    return Err(Error::DimensionMismatch { expected: n, got });
                }
                // Gates live in (0, 1), so one global shift is stable for every graph.
                let shifted = gate.broadcast_sub(&gate.max_keepdim(0)?)?.exp()?;
                let denom = scatter_add(&shifted, batch, num_graphs)?;
                Ok((shifted / gather(&denom, batch)?)?)
            }
        }
    }

    /// Pool node states to one vector per graph: `(num_graphs x dim)`.
    ///
    /// Graphs without nodes pool to zeros.
    pub fn forward(&self, x: &Tensor, batch: Option<&Tensor>, num_graphs: usize) -> Result<Tensor> {
        if x.dim(0)? == 0 {
            return Err(graphsim_core::Error::EmptyGraph.into());
        }
        let weights = self.attention_weights(x, batch, num_graphs)?;
        let weighted = x.broadcast_mul(&weights)?;
        match batch {
            None => Ok(weighted.sum_keepdim(0)?),
            Some(batch) => scatter_add(&weighted, batch, num_graphs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_pool_forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let pool = GlobalAttentionPool::new(32, vb).unwrap();
        let x = Tensor::randn(0f32, 1f32, (10, 32), &device).unwrap();

        let out = pool.forward(&x, None, 1).unwrap();
        assert_eq!(out.dims(), &[1, 32]);
    }

    #[test]
    fn test_zero_gate_is_mean() {
        // Zero gate weights: every node gets sigmoid(0) = 0.5, so weights are uniform.
        let device = Device::Cpu;
        let vb = VarBuilder::zeros(DType::F32, &device);
        let pool = GlobalAttentionPool::new(2, vb).unwrap();

        let x = Tensor::new(&[[1f32, 2.], [3., 4.], [5., 9.]], &device).unwrap();
        let out = pool.forward(&x, None, 1).unwrap().to_vec2::<f32>().unwrap();

        assert!((out[0][0] - 3.0).abs() < 1e-5);
        assert!((out[0][1] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_node_pools_to_itself() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let pool = GlobalAttentionPool::new(3, vb).unwrap();

        let x = Tensor::new(&[[0.25f32, -1., 7.]], &device).unwrap();
        let out = pool.forward(&x, None, 1).unwrap().to_vec2::<f32>().unwrap();

        for (a, b) in out[0].iter().zip([0.25f32, -1., 7.]) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_batched_matches_separate() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let pool = GlobalAttentionPool::new(4, vb).unwrap();

        let a = Tensor::randn(0f32, 1f32, (3, 4), &device).unwrap();
        let b = Tensor::randn(0f32, 1f32, (5, 4), &device).unwrap();
        let x = Tensor::cat(&[&a, &b], 0).unwrap();
        let batch = Tensor::new(&[0u32, 0, 0, 1, 1, 1, 1, 1], &device).unwrap();

        let joint = pool.forward(&x, Some(&batch), 2).unwrap();
        let separate = Tensor::cat(
            &[
                &pool.forward(&a, None, 1).unwrap(),
                &pool.forward(&b, None, 1).unwrap(),
            ],
            0,
        )
        .unwrap();

        let diff = (joint - separate)
            .unwrap()
            .abs()
            .unwrap()
            .max_all()
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!(diff < 1e-5);
    }

    #[test]
    fn test_weights_sum_to_one_per_graph() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let pool = GlobalAttentionPool::new(4, vb).unwrap();

        let x = Tensor::randn(0f32, 1f32, (6, 4), &device).unwrap();
        let batch = Tensor::new(&[0u32, 1, 0, 2, 1, 0], &device).unwrap();

        let weights = pool.attention_weights(&x, Some(&batch), 3).unwrap();
        let sums = scatter_add(&weights, &batch, 3).unwrap();
        for s in sums.flatten_all().unwrap().to_vec1::<f32>().unwrap() {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }
}
