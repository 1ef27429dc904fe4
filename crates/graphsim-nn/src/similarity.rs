//! Similarity and loss over graph embeddings.
//!
//! All functions take row-aligned `(B x D)` embeddings, one row per pair.

use crate::{Error, Result};
use candle_core::Tensor;

const EPS: f64 = 1e-8;

fn check_pair(a: &Tensor, b: &Tensor) -> Result<()> {
    let (ra, da) = a.dims2()?;
    let (rb, db) = b.dims2()?;
    if ra != rb {
        return Err(Error::DimensionMismatch {
            expected: ra,
            got: rb,
        });
    }
    if da != db {
        return Err(Error::DimensionMismatch {
            expected: da,
            got: db,
        });
    }
    Ok(())
}

/// Row-wise cosine similarity `(B)`.
pub fn cosine_similarity(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    check_pair(a, b)?;
    let dot = (a * b)?.sum(1)?;
    let norm_a = a.sqr()?.sum(1)?.sqrt()?;
    let norm_b = b.sqr()?.sum(1)?.sqrt()?;
    let denom = (norm_a * norm_b)?.maximum(EPS)?;
    Ok((dot / denom)?)
}

/// Row-wise Euclidean distance `(B)`.
pub fn euclidean_distance(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    check_pair(a, b)?;
    Ok((a - b)?.sqr()?.sum(1)?.sqrt()?)
}

/// Cosine embedding loss, averaged over the batch.
///
/// For label `1` (similar): `1 - cos(a, b)`.
/// For label `-1` (dissimilar): `max(0, cos(a, b) - margin)`.
pub fn cosine_embedding_loss(a: &Tensor, b: &Tensor, labels: &Tensor, margin: f64) -> Result<Tensor> {
    let cos = cosine_similarity(a, b)?;
    let labels = labels.to_dtype(cos.dtype())?;
    let n = cos.dim(0)?;
    let got = labels.dim(0)?;
    if got != n {
        return Err(Error::DimensionMismatch { expected: n, got });
    }

    let positive = labels.gt(0f64)?.to_dtype(cos.dtype())?;
    let negative = labels.lt(0f64)?.to_dtype(cos.dtype())?;

    let pos_loss = cos.affine(-1.0, 1.0)?;
    let neg_loss = cos.affine(1.0, -margin)?.relu()?;

    let loss = ((positive * pos_loss)? + (negative * neg_loss)?)?;
    Ok(loss.mean_all()?)
}
