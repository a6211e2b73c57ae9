//! Stateless building blocks of the nano transformer forward pass.
//!
//! Each function reproduces the numerics of the corresponding PyTorch module
//! so weights exported from a trained model give matching logits.
#![expect(
    clippy::float_arithmetic,
    reason = "transformer layers are floating point kernels"
)]

use ndarray::{Array1, Array2, ArrayView2, Axis, s};

/// Epsilon added to the variance by `nn.LayerNorm`.
pub const LAYER_NORM_EPS: f32 = 1e-5;

/// Affine map `y = x Wᵀ + b` stored in PyTorch layout (`out × in`).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearWeights {
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

/// Per-feature scale and shift applied after layer normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNormWeights {
    pub gamma: Array1<f32>,
    pub beta: Array1<f32>,
}

/// Packed projections of a multi-head self-attention block.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionWeights {
    /// Query, key and value projections stacked row-wise (`3H × H`).
    pub in_proj_weight: Array2<f32>,
    /// Query, key and value biases stacked (`3H`).
    pub in_proj_bias: Array1<f32>,
    /// Projection applied to the concatenated heads (`H × H`).
    pub out_proj: LinearWeights,
}

/// Apply a linear layer to every row of `input`.
#[must_use]
pub fn linear(input: ArrayView2<'_, f32>, layer: &LinearWeights) -> Array2<f32> {
    input.dot(&layer.weight.t()) + &layer.bias
}

/// Normalise each row to zero mean and unit variance, then scale and shift.
pub fn layer_norm(input: &mut Array2<f32>, norm: &LayerNormWeights) {
    #[expect(clippy::cast_precision_loss, reason = "hidden width fits in f32")]
    let width = input.ncols() as f32;
    for mut row in input.rows_mut() {
        let mean = row.sum() / width;
        let variance = row.fold(0.0, |acc, value| acc + (value - mean) * (value - mean)) / width;
        let inv_std = (variance + LAYER_NORM_EPS).sqrt().recip();
        row.mapv_inplace(|value| (value - mean) * inv_std);
        row *= &norm.gamma;
        row += &norm.beta;
    }
}

/// Exponential linear unit with `alpha = 1`.
pub fn elu(input: &mut Array2<f32>) {
    input.mapv_inplace(|value| if value > 0.0 { value } else { value.exp_m1() });
}

/// Numerically stable softmax over each row.
pub fn softmax_rows(input: &mut Array2<f32>) {
    for mut row in input.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |acc, value| acc.max(*value));
        row.mapv_inplace(|value| (value - max).exp());
        let total = row.sum();
        row.mapv_inplace(|value| value / total);
    }
}

/// Unmasked multi-head self-attention with the input used as query, key and
/// value.
///
/// `heads` must divide the hidden width; callers validate this at load time.
#[must_use]
pub fn self_attention(
    input: ArrayView2<'_, f32>,
    attention: &AttentionWeights,
    heads: usize,
) -> Array2<f32> {
    let (positions, hidden) = input.dim();
    let head_dim = hidden / heads;
    #[expect(clippy::cast_precision_loss, reason = "head width fits in f32")]
    let scale = (head_dim as f32).sqrt().recip();

    let packed = input.dot(&attention.in_proj_weight.t()) + &attention.in_proj_bias;
    let (query, rest) = packed.view().split_at(Axis(1), hidden);
    let (key, value) = rest.split_at(Axis(1), hidden);

    let mut mixed = Array2::<f32>::zeros((positions, hidden));
    for head in 0..heads {
        let columns = head * head_dim..(head + 1) * head_dim;
        let q = query.slice(s![.., columns.clone()]);
        let k = key.slice(s![.., columns.clone()]);
        let v = value.slice(s![.., columns.clone()]);

        let mut weights = q.dot(&k.t()) * scale;
        softmax_rows(&mut weights);
        mixed.slice_mut(s![.., columns]).assign(&weights.dot(&v));
    }

    linear(mixed.view(), &attention.out_proj)
}
