//! Reads nano transformer weights from a safetensors file.
//!
//! Tensor names follow the PyTorch module that produced the checkpoint, so a
//! `state_dict` saved with `safetensors.torch.save_file` loads unchanged.

use std::path::Path;

use ndarray::{Array1, Array2};
use safetensors::{Dtype, SafeTensors};
use tracing::info;

use super::{
    errors::{TransformerError, WeightsError},
    layers::{AttentionWeights, LayerNormWeights, LinearWeights},
    transformer::{FeedForwardWeights, NanoTransformer, NanoTransformerWeights},
};
use crate::config::{HyperparameterError, ModelHyperparameters};

/// Loads and shape-checks a transformer from the safetensors file at `path`.
///
/// # Errors
///
/// Returns an error when `hyperparameters` are invalid, the file cannot be
/// read or parsed, a tensor is missing or not `F32`, or any shape disagrees
/// with `hyperparameters`.
pub fn load_transformer(
    path: &Path,
    hyperparameters: ModelHyperparameters,
) -> Result<NanoTransformer, WeightsError> {
    let hyperparameters = hyperparameters
        .validate()
        .map_err(TransformerError::from)?;
    let h = hyperparameters.hidden_size;
    let packed = hyperparameters
        .packed_projection_width()
        .ok_or(TransformerError::Hyperparameters(
            HyperparameterError::Oversized { hidden_size: h },
        ))?;

    let data = std::fs::read(path).map_err(|source| WeightsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tensors = SafeTensors::deserialize(&data).map_err(|source| WeightsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let weights = NanoTransformerWeights {
        token_embedding: matrix(&tensors, "embedding.weight", hyperparameters.vocab_size, h)?,
        position_embedding: matrix(
            &tensors,
            "pos_embedding.weight",
            hyperparameters.max_sequence_length,
            h,
        )?,
        attention: AttentionWeights {
            in_proj_weight: matrix(&tensors, "multihead_attn.in_proj_weight", packed, h)?,
            in_proj_bias: vector(&tensors, "multihead_attn.in_proj_bias", packed)?,
            out_proj: linear(&tensors, "multihead_attn.out_proj", h, h)?,
        },
        feed_forward: FeedForwardWeights {
            expand: linear(&tensors, "mlp.0", h, h)?,
            norm: LayerNormWeights {
                gamma: vector(&tensors, "mlp.1.weight", h)?,
                beta: vector(&tensors, "mlp.1.bias", h)?,
            },
            project: linear(&tensors, "mlp.3", h, h)?,
        },
        output: linear(&tensors, "fc_out", hyperparameters.num_classes, h)?,
    };

    let transformer = NanoTransformer::new(hyperparameters, weights)?;
    info!(
        path = %path.display(),
        vocab_size = hyperparameters.vocab_size,
        hidden_size = h,
        num_heads = hyperparameters.num_heads,
        "loaded transformer weights"
    );
    Ok(transformer)
}

fn linear(
    tensors: &SafeTensors<'_>,
    prefix: &str,
    outputs: usize,
    inputs: usize,
) -> Result<LinearWeights, WeightsError> {
    Ok(LinearWeights {
        weight: matrix(tensors, &format!("{prefix}.weight"), outputs, inputs)?,
        bias: vector(tensors, &format!("{prefix}.bias"), outputs)?,
    })
}

fn matrix(
    tensors: &SafeTensors<'_>,
    name: &str,
    rows: usize,
    cols: usize,
) -> Result<Array2<f32>, WeightsError> {
    let values = read_f32(tensors, name, &[rows, cols])?;
    Array2::from_shape_vec((rows, cols), values).map_err(|source| WeightsError::Layout {
        name: name.to_owned(),
        source,
    })
}

fn vector(tensors: &SafeTensors<'_>, name: &str, len: usize) -> Result<Array1<f32>, WeightsError> {
    Ok(Array1::from_vec(read_f32(tensors, name, &[len])?))
}

fn read_f32(
    tensors: &SafeTensors<'_>,
    name: &str,
    expected: &[usize],
) -> Result<Vec<f32>, WeightsError> {
    let view = tensors
        .tensor(name)
        .map_err(|_| WeightsError::MissingTensor {
            name: name.to_owned(),
        })?;
    if view.dtype() != Dtype::F32 {
        return Err(WeightsError::UnsupportedDtype {
            name: name.to_owned(),
            dtype: format!("{:?}", view.dtype()),
        });
    }
    if view.shape() != expected {
        return Err(WeightsError::TensorShape {
            name: name.to_owned(),
            expected: expected.to_vec(),
            actual: view.shape().to_vec(),
        });
    }
    Ok(view
        .data()
        .chunks_exact(4)
        .map(|chunk| {
            let mut bytes = [0_u8; 4];
            bytes.copy_from_slice(chunk);
            f32::from_le_bytes(bytes)
        })
        .collect())
}
