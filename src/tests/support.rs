//! Small deterministic model artefacts for tests.
//!
//! The fixture model has a 16-token vocabulary, 8 hidden units over 2 heads,
//! and 8 positions. Its weights follow a fixed pattern rather than training,
//! so scores are meaningless but reproducible.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use ndarray::{Array1, Array2};
use safetensors::{Dtype, tensor::TensorView};

use crate::{
    config::ModelHyperparameters,
    providers::nano::{
        AttentionWeights, FeedForwardWeights, LayerNormWeights, LinearWeights, ModelArtefact,
        NanoClassifierConfig, NanoTransformerWeights, compute_sha256,
    },
};

pub const FIXTURE_PAD: &str = "<pad>";
pub const FIXTURE_UNK: &str = "<unk>";

/// Token ids of the fixture vocabulary.
pub const FIXTURE_VOCABULARY: &[(&str, u32)] = &[
    (FIXTURE_PAD, 0),
    (FIXTURE_UNK, 1),
    ("urgent", 2),
    ("verify", 3),
    ("account", 4),
    ("password", 5),
    ("click", 6),
    ("link", 7),
    ("meeting", 8),
    ("tomorrow", 9),
    ("invoice", 10),
    ("attached", 11),
    ("hello", 12),
    ("team", 13),
    ("bank", 14),
    ("suspended", 15),
];

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
#[must_use]
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

#[must_use]
pub fn fixture_hyperparameters() -> ModelHyperparameters {
    ModelHyperparameters {
        vocab_size: FIXTURE_VOCABULARY.len(),
        hidden_size: 8,
        num_heads: 2,
        max_sequence_length: 8,
        num_classes: 2,
    }
}

/// Writes the fixture vocabulary as `vocab.json` inside `dir`.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_fixture_vocabulary(dir: &Path) -> PathBuf {
    let vocabulary: HashMap<&str, u32> = FIXTURE_VOCABULARY.iter().copied().collect();
    let path = dir.join("vocab.json");
    let json = serde_json::to_string(&vocabulary)
        .unwrap_or_else(|e| panic!("serialise fixture vocabulary: {e}"));
    std::fs::write(&path, json).unwrap_or_else(|e| panic!("write fixture vocabulary: {e}"));
    path
}

/// Deterministic pseudo-random values in `[-scale, scale)`.
#[expect(clippy::float_arithmetic, reason = "fixture values are floats")]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "fixture indices are tiny"
)]
fn patterned(rows: usize, cols: usize, seed: u32, scale: f32) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mixed = (r as u32)
            .wrapping_mul(2_654_435_761)
            .wrapping_add((c as u32).wrapping_mul(40_503))
            .wrapping_add(seed.wrapping_mul(97_531))
            .rotate_left(13)
            .wrapping_mul(2_246_822_519);
        ((mixed % 2000) as f32 / 1000.0 - 1.0) * scale
    })
}

fn patterned_vector(len: usize, seed: u32, scale: f32) -> Array1<f32> {
    patterned(1, len, seed, scale).into_iter().collect()
}

fn patterned_linear(outputs: usize, inputs: usize, seed: u32) -> LinearWeights {
    LinearWeights {
        weight: patterned(outputs, inputs, seed, 0.5),
        bias: patterned_vector(outputs, seed.wrapping_add(1), 0.1),
    }
}

/// Weights shaped for `hyperparameters`, filled with a fixed pattern.
#[must_use]
pub fn fixture_weights(hyperparameters: &ModelHyperparameters) -> NanoTransformerWeights {
    let h = hyperparameters.hidden_size;
    NanoTransformerWeights {
        token_embedding: patterned(hyperparameters.vocab_size, h, 1, 1.0),
        position_embedding: patterned(hyperparameters.max_sequence_length, h, 2, 0.5),
        attention: AttentionWeights {
            in_proj_weight: patterned(3 * h, h, 3, 0.5),
            in_proj_bias: patterned_vector(3 * h, 4, 0.1),
            out_proj: patterned_linear(h, h, 5),
        },
        feed_forward: FeedForwardWeights {
            expand: patterned_linear(h, h, 7),
            norm: LayerNormWeights {
                gamma: Array1::ones(h),
                beta: Array1::zeros(h),
            },
            project: patterned_linear(h, h, 9),
        },
        output: patterned_linear(hyperparameters.num_classes, h, 11),
    }
}

fn le_bytes<'a>(values: impl IntoIterator<Item = &'a f32>) -> Vec<u8> {
    values.into_iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Flattens weights into `(name, shape, little-endian bytes)` triples.
#[must_use]
pub fn weight_tensors(weights: &NanoTransformerWeights) -> Vec<(String, Vec<usize>, Vec<u8>)> {
    let matrices = [
        ("embedding.weight", &weights.token_embedding),
        ("pos_embedding.weight", &weights.position_embedding),
        ("multihead_attn.in_proj_weight", &weights.attention.in_proj_weight),
        ("multihead_attn.out_proj.weight", &weights.attention.out_proj.weight),
        ("mlp.0.weight", &weights.feed_forward.expand.weight),
        ("mlp.3.weight", &weights.feed_forward.project.weight),
        ("fc_out.weight", &weights.output.weight),
    ];
    let vectors = [
        ("multihead_attn.in_proj_bias", &weights.attention.in_proj_bias),
        ("multihead_attn.out_proj.bias", &weights.attention.out_proj.bias),
        ("mlp.0.bias", &weights.feed_forward.expand.bias),
        ("mlp.1.weight", &weights.feed_forward.norm.gamma),
        ("mlp.1.bias", &weights.feed_forward.norm.beta),
        ("mlp.3.bias", &weights.feed_forward.project.bias),
        ("fc_out.bias", &weights.output.bias),
    ];
    matrices
        .into_iter()
        .map(|(name, matrix)| (name.to_owned(), matrix.shape().to_vec(), le_bytes(matrix.iter())))
        .chain(
            vectors
                .into_iter()
                .map(|(name, vector)| (name.to_owned(), vector.shape().to_vec(), le_bytes(vector.iter()))),
        )
        .collect()
}

/// Serialises raw tensors into safetensors bytes.
///
/// # Panics
///
/// Panics if a tensor's byte length disagrees with its shape and dtype.
#[must_use]
pub fn serialise_tensors(dtype: Dtype, tensors: &[(String, Vec<usize>, Vec<u8>)]) -> Vec<u8> {
    let mut views: HashMap<String, TensorView<'_>> = HashMap::new();
    for (name, shape, bytes) in tensors {
        let view = TensorView::new(dtype, shape.clone(), bytes)
            .unwrap_or_else(|e| panic!("tensor view {name}: {e}"));
        views.insert(name.clone(), view);
    }
    safetensors::serialize(&views, &None).unwrap_or_else(|e| panic!("serialise tensors: {e}"))
}

/// Writes `weights` as `weights.safetensors` inside `dir`.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_weights(dir: &Path, weights: &NanoTransformerWeights) -> PathBuf {
    let path = dir.join("weights.safetensors");
    let bytes = serialise_tensors(Dtype::F32, &weight_tensors(weights));
    std::fs::write(&path, bytes).unwrap_or_else(|e| panic!("write fixture weights: {e}"));
    path
}

/// Writes fixture artefacts into `dir` and returns a matching configuration.
///
/// # Panics
///
/// Panics if an artefact cannot be written or hashed.
#[must_use]
pub fn fixture_config(dir: &Path) -> NanoClassifierConfig {
    let hyperparameters = fixture_hyperparameters();
    let weights_path = write_weights(dir, &fixture_weights(&hyperparameters));
    let vocabulary_path = write_fixture_vocabulary(dir);
    let artefact = |path: PathBuf| ModelArtefact {
        sha256: compute_sha256(&path).unwrap_or_else(|e| panic!("hash fixture artefact: {e}")),
        path,
    };
    NanoClassifierConfig {
        weights: artefact(weights_path),
        vocabulary: artefact(vocabulary_path),
        hyperparameters,
        pad_token: FIXTURE_PAD.into(),
        unk_token: FIXTURE_UNK.into(),
    }
}
