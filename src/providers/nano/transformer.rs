use ndarray::{Array1, Array2, Axis};
use tracing::trace;

use super::{
    errors::TransformerError,
    layers::{
        AttentionWeights, LayerNormWeights, LinearWeights, elu, layer_norm, linear,
        self_attention,
    },
    tokenizer::TokenSequence,
};
use crate::config::{HyperparameterError, ModelHyperparameters};

/// Feed-forward block: linear, layer norm, ELU, linear.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForwardWeights {
    pub expand: LinearWeights,
    pub norm: LayerNormWeights,
    pub project: LinearWeights,
}

/// Every learned tensor of the nano transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct NanoTransformerWeights {
    /// Token embedding table (`V × H`).
    pub token_embedding: Array2<f32>,
    /// Learned positional embedding table (`L × H`).
    pub position_embedding: Array2<f32>,
    pub attention: AttentionWeights,
    pub feed_forward: FeedForwardWeights,
    /// Classification head (`C × H`).
    pub output: LinearWeights,
}

/// Sequence classifier mapping token ids to per-position class logits.
///
/// Weights are immutable once constructed, so a single instance can serve
/// concurrent callers by shared reference.
#[derive(Debug, Clone)]
pub struct NanoTransformer {
    hyperparameters: ModelHyperparameters,
    weights: NanoTransformerWeights,
}

impl NanoTransformer {
    /// Pairs weights with the hyperparameters they were trained under.
    ///
    /// # Errors
    ///
    /// Returns an error when the hyperparameters are invalid or any weight
    /// tensor does not have the shape they imply.
    pub fn new(
        hyperparameters: ModelHyperparameters,
        weights: NanoTransformerWeights,
    ) -> Result<Self, TransformerError> {
        let hyperparameters = hyperparameters.validate()?;
        check_shapes(&hyperparameters, &weights)?;
        Ok(Self {
            hyperparameters,
            weights,
        })
    }

    #[must_use]
    pub fn hyperparameters(&self) -> &ModelHyperparameters {
        &self.hyperparameters
    }

    /// Runs the forward pass and returns logits of shape `(L, C)`.
    ///
    /// Padding positions are scored like any other position; callers read
    /// row 0.
    ///
    /// # Errors
    ///
    /// Returns an error when the sequence length differs from
    /// `max_sequence_length` or an id is outside the vocabulary.
    pub fn classify(&self, sequence: &TokenSequence) -> Result<Array2<f32>, TransformerError> {
        let embedded = self.embed(sequence)?;
        let attended = self_attention(
            embedded.view(),
            &self.weights.attention,
            self.hyperparameters.num_heads,
        );

        let feed_forward = &self.weights.feed_forward;
        let mut hidden = linear(attended.view(), &feed_forward.expand);
        layer_norm(&mut hidden, &feed_forward.norm);
        elu(&mut hidden);
        let hidden = linear(hidden.view(), &feed_forward.project);

        let logits = linear(hidden.view(), &self.weights.output);
        trace!(rows = logits.nrows(), "computed logits");
        Ok(logits)
    }

    /// Sum of token and positional embeddings, one row per position.
    fn embed(&self, sequence: &TokenSequence) -> Result<Array2<f32>, TransformerError> {
        let expected = self.hyperparameters.max_sequence_length;
        if sequence.len() != expected {
            return Err(TransformerError::SequenceLength {
                expected,
                actual: sequence.len(),
            });
        }

        let vocab_size = self.hyperparameters.vocab_size;
        let rows = sequence
            .ids()
            .iter()
            .enumerate()
            .map(|(position, &id)| {
                usize::try_from(id)
                    .ok()
                    .filter(|row| *row < vocab_size)
                    .ok_or(TransformerError::TokenOutOfRange {
                        position,
                        id,
                        vocab_size,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tokens = self.weights.token_embedding.select(Axis(0), &rows);
        Ok(tokens + &self.weights.position_embedding)
    }
}

fn check_shapes(
    hyperparameters: &ModelHyperparameters,
    weights: &NanoTransformerWeights,
) -> Result<(), TransformerError> {
    let ModelHyperparameters {
        vocab_size,
        hidden_size,
        max_sequence_length,
        num_classes,
        ..
    } = *hyperparameters;
    let packed = hyperparameters
        .packed_projection_width()
        .ok_or(HyperparameterError::Oversized { hidden_size })?;

    let matrices: [(&'static str, &Array2<f32>, [usize; 2]); 7] = [
        ("embedding.weight", &weights.token_embedding, [vocab_size, hidden_size]),
        ("pos_embedding.weight", &weights.position_embedding, [max_sequence_length, hidden_size]),
        ("multihead_attn.in_proj_weight", &weights.attention.in_proj_weight, [packed, hidden_size]),
        ("multihead_attn.out_proj.weight", &weights.attention.out_proj.weight, [hidden_size, hidden_size]),
        ("mlp.0.weight", &weights.feed_forward.expand.weight, [hidden_size, hidden_size]),
        ("mlp.3.weight", &weights.feed_forward.project.weight, [hidden_size, hidden_size]),
        ("fc_out.weight", &weights.output.weight, [num_classes, hidden_size]),
    ];
    for (name, matrix, expected) in matrices {
        check_shape(name, matrix.shape(), &expected)?;
    }

    let vectors: [(&'static str, &Array1<f32>, usize); 7] = [
        ("multihead_attn.in_proj_bias", &weights.attention.in_proj_bias, packed),
        ("multihead_attn.out_proj.bias", &weights.attention.out_proj.bias, hidden_size),
        ("mlp.0.bias", &weights.feed_forward.expand.bias, hidden_size),
        ("mlp.1.weight", &weights.feed_forward.norm.gamma, hidden_size),
        ("mlp.1.bias", &weights.feed_forward.norm.beta, hidden_size),
        ("mlp.3.bias", &weights.feed_forward.project.bias, hidden_size),
        ("fc_out.bias", &weights.output.bias, num_classes),
    ];
    for (name, vector, expected) in vectors {
        check_shape(name, vector.shape(), &[expected])?;
    }
    Ok(())
}

fn check_shape(
    name: &'static str,
    actual: &[usize],
    expected: &[usize],
) -> Result<(), TransformerError> {
    if actual == expected {
        Ok(())
    } else {
        Err(TransformerError::WeightShape {
            name,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}
