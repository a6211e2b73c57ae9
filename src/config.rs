//! Model hyperparameters agreed between the vocabulary, the weights, and the
//! transformer at load time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of classes scored by the classifier: not phishing, phishing.
pub const CLASS_COUNT: usize = 2;

/// Errors returned by [`ModelHyperparameters::validate`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HyperparameterError {
    #[error("{name} must be greater than 0")]
    Zero { name: &'static str },
    #[error("hidden_size {hidden_size} is not divisible by num_heads {num_heads}")]
    IndivisibleHeads { hidden_size: usize, num_heads: usize },
    #[error("num_classes must be {expected} but found {actual}")]
    ClassCount { expected: usize, actual: usize },
    #[error("hidden_size {hidden_size} is too large for the packed attention projection")]
    Oversized { hidden_size: usize },
}

/// Shape parameters of the nano transformer.
///
/// Defaults match the published phishing model: a vocabulary of 120 833
/// tokens, 128 hidden units split over 4 heads, and 256 positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelHyperparameters {
    /// Vocabulary cardinality `V`; ids must fall in `[0, V)`.
    pub vocab_size: usize,
    /// Hidden dimension `H`.
    pub hidden_size: usize,
    /// Attention heads; must divide `hidden_size`.
    pub num_heads: usize,
    /// Fixed sequence length `L`.
    pub max_sequence_length: usize,
    /// Output classes `C`. Always [`CLASS_COUNT`].
    pub num_classes: usize,
}

impl Default for ModelHyperparameters {
    fn default() -> Self {
        Self {
            vocab_size: 120_833,
            hidden_size: 128,
            num_heads: 4,
            max_sequence_length: 256,
            num_classes: CLASS_COUNT,
        }
    }
}

impl ModelHyperparameters {
    /// Ensure the shape parameters describe a buildable model.
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is zero, the heads do not split the
    /// hidden dimension evenly, the packed query/key/value width overflows,
    /// or the class count is not [`CLASS_COUNT`].
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, HyperparameterError> {
        for (name, value) in [
            ("vocab_size", self.vocab_size),
            ("hidden_size", self.hidden_size),
            ("num_heads", self.num_heads),
            ("max_sequence_length", self.max_sequence_length),
        ] {
            if value == 0 {
                return Err(HyperparameterError::Zero { name });
            }
        }
        if self.hidden_size % self.num_heads != 0 {
            return Err(HyperparameterError::IndivisibleHeads {
                hidden_size: self.hidden_size,
                num_heads: self.num_heads,
            });
        }
        if self.packed_projection_width().is_none() {
            return Err(HyperparameterError::Oversized {
                hidden_size: self.hidden_size,
            });
        }
        if self.num_classes != CLASS_COUNT {
            return Err(HyperparameterError::ClassCount {
                expected: CLASS_COUNT,
                actual: self.num_classes,
            });
        }
        Ok(self)
    }

    /// Rows of the packed query/key/value projection (`3H`), or `None` when
    /// that overflows.
    #[must_use]
    pub fn packed_projection_width(&self) -> Option<usize> {
        self.hidden_size.checked_mul(3)
    }

    /// Width of a single attention head.
    #[must_use]
    pub fn head_dim(&self) -> usize {
        self.hidden_size.checked_div(self.num_heads).unwrap_or(0)
    }
}
