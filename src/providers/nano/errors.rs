use std::path::PathBuf;

use thiserror::Error;

use crate::config::HyperparameterError;

/// Errors raised while reading or verifying on-disk model artefacts.
#[derive(Debug, Error)]
pub enum ArtefactError {
    #[error("failed to read artefact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artefact at {path} expected SHA-256 {expected} but found {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Errors produced while building or running the email tokenizer.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("failed to load vocabulary from {path}: {source}")]
    LoadVocabulary {
        path: PathBuf,
        #[source]
        source: tokenizers::Error,
    },
    #[error("failed to configure tokenizer truncation: {0}")]
    ConfigureTruncation(#[source] tokenizers::Error),
    #[error("tokenizer requires max_sequence_length > 0")]
    ZeroSequenceLength,
    #[error("reserved token \"{token}\" is missing from the vocabulary")]
    MissingReservedToken { token: String },
    #[error("failed to encode text: {0}")]
    Encode(#[source] tokenizers::Error),
    #[error("tokenizer produced sequence of length {actual} but expected {expected}")]
    SequenceLength { expected: usize, actual: usize },
}

/// Contract violations detected by the transformer.
///
/// Every variant signals that preprocessing and model configuration have
/// drifted apart; none of them is recoverable by retrying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformerError {
    #[error(transparent)]
    Hyperparameters(#[from] HyperparameterError),
    #[error("weight \"{name}\" has shape {actual:?} but expected {expected:?}")]
    WeightShape {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("token sequence has length {actual} but the model expects {expected}")]
    SequenceLength { expected: usize, actual: usize },
    #[error("token id {id} at position {position} is outside the vocabulary of {vocab_size}")]
    TokenOutOfRange {
        position: usize,
        id: u32,
        vocab_size: usize,
    },
}

/// Errors raised while reading transformer weights from a safetensors file.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("failed to read weights at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse safetensors at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: safetensors::SafeTensorError,
    },
    #[error("tensor \"{name}\" missing from weights file")]
    MissingTensor { name: String },
    #[error("tensor \"{name}\" has dtype {dtype} but only F32 is supported")]
    UnsupportedDtype { name: String, dtype: String },
    #[error("tensor \"{name}\" has shape {actual:?} but expected {expected:?}")]
    TensorShape {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("failed to arrange tensor \"{name}\": {source}")]
    Layout {
        name: String,
        #[source]
        source: ndarray::ShapeError,
    },
    #[error(transparent)]
    Transformer(#[from] TransformerError),
}

/// Errors produced when turning logits into class probabilities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("logits tensor has no rows")]
    EmptyLogits,
    #[error("logits tensor has {actual} classes but expected {expected}")]
    ClassCount { expected: usize, actual: usize },
}

/// Errors returned by [`PhishingDetector`](super::PhishingDetector).
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error(transparent)]
    Hyperparameters(#[from] HyperparameterError),
    #[error(transparent)]
    Artefact(#[from] ArtefactError),
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    Transformer(#[from] TransformerError),
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error("tokenizer emits {tokenizer} positions but the transformer expects {transformer}")]
    SequenceLengthMismatch { tokenizer: usize, transformer: usize },
    #[error("vocabulary contains id {max_id} but the transformer only embeds {vocab_size} tokens")]
    VocabularyMismatch { max_id: u32, vocab_size: usize },
}
