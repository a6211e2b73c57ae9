//! Configuration for the nano transformer phishing classifier.

use serde::{Deserialize, Serialize};

use super::artefact::ModelArtefact;
use crate::config::ModelHyperparameters;

/// Default token used to right-pad short emails.
pub const DEFAULT_PAD_TOKEN: &str = "<pad>";
/// Default token standing in for out-of-vocabulary words.
pub const DEFAULT_UNK_TOKEN: &str = "<unk>";

/// Artefacts and shape parameters needed to build a
/// [`PhishingDetector`](super::PhishingDetector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NanoClassifierConfig {
    /// Safetensors file holding the transformer weights.
    pub weights: ModelArtefact,
    /// JSON object mapping each vocabulary token to its id.
    pub vocabulary: ModelArtefact,
    /// Shape parameters the weights were trained with.
    #[serde(default)]
    pub hyperparameters: ModelHyperparameters,
    /// Token inserted when padding shorter sequences. Must be in the vocabulary.
    #[serde(default = "default_pad_token")]
    pub pad_token: String,
    /// Token substituted for unknown words. Must be in the vocabulary.
    #[serde(default = "default_unk_token")]
    pub unk_token: String,
}

fn default_pad_token() -> String {
    DEFAULT_PAD_TOKEN.to_owned()
}

fn default_unk_token() -> String {
    DEFAULT_UNK_TOKEN.to_owned()
}
