//! Nano transformer phishing classifier with artefact verification.
//!
//! Text flows through three stages: the [`EmailTokenizer`] produces a
//! fixed-length [`TokenSequence`], the [`NanoTransformer`] scores every
//! position, and [`first_position_score`] turns row 0 into probabilities.
mod aggregation;
mod artefact;
mod config;
mod errors;
mod layers;
mod tokenizer;
mod transformer;
mod weights;

pub use aggregation::first_position_score;
pub use artefact::{ModelArtefact, compute_sha256};
pub use config::{DEFAULT_PAD_TOKEN, DEFAULT_UNK_TOKEN, NanoClassifierConfig};
pub use errors::{
    AggregationError, ArtefactError, DetectorError, TokenizerError, TransformerError,
    WeightsError,
};
pub use layers::{AttentionWeights, LAYER_NORM_EPS, LayerNormWeights, LinearWeights};
pub use tokenizer::{EmailTokenizer, TokenSequence};
pub use transformer::{FeedForwardWeights, NanoTransformer, NanoTransformerWeights};
pub use weights::load_transformer;

use tracing::{debug, info};

use crate::{api::PhishingScore, providers::TextProcessor};

/// Immutable inference context pairing a tokenizer with its transformer.
///
/// Build once at startup and share by reference or `Arc`; scoring never
/// mutates the detector, so concurrent calls need no locking.
#[derive(Debug, Clone)]
pub struct PhishingDetector {
    tokenizer: EmailTokenizer,
    transformer: NanoTransformer,
}

impl PhishingDetector {
    /// Builds a detector from verified on-disk artefacts.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError`] when the hyperparameters are invalid, an
    /// artefact checksum does not match, or the vocabulary and weights cannot
    /// be loaded or disagree with each other.
    ///
    /// # Examples
    /// ```no_run
    /// use phish_nano::providers::nano::{DetectorError, ModelArtefact, NanoClassifierConfig, PhishingDetector};
    /// use phish_nano::{ModelHyperparameters, TextProcessor};
    ///
    /// # fn main() -> Result<(), DetectorError> {
    /// let config = NanoClassifierConfig {
    ///     weights: ModelArtefact {
    ///         path: std::path::PathBuf::from("/models/nano_transformer.safetensors"),
    ///         sha256: "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef".into(),
    ///     },
    ///     vocabulary: ModelArtefact {
    ///         path: std::path::PathBuf::from("/models/vocab.json"),
    ///         sha256: "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210".into(),
    ///     },
    ///     hyperparameters: ModelHyperparameters::default(),
    ///     pad_token: "<pad>".into(),
    ///     unk_token: "<unk>".into(),
    /// };
    /// let detector = PhishingDetector::new(config)?;
    /// let score = detector.process("Your account has been suspended. Verify your password here.")?;
    /// # println!("{score:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: NanoClassifierConfig) -> Result<Self, DetectorError> {
        let hyperparameters = config.hyperparameters.validate()?;

        config.weights.verify()?;
        config.vocabulary.verify()?;

        let tokenizer = EmailTokenizer::from_vocabulary_file(
            &config.vocabulary.path,
            hyperparameters.max_sequence_length,
            &config.pad_token,
            &config.unk_token,
        )?;
        let transformer = load_transformer(&config.weights.path, hyperparameters)?;
        Self::from_parts(tokenizer, transformer)
    }

    /// Pairs an already-built tokenizer and transformer.
    ///
    /// # Errors
    ///
    /// Returns an error when the tokenizer's sequence length differs from the
    /// transformer's, or the vocabulary holds ids the transformer cannot embed.
    pub fn from_parts(
        tokenizer: EmailTokenizer,
        transformer: NanoTransformer,
    ) -> Result<Self, DetectorError> {
        let hyperparameters = transformer.hyperparameters();
        if tokenizer.sequence_length() != hyperparameters.max_sequence_length {
            return Err(DetectorError::SequenceLengthMismatch {
                tokenizer: tokenizer.sequence_length(),
                transformer: hyperparameters.max_sequence_length,
            });
        }
        let embeddable = usize::try_from(tokenizer.max_id())
            .is_ok_and(|max_id| max_id < hyperparameters.vocab_size);
        if !embeddable {
            return Err(DetectorError::VocabularyMismatch {
                max_id: tokenizer.max_id(),
                vocab_size: hyperparameters.vocab_size,
            });
        }
        info!(
            sequence_length = hyperparameters.max_sequence_length,
            vocab_size = hyperparameters.vocab_size,
            "phishing detector ready"
        );
        Ok(Self {
            tokenizer,
            transformer,
        })
    }

    #[must_use]
    pub fn tokenizer(&self) -> &EmailTokenizer {
        &self.tokenizer
    }

    #[must_use]
    pub fn transformer(&self) -> &NanoTransformer {
        &self.transformer
    }

    /// Scores an email body.
    ///
    /// Blank input is not rejected here: it encodes to an all-padding
    /// sequence and still yields a valid distribution.
    ///
    /// # Errors
    ///
    /// Returns an error only when a component contract is violated.
    pub fn score(&self, email_body: &str) -> Result<PhishingScore, DetectorError> {
        let sequence = self.tokenizer.encode(email_body)?;
        let logits = self.transformer.classify(&sequence)?;
        let score = first_position_score(&logits)?;
        debug!(
            not_phishing = score.not_phishing,
            phishing = score.phishing,
            "scored email"
        );
        Ok(score)
    }

    /// Scores a batch of email bodies in order.
    ///
    /// Pair the result with [`phishing_rate`](crate::api::phishing_rate) to
    /// summarise a mailbox.
    ///
    /// # Errors
    ///
    /// Stops at the first body that fails to score and returns its error.
    pub fn score_many<'a>(
        &self,
        email_bodies: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<PhishingScore>, DetectorError> {
        let scores = email_bodies
            .into_iter()
            .map(|body| self.score(body))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = scores.len(), "scored batch");
        Ok(scores)
    }
}

impl TextProcessor for PhishingDetector {
    type Output = PhishingScore;
    type Error = DetectorError;

    fn process(&self, input: &str) -> Result<Self::Output, Self::Error> {
        self.score(input)
    }
}
