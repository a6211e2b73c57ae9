use std::path::Path;

use tokenizers::{
    PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection,
    TruncationParams, TruncationStrategy, models::wordlevel::WordLevel,
    pre_tokenizers::whitespace::WhitespaceSplit,
};
use tracing::{debug, trace};

use super::errors::TokenizerError;
use crate::text::normalize_email;

/// Fixed-length sequence of vocabulary ids fed to the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    ids: Box<[u32]>,
}

impl TokenSequence {
    /// Wraps raw ids without checking them against any vocabulary.
    ///
    /// The transformer validates length and id range before use.
    #[must_use]
    pub fn from_ids(ids: impl Into<Box<[u32]>>) -> Self {
        Self { ids: ids.into() }
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Word-level tokenizer producing right-padded, right-truncated sequences.
///
/// Unknown words map to the reserved unknown id and never produce an error.
#[derive(Debug, Clone)]
pub struct EmailTokenizer {
    tokenizer: Tokenizer,
    sequence_length: usize,
    pad_id: u32,
    unk_id: u32,
    max_id: u32,
}

impl EmailTokenizer {
    /// Builds a tokenizer from a JSON vocabulary mapping tokens to ids.
    ///
    /// # Errors
    ///
    /// Returns an error when the vocabulary cannot be read, lacks the padding
    /// or unknown token, or `sequence_length` is zero.
    pub fn from_vocabulary_file(
        path: &Path,
        sequence_length: usize,
        pad_token: &str,
        unk_token: &str,
    ) -> Result<Self, TokenizerError> {
        if sequence_length == 0 {
            return Err(TokenizerError::ZeroSequenceLength);
        }

        let model = WordLevel::from_file(&path.to_string_lossy(), unk_token.to_owned())
            .map_err(|source| TokenizerError::LoadVocabulary {
                path: path.to_path_buf(),
                source,
            })?;
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(WhitespaceSplit));

        let reserved_id = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| TokenizerError::MissingReservedToken {
                    token: token.to_owned(),
                })
        };
        let pad_id = reserved_id(pad_token)?;
        let unk_id = reserved_id(unk_token)?;
        let max_id = tokenizer
            .get_vocab(false)
            .values()
            .copied()
            .max()
            .unwrap_or(0);

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: sequence_length,
                strategy: TruncationStrategy::OnlyFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(TokenizerError::ConfigureTruncation)?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(sequence_length),
            direction: PaddingDirection::Right,
            pad_to_multiple_of: None,
            pad_id,
            pad_type_id: 0,
            pad_token: pad_token.to_owned(),
        }));

        debug!(
            path = %path.display(),
            vocabulary = tokenizer.get_vocab_size(false),
            sequence_length,
            "loaded email vocabulary"
        );

        Ok(Self {
            tokenizer,
            sequence_length,
            pad_id,
            unk_id,
            max_id,
        })
    }

    /// Normalises `text` and maps it to exactly `sequence_length` ids.
    ///
    /// Empty text yields an all-padding sequence.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying tokenizer fails internally or
    /// breaks the fixed-length contract.
    pub fn encode(&self, text: &str) -> Result<TokenSequence, TokenizerError> {
        let normalised = normalize_email(text);
        let encoding = self
            .tokenizer
            .encode(normalised.as_str(), false)
            .map_err(TokenizerError::Encode)?;

        let ids = encoding.get_ids();
        if ids.len() != self.sequence_length {
            return Err(TokenizerError::SequenceLength {
                expected: self.sequence_length,
                actual: ids.len(),
            });
        }
        trace!(
            padding = ids.iter().filter(|id| **id == self.pad_id).count(),
            unknown = ids.iter().filter(|id| **id == self.unk_id).count(),
            "encoded email"
        );
        Ok(TokenSequence::from_ids(ids))
    }

    #[must_use]
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    #[must_use]
    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    #[must_use]
    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }

    /// Largest id present in the vocabulary.
    #[must_use]
    pub fn max_id(&self) -> u32 {
        self.max_id
    }
}
