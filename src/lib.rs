//! Phishing email classification with a nano transformer.
//!
//! Email text is normalised and tokenised into a fixed-length id sequence,
//! scored by a single-block transformer, and the first position's logits are
//! turned into `{not_phishing, phishing}` probabilities.

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod providers;
pub mod text;

pub use api::{PhishingScore, Verdict, phishing_rate};
#[cfg(feature = "cli")]
pub use cli::PhishcArgs;
pub use config::{CLASS_COUNT, HyperparameterError, ModelHyperparameters};
pub use providers::nano::{
    DetectorError, EmailTokenizer, NanoClassifierConfig, NanoTransformer, PhishingDetector,
    TokenSequence,
};
pub use providers::{EmailClassifier, TextProcessor};

#[doc(hidden)]
pub mod tests;
