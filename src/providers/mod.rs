//! Text classification providers.
//!
//! Defines the `TextProcessor` trait implemented by the phishing detector so
//! outer layers can hold any classifier behind a single interface.

pub mod nano;

/// Processes text to produce a structured, thread-safe output.
pub trait TextProcessor {
    /// Structured result returned by the processor.
    ///
    /// Outputs must be `Send + Sync + 'static` so they can be safely shared
    /// across threads and stored in trait objects without borrowing.
    type Output: Send + Sync + 'static;
    /// Error type returned when processing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process the supplied text.
    ///
    /// # Errors
    ///
    /// Returns an error if processing fails.
    fn process(&self, input: &str) -> Result<Self::Output, Self::Error>;
}

/// Scores email bodies as phishing or legitimate.
pub type EmailClassifier<E> =
    dyn TextProcessor<Output = crate::api::PhishingScore, Error = E> + Send + Sync + 'static;
