use serde::{Deserialize, Serialize};

/// Class probabilities for a single email.
///
/// The two fields sum to one within floating-point tolerance.
///
/// # Examples
///
/// ```
/// use phish_nano::api::{PhishingScore, Verdict};
///
/// let score = PhishingScore { not_phishing: 0.2, phishing: 0.8 };
/// assert_eq!(score.verdict(), Verdict::Phishing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhishingScore {
    pub not_phishing: f32,
    pub phishing: f32,
}

impl PhishingScore {
    /// Label the email with the more probable class. Ties count as legitimate.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.phishing > self.not_phishing {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        }
    }
}

/// Percentage of `scores` judged phishing, in `[0, 100]`.
///
/// Returns `None` for an empty batch, which carries no evidence either way.
///
/// # Examples
///
/// ```
/// use phish_nano::api::{PhishingScore, phishing_rate};
///
/// let scores = [
///     PhishingScore { not_phishing: 0.1, phishing: 0.9 },
///     PhishingScore { not_phishing: 0.7, phishing: 0.3 },
/// ];
/// assert_eq!(phishing_rate(&scores), Some(50.0));
/// ```
#[must_use]
pub fn phishing_rate(scores: &[PhishingScore]) -> Option<f32> {
    if scores.is_empty() {
        return None;
    }
    let flagged = scores
        .iter()
        .filter(|score| score.verdict() == Verdict::Phishing)
        .count();
    #[expect(clippy::cast_precision_loss, reason = "batch sizes fit in f32")]
    #[expect(clippy::float_arithmetic, reason = "percentage of a count")]
    let rate = flagged as f32 / scores.len() as f32 * 100.0;
    Some(rate)
}

/// Discrete outcome derived from a [`PhishingScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Legitimate,
    Phishing,
}
