use ndarray::Array2;

use super::errors::AggregationError;
use crate::{api::PhishingScore, config::CLASS_COUNT};

/// Converts the first row of a logits tensor into class probabilities.
///
/// Only position 0 carries the classification signal; the remaining rows
/// are ignored.
///
/// # Errors
///
/// Returns an error when the tensor has no rows or not exactly
/// [`CLASS_COUNT`] columns.
pub fn first_position_score(logits: &Array2<f32>) -> Result<PhishingScore, AggregationError> {
    if logits.ncols() != CLASS_COUNT {
        return Err(AggregationError::ClassCount {
            expected: CLASS_COUNT,
            actual: logits.ncols(),
        });
    }
    let (Some(&not_phishing), Some(&phishing)) = (logits.get((0, 0)), logits.get((0, 1))) else {
        return Err(AggregationError::EmptyLogits);
    };
    let [not_phishing, phishing] = softmax_pair(not_phishing, phishing);
    Ok(PhishingScore {
        not_phishing,
        phishing,
    })
}

/// Two-way softmax with the maximum subtracted before exponentiating.
#[expect(clippy::float_arithmetic, reason = "softmax requires float operations")]
fn softmax_pair(first: f32, second: f32) -> [f32; 2] {
    let max = first.max(second);
    let a = (first - max).exp();
    let b = (second - max).exp();
    let total = a + b;
    [a / total, b / total]
}
