//! Behaviour tests for scoring emails with the fixture detector.

use phish_nano::{PhishingScore, TokenSequence};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
mod support;
use support::{FixtureDetector, approx_eq, fixture_detector};

#[derive(Default)]
struct DetectorContext {
    loaded: RefCell<Option<FixtureDetector>>,
    sequence: RefCell<Option<TokenSequence>>,
    score: RefCell<Option<PhishingScore>>,
}

#[fixture]
fn detector_context() -> DetectorContext {
    DetectorContext::default()
}

impl DetectorContext {
    fn score_email(&self, text: &str) {
        let loaded = self.loaded.borrow();
        let detector = &loaded
            .as_ref()
            .unwrap_or_else(|| panic!("detector not loaded"))
            .detector;
        let sequence = detector
            .tokenizer()
            .encode(text)
            .unwrap_or_else(|e| panic!("encode {text:?}: {e}"));
        let score = detector
            .score(text)
            .unwrap_or_else(|e| panic!("score {text:?}: {e}"));
        *self.sequence.borrow_mut() = Some(sequence);
        *self.score.borrow_mut() = Some(score);
    }

    fn sequence(&self) -> TokenSequence {
        self.sequence
            .borrow()
            .clone()
            .unwrap_or_else(|| panic!("no sequence recorded"))
    }

    fn score(&self) -> PhishingScore {
        (*self.score.borrow()).unwrap_or_else(|| panic!("no score recorded"))
    }
}

#[given("the fixture detector")]
fn given_detector(#[from(detector_context)] ctx: &DetectorContext) {
    *ctx.loaded.borrow_mut() = Some(fixture_detector());
}

#[when("scoring a blank email")]
fn when_scoring_blank(#[from(detector_context)] ctx: &DetectorContext) {
    ctx.score_email("");
}

#[when("scoring the email \"{text}\"")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "BDD macro injects owned value"
)]
fn when_scoring(text: String, #[from(detector_context)] ctx: &DetectorContext) {
    ctx.score_email(&text);
}

#[then("every token is padding")]
fn then_all_padding(#[from(detector_context)] ctx: &DetectorContext) {
    let pad = ctx
        .loaded
        .borrow()
        .as_ref()
        .map(|loaded| loaded.detector.tokenizer().pad_id())
        .unwrap_or_else(|| panic!("detector not loaded"));
    assert!(ctx.sequence().ids().iter().all(|id| *id == pad));
}

#[then("the first {count:usize} tokens are unknown")]
fn then_unknown(count: usize, #[from(detector_context)] ctx: &DetectorContext) {
    let unk = ctx
        .loaded
        .borrow()
        .as_ref()
        .map(|loaded| loaded.detector.tokenizer().unk_id())
        .unwrap_or_else(|| panic!("detector not loaded"));
    let sequence = ctx.sequence();
    assert!(sequence.ids().iter().take(count).all(|id| *id == unk));
}

#[then("the score is a probability distribution")]
fn then_distribution(#[from(detector_context)] ctx: &DetectorContext) {
    let score = ctx.score();
    assert!(score.not_phishing >= 0.0 && score.phishing >= 0.0);
    #[expect(clippy::float_arithmetic, reason = "test sums probabilities")]
    let total = score.not_phishing + score.phishing;
    assert!(approx_eq(total, 1.0, 1e-6), "{score:?} sums to {total}");
}

#[then("the score matches the email \"{text}\"")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "BDD macro injects owned value"
)]
fn then_matches(text: String, #[from(detector_context)] ctx: &DetectorContext) {
    let expected = ctx
        .loaded
        .borrow()
        .as_ref()
        .map(|loaded| loaded.detector.score(&text))
        .unwrap_or_else(|| panic!("detector not loaded"))
        .unwrap_or_else(|e| panic!("score {text:?}: {e}"));
    assert_eq!(ctx.score(), expected);
}

#[scenario(path = "tests/features/detector.feature", index = 0)]
fn blank_email(detector_context: DetectorContext) {
    let _ = detector_context;
}

#[scenario(path = "tests/features/detector.feature", index = 1)]
fn unknown_words(detector_context: DetectorContext) {
    let _ = detector_context;
}

#[scenario(path = "tests/features/detector.feature", index = 2)]
fn overflow_ignored(detector_context: DetectorContext) {
    let _ = detector_context;
}
