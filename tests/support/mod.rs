#![allow(dead_code, reason = "each test crate uses a different subset")]

use phish_nano::{PhishingDetector, tests::support::fixture_config};
use tempfile::TempDir;

pub use phish_nano::tests::support::approx_eq;

/// Fixture detector plus the directory holding its artefacts.
pub struct FixtureDetector {
    pub dir: TempDir,
    pub detector: PhishingDetector,
}

#[must_use]
pub fn fixture_detector() -> FixtureDetector {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("create temp dir: {e}"));
    let detector = PhishingDetector::new(fixture_config(dir.path()))
        .unwrap_or_else(|e| panic!("build fixture detector: {e}"));
    FixtureDetector { dir, detector }
}
