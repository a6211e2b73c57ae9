use ortho_config::OrthoConfig;
use phish_nano::{PhishingDetector, cli::PhishcArgs, cli::PhishcError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[expect(
    clippy::result_large_err,
    reason = "OrthoError originates from external crate and is acceptable here"
)]
fn main() -> Result<(), PhishcError> {
    // Logs go to stderr so stdout carries only the JSON score.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = PhishcArgs::load()?;
    let body = args.read_email(std::io::stdin().lock())?;
    let detector = PhishingDetector::new(args.classifier_config()?)?;
    let score = detector.score(&body)?;
    info!(verdict = ?score.verdict(), "classified email");
    println!("{}", serde_json::to_string(&score)?);
    Ok(())
}
