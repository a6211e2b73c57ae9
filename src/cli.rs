//! CLI argument types and layered configuration for the `phishc` binary.
//! Loads from CLI args, environment (prefix `PHISHC_`), and optional config
//! files.

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use ortho_config::OrthoError;
use serde::Deserialize;
use std::{
    io::Read,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    config::ModelHyperparameters,
    text::html_to_text,
    providers::nano::{
        DEFAULT_PAD_TOKEN, DEFAULT_UNK_TOKEN, DetectorError, ModelArtefact, NanoClassifierConfig,
    },
};

/// Errors raised by the `phishc` front end.
#[derive(Debug, Error)]
pub enum PhishcError {
    #[error(transparent)]
    Config(#[from] OrthoError),
    #[error("missing required setting `{name}`")]
    MissingSetting { name: &'static str },
    #[error("failed to read email from {path}: {source}")]
    ReadEmail {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read email from stdin: {0}")]
    ReadStdin(#[source] std::io::Error),
    #[error("no email body provided")]
    EmptyEmail,
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error("failed to serialise score: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Command-line arguments for the `phishc` binary.
///
/// Artefact locations and model shape can come from command line arguments,
/// environment variables (prefixed with `PHISHC_`), or a configuration file.
/// Unset hyperparameters fall back to [`ModelHyperparameters::default`].
///
/// # Examples
///
/// Load from a configuration file:
/// ```
/// use phish_nano::cli::PhishcArgs;
/// use ortho_config::OrthoConfig;
/// use std::io::Write;
/// use tempfile::NamedTempFile;
///
/// let mut file = NamedTempFile::new().expect("create temp file");
/// writeln!(file, "max_sequence_length = 128").expect("write config");
/// let path = file.path().to_str().expect("path str");
/// let args = PhishcArgs::load_from_iter(["phishc", "--config-path", path])
///     .expect("load args from config path");
/// assert_eq!(args.max_sequence_length, Some(128));
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "PHISHC")]
pub struct PhishcArgs {
    /// File containing the email body. Read from stdin when absent.
    #[serde(default)]
    pub email_path: Option<PathBuf>,

    /// Treat the email as HTML and score only its readable text.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub html: bool,

    /// Safetensors file with the transformer weights.
    #[serde(default)]
    pub weights_path: Option<PathBuf>,

    /// Expected SHA-256 of the weights file.
    #[serde(default)]
    pub weights_sha256: Option<String>,

    /// JSON vocabulary mapping tokens to ids.
    #[serde(default)]
    pub vocabulary_path: Option<PathBuf>,

    /// Expected SHA-256 of the vocabulary file.
    #[serde(default)]
    pub vocabulary_sha256: Option<String>,

    #[serde(default)]
    pub vocab_size: Option<usize>,

    #[serde(default)]
    pub hidden_size: Option<usize>,

    #[serde(default)]
    pub num_heads: Option<usize>,

    #[serde(default)]
    pub max_sequence_length: Option<usize>,

    /// Padding token; defaults to `<pad>`.
    #[serde(default)]
    pub pad_token: Option<String>,

    /// Unknown-word token; defaults to `<unk>`.
    #[serde(default)]
    pub unk_token: Option<String>,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl PhishcArgs {
    /// Load configuration solely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if any variable cannot be parsed.
    pub fn load_from_env() -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Env::prefixed("PHISHC_"))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if the file cannot be read or parsed.
    pub fn load_from_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from environment variables and a file path.
    ///
    /// Environment variables override values from the file.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if either source contains invalid values.
    pub fn load_from_env_and_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("PHISHC_"))
            .extract()
            .map_err(Into::into)
    }

    /// Shape parameters with unset values taken from the defaults.
    #[must_use]
    pub fn hyperparameters(&self) -> ModelHyperparameters {
        let defaults = ModelHyperparameters::default();
        ModelHyperparameters {
            vocab_size: self.vocab_size.unwrap_or(defaults.vocab_size),
            hidden_size: self.hidden_size.unwrap_or(defaults.hidden_size),
            num_heads: self.num_heads.unwrap_or(defaults.num_heads),
            max_sequence_length: self
                .max_sequence_length
                .unwrap_or(defaults.max_sequence_length),
            num_classes: defaults.num_classes,
        }
    }

    /// Assemble the classifier configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PhishcError::MissingSetting`] when an artefact path or
    /// checksum is not configured.
    pub fn classifier_config(&self) -> Result<NanoClassifierConfig, PhishcError> {
        Ok(NanoClassifierConfig {
            weights: ModelArtefact {
                path: required(self.weights_path.clone(), "weights_path")?,
                sha256: required(self.weights_sha256.clone(), "weights_sha256")?,
            },
            vocabulary: ModelArtefact {
                path: required(self.vocabulary_path.clone(), "vocabulary_path")?,
                sha256: required(self.vocabulary_sha256.clone(), "vocabulary_sha256")?,
            },
            hyperparameters: self.hyperparameters(),
            pad_token: self
                .pad_token
                .clone()
                .unwrap_or_else(|| DEFAULT_PAD_TOKEN.to_owned()),
            unk_token: self
                .unk_token
                .clone()
                .unwrap_or_else(|| DEFAULT_UNK_TOKEN.to_owned()),
        })
    }

    /// Read the email body from `email_path`, or from `stdin` when unset.
    ///
    /// With `html` set, markup is stripped before the blank check.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be read or the body is blank.
    pub fn read_email(&self, stdin: impl Read) -> Result<String, PhishcError> {
        let body = match self.email_path.as_deref() {
            Some(path) => read_email_file(path)?,
            None => {
                let mut body = String::new();
                let mut stdin = stdin;
                stdin
                    .read_to_string(&mut body)
                    .map_err(PhishcError::ReadStdin)?;
                body
            }
        };
        let body = if self.html { html_to_text(&body) } else { body };
        if body.trim().is_empty() {
            return Err(PhishcError::EmptyEmail);
        }
        Ok(body)
    }
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T, PhishcError> {
    value.ok_or(PhishcError::MissingSetting { name })
}

fn read_email_file(path: &Path) -> Result<String, PhishcError> {
    std::fs::read_to_string(path).map_err(|source| PhishcError::ReadEmail {
        path: path.to_path_buf(),
        source,
    })
}
