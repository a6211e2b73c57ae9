use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::errors::ArtefactError;

/// File-based model artefact that must match a recorded checksum before loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArtefact {
    /// Location of the artefact on disk.
    pub path: PathBuf,
    /// Expected SHA-256 checksum expressed as hexadecimal.
    pub sha256: String,
}

impl ModelArtefact {
    /// Verifies the artefact checksum against the expected digest.
    ///
    /// # Errors
    ///
    /// Returns `ChecksumMismatch` when the computed digest does not match `sha256` and propagates I/O errors while reading the file.
    pub fn verify(&self) -> Result<(), ArtefactError> {
        let actual = compute_sha256(&self.path)?;
        let expected = normalise_hex(&self.sha256);
        if actual == expected {
            debug!(path = %self.path.display(), "artefact checksum verified");
            Ok(())
        } else {
            Err(ArtefactError::ChecksumMismatch {
                path: self.path.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Computes the SHA-256 digest of the file at `path` as lowercase hexadecimal.
///
/// # Errors
///
/// Returns I/O errors from opening or reading the file.
pub fn compute_sha256(path: &Path) -> Result<String, ArtefactError> {
    let io_error = |source| ArtefactError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(io_error)?;
        if read == 0 {
            break;
        }
        let chunk = buffer.get(..read).ok_or_else(|| {
            io_error(std::io::Error::other(
                "read reported bytes beyond buffer length",
            ))
        })?;
        hasher.update(chunk);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
