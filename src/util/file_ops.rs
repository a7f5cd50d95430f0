// File Operations for the RSA operation log
// Writes one pretty-printed JSON record per encrypt/decrypt

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::rsa::RsaKeyPair;

/// Errors that can occur while writing the operation log
#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Result type for file operations
pub type FileResult<T> = Result<T, FileError>;

/// One encrypt/decrypt exchange, as written to disk
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    pub p: String,
    pub q: String,
    pub public_key: String,
    pub private_key: String,
    pub plain_text: String,
    pub encrypted_text: String,
    pub decrypted_text: String,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

impl OperationLog {
    /// Capture a finished operation. `decrypted_text` is whatever decrypting
    /// `encrypted_text` with the same key produced.
    pub fn new(
        keypair: &RsaKeyPair,
        plain_text: &str,
        encrypted_text: &str,
        decrypted_text: &str,
    ) -> Self {
        Self {
            p: keypair.p().to_string(),
            q: keypair.q().to_string(),
            public_key: keypair.public_key_string(),
            private_key: keypair.private_key_string(),
            plain_text: plain_text.to_string(),
            encrypted_text: encrypted_text.to_string(),
            decrypted_text: decrypted_text.to_string(),
            created_at: unix_now().as_secs(),
        }
    }
}

fn unix_now() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Write `log` into `dir`, creating the directory if needed.
/// Returns the path of the new file.
pub fn write_operation_log(dir: &Path, log: &OperationLog) -> FileResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let now = unix_now();
    let path = dir.join(format!("rsa-{}-{:09}.json", now.as_secs(), now.subsec_nanos()));

    let mut file = File::create(&path)?;
    file.write_all(serde_json::to_string_pretty(log)?.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(path)
}
