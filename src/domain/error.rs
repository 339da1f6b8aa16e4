use super::curve::CurveTag;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Domain-level errors for tezkey operations
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid seed length: {actual} bytes (expected {expected})")]
    InvalidSeedLength {
        expected: &'static str,
        actual: usize,
    },

    #[error("Unhardened derivation unsupported for {curve}: index {index}")]
    UnhardenedDerivationUnsupported {
        curve: CurveTag,
        index: u32,
    },

    #[error("Invalid derivation path {path:?}: {reason}")]
    InvalidDerivationPath {
        path: String,
        reason: String,
    },

    #[error("Passphrase required to unlock the encrypted key")]
    PassphraseRequired,

    #[error("Decryption failed (wrong passphrase or corrupted ciphertext)")]
    DecryptionFailed,

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Timed out after {waited:?} waiting for the key vault")]
    VaultBusy {
        waited: Duration,
    },

    #[error("No tokio runtime available: {0}")]
    RuntimeUnavailable(String),

    #[error("Invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("Derived public key {derived} does not match expected {expected}")]
    PublicKeyMismatch {
        expected: String,
        derived: String,
    },

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("Mnemonic file not found: {}", .path.display())]
    MnemonicFileNotFound {
        path: PathBuf,
    },

    #[error("Cryptographic operation failed: {0}")]
    CryptoError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

pub type DomainResult<T> = Result<T, DomainError>;
