use crate::domain::DomainError;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt length handed to `pwhash`
pub const SALT_LEN: usize = 16;

/// XChaCha20-Poly1305 nonce length
pub const NONCE_LEN: usize = 24;

/// Symmetric key length produced by `pwhash`
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Failures reported by a crypto capability
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoFailure {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid {what} length: {actual} (expected {expected})")]
    InvalidLength {
        what: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{0}")]
    Primitive(String),
}

impl From<CryptoFailure> for DomainError {
    fn from(failure: CryptoFailure) -> Self {
        match failure {
            CryptoFailure::AuthenticationFailed => DomainError::DecryptionFailed,
            other => DomainError::CryptoError(other.to_string()),
        }
    }
}

/// Primitives the derivation engine, vault and signer are built on.
///
/// Implementations must be usable from any thread; the vault shares one
/// instance across its relock timer task.
pub trait CryptoCapability: Send + Sync {
    fn hmac_sha512(&self, key: &[u8], data: &[u8]) -> Result<Zeroizing<[u8; 64]>, CryptoFailure>;

    /// Public key for a 32-byte seed or a 64-byte `seed ‖ public key` secret
    fn ed25519_public_key(&self, secret: &[u8]) -> Result<[u8; 32], CryptoFailure>;

    fn ed25519_sign(&self, message: &[u8], secret: &[u8]) -> Result<[u8; 64], CryptoFailure>;

    fn ed25519_verify(&self, signature: &[u8], message: &[u8], public_key: &[u8]) -> bool;

    /// 32-byte digest used by hash-then-sign
    fn digest32(&self, data: &[u8]) -> [u8; 32];

    fn random_salt(&self) -> Vec<u8>;

    fn random_nonce(&self) -> Vec<u8>;

    fn pwhash(&self, passphrase: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, CryptoFailure>;

    /// Returns `nonce ‖ sealed box`
    fn authenticated_encrypt(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoFailure>;

    /// Inverse of `authenticated_encrypt`; a tag mismatch is `AuthenticationFailed`
    fn authenticated_decrypt(
        &self,
        ciphertext: &[u8],
        key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_mapping() {
        assert!(matches!(
            DomainError::from(CryptoFailure::AuthenticationFailed),
            DomainError::DecryptionFailed
        ));

        let err = DomainError::from(CryptoFailure::InvalidLength {
            what: "key",
            expected: "32",
            actual: 3,
        });
        match err {
            DomainError::CryptoError(msg) => assert!(msg.contains("invalid key length: 3")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
