use super::curve::CurveTag;
use super::error::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A restored or generated identity: public key plus optional secret
#[derive(Clone)]
pub struct KeyMaterial {
    /// Curve the key lives on
    pub curve: CurveTag,
    /// Raw public key bytes
    pub public_key: [u8; 32],
    /// Encoded secret key (`edsk…`), wrapped so it is never printed by accident
    pub secret_key: Option<SecretString>,
    /// Derivation path used to generate this key
    pub derivation_path: Option<String>,
    /// Additional metadata
    pub metadata: KeyMetadata,
}

impl KeyMaterial {
    /// Create new key material with required fields
    pub fn new(curve: CurveTag, public_key: [u8; 32], secret_key: Option<SecretString>) -> Self {
        Self {
            curve,
            public_key,
            secret_key,
            derivation_path: None,
            metadata: KeyMetadata::default(),
        }
    }

    /// Set the derivation path
    pub fn with_derivation_path(mut self, path: impl Into<String>) -> Self {
        self.derivation_path = Some(path.into());
        self
    }

    /// Set metadata
    pub fn with_metadata(mut self, metadata: KeyMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check if this key material includes the secret key
    pub fn has_secret(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Drop the secret, keeping only public information
    pub fn public_only(mut self) -> Self {
        self.secret_key = None;
        self
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("curve", &self.curve)
            .field("public_key", &hex::encode(self.public_key))
            .field("has_secret", &self.has_secret())
            .field("derivation_path", &self.derivation_path)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Additional metadata about a key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Human-readable description
    pub description: String,
    /// Creation timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Encoded public key (`edpk…`)
    pub encoded_public_key: Option<String>,
}

impl Default for KeyMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            created_at: Some(Utc::now()),
            encoded_public_key: None,
        }
    }
}

impl KeyMetadata {
    /// Create new metadata with a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the encoded public key
    pub fn with_encoded_public_key(mut self, encoded: impl Into<String>) -> Self {
        self.encoded_public_key = Some(encoded.into());
        self
    }
}

/// Raw 64-byte ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = DomainError;

    fn try_from(bytes: &[u8]) -> DomainResult<Self> {
        let array = <[u8; 64]>::try_from(bytes).map_err(|_| {
            DomainError::InvalidKeyEncoding(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}
