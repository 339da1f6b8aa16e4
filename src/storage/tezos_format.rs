use crate::domain::{DomainError, DomainResult};
use zeroize::Zeroizing;

/// Base58check prefixes for the ed25519 string forms Tezos uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TezosPrefix {
    /// `edsk…` over a 64-byte `seed ‖ public key` secret
    SecretKey,
    /// `edsk…` over a bare 32-byte seed
    SecretSeed,
    /// `edpk…`
    PublicKey,
    /// `edsig…`
    Signature,
}

impl TezosPrefix {
    pub fn bytes(&self) -> &'static [u8] {
        match self {
            Self::SecretKey => &[43, 246, 78, 7],
            Self::SecretSeed => &[13, 15, 58, 7],
            Self::PublicKey => &[13, 15, 37, 217],
            Self::Signature => &[9, 245, 205, 134, 18],
        }
    }

    pub fn payload_len(&self) -> usize {
        match self {
            Self::SecretKey => 64,
            Self::SecretSeed => 32,
            Self::PublicKey => 32,
            Self::Signature => 64,
        }
    }

    /// Leading characters of the encoded string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretKey | Self::SecretSeed => "edsk",
            Self::PublicKey => "edpk",
            Self::Signature => "edsig",
        }
    }
}

/// Base58check-encode `payload` behind `prefix`
pub fn encode_with_prefix(payload: &[u8], prefix: TezosPrefix) -> DomainResult<String> {
    if payload.len() != prefix.payload_len() {
        return Err(DomainError::InvalidKeyEncoding(format!(
            "{} payload must be {} bytes, got {}",
            prefix.as_str(),
            prefix.payload_len(),
            payload.len()
        )));
    }

    let mut raw = Zeroizing::new(Vec::with_capacity(prefix.bytes().len() + payload.len()));
    raw.extend_from_slice(prefix.bytes());
    raw.extend_from_slice(payload);
    Ok(bs58::encode(&raw[..]).with_check().into_string())
}

/// Decode a base58check string and strip `prefix`, checking the payload length
pub fn decode_with_prefix(encoded: &str, prefix: TezosPrefix) -> DomainResult<Zeroizing<Vec<u8>>> {
    let raw = Zeroizing::new(
        bs58::decode(encoded.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| DomainError::InvalidKeyEncoding(format!("base58check: {}", e)))?,
    );

    let tag = prefix.bytes();
    if !raw.starts_with(tag) {
        return Err(DomainError::InvalidKeyEncoding(format!(
            "expected a {} string",
            prefix.as_str()
        )));
    }

    let payload = &raw[tag.len()..];
    if payload.len() != prefix.payload_len() {
        return Err(DomainError::InvalidKeyEncoding(format!(
            "{} payload must be {} bytes, got {}",
            prefix.as_str(),
            prefix.payload_len(),
            payload.len()
        )));
    }

    Ok(Zeroizing::new(payload.to_vec()))
}

/// Decode an `edsk…` string in either its 64-byte or 32-byte seed form
pub fn decode_secret_key(encoded: &str) -> DomainResult<Zeroizing<Vec<u8>>> {
    decode_with_prefix(encoded, TezosPrefix::SecretKey)
        .or_else(|_| decode_with_prefix(encoded, TezosPrefix::SecretSeed))
}

pub fn encode_public_key(public_key: &[u8]) -> DomainResult<String> {
    encode_with_prefix(public_key, TezosPrefix::PublicKey)
}

pub fn decode_public_key(encoded: &str) -> DomainResult<[u8; 32]> {
    let bytes = decode_with_prefix(encoded, TezosPrefix::PublicKey)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

pub fn encode_signature(signature: &[u8]) -> DomainResult<String> {
    encode_with_prefix(signature, TezosPrefix::Signature)
}

pub fn decode_signature(encoded: &str) -> DomainResult<[u8; 64]> {
    let bytes = decode_with_prefix(encoded, TezosPrefix::Signature)?;
    let mut out = [0u8; 64];
    out.copy_from_slice(&bytes);
    Ok(out)
}
