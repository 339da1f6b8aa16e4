use crate::crypto::{mnemonic_to_seed, normalize_mnemonic, DerivationEngine, Ed25519};
use crate::domain::{CurveTag, DerivationPath, DomainError, DomainResult, KeyMaterial, KeyMetadata};
use crate::storage::{tezos_format, KeyReader, TezosPrefix};
use secrecy::{ExposeSecret, SecretString};
use sp_core::ed25519::Pair;
use std::path::Path;
use tracing::debug;

/// On-demand identity restoration (without saving to files)
pub struct KeyDerivation;

impl KeyDerivation {
    /// Restore an identity from a BIP-39 mnemonic.
    ///
    /// With a derivation path the key is the SLIP-10 node at that path of the
    /// 64-byte seed. Without one the first 32 seed bytes are used directly,
    /// which is how fundraiser and early wallet keys were produced.
    pub fn restore_from_mnemonic(
        mnemonic: &str,
        password: &str,
        derivation_path: Option<&str>,
        expected_public_key: Option<&str>,
    ) -> DomainResult<KeyMaterial> {
        let normalized = normalize_mnemonic(mnemonic);
        let seed = mnemonic_to_seed(&normalized, password)?;

        let key = match derivation_path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => {
                let path = DerivationPath::parse(path)?;
                let engine = DerivationEngine::default();
                let root = engine.from_seed(&seed[..], CurveTag::Ed25519)?;
                let node = engine.derive_parsed(&root, &path)?;
                let secret = node.to_secret_key(engine.crypto())?;
                let pair = Ed25519::from_secret(&secret[..])?;
                Self::to_key_material(&pair, Some(path.to_string()))?
            }
            None => {
                let pair = Ed25519::from_seed(&seed[..32])?;
                Self::to_key_material(&pair, None)?
            }
        };

        if let Some(expected) = expected_public_key {
            let derived = key.metadata.encoded_public_key.clone().unwrap_or_default();
            if derived != expected.trim() {
                return Err(DomainError::PublicKeyMismatch {
                    expected: expected.trim().to_string(),
                    derived,
                });
            }
        }

        debug!(path = ?key.derivation_path, "Restored identity from mnemonic");
        Ok(key)
    }

    /// Restore the standard Tezos account `m/44'/1729'/ACCOUNT'/0'`
    pub fn restore_account(mnemonic: &str, password: &str, account: u32) -> DomainResult<KeyMaterial> {
        let path = DerivationPath::tezos(account)?.to_string();
        Self::restore_from_mnemonic(mnemonic, password, Some(&path), None)
    }

    /// Restore a fundraiser identity; the BIP-39 passphrase is email followed by password
    pub fn restore_from_fundraiser(
        mnemonic: &str,
        email: &str,
        password: &str,
        expected_public_key: Option<&str>,
    ) -> DomainResult<KeyMaterial> {
        let passphrase = format!("{}{}", email, password);
        Self::restore_from_mnemonic(mnemonic, &passphrase, None, expected_public_key)
    }

    /// Restore from a mnemonic given inline or as a file path
    pub fn restore_from_mnemonic_source(
        mnemonic_or_path: &str,
        password: &str,
        derivation_path: Option<&str>,
        expected_public_key: Option<&str>,
    ) -> DomainResult<KeyMaterial> {
        let mnemonic = KeyReader::read_mnemonic(mnemonic_or_path)?;
        Self::restore_from_mnemonic(
            mnemonic.expose_secret(),
            password,
            derivation_path,
            expected_public_key,
        )
    }

    /// Restore from a mnemonic file
    pub fn restore_from_mnemonic_file(
        mnemonic_file: &Path,
        password: &str,
        derivation_path: Option<&str>,
    ) -> DomainResult<KeyMaterial> {
        let mnemonic = KeyReader::read_mnemonic_from_file(mnemonic_file)?;
        Self::restore_from_mnemonic(mnemonic.expose_secret(), password, derivation_path, None)
    }

    /// Recompute the public half of an `edsk…` secret key
    pub fn restore_from_secret_key(secret_key: &str) -> DomainResult<KeyMaterial> {
        let secret = tezos_format::decode_secret_key(secret_key)?;
        let pair = Ed25519::from_secret(&secret)?;
        Self::to_key_material(&pair, None)
    }

    fn to_key_material(pair: &Pair, derivation_path: Option<String>) -> DomainResult<KeyMaterial> {
        let public_key = Ed25519::public_bytes(pair);
        let secret = Ed25519::secret_key_bytes(pair);
        let encoded_secret = tezos_format::encode_with_prefix(&secret[..], TezosPrefix::SecretKey)?;

        let metadata = KeyMetadata::default()
            .with_description("Tezos ed25519 key")
            .with_encoded_public_key(tezos_format::encode_public_key(&public_key)?);

        let mut key_material = KeyMaterial::new(
            CurveTag::Ed25519,
            public_key,
            Some(SecretString::new(encoded_secret)),
        )
        .with_metadata(metadata);

        if let Some(path) = derivation_path {
            key_material = key_material.with_derivation_path(path);
        }

        Ok(key_material)
    }
}
