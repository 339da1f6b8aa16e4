use super::key_derivation::KeyDerivation;
use crate::crypto::generate_mnemonic;
use crate::domain::{DomainResult, KeyMaterial};
use secrecy::{ExposeSecret, SecretString};

/// Default mnemonic size (256 bits of entropy)
pub const DEFAULT_WORD_COUNT: usize = 24;

/// Key generation use case
pub struct KeyGeneration;

impl KeyGeneration {
    /// Generate a new random mnemonic
    pub fn generate_mnemonic(word_count: usize) -> DomainResult<SecretString> {
        generate_mnemonic(word_count)
    }

    /// Generate a new identity with a random mnemonic.
    ///
    /// Returns the identity together with the mnemonic that recovers it.
    pub fn generate_identity(
        word_count: usize,
        password: &str,
        derivation_path: Option<&str>,
    ) -> DomainResult<(KeyMaterial, SecretString)> {
        let mnemonic = generate_mnemonic(word_count)?;
        let key_material = KeyDerivation::restore_from_mnemonic(
            mnemonic.expose_secret(),
            password,
            derivation_path,
            None,
        )?;

        Ok((key_material, mnemonic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_mnemonic_sizes() {
        let mnemonic = KeyGeneration::generate_mnemonic(DEFAULT_WORD_COUNT).unwrap();
        assert_eq!(mnemonic.expose_secret().split_whitespace().count(), 24);

        let short = KeyGeneration::generate_mnemonic(12).unwrap();
        assert_eq!(short.expose_secret().split_whitespace().count(), 12);

        assert!(KeyGeneration::generate_mnemonic(11).is_err());
    }

    #[test]
    fn test_generate_identity_is_recoverable() {
        let (key, mnemonic) =
            KeyGeneration::generate_identity(15, "extra words", Some("m/44'/1729'/0'/0'")).unwrap();
        assert!(key.has_secret());
        assert_eq!(key.derivation_path.as_deref(), Some("m/44'/1729'/0'/0'"));

        let restored = KeyDerivation::restore_from_mnemonic(
            mnemonic.expose_secret(),
            "extra words",
            Some("m/44'/1729'/0'/0'"),
            None,
        )
        .unwrap();
        assert_eq!(restored.public_key, key.public_key);
    }

    #[test]
    fn test_generate_identity_without_path() {
        let (key, _mnemonic) = KeyGeneration::generate_identity(12, "", None).unwrap();
        assert_eq!(key.derivation_path, None);
        assert!(key
            .metadata
            .encoded_public_key
            .as_deref()
            .unwrap()
            .starts_with("edpk"));
    }
}
