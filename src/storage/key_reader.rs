use crate::crypto::{normalize_mnemonic, validate_mnemonic};
use crate::domain::{DomainError, DomainResult};
use secrecy::SecretString;
use std::path::Path;

/// Read mnemonics and encoded keys given inline or as a file path
pub struct KeyReader;

impl KeyReader {
    /// Read a mnemonic from a file or return it as-is if it's not a path
    pub fn read_mnemonic(mnemonic_or_path: &str) -> DomainResult<SecretString> {
        let path = Path::new(mnemonic_or_path.trim());

        if path.is_file() {
            Self::read_mnemonic_from_file(path)
        } else {
            let normalized = normalize_mnemonic(mnemonic_or_path);
            validate_mnemonic(&normalized)?;
            Ok(SecretString::new(normalized))
        }
    }

    /// Read a mnemonic from a plain text file
    pub fn read_mnemonic_from_file(path: &Path) -> DomainResult<SecretString> {
        let contents = std::fs::read_to_string(path).map_err(|_| DomainError::MnemonicFileNotFound {
            path: path.to_path_buf(),
        })?;

        let normalized = normalize_mnemonic(&contents);
        validate_mnemonic(&normalized)?;

        Ok(SecretString::new(normalized))
    }

    /// Read an encoded secret key (`edsk…`) inline or from a file
    pub fn read_secret_key(key_or_path: &str) -> DomainResult<SecretString> {
        let path = Path::new(key_or_path.trim());

        let encoded = if path.is_file() {
            std::fs::read_to_string(path)?
        } else {
            key_or_path.to_string()
        };

        let encoded = encoded.trim();
        if !encoded.starts_with("edsk") {
            return Err(DomainError::InvalidKeyEncoding(
                "secret key must be an edsk string".to_string(),
            ));
        }

        Ok(SecretString::new(encoded.to_string()))
    }
}
