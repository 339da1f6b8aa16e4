use crate::domain::{DomainError, DomainResult};
use bip39::{Language, Mnemonic};
use secrecy::SecretString;
use zeroize::Zeroizing;

/// Word counts BIP-39 defines
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Generate a new random BIP39 mnemonic phrase
pub fn generate_mnemonic(word_count: usize) -> DomainResult<SecretString> {
    check_word_count(word_count)?;
    let mnemonic = Mnemonic::generate(word_count)
        .map_err(|e| DomainError::InvalidMnemonic(format!("Failed to generate mnemonic: {}", e)))?;
    Ok(SecretString::new(mnemonic.to_string()))
}

/// Validate a mnemonic phrase: word count first, then words and checksum
pub fn validate_mnemonic(phrase: &str) -> DomainResult<()> {
    parse(phrase).map(|_| ())
}

/// 64-byte BIP-39 seed for a phrase and optional passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> DomainResult<Zeroizing<[u8; 64]>> {
    let mnemonic = parse(phrase)?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Normalize a mnemonic phrase (trim whitespace, lowercase, etc.)
pub fn normalize_mnemonic(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse(phrase: &str) -> DomainResult<Mnemonic> {
    check_word_count(phrase.split_whitespace().count())?;
    Mnemonic::parse_in(Language::English, phrase)
        .map_err(|e| DomainError::InvalidMnemonic(format!("Invalid mnemonic: {}", e)))
}

fn check_word_count(count: usize) -> DomainResult<()> {
    if !VALID_WORD_COUNTS.contains(&count) {
        return Err(DomainError::InvalidMnemonic(format!(
            "{} words given, expected one of {:?}",
            count, VALID_WORD_COUNTS
        )));
    }
    Ok(())
}
