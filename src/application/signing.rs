use crate::crypto::{CryptoCapability, StandardCrypto};
use crate::domain::{DomainError, DomainResult, Signature};
use crate::storage::{tezos_format, KeyVault, UnlockPolicy};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

/// How a signing call reaches its key: the vault plus the unlock
/// arguments to use when the vault is locked
pub struct VaultAccess {
    vault: KeyVault,
    passphrase: Option<SecretString>,
    policy: UnlockPolicy,
}

impl VaultAccess {
    pub fn new(vault: KeyVault, passphrase: Option<SecretString>, policy: UnlockPolicy) -> Self {
        Self {
            vault,
            passphrase,
            policy,
        }
    }

    /// Access without a passphrase; works for plaintext or already unlocked vaults
    pub fn unlocked(vault: KeyVault) -> Self {
        Self::new(vault, None, UnlockPolicy::SingleUse)
    }

    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }

    async fn with_key<T, F>(&self, f: F) -> DomainResult<T>
    where
        F: FnOnce(&[u8]) -> DomainResult<T>,
    {
        self.vault
            .with_usable_key(self.passphrase.as_ref(), self.policy, f)
            .await
    }
}

/// Signs payloads with vault-held ed25519 keys.
///
/// Operation bytes are always hashed before signing. Text can be signed
/// raw (`sign_text`) or hashed (`sign_text_hash`); callers pick one.
#[derive(Clone)]
pub struct SigningService {
    crypto: Arc<dyn CryptoCapability>,
}

impl Default for SigningService {
    fn default() -> Self {
        Self::new(Arc::new(StandardCrypto::default()))
    }
}

impl SigningService {
    pub fn new(crypto: Arc<dyn CryptoCapability>) -> Self {
        Self { crypto }
    }

    /// Sign the 32-byte digest of `bytes`
    pub async fn sign_operation(&self, bytes: &[u8], access: &VaultAccess) -> DomainResult<Signature> {
        let digest = self.crypto.digest32(bytes);
        self.sign_payload(&digest, access).await
    }

    /// Sign the UTF-8 bytes of `message` as they are
    pub async fn sign_text(&self, message: &str, access: &VaultAccess) -> DomainResult<Signature> {
        self.sign_payload(message.as_bytes(), access).await
    }

    /// Sign the digest of the UTF-8 bytes of `message`
    pub async fn sign_text_hash(&self, message: &str, access: &VaultAccess) -> DomainResult<Signature> {
        self.sign_operation(message.as_bytes(), access).await
    }

    async fn sign_payload(&self, payload: &[u8], access: &VaultAccess) -> DomainResult<Signature> {
        let crypto = &self.crypto;
        let bytes = access
            .with_key(|key| {
                crypto
                    .ed25519_sign(payload, key)
                    .map_err(|e| DomainError::SigningFailed(e.to_string()))
            })
            .await?;

        debug!(payload_len = payload.len(), "Signed payload");
        Ok(Signature::from_bytes(bytes))
    }

    pub fn verify(&self, signature: &Signature, message: &[u8], public_key: &[u8]) -> bool {
        self.crypto
            .ed25519_verify(signature.as_bytes(), message, public_key)
    }

    /// Check an `edsig…` signature over `bytes` against an `edpk…` key,
    /// hashing `bytes` first when `prehash` is set
    pub fn check_signature(
        &self,
        signature: &str,
        bytes: &[u8],
        public_key: &str,
        prehash: bool,
    ) -> DomainResult<bool> {
        let signature = signature.trim();
        let public_key = public_key.trim();
        if !signature.starts_with("edsig") || !public_key.starts_with("edpk") {
            return Err(DomainError::InvalidKeyEncoding(format!(
                "signature/key prefix mismatch {}/{}",
                signature.get(..5).unwrap_or(signature),
                public_key.get(..4).unwrap_or(public_key)
            )));
        }

        let signature = tezos_format::decode_signature(signature)?;
        let public_key = tezos_format::decode_public_key(public_key)?;

        let valid = if prehash {
            let digest = self.crypto.digest32(bytes);
            self.crypto.ed25519_verify(&signature, &digest, &public_key)
        } else {
            self.crypto.ed25519_verify(&signature, bytes, &public_key)
        };
        Ok(valid)
    }

    /// `check_signature` over the UTF-8 bytes of `message`
    pub fn check_text_signature(
        &self,
        signature: &str,
        message: &str,
        public_key: &str,
        prehash: bool,
    ) -> DomainResult<bool> {
        self.check_signature(signature, message.as_bytes(), public_key, prehash)
    }
}
