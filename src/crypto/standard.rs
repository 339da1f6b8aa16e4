use super::capability::{CryptoCapability, CryptoFailure, NONCE_LEN, SALT_LEN, SYMMETRIC_KEY_LEN};
use super::ed25519::Ed25519;
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{aead::Aead, KeyInit, XChaCha20Poly1305, XNonce};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

/// Argon2id cost parameters for passphrase hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// Interactive profile: 64 MiB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Cheap profile for tests and constrained hosts
    pub fn light() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Default capability: sp-core ed25519, blake2b-256, HMAC-SHA512,
/// Argon2id and XChaCha20-Poly1305
#[derive(Debug, Clone, Default)]
pub struct StandardCrypto {
    kdf: KdfParams,
}

impl StandardCrypto {
    pub fn new(kdf: KdfParams) -> Self {
        Self { kdf }
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    fn random_bytes(len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }

    fn cipher(key: &[u8]) -> Result<XChaCha20Poly1305, CryptoFailure> {
        XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoFailure::InvalidLength {
            what: "symmetric key",
            expected: "32",
            actual: key.len(),
        })
    }
}

impl CryptoCapability for StandardCrypto {
    fn hmac_sha512(&self, key: &[u8], data: &[u8]) -> Result<Zeroizing<[u8; 64]>, CryptoFailure> {
        let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
            .map_err(|e| CryptoFailure::Primitive(format!("HMAC key rejected: {}", e)))?;
        mac.update(data);

        let mut out = Zeroizing::new([0u8; 64]);
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }

    fn ed25519_public_key(&self, secret: &[u8]) -> Result<[u8; 32], CryptoFailure> {
        let pair = Ed25519::from_secret(secret)?;
        Ok(Ed25519::public_bytes(&pair))
    }

    fn ed25519_sign(&self, message: &[u8], secret: &[u8]) -> Result<[u8; 64], CryptoFailure> {
        let pair = Ed25519::from_secret(secret)?;
        Ok(Ed25519::sign(&pair, message))
    }

    fn ed25519_verify(&self, signature: &[u8], message: &[u8], public_key: &[u8]) -> bool {
        Ed25519::verify(signature, message, public_key)
    }

    fn digest32(&self, data: &[u8]) -> [u8; 32] {
        sp_core::hashing::blake2_256(data)
    }

    fn random_salt(&self) -> Vec<u8> {
        Self::random_bytes(SALT_LEN)
    }

    fn random_nonce(&self) -> Vec<u8> {
        Self::random_bytes(NONCE_LEN)
    }

    fn pwhash(&self, passphrase: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, CryptoFailure> {
        let params = Params::new(
            self.kdf.memory_kib,
            self.kdf.iterations,
            self.kdf.parallelism,
            Some(SYMMETRIC_KEY_LEN),
        )
        .map_err(|e| CryptoFailure::Primitive(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
        argon2
            .hash_password_into(passphrase, salt, &mut key[..])
            .map_err(|e| CryptoFailure::Primitive(format!("Key derivation failed: {}", e)))?;

        Ok(key)
    }

    fn authenticated_encrypt(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoFailure> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoFailure::InvalidLength {
                what: "nonce",
                expected: "24",
                actual: nonce.len(),
            });
        }

        let sealed = Self::cipher(key)?
            .encrypt(XNonce::from_slice(nonce), plaintext)
            .map_err(|e| CryptoFailure::Primitive(format!("Encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn authenticated_decrypt(
        &self,
        ciphertext: &[u8],
        key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoFailure> {
        if ciphertext.len() <= NONCE_LEN {
            return Err(CryptoFailure::AuthenticationFailed);
        }

        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        let plaintext = Self::cipher(key)?
            .decrypt(XNonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoFailure::AuthenticationFailed)?;

        Ok(Zeroizing::new(plaintext))
    }
}
