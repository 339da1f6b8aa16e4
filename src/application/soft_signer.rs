use super::signing::{SigningService, VaultAccess};
use crate::crypto::{CryptoCapability, StandardCrypto};
use crate::domain::{CurveTag, DomainResult, Signature};
use crate::storage::{tezos_format, KeyVault, UnlockPolicy, VaultConfig, VaultStatus};
use rand::rngs::OsRng;
use rand::Rng;
use secrecy::SecretString;
use std::sync::Arc;
use zeroize::Zeroizing;

const PASSPHRASE_LEN: usize = 32;
const PASSPHRASE_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()+_-=}{[]|:;\"/?.><,`~";

/// In-process ed25519 signer.
///
/// With a non-negative validity the key is kept encrypted under a random
/// passphrase that never leaves the signer, and is unlocked per call:
/// 0 decrypts for each call only, a positive value keeps the key
/// decrypted for that many seconds. A negative validity keeps the key in
/// the clear.
pub struct SoftSigner {
    access: VaultAccess,
    service: SigningService,
}

impl SoftSigner {
    pub fn create(secret_key: Zeroizing<Vec<u8>>, validity_seconds: i64) -> DomainResult<Self> {
        Self::create_with(
            secret_key,
            validity_seconds,
            Arc::new(StandardCrypto::default()),
            VaultConfig::default(),
        )
    }

    pub fn create_with(
        secret_key: Zeroizing<Vec<u8>>,
        validity_seconds: i64,
        crypto: Arc<dyn CryptoCapability>,
        config: VaultConfig,
    ) -> DomainResult<Self> {
        let access = if validity_seconds < 0 {
            let vault = KeyVault::new(secret_key, None, crypto.clone(), config)?;
            VaultAccess::unlocked(vault)
        } else {
            let passphrase = random_passphrase();
            let vault = KeyVault::encrypted(secret_key, &passphrase, crypto.clone(), config)?;
            VaultAccess::new(
                vault,
                Some(passphrase),
                UnlockPolicy::from_seconds(Some(validity_seconds)),
            )
        };

        Ok(Self {
            access,
            service: SigningService::new(crypto),
        })
    }

    /// Signer for an `edsk…` encoded secret key
    pub fn from_encoded(secret_key: &str, validity_seconds: i64) -> DomainResult<Self> {
        Self::create(tezos_format::decode_secret_key(secret_key)?, validity_seconds)
    }

    pub fn curve(&self) -> CurveTag {
        CurveTag::Ed25519
    }

    /// Raw signature over the digest of forged operation bytes
    pub async fn sign_operation(&self, bytes: &[u8]) -> DomainResult<Signature> {
        self.service.sign_operation(bytes, &self.access).await
    }

    /// `edsig…` signature over the UTF-8 bytes of `message`
    pub async fn sign_text(&self, message: &str) -> DomainResult<String> {
        let signature = self.service.sign_text(message, &self.access).await?;
        tezos_format::encode_signature(signature.as_bytes())
    }

    /// `edsig…` signature over the digest of `message`
    pub async fn sign_text_hash(&self, message: &str) -> DomainResult<String> {
        let signature = self.service.sign_text_hash(message, &self.access).await?;
        tezos_format::encode_signature(signature.as_bytes())
    }

    pub async fn status(&self) -> DomainResult<VaultStatus> {
        self.access.vault().status().await
    }

    /// Drop any cached plaintext now
    pub async fn lock(&self) -> DomainResult<()> {
        self.access.vault().lock().await
    }
}

fn random_passphrase() -> SecretString {
    let mut rng = OsRng;
    let passphrase: String = (0..PASSPHRASE_LEN)
        .map(|_| PASSPHRASE_CHARSET[rng.gen_range(0..PASSPHRASE_CHARSET.len())] as char)
        .collect();
    SecretString::new(passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    const SECRET_KEY: &str = "edskRgu8wHxjwayvnmpLDDijzD3VZDoAH7ZLqJWuG4zg7LbxmSWZWhtkSyM5Uby41rGfsBGk4iPKWHSDniFyCRv3j7YFCknyHH";
    const NACHOS_SIG: &str = "edsigtgAgZNqK9JvihdDj4BduDaQYJR5vfca9pbowNDtc4aTRnbUcFv4YmJbQDBK9XpMnhntW26uSAHtEtpCo84Rt7jPg3iYXqY";
    const NACHOS_HASH_SIG: &str = "edsigtnrQesbWjnoKmKYZZR9dSJYwkWMJw4rEq9xwRuehEhXzk1tCmvCAnTEgCE1zaYhpPHpECYapufEtFBSkj4vCSj1gKJLnZN";

    fn signer(validity: i64) -> SoftSigner {
        SoftSigner::create_with(
            tezos_format::decode_secret_key(SECRET_KEY).unwrap(),
            validity,
            Arc::new(StandardCrypto::new(KdfParams::light())),
            VaultConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_random_passphrase() {
        let a = random_passphrase();
        let b = random_passphrase();
        assert_eq!(a.expose_secret().chars().count(), PASSPHRASE_LEN);
        assert!(a
            .expose_secret()
            .bytes()
            .all(|c| PASSPHRASE_CHARSET.contains(&c)));
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[tokio::test]
    async fn test_plaintext_signer() {
        let signer = signer(-1);
        assert_eq!(signer.curve(), CurveTag::Ed25519);
        assert_eq!(signer.status().await.unwrap(), VaultStatus::Plaintext);
        assert_eq!(signer.sign_text("Nachos Guacamole").await.unwrap(), NACHOS_SIG);
        assert_eq!(
            signer.sign_text_hash("Nachos Guacamole").await.unwrap(),
            NACHOS_HASH_SIG
        );
    }

    #[tokio::test]
    async fn test_single_use_signer_stays_locked() {
        let signer = signer(0);
        assert_eq!(signer.status().await.unwrap(), VaultStatus::Locked);
        assert_eq!(signer.sign_text("Nachos Guacamole").await.unwrap(), NACHOS_SIG);
        assert_eq!(signer.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_signer_relocks() {
        let signer = signer(60);
        assert_eq!(
            signer.sign_text_hash("Nachos Guacamole").await.unwrap(),
            NACHOS_HASH_SIG
        );
        assert!(matches!(
            signer.status().await.unwrap(),
            VaultStatus::Unlocked { expires_at: Some(_) }
        ));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(signer.status().await.unwrap(), VaultStatus::Locked);

        // The signer still holds its passphrase, so it unlocks again
        assert_eq!(signer.sign_text("Nachos Guacamole").await.unwrap(), NACHOS_SIG);
    }

    #[tokio::test]
    async fn test_operation_signature() {
        let signer = signer(1);
        let bytes = hex::decode("03f58c43b69cf5fa7e6183ea3d899a480c9b5b3d6dadea68ee2e5c21ae1cc767ab6c0034a00f9b7964943b4ab583a8d1f7241a0cb9742cd20be807904eac02e80700002c0b1b21166a60a985fd8f11b567c445382fbd8300").unwrap();
        let signature = signer.sign_operation(&bytes).await.unwrap();
        assert_eq!(
            tezos_format::encode_signature(signature.as_bytes()).unwrap(),
            "edsigtyUK6MFziVBFXmEEnc1TuFsmcCCrke5nVG2uWLh4y1ydPFweD1C7Q4MDUqHQXkwEVwDmBMfp2ufc3MRi9MRM7kETd4vgnZ"
        );

        signer.lock().await.unwrap();
        assert_eq!(signer.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test]
    async fn test_maximum_validity_signs() {
        let signer = signer(i64::MAX);
        assert_eq!(signer.sign_text("Nachos Guacamole").await.unwrap(), NACHOS_SIG);
        assert_eq!(
            signer.status().await.unwrap(),
            VaultStatus::Unlocked { expires_at: None }
        );
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        assert!(SoftSigner::from_encoded("edskNotAKey", -1).is_err());
    }
}
