use crate::crypto::{CryptoCapability, CryptoFailure, StandardCrypto};
use crate::domain::{DomainError, DomainResult};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// How long a decrypted key stays usable after an unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockPolicy {
    /// Decrypt for this call only; the vault stays locked
    SingleUse,
    /// Keep the plaintext cached until the window elapses
    For(Duration),
    /// Keep the plaintext cached until `lock()` is called
    Permanent,
}

impl UnlockPolicy {
    /// Map a timeout in seconds: 0 is single use, positive is timed,
    /// negative or absent is permanent
    pub fn from_seconds(seconds: Option<i64>) -> Self {
        match seconds {
            Some(0) => Self::SingleUse,
            Some(s) if s > 0 => Self::For(Duration::from_secs(s.unsigned_abs())),
            _ => Self::Permanent,
        }
    }
}

/// Vault tuning
#[derive(Debug, Clone, Copy)]
pub struct VaultConfig {
    /// Maximum wait for the vault lock before failing with `VaultBusy`;
    /// `None` waits forever
    pub lock_wait: Option<Duration>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            lock_wait: Some(Duration::from_secs(30)),
        }
    }
}

/// Externally visible vault state; never carries key bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    Plaintext,
    Locked,
    Unlocked { expires_at: Option<Instant> },
}

/// Borrowed copy of the usable key, scrubbed on drop
pub struct UsableKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl UsableKey {
    fn copy_of(bytes: &[u8]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes.to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for UsableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UsableKey(<{} bytes redacted>)", self.bytes.len())
    }
}

#[derive(Clone, Default)]
struct SealedSecret {
    /// `nonce ‖ sealed box`
    ciphertext: Vec<u8>,
    salt: Vec<u8>,
}

enum VaultState {
    PlaintextAlways {
        key: Zeroizing<Vec<u8>>,
    },
    LockedEncrypted {
        sealed: SealedSecret,
    },
    UnlockedTimed {
        plaintext: Zeroizing<Vec<u8>>,
        sealed: SealedSecret,
        expires_at: Option<Instant>,
    },
}

struct VaultInner {
    state: VaultState,
    relock: Option<JoinHandle<()>>,
}

impl VaultInner {
    fn cancel_relock(&mut self) {
        if let Some(handle) = self.relock.take() {
            handle.abort();
        }
    }

    /// Drop the cached plaintext and go back to the locked state
    fn relock(&mut self) {
        if let VaultState::UnlockedTimed { sealed, .. } = &mut self.state {
            let sealed = std::mem::take(sealed);
            // Replacing the state drops the Zeroizing plaintext, which wipes it
            self.state = VaultState::LockedEncrypted { sealed };
            debug!("Key vault relocked");
        }
    }

    fn relock_if_expired(&mut self, now: Instant) {
        if let VaultState::UnlockedTimed {
            expires_at: Some(at),
            ..
        } = &self.state
        {
            if now >= *at {
                self.relock();
            }
        }
    }

    fn unlock(&mut self, plaintext: Zeroizing<Vec<u8>>, expires_at: Option<Instant>) {
        if let VaultState::LockedEncrypted { sealed } = &mut self.state {
            let sealed = std::mem::take(sealed);
            self.state = VaultState::UnlockedTimed {
                plaintext,
                sealed,
                expires_at,
            };
        }
    }

    fn status(&self) -> VaultStatus {
        match &self.state {
            VaultState::PlaintextAlways { .. } => VaultStatus::Plaintext,
            VaultState::LockedEncrypted { .. } => VaultStatus::Locked,
            VaultState::UnlockedTimed { expires_at, .. } => VaultStatus::Unlocked {
                expires_at: *expires_at,
            },
        }
    }
}

impl Drop for VaultInner {
    fn drop(&mut self) {
        self.cancel_relock();
    }
}

/// Holds one secret key, either in the clear or encrypted at rest.
///
/// All state transitions, including the timer-driven relock, run under a
/// single mutex per vault. Clones share the same vault.
///
/// The async methods need a tokio runtime (lock timeout, decrypt worker,
/// relock timer); called from any other executor they fail with
/// `DomainError::RuntimeUnavailable`.
#[derive(Clone)]
pub struct KeyVault {
    inner: Arc<Mutex<VaultInner>>,
    crypto: Arc<dyn CryptoCapability>,
    config: VaultConfig,
}

impl KeyVault {
    /// Vault that always hands out the key as given
    pub fn plaintext(secret: Zeroizing<Vec<u8>>) -> Self {
        Self::with_state(
            VaultState::PlaintextAlways { key: secret },
            Arc::new(StandardCrypto::default()),
            VaultConfig::default(),
        )
    }

    /// Vault that encrypts the key under `passphrase` right away.
    /// Neither the plaintext nor the passphrase is retained.
    pub fn encrypted(
        secret: Zeroizing<Vec<u8>>,
        passphrase: &SecretString,
        crypto: Arc<dyn CryptoCapability>,
        config: VaultConfig,
    ) -> DomainResult<Self> {
        let salt = crypto.random_salt();
        let key = crypto.pwhash(passphrase.expose_secret().as_bytes(), &salt)?;
        let nonce = crypto.random_nonce();
        let ciphertext = crypto.authenticated_encrypt(&secret, &nonce, &key[..])?;

        debug!(bytes = secret.len(), "Key vault sealed");
        Ok(Self::with_state(
            VaultState::LockedEncrypted {
                sealed: SealedSecret { ciphertext, salt },
            },
            crypto,
            config,
        ))
    }

    /// Plaintext vault without a passphrase, encrypted vault with one
    pub fn new(
        secret: Zeroizing<Vec<u8>>,
        passphrase: Option<&SecretString>,
        crypto: Arc<dyn CryptoCapability>,
        config: VaultConfig,
    ) -> DomainResult<Self> {
        match passphrase {
            Some(passphrase) => Self::encrypted(secret, passphrase, crypto, config),
            None => Ok(Self::with_state(
                VaultState::PlaintextAlways { key: secret },
                crypto,
                config,
            )),
        }
    }

    fn with_state(state: VaultState, crypto: Arc<dyn CryptoCapability>, config: VaultConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VaultInner {
                state,
                relock: None,
            })),
            crypto,
            config,
        }
    }

    /// Get a usable copy of the key, unlocking per `policy` if needed
    pub async fn get_usable_key(
        &self,
        passphrase: Option<&SecretString>,
        policy: UnlockPolicy,
    ) -> DomainResult<UsableKey> {
        let runtime = current_runtime()?;
        let mut inner = self.acquire().await?;
        inner.relock_if_expired(Instant::now());

        let sealed = match &inner.state {
            VaultState::PlaintextAlways { key } => return Ok(UsableKey::copy_of(key)),
            VaultState::UnlockedTimed { plaintext, .. } => return Ok(UsableKey::copy_of(plaintext)),
            VaultState::LockedEncrypted { sealed } => sealed.clone(),
        };

        let passphrase = passphrase.ok_or(DomainError::PassphraseRequired)?;
        // The guard stays held across the decrypt so the relock timer cannot interleave
        let plaintext = self.open(&runtime, sealed, passphrase.clone()).await?;
        let usable = UsableKey::copy_of(&plaintext);

        match policy {
            UnlockPolicy::SingleUse => {
                debug!("Key vault opened for a single use");
            }
            UnlockPolicy::For(window) => match Instant::now().checked_add(window) {
                Some(expires_at) => {
                    inner.unlock(plaintext, Some(expires_at));
                    self.schedule_relock(&runtime, &mut inner, expires_at);
                    debug!(window_ms = window.as_millis() as u64, "Key vault unlocked");
                }
                None => {
                    inner.cancel_relock();
                    inner.unlock(plaintext, None);
                    debug!(
                        window_secs = window.as_secs(),
                        "Unlock window past the clock range, unlocked until explicitly locked"
                    );
                }
            },
            UnlockPolicy::Permanent => {
                inner.cancel_relock();
                inner.unlock(plaintext, None);
                debug!("Key vault unlocked until explicitly locked");
            }
        }

        Ok(usable)
    }

    /// Run `f` with the usable key; the key copy is wiped when `f` returns
    pub async fn with_usable_key<T, F>(
        &self,
        passphrase: Option<&SecretString>,
        policy: UnlockPolicy,
        f: F,
    ) -> DomainResult<T>
    where
        F: FnOnce(&[u8]) -> DomainResult<T>,
    {
        let key = self.get_usable_key(passphrase, policy).await?;
        f(key.as_bytes())
    }

    /// Relock an unlocked vault now, timed or permanent.
    /// Plaintext vaults and already locked vaults are left as they are.
    pub async fn lock(&self) -> DomainResult<()> {
        let mut inner = self.acquire().await?;
        inner.cancel_relock();
        inner.relock();
        Ok(())
    }

    pub async fn status(&self) -> DomainResult<VaultStatus> {
        let mut inner = self.acquire().await?;
        inner.relock_if_expired(Instant::now());
        Ok(inner.status())
    }

    async fn acquire(&self) -> DomainResult<MutexGuard<'_, VaultInner>> {
        current_runtime()?;
        match self.config.lock_wait {
            Some(wait) => tokio::time::timeout(wait, self.inner.lock())
                .await
                .map_err(|_| {
                    warn!(waited_ms = wait.as_millis() as u64, "Timed out waiting for key vault");
                    DomainError::VaultBusy { waited: wait }
                }),
            None => Ok(self.inner.lock().await),
        }
    }

    /// Run the passphrase hash and decrypt on the blocking pool
    async fn open(
        &self,
        runtime: &Handle,
        sealed: SealedSecret,
        passphrase: SecretString,
    ) -> DomainResult<Zeroizing<Vec<u8>>> {
        let crypto = Arc::clone(&self.crypto);
        let opened = runtime
            .spawn_blocking(move || -> Result<Zeroizing<Vec<u8>>, CryptoFailure> {
                let key = crypto.pwhash(passphrase.expose_secret().as_bytes(), &sealed.salt)?;
                crypto.authenticated_decrypt(&sealed.ciphertext, &key[..])
            })
            .await
            .map_err(|e| DomainError::CryptoError(format!("Decrypt task failed: {}", e)))?;

        opened.map_err(|e| {
            let err = DomainError::from(e);
            if matches!(err, DomainError::DecryptionFailed) {
                warn!("Key vault decryption failed");
            }
            err
        })
    }

    fn schedule_relock(&self, runtime: &Handle, inner: &mut VaultInner, at: Instant) {
        inner.cancel_relock();

        let weak = Arc::downgrade(&self.inner);
        inner.relock = Some(runtime.spawn(async move {
            tokio::time::sleep_until(at).await;
            if let Some(shared) = weak.upgrade() {
                let mut inner = shared.lock().await;
                // This task is finishing; do not abort it from inside
                inner.relock = None;
                inner.relock_if_expired(Instant::now());
            }
        }));
    }
}

fn current_runtime() -> DomainResult<Handle> {
    Handle::try_current().map_err(|e| DomainError::RuntimeUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn crypto() -> Arc<dyn CryptoCapability> {
        Arc::new(StandardCrypto::new(KdfParams::light()))
    }

    fn passphrase() -> SecretString {
        SecretString::new("correct horse battery staple".to_string())
    }

    fn wrong_passphrase() -> SecretString {
        SecretString::new("incorrect horse".to_string())
    }

    fn locked_vault() -> KeyVault {
        KeyVault::encrypted(
            Zeroizing::new(SECRET.to_vec()),
            &passphrase(),
            crypto(),
            VaultConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_unlock_policy_from_seconds() {
        assert_eq!(UnlockPolicy::from_seconds(Some(0)), UnlockPolicy::SingleUse);
        assert_eq!(
            UnlockPolicy::from_seconds(Some(60)),
            UnlockPolicy::For(Duration::from_secs(60))
        );
        assert_eq!(UnlockPolicy::from_seconds(Some(-1)), UnlockPolicy::Permanent);
        assert_eq!(UnlockPolicy::from_seconds(None), UnlockPolicy::Permanent);
    }

    #[tokio::test]
    async fn test_plaintext_vault() {
        let vault = KeyVault::plaintext(Zeroizing::new(SECRET.to_vec()));
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Plaintext);

        let key = vault.get_usable_key(None, UnlockPolicy::SingleUse).await.unwrap();
        assert_eq!(key.as_bytes(), SECRET);

        let key = vault
            .get_usable_key(Some(&wrong_passphrase()), UnlockPolicy::Permanent)
            .await
            .unwrap();
        assert_eq!(key.as_bytes(), SECRET);

        vault.lock().await.unwrap();
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Plaintext);
    }

    #[tokio::test]
    async fn test_new_picks_state_from_passphrase() {
        let plain = KeyVault::new(Zeroizing::new(SECRET.to_vec()), None, crypto(), VaultConfig::default())
            .unwrap();
        assert_eq!(plain.status().await.unwrap(), VaultStatus::Plaintext);

        let sealed = KeyVault::new(
            Zeroizing::new(SECRET.to_vec()),
            Some(&passphrase()),
            crypto(),
            VaultConfig::default(),
        )
        .unwrap();
        assert_eq!(sealed.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test]
    async fn test_locked_vault_requires_passphrase() {
        let vault = locked_vault();
        let err = vault
            .get_usable_key(None, UnlockPolicy::SingleUse)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PassphraseRequired));
    }

    #[tokio::test]
    async fn test_wrong_passphrase_leaves_vault_locked() {
        let vault = locked_vault();
        let err = vault
            .get_usable_key(Some(&wrong_passphrase()), UnlockPolicy::Permanent)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DecryptionFailed));
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);

        let key = vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::SingleUse)
            .await
            .unwrap();
        assert_eq!(key.as_bytes(), SECRET);
    }

    #[tokio::test]
    async fn test_single_use_unlock_keeps_vault_locked() {
        let vault = locked_vault();
        let key = vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::SingleUse)
            .await
            .unwrap();
        assert_eq!(key.as_bytes(), SECRET);
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);

        assert!(matches!(
            vault.get_usable_key(None, UnlockPolicy::SingleUse).await,
            Err(DomainError::PassphraseRequired)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_unlock_relocks() {
        let vault = locked_vault();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::For(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(matches!(
            vault.status().await.unwrap(),
            VaultStatus::Unlocked { expires_at: Some(_) }
        ));

        tokio::time::advance(Duration::from_millis(500)).await;
        let key = vault.get_usable_key(None, UnlockPolicy::SingleUse).await.unwrap();
        assert_eq!(key.as_bytes(), SECRET);

        tokio::time::advance(Duration::from_millis(501)).await;
        assert!(matches!(
            vault.get_usable_key(None, UnlockPolicy::SingleUse).await,
            Err(DomainError::PassphraseRequired)
        ));
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_relocks_without_further_calls() {
        let vault = locked_vault();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::For(Duration::from_secs(2)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        let inner = vault.inner.lock().await;
        assert_eq!(inner.status(), VaultStatus::Locked);
        assert!(inner.relock.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_unlock_until_lock() {
        let vault = locked_vault();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::Permanent)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(
            vault.status().await.unwrap(),
            VaultStatus::Unlocked { expires_at: None }
        );
        assert!(vault.get_usable_key(None, UnlockPolicy::SingleUse).await.is_ok());

        vault.lock().await.unwrap();
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
        assert!(matches!(
            vault.get_usable_key(None, UnlockPolicy::SingleUse).await,
            Err(DomainError::PassphraseRequired)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reunlock_replaces_timer() {
        let vault = locked_vault();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::For(Duration::from_secs(1)))
            .await
            .unwrap();
        vault.lock().await.unwrap();

        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::For(Duration::from_secs(10)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(vault.get_usable_key(None, UnlockPolicy::SingleUse).await.is_ok());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlocked_vault_ignores_new_policy() {
        let vault = locked_vault();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::For(Duration::from_secs(5)))
            .await
            .unwrap();

        // Cached key is returned as is; the first window still applies
        vault
            .get_usable_key(Some(&wrong_passphrase()), UnlockPolicy::Permanent)
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_wait_timeout() {
        let vault = KeyVault::encrypted(
            Zeroizing::new(SECRET.to_vec()),
            &passphrase(),
            crypto(),
            VaultConfig {
                lock_wait: Some(Duration::from_millis(50)),
            },
        )
        .unwrap();

        let _held = vault.inner.lock().await;
        let err = vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::SingleUse)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::VaultBusy { .. }));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let vault = locked_vault();
        let other = vault.clone();
        vault
            .get_usable_key(Some(&passphrase()), UnlockPolicy::Permanent)
            .await
            .unwrap();
        assert!(other.get_usable_key(None, UnlockPolicy::SingleUse).await.is_ok());
    }

    #[tokio::test]
    async fn test_with_usable_key() {
        let vault = locked_vault();
        let len = vault
            .with_usable_key(Some(&passphrase()), UnlockPolicy::SingleUse, |key| Ok(key.len()))
            .await
            .unwrap();
        assert_eq!(len, SECRET.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_window_past_clock_range() {
        let vault = locked_vault();
        let policy = UnlockPolicy::from_seconds(Some(i64::MAX));
        assert_eq!(policy, UnlockPolicy::For(Duration::from_secs(i64::MAX as u64)));

        let key = vault
            .get_usable_key(Some(&passphrase()), policy)
            .await
            .unwrap();
        assert_eq!(key.as_bytes(), SECRET);
        assert_eq!(
            vault.status().await.unwrap(),
            VaultStatus::Unlocked { expires_at: None }
        );

        vault.lock().await.unwrap();
        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_unlocks_race_relock_timer() {
        const TASKS: usize = 8;
        let window = Duration::from_secs(1);
        let vault = KeyVault::encrypted(
            Zeroizing::new(SECRET.to_vec()),
            &passphrase(),
            crypto(),
            VaultConfig { lock_wait: None },
        )
        .unwrap();

        let unlocks: Vec<_> = (0..TASKS)
            .map(|_| {
                let vault = vault.clone();
                tokio::spawn(async move {
                    vault
                        .get_usable_key(Some(&passphrase()), UnlockPolicy::For(window))
                        .await
                })
            })
            .collect();
        for handle in unlocks {
            let key = handle.await.unwrap().unwrap();
            assert_eq!(key.as_bytes(), SECRET);
        }

        // Readers land on the same instant the relock timer fires
        tokio::time::advance(window).await;
        let readers: Vec<_> = (0..TASKS)
            .map(|_| {
                let vault = vault.clone();
                tokio::spawn(async move { vault.get_usable_key(None, UnlockPolicy::SingleUse).await })
            })
            .collect();
        for handle in readers {
            match handle.await.unwrap() {
                Ok(key) => assert_eq!(key.as_bytes(), SECRET),
                Err(DomainError::PassphraseRequired) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(vault.status().await.unwrap(), VaultStatus::Locked);
    }

    #[test]
    fn test_requires_tokio_runtime() {
        assert!(matches!(
            current_runtime(),
            Err(DomainError::RuntimeUnavailable(_))
        ));
    }

    #[test]
    fn test_usable_key_debug_is_redacted() {
        let key = UsableKey::copy_of(SECRET);
        assert_eq!(format!("{:?}", key), "UsableKey(<32 bytes redacted>)");
    }
}
