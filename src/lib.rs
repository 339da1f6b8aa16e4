// Library exports for testing and external integration

pub mod application;
pub mod crypto;
pub mod domain;
pub mod storage;

// Re-export commonly used items
pub use application::{KeyDerivation, KeyGeneration, SigningService, SoftSigner, VaultAccess};
pub use crypto::{CryptoCapability, DerivationEngine, KdfParams, StandardCrypto};
pub use domain::{
    CurveTag, DerivationPath, DomainError, DomainResult, HdNode, KeyMaterial, KeyMetadata,
    Signature,
};
pub use storage::{KeyReader, KeyVault, UnlockPolicy, UsableKey, VaultConfig, VaultStatus};
