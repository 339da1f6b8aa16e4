pub mod key_derivation;
pub mod key_generation;
pub mod signing;
pub mod soft_signer;

// Re-export commonly used items
pub use key_derivation::KeyDerivation;
pub use key_generation::KeyGeneration;
pub use signing::{SigningService, VaultAccess};
pub use soft_signer::SoftSigner;
