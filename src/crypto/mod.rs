pub mod capability;
pub mod ed25519;
pub mod mnemonic;
pub mod slip10;
pub mod standard;

// Re-export commonly used items
pub use capability::{CryptoCapability, CryptoFailure};
pub use ed25519::Ed25519;
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, normalize_mnemonic, validate_mnemonic};
pub use slip10::DerivationEngine;
pub use standard::{KdfParams, StandardCrypto};
