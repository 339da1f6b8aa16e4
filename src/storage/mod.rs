pub mod key_reader;
pub mod key_vault;
pub mod tezos_format;

// Re-export commonly used items
pub use key_reader::KeyReader;
pub use key_vault::{KeyVault, UnlockPolicy, UsableKey, VaultConfig, VaultStatus};
pub use tezos_format::TezosPrefix;
