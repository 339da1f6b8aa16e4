pub mod key;
pub mod mnemonic;
pub mod sign;

pub use key::{handle_key_command, KeyCommands};
pub use mnemonic::{handle_mnemonic_command, MnemonicCommands};
pub use sign::{handle_sign_command, handle_verify_command, SignCommands, VerifyCommands};
