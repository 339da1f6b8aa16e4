pub mod commands;
pub mod output;

pub use commands::{
    handle_key_command, handle_mnemonic_command, handle_sign_command, handle_verify_command,
    KeyCommands, MnemonicCommands, SignCommands, VerifyCommands,
};
