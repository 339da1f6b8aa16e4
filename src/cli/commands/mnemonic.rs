use anyhow::Result;
use clap::{Args, Subcommand};
use secrecy::ExposeSecret;
use tezkey::application::key_generation::DEFAULT_WORD_COUNT;
use tezkey::application::KeyGeneration;

#[derive(Subcommand)]
pub enum MnemonicCommands {
    /// Generate a new BIP39 mnemonic phrase
    Generate(MnemonicGenerateArgs),
}

#[derive(Args)]
pub struct MnemonicGenerateArgs {
    /// Number of words (12, 15, 18, 21, 24)
    #[arg(long, default_value_t = DEFAULT_WORD_COUNT)]
    pub words: usize,
}

pub fn handle_mnemonic_command(cmd: MnemonicCommands) -> Result<()> {
    match cmd {
        MnemonicCommands::Generate(args) => handle_mnemonic_generate(args),
    }
}

fn handle_mnemonic_generate(args: MnemonicGenerateArgs) -> Result<()> {
    let mnemonic = KeyGeneration::generate_mnemonic(args.words)?;

    println!("{}", mnemonic.expose_secret());
    eprintln!();
    eprintln!("⚠️  SECURITY WARNING:");
    eprintln!("   - Keep this mnemonic secure and never share it");
    eprintln!("   - All keys can be derived from this mnemonic");
    eprintln!("   - Store in a secure location (encrypted file, password manager, etc.)");

    Ok(())
}
