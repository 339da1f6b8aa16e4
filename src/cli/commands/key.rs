use crate::cli::output::{print_key_output, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use tezkey::application::key_generation::DEFAULT_WORD_COUNT;
use tezkey::application::{KeyDerivation, KeyGeneration};
use tezkey::domain::{DerivationPath, KeyMaterial};
use tezkey::storage::KeyReader;

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate a new identity from a fresh mnemonic
    Generate(GenerateArgs),
    /// Derive an identity from a mnemonic (no file output)
    Derive(DeriveArgs),
    /// Restore an identity from a fundraiser mnemonic, email and password
    Fundraiser(FundraiserArgs),
    /// Recompute the public key of an encoded secret key
    Restore(RestoreArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of mnemonic words (12, 15, 18, 21, 24)
    #[arg(long, default_value_t = DEFAULT_WORD_COUNT)]
    pub words: usize,

    /// BIP-39 passphrase
    #[arg(long, env = "TEZKEY_MNEMONIC_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Derivation path (defaults to the first Tezos account)
    #[arg(long)]
    pub derivation: Option<String>,

    /// Output format (json, text)
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Args)]
pub struct DeriveArgs {
    /// Mnemonic phrase (or file path)
    #[arg(long, env = "TEZKEY_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Mnemonic file path
    #[arg(long)]
    pub mnemonic_file: Option<PathBuf>,

    /// BIP-39 passphrase
    #[arg(long, env = "TEZKEY_MNEMONIC_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Derivation path (e.g., m/44'/1729'/0'/0'); omit to use the seed directly
    #[arg(long, conflicts_with = "account")]
    pub derivation: Option<String>,

    /// Tezos account index, shorthand for m/44'/1729'/ACCOUNT'/0'
    #[arg(long)]
    pub account: Option<u32>,

    /// Fail unless the derived key matches this edpk
    #[arg(long)]
    pub expected_public_key: Option<String>,

    /// Output format (json, text)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Show secret key
    #[arg(long)]
    pub show_secret: bool,
}

#[derive(Args)]
pub struct FundraiserArgs {
    /// Fundraiser mnemonic phrase (or file path)
    #[arg(long, env = "TEZKEY_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,

    /// Email from the fundraiser document
    #[arg(long)]
    pub email: String,

    /// Password from the fundraiser document
    #[arg(long, env = "TEZKEY_FUNDRAISER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Fail unless the restored key matches this edpk
    #[arg(long)]
    pub expected_public_key: Option<String>,

    /// Output format (json, text)
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Encoded secret key (edsk...) or a file containing it
    #[arg(long, env = "TEZKEY_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Output format (json, text)
    #[arg(long, default_value = "json")]
    pub format: String,
}

pub fn handle_key_command(cmd: KeyCommands) -> Result<()> {
    match cmd {
        KeyCommands::Generate(args) => handle_generate(args),
        KeyCommands::Derive(args) => handle_derive(args),
        KeyCommands::Fundraiser(args) => handle_fundraiser(args),
        KeyCommands::Restore(args) => handle_restore(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let path = match args.derivation {
        Some(path) => path,
        None => DerivationPath::tezos(0)?.to_string(),
    };

    let (key, mnemonic) = KeyGeneration::generate_identity(args.words, &args.password, Some(&path))?;

    eprintln!("Generated new mnemonic (keep this safe!):");
    eprintln!("{}", mnemonic.expose_secret());
    eprintln!();

    print_key_output(&key, format)
}

fn handle_derive(args: DeriveArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;

    let mnemonic = if let Some(ref file) = args.mnemonic_file {
        KeyReader::read_mnemonic_from_file(file)?
    } else if let Some(ref phrase) = args.mnemonic {
        KeyReader::read_mnemonic(phrase)?
    } else {
        return Err(anyhow::anyhow!(
            "Must provide either --mnemonic or --mnemonic-file"
        ));
    };

    let path = match (args.derivation, args.account) {
        (Some(path), _) => Some(path),
        (None, Some(account)) => Some(DerivationPath::tezos(account)?.to_string()),
        (None, None) => None,
    };

    let key = KeyDerivation::restore_from_mnemonic(
        mnemonic.expose_secret(),
        &args.password,
        path.as_deref(),
        args.expected_public_key.as_deref(),
    )?;

    print_key_output(&key, format)?;
    if args.show_secret {
        print_secret(&key);
    }

    Ok(())
}

fn handle_fundraiser(args: FundraiserArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let mnemonic = KeyReader::read_mnemonic(&args.mnemonic)?;

    let key = KeyDerivation::restore_from_fundraiser(
        mnemonic.expose_secret(),
        &args.email,
        &args.password,
        args.expected_public_key.as_deref(),
    )?;

    print_key_output(&key, format)
}

fn handle_restore(args: RestoreArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let secret_key = KeyReader::read_secret_key(&args.secret_key)?;
    let key = KeyDerivation::restore_from_secret_key(secret_key.expose_secret())?;

    print_key_output(&key, format)
}

fn print_secret(key: &KeyMaterial) {
    if let Some(secret) = &key.secret_key {
        eprintln!("\n⚠️  Secret key: {}", secret.expose_secret());
    }
}
