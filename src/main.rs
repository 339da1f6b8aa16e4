use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{
    handle_key_command, handle_mnemonic_command, handle_sign_command, handle_verify_command,
    KeyCommands, MnemonicCommands, SignCommands, VerifyCommands,
};

#[derive(Parser)]
#[command(name = "tezkey")]
#[command(about = "Tezos ed25519 key derivation and signing tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "TEZKEY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identity derivation and restoration
    #[command(subcommand)]
    Key(KeyCommands),

    /// Mnemonic operations
    #[command(subcommand)]
    Mnemonic(MnemonicCommands),

    /// Sign text or operations
    #[command(subcommand)]
    Sign(SignCommands),

    /// Check signatures
    #[command(subcommand)]
    Verify(VerifyCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output on stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tezkey={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Key(key_cmd) => handle_key_command(key_cmd),
        Commands::Mnemonic(mnemonic_cmd) => handle_mnemonic_command(mnemonic_cmd),
        Commands::Sign(sign_cmd) => handle_sign_command(sign_cmd).await,
        Commands::Verify(verify_cmd) => handle_verify_command(verify_cmd),
    }
}
