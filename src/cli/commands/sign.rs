use crate::cli::output::{print_signature_output, OutputFormat, SignatureOutput};
use anyhow::Result;
use clap::{Args, Subcommand};
use secrecy::ExposeSecret;
use tezkey::application::{SigningService, SoftSigner};
use tezkey::storage::KeyReader;

#[derive(Subcommand)]
pub enum SignCommands {
    /// Sign UTF-8 text
    Text(SignTextArgs),
    /// Sign forged operation bytes (always hashed first)
    Operation(SignOperationArgs),
}

#[derive(Args)]
pub struct SignerArgs {
    /// Encoded secret key (edsk...) or a file containing it
    #[arg(long, env = "TEZKEY_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Seconds to keep the key decrypted in memory (0 = per call, negative = never encrypt)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub validity: i64,

    /// Output format (json, text)
    #[arg(long, default_value = "json")]
    pub format: String,
}

#[derive(Args)]
pub struct SignTextArgs {
    #[command(flatten)]
    pub signer: SignerArgs,

    /// Message to sign
    #[arg(long)]
    pub message: String,

    /// Hash the message before signing
    #[arg(long)]
    pub hash: bool,
}

#[derive(Args)]
pub struct SignOperationArgs {
    #[command(flatten)]
    pub signer: SignerArgs,

    /// Forged operation bytes, hex encoded (watermark included)
    #[arg(long)]
    pub bytes: String,
}

#[derive(Subcommand)]
pub enum VerifyCommands {
    /// Check an edsig signature over UTF-8 text
    Text(VerifyTextArgs),
    /// Check an edsig signature over hex encoded bytes
    Bytes(VerifyBytesArgs),
}

#[derive(Args)]
pub struct VerifyTextArgs {
    /// Signature (edsig...)
    #[arg(long)]
    pub signature: String,

    /// Signed message
    #[arg(long)]
    pub message: String,

    /// Public key (edpk...)
    #[arg(long)]
    pub public_key: String,

    /// The message was hashed before signing
    #[arg(long)]
    pub hash: bool,
}

#[derive(Args)]
pub struct VerifyBytesArgs {
    /// Signature (edsig...)
    #[arg(long)]
    pub signature: String,

    /// Signed bytes, hex encoded
    #[arg(long)]
    pub bytes: String,

    /// Public key (edpk...)
    #[arg(long)]
    pub public_key: String,

    /// The bytes were hashed before signing
    #[arg(long)]
    pub hash: bool,
}

pub async fn handle_sign_command(cmd: SignCommands) -> Result<()> {
    match cmd {
        SignCommands::Text(args) => handle_sign_text(args).await,
        SignCommands::Operation(args) => handle_sign_operation(args).await,
    }
}

pub fn handle_verify_command(cmd: VerifyCommands) -> Result<()> {
    let service = SigningService::default();

    let valid = match cmd {
        VerifyCommands::Text(args) => {
            service.check_text_signature(&args.signature, &args.message, &args.public_key, args.hash)?
        }
        VerifyCommands::Bytes(args) => {
            let bytes = decode_hex(&args.bytes)?;
            service.check_signature(&args.signature, &bytes, &args.public_key, args.hash)?
        }
    };

    if !valid {
        return Err(anyhow::anyhow!("Signature is not valid"));
    }

    println!("✓ Signature is valid");
    Ok(())
}

fn open_signer(args: &SignerArgs) -> Result<SoftSigner> {
    let secret_key = KeyReader::read_secret_key(&args.secret_key)?;
    Ok(SoftSigner::from_encoded(secret_key.expose_secret(), args.validity)?)
}

async fn handle_sign_text(args: SignTextArgs) -> Result<()> {
    let format: OutputFormat = args.signer.format.parse()?;
    let signer = open_signer(&args.signer)?;

    let encoded = if args.hash {
        signer.sign_text_hash(&args.message).await?
    } else {
        signer.sign_text(&args.message).await?
    };

    print_signature_output(&SignatureOutput::from_encoded(encoded, args.hash)?, format)
}

async fn handle_sign_operation(args: SignOperationArgs) -> Result<()> {
    let format: OutputFormat = args.signer.format.parse()?;
    let signer = open_signer(&args.signer)?;

    let bytes = decode_hex(&args.bytes)?;
    let signature = signer.sign_operation(&bytes).await?;

    print_signature_output(&SignatureOutput::new(&signature, true)?, format)
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    let input = input.strip_prefix("0x").unwrap_or(input);
    Ok(hex::decode(input)?)
}
