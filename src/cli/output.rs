use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tezkey::domain::{KeyMaterial, Signature};
use tezkey::storage::tezos_format;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(anyhow::anyhow!("Unknown format: {}", s)),
        }
    }
}

/// Simple key output for display
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyOutput {
    pub curve: String,
    pub public_key: Option<String>,
    pub public_key_hex: String,
    pub derivation_path: Option<String>,
}

impl From<&KeyMaterial> for KeyOutput {
    fn from(key: &KeyMaterial) -> Self {
        Self {
            curve: key.curve.as_str().to_string(),
            public_key: key.metadata.encoded_public_key.clone(),
            public_key_hex: hex::encode(key.public_key),
            derivation_path: key.derivation_path.clone(),
        }
    }
}

pub fn print_key_output(key: &KeyMaterial, format: OutputFormat) -> Result<()> {
    let output = KeyOutput::from(key);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Curve: {}", output.curve);
            if let Some(public_key) = &output.public_key {
                println!("Public Key: {}", public_key);
            }
            println!("Public Key (hex): {}", output.public_key_hex);
            if let Some(path) = &output.derivation_path {
                println!("Derivation Path: {}", path);
            }
        }
    }

    Ok(())
}

/// Signature output for display
#[derive(Debug, Serialize, Deserialize)]
pub struct SignatureOutput {
    pub signature: String,
    pub signature_hex: String,
    pub prehashed: bool,
}

impl SignatureOutput {
    pub fn new(signature: &Signature, prehashed: bool) -> Result<Self> {
        Ok(Self {
            signature: tezos_format::encode_signature(signature.as_bytes())?,
            signature_hex: signature.to_hex(),
            prehashed,
        })
    }

    /// Output for an already encoded `edsig…` string
    pub fn from_encoded(encoded: String, prehashed: bool) -> Result<Self> {
        let bytes = tezos_format::decode_signature(&encoded)?;
        Ok(Self {
            signature: encoded,
            signature_hex: hex::encode(bytes),
            prehashed,
        })
    }
}

pub fn print_signature_output(output: &SignatureOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(output)?);
        }
        OutputFormat::Text => {
            println!("Signature: {}", output.signature);
            println!("Signature (hex): {}", output.signature_hex);
            println!("Prehashed: {}", output.prehashed);
        }
    }

    Ok(())
}
