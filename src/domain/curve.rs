use super::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// High bit marking a hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Curve a derivation tree is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveTag {
    Ed25519,
}

/// Curve-specific derivation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveRules {
    /// HMAC key used to turn a seed into the master node
    pub hmac_key: &'static [u8],
    /// Whether every child step must be hardened
    pub hardened_only: bool,
}

const ED25519_RULES: CurveRules = CurveRules {
    hmac_key: b"ed25519 seed",
    hardened_only: true,
};

impl CurveTag {
    pub fn rules(&self) -> &'static CurveRules {
        match self {
            Self::Ed25519 => &ED25519_RULES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }

    /// Check whether `index` is acceptable as a child index on this curve
    pub fn check_child_index(&self, index: u32) -> DomainResult<()> {
        if self.rules().hardened_only && index & HARDENED_OFFSET == 0 {
            return Err(DomainError::UnhardenedDerivationUnsupported {
                curve: *self,
                index,
            });
        }
        Ok(())
    }
}

impl FromStr for CurveTag {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_lowercase().as_str() {
            "ed25519" => Ok(Self::Ed25519),
            _ => Err(DomainError::UnsupportedCurve(s.to_string())),
        }
    }
}

impl fmt::Display for CurveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
