use super::curve::HARDENED_OFFSET;
use super::error::{DomainError, DomainResult};
use std::fmt;
use std::str::FromStr;

/// Tezos registered coin type (SLIP-44)
pub const TEZOS_COIN_TYPE: u32 = 1729;

/// A single segment in a derivation path.
///
/// The index always fits in 31 bits; the hardened bit is only ever added
/// by `child_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    /// Index as written, without the hardened bit
    index: u32,
    /// Whether the segment carried the `'` marker
    hardened: bool,
}

impl PathSegment {
    pub fn new(index: u32, hardened: bool) -> DomainResult<Self> {
        if index >= HARDENED_OFFSET {
            let marker = if hardened { "'" } else { "" };
            return Err(DomainError::InvalidDerivationPath {
                path: format!("{}{}", index, marker),
                reason: format!("index exceeds {}", HARDENED_OFFSET - 1),
            });
        }
        Ok(Self { index, hardened })
    }

    pub fn hardened(index: u32) -> DomainResult<Self> {
        Self::new(index, true)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The child index actually fed to the derivation step
    pub fn child_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A parsed BIP-32 style path: `(m/)?(\d+'?/)*\d+'?`
///
/// Parsing only checks the grammar. Whether unhardened segments are
/// acceptable is a curve rule and is enforced by the derivation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    segments: Vec<PathSegment>,
}

impl DerivationPath {
    /// Parse and grammar-check a path string
    pub fn parse(path: &str) -> DomainResult<Self> {
        let invalid = |reason: String| DomainError::InvalidDerivationPath {
            path: path.to_string(),
            reason,
        };

        let body = path.strip_prefix("m/").unwrap_or(path);
        if body.is_empty() {
            return Err(invalid("no path segments".to_string()));
        }

        let mut segments = Vec::new();
        for (position, raw) in body.split('/').enumerate() {
            let (digits, hardened) = match raw.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (raw, false),
            };

            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!(
                    "segment {} ({:?}) is not a decimal index",
                    position, raw
                )));
            }

            let index: u32 = digits
                .parse()
                .map_err(|_| invalid(format!("segment {} ({:?}) is out of range", position, raw)))?;
            let segment = PathSegment::new(index, hardened).map_err(|_| {
                invalid(format!(
                    "segment {} ({:?}) exceeds {}",
                    position,
                    raw,
                    HARDENED_OFFSET - 1
                ))
            })?;

            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Build a path from segments; an empty list is rejected like an empty string
    pub fn from_segments(segments: Vec<PathSegment>) -> DomainResult<Self> {
        if segments.is_empty() {
            return Err(DomainError::InvalidDerivationPath {
                path: String::new(),
                reason: "no path segments".to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Standard Tezos account path: m/44'/1729'/ACCOUNT'/0'
    pub fn tezos(account: u32) -> DomainResult<Self> {
        Self::from_segments(vec![
            PathSegment::hardened(44)?,
            PathSegment::hardened(TEZOS_COIN_TYPE)?,
            PathSegment::hardened(account)?,
            PathSegment::hardened(0)?,
        ])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// First segment without the hardened marker, if any
    pub fn first_unhardened(&self) -> Option<&PathSegment> {
        self.segments.iter().find(|segment| !segment.hardened)
    }
}

impl FromStr for DerivationPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
