use super::capability::CryptoCapability;
use super::standard::StandardCrypto;
use crate::domain::{CurveTag, DerivationPath, DomainError, DomainResult, HdNode};
use std::sync::Arc;
use tracing::debug;

/// Exact seed length accepted by `from_seed` (a BIP-39 seed)
pub const SEED_LEN: usize = 64;

/// Seed length range SLIP-10 allows for raw seeds
pub const MIN_RAW_SEED_LEN: usize = 16;
pub const MAX_RAW_SEED_LEN: usize = 64;

/// SLIP-10 hierarchical derivation, hardened-only on ed25519.
///
/// Stateless: every call is a pure function of its inputs, so one engine
/// can be shared freely between threads.
#[derive(Clone)]
pub struct DerivationEngine {
    crypto: Arc<dyn CryptoCapability>,
}

impl Default for DerivationEngine {
    fn default() -> Self {
        Self::new(Arc::new(StandardCrypto::default()))
    }
}

impl DerivationEngine {
    pub fn new(crypto: Arc<dyn CryptoCapability>) -> Self {
        Self { crypto }
    }

    pub fn crypto(&self) -> &dyn CryptoCapability {
        self.crypto.as_ref()
    }

    /// Master node from a 64-byte seed
    pub fn from_seed(&self, seed: &[u8], curve: CurveTag) -> DomainResult<HdNode> {
        if seed.len() != SEED_LEN {
            return Err(DomainError::InvalidSeedLength {
                expected: "64",
                actual: seed.len(),
            });
        }
        self.master(seed, curve)
    }

    /// Master node from a raw seed of 16 to 64 bytes
    pub fn from_seed_bytes(&self, seed: &[u8], curve: CurveTag) -> DomainResult<HdNode> {
        if !(MIN_RAW_SEED_LEN..=MAX_RAW_SEED_LEN).contains(&seed.len()) {
            return Err(DomainError::InvalidSeedLength {
                expected: "16 to 64",
                actual: seed.len(),
            });
        }
        self.master(seed, curve)
    }

    fn master(&self, seed: &[u8], curve: CurveTag) -> DomainResult<HdNode> {
        let i = self.crypto.hmac_sha512(curve.rules().hmac_key, seed)?;
        debug!(curve = %curve, "Derived master node");
        Ok(HdNode::master(&i, curve))
    }

    /// Single hardened child step
    pub fn derive(&self, node: &HdNode, index: u32) -> DomainResult<HdNode> {
        let curve = node.curve();
        curve.check_child_index(index)?;

        let mut data = zeroize::Zeroizing::new([0u8; 37]);
        data[1..33].copy_from_slice(node.private_key());
        data[33..].copy_from_slice(&index.to_be_bytes());

        let i = self.crypto.hmac_sha512(node.chain_code(), &data[..])?;
        Ok(HdNode::child(&i, index, node.depth() + 1, curve))
    }

    /// Derive along a path string such as `m/44'/1729'/0'/0'`.
    ///
    /// The whole path is parsed and checked before any HMAC is computed, so
    /// a failing path never yields a node for one of its prefixes.
    pub fn derive_path(&self, node: &HdNode, path: &str) -> DomainResult<HdNode> {
        let parsed = DerivationPath::parse(path)?;
        self.derive_parsed(node, &parsed)
    }

    /// Same as `derive_path` for an already parsed path
    pub fn derive_parsed(&self, node: &HdNode, path: &DerivationPath) -> DomainResult<HdNode> {
        let curve = node.curve();
        for segment in path.segments() {
            curve.check_child_index(segment.child_index())?;
        }

        let mut current = node.clone();
        for segment in path.segments() {
            current = self.derive(&current, segment.child_index())?;
        }

        debug!(path = %path, depth = current.depth(), "Derived child node");
        Ok(current)
    }
}
