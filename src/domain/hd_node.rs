use super::curve::CurveTag;
use super::error::DomainResult;
use crate::crypto::CryptoCapability;
use std::fmt;
use zeroize::Zeroizing;

/// A node in a SLIP-10 derivation tree.
///
/// Nodes are immutable values; deriving a child never touches the parent.
/// Private key and chain code are wiped when the node is dropped.
#[derive(Clone)]
pub struct HdNode {
    private_key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
    public_key: Option<[u8; 32]>,
    index: Option<u32>,
    depth: u32,
    curve: CurveTag,
}

impl HdNode {
    /// Master node built from the two halves of the seed HMAC
    pub(crate) fn master(i: &[u8; 64], curve: CurveTag) -> Self {
        Self::from_hmac(i, None, 0, curve)
    }

    /// Child node built from the two halves of a child-step HMAC
    pub(crate) fn child(i: &[u8; 64], index: u32, depth: u32, curve: CurveTag) -> Self {
        Self::from_hmac(i, Some(index), depth, curve)
    }

    fn from_hmac(i: &[u8; 64], index: Option<u32>, depth: u32, curve: CurveTag) -> Self {
        let mut private_key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        private_key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);

        Self {
            private_key,
            chain_code,
            public_key: None,
            index,
            depth,
            curve,
        }
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Present only after `with_public_key`
    pub fn public_key(&self) -> Option<&[u8; 32]> {
        self.public_key.as_ref()
    }

    /// Hardened index used to reach this node; `None` for the master node
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn curve(&self) -> CurveTag {
        self.curve
    }

    pub fn is_master(&self) -> bool {
        self.index.is_none()
    }

    /// Fill in the public key computed from the private key
    pub fn with_public_key(mut self, crypto: &dyn CryptoCapability) -> DomainResult<Self> {
        if self.public_key.is_none() {
            self.public_key = Some(crypto.ed25519_public_key(&self.private_key[..])?);
        }
        Ok(self)
    }

    /// The 64-byte `private key ‖ public key` signing secret for this node
    pub fn to_secret_key(&self, crypto: &dyn CryptoCapability) -> DomainResult<Zeroizing<[u8; 64]>> {
        let public_key = match self.public_key {
            Some(public_key) => public_key,
            None => crypto.ed25519_public_key(&self.private_key[..])?,
        };

        let mut secret = Zeroizing::new([0u8; 64]);
        secret[..32].copy_from_slice(&self.private_key[..]);
        secret[32..].copy_from_slice(&public_key);
        Ok(secret)
    }
}

impl fmt::Debug for HdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdNode")
            .field("private_key", &"<redacted>")
            .field("chain_code", &"<redacted>")
            .field("public_key", &self.public_key.map(hex::encode))
            .field("index", &self.index)
            .field("depth", &self.depth)
            .field("curve", &self.curve)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KdfParams, StandardCrypto};

    fn sample_hmac() -> [u8; 64] {
        let mut i = [0u8; 64];
        for (n, byte) in i.iter_mut().enumerate() {
            *byte = n as u8;
        }
        i
    }

    #[test]
    fn test_master_and_child_fields() {
        let master = HdNode::master(&sample_hmac(), CurveTag::Ed25519);
        assert!(master.is_master());
        assert_eq!(master.depth(), 0);
        assert_eq!(master.index(), None);
        assert_eq!(master.public_key(), None);
        assert_eq!(master.private_key()[0], 0);
        assert_eq!(master.chain_code()[0], 32);

        let child = HdNode::child(&sample_hmac(), 0x8000_0001, 1, CurveTag::Ed25519);
        assert!(!child.is_master());
        assert_eq!(child.index(), Some(0x8000_0001));
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let node = HdNode::master(&[0xab; 64], CurveTag::Ed25519);
        let debug = format!("{:?}", node);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("abab"));
    }

    #[test]
    fn test_public_and_secret_key() {
        let crypto = StandardCrypto::new(KdfParams::light());
        let node = HdNode::master(&sample_hmac(), CurveTag::Ed25519)
            .with_public_key(&crypto)
            .unwrap();

        let public_key = *node.public_key().unwrap();
        let secret = node.to_secret_key(&crypto).unwrap();
        assert_eq!(&secret[..32], &node.private_key()[..]);
        assert_eq!(&secret[32..], &public_key[..]);
        assert_eq!(crypto.ed25519_public_key(&secret[..]).unwrap(), public_key);
    }
}
