use super::capability::CryptoFailure;
use sp_core::{
    crypto::Pair as PairTrait,
    ed25519::{Pair, Public, Signature},
};
use zeroize::Zeroizing;

pub const SEED_LEN: usize = 32;
pub const SECRET_KEY_LEN: usize = 64;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// Ed25519 key operations
pub struct Ed25519;

impl Ed25519 {
    /// Generate a keypair from a 32-byte seed
    pub fn from_seed(seed: &[u8]) -> Result<Pair, CryptoFailure> {
        if seed.len() != SEED_LEN {
            return Err(CryptoFailure::InvalidLength {
                what: "ed25519 seed",
                expected: "32",
                actual: seed.len(),
            });
        }

        let mut seed_array = Zeroizing::new([0u8; SEED_LEN]);
        seed_array.copy_from_slice(seed);

        Ok(Pair::from_seed(&seed_array))
    }

    /// Keypair from either a 32-byte seed or a 64-byte `seed ‖ public key` secret.
    /// A 64-byte secret whose tail is not its own public key is rejected.
    pub fn from_secret(secret: &[u8]) -> Result<Pair, CryptoFailure> {
        match secret.len() {
            SEED_LEN => Self::from_seed(secret),
            SECRET_KEY_LEN => {
                let pair = Self::from_seed(&secret[..SEED_LEN])?;
                if Self::public_bytes(&pair)[..] != secret[SEED_LEN..] {
                    return Err(CryptoFailure::Primitive(
                        "secret key does not embed its own public key".to_string(),
                    ));
                }
                Ok(pair)
            }
            other => Err(CryptoFailure::InvalidLength {
                what: "ed25519 secret key",
                expected: "32 or 64",
                actual: other,
            }),
        }
    }

    /// Raw public key bytes of a pair
    pub fn public_bytes(pair: &Pair) -> [u8; PUBLIC_KEY_LEN] {
        let public = pair.public();
        let public_ref: &[u8] = public.as_ref();
        let mut out = [0u8; PUBLIC_KEY_LEN];
        out.copy_from_slice(public_ref);
        out
    }

    /// The 64-byte `seed ‖ public key` secret of a pair
    pub fn secret_key_bytes(pair: &Pair) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        let seed = Zeroizing::new(pair.seed());
        let mut out = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        out[..SEED_LEN].copy_from_slice(&seed[..]);
        out[SEED_LEN..].copy_from_slice(&Self::public_bytes(pair));
        out
    }

    /// Sign a message
    pub fn sign(pair: &Pair, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        let signature = pair.sign(message);
        let signature_ref: &[u8] = signature.as_ref();
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(signature_ref);
        out
    }

    /// Verify a signature; malformed lengths simply fail verification
    pub fn verify(signature: &[u8], message: &[u8], public_key: &[u8]) -> bool {
        let (Ok(signature), Ok(public_key)) = (
            <[u8; SIGNATURE_LEN]>::try_from(signature),
            <[u8; PUBLIC_KEY_LEN]>::try_from(public_key),
        ) else {
            return false;
        };

        Pair::verify(
            &Signature::from_raw(signature),
            message,
            &Public::from_raw(public_key),
        )
    }
}
