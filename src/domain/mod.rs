pub mod curve;
pub mod derivation;
pub mod error;
pub mod hd_node;
pub mod key_material;

// Re-export commonly used types
pub use curve::{CurveRules, CurveTag, HARDENED_OFFSET};
pub use derivation::{DerivationPath, PathSegment, TEZOS_COIN_TYPE};
pub use error::{DomainError, DomainResult};
pub use hd_node::HdNode;
pub use key_material::{KeyMaterial, KeyMetadata, Signature};
