//! Error types for key derivation and keystore verification

use thiserror::Error;

pub use crate::keystore::KeystoreError;

/// Errors raised while turning a seed into a scalar along a path
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// EIP-2333 requires at least 32 bytes of seed
    #[error("seed must be greater than or equal to 32 bytes, got {len}")]
    InvalidSeed { len: usize },

    /// Path does not start with the master node
    #[error("first value must be m, got {0:?}")]
    MissingRoot(String),

    /// A path segment is not an unsigned 32-bit integer
    #[error("invalid path component: {0:?}")]
    InvalidPathComponent(String),

    /// Integer does not fit in the requested octet width
    #[error("integer too large for {width} bytes")]
    IntegerTooLarge { width: usize },

    /// HKDF-Expand was asked for more than 255 hash lengths
    #[error("HKDF cannot expand to {0} bytes")]
    ExpandLength(usize),

    /// HKDF_mod_r kept producing zero; the hash or HKDF backend is broken
    #[error("scalar generation produced zero {iterations} times in a row")]
    Exhausted { iterations: usize },
}

/// Errors surfaced by the end-to-end verification
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Keystore(#[from] KeystoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
