//! Keystore error types

use thiserror::Error;

/// Errors that can occur while reading or decrypting a keystore
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// Checksum over the derived key and ciphertext did not match
    #[error("incorrect password: keystore checksum does not match")]
    IncorrectPassword,

    /// Unsupported KDF function
    #[error("unsupported KDF function: {0}")]
    UnsupportedKdf(String),

    /// Unsupported checksum function
    #[error("unsupported checksum function: {0}")]
    UnsupportedChecksum(String),

    /// Unsupported cipher function
    #[error("unsupported cipher function: {0}")]
    UnsupportedCipher(String),

    /// Missing or mistyped keystore field
    #[error("malformed keystore: {0}")]
    Malformed(String),

    /// The KDF primitive rejected its parameters
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KeystoreError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        KeystoreError::Malformed(msg.into())
    }
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
