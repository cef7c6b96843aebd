//! SHA-256 checksum implementation for keystore integrity verification
//!
//! The checksum is computed over: decryption_key[16:32] || ciphertext.
//! A mismatch is the only signal that the password is wrong.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::error::{KeystoreError, KeystoreResult};

pub const CHECKSUM_FUNCTION: &str = "sha256";
pub const CHECKSUM_LENGTH: usize = 32;

/// Compute checksum over derived_key[16:32] || ciphertext
pub fn compute_checksum(derived_key: &[u8], ciphertext: &[u8]) -> KeystoreResult<[u8; CHECKSUM_LENGTH]> {
    if derived_key.len() < 32 {
        return Err(KeystoreError::malformed(format!(
            "derived key must be at least 32 bytes, got {}",
            derived_key.len()
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(&derived_key[16..32]);
    hasher.update(ciphertext);

    let mut checksum = [0u8; CHECKSUM_LENGTH];
    checksum.copy_from_slice(&hasher.finalize());
    Ok(checksum)
}

/// `Ok(())` when the stored checksum matches, [`KeystoreError::IncorrectPassword`] otherwise
pub fn verify_checksum(derived_key: &[u8], ciphertext: &[u8], expected: &[u8]) -> KeystoreResult<()> {
    let computed = compute_checksum(derived_key, ciphertext)?;

    // slices of unequal length compare unequal
    if bool::from(computed.as_slice().ct_eq(expected)) {
        Ok(())
    } else {
        Err(KeystoreError::IncorrectPassword)
    }
}
