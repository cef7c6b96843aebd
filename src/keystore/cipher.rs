//! AES-128-CTR decryption of the keystore secret
//!
//! CTR mode needs no padding: the plaintext is exactly as long as the
//! ciphertext.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use zeroize::Zeroizing;

use super::error::{KeystoreError, KeystoreResult};

pub const CIPHER_FUNCTION: &str = "aes-128-ctr";

/// IV (initialization vector) length for AES-128-CTR
pub const IV_LENGTH: usize = 16;

/// AES-128 key length
pub const AES_KEY_LENGTH: usize = 16;

type Aes128Ctr = Ctr128BE<Aes128>;

/// Decrypt with the first 16 bytes of `decryption_key`
pub fn decrypt_secret(
    ciphertext: &[u8],
    decryption_key: &[u8],
    iv: &[u8],
) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    if decryption_key.len() < AES_KEY_LENGTH {
        return Err(KeystoreError::malformed(format!(
            "decryption key must be at least {} bytes, got {}",
            AES_KEY_LENGTH,
            decryption_key.len()
        )));
    }
    let key: [u8; AES_KEY_LENGTH] = decryption_key[..AES_KEY_LENGTH]
        .try_into()
        .map_err(|_| KeystoreError::malformed("decryption key conversion failed"))?;

    let iv_arr: [u8; IV_LENGTH] = iv.try_into().map_err(|_| {
        KeystoreError::malformed(format!("IV must be {} bytes, got {}", IV_LENGTH, iv.len()))
    })?;

    let mut cipher = Aes128Ctr::new(&key.into(), &iv_arr.into());

    let mut plaintext = Zeroizing::new(ciphertext.to_vec());
    cipher.apply_keystream(plaintext.as_mut_slice());

    Ok(plaintext)
}
