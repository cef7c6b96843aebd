//! Compare a path-derived key with the contents of a keystore.

use curv::elliptic::curves::{bls12_381::scalar::FE, ECScalar};
use tracing::info;

use crate::bls::PublicKeyDeriver;
use crate::error::Result;
use crate::key_derivation::derive_path_from_mnemonic;
use crate::keystore::{decrypt_keystore, Keystore};
use crate::scalar::os2ip;

/// Outcome of checking a derived key against a keystore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Decrypted secret equals the derived scalar
    pub private_key_match: bool,
    /// Recorded pubkey equals the derived scalar's pubkey
    pub public_key_match: bool,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        self.private_key_match && self.public_key_match
    }
}

/// Checks `secret` and `keystore_pubkey_hex` against `path_sk`.
///
/// The secret is compared as an integer, so `00ab..` and `ab..` are the same
/// key. The public key hex is compared case-insensitively.
pub fn verify(
    path_sk: &FE,
    secret: &[u8],
    keystore_pubkey_hex: &str,
    bls: &dyn PublicKeyDeriver,
) -> Verification {
    let private_key_match = os2ip(secret) == path_sk.to_bigint();

    let derived_pubkey = hex::encode(bls.public_key(path_sk));
    let public_key_match = derived_pubkey.eq_ignore_ascii_case(keystore_pubkey_hex);

    info!(private_key_match, public_key_match, "compared derived key with keystore");
    Verification {
        private_key_match,
        public_key_match,
    }
}

/// Decrypts `keystore` with `password` and verifies it against `path_sk`
pub fn verify_keystore(
    path_sk: &FE,
    keystore: &Keystore,
    password: &str,
    bls: &dyn PublicKeyDeriver,
) -> Result<Verification> {
    let secret = decrypt_keystore(keystore, password)?;
    Ok(verify(path_sk, &secret, &keystore.pubkey, bls))
}

/// Derives the key at `path` from the mnemonic and verifies the keystore
pub fn verify_mnemonic(
    mnemonic: &str,
    passphrase: &str,
    path: &str,
    keystore: &Keystore,
    password: &str,
    bls: &dyn PublicKeyDeriver,
) -> Result<Verification> {
    let path_sk = derive_path_from_mnemonic(mnemonic, passphrase, path)?;
    verify_keystore(&path_sk, keystore, password, bls)
}
