//! Checks that a BIP-39 mnemonic and an EIP-2335 keystore describe the same
//! BLS12-381 key.
//!
//! The mnemonic side runs EIP-2333: seed, master key, then hardened child
//! keys along an EIP-2334 path. The keystore side normalizes the password,
//! runs the keystore's KDF, checks the checksum and decrypts the secret.
//! [`verify`] compares the two.

pub mod bls;
pub mod error;
pub mod key_derivation;
pub mod keystore;
pub mod password;
pub mod scalar;
pub mod seed;
pub mod verify;

pub use bls::{Bls12381, PublicKeyDeriver};
pub use error::{DerivationError, Error, Result};
pub use key_derivation::{
    derive_child_sk, derive_master_sk, derive_path, derive_path_from_mnemonic,
    derive_path_from_seed, path_to_node,
};
pub use keystore::{decrypt_keystore, Keystore, KeystoreError};
pub use verify::{verify, verify_keystore, verify_mnemonic, Verification};
