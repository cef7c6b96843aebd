// EIP-2333 hardened derivation over the BLS12-381 scalar field
use curv::elliptic::curves::{bls12_381::scalar::FE, ECScalar};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::DerivationError;
use crate::scalar::{flip_bits, i2osp, reduce, SCALAR_SIZE};
use crate::seed::mnemonic_to_seed;

const DIGEST_SIZE: usize = 32;
const NUM_DIGESTS: usize = 255;
const OUTPUT_SIZE: usize = DIGEST_SIZE * NUM_DIGESTS;

const MIN_SEED_SIZE: usize = 32;
const KEYGEN_SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";
const L: usize = 48;
const MAX_KEYGEN_ROUNDS: usize = 1000;

fn hkdf(salt: &[u8], ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), DerivationError> {
    // same as HKDF-Expand(HKDF-Extract(salt, ikm), info, okm.len())
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    hk.expand(info, okm)
        .map_err(|_| DerivationError::ExpandLength(okm.len()))
}

fn ikm_to_lamport_sk(
    ikm: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[[u8; DIGEST_SIZE]; NUM_DIGESTS]>, DerivationError> {
    let mut okm = Zeroizing::new(vec![0u8; OUTPUT_SIZE]);
    hkdf(salt, ikm, b"", okm.as_mut_slice())?;

    let mut split_bytes = Zeroizing::new([[0u8; DIGEST_SIZE]; NUM_DIGESTS]);
    for (chunk, out) in okm.chunks_exact(DIGEST_SIZE).zip(split_bytes.iter_mut()) {
        out.copy_from_slice(chunk);
    }
    Ok(split_bytes)
}

/// Compressed Lamport public key of `parent_sk` at `index`
pub fn parent_sk_to_lamport_pk(parent_sk: &FE, index: u32) -> Result<[u8; DIGEST_SIZE], DerivationError> {
    let salt = index.to_be_bytes();
    let ikm = Zeroizing::new(i2osp(&parent_sk.to_bigint(), SCALAR_SIZE)?);
    let lamport_0 = ikm_to_lamport_sk(&ikm, &salt)?;

    let not_ikm = Zeroizing::new(flip_bits(&ikm));
    let lamport_1 = ikm_to_lamport_sk(&not_ikm, &salt)?;

    // lamport_PK = SHA256(lamport_0[0]) | ... | SHA256(lamport_1[254])
    let mut hasher = Sha256::new();
    for chunk in lamport_0.iter().chain(lamport_1.iter()) {
        hasher.update(Sha256::digest(chunk));
    }

    let mut cmp_pk = [0u8; DIGEST_SIZE];
    cmp_pk.copy_from_slice(&hasher.finalize());
    Ok(cmp_pk)
}

/// HKDF_mod_r from the BLS signature draft: expands `ikm` to 48 bytes and
/// reduces mod r, re-salting until the result is nonzero.
pub fn hkdf_mod_r(ikm: &[u8], key_info: &[u8]) -> Result<FE, DerivationError> {
    let mut okm = Zeroizing::new([0u8; L]);
    let key_info_combined = [key_info, &(L as u16).to_be_bytes()].concat();
    let ikm_combined = Zeroizing::new([ikm, &[0u8]].concat());
    let mut salt = Sha256::digest(KEYGEN_SALT);
    for _ in 0..MAX_KEYGEN_ROUNDS {
        hkdf(&salt, &ikm_combined, &key_info_combined, okm.as_mut_slice())?;
        let sk = reduce(okm.as_slice());
        if !sk.is_zero() {
            return Ok(sk);
        }
        salt = Sha256::digest(salt.as_slice());
    }
    Err(DerivationError::Exhausted {
        iterations: MAX_KEYGEN_ROUNDS,
    })
}

// private->private hardened child key derivation
pub fn derive_child_sk(parent_sk: &FE, index: u32) -> Result<FE, DerivationError> {
    let lamp_pk = parent_sk_to_lamport_pk(parent_sk, index)?;
    hkdf_mod_r(&lamp_pk, b"")
}

// master private key derivation from a seed
pub fn derive_master_sk(seed: &[u8]) -> Result<FE, DerivationError> {
    if seed.len() < MIN_SEED_SIZE {
        return Err(DerivationError::InvalidSeed { len: seed.len() });
    }
    hkdf_mod_r(seed, b"")
}

/// Folds [`derive_child_sk`] over `indices`, left to right
pub fn derive_indices(parent_sk: &FE, indices: &[u32]) -> Result<FE, DerivationError> {
    let mut child_sk = parent_sk.clone();
    for (depth, index) in indices.iter().enumerate() {
        child_sk = derive_child_sk(&child_sk, *index)?;
        debug!(depth = depth + 1, index = *index, "derived child key");
    }
    Ok(child_sk)
}

// private->private hardened child key derivation from a path
pub fn derive_path(parent_sk: &FE, path_str: &str) -> Result<FE, DerivationError> {
    let path = path_to_node(path_str)?;
    derive_indices(parent_sk, &path)
}

/// Seed, master key and path in one go
pub fn derive_path_from_seed(seed: &[u8], path_str: &str) -> Result<FE, DerivationError> {
    let path = path_to_node(path_str)?;
    let master_sk = derive_master_sk(seed)?;
    derive_indices(&master_sk, &path)
}

/// BIP-39 mnemonic (not checked against a word list) to the key at `path_str`
pub fn derive_path_from_mnemonic(
    mnemonic: &str,
    passphrase: &str,
    path_str: &str,
) -> Result<FE, DerivationError> {
    let seed = mnemonic_to_seed(mnemonic, passphrase);
    derive_path_from_seed(&seed, path_str)
}

// Get indexes from a string path following EIP2334 spec
pub fn path_to_node(path_str: &str) -> Result<Vec<u32>, DerivationError> {
    let mut path = path_str.split('/');
    match path.next() {
        Some("m") => {}
        other => return Err(DerivationError::MissingRoot(other.unwrap_or("").to_string())),
    }
    path.map(|value| {
        value
            .parse::<u32>()
            .map_err(|_| DerivationError::InvalidPathComponent(value.to_string()))
    })
    .collect()
}
