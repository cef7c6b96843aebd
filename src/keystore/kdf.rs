//! Key Derivation Function (KDF) dispatch for EIP-2335 keystores
//!
//! The `params` object of the `kdf` module is validated once, when the
//! keystore is loaded, into a [`KdfParams`] variant. Deriving a key never
//! looks at untyped JSON.

use pbkdf2::pbkdf2_hmac;
use serde_json::{Map, Value};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use super::error::{KeystoreError, KeystoreResult};

/// Shortest derived key that still has both the cipher and checksum halves
pub const MIN_DKLEN: usize = 32;

/// Longest derived key a keystore may ask for
pub const MAX_DKLEN: usize = 1024;

// scrypt::Params carries a PHC output length; raw scrypt() sizes its output from the buffer
const SCRYPT_PHC_LEN: usize = 32;

const PBKDF2_PRF: &str = "hmac-sha256";

/// Validated parameters of a supported KDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA256
    Pbkdf2 {
        /// Iteration count
        c: u32,
        /// Derived key length in bytes
        dklen: usize,
        salt: Vec<u8>,
    },
    /// scrypt
    Scrypt {
        /// CPU/memory cost, a power of two
        n: u32,
        /// Block size
        r: u32,
        /// Parallelization
        p: u32,
        /// Derived key length in bytes
        dklen: usize,
        salt: Vec<u8>,
    },
}

impl KdfParams {
    /// Build the typed parameters for the KDF named `function`
    pub fn from_module(function: &str, params: &Map<String, Value>) -> KeystoreResult<Self> {
        let kdf = match function {
            "pbkdf2" => {
                if let Some(prf) = params.get("prf") {
                    if prf.as_str() != Some(PBKDF2_PRF) {
                        return Err(KeystoreError::malformed(format!(
                            "kdf.params.prf must be \"{}\", got {}",
                            PBKDF2_PRF, prf
                        )));
                    }
                }
                KdfParams::Pbkdf2 {
                    c: param_u32(params, "c")?,
                    dklen: param_u32(params, "dklen")? as usize,
                    salt: param_hex(params, "salt")?,
                }
            }
            "scrypt" => KdfParams::Scrypt {
                n: param_u32(params, "n")?,
                r: param_u32(params, "r")?,
                p: param_u32(params, "p")?,
                dklen: param_u32(params, "dklen")? as usize,
                salt: param_hex(params, "salt")?,
            },
            other => return Err(KeystoreError::UnsupportedKdf(other.to_string())),
        };
        kdf.validate()?;
        Ok(kdf)
    }

    fn validate(&self) -> KeystoreResult<()> {
        if !(MIN_DKLEN..=MAX_DKLEN).contains(&self.dklen()) {
            return Err(KeystoreError::malformed(format!(
                "kdf.params.dklen must be between {} and {}, got {}",
                MIN_DKLEN,
                MAX_DKLEN,
                self.dklen()
            )));
        }
        match self {
            KdfParams::Pbkdf2 { c, .. } if *c == 0 => {
                Err(KeystoreError::malformed("kdf.params.c must be positive"))
            }
            KdfParams::Scrypt { n, .. } if *n < 2 || !n.is_power_of_two() => Err(
                KeystoreError::malformed(format!("kdf.params.n must be a power of 2, got {}", n)),
            ),
            KdfParams::Scrypt { n, r, p, .. } => scrypt_params(*n, *r, *p)
                .map(|_| ())
                .map_err(|e| {
                    KeystoreError::malformed(format!(
                        "scrypt parameters n={}, r={}, p={} are not usable: {}",
                        n, r, p, e
                    ))
                }),
            _ => Ok(()),
        }
    }

    /// EIP-2335 function identifier
    pub fn function(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2 { .. } => "pbkdf2",
            KdfParams::Scrypt { .. } => "scrypt",
        }
    }

    pub fn dklen(&self) -> usize {
        match self {
            KdfParams::Pbkdf2 { dklen, .. } | KdfParams::Scrypt { dklen, .. } => *dklen,
        }
    }

    /// Derive the symmetric key from an already normalized password
    pub fn derive_key(&self, password: &[u8]) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        debug!(function = self.function(), dklen = self.dklen(), "deriving keystore key");
        match self {
            KdfParams::Pbkdf2 { c, dklen, salt } => {
                Ok(pbkdf2_derive_key(password, salt, *c, *dklen))
            }
            KdfParams::Scrypt {
                n,
                r,
                p,
                dklen,
                salt,
            } => scrypt_derive_key(password, salt, *n, *r, *p, *dklen),
        }
    }
}

fn param<'a>(params: &'a Map<String, Value>, key: &str) -> KeystoreResult<&'a Value> {
    params
        .get(key)
        .ok_or_else(|| KeystoreError::malformed(format!("kdf.params.{} is missing", key)))
}

fn param_u32(params: &Map<String, Value>, key: &str) -> KeystoreResult<u32> {
    param(params, key)?
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            KeystoreError::malformed(format!("kdf.params.{} must be an unsigned 32-bit integer", key))
        })
}

fn param_hex(params: &Map<String, Value>, key: &str) -> KeystoreResult<Vec<u8>> {
    let s = param(params, key)?
        .as_str()
        .ok_or_else(|| KeystoreError::malformed(format!("kdf.params.{} must be a string", key)))?;
    hex::decode(s)
        .map_err(|e| KeystoreError::malformed(format!("kdf.params.{} is not hex: {}", key, e)))
}

/// PBKDF2-HMAC-SHA256
pub fn pbkdf2_derive_key(password: &[u8], salt: &[u8], c: u32, dklen: usize) -> Zeroizing<Vec<u8>> {
    let mut output = Zeroizing::new(vec![0u8; dklen]);
    pbkdf2_hmac::<Sha256>(password, salt, c, output.as_mut_slice());
    output
}

fn scrypt_params(n: u32, r: u32, p: u32) -> Result<scrypt::Params, scrypt::errors::InvalidParams> {
    scrypt::Params::new(n.trailing_zeros() as u8, r, p, SCRYPT_PHC_LEN)
}

/// scrypt with `n` given as the cost itself, not its logarithm
pub fn scrypt_derive_key(
    password: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    dklen: usize,
) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    let params = scrypt_params(n, r, p).map_err(|e| KeystoreError::Kdf(e.to_string()))?;

    let mut output = Zeroizing::new(vec![0u8; dklen]);
    scrypt::scrypt(password, salt, &params, output.as_mut_slice())
        .map_err(|e| KeystoreError::Kdf(e.to_string()))?;

    Ok(output)
}
