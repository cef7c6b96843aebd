//! EIP-2335 keystore reading and decryption
//!
//! A keystore is parsed in two passes: serde reads the JSON into loosely
//! typed modules (`function`, `params`, `message`), then [`Keystore`] is
//! built from them with every parameter checked. Decryption only ever
//! sees the typed form.
//!
//! ```rust,ignore
//! use bls_keycheck::keystore::Keystore;
//!
//! let keystore = Keystore::load("./validator_keys/keystore-m_12381_3600_0_0_0.json")?;
//! let secret = keystore.decrypt("my keystore password")?;
//! ```

mod checksum;
mod cipher;
mod error;
mod kdf;

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use zeroize::Zeroizing;

pub use checksum::{compute_checksum, verify_checksum, CHECKSUM_FUNCTION, CHECKSUM_LENGTH};
pub use cipher::{decrypt_secret, CIPHER_FUNCTION, IV_LENGTH};
pub use error::{KeystoreError, KeystoreResult};
pub use kdf::{pbkdf2_derive_key, scrypt_derive_key, KdfParams, MAX_DKLEN, MIN_DKLEN};

use crate::password::normalize;

/// Version number for EIP-2335 keystores
pub const KEYSTORE_VERSION: u32 = 4;

#[derive(Debug, Deserialize)]
struct RawKeystore {
    crypto: RawCrypto,
    pubkey: String,
    path: Option<String>,
    description: Option<String>,
    uuid: Option<String>,
    version: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawCrypto {
    kdf: RawModule,
    checksum: RawModule,
    cipher: RawModule,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    function: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(default)]
    message: String,
}

/// The `cipher` module: IV and ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherModule {
    pub iv: [u8; IV_LENGTH],
    pub message: Vec<u8>,
}

/// The `crypto` object of a keystore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoModules {
    pub kdf: KdfParams,
    /// Expected SHA-256 checksum
    pub checksum: [u8; CHECKSUM_LENGTH],
    pub cipher: CipherModule,
}

/// A validated EIP-2335 keystore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystore {
    pub crypto: CryptoModules,
    /// Compressed BLS12-381 G1 public key, hex as recorded in the file
    pub pubkey: String,
    /// EIP-2334 path the secret was derived along, if recorded
    pub path: Option<String>,
    pub description: Option<String>,
    pub uuid: Option<String>,
    pub version: Option<u32>,
}

impl Keystore {
    /// Parse and validate keystore JSON
    pub fn from_json(json: &str) -> KeystoreResult<Self> {
        let raw: RawKeystore =
            serde_json::from_str(json).map_err(|e| KeystoreError::malformed(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Load keystore from a file
    pub fn load<P: AsRef<Path>>(path: P) -> KeystoreResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading keystore");
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Decrypt the stored secret with `password`
    pub fn decrypt(&self, password: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
        decrypt_keystore(self, password)
    }
}

impl TryFrom<RawKeystore> for Keystore {
    type Error = KeystoreError;

    fn try_from(raw: RawKeystore) -> KeystoreResult<Self> {
        let RawCrypto {
            kdf,
            checksum,
            cipher,
        } = raw.crypto;

        let kdf = KdfParams::from_module(&kdf.function, &kdf.params)?;

        if checksum.function != CHECKSUM_FUNCTION {
            return Err(KeystoreError::UnsupportedChecksum(checksum.function));
        }
        let checksum: [u8; CHECKSUM_LENGTH] = decode_hex("crypto.checksum.message", &checksum.message)?
            .try_into()
            .map_err(|v: Vec<u8>| {
                KeystoreError::malformed(format!(
                    "crypto.checksum.message must be {} bytes, got {}",
                    CHECKSUM_LENGTH,
                    v.len()
                ))
            })?;

        if cipher.function != CIPHER_FUNCTION {
            return Err(KeystoreError::UnsupportedCipher(cipher.function));
        }
        let iv_hex = cipher
            .params
            .get("iv")
            .and_then(Value::as_str)
            .ok_or_else(|| KeystoreError::malformed("crypto.cipher.params.iv must be a string"))?;
        let iv: [u8; IV_LENGTH] = decode_hex("crypto.cipher.params.iv", iv_hex)?
            .try_into()
            .map_err(|v: Vec<u8>| {
                KeystoreError::malformed(format!(
                    "crypto.cipher.params.iv must be {} bytes, got {}",
                    IV_LENGTH,
                    v.len()
                ))
            })?;
        let message = decode_hex("crypto.cipher.message", &cipher.message)?;
        if message.is_empty() {
            return Err(KeystoreError::malformed("crypto.cipher.message is empty"));
        }

        decode_hex("pubkey", &raw.pubkey)?;

        if let Some(version) = raw.version {
            if version != KEYSTORE_VERSION {
                warn!(version, expected = KEYSTORE_VERSION, "unexpected keystore version");
            }
        }

        Ok(Keystore {
            crypto: CryptoModules {
                kdf,
                checksum,
                cipher: CipherModule { iv, message },
            },
            pubkey: raw.pubkey,
            path: raw.path,
            description: raw.description,
            uuid: raw.uuid,
            version: raw.version,
        })
    }
}

fn decode_hex(field: &str, value: &str) -> KeystoreResult<Vec<u8>> {
    hex::decode(value).map_err(|e| KeystoreError::malformed(format!("{} is not hex: {}", field, e)))
}

/// Normalize `password`, derive the keystore key, check the checksum, then
/// decrypt. Nothing is decrypted when the checksum does not match.
pub fn decrypt_keystore(keystore: &Keystore, password: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    let password = Zeroizing::new(normalize(password));
    let crypto = &keystore.crypto;

    let derived_key = crypto.kdf.derive_key(password.as_bytes())?;

    if let Err(e) = verify_checksum(&derived_key, &crypto.cipher.message, &crypto.checksum) {
        warn!("keystore checksum mismatch");
        return Err(e);
    }

    decrypt_secret(&crypto.cipher.message, &derived_key, &crypto.cipher.iv)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn keystore_json(kdf: Value) -> Value {
        json!({
            "crypto": {
                "kdf": kdf,
                "checksum": {
                    "function": "sha256",
                    "params": {},
                    "message": "00".repeat(32)
                },
                "cipher": {
                    "function": "aes-128-ctr",
                    "params": { "iv": "264daa3f303d7259501c93d997d84fe6" },
                    "message": "06ae90d55fe0a6e9c5c3bc5b170827b2e5cce3929ed3f116c2811e6366dfe20f"
                }
            },
            "pubkey": "9612d7a727c9d0a22e185a1c768478dfe919cada9266988cb32359c11f2b7b27f4ae4040902382ae2910c15e2b420d07",
            "path": "m/12381/60/0/0",
            "uuid": "1d85ae20-35c5-4611-98e8-aa14a633906f",
            "version": 4
        })
    }

    fn pbkdf2_kdf() -> Value {
        json!({
            "function": "pbkdf2",
            "params": { "dklen": 32, "c": 2, "prf": "hmac-sha256", "salt": "aa" },
            "message": ""
        })
    }

    /// Seals `secret` under `password` with a cheap pbkdf2 setting
    fn sealed(secret: &[u8], password: &str) -> Keystore {
        let mut keystore = Keystore::from_json(&keystore_json(pbkdf2_kdf()).to_string()).unwrap();
        let key = keystore
            .crypto
            .kdf
            .derive_key(normalize(password).as_bytes())
            .unwrap();
        let ciphertext = decrypt_secret(secret, &key, &keystore.crypto.cipher.iv).unwrap();
        keystore.crypto.checksum = compute_checksum(&key, &ciphertext).unwrap();
        keystore.crypto.cipher.message = ciphertext.to_vec();
        keystore
    }

    #[test]
    fn test_parse_typed_modules() {
        let keystore = Keystore::from_json(&keystore_json(pbkdf2_kdf()).to_string()).unwrap();
        assert_eq!(
            keystore.crypto.kdf,
            KdfParams::Pbkdf2 {
                c: 2,
                dklen: 32,
                salt: vec![0xaa]
            }
        );
        assert_eq!(keystore.crypto.cipher.message.len(), 32);
        assert_eq!(keystore.path.as_deref(), Some("m/12381/60/0/0"));
        assert_eq!(keystore.version, Some(KEYSTORE_VERSION));
    }

    #[test]
    fn test_decrypt_roundtrip_and_wrong_password() {
        let secret = [7u8; 32];
        let keystore = sealed(&secret, "correct horse");

        let decrypted = keystore.decrypt("correct horse").unwrap();
        assert_eq!(decrypted.as_slice(), &secret);

        let err = keystore.decrypt("battery staple").unwrap_err();
        assert!(matches!(err, KeystoreError::IncorrectPassword));
    }

    #[test]
    fn test_password_is_normalized_before_kdf() {
        let secret = [9u8; 32];
        let keystore = sealed(&secret, "pass\u{fb01}");
        // U+FB01 decomposes to "fi"; the trailing control code is stripped
        let decrypted = keystore.decrypt("passfi\u{7f}").unwrap();
        assert_eq!(decrypted.as_slice(), &secret);
    }

    #[test]
    fn test_unsupported_modules() {
        let kdf = json!({"function": "argon2", "params": {}, "message": ""});
        let err = Keystore::from_json(&keystore_json(kdf).to_string()).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedKdf(_)));

        let mut value = keystore_json(pbkdf2_kdf());
        value["crypto"]["cipher"]["function"] = json!("aes-256-gcm");
        let err = Keystore::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedCipher(_)));

        let mut value = keystore_json(pbkdf2_kdf());
        value["crypto"]["checksum"]["function"] = json!("keccak256");
        let err = Keystore::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedChecksum(_)));
    }

    #[test]
    fn test_malformed_keystore() {
        let replacements = vec![
            ("/crypto/cipher/params", json!({})),
            ("/crypto/cipher/params/iv", json!("0011")),
            ("/crypto/cipher/message", json!("not hex")),
            ("/crypto/checksum/message", json!("abcd")),
            ("/crypto/kdf/params/dklen", json!("32")),
            ("/pubkey", json!(42)),
            ("/pubkey", json!("xyz")),
        ];
        for (pointer, replacement) in replacements {
            let mut value = keystore_json(pbkdf2_kdf());
            *value.pointer_mut(pointer).unwrap() = replacement;
            let err = Keystore::from_json(&value.to_string()).unwrap_err();
            assert!(matches!(err, KeystoreError::Malformed(_)), "{}: {:?}", pointer, err);
        }

        let mut value = keystore_json(pbkdf2_kdf());
        value["crypto"].as_object_mut().unwrap().remove("kdf");
        let err = Keystore::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, KeystoreError::Malformed(_)));

        let mut value = keystore_json(pbkdf2_kdf());
        value.as_object_mut().unwrap().remove("pubkey");
        let err = Keystore::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, KeystoreError::Malformed(_)));

        let err = Keystore::from_json("{ not json").unwrap_err();
        assert!(matches!(err, KeystoreError::Malformed(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Keystore::load("/nonexistent/keystore.json").unwrap_err();
        assert!(matches!(err, KeystoreError::Io(_)));
    }
}
