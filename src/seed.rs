//! BIP-39 mnemonic to seed.
//!
//! The phrase is not checked against a word list: any string is accepted and
//! stretched with PBKDF2-HMAC-SHA512.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::password::normalize;

pub const SEED_SIZE: usize = 64;
const PBKDF2_ROUNDS: u32 = 2048;

pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Zeroizing<Vec<u8>> {
    let mnemonic = Zeroizing::new(normalize(mnemonic));
    // the passphrase goes into the salt as given
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase));

    let mut seed = Zeroizing::new(vec![0u8; SEED_SIZE]);
    pbkdf2_hmac::<Sha512>(mnemonic.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, seed.as_mut_slice());
    seed
}
