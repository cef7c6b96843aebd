//! BLS12-381 public keys for derived scalars.
//!
//! Public keys are compressed G1 points (`sk * G1`), the "minimal pubkey"
//! variant used by Ethereum validators and recorded in EIP-2335 keystores.

use std::sync::OnceLock;

use curv::elliptic::curves::{
    bls12_381::{g1::GE1, scalar::FE},
    ECPoint,
};
use tracing::debug;

/// Length of a compressed G1 point
pub const PUBLIC_KEY_SIZE: usize = 48;

/// Scalar to serialized public key
pub trait PublicKeyDeriver {
    fn public_key(&self, sk: &FE) -> Vec<u8>;
}

/// Handle to the curve backend.
///
/// There is exactly one per process. It is created by the first call to
/// [`Bls12381::init`], never re-created, and handed to whoever needs public
/// keys instead of being reached for globally.
#[derive(Debug)]
pub struct Bls12381 {
    _private: (),
}

static BLS12_381: OnceLock<Bls12381> = OnceLock::new();

impl Bls12381 {
    /// Returns the process-wide backend, creating it on first use
    pub fn init() -> &'static Bls12381 {
        BLS12_381.get_or_init(|| {
            debug!("initialized BLS12-381 backend");
            Bls12381 { _private: () }
        })
    }
}

impl PublicKeyDeriver for Bls12381 {
    fn public_key(&self, sk: &FE) -> Vec<u8> {
        let pk: GE1 = ECPoint::generator_mul(sk);
        pk.serialize_compressed().to_vec()
    }
}
