//! BLS12-381 scalar field order and the octet-string conversions of RFC 8017
//! (I2OSP / OS2IP) used throughout EIP-2333.

use std::sync::OnceLock;

use curv::{
    arithmetic::traits::*,
    elliptic::curves::{bls12_381::scalar::FE, ECScalar},
    BigInt,
};

use crate::error::DerivationError;

/// Byte width of a serialized scalar
pub const SCALAR_SIZE: usize = 32;

// r = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001
const ORDER_DEC: &str =
    "52435875175126190479447740508185965837690552500527637822603658699938581184513";

static ORDER: OnceLock<BigInt> = OnceLock::new();

/// Order `r` of the BLS12-381 prime subgroup
pub fn order() -> &'static BigInt {
    ORDER.get_or_init(|| match BigInt::from_str_radix(ORDER_DEC, 10) {
        Ok(r) => r,
        Err(_) => unreachable!("subgroup order literal is valid decimal"),
    })
}

/// OS2IP: big-endian unsigned integer from bytes
pub fn os2ip(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::from(0);
    }
    BigInt::from_bytes(bytes)
}

/// I2OSP: big-endian encoding of `value`, left padded with zeros to `width`
pub fn i2osp(value: &BigInt, width: usize) -> Result<Vec<u8>, DerivationError> {
    let raw = value.to_bytes();
    let leading = raw.iter().take_while(|b| **b == 0).count();
    let minimal = &raw[leading..];
    if minimal.len() > width {
        return Err(DerivationError::IntegerTooLarge { width });
    }
    let mut out = vec![0u8; width];
    out[width - minimal.len()..].copy_from_slice(minimal);
    Ok(out)
}

/// Bitwise complement of every byte
pub fn flip_bits(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| !b).collect()
}

/// OS2IP(bytes) mod r
pub fn reduce(bytes: &[u8]) -> FE {
    let n = BigInt::modulus(&os2ip(bytes), order());
    ECScalar::from_bigint(&n)
}

/// I2OSP(sk, 32)
pub fn scalar_to_bytes(sk: &FE) -> Result<[u8; SCALAR_SIZE], DerivationError> {
    let mut out = [0u8; SCALAR_SIZE];
    out.copy_from_slice(&i2osp(&sk.to_bigint(), SCALAR_SIZE)?);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_order_matches_hex() {
        let r = BigInt::from_hex("73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001")
            .unwrap();
        assert_eq!(order(), &r);
    }

    #[test]
    fn test_reduce() {
        // r itself and zero both reduce to zero
        let r_bytes = i2osp(order(), 32).unwrap();
        assert!(reduce(&r_bytes).is_zero());
        assert!(reduce(&[0u8; 48]).is_zero());

        // r + 5 reduces to 5
        let r_plus_5 = order().clone() + BigInt::from(5);
        let sk = reduce(&i2osp(&r_plus_5, 48).unwrap());
        assert_eq!(sk.to_bigint(), BigInt::from(5));

        // values below r are untouched
        assert_eq!(reduce(&[0x01, 0x00]).to_bigint(), BigInt::from(256));
    }

    #[test]
    fn test_i2osp_pads_and_rejects() {
        assert_eq!(i2osp(&BigInt::from(1), 4).unwrap(), vec![0, 0, 0, 1]);
        assert_eq!(i2osp(&BigInt::from(0), 2).unwrap(), vec![0, 0]);
        assert_eq!(i2osp(&BigInt::from(0x0102), 2).unwrap(), vec![1, 2]);
        assert_eq!(
            i2osp(&BigInt::from(0x010203), 2),
            Err(DerivationError::IntegerTooLarge { width: 2 })
        );
    }

    #[test]
    fn test_os2ip() {
        assert_eq!(os2ip(&[]), BigInt::from(0));
        assert_eq!(os2ip(&[0, 0, 1, 0]), BigInt::from(256));
    }

    #[test]
    fn test_flip_bits() {
        assert_eq!(flip_bits(&[0x00, 0xff, 0x0f]), vec![0xff, 0x00, 0xf0]);
        assert!(flip_bits(&[]).is_empty());
    }

    #[test]
    fn test_scalar_bytes_keep_leading_zeros() {
        let secret =
            hex::decode("000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f").unwrap();
        let sk = reduce(&secret);
        assert_eq!(scalar_to_bytes(&sk).unwrap().to_vec(), secret);
    }

    #[test]
    fn test_scalar_bytes_agree_with_i2osp() {
        let largest = order().clone() - BigInt::from(1);
        for value in [BigInt::from(0), BigInt::from(1), BigInt::from(0x0100), largest] {
            let sk: FE = ECScalar::from_bigint(&value);
            let bytes = scalar_to_bytes(&sk).unwrap();
            assert_eq!(bytes.to_vec(), i2osp(&value, SCALAR_SIZE).unwrap());
            assert_eq!(os2ip(&bytes), value);
        }
    }
}
