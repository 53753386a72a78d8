// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! Output group `$\mathbb{Z}_N$` for `$N = 2^k$`, `$k \le \lambda$`.
//!
//! - Associative operation: integer addition modulo `$N$`
//! - Identity element: 0
//! - Inverse element: `$-x \mod N$`
//!
//! `Convert` for such a group is "take the first `$k$` bits of the block":
//! it commutes with the additive structure and keeps PRG outputs pseudorandom.

use num_bigint::{BigInt, BigUint, Sign};

use crate::error::{Error, Result};

/// Validated `$\mathbb{Z}_{2^k}$` parameters of a scheme.
///
/// Construction is the single validation point for the `(lambda, N)` pair
/// a scheme was built with, so invalid parameters surface at the first
/// gen/eval call rather than at scheme construction.
pub struct PowerOfTwoGroup {
    /// `$N$`, kept signed for the correction-word algebra
    order: BigInt,
    /// `$k$`, the bit length of a group element
    bits: usize,
    lambda_bytes: usize,
}

impl PowerOfTwoGroup {
    pub fn from_order(order: &BigUint, lambda_bits: usize) -> Result<Self> {
        if lambda_bits == 0 || lambda_bits % 8 != 0 {
            return Err(Error::UnsupportedGroup(format!(
                "security parameter must be a positive multiple of 8 bits, got {lambda_bits}"
            )));
        }
        if order.count_ones() != 1 {
            return Err(Error::UnsupportedGroup(
                "group order must be a positive power of two".to_owned(),
            ));
        }
        let bits = (order.bits() - 1) as usize;
        if bits > lambda_bits {
            return Err(Error::UnsupportedGroup(format!(
                "group order bit length must be less than or equal to the security parameter \
                 ({bits} > {lambda_bits})"
            )));
        }
        Ok(Self {
            order: BigInt::from(order.clone()),
            bits,
            lambda_bytes: lambda_bits / 8,
        })
    }

    /// `$Convert_\mathbb{G}: \{0, 1\}^\lambda \rightarrow \mathbb{G}$`.
    ///
    /// Reads the first `$\lceil k / 8 \rceil$` bytes of `block` as a
    /// big-endian integer and drops the excess low bits, so the result is the
    /// first `$k$` bits of the block and lies in `$[0, N)$`.
    pub fn convert(&self, block: &[u8]) -> Result<BigInt> {
        if block.len() != self.lambda_bytes {
            return Err(Error::InvalidLength {
                expected: self.lambda_bytes,
                actual: block.len(),
            });
        }
        let prefix_bytes = (self.bits + 7) / 8;
        let prefix = BigUint::from_bytes_be(&block[..prefix_bytes]);
        Ok(BigInt::from(prefix >> (8 * prefix_bytes - self.bits)))
    }

    /// Canonical nonnegative representative of `value` modulo `$N$`.
    ///
    /// Correction values stay signed through key generation; every value
    /// handed back to a caller goes through here.
    pub fn reduce(&self, value: &BigInt) -> BigUint {
        let mut rem = value % &self.order;
        if rem.sign() == Sign::Minus {
            rem += &self.order;
        }
        rem.magnitude().clone()
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;

    use super::*;

    fn pow2(k: usize) -> BigUint {
        BigUint::from(1u8) << k
    }

    #[test]
    fn test_convert_takes_leading_bytes() {
        let group = PowerOfTwoGroup::from_order(&pow2(16), 128).unwrap();
        let mut block = [0u8; 16];
        block[0] = 0xab;
        block[1] = 0xcd;
        block[2] = 0xff;
        assert_eq!(group.convert(&block).unwrap(), BigInt::from(0xabcd));
    }

    #[test]
    fn test_convert_drops_low_bits_of_partial_byte() {
        let group = PowerOfTwoGroup::from_order(&pow2(12), 128).unwrap();
        let mut block = [0u8; 16];
        block[0] = 0xab;
        block[1] = 0xcd;
        assert_eq!(group.convert(&block).unwrap(), BigInt::from(0xabc));
    }

    #[test]
    fn test_convert_keeps_high_order_bit() {
        let group = PowerOfTwoGroup::from_order(&pow2(16), 128).unwrap();
        let mut block = [0u8; 16];
        block[0] = 0x80;
        assert_eq!(group.convert(&block).unwrap(), BigInt::from(0x8000));
    }

    #[test]
    fn test_convert_output_within_group() {
        let group = PowerOfTwoGroup::from_order(&pow2(13), 128).unwrap();
        let mut block = [0u8; 16];
        for _ in 0..100 {
            thread_rng().fill_bytes(&mut block);
            let value = group.convert(&block).unwrap();
            assert!(value >= BigInt::from(0));
            assert!(value < BigInt::from(pow2(13)));
        }
    }

    #[test]
    fn test_convert_rejects_wrong_block_length() {
        let group = PowerOfTwoGroup::from_order(&pow2(16), 128).unwrap();
        assert!(matches!(
            group.convert(&[0; 15]),
            Err(Error::InvalidLength { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_rejects_non_power_of_two_order() {
        assert!(matches!(
            PowerOfTwoGroup::from_order(&BigUint::from(100u8), 128),
            Err(Error::UnsupportedGroup(_))
        ));
        assert!(matches!(
            PowerOfTwoGroup::from_order(&BigUint::from(0u8), 128),
            Err(Error::UnsupportedGroup(_))
        ));
    }

    #[test]
    fn test_rejects_order_wider_than_lambda() {
        assert!(matches!(
            PowerOfTwoGroup::from_order(&pow2(129), 128),
            Err(Error::UnsupportedGroup(_))
        ));
        // k = lambda is the widest supported group
        assert!(PowerOfTwoGroup::from_order(&pow2(128), 128).is_ok());
    }

    #[test]
    fn test_rejects_bad_lambda() {
        assert!(matches!(
            PowerOfTwoGroup::from_order(&pow2(16), 0),
            Err(Error::UnsupportedGroup(_))
        ));
        assert!(matches!(
            PowerOfTwoGroup::from_order(&pow2(16), 20),
            Err(Error::UnsupportedGroup(_))
        ));
    }

    #[test]
    fn test_reduce_yields_canonical_representative() {
        let group = PowerOfTwoGroup::from_order(&pow2(16), 128).unwrap();
        assert_eq!(group.reduce(&BigInt::from(-1)), BigUint::from(65535u32));
        assert_eq!(group.reduce(&BigInt::from(65536)), BigUint::from(0u32));
        assert_eq!(group.reduce(&BigInt::from(-65537)), BigUint::from(65535u32));
        assert_eq!(group.reduce(&BigInt::from(123)), BigUint::from(123u32));
    }
}
