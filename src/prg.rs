// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! See [`Prg`]

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{KeyIvInit, StreamCipher};
use aes::{Aes128, Aes192, Aes256};
use bitvec::prelude::*;
use ctr::Ctr128BE;

use crate::error::{Error, Result};

type Aes128Ctr = Ctr128BE<Aes128>;
type Aes192Ctr = Ctr128BE<Aes192>;
type Aes256Ctr = Ctr128BE<Aes256>;

/// Index of the left half in [`ExpandedNode`] fields
pub const IDX_L: usize = 0;
/// Index of the right half in [`ExpandedNode`] fields
pub const IDX_R: usize = 1;

/// One level of the GGM tree expanded from a parent seed.
///
/// Holds `$(s_d, v_d, t_d)$` for both directions `$d \in \{L, R\}$`,
/// indexed by [`IDX_L`]/[`IDX_R`]. Seeds and value blocks are `$\lambda$` bits.
#[derive(Clone, PartialEq, Eq)]
pub struct ExpandedNode {
    pub seeds: [Vec<u8>; 2],
    pub values: [Vec<u8>; 2],
    pub t_bits: [bool; 2],
}

/// Length-doubling pseudorandom generator.
///
/// `$\{0, 1\}^{\lambda} \rightarrow \{0, 1\}^{2(2\lambda + 1)}$`,
/// deterministic in the seed.
pub trait Prg {
    fn expand(&self, seed: &[u8]) -> Result<ExpandedNode>;
}

/// AES in counter mode keyed by the seed with a zero IV as an implementation
/// of [`Prg`].
///
/// `$\lambda \in \{128, 192, 256\}$` selects AES-128/192/256. The first
/// `$4\lambda + 2$` bits of keystream are laid out as
/// `$s_L \| v_L \| t_L \| s_R \| v_R \| t_R$` with each `$t_d$` the least
/// significant bit of its byte.
pub struct AesCtrPrg {
    lambda_bytes: usize,
}

impl AesCtrPrg {
    pub fn new(lambda_bits: usize) -> Self {
        Self {
            lambda_bytes: lambda_bits / 8,
        }
    }
}

impl Prg for AesCtrPrg {
    fn expand(&self, seed: &[u8]) -> Result<ExpandedNode> {
        if seed.len() != self.lambda_bytes {
            return Err(Error::InvalidLength {
                expected: self.lambda_bytes,
                actual: seed.len(),
            });
        }

        let lb = self.lambda_bytes;
        let mut out = vec![0; 2 * (2 * lb + 1)];
        let iv = [0; 16];
        let iv = GenericArray::from_slice(&iv);
        match seed.len() {
            16 => Aes128Ctr::new(GenericArray::from_slice(seed), iv).apply_keystream(&mut out),
            24 => Aes192Ctr::new(GenericArray::from_slice(seed), iv).apply_keystream(&mut out),
            32 => Aes256Ctr::new(GenericArray::from_slice(seed), iv).apply_keystream(&mut out),
            len => {
                return Err(Error::CryptoFailure(format!(
                    "no AES variant takes a {}-bit seed as its key",
                    len * 8
                )))
            }
        }

        // Byte offsets:
        // 0      lb     2lb    2lb+1  3lb+1  4lb+1  4lb+2
        // |--sL--|--vL--|--tL--|--sR--|--vR--|--tR--|
        Ok(ExpandedNode {
            seeds: [out[..lb].to_vec(), out[2 * lb + 1..3 * lb + 1].to_vec()],
            values: [
                out[lb..2 * lb].to_vec(),
                out[3 * lb + 1..4 * lb + 1].to_vec(),
            ],
            t_bits: [
                out[2 * lb].view_bits::<Lsb0>()[0],
                out[4 * lb + 1].view_bits::<Lsb0>()[0],
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;

    use super::*;

    #[test]
    fn test_expand_is_deterministic() {
        let prg = AesCtrPrg::new(128);
        let mut seed = [0; 16];
        thread_rng().fill_bytes(&mut seed);
        let a = prg.expand(&seed).unwrap();
        let b = prg.expand(&seed).unwrap();
        assert!(a == b);
    }

    #[test]
    fn test_expand_output_widths() {
        for lambda_bits in [128, 192, 256] {
            let prg = AesCtrPrg::new(lambda_bits);
            let seed = vec![7; lambda_bits / 8];
            let node = prg.expand(&seed).unwrap();
            for d in [IDX_L, IDX_R] {
                assert_eq!(node.seeds[d].len(), lambda_bits / 8);
                assert_eq!(node.values[d].len(), lambda_bits / 8);
            }
        }
    }

    #[test]
    fn test_expand_differs_between_seeds() {
        let prg = AesCtrPrg::new(128);
        let a = prg.expand(&[0; 16]).unwrap();
        let b = prg.expand(&[1; 16]).unwrap();
        assert_ne!(a.seeds[IDX_L], b.seeds[IDX_L]);
        assert_ne!(a.seeds[IDX_R], b.seeds[IDX_R]);
        assert_ne!(a.values[IDX_L], b.values[IDX_L]);
    }

    #[test]
    fn test_expand_halves_differ() {
        let prg = AesCtrPrg::new(128);
        let node = prg.expand(&[3; 16]).unwrap();
        assert_ne!(node.seeds[IDX_L], node.seeds[IDX_R]);
        assert_ne!(node.values[IDX_L], node.values[IDX_R]);
    }

    #[test]
    fn test_expand_rejects_wrong_seed_length() {
        let prg = AesCtrPrg::new(128);
        assert!(matches!(
            prg.expand(&[0; 8]),
            Err(Error::InvalidLength { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn test_expand_rejects_unkeyable_lambda() {
        // 64-bit seeds pass the length check but key no AES variant
        let prg = AesCtrPrg::new(64);
        assert!(matches!(prg.expand(&[0; 8]), Err(Error::CryptoFailure(_))));
    }
}
