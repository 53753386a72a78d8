// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! See [`DdcfKey`]

use num_bigint::{BigInt, BigUint, RandBigInt};
use rand::rngs::OsRng;

use crate::dcf::{DcfKey, DcfScheme};
use crate::error::Result;
use crate::prg::Prg;

/// One party's dual-DCF key.
///
/// Realizes `$g(x) = \beta_0$` if `$x < \alpha$` else `$\beta_1$` as a DCF
/// for `$\beta_0 - \beta_1$` plus an additive share of `$\beta_1$`.
#[derive(Clone)]
pub struct DdcfKey {
    pub key: DcfKey,
    /// Additive share of `$\beta_1$`: the two keys' shares sum to
    /// `$\beta_1 \mod N$`
    pub s: BigUint,
}

impl<P> DcfScheme<P>
where
    P: Prg,
{
    /// Generates the two parties' keys for
    /// `$g(x) = \beta_0 \cdot [x < \alpha] + \beta_1 \cdot [x \ge \alpha]$`.
    pub fn gen_ddcf(
        &self,
        n: usize,
        alpha: i64,
        beta0: &BigInt,
        beta1: &BigInt,
    ) -> Result<(DdcfKey, DdcfKey)> {
        let group = self.group()?;
        // The canonical nonnegative representative, also when beta0 < beta1
        let delta = BigInt::from(group.reduce(&(beta0 - beta1)));
        let (key0, key1) = self.gen(n, alpha, &delta)?;

        let s0 = OsRng.gen_biguint_below(&self.group_order);
        let s1 = group.reduce(&(beta1 - BigInt::from(s0.clone())));
        Ok((DdcfKey { key: key0, s: s0 }, DdcfKey { key: key1, s: s1 }))
    }

    /// Evaluates one party's dual-DCF key at `x`, yielding that party's
    /// additive share of `$g(x)$` in `$\mathbb{Z}_N$`.
    pub fn eval_ddcf(&self, key: &DdcfKey, x: i64) -> Result<BigUint> {
        let y = self.eval(&key.key, x)?;
        Ok((y + &key.s) % &self.group_order)
    }
}
