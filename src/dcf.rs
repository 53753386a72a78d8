// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! See [`DcfScheme`]

use bitvec::prelude::*;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::group::PowerOfTwoGroup;
use crate::prg::{AesCtrPrg, Prg, IDX_L, IDX_R};
use crate::utils::{xor, xor_inplace};

/// `Cw`. Correction word.
///
/// Public per-level data shared by both keys. `v` stays a signed integer
/// until it is reduced into the group on use.
#[derive(Clone)]
pub struct Cw {
    pub s: Vec<u8>,
    pub v: BigInt,
    pub tl: bool,
    pub tr: bool,
}

/// One party's DCF key.
///
/// Two keys output by one [`DcfScheme::gen`] call differ only in `party` and
/// `s0`; `cws` and `cw_np1` are value-equal but owned independently, so
/// mutating one key never affects the other.
#[derive(Clone)]
pub struct DcfKey {
    /// `false` is party 0 and `true` is party 1
    pub party: bool,
    /// `$s^{(0)}_b$`
    pub s0: Vec<u8>,
    /// One correction word per level. Its length is the domain width `n`.
    pub cws: Vec<Cw>,
    /// `$CW^{(n + 1)}$`, the final correction value
    pub cw_np1: BigInt,
}

/// Distributed comparison function over `$\mathbb{Z}_N$`, `$N = 2^k$`.
///
/// Secret-shares `$f_{\alpha, \beta}(x) = \beta$` if `$x < \alpha$` else 0
/// into two keys whose local evaluations sum to `$f(x)$` modulo `$N$`.
/// `$\alpha$` itself is not included, so `$f(\alpha) = 0$`.
///
/// Stateless apart from its parameters. Parameters are not validated at
/// construction; an unusable pair surfaces at the first gen/eval call as
/// [`Error::UnsupportedGroup`].
pub struct DcfScheme<P = AesCtrPrg> {
    pub(crate) lambda_bits: usize,
    pub(crate) group_order: BigUint,
    prg: P,
}

/// Domain widths the `i64` input encoding supports
const MAX_DOMAIN_BITS: usize = 64;

fn check_domain_width(n: usize) -> Result<()> {
    if n == 0 || n > MAX_DOMAIN_BITS {
        return Err(Error::UnsupportedDomain {
            bits: n,
            max: MAX_DOMAIN_BITS,
        });
    }
    Ok(())
}

fn domain_bounds(n: usize) -> (i64, i64) {
    let threshold = 1i128 << (n - 1);
    ((-threshold) as i64, (threshold - 1) as i64)
}

/// Maps `value` from `$[-2^{n - 1}, 2^{n - 1} - 1]$` to `$[0, 2^n - 1]$` by
/// adding `$2^{n - 1}$`. The shift is monotone, so it preserves ordering.
fn remap_to_unsigned(value: i64, n: usize) -> Option<u64> {
    let threshold = 1i128 << (n - 1);
    let value = i128::from(value);
    if value < -threshold || value >= threshold {
        return None;
    }
    Some((value + threshold) as u64)
}

impl DcfScheme<AesCtrPrg> {
    pub fn new(lambda_bits: usize, group_order: BigUint) -> Self {
        let prg = AesCtrPrg::new(lambda_bits);
        Self::with_prg(lambda_bits, group_order, prg)
    }
}

impl<P> DcfScheme<P>
where
    P: Prg,
{
    pub fn with_prg(lambda_bits: usize, group_order: BigUint, prg: P) -> Self {
        Self {
            lambda_bits,
            group_order,
            prg,
        }
    }

    pub(crate) fn group(&self) -> Result<PowerOfTwoGroup> {
        PowerOfTwoGroup::from_order(&self.group_order, self.lambda_bits)
    }

    /// Generates the two parties' keys for `$f_{\alpha, \beta}$` over an
    /// `n`-bit signed domain. `beta` is interpreted in `$\mathbb{Z}_N$`.
    pub fn gen(&self, n: usize, alpha: i64, beta: &BigInt) -> Result<(DcfKey, DcfKey)> {
        let group = self.group()?;
        check_domain_width(n)?;
        let (min, max) = domain_bounds(n);
        let alpha =
            remap_to_unsigned(alpha, n).ok_or(Error::AlphaOutOfRange { value: alpha, min, max })?;
        let alpha_bits = alpha.view_bits::<Msb0>();
        let alpha_bits = &alpha_bits[alpha_bits.len() - n..];

        let lambda_bytes = self.lambda_bits / 8;
        let mut s0s = [vec![0; lambda_bytes], vec![0; lambda_bytes]];
        for s0 in s0s.iter_mut() {
            OsRng
                .try_fill_bytes(s0)
                .map_err(|e| Error::CryptoFailure(format!("sampling initial seed: {e}")))?;
        }

        let mut v_alpha = BigInt::zero();
        let mut ss = Vec::with_capacity(n + 1);
        // Set `$s^{(0)}_0$` and `$s^{(0)}_1$`
        ss.push(s0s.clone());
        let mut ts = Vec::with_capacity(n + 1);
        // Set `$t^{(0)}_0$` and `$t^{(0)}_1$`
        ts.push([false, true]);
        let mut cws = Vec::with_capacity(n);
        for i in 1..n + 1 {
            let node0 = self.prg.expand(&ss[i - 1][0])?;
            let node1 = self.prg.expand(&ss[i - 1][1])?;
            // MSB first, since level 0 decides the topmost branch
            let alpha_i = alpha_bits[i - 1];
            let (keep, lose) = if alpha_i { (IDX_R, IDX_L) } else { (IDX_L, IDX_R) };

            let s_cw = xor(&node0.seeds[lose], &node1.seeds[lose]);
            // `$v_{CW} = (-1)^{t_1} [Convert(v_{1, lose}) - Convert(v_{0, lose}) - V_\alpha]$`
            let mut v_cw =
                group.convert(&node1.values[lose])? - group.convert(&node0.values[lose])? - &v_alpha;
            if ts[i - 1][1] {
                v_cw = -v_cw;
            }
            // When the lose branch is left it is exactly the `$x < \alpha$`
            // region under the current prefix, so it carries `$\beta$`
            if lose == IDX_L {
                if ts[i - 1][1] {
                    v_cw -= beta;
                } else {
                    v_cw += beta;
                }
            }
            // `$V_\alpha = V_\alpha - Convert(v_{1, keep}) + Convert(v_{0, keep}) + (-1)^{t_1} v_{CW}$`
            v_alpha += group.convert(&node0.values[keep])? - group.convert(&node1.values[keep])?;
            if ts[i - 1][1] {
                v_alpha -= &v_cw;
            } else {
                v_alpha += &v_cw;
            }

            let tl_cw = node0.t_bits[IDX_L] ^ node1.t_bits[IDX_L] ^ alpha_i ^ true;
            let tr_cw = node0.t_bits[IDX_R] ^ node1.t_bits[IDX_R] ^ alpha_i;
            let t_cw = [tl_cw, tr_cw];

            ss.push([
                if ts[i - 1][0] {
                    xor(&node0.seeds[keep], &s_cw)
                } else {
                    node0.seeds[keep].clone()
                },
                if ts[i - 1][1] {
                    xor(&node1.seeds[keep], &s_cw)
                } else {
                    node1.seeds[keep].clone()
                },
            ]);
            ts.push([
                node0.t_bits[keep] ^ (ts[i - 1][0] & t_cw[keep]),
                node1.t_bits[keep] ^ (ts[i - 1][1] & t_cw[keep]),
            ]);
            cws.push(Cw {
                s: s_cw,
                v: v_cw,
                tl: tl_cw,
                tr: tr_cw,
            });
        }
        assert_eq!((ss.len(), ts.len(), cws.len()), (n + 1, n + 1, n));

        // `$CW^{(n + 1)} = (-1)^{t_1} [Convert(s_1^{(n)}) - Convert(s_0^{(n)}) - V_\alpha]$`
        let mut cw_np1 = group.convert(&ss[n][1])? - group.convert(&ss[n][0])? - v_alpha;
        if ts[n][1] {
            cw_np1 = -cw_np1;
        }

        let [s0_0, s0_1] = s0s;
        let key1 = DcfKey {
            party: true,
            s0: s0_1,
            cws: cws.clone(),
            cw_np1: cw_np1.clone(),
        };
        let key0 = DcfKey {
            party: false,
            s0: s0_0,
            cws,
            cw_np1,
        };
        Ok((key0, key1))
    }

    /// Evaluates one party's key at `x`, yielding that party's additive share
    /// of `$f_{\alpha, \beta}(x)$` in `$\mathbb{Z}_N$`.
    pub fn eval(&self, key: &DcfKey, x: i64) -> Result<BigUint> {
        let group = self.group()?;
        let n = key.cws.len();
        check_domain_width(n)?;
        let (min, max) = domain_bounds(n);
        let x = remap_to_unsigned(x, n).ok_or(Error::XOutOfRange { value: x, min, max })?;
        let x_bits = x.view_bits::<Msb0>();
        let x_bits = &x_bits[x_bits.len() - n..];

        let mut ss = Vec::with_capacity(n + 1);
        ss.push(key.s0.clone());
        let mut ts = Vec::with_capacity(n + 1);
        ts.push(key.party);
        let mut v = BigInt::zero();
        for i in 1..n + 1 {
            let cw = &key.cws[i - 1];
            let mut node = self.prg.expand(&ss[i - 1])?;
            if ts[i - 1] {
                xor_inplace(&mut node.seeds[IDX_L], &cw.s);
                xor_inplace(&mut node.seeds[IDX_R], &cw.s);
                node.t_bits[IDX_L] ^= cw.tl;
                node.t_bits[IDX_R] ^= cw.tr;
            }

            let d = if x_bits[i - 1] { IDX_R } else { IDX_L };
            // `$V = V + (-1)^b [Convert(v_d) + t \cdot v_{CW}]$`
            let mut u = group.convert(&node.values[d])?;
            if ts[i - 1] {
                u += &cw.v;
            }
            if key.party {
                u = -u;
            }
            v = BigInt::from(group.reduce(&(v + u)));

            ss.push(std::mem::take(&mut node.seeds[d]));
            ts.push(node.t_bits[d]);
        }
        assert_eq!((ss.len(), ts.len()), (n + 1, n + 1));

        // `$V = V + (-1)^b [Convert(s^{(n)}) + t^{(n)} \cdot CW^{(n + 1)}]$`
        let mut w = group.convert(&ss[n])?;
        if ts[n] {
            w += &key.cw_np1;
        }
        if key.party {
            w = -w;
        }
        Ok(group.reduce(&(v + w)))
    }

    /// Sums local shares into the reconstructed function value modulo `$N$`.
    ///
    /// The two-party case is the primary one, but any number of shares is
    /// accepted.
    pub fn reconstruct(&self, shares: &[BigUint]) -> BigUint {
        let mut sum = BigUint::zero();
        for share in shares {
            sum = (sum + share) % &self.group_order;
        }
        sum
    }
}
