// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! 2-party function secret sharing of comparison functions: distributed
//! comparison function (DCF) and its dual (DDCF) from E. Boyle et al.,
//! "Function Secret Sharing for Mixed-Mode and Fixed-Point Secure
//! Computation", 2020. https://eprint.iacr.org/2020/1392 .
//!
//! A DCF secret-shares `$f_{\alpha, \beta}(x) = \beta$` if `$x < \alpha$`
//! else 0 into two succinct keys. Each party evaluates its key locally and
//! obtains an additive share of `$f(x)$` in `$\mathbb{Z}_N$`, `$N = 2^k$`;
//! summing the shares modulo `$N$` reconstructs the value. The DDCF layer
//! composes a DCF with an additive mask to realize
//! `$g(x) = \beta_0$` if `$x < \alpha$` else `$\beta_1$`.
//!
//! ```
//! use dcf_fss::DcfScheme;
//! use num_bigint::{BigInt, BigUint};
//!
//! let scheme = DcfScheme::new(128, BigUint::from(1u8) << 16);
//! let (key0, key1) = scheme.gen(8, 10, &BigInt::from(1)).unwrap();
//! let y0 = scheme.eval(&key0, 5).unwrap();
//! let y1 = scheme.eval(&key1, 5).unwrap();
//! // 5 < 10, so the shares reconstruct to beta
//! assert_eq!(scheme.reconstruct(&[y0, y1]), BigUint::from(1u8));
//! ```

pub mod dcf;
pub mod ddcf;
pub mod error;
pub mod group;
pub mod prg;
mod utils;

pub use dcf::{Cw, DcfKey, DcfScheme};
pub use ddcf::DdcfKey;
pub use error::{Error, Result};
