// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

//! See [`Error`]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the scheme operations.
///
/// No operation returns a partial result together with an error:
/// a failed gen/eval yields no key material and no share.
#[derive(Error, Debug)]
pub enum Error {
    /// `$\alpha$` outside `$[-2^{n - 1}, 2^{n - 1} - 1]$`. Recoverable by the caller.
    #[error("alpha ({value}) must be within the range [{min}, {max}]")]
    AlphaOutOfRange { value: i64, min: i64, max: i64 },
    /// `x` outside `$[-2^{n - 1}, 2^{n - 1} - 1]$`. Recoverable by the caller.
    #[error("x ({value}) must be within the range [{min}, {max}]")]
    XOutOfRange { value: i64, min: i64, max: i64 },
    /// The (security parameter, group order) pair the scheme was built with is unusable.
    /// Fatal for the scheme instance.
    #[error("unsupported group: {0}")]
    UnsupportedGroup(String),
    /// Domain width outside what the `i64` input encoding supports.
    #[error("domain width must be within 1..={max} bits, got {bits}")]
    UnsupportedDomain { bits: usize, max: usize },
    /// A seed or value block of the wrong byte length reached the PRG or the
    /// conversion map. Unreachable through keys produced by this crate.
    #[error("length must be equal to the security parameter ({expected} != {actual} bytes)")]
    InvalidLength { expected: usize, actual: usize },
    /// The underlying cipher or randomness source failed.
    #[error("crypto failure: {0}")]
    CryptoFailure(String),
}
