// Copyright (C) myl7
// SPDX-License-Identifier: Apache-2.0

pub(crate) fn xor(lhs: &[u8], rhs: &[u8]) -> Vec<u8> {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter().zip(rhs.iter()).map(|(l, r)| l ^ r).collect()
}

pub(crate) fn xor_inplace(lhs: &mut [u8], rhs: &[u8]) {
    debug_assert_eq!(lhs.len(), rhs.len());
    for (l, r) in lhs.iter_mut().zip(rhs.iter()) {
        *l ^= r;
    }
}
