// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! 32-bit hash primitives for group-by key fields.
//!
//! The sequence hash is the conventional ordered walk `h = 31*h + element`
//! starting from 1, so the empty sequence hashes to 1. Wide elements fold to
//! 32 bits by XOR-ing their halves; double bits are canonicalized so every
//! NaN hashes alike. These values are internal to the process and are never
//! compared against hashes produced elsewhere.

/// Multiplier for the sub-range byte hash. Prime.
pub(crate) const SUB_RANGE_HASH_PRIME: i32 = 461;

pub(crate) fn fold_i64(value: i64) -> i32 {
    (value ^ (value >> 32)) as i32
}

/// Bit pattern of a double with all NaNs collapsed to the canonical NaN.
pub(crate) fn canonical_f64_bits(value: f64) -> i64 {
    if value.is_nan() {
        f64::NAN.to_bits() as i64
    } else {
        value.to_bits() as i64
    }
}

/// Key equality for doubles: canonical bit comparison, so NaN keys group
/// with themselves while `0.0` and `-0.0` stay distinct, in agreement with
/// `hash_f64_slice`.
pub(crate) fn double_key_equal(left: f64, right: f64) -> bool {
    canonical_f64_bits(left) == canonical_f64_bits(right)
}

pub(crate) fn hash_i64_slice(values: &[i64]) -> i32 {
    let mut hash: i32 = 1;
    for value in values {
        hash = hash.wrapping_mul(31).wrapping_add(fold_i64(*value));
    }
    hash
}

pub(crate) fn hash_f64_slice(values: &[f64]) -> i32 {
    let mut hash: i32 = 1;
    for value in values {
        hash = hash
            .wrapping_mul(31)
            .wrapping_add(fold_i64(canonical_f64_bits(*value)));
    }
    hash
}

pub(crate) fn hash_bool_slice(values: &[bool]) -> i32 {
    let mut hash: i32 = 1;
    for value in values {
        hash = hash
            .wrapping_mul(31)
            .wrapping_add(if *value { 1231 } else { 1237 });
    }
    hash
}

/// Sequence hash over a whole byte slice. Bytes contribute sign-extended, the
/// same way they fold everywhere else in this module.
pub(crate) fn hash_byte_slice(bytes: &[u8]) -> i32 {
    let mut hash: i32 = 1;
    for byte in bytes {
        hash = hash.wrapping_mul(31).wrapping_add(*byte as i8 as i32);
    }
    hash
}

/// XOR-accumulated hash over `bytes[start..start + length]`, each byte scaled
/// by a prime. Cheaper than the sequence hash for sub-ranges since no
/// sub-slice ever needs materializing; deliberately NOT the same function as
/// `hash_byte_slice`, so callers must pick by range shape consistently.
pub(crate) fn hash_byte_range(bytes: &[u8], start: usize, length: usize) -> i32 {
    let mut hash: i32 = 0;
    for byte in &bytes[start..start + length] {
        hash ^= SUB_RANGE_HASH_PRIME.wrapping_mul(*byte as i8 as i32);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::{
        canonical_f64_bits, double_key_equal, hash_bool_slice, hash_byte_range, hash_byte_slice,
        hash_f64_slice, hash_i64_slice,
    };

    #[test]
    fn test_empty_sequences_hash_to_constant() {
        assert_eq!(hash_i64_slice(&[]), 1);
        assert_eq!(hash_f64_slice(&[]), 1);
        assert_eq!(hash_bool_slice(&[]), 1);
        assert_eq!(hash_byte_slice(&[]), 1);
        assert_eq!(hash_byte_range(b"abc", 1, 0), 0);
    }

    #[test]
    fn test_sequence_hash_is_order_sensitive() {
        assert_ne!(hash_i64_slice(&[1, 2]), hash_i64_slice(&[2, 1]));
        assert_ne!(hash_byte_slice(b"ab"), hash_byte_slice(b"ba"));
    }

    #[test]
    fn test_nan_bits_are_canonical() {
        let quiet = f64::NAN;
        let payload = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(canonical_f64_bits(quiet), canonical_f64_bits(payload));
        assert!(double_key_equal(quiet, payload));
        assert!(!double_key_equal(0.0, -0.0));
    }

    #[test]
    fn test_byte_range_matches_manual_xor() {
        let bytes = b"xylophone";
        let mut expected: i32 = 0;
        for byte in &bytes[2..7] {
            expected ^= 461i32.wrapping_mul(*byte as i8 as i32);
        }
        assert_eq!(hash_byte_range(bytes, 2, 5), expected);
    }

    #[test]
    fn test_whole_slice_and_sub_range_formulas_differ() {
        // Same logical content through the two paths hashes differently;
        // equality stays content-based, so this only affects distribution.
        let exact = b"ab";
        let padded = b"zabz";
        assert_ne!(hash_byte_slice(exact), hash_byte_range(padded, 1, 2));
    }
}
