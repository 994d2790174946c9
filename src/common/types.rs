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
//! Opaque value types held in pre-allocated group-by key slots.
//!
//! Each type exposes in-place assignment (`set`), a zero value used for slot
//! pre-allocation, structural equality, and `fast_hash`, a 32-bit structural
//! hash over the internal representation. The hash conventions here are
//! internal to this crate: fast_hash values are only ever compared against
//! fast_hash values produced by the same build.

const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn fold_i64(value: i64) -> i32 {
    (value ^ (value >> 32)) as i32
}

fn fold_i128(value: i128) -> i32 {
    let low = value as i64;
    let high = (value >> 64) as i64;
    fold_i64(low) ^ fold_i64(high)
}

/// Fixed-point decimal as an unscaled integer plus a scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecimalValue {
    unscaled: i128,
    scale: i8,
}

impl DecimalValue {
    pub const ZERO: DecimalValue = DecimalValue {
        unscaled: 0,
        scale: 0,
    };

    pub fn new(unscaled: i128, scale: i8) -> Self {
        Self { unscaled, scale }
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn scale(&self) -> i8 {
        self.scale
    }

    /// In-place assignment; slot identity is preserved.
    pub fn set(&mut self, other: &DecimalValue) {
        self.unscaled = other.unscaled;
        self.scale = other.scale;
    }

    pub fn set_parts(&mut self, unscaled: i128, scale: i8) {
        self.unscaled = unscaled;
        self.scale = scale;
    }

    /// Fast structural hash over the unscaled value and scale, never over a
    /// rendered representation.
    pub fn fast_hash(&self) -> i32 {
        fold_i128(self.unscaled)
            .wrapping_mul(31)
            .wrapping_add(self.scale as i32)
    }
}

/// An instant as whole seconds since the epoch plus a sub-second nanosecond
/// component in `[0, 1_000_000_000)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampValue {
    seconds: i64,
    nanos: u32,
}

impl TimestampValue {
    pub const EPOCH: TimestampValue = TimestampValue {
        seconds: 0,
        nanos: 0,
    };

    pub fn new(seconds: i64, nanos: u32) -> Self {
        debug_assert!((nanos as i64) < NANOS_PER_SECOND);
        Self { seconds, nanos }
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// In-place assignment; slot identity is preserved.
    pub fn set(&mut self, other: &TimestampValue) {
        self.seconds = other.seconds;
        self.nanos = other.nanos;
    }

    pub fn set_parts(&mut self, seconds: i64, nanos: u32) {
        debug_assert!((nanos as i64) < NANOS_PER_SECOND);
        self.seconds = seconds;
        self.nanos = nanos;
    }

    /// Fast structural hash over the instant (seconds and nanoseconds).
    pub fn fast_hash(&self) -> i32 {
        fold_i64(self.seconds)
            .wrapping_mul(31)
            .wrapping_add(self.nanos as i32)
    }
}

/// A day-time interval as whole days plus nanoseconds within the day. The
/// nanosecond component keeps the sign of the source interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalDayTimeValue {
    days: i32,
    nanos: i64,
}

impl IntervalDayTimeValue {
    pub const ZERO: IntervalDayTimeValue = IntervalDayTimeValue { days: 0, nanos: 0 };

    pub fn new(days: i32, nanos: i64) -> Self {
        Self { days, nanos }
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    /// In-place assignment; slot identity is preserved.
    pub fn set(&mut self, other: &IntervalDayTimeValue) {
        self.days = other.days;
        self.nanos = other.nanos;
    }

    pub fn set_parts(&mut self, days: i32, nanos: i64) {
        self.days = days;
        self.nanos = nanos;
    }

    /// Fast structural hash over the (days, nanoseconds-of-day) pair.
    pub fn fast_hash(&self) -> i32 {
        self.days.wrapping_mul(31).wrapping_add(fold_i64(self.nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::{DecimalValue, IntervalDayTimeValue, TimestampValue};

    #[test]
    fn test_decimal_set_preserves_slot_and_changes_hash() {
        let mut slot = DecimalValue::ZERO;
        let zero_hash = slot.fast_hash();
        slot.set(&DecimalValue::new(314, 2));
        assert_eq!(slot, DecimalValue::new(314, 2));
        assert_ne!(slot.fast_hash(), zero_hash);
    }

    #[test]
    fn test_decimal_hash_depends_on_scale() {
        let one_scale_zero = DecimalValue::new(1, 0);
        let one_scale_two = DecimalValue::new(1, 2);
        assert_ne!(one_scale_zero, one_scale_two);
        assert_ne!(one_scale_zero.fast_hash(), one_scale_two.fast_hash());
    }

    #[test]
    fn test_decimal_hash_covers_high_bits() {
        let low = DecimalValue::new(7, 0);
        let high = DecimalValue::new(7i128 << 64, 0);
        assert_ne!(low.fast_hash(), high.fast_hash());
    }

    #[test]
    fn test_timestamp_hash_covers_nanos() {
        let whole = TimestampValue::new(1_700_000_000, 0);
        let sub = TimestampValue::new(1_700_000_000, 1);
        assert_ne!(whole, sub);
        assert_ne!(whole.fast_hash(), sub.fast_hash());
    }

    #[test]
    fn test_interval_structural_equality() {
        let mut slot = IntervalDayTimeValue::ZERO;
        slot.set_parts(3, 1_500_000_000);
        assert_eq!(slot, IntervalDayTimeValue::new(3, 1_500_000_000));
        assert_ne!(slot, IntervalDayTimeValue::new(3, 1_500_000_001));
    }
}
