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
use std::hash::{Hash, Hasher};

use crate::common::types::{DecimalValue, IntervalDayTimeValue, TimestampValue};
use crate::runtime::mem_model;

use super::hash;
use super::key_bytes::KeyBytes;
use super::key_layout::{FieldClass, KeyLayout};

/// Extracts a decimal at a row position into a pre-allocated slot.
/// Implementations are column vectors; rows passed here are non-null.
pub trait DecimalKeySource {
    fn read_decimal(&self, row: usize, target: &mut DecimalValue);
}

/// Extracts a timestamp at a row position into a pre-allocated slot.
pub trait TimestampKeySource {
    fn read_timestamp(&self, row: usize, target: &mut TimestampValue);
}

/// Extracts a day-time interval at a row position into a pre-allocated slot.
pub trait IntervalDayTimeKeySource {
    fn read_interval_day_time(&self, row: usize, target: &mut IntervalDayTimeValue);
}

/// A composite group-by key over one row of a column batch.
///
/// Key values are stored as primitives in per-class arrays, with a flat null
/// bitmap addressed through [`KeyLayout::offset_of`]. One transient wrapper
/// is built per layout and reused across rows: typed `assign_*` calls
/// populate the fields for a row, then `set_hash_key` commits the hash, then
/// the key is probed against the aggregation hash table. The cached hash is
/// NOT invalidated by mutation; re-running `set_hash_key` after the last
/// assignment of each row is part of the caller protocol, and equality uses
/// the cached value as a fast pre-check, so comparing keys with stale hashes
/// is meaningless.
///
/// String fields hold zero-copy views into batch-owned buffers (see
/// [`KeyBytes`]); a table retaining a key on first sight must store
/// [`HashKeyWrapper::duplicate`], which detaches all byte storage.
///
/// Class-local field indexes out of range are programming errors and panic.
#[derive(Debug)]
pub struct HashKeyWrapper {
    layout: KeyLayout,

    long_values: Vec<i64>,
    double_values: Vec<f64>,

    byte_values: Vec<KeyBytes>,
    byte_starts: Vec<usize>,
    byte_lengths: Vec<usize>,

    decimal_values: Vec<DecimalValue>,
    timestamp_values: Vec<TimestampValue>,
    interval_day_time_values: Vec<IntervalDayTimeValue>,

    is_null: Vec<bool>,
    hashcode: i32,
}

impl HashKeyWrapper {
    /// Build an all-zero, all-non-null key for `layout`. Decimal, timestamp
    /// and interval slots are pre-allocated to their zero values so that
    /// assignment mutates slot contents and never replaces slot identity.
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            long_values: vec![0; layout.num_long()],
            double_values: vec![0.0; layout.num_double()],
            byte_values: vec![KeyBytes::empty(); layout.num_bytes()],
            byte_starts: vec![0; layout.num_bytes()],
            byte_lengths: vec![0; layout.num_bytes()],
            decimal_values: vec![DecimalValue::ZERO; layout.num_decimal()],
            timestamp_values: vec![TimestampValue::EPOCH; layout.num_timestamp()],
            interval_day_time_values: vec![
                IntervalDayTimeValue::ZERO;
                layout.num_interval_day_time()
            ],
            is_null: vec![false; layout.total_fields()],
            hashcode: 0,
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub fn assign_long(&mut self, index: usize, value: i64) {
        self.long_values[index] = value;
        self.is_null[self.layout.offset_of(FieldClass::Long, index)] = false;
    }

    pub fn assign_null_long(&mut self, index: usize) {
        // Zero keeps the value-array hash branch-free on nulls.
        self.long_values[index] = 0;
        self.is_null[self.layout.offset_of(FieldClass::Long, index)] = true;
    }

    pub fn assign_double(&mut self, index: usize, value: f64) {
        self.double_values[index] = value;
        self.is_null[self.layout.offset_of(FieldClass::Double, index)] = false;
    }

    pub fn assign_null_double(&mut self, index: usize) {
        self.double_values[index] = 0.0;
        self.is_null[self.layout.offset_of(FieldClass::Double, index)] = true;
    }

    /// Record a zero-copy view of `bytes[start..start + length]` without
    /// copying. The caller keeps `bytes` alive and unmoved until this field
    /// is re-assigned or the key is duplicated.
    pub fn assign_string(&mut self, index: usize, bytes: &[u8], start: usize, length: usize) {
        debug_assert!(start + length <= bytes.len());
        self.byte_values[index] = KeyBytes::borrowed(bytes);
        self.byte_starts[index] = start;
        self.byte_lengths[index] = length;
        self.is_null[self.layout.offset_of(FieldClass::Bytes, index)] = false;
    }

    /// Null fields are never read, so the stale view is left in place.
    pub fn assign_null_string(&mut self, index: usize) {
        self.is_null[self.layout.offset_of(FieldClass::Bytes, index)] = true;
    }

    pub fn assign_decimal(&mut self, index: usize, value: &DecimalValue) {
        self.decimal_values[index].set(value);
        self.is_null[self.layout.offset_of(FieldClass::Decimal, index)] = false;
    }

    /// Assign by delegating extraction to a column accessor, keeping the key
    /// independent of concrete column storage. `row` must be non-null in the
    /// source column.
    pub fn assign_decimal_from<S: DecimalKeySource + ?Sized>(
        &mut self,
        index: usize,
        source: &S,
        row: usize,
    ) {
        source.read_decimal(row, &mut self.decimal_values[index]);
        self.is_null[self.layout.offset_of(FieldClass::Decimal, index)] = false;
    }

    pub fn assign_null_decimal(&mut self, index: usize) {
        self.is_null[self.layout.offset_of(FieldClass::Decimal, index)] = true;
    }

    pub fn assign_timestamp(&mut self, index: usize, value: &TimestampValue) {
        self.timestamp_values[index].set(value);
        self.is_null[self.layout.offset_of(FieldClass::Timestamp, index)] = false;
    }

    pub fn assign_timestamp_from<S: TimestampKeySource + ?Sized>(
        &mut self,
        index: usize,
        source: &S,
        row: usize,
    ) {
        source.read_timestamp(row, &mut self.timestamp_values[index]);
        self.is_null[self.layout.offset_of(FieldClass::Timestamp, index)] = false;
    }

    pub fn assign_null_timestamp(&mut self, index: usize) {
        self.is_null[self.layout.offset_of(FieldClass::Timestamp, index)] = true;
    }

    pub fn assign_interval_day_time(&mut self, index: usize, value: &IntervalDayTimeValue) {
        self.interval_day_time_values[index].set(value);
        self.is_null[self.layout.offset_of(FieldClass::IntervalDayTime, index)] = false;
    }

    pub fn assign_interval_day_time_from<S: IntervalDayTimeKeySource + ?Sized>(
        &mut self,
        index: usize,
        source: &S,
        row: usize,
    ) {
        source.read_interval_day_time(row, &mut self.interval_day_time_values[index]);
        self.is_null[self.layout.offset_of(FieldClass::IntervalDayTime, index)] = false;
    }

    pub fn assign_null_interval_day_time(&mut self, index: usize) {
        self.is_null[self.layout.offset_of(FieldClass::IntervalDayTime, index)] = true;
    }

    /// Commit the hash of the current field values. Must run after the last
    /// assignment of a row and before the key reaches a hash table; nothing
    /// recomputes it implicitly.
    pub fn set_hash_key(&mut self) {
        let mut code = hash::hash_i64_slice(&self.long_values)
            ^ hash::hash_f64_slice(&self.double_values)
            ^ hash::hash_bool_slice(&self.is_null);

        for decimal in &self.decimal_values {
            code ^= decimal.fast_hash();
        }
        for timestamp in &self.timestamp_values {
            code ^= timestamp.fast_hash();
        }
        for interval in &self.interval_day_time_values {
            code ^= interval.fast_hash();
        }

        // Hashing bytes is expensive, and null byte fields have no
        // deterministic backing value, so branch on the null flag instead of
        // resetting views on null assignment.
        for index in 0..self.byte_values.len() {
            if self.is_null[self.layout.offset_of(FieldClass::Bytes, index)] {
                continue;
            }
            let bytes = self.byte_values[index].as_slice();
            let start = self.byte_starts[index];
            let length = self.byte_lengths[index];
            code ^= if start == 0 && length == bytes.len() {
                hash::hash_byte_slice(bytes)
            } else {
                hash::hash_byte_range(bytes, start, length)
            };
        }

        self.hashcode = code;
    }

    /// The hash committed by the last `set_hash_key` call.
    pub fn hash_code(&self) -> i32 {
        self.hashcode
    }

    /// Deep copy that detaches every non-null byte field from its batch
    /// buffer, for retention as a permanent hash-table key.
    pub fn duplicate(&self) -> HashKeyWrapper {
        let num_bytes = self.byte_values.len();
        let mut byte_values = Vec::with_capacity(num_bytes);
        let byte_starts = vec![0; num_bytes];
        for index in 0..num_bytes {
            if self.is_null[self.layout.offset_of(FieldClass::Bytes, index)] {
                // Null fields are never read; skip the allocation.
                byte_values.push(KeyBytes::empty());
                continue;
            }
            let start = self.byte_starts[index];
            let length = self.byte_lengths[index];
            let source = self.byte_values[index].as_slice();
            byte_values.push(KeyBytes::owned_copy(&source[start..start + length]));
        }

        let clone = HashKeyWrapper {
            layout: self.layout,
            long_values: self.long_values.clone(),
            double_values: self.double_values.clone(),
            byte_values,
            byte_starts,
            byte_lengths: self.byte_lengths.clone(),
            decimal_values: self.decimal_values.clone(),
            timestamp_values: self.timestamp_values.clone(),
            interval_day_time_values: self.interval_day_time_values.clone(),
            is_null: self.is_null.clone(),
            // Cloned fields are value-identical, so the committed hash
            // carries over without recomputation.
            hashcode: self.hashcode,
        };
        debug_assert!(clone == *self);
        clone
    }

    /// Accounted footprint of the variable-length fields, fed to memory
    /// tracking by callers that retain this key. Sums the data-model
    /// footprint of every byte field's recorded length.
    pub fn variable_size(&self) -> i64 {
        self.byte_lengths
            .iter()
            .map(|length| mem_model::byte_array_footprint(*length))
            .sum()
    }

    /// Adopting another key's state in place belongs to row-oriented key
    /// wrappers; vectorized keys are retained through `duplicate`.
    pub fn copy_key_from(&mut self, _source: &HashKeyWrapper) -> Result<(), String> {
        Err("copy_key_from is not supported for vectorized hash keys".to_string())
    }

    /// Populating a key from a materialized row object belongs to
    /// row-oriented key wrappers; vectorized keys take typed assigns.
    pub fn assign_from_row_object(&mut self) -> Result<(), String> {
        Err("vectorized hash keys are populated by typed assigns, not row objects".to_string())
    }

    pub fn get_long_value(&self, index: usize) -> i64 {
        self.long_values[index]
    }

    pub fn get_double_value(&self, index: usize) -> f64 {
        self.double_values[index]
    }

    /// Backing slice of a byte field; pair with `get_byte_start` and
    /// `get_byte_length` to address the logical range.
    pub fn get_bytes(&self, index: usize) -> &[u8] {
        self.byte_values[index].as_slice()
    }

    pub fn get_byte_start(&self, index: usize) -> usize {
        self.byte_starts[index]
    }

    pub fn get_byte_length(&self, index: usize) -> usize {
        self.byte_lengths[index]
    }

    pub fn get_decimal(&self, index: usize) -> &DecimalValue {
        &self.decimal_values[index]
    }

    pub fn get_timestamp(&self, index: usize) -> &TimestampValue {
        &self.timestamp_values[index]
    }

    pub fn get_interval_day_time(&self, index: usize) -> &IntervalDayTimeValue {
        &self.interval_day_time_values[index]
    }

    pub fn is_long_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::Long, index)]
    }

    pub fn is_double_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::Double, index)]
    }

    pub fn is_bytes_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::Bytes, index)]
    }

    pub fn is_decimal_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::Decimal, index)]
    }

    pub fn is_timestamp_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::Timestamp, index)]
    }

    pub fn is_interval_day_time_null(&self, index: usize) -> bool {
        self.is_null[self.layout.offset_of(FieldClass::IntervalDayTime, index)]
    }

    /// Byte-for-byte comparison of each non-null byte field's logical range.
    /// Backing-slice identity and offsets are irrelevant; only content
    /// counts. Null flags were already matched through `is_null` equality.
    fn byte_ranges_equal(&self, other: &HashKeyWrapper) -> bool {
        for index in 0..self.byte_values.len() {
            if self.is_null[self.layout.offset_of(FieldClass::Bytes, index)] {
                continue;
            }
            let left = self.byte_values[index].as_slice();
            let right = other.byte_values[index].as_slice();
            let left_start = self.byte_starts[index];
            let right_start = other.byte_starts[index];
            if left[left_start..left_start + self.byte_lengths[index]]
                != right[right_start..right_start + other.byte_lengths[index]]
            {
                return false;
            }
        }
        true
    }

    fn double_values_equal(&self, other: &HashKeyWrapper) -> bool {
        self.double_values.len() == other.double_values.len()
            && self
                .double_values
                .iter()
                .zip(&other.double_values)
                .all(|(left, right)| hash::double_key_equal(*left, *right))
    }
}

impl PartialEq for HashKeyWrapper {
    /// The cached-hash comparison is a fast pre-check over already-committed
    /// hashes; keys from different layouts fall out as not-equal through the
    /// array length comparisons.
    fn eq(&self, other: &Self) -> bool {
        self.hashcode == other.hashcode
            && self.long_values == other.long_values
            && self.double_values_equal(other)
            && self.decimal_values == other.decimal_values
            && self.timestamp_values == other.timestamp_values
            && self.interval_day_time_values == other.interval_day_time_values
            && self.is_null == other.is_null
            && self.byte_values.len() == other.byte_values.len()
            && (self.byte_values.is_empty() || self.byte_ranges_equal(other))
    }
}

impl Eq for HashKeyWrapper {}

impl Hash for HashKeyWrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hashcode);
    }
}
