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
//! Drives group-by key population from Arrow column batches.
//!
//! Responsibilities:
//! - Compiles group-by column types into a [`KeyLayout`] and per-column
//!   field slots.
//! - Wraps columns in typed views and invokes the matching typed assign on
//!   the transient key, row by row.
//!
//! String and binary views hand the key the column's backing value buffer
//! with per-row start/length, so populating a key copies no bytes.

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Date32Array, Decimal128Array, Float32Array,
    Float64Array, Int8Array, Int16Array, Int32Array, Int64Array, IntervalDayTimeArray,
    StringArray, TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, IntervalUnit, TimeUnit};

use crate::common::types::{DecimalValue, IntervalDayTimeValue, TimestampValue};
use crate::veckey_logging::debug;

use super::key_layout::{FieldClass, KeyLayout};
use super::key_wrapper::{
    DecimalKeySource, HashKeyWrapper, IntervalDayTimeKeySource, TimestampKeySource,
};

/// Where one group-by column lands in the key: its field class and its
/// class-local slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyField {
    pub class: FieldClass,
    pub index: usize,
}

pub enum LongKeyView<'a> {
    Int64(&'a Int64Array),
    Int32(&'a Int32Array),
    Int16(&'a Int16Array),
    Int8(&'a Int8Array),
    Date32(&'a Date32Array),
    Boolean(&'a BooleanArray),
}

impl<'a> LongKeyView<'a> {
    pub fn new(array: &'a ArrayRef) -> Result<Self, String> {
        match array.data_type() {
            DataType::Int64 => array
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(Self::Int64)
                .ok_or_else(|| "failed to downcast to Int64Array".to_string()),
            DataType::Int32 => array
                .as_any()
                .downcast_ref::<Int32Array>()
                .map(Self::Int32)
                .ok_or_else(|| "failed to downcast to Int32Array".to_string()),
            DataType::Int16 => array
                .as_any()
                .downcast_ref::<Int16Array>()
                .map(Self::Int16)
                .ok_or_else(|| "failed to downcast to Int16Array".to_string()),
            DataType::Int8 => array
                .as_any()
                .downcast_ref::<Int8Array>()
                .map(Self::Int8)
                .ok_or_else(|| "failed to downcast to Int8Array".to_string()),
            DataType::Date32 => array
                .as_any()
                .downcast_ref::<Date32Array>()
                .map(Self::Date32)
                .ok_or_else(|| "failed to downcast to Date32Array".to_string()),
            DataType::Boolean => array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .map(Self::Boolean)
                .ok_or_else(|| "failed to downcast to BooleanArray".to_string()),
            other => Err(format!("unsupported long key input type: {:?}", other)),
        }
    }

    pub fn value_at(&self, row: usize) -> Option<i64> {
        match self {
            LongKeyView::Int64(arr) => (!arr.is_null(row)).then(|| arr.value(row)),
            LongKeyView::Int32(arr) => (!arr.is_null(row)).then(|| arr.value(row) as i64),
            LongKeyView::Int16(arr) => (!arr.is_null(row)).then(|| arr.value(row) as i64),
            LongKeyView::Int8(arr) => (!arr.is_null(row)).then(|| arr.value(row) as i64),
            LongKeyView::Date32(arr) => (!arr.is_null(row)).then(|| arr.value(row) as i64),
            LongKeyView::Boolean(arr) => (!arr.is_null(row)).then(|| i64::from(arr.value(row))),
        }
    }
}

pub enum DoubleKeyView<'a> {
    Float64(&'a Float64Array),
    Float32(&'a Float32Array),
}

impl<'a> DoubleKeyView<'a> {
    pub fn new(array: &'a ArrayRef) -> Result<Self, String> {
        match array.data_type() {
            DataType::Float64 => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(Self::Float64)
                .ok_or_else(|| "failed to downcast to Float64Array".to_string()),
            DataType::Float32 => array
                .as_any()
                .downcast_ref::<Float32Array>()
                .map(Self::Float32)
                .ok_or_else(|| "failed to downcast to Float32Array".to_string()),
            other => Err(format!("unsupported double key input type: {:?}", other)),
        }
    }

    pub fn value_at(&self, row: usize) -> Option<f64> {
        match self {
            DoubleKeyView::Float64(arr) => (!arr.is_null(row)).then(|| arr.value(row)),
            DoubleKeyView::Float32(arr) => (!arr.is_null(row)).then(|| arr.value(row) as f64),
        }
    }
}

pub enum BytesKeyView<'a> {
    Utf8(&'a StringArray),
    Binary(&'a BinaryArray),
}

impl<'a> BytesKeyView<'a> {
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            BytesKeyView::Utf8(arr) => arr.is_null(row),
            BytesKeyView::Binary(arr) => arr.is_null(row),
        }
    }

    /// (backing value buffer, start, length) of the row's value; zero-copy.
    pub fn range_at(&self, row: usize) -> (&'a [u8], usize, usize) {
        match self {
            BytesKeyView::Utf8(arr) => {
                let offsets = arr.value_offsets();
                let start = offsets[row] as usize;
                let end = offsets[row + 1] as usize;
                (arr.value_data(), start, end - start)
            }
            BytesKeyView::Binary(arr) => {
                let offsets = arr.value_offsets();
                let start = offsets[row] as usize;
                let end = offsets[row + 1] as usize;
                (arr.value_data(), start, end - start)
            }
        }
    }
}

pub enum TimestampKeyView<'a> {
    Second(&'a TimestampSecondArray),
    Millisecond(&'a TimestampMillisecondArray),
    Microsecond(&'a TimestampMicrosecondArray),
    Nanosecond(&'a TimestampNanosecondArray),
}

impl<'a> TimestampKeyView<'a> {
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            TimestampKeyView::Second(arr) => arr.is_null(row),
            TimestampKeyView::Millisecond(arr) => arr.is_null(row),
            TimestampKeyView::Microsecond(arr) => arr.is_null(row),
            TimestampKeyView::Nanosecond(arr) => arr.is_null(row),
        }
    }
}

impl TimestampKeySource for TimestampKeyView<'_> {
    fn read_timestamp(&self, row: usize, target: &mut TimestampValue) {
        // Euclidean split keeps the nanosecond component non-negative for
        // pre-epoch instants.
        match self {
            TimestampKeyView::Second(arr) => target.set_parts(arr.value(row), 0),
            TimestampKeyView::Millisecond(arr) => {
                let value = arr.value(row);
                target.set_parts(
                    value.div_euclid(1_000),
                    (value.rem_euclid(1_000) * 1_000_000) as u32,
                );
            }
            TimestampKeyView::Microsecond(arr) => {
                let value = arr.value(row);
                target.set_parts(
                    value.div_euclid(1_000_000),
                    (value.rem_euclid(1_000_000) * 1_000) as u32,
                );
            }
            TimestampKeyView::Nanosecond(arr) => {
                let value = arr.value(row);
                target.set_parts(
                    value.div_euclid(1_000_000_000),
                    value.rem_euclid(1_000_000_000) as u32,
                );
            }
        }
    }
}

impl DecimalKeySource for Decimal128Array {
    fn read_decimal(&self, row: usize, target: &mut DecimalValue) {
        target.set_parts(self.value(row), self.scale());
    }
}

impl IntervalDayTimeKeySource for IntervalDayTimeArray {
    fn read_interval_day_time(&self, row: usize, target: &mut IntervalDayTimeValue) {
        let value = self.value(row);
        target.set_parts(value.days, value.milliseconds as i64 * 1_000_000);
    }
}

/// Typed view over one group-by column, dispatching per field class.
pub enum KeyColumnView<'a> {
    Long(LongKeyView<'a>),
    Double(DoubleKeyView<'a>),
    Bytes(BytesKeyView<'a>),
    Decimal(&'a Decimal128Array),
    Timestamp(TimestampKeyView<'a>),
    IntervalDayTime(&'a IntervalDayTimeArray),
}

fn field_class_of(data_type: &DataType) -> Result<FieldClass, String> {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::Date32
        | DataType::Boolean => Ok(FieldClass::Long),
        DataType::Float32 | DataType::Float64 => Ok(FieldClass::Double),
        DataType::Utf8 | DataType::Binary => Ok(FieldClass::Bytes),
        DataType::Decimal128(_, _) => Ok(FieldClass::Decimal),
        DataType::Timestamp(_, _) => Ok(FieldClass::Timestamp),
        DataType::Interval(IntervalUnit::DayTime) => Ok(FieldClass::IntervalDayTime),
        other => Err(format!("group-by key type not supported: {:?}", other)),
    }
}

/// Resolve group-by column types into a key layout plus one field slot per
/// column. Columns land in class-local slots in declaration order within
/// each class, which fixes the layout for the life of the plan.
pub fn compile_key_layout(types: &[DataType]) -> Result<(KeyLayout, Vec<KeyField>), String> {
    let mut counts = [0usize; 6];
    let mut fields = Vec::with_capacity(types.len());
    for data_type in types {
        let class = field_class_of(data_type)?;
        let slot = match class {
            FieldClass::Long => &mut counts[0],
            FieldClass::Double => &mut counts[1],
            FieldClass::Bytes => &mut counts[2],
            FieldClass::Decimal => &mut counts[3],
            FieldClass::Timestamp => &mut counts[4],
            FieldClass::IntervalDayTime => &mut counts[5],
        };
        fields.push(KeyField {
            class,
            index: *slot,
        });
        *slot += 1;
    }
    let layout = KeyLayout::new(counts[0], counts[1], counts[2], counts[3], counts[4], counts[5]);
    debug!(
        "compiled group-by key layout: {} long, {} double, {} bytes, {} decimal, {} timestamp, {} interval",
        counts[0], counts[1], counts[2], counts[3], counts[4], counts[5],
    );
    Ok((layout, fields))
}

pub fn build_key_column_views<'a>(arrays: &'a [ArrayRef]) -> Result<Vec<KeyColumnView<'a>>, String> {
    let mut views = Vec::with_capacity(arrays.len());
    for array in arrays {
        let view = match array.data_type() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Date32
            | DataType::Boolean => KeyColumnView::Long(LongKeyView::new(array)?),
            DataType::Float32 | DataType::Float64 => {
                KeyColumnView::Double(DoubleKeyView::new(array)?)
            }
            DataType::Utf8 => {
                let arr = array
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| "failed to downcast to StringArray".to_string())?;
                KeyColumnView::Bytes(BytesKeyView::Utf8(arr))
            }
            DataType::Binary => {
                let arr = array
                    .as_any()
                    .downcast_ref::<BinaryArray>()
                    .ok_or_else(|| "failed to downcast to BinaryArray".to_string())?;
                KeyColumnView::Bytes(BytesKeyView::Binary(arr))
            }
            DataType::Decimal128(_precision, _scale) => {
                let arr = array
                    .as_any()
                    .downcast_ref::<Decimal128Array>()
                    .ok_or_else(|| "failed to downcast to Decimal128Array".to_string())?;
                KeyColumnView::Decimal(arr)
            }
            DataType::Timestamp(unit, _tz) => match unit {
                TimeUnit::Second => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampSecondArray>()
                        .ok_or_else(|| "failed to downcast to TimestampSecondArray".to_string())?;
                    KeyColumnView::Timestamp(TimestampKeyView::Second(arr))
                }
                TimeUnit::Millisecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .ok_or_else(|| {
                            "failed to downcast to TimestampMillisecondArray".to_string()
                        })?;
                    KeyColumnView::Timestamp(TimestampKeyView::Millisecond(arr))
                }
                TimeUnit::Microsecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .ok_or_else(|| {
                            "failed to downcast to TimestampMicrosecondArray".to_string()
                        })?;
                    KeyColumnView::Timestamp(TimestampKeyView::Microsecond(arr))
                }
                TimeUnit::Nanosecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .ok_or_else(|| {
                            "failed to downcast to TimestampNanosecondArray".to_string()
                        })?;
                    KeyColumnView::Timestamp(TimestampKeyView::Nanosecond(arr))
                }
            },
            DataType::Interval(IntervalUnit::DayTime) => {
                let arr = array
                    .as_any()
                    .downcast_ref::<IntervalDayTimeArray>()
                    .ok_or_else(|| "failed to downcast to IntervalDayTimeArray".to_string())?;
                KeyColumnView::IntervalDayTime(arr)
            }
            other => {
                return Err(format!("group-by key type not supported: {:?}", other));
            }
        };
        views.push(view);
    }
    Ok(views)
}

/// Populate the transient key with one row's values. Every column gets its
/// typed assign or null assign; the caller commits the hash afterwards with
/// `set_hash_key`.
pub fn assign_row(
    key: &mut HashKeyWrapper,
    fields: &[KeyField],
    views: &[KeyColumnView<'_>],
    row: usize,
) -> Result<(), String> {
    if fields.len() != views.len() {
        return Err("group key field/view count mismatch".to_string());
    }
    for (field, view) in fields.iter().zip(views) {
        match (field.class, view) {
            (FieldClass::Long, KeyColumnView::Long(view)) => match view.value_at(row) {
                Some(value) => key.assign_long(field.index, value),
                None => key.assign_null_long(field.index),
            },
            (FieldClass::Double, KeyColumnView::Double(view)) => match view.value_at(row) {
                Some(value) => key.assign_double(field.index, value),
                None => key.assign_null_double(field.index),
            },
            (FieldClass::Bytes, KeyColumnView::Bytes(view)) => {
                if view.is_null(row) {
                    key.assign_null_string(field.index);
                } else {
                    let (bytes, start, length) = view.range_at(row);
                    key.assign_string(field.index, bytes, start, length);
                }
            }
            (FieldClass::Decimal, KeyColumnView::Decimal(arr)) => {
                if arr.is_null(row) {
                    key.assign_null_decimal(field.index);
                } else {
                    key.assign_decimal_from(field.index, *arr, row);
                }
            }
            (FieldClass::Timestamp, KeyColumnView::Timestamp(view)) => {
                if view.is_null(row) {
                    key.assign_null_timestamp(field.index);
                } else {
                    key.assign_timestamp_from(field.index, view, row);
                }
            }
            (FieldClass::IntervalDayTime, KeyColumnView::IntervalDayTime(arr)) => {
                if arr.is_null(row) {
                    key.assign_null_interval_day_time(field.index);
                } else {
                    key.assign_interval_day_time_from(field.index, *arr, row);
                }
            }
            (class, _) => {
                return Err(format!(
                    "group key field class {:?} does not match its column view",
                    class
                ));
            }
        }
    }
    Ok(())
}
