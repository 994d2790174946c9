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
//! Integration tests for driving group-by keys from Arrow columns.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float64Array, Int64Array,
    IntervalDayTimeArray, StringArray, TimestampMillisecondArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, IntervalUnit, TimeUnit};
use arrow_buffer::IntervalDayTime;
use hashbrown::HashMap;
use veckey::{
    DecimalValue, FieldClass, HashKeyWrapper, IntervalDayTimeValue, TimestampValue, assign_row,
    build_key_column_views, compile_key_layout,
};

fn data_types(arrays: &[ArrayRef]) -> Vec<DataType> {
    arrays.iter().map(|a| a.data_type().clone()).collect()
}

#[test]
fn test_compile_assigns_class_local_slots_in_order() {
    let types = vec![
        DataType::Int64,
        DataType::Utf8,
        DataType::Float64,
        DataType::Int32,
        DataType::Decimal128(10, 2),
        DataType::Timestamp(TimeUnit::Nanosecond, None),
        DataType::Interval(IntervalUnit::DayTime),
    ];
    let (layout, fields) = compile_key_layout(&types).unwrap();

    assert_eq!(layout.num_long(), 2);
    assert_eq!(layout.num_double(), 1);
    assert_eq!(layout.num_bytes(), 1);
    assert_eq!(layout.num_decimal(), 1);
    assert_eq!(layout.num_timestamp(), 1);
    assert_eq!(layout.num_interval_day_time(), 1);
    assert_eq!(layout.total_fields(), 7);

    assert_eq!(fields[0].class, FieldClass::Long);
    assert_eq!(fields[0].index, 0);
    assert_eq!(fields[3].class, FieldClass::Long);
    assert_eq!(fields[3].index, 1);
    assert_eq!(fields[1].class, FieldClass::Bytes);
    assert_eq!(fields[1].index, 0);
    assert_eq!(fields[6].class, FieldClass::IntervalDayTime);
    assert_eq!(fields[6].index, 0);
}

#[test]
fn test_unsupported_group_by_type_is_rejected() {
    let types = vec![DataType::Int64, DataType::Duration(TimeUnit::Second)];
    let err = compile_key_layout(&types).unwrap_err();
    assert!(err.contains("not supported"), "unexpected error: {err}");
}

#[test]
fn test_assign_row_populates_typed_fields_and_nulls() {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![Some(5), None])),
        Arc::new(StringArray::from(vec![Some("ab"), Some("cd")])),
        Arc::new(Float64Array::from(vec![Some(1.5), Some(2.5)])),
        Arc::new(
            Decimal128Array::from(vec![Some(314i128), None])
                .with_precision_and_scale(10, 2)
                .unwrap(),
        ),
    ];
    let (layout, fields) = compile_key_layout(&data_types(&arrays)).unwrap();
    let views = build_key_column_views(&arrays).unwrap();

    let mut key = HashKeyWrapper::new(layout);
    assign_row(&mut key, &fields, &views, 0).unwrap();
    key.set_hash_key();

    assert!(!key.is_long_null(0));
    assert_eq!(key.get_long_value(0), 5);
    let start = key.get_byte_start(0);
    let length = key.get_byte_length(0);
    assert_eq!(&key.get_bytes(0)[start..start + length], b"ab");
    assert_eq!(key.get_double_value(0), 1.5);
    assert_eq!(*key.get_decimal(0), DecimalValue::new(314, 2));

    assign_row(&mut key, &fields, &views, 1).unwrap();
    key.set_hash_key();

    assert!(key.is_long_null(0));
    assert_eq!(key.get_long_value(0), 0);
    assert!(key.is_decimal_null(0));
    assert_eq!(&key.get_bytes(0)[key.get_byte_start(0)..][..key.get_byte_length(0)], b"cd");
}

#[test]
fn test_equal_strings_from_different_batches_group_together() {
    // "ab" sits at different offsets of two different value buffers.
    let first: Vec<ArrayRef> = vec![Arc::new(StringArray::from(vec![Some("ab"), Some("xx")]))];
    let second: Vec<ArrayRef> = vec![Arc::new(StringArray::from(vec![Some("yy"), Some("ab")]))];
    let (layout, fields) = compile_key_layout(&data_types(&first)).unwrap();

    let first_views = build_key_column_views(&first).unwrap();
    let mut left = HashKeyWrapper::new(layout);
    assign_row(&mut left, &fields, &first_views, 0).unwrap();
    left.set_hash_key();

    let second_views = build_key_column_views(&second).unwrap();
    let mut right = HashKeyWrapper::new(layout);
    assign_row(&mut right, &fields, &second_views, 1).unwrap();
    right.set_hash_key();

    assert_eq!(left, right);
    assert_eq!(left.hash_code(), right.hash_code());
}

#[test]
fn test_timestamp_units_normalize_to_one_instant() {
    let millis: Vec<ArrayRef> = vec![Arc::new(TimestampMillisecondArray::from(vec![Some(1_500)]))];
    let nanos: Vec<ArrayRef> = vec![Arc::new(TimestampNanosecondArray::from(vec![Some(
        1_500_000_000,
    )]))];

    let (millis_layout, millis_fields) = compile_key_layout(&data_types(&millis)).unwrap();
    let millis_views = build_key_column_views(&millis).unwrap();
    let mut left = HashKeyWrapper::new(millis_layout);
    assign_row(&mut left, &millis_fields, &millis_views, 0).unwrap();
    left.set_hash_key();

    let (nanos_layout, nanos_fields) = compile_key_layout(&data_types(&nanos)).unwrap();
    let nanos_views = build_key_column_views(&nanos).unwrap();
    let mut right = HashKeyWrapper::new(nanos_layout);
    assign_row(&mut right, &nanos_fields, &nanos_views, 0).unwrap();
    right.set_hash_key();

    assert_eq!(*left.get_timestamp(0), TimestampValue::new(1, 500_000_000));
    assert_eq!(left, right);
    assert_eq!(left.hash_code(), right.hash_code());
}

#[test]
fn test_pre_epoch_timestamp_keeps_nanos_non_negative() {
    let arrays: Vec<ArrayRef> = vec![Arc::new(TimestampNanosecondArray::from(vec![Some(-1)]))];
    let (layout, fields) = compile_key_layout(&data_types(&arrays)).unwrap();
    let views = build_key_column_views(&arrays).unwrap();

    let mut key = HashKeyWrapper::new(layout);
    assign_row(&mut key, &fields, &views, 0).unwrap();
    assert_eq!(*key.get_timestamp(0), TimestampValue::new(-1, 999_999_999));
}

#[test]
fn test_interval_milliseconds_widen_to_nanos() {
    let arrays: Vec<ArrayRef> = vec![Arc::new(IntervalDayTimeArray::from(vec![
        IntervalDayTime::new(3, 1_500),
    ]))];
    let (layout, fields) = compile_key_layout(&data_types(&arrays)).unwrap();
    let views = build_key_column_views(&arrays).unwrap();

    let mut key = HashKeyWrapper::new(layout);
    assign_row(&mut key, &fields, &views, 0).unwrap();
    assert_eq!(
        *key.get_interval_day_time(0),
        IntervalDayTimeValue::new(3, 1_500_000_000)
    );
}

#[test]
fn test_dates_and_booleans_widen_to_longs() {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(vec![Some(19_000)])),
        Arc::new(BooleanArray::from(vec![Some(true)])),
    ];
    let (layout, fields) = compile_key_layout(&data_types(&arrays)).unwrap();
    assert_eq!(layout.num_long(), 2);
    let views = build_key_column_views(&arrays).unwrap();

    let mut key = HashKeyWrapper::new(layout);
    assign_row(&mut key, &fields, &views, 0).unwrap();
    assert_eq!(key.get_long_value(0), 19_000);
    assert_eq!(key.get_long_value(1), 1);
}

#[test]
fn test_empty_key_layout_hashes_to_constant() {
    let (layout, fields) = compile_key_layout(&[]).unwrap();
    assert_eq!(layout.total_fields(), 0);

    let mut left = HashKeyWrapper::new(layout);
    assign_row(&mut left, &fields, &[], 0).unwrap();
    left.set_hash_key();
    let mut right = HashKeyWrapper::new(layout);
    right.set_hash_key();

    assert_eq!(left, right);
    assert_eq!(left.hash_code(), right.hash_code());
}

#[test]
fn test_batch_grouping_counts_distinct_keys() {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![
            Some(1),
            Some(1),
            Some(2),
            None,
            Some(1),
            None,
        ])),
        Arc::new(StringArray::from(vec![
            Some("east"),
            Some("east"),
            Some("east"),
            Some("west"),
            Some("west"),
            Some("west"),
        ])),
    ];
    let (layout, fields) = compile_key_layout(&data_types(&arrays)).unwrap();
    let views = build_key_column_views(&arrays).unwrap();

    let mut table: HashMap<HashKeyWrapper, usize> = HashMap::new();
    let mut counts = Vec::new();
    let mut transient = HashKeyWrapper::new(layout);
    for row in 0..6 {
        assign_row(&mut transient, &fields, &views, row).unwrap();
        transient.set_hash_key();
        if let Some(group_id) = table.get(&transient).copied() {
            counts[group_id] += 1;
        } else {
            table.insert(transient.duplicate(), counts.len());
            counts.push(1);
        }
    }

    // Groups: (1, east), (2, east), (null, west), (1, west).
    assert_eq!(table.len(), 4);
    assert_eq!(counts, vec![2, 1, 2, 1]);
}
