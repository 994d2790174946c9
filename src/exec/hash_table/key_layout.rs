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

/// Field class of one group-by key column after type resolution.
///
/// Integer-like columns (integers, dates, booleans) widen to `Long`; floats
/// widen to `Double`; strings and binary are `Bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldClass {
    Long,
    Double,
    Bytes,
    Decimal,
    Timestamp,
    IntervalDayTime,
}

/// Per-plan shape of a composite group-by key: how many fields of each class
/// participate, and where each field's null flag lives in the flat bitmap.
///
/// The bitmap is ordered long, double, bytes, decimal, timestamp,
/// interval-day-time. `offset_of` is the only place that ordering is spelled
/// out; every consumer goes through it instead of re-deriving sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    num_long: usize,
    num_double: usize,
    num_bytes: usize,
    num_decimal: usize,
    num_timestamp: usize,
    num_interval_day_time: usize,
}

impl KeyLayout {
    pub fn new(
        num_long: usize,
        num_double: usize,
        num_bytes: usize,
        num_decimal: usize,
        num_timestamp: usize,
        num_interval_day_time: usize,
    ) -> Self {
        Self {
            num_long,
            num_double,
            num_bytes,
            num_decimal,
            num_timestamp,
            num_interval_day_time,
        }
    }

    pub fn num_long(&self) -> usize {
        self.num_long
    }

    pub fn num_double(&self) -> usize {
        self.num_double
    }

    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    pub fn num_decimal(&self) -> usize {
        self.num_decimal
    }

    pub fn num_timestamp(&self) -> usize {
        self.num_timestamp
    }

    pub fn num_interval_day_time(&self) -> usize {
        self.num_interval_day_time
    }

    /// Number of fields in the key, which is also the null-bitmap length.
    pub fn total_fields(&self) -> usize {
        self.num_long
            + self.num_double
            + self.num_bytes
            + self.num_decimal
            + self.num_timestamp
            + self.num_interval_day_time
    }

    pub fn class_count(&self, class: FieldClass) -> usize {
        match class {
            FieldClass::Long => self.num_long,
            FieldClass::Double => self.num_double,
            FieldClass::Bytes => self.num_bytes,
            FieldClass::Decimal => self.num_decimal,
            FieldClass::Timestamp => self.num_timestamp,
            FieldClass::IntervalDayTime => self.num_interval_day_time,
        }
    }

    /// First null-bitmap slot of a field class; the running sum of the
    /// counts of every class ordered before it.
    pub fn class_base(&self, class: FieldClass) -> usize {
        match class {
            FieldClass::Long => 0,
            FieldClass::Double => self.num_long,
            FieldClass::Bytes => self.num_long + self.num_double,
            FieldClass::Decimal => self.num_long + self.num_double + self.num_bytes,
            FieldClass::Timestamp => {
                self.num_long + self.num_double + self.num_bytes + self.num_decimal
            }
            FieldClass::IntervalDayTime => {
                self.num_long
                    + self.num_double
                    + self.num_bytes
                    + self.num_decimal
                    + self.num_timestamp
            }
        }
    }

    /// Null-bitmap slot of the `index`-th field of `class`. `index` must be
    /// within `[0, class_count(class))`.
    pub fn offset_of(&self, class: FieldClass, index: usize) -> usize {
        debug_assert!(
            index < self.class_count(class),
            "field index {} out of range for {:?} count {}",
            index,
            class,
            self.class_count(class)
        );
        self.class_base(class) + index
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldClass, KeyLayout};

    #[test]
    fn test_total_fields_is_sum_of_counts() {
        let layout = KeyLayout::new(2, 1, 3, 1, 2, 1);
        assert_eq!(layout.total_fields(), 10);
        assert_eq!(KeyLayout::new(0, 0, 0, 0, 0, 0).total_fields(), 0);
    }

    #[test]
    fn test_class_bases_follow_fixed_ordering() {
        let layout = KeyLayout::new(2, 1, 3, 1, 2, 1);
        assert_eq!(layout.class_base(FieldClass::Long), 0);
        assert_eq!(layout.class_base(FieldClass::Double), 2);
        assert_eq!(layout.class_base(FieldClass::Bytes), 3);
        assert_eq!(layout.class_base(FieldClass::Decimal), 6);
        assert_eq!(layout.class_base(FieldClass::Timestamp), 7);
        assert_eq!(layout.class_base(FieldClass::IntervalDayTime), 9);
    }

    #[test]
    fn test_offsets_are_dense_and_disjoint() {
        let layout = KeyLayout::new(1, 2, 1, 1, 1, 2);
        let classes = [
            FieldClass::Long,
            FieldClass::Double,
            FieldClass::Bytes,
            FieldClass::Decimal,
            FieldClass::Timestamp,
            FieldClass::IntervalDayTime,
        ];
        let mut seen = vec![false; layout.total_fields()];
        for class in classes {
            for index in 0..layout.class_count(class) {
                let offset = layout.offset_of(class, index);
                assert!(!seen[offset], "offset {} assigned twice", offset);
                seen[offset] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_offset_is_pure_function_of_layout() {
        let left = KeyLayout::new(1, 0, 1, 0, 1, 0);
        let right = KeyLayout::new(1, 0, 1, 0, 1, 0);
        assert_eq!(
            left.offset_of(FieldClass::Timestamp, 0),
            right.offset_of(FieldClass::Timestamp, 0)
        );
        assert_eq!(left, right);
    }
}
