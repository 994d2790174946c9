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
//! Logical memory data model for variable-length allocations.
//!
//! Sizes computed here feed `MemTracker` accounting and spill decisions.
//! Like the tracker itself, this is a logical model: a payload is charged
//! for its allocation bookkeeping and word-aligned capacity, not for what
//! any particular allocator actually reserves.

/// Allocation granularity assumed for owned byte storage.
pub const ALLOCATION_WORD_BYTES: usize = 8;

/// Fixed per-allocation bookkeeping charge (length + pointer words).
pub const ALLOCATION_HEADER_BYTES: usize = 16;

/// Accounted footprint of an owned byte array holding `payload_len` bytes.
pub fn byte_array_footprint(payload_len: usize) -> i64 {
    let padded = payload_len.div_ceil(ALLOCATION_WORD_BYTES) * ALLOCATION_WORD_BYTES;
    (ALLOCATION_HEADER_BYTES + padded) as i64
}
