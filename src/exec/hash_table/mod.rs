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
//! Composite group-by hash keys for vectorized aggregation.
//!
//! Responsibilities:
//! - Models the per-plan key layout and the per-row key value with typed
//!   assignment, committed hashing, equality, and deep copy.
//! - Bridges Arrow group-by columns onto the typed assignment API.
//!
//! Key exported interfaces:
//! - Types: `KeyLayout`, `FieldClass`, `HashKeyWrapper`, `KeyColumnView`.
//! - Functions: `compile_key_layout`, `build_key_column_views`, `assign_row`.
//!
//! Current limitations:
//! - Bucket layout, collision resolution, and resizing belong to the hash
//!   table that stores these keys, not to this module.

pub(crate) mod hash;
pub mod key_builder;
pub mod key_bytes;
pub mod key_layout;
pub mod key_wrapper;

pub use key_layout::{FieldClass, KeyLayout};
pub use key_wrapper::HashKeyWrapper;
