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
pub mod common;
pub mod exec;
pub mod runtime;

pub use common::logging as veckey_logging;

pub use common::types::{DecimalValue, IntervalDayTimeValue, TimestampValue};
pub use exec::hash_table::key_builder::{
    KeyColumnView, KeyField, assign_row, build_key_column_views, compile_key_layout,
};
pub use exec::hash_table::key_layout::{FieldClass, KeyLayout};
pub use exec::hash_table::key_wrapper::HashKeyWrapper;
