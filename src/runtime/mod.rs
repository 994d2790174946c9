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
//! Runtime-side memory accounting.
//!
//! Responsibilities:
//! - Hierarchical logical memory tracking (`MemTracker`).
//! - The data model converting variable-length payload sizes into accounted
//!   footprints (`mem_model`).
//!
//! Key exported interfaces:
//! - Types: `MemTracker`.
//! - Functions: `mem_model::byte_array_footprint`, `process_mem_tracker`.

pub mod mem_model;
pub mod mem_tracker;

pub use mem_tracker::{MemTracker, process_mem_tracker};
