// Copyright 2025 StrataDB Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core types for StrataDB
//!
//! This module defines the fundamental types used throughout the engine:
//! [`DataType`], [`Value`], [`Schema`], [`Error`] and the row addressing
//! types.

pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use schema::{ColumnDefinition, Schema};
pub use types::{
    ChunkId, ChunkOffset, ColumnId, DataType, EncodingKind, PredicateCondition, RowId,
    VectorCompression, INVALID_CHUNK_ID, INVALID_CHUNK_OFFSET, NULL_ROW_ID,
};
pub use value::Value;
