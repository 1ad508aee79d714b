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

//! Error types for StrataDB
//!
//! This module defines all error types used throughout the storage core.

use thiserror::Error;

use super::types::{DataType, EncodingKind};

/// Result type alias for StrataDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for StrataDB storage operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Encoding errors
    // =========================================================================
    /// An encoder rejects an (encoding, data type) combination
    #[error("encoding {encoding} does not support data type {data_type}")]
    UnsupportedEncoding {
        encoding: EncodingKind,
        data_type: DataType,
    },

    /// Encoder input exceeds the encoder's internal size limit
    #[error("segment input of {got} bytes exceeds the {limit} byte limit")]
    SegmentTooLarge { limit: u64, got: u64 },

    /// Structural invariant violation detected during decode
    #[error("invalid segment: {0}")]
    InvalidSegment(String),

    // =========================================================================
    // Type errors
    // =========================================================================
    /// Operation invoked with a value whose type differs from the segment's
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    /// Two values cannot be ordered against each other
    #[error("values of type {left} and {right} are not comparable")]
    IncomparableTypes { left: DataType, right: DataType },

    /// Ordering against a NULL value is undefined
    #[error("cannot compare against NULL")]
    NullComparison,

    // =========================================================================
    // Access errors
    // =========================================================================
    /// Point-access position exceeds the segment size
    #[error("position {position} out of range for segment of size {size}")]
    OutOfRange { position: u32, size: u32 },

    /// Column index not present in the schema
    #[error("column {0} not found")]
    ColumnNotFound(u16),

    /// Invalid argument for an operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Schema and chunk errors
    // =========================================================================
    /// Duplicate column name in a schema
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Chunk column count differs from the schema
    #[error("chunk has {got} segments, schema has {expected} columns")]
    ChunkColumnsMismatch { expected: usize, got: usize },

    /// Segments of one chunk disagree on their row count
    #[error("segment sizes differ within one chunk: {expected} vs {got}")]
    ChunkSizeMismatch { expected: usize, got: usize },

    /// NULL written into a non-nullable column
    #[error("column '{0}' is not nullable")]
    NullNotAllowed(String),

    // =========================================================================
    // Catalog errors
    // =========================================================================
    /// Table not found in the storage manager
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Table already exists when trying to add it
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    // =========================================================================
    // Execution errors
    // =========================================================================
    /// Operation was cancelled via its cancellation token
    #[error("operation cancelled")]
    Cancelled,

    /// Declared but deliberately unimplemented functionality
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}
