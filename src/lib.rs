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

//! # StrataDB - columnar in-memory analytical storage core
//!
//! StrataDB is the storage core of an in-memory analytical database:
//! chunked columnar tables with pluggable per-segment encodings, per-chunk
//! histogram statistics, and statistics-driven chunk pruning that lets
//! scans skip whole chunks without touching a segment.
//!
//! ## Key pieces
//!
//! - **Segment encodings** - value, dictionary, run-length,
//!   frame-of-reference and LZ4 segments behind one iteration contract, plus
//!   reference segments carrying scan output
//! - **Scan iteration** - `(value, is_null, chunk_offset)` triples with the
//!   encoding x type dispatch done once at iterator construction
//! - **Histogram statistics** - equal-distinct-count, equal-width and
//!   generic histograms with selectivity scaling and sound emptiness proofs
//! - **Chunk pruning** - a plan rule intersecting statistics with predicate
//!   chains, recording excluded chunks as stored-table metadata
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratadb::{
//!     ColumnDefinition, DataType, PredicateCondition, Schema, Table, TableScan, Value,
//! };
//!
//! let schema = Arc::new(Schema::new(vec![
//!     ColumnDefinition::new("id", DataType::Int32),
//!     ColumnDefinition::nullable("name", DataType::Text),
//! ]).unwrap());
//!
//! let table = Arc::new(Table::new(schema));
//! table.append_rows(&[
//!     vec![Value::Int32(1), Value::text("alpha")],
//!     vec![Value::Int32(2), Value::Null],
//! ]).unwrap();
//! table.generate_statistics().unwrap();
//!
//! let result = TableScan::new(
//!     Arc::clone(&table), 0, PredicateCondition::GreaterThan, Value::Int32(1),
//! ).execute().unwrap();
//! assert_eq!(result.row_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - data types, values, schemas, errors and row addressing
//! - [`common`] - null bitmaps and cooperative cancellation
//! - [`storage`] - segments, encoders, chunks, tables and the catalog
//! - [`statistics`] - histograms and the per-segment/chunk/table roll-ups
//! - [`expression`] - the predicate/arithmetic expression model
//! - [`plan`] - logical plan nodes the optimizer rules walk
//! - [`optimizer`] - chunk pruning and cardinality estimation
//! - [`executor`] - normalized scan predicates and the table scan

pub mod common;
pub mod core;
pub mod executor;
pub mod expression;
pub mod optimizer;
pub mod plan;
pub mod statistics;
pub mod storage;

// Re-export core types for convenience
pub use crate::core::{
    ChunkId, ChunkOffset, ColumnDefinition, ColumnId, DataType, EncodingKind, Error,
    PredicateCondition, Result, RowId, Schema, Value, VectorCompression, INVALID_CHUNK_ID,
    INVALID_CHUNK_OFFSET, NULL_ROW_ID,
};

// Re-export common utilities
pub use common::{CancellationToken, NullBitmap};

// Re-export storage types
pub use storage::{
    encode_chunk, encode_segment, Chunk, ChunkBuilder, ChunkEncodingSpec, CompressedVector,
    DataSegment, DictionarySegment, FrameOfReferenceSegment, Lz4Segment, PosList,
    ReferenceSegment, RunLengthSegment, Segment, SegmentEncodingSpec, SegmentPosition,
    SegmentValue, StorageManager, Table, ValueSegment, FOR_BLOCK_SIZE,
};

// Re-export statistics types
pub use statistics::{
    generate_chunk_statistics, generate_table_statistics, CardinalityEstimate, ChunkStatistics,
    EqualDistinctCountHistogram, EqualWidthHistogram, GenericHistogram, Histogram,
    HistogramObject, HistogramType, SegmentStatistics, TableStatistics,
    DEFAULT_HISTOGRAM_BUCKETS,
};

// Re-export expression and plan types
pub use expression::{
    ArithmeticExpression, ArithmeticOperator, Operand, PredicateExpression,
};
pub use plan::{PlanNode, PlanNodeRef, PlanNodeType};

// Re-export optimizer types
pub use optimizer::{CardinalityEstimator, ChunkPruningRule, OptimizerContext, OptimizerRule};

// Re-export executor types
pub use executor::{LikeMatcher, OperatorScanPredicate, ScanOperand, TableScan};
