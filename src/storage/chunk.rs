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

//! Chunks: immutable horizontal row-groups
//!
//! A chunk holds exactly one segment per schema column, all of the same row
//! count. Chunks are immutable once finalized; the only mutable stage is
//! [`ChunkBuilder`], owned by the ingesting thread until `finalize`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{ColumnId, Error, Result, Schema, Value};
use crate::statistics::ChunkStatistics;

use super::segment::{DataSegment, Segment, SegmentValue, ValueSegment};

/// Immutable row-group holding one segment per column
#[derive(Debug)]
pub struct Chunk {
    segments: Vec<Arc<Segment>>,
    size: usize,
    statistics: RwLock<Option<Arc<ChunkStatistics>>>,
}

impl Chunk {
    /// Create a chunk from one segment per column
    ///
    /// All segments must report the same row count.
    pub fn new(segments: Vec<Arc<Segment>>) -> Result<Self> {
        let size = segments.first().map(|segment| segment.len()).unwrap_or(0);
        for segment in &segments {
            if segment.len() != size {
                return Err(Error::ChunkSizeMismatch {
                    expected: size,
                    got: segment.len(),
                });
            }
        }
        Ok(Self {
            segments,
            size,
            statistics: RwLock::new(None),
        })
    }

    /// Row count shared by every segment
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment storing the given column
    pub fn segment(&self, column_id: ColumnId) -> Result<&Arc<Segment>> {
        self.segments
            .get(column_id as usize)
            .ok_or(Error::ColumnNotFound(column_id))
    }

    /// All segments in column order
    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// The attached statistics, if generated
    pub fn statistics(&self) -> Option<Arc<ChunkStatistics>> {
        self.statistics.read().clone()
    }

    /// Atomically replace the attached statistics
    pub fn set_statistics(&self, statistics: Arc<ChunkStatistics>) {
        *self.statistics.write() = Some(statistics);
    }

    /// Estimated heap bytes held by all segments
    pub fn estimate_memory_usage(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.estimate_memory_usage())
            .sum()
    }
}

// =============================================================================
// Ingestion
// =============================================================================

/// Typed column accumulator used during ingestion
#[derive(Debug)]
enum ColumnBuilder {
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    Float(Vec<Option<f32>>),
    Double(Vec<Option<f64>>),
    Text(Vec<Option<Arc<str>>>),
}

impl ColumnBuilder {
    fn for_type(data_type: crate::core::DataType) -> Result<Self> {
        use crate::core::DataType;
        match data_type {
            DataType::Int32 => Ok(ColumnBuilder::Int32(Vec::new())),
            DataType::Int64 => Ok(ColumnBuilder::Int64(Vec::new())),
            DataType::Float => Ok(ColumnBuilder::Float(Vec::new())),
            DataType::Double => Ok(ColumnBuilder::Double(Vec::new())),
            DataType::Text => Ok(ColumnBuilder::Text(Vec::new())),
            DataType::Null => Err(Error::InvalidArgument(
                "columns cannot be declared NULL-typed".to_string(),
            )),
        }
    }

    fn push(&mut self, value: &Value) -> Result<()> {
        fn typed_push<T: SegmentValue>(rows: &mut Vec<Option<T>>, value: &Value) -> Result<()> {
            if value.is_null() {
                rows.push(None);
                return Ok(());
            }
            match T::from_value(value) {
                Some(typed) => {
                    rows.push(Some(typed));
                    Ok(())
                }
                None => Err(Error::TypeMismatch {
                    expected: T::DATA_TYPE,
                    got: value.data_type(),
                }),
            }
        }

        match self {
            ColumnBuilder::Int32(rows) => typed_push(rows, value),
            ColumnBuilder::Int64(rows) => typed_push(rows, value),
            ColumnBuilder::Float(rows) => typed_push(rows, value),
            ColumnBuilder::Double(rows) => typed_push(rows, value),
            ColumnBuilder::Text(rows) => typed_push(rows, value),
        }
    }

    fn finalize(self) -> Segment {
        fn typed_finalize<T: SegmentValue>(rows: Vec<Option<T>>) -> Segment {
            T::wrap_segment(DataSegment::Value(ValueSegment::from_options(rows)))
        }

        match self {
            ColumnBuilder::Int32(rows) => typed_finalize(rows),
            ColumnBuilder::Int64(rows) => typed_finalize(rows),
            ColumnBuilder::Float(rows) => typed_finalize(rows),
            ColumnBuilder::Double(rows) => typed_finalize(rows),
            ColumnBuilder::Text(rows) => typed_finalize(rows),
        }
    }
}

/// The mutable "open" chunk that exists only during ingestion
///
/// Dropping the builder discards the open chunk, which is how cancelled
/// appends avoid partially-appended state.
#[derive(Debug)]
pub struct ChunkBuilder {
    schema: Arc<Schema>,
    columns: Vec<ColumnBuilder>,
    row_count: usize,
}

impl ChunkBuilder {
    /// Start an open chunk for the given schema
    pub fn new(schema: Arc<Schema>) -> Result<Self> {
        let columns = schema
            .iter()
            .map(|column| ColumnBuilder::for_type(column.data_type))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            schema,
            columns,
            row_count: 0,
        })
    }

    /// Append one row; values must match the schema's types and nullability
    pub fn append_row(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ChunkColumnsMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        for (column_id, value) in row.iter().enumerate() {
            let definition = self.schema.column(column_id as ColumnId)?;
            if value.is_null() && !definition.nullable {
                return Err(Error::NullNotAllowed(definition.name.clone()));
            }
        }
        for (builder, value) in self.columns.iter_mut().zip(row) {
            builder.push(value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Rows appended so far
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Finalize into an immutable chunk of value segments
    pub fn finalize(self) -> Result<Chunk> {
        let segments = self
            .columns
            .into_iter()
            .map(|builder| Arc::new(builder.finalize()))
            .collect();
        Chunk::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{ColumnDefinition, DataType};

    use super::*;

    fn test_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                ColumnDefinition::new("id", DataType::Int32),
                ColumnDefinition::nullable("name", DataType::Text),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn builder_produces_value_segments() {
        let mut builder = ChunkBuilder::new(test_schema()).unwrap();
        builder.append_row(&[Value::Int32(1), Value::text("a")]).unwrap();
        builder.append_row(&[Value::Int32(2), Value::Null]).unwrap();

        let chunk = builder.finalize().unwrap();
        assert_eq!(chunk.size(), 2);
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(
            chunk.segment(0).unwrap().encoding(),
            Some(crate::core::EncodingKind::Unencoded)
        );
    }

    #[test]
    fn builder_rejects_type_and_null_violations() {
        let mut builder = ChunkBuilder::new(test_schema()).unwrap();
        let type_error = builder
            .append_row(&[Value::Int64(1), Value::text("a")])
            .unwrap_err();
        assert!(matches!(type_error, Error::TypeMismatch { .. }));

        let null_error = builder
            .append_row(&[Value::Null, Value::text("a")])
            .unwrap_err();
        assert_eq!(null_error, Error::NullNotAllowed("id".to_string()));
    }

    #[test]
    fn segments_must_agree_on_size() {
        let short = Arc::new(Segment::Int32(DataSegment::Value(
            ValueSegment::from_values(vec![1]),
        )));
        let long = Arc::new(Segment::Int32(DataSegment::Value(
            ValueSegment::from_values(vec![1, 2]),
        )));
        let err = Chunk::new(vec![short, long]).unwrap_err();
        assert_eq!(err, Error::ChunkSizeMismatch { expected: 1, got: 2 });
    }
}
