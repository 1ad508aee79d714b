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

//! Tables: ordered, append-only sequences of chunks sharing one schema
//!
//! The chunk list is a snapshot behind a lock: readers clone the `Arc` and
//! iterate a consistent list while appenders swap in a new one. Statistics
//! follow the same snapshot discipline, so concurrent readers never observe
//! a torn state.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::CancellationToken;
use crate::core::{ChunkId, Error, Result, Schema, Value};
use crate::statistics::{generate_chunk_statistics, TableStatistics};

use super::chunk::{Chunk, ChunkBuilder};
use super::encoding::{self, ChunkEncodingSpec};

/// Append-only chunked table
#[derive(Debug)]
pub struct Table {
    schema: Arc<Schema>,
    chunks: RwLock<Arc<Vec<Arc<Chunk>>>>,
    statistics: RwLock<Option<Arc<TableStatistics>>>,
}

impl Table {
    /// Create an empty table with the given schema
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            chunks: RwLock::new(Arc::new(Vec::new())),
            statistics: RwLock::new(None),
        }
    }

    /// The table's schema; column position is identity
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The ordered column definitions
    pub fn column_definitions(&self) -> &Schema {
        &self.schema
    }

    /// Number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    /// Total row count across all chunks
    pub fn row_count(&self) -> u64 {
        self.chunks
            .read()
            .iter()
            .map(|chunk| chunk.size() as u64)
            .sum()
    }

    /// Snapshot of the chunk list; stable while held
    pub fn chunks(&self) -> Arc<Vec<Arc<Chunk>>> {
        Arc::clone(&self.chunks.read())
    }

    /// The chunk with the given id, if present
    pub fn chunk(&self, chunk_id: ChunkId) -> Option<Arc<Chunk>> {
        self.chunks.read().get(chunk_id as usize).cloned()
    }

    /// Append a finalized chunk
    ///
    /// The chunk must carry one segment per schema column with matching data
    /// types. When the table already has statistics they are extended to
    /// cover the new chunk.
    pub fn append_chunk(&self, chunk: Chunk) -> Result<ChunkId> {
        if chunk.column_count() != self.schema.len() {
            return Err(Error::ChunkColumnsMismatch {
                expected: self.schema.len(),
                got: chunk.column_count(),
            });
        }
        for (column_id, segment) in chunk.segments().iter().enumerate() {
            let definition = self.schema.column(column_id as u16)?;
            if segment.data_type() != definition.data_type {
                return Err(Error::TypeMismatch {
                    expected: definition.data_type,
                    got: segment.data_type(),
                });
            }
        }

        // Compute statistics outside the lock; the chunk is not shared yet.
        if self.statistics.read().is_some() {
            let statistics = generate_chunk_statistics(&chunk, &self.schema)?;
            chunk.set_statistics(Arc::new(statistics));
        }
        let chunk = Arc::new(chunk);

        let mut guard = self.chunks.write();
        let mut next: Vec<Arc<Chunk>> = guard.as_ref().clone();
        let chunk_id = next.len() as ChunkId;
        next.push(chunk);
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        drop(guard);

        self.refresh_statistics(&next);
        Ok(chunk_id)
    }

    /// Append rows as one new chunk of value segments
    pub fn append_rows(&self, rows: &[Vec<Value>]) -> Result<ChunkId> {
        let mut builder = ChunkBuilder::new(Arc::clone(&self.schema))?;
        for row in rows {
            builder.append_row(row)?;
        }
        self.append_chunk(builder.finalize()?)
    }

    /// Re-encode one chunk in place of the old one
    ///
    /// The old chunk object stays untouched; readers holding the previous
    /// snapshot keep a consistent view. Statistics for the chunk are
    /// regenerated when the table carries any.
    pub fn encode_chunk(
        &self,
        chunk_id: ChunkId,
        specs: &ChunkEncodingSpec,
        cancellation: Option<&CancellationToken>,
    ) -> Result<()> {
        let old = self
            .chunk(chunk_id)
            .ok_or_else(|| Error::InvalidArgument(format!("no chunk {chunk_id}")))?;
        let encoded = encoding::encode_chunk(&old, specs, cancellation)?;
        if self.statistics.read().is_some() {
            let statistics = generate_chunk_statistics(&encoded, &self.schema)?;
            encoded.set_statistics(Arc::new(statistics));
        }
        let encoded = Arc::new(encoded);

        let mut guard = self.chunks.write();
        let mut next: Vec<Arc<Chunk>> = guard.as_ref().clone();
        let Some(slot) = next.get_mut(chunk_id as usize) else {
            return Err(Error::InvalidArgument(format!("no chunk {chunk_id}")));
        };
        *slot = encoded;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        drop(guard);

        self.refresh_statistics(&next);
        Ok(())
    }

    /// Generate statistics for every chunk and attach them
    pub fn generate_statistics(&self) -> Result<()> {
        let chunks = self.chunks();
        let statistics = crate::statistics::generate_table_statistics_for_chunks(
            &chunks,
            &self.schema,
        )?;
        for (chunk, chunk_statistics) in chunks.iter().zip(statistics.chunk_statistics()) {
            if let Some(chunk_statistics) = chunk_statistics {
                chunk.set_statistics(Arc::clone(chunk_statistics));
            }
        }
        *self.statistics.write() = Some(Arc::new(statistics));
        Ok(())
    }

    /// The attached table statistics, if generated
    pub fn table_statistics(&self) -> Option<Arc<TableStatistics>> {
        self.statistics.read().clone()
    }

    /// Rebuild the table statistics from the chunks' attached statistics
    fn refresh_statistics(&self, chunks: &[Arc<Chunk>]) {
        let mut guard = self.statistics.write();
        if guard.is_none() {
            return;
        }
        *guard = Some(Arc::new(TableStatistics::from_chunks(chunks)));
    }

    /// Estimated heap bytes held by all chunks
    pub fn estimate_memory_usage(&self) -> usize {
        self.chunks
            .read()
            .iter()
            .map(|chunk| chunk.estimate_memory_usage())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{ColumnDefinition, DataType};

    use super::*;

    fn test_table() -> Table {
        Table::new(Arc::new(
            Schema::new(vec![
                ColumnDefinition::new("id", DataType::Int32),
                ColumnDefinition::nullable("label", DataType::Text),
            ])
            .unwrap(),
        ))
    }

    #[test]
    fn append_preserves_chunk_order() {
        let table = test_table();
        table
            .append_rows(&[vec![Value::Int32(1), Value::text("a")]])
            .unwrap();
        table
            .append_rows(&[
                vec![Value::Int32(2), Value::Null],
                vec![Value::Int32(3), Value::text("c")],
            ])
            .unwrap();

        assert_eq!(table.chunk_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.chunk(0).unwrap().size(), 1);
        assert_eq!(table.chunk(1).unwrap().size(), 2);
    }

    #[test]
    fn snapshots_survive_later_appends() {
        let table = test_table();
        table
            .append_rows(&[vec![Value::Int32(1), Value::Null]])
            .unwrap();
        let snapshot = table.chunks();
        table
            .append_rows(&[vec![Value::Int32(2), Value::Null]])
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(table.chunk_count(), 2);
    }

    #[test]
    fn append_rejects_mismatched_chunks() {
        let table = test_table();
        let mut builder = ChunkBuilder::new(Arc::new(
            Schema::new(vec![ColumnDefinition::new("id", DataType::Int64)]).unwrap(),
        ))
        .unwrap();
        builder.append_row(&[Value::Int64(1)]).unwrap();
        let chunk = builder.finalize().unwrap();
        assert!(table.append_chunk(chunk).is_err());
    }
}
