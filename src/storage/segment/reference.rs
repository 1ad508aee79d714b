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

//! Reference segment: a table handle, a column and a position list
//!
//! The output form of scans. Each entry of the position list addresses one
//! row of the referenced table; the designated null row id is yielded as a
//! null triple and never dereferenced. Reference segments are never
//! re-encoded.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{
    ChunkId, ColumnId, DataType, Error, Result, RowId, INVALID_CHUNK_OFFSET,
};
use crate::storage::table::Table;

use super::{ChunkColumnAccessor, SegmentPosition, SegmentValue};

/// Ordered sequence of row addresses, possibly containing the null row id
pub type PosList = Vec<RowId>;

/// Segment whose data is a position list into another table
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    table: Arc<Table>,
    column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    /// Create a reference segment over one column of `table`
    ///
    /// Every non-null entry must resolve to a row of the referenced table,
    /// and the referenced column must hold data segments.
    pub fn new(table: Arc<Table>, column_id: ColumnId, pos_list: Arc<PosList>) -> Result<Self> {
        table.schema().column(column_id)?;
        let chunks = table.chunks();
        for row_id in pos_list.iter() {
            if row_id.is_null() {
                continue;
            }
            let Some(chunk) = chunks.get(row_id.chunk_id as usize) else {
                return Err(Error::InvalidSegment(format!(
                    "position list references missing chunk {}",
                    row_id.chunk_id
                )));
            };
            if row_id.chunk_offset as usize >= chunk.size() {
                return Err(Error::OutOfRange {
                    position: row_id.chunk_offset,
                    size: chunk.size() as u32,
                });
            }
            let segment = chunk.segment(column_id)?;
            if segment.is_reference() {
                return Err(Error::InvalidSegment(
                    "reference segments must point at data segments".to_string(),
                ));
            }
        }
        Ok(Self {
            table,
            column_id,
            pos_list,
        })
    }

    /// The referenced table
    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.table
    }

    /// The referenced column
    pub fn referenced_column_id(&self) -> ColumnId {
        self.column_id
    }

    /// The position list
    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    /// Number of rows (position list entries)
    pub fn len(&self) -> usize {
        self.pos_list.len()
    }

    /// Returns true if the position list is empty
    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
    }

    /// The referenced column's data type
    pub fn data_type(&self) -> DataType {
        self.table
            .schema()
            .column(self.column_id)
            .map(|column| column.data_type)
            .unwrap_or(DataType::Null)
    }

    /// Typed iterator resolving every position through the referenced table
    ///
    /// One accessor is built per referenced chunk up front, so iteration is
    /// infallible and LZ4 targets decompress at most once.
    pub fn iter<T: SegmentValue>(&self) -> Result<ReferenceSegmentIter<'_, T>> {
        if T::DATA_TYPE != self.data_type() {
            return Err(Error::TypeMismatch {
                expected: self.data_type(),
                got: T::DATA_TYPE,
            });
        }
        let chunks = self.table.chunks();
        let mut accessors: FxHashMap<ChunkId, ChunkColumnAccessor<T>> = FxHashMap::default();
        for row_id in self.pos_list.iter() {
            if row_id.is_null() || accessors.contains_key(&row_id.chunk_id) {
                continue;
            }
            // Construction validated the chunk ids.
            let Some(chunk) = chunks.get(row_id.chunk_id as usize) else {
                continue;
            };
            let segment = Arc::clone(chunk.segment(self.column_id)?);
            accessors.insert(row_id.chunk_id, ChunkColumnAccessor::new(segment)?);
        }
        Ok(ReferenceSegmentIter {
            pos_list: &self.pos_list,
            accessors,
            index: 0,
        })
    }

    /// Estimated heap bytes held by the segment (the position list)
    pub fn heap_size(&self) -> usize {
        std::mem::size_of_val(self.pos_list.as_slice())
    }
}

/// Typed iterator over a reference segment
pub struct ReferenceSegmentIter<'a, T: SegmentValue> {
    pos_list: &'a [RowId],
    accessors: FxHashMap<ChunkId, ChunkColumnAccessor<T>>,
    index: usize,
}

impl<T: SegmentValue> std::fmt::Debug for ReferenceSegmentIter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceSegmentIter")
            .field("index", &self.index)
            .finish()
    }
}

impl<T: SegmentValue> Iterator for ReferenceSegmentIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let row_id = *self.pos_list.get(self.index)?;
        self.index += 1;
        if row_id.is_null() {
            return Some(SegmentPosition {
                value: T::default(),
                is_null: true,
                chunk_offset: INVALID_CHUNK_OFFSET,
            });
        }
        let (value, is_null) = match self.accessors.get(&row_id.chunk_id) {
            Some(accessor) => accessor.at(row_id.chunk_offset),
            None => (T::default(), true),
        };
        Some(SegmentPosition {
            value,
            is_null,
            chunk_offset: row_id.chunk_offset,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pos_list.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: SegmentValue> ExactSizeIterator for ReferenceSegmentIter<'_, T> {}
