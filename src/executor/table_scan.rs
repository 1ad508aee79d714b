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

//! Table scan
//!
//! Scans one column of a table under a normalized predicate and emits a
//! table of reference segments: one position list per matching chunk,
//! shared by every output column. Chunks listed in the exclusion set are
//! skipped without touching any segment. Surviving chunks are scanned in
//! parallel; chunk order is preserved in the output. Literal conversion
//! happens once at scan construction, so the per-row loops stay monomorphic
//! and infallible.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::common::{check_cancelled, CancellationToken};
use crate::core::{
    ChunkId, ColumnId, DataType, Error, PredicateCondition, Result, RowId, Value,
};
use crate::storage::chunk::Chunk;
use crate::storage::segment::{
    with_data_segment_iter, DataSegment, PosList, ReferenceSegment, Segment, SegmentValue,
};
use crate::storage::table::Table;

use super::like::LikeMatcher;
use super::scan_predicate::{OperatorScanPredicate, ScanOperand};

/// Scan of one column under one predicate
pub struct TableScan {
    table: Arc<Table>,
    column_id: ColumnId,
    condition: PredicateCondition,
    value: Value,
    value2: Option<Value>,
    excluded_chunk_ids: Vec<ChunkId>,
    cancellation: Option<CancellationToken>,
}

impl TableScan {
    /// Scan `column_id <condition> value` over `table`
    pub fn new(
        table: Arc<Table>,
        column_id: ColumnId,
        condition: PredicateCondition,
        value: Value,
    ) -> Self {
        Self {
            table,
            column_id,
            condition,
            value,
            value2: None,
            excluded_chunk_ids: Vec::new(),
            cancellation: None,
        }
    }

    /// Build a scan from a normalized predicate
    ///
    /// Column-column predicates are not scannable here.
    pub fn from_predicate(table: Arc<Table>, predicate: &OperatorScanPredicate) -> Result<Self> {
        let value = match &predicate.value {
            ScanOperand::Value(value) => value.clone(),
            ScanOperand::Column(_) => {
                return Err(Error::InvalidArgument(
                    "column-column predicates are not scannable".to_string(),
                ))
            }
        };
        let value2 = match &predicate.value2 {
            Some(ScanOperand::Value(value)) => Some(value.clone()),
            Some(ScanOperand::Column(_)) => {
                return Err(Error::InvalidArgument(
                    "column-column predicates are not scannable".to_string(),
                ))
            }
            None => None,
        };
        let mut scan = Self::new(table, predicate.column_id, predicate.condition, value);
        scan.value2 = value2;
        Ok(scan)
    }

    /// Upper bound for BETWEEN
    pub fn with_value2(mut self, value2: Value) -> Self {
        self.value2 = Some(value2);
        self
    }

    /// Chunks to skip, typically from a stored-table node
    pub fn with_excluded_chunk_ids(mut self, excluded_chunk_ids: Vec<ChunkId>) -> Self {
        self.excluded_chunk_ids = excluded_chunk_ids;
        self
    }

    /// Cooperative cancellation, checked at chunk boundaries
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Execute the scan, producing a table of reference segments
    pub fn execute(&self) -> Result<Table> {
        let schema = Arc::clone(self.table.schema());
        let column = schema.column(self.column_id)?;
        // Surface type mismatches before any chunk is touched.
        self.check_predicate_type(column.data_type)?;

        let chunks = self.table.chunks();
        let excluded: FxHashSet<ChunkId> = self.excluded_chunk_ids.iter().copied().collect();

        let per_chunk: Vec<Option<Vec<Arc<Segment>>>> = chunks
            .par_iter()
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let chunk_id = chunk_index as ChunkId;
                if excluded.contains(&chunk_id) {
                    return Ok(None);
                }
                check_cancelled(self.cancellation.as_ref())?;
                self.scan_chunk(chunk_id, chunk)
            })
            .collect::<Result<Vec<_>>>()?;

        let output = Table::new(schema);
        for segments in per_chunk.into_iter().flatten() {
            output.append_chunk(Chunk::new(segments)?)?;
        }
        Ok(output)
    }

    /// Scan one chunk; `None` when no row matches
    fn scan_chunk(&self, chunk_id: ChunkId, chunk: &Arc<Chunk>) -> Result<Option<Vec<Arc<Segment>>>> {
        let segment = chunk.segment(self.column_id)?;
        match segment.as_ref() {
            Segment::Int32(data) => self.scan_data_chunk(chunk_id, data),
            Segment::Int64(data) => self.scan_data_chunk(chunk_id, data),
            Segment::Float(data) => self.scan_data_chunk(chunk_id, data),
            Segment::Double(data) => self.scan_data_chunk(chunk_id, data),
            Segment::Text(data) => self.scan_data_chunk(chunk_id, data),
            Segment::Reference(reference) => self.scan_reference_chunk(chunk, reference),
        }
    }

    /// Scan a data-segment chunk into reference segments over this table
    fn scan_data_chunk<T: SegmentValue>(
        &self,
        chunk_id: ChunkId,
        data: &DataSegment<T>,
    ) -> Result<Option<Vec<Arc<Segment>>>> {
        let matcher = TypedMatcher::<T>::build(self.condition, &self.value, self.value2.as_ref())?;
        let mut pos_list: PosList = Vec::new();
        with_data_segment_iter!(data, |iter| {
            for position in iter {
                if matcher.matches(&position.value, position.is_null) {
                    pos_list.push(RowId::new(chunk_id, position.chunk_offset));
                }
            }
        });
        if pos_list.is_empty() {
            return Ok(None);
        }

        let pos_list = Arc::new(pos_list);
        let segments = (0..self.table.schema().len() as ColumnId)
            .map(|column_id| {
                ReferenceSegment::new(
                    Arc::clone(&self.table),
                    column_id,
                    Arc::clone(&pos_list),
                )
                .map(|reference| Arc::new(Segment::Reference(reference)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(segments))
    }

    /// Scan a chunk of reference segments; the output references the same
    /// base tables, never the intermediate table
    fn scan_reference_chunk(
        &self,
        chunk: &Arc<Chunk>,
        reference: &ReferenceSegment,
    ) -> Result<Option<Vec<Arc<Segment>>>> {
        let matched = match reference.data_type() {
            DataType::Int32 => self.matched_reference_rows::<i32>(reference)?,
            DataType::Int64 => self.matched_reference_rows::<i64>(reference)?,
            DataType::Float => self.matched_reference_rows::<f32>(reference)?,
            DataType::Double => self.matched_reference_rows::<f64>(reference)?,
            DataType::Text => self.matched_reference_rows::<Arc<str>>(reference)?,
            DataType::Null => Vec::new(),
        };
        if matched.is_empty() {
            return Ok(None);
        }

        let mut segments = Vec::with_capacity(chunk.column_count());
        for column_segment in chunk.segments() {
            let Segment::Reference(column_reference) = column_segment.as_ref() else {
                return Err(Error::InvalidSegment(
                    "chunks mixing reference and data segments are not scannable".to_string(),
                ));
            };
            let source = column_reference.pos_list();
            let pos_list: PosList = matched.iter().map(|&index| source[index]).collect();
            let reference_segment = ReferenceSegment::new(
                Arc::clone(column_reference.referenced_table()),
                column_reference.referenced_column_id(),
                Arc::new(pos_list),
            )?;
            segments.push(Arc::new(Segment::Reference(reference_segment)));
        }
        Ok(Some(segments))
    }

    /// Indices into the position list whose resolved rows match
    fn matched_reference_rows<T: SegmentValue>(
        &self,
        reference: &ReferenceSegment,
    ) -> Result<Vec<usize>> {
        let matcher = TypedMatcher::<T>::build(self.condition, &self.value, self.value2.as_ref())?;
        Ok(reference
            .iter::<T>()?
            .enumerate()
            .filter(|(_, position)| matcher.matches(&position.value, position.is_null))
            .map(|(index, _)| index)
            .collect())
    }

    /// Validate the literal types against the scanned column up front
    fn check_predicate_type(&self, column_type: DataType) -> Result<()> {
        match self.condition {
            PredicateCondition::IsNull | PredicateCondition::IsNotNull => Ok(()),
            PredicateCondition::Like | PredicateCondition::NotLike => {
                if column_type != DataType::Text {
                    return Err(Error::TypeMismatch {
                        expected: DataType::Text,
                        got: column_type,
                    });
                }
                if self.value.as_str().is_none() {
                    return Err(Error::TypeMismatch {
                        expected: DataType::Text,
                        got: self.value.data_type(),
                    });
                }
                Ok(())
            }
            _ => {
                let check = |value: &Value| {
                    if value.data_type() != column_type {
                        Err(Error::TypeMismatch {
                            expected: column_type,
                            got: value.data_type(),
                        })
                    } else {
                        Ok(())
                    }
                };
                check(&self.value)?;
                if self.condition.is_ternary() {
                    let value2 = self.value2.as_ref().ok_or_else(|| {
                        Error::InvalidArgument("BETWEEN requires an upper bound".to_string())
                    })?;
                    check(value2)?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Row matching
// =============================================================================

/// Predicate matcher specialized to one value type at scan construction
enum TypedMatcher<T> {
    Ordering {
        condition: PredicateCondition,
        value: T,
        value2: Option<T>,
    },
    NullCheck {
        negated: bool,
    },
    Pattern {
        matcher: LikeMatcher,
        negated: bool,
    },
}

impl<T: SegmentValue> TypedMatcher<T> {
    fn build(
        condition: PredicateCondition,
        value: &Value,
        value2: Option<&Value>,
    ) -> Result<Self> {
        match condition {
            PredicateCondition::IsNull => Ok(TypedMatcher::NullCheck { negated: false }),
            PredicateCondition::IsNotNull => Ok(TypedMatcher::NullCheck { negated: true }),
            PredicateCondition::Like | PredicateCondition::NotLike => {
                let pattern = value.as_str().ok_or(Error::TypeMismatch {
                    expected: DataType::Text,
                    got: value.data_type(),
                })?;
                Ok(TypedMatcher::Pattern {
                    matcher: LikeMatcher::new(pattern),
                    negated: condition == PredicateCondition::NotLike,
                })
            }
            _ => {
                let typed = T::from_value(value).ok_or(Error::TypeMismatch {
                    expected: T::DATA_TYPE,
                    got: value.data_type(),
                })?;
                let typed2 = value2
                    .map(|value2| {
                        T::from_value(value2).ok_or(Error::TypeMismatch {
                            expected: T::DATA_TYPE,
                            got: value2.data_type(),
                        })
                    })
                    .transpose()?;
                Ok(TypedMatcher::Ordering {
                    condition,
                    value: typed,
                    value2: typed2,
                })
            }
        }
    }

    fn matches(&self, value: &T, is_null: bool) -> bool {
        match self {
            TypedMatcher::NullCheck { negated } => is_null != *negated,
            TypedMatcher::Ordering {
                condition,
                value: bound,
                value2,
            } => {
                if is_null {
                    return false;
                }
                let ordering = value.total_cmp(bound);
                match condition {
                    PredicateCondition::Equals => ordering == Ordering::Equal,
                    PredicateCondition::NotEquals => ordering != Ordering::Equal,
                    PredicateCondition::LessThan => ordering == Ordering::Less,
                    PredicateCondition::LessThanEquals => ordering != Ordering::Greater,
                    PredicateCondition::GreaterThan => ordering == Ordering::Greater,
                    PredicateCondition::GreaterThanEquals => ordering != Ordering::Less,
                    PredicateCondition::Between => {
                        ordering != Ordering::Less
                            && value2
                                .as_ref()
                                .map(|upper| value.total_cmp(upper) != Ordering::Greater)
                                .unwrap_or(false)
                    }
                    _ => false,
                }
            }
            TypedMatcher::Pattern { matcher, negated } => {
                if is_null {
                    return false;
                }
                match value.as_text() {
                    Some(text) => matcher.matches(text) != *negated,
                    None => false,
                }
            }
        }
    }
}
