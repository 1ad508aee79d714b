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

//! Statistics generation
//!
//! Reads every column of every chunk and builds one equal-distinct-count
//! histogram per (chunk, column). Cost is dominated by the per-column sort
//! of distinct values; chunks are processed in parallel.

use std::sync::Arc;

use rayon::prelude::*;

use crate::core::{Result, Schema};
use crate::storage::chunk::Chunk;
use crate::storage::segment::{
    with_data_segment_iter, DataSegment, Segment, SegmentValue,
};
use crate::storage::table::Table;

use super::chunk_statistics::ChunkStatistics;
use super::histogram::{EqualDistinctCountHistogram, Histogram, HistogramDomain};
use super::segment_statistics::{SegmentStatistics, TypedSegmentStatistics};
use super::table_statistics::TableStatistics;

/// Default number of histogram buckets per segment
pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 32;

/// Ascending distinct `(value, count)` pairs plus the null count
fn value_counts<T: SegmentValue>(data: &DataSegment<T>) -> Result<(Vec<(T, u64)>, u64)> {
    let mut values: Vec<T> = Vec::with_capacity(data.len());
    let mut null_count = 0u64;
    with_data_segment_iter!(data, |iter| {
        for position in iter {
            if position.is_null {
                null_count += 1;
            } else {
                values.push(position.value);
            }
        }
    });
    values.sort_by(|a, b| a.total_cmp(b));

    let mut counts: Vec<(T, u64)> = Vec::new();
    for value in values {
        match counts.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => counts.push((value, 1)),
        }
    }
    Ok((counts, null_count))
}

fn typed_segment_statistics<T: HistogramDomain>(
    data: &DataSegment<T>,
) -> Result<SegmentStatistics> {
    let (counts, null_count) = value_counts(data)?;
    let histogram = EqualDistinctCountHistogram::from_distinct_counts(
        &counts,
        DEFAULT_HISTOGRAM_BUCKETS,
    )
    .map(Histogram::EqualDistinctCount);
    let statistics = match histogram {
        Some(histogram) => TypedSegmentStatistics::with_histogram(histogram, null_count),
        None => TypedSegmentStatistics::new(null_count),
    };
    Ok(T::wrap_statistics(statistics))
}

/// Build statistics for every column of one chunk
///
/// Reference segments get no statistics slot; pruning treats absence as
/// "unknown".
pub fn generate_chunk_statistics(chunk: &Chunk, schema: &Schema) -> Result<ChunkStatistics> {
    debug_assert_eq!(chunk.column_count(), schema.len());
    let mut slots = Vec::with_capacity(chunk.column_count());
    for segment in chunk.segments() {
        let slot = match segment.as_ref() {
            Segment::Int32(data) => Some(typed_segment_statistics(data)?),
            Segment::Int64(data) => Some(typed_segment_statistics(data)?),
            Segment::Float(data) => Some(typed_segment_statistics(data)?),
            Segment::Double(data) => Some(typed_segment_statistics(data)?),
            Segment::Text(data) => Some(typed_segment_statistics(data)?),
            Segment::Reference(_) => None,
        };
        slots.push(slot.map(Arc::new));
    }
    Ok(ChunkStatistics::new(slots))
}

/// Build table statistics over an explicit chunk snapshot
pub fn generate_table_statistics_for_chunks(
    chunks: &[Arc<Chunk>],
    schema: &Schema,
) -> Result<TableStatistics> {
    let slots = chunks
        .par_iter()
        .map(|chunk| generate_chunk_statistics(chunk, schema).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    let row_count = chunks.iter().map(|chunk| chunk.size() as u64).sum();
    Ok(TableStatistics::new(
        slots.into_iter().map(Some).collect(),
        row_count,
    ))
}

/// Analyze an entire table; may be slow, use deliberately
pub fn generate_table_statistics(table: &Table) -> Result<TableStatistics> {
    generate_table_statistics_for_chunks(&table.chunks(), table.schema())
}
