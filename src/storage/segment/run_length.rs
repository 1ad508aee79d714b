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

//! Run-length segment: parallel (value, null flag, end position) run arrays
//!
//! A new run starts whenever the (value, is_null) pair changes. Run `i`
//! covers positions `(end_positions[i-1], end_positions[i]]`; end positions
//! are strictly increasing and the last one equals `len - 1`.

use crate::common::NullBitmap;
use crate::core::{ChunkOffset, Result};

use super::value::ValueSegment;
use super::{SegmentPosition, SegmentRandomAccess, SegmentValue};

/// Run-length encoded segment
#[derive(Debug, Clone)]
pub struct RunLengthSegment<T: SegmentValue> {
    values: Vec<T>,
    null_flags: NullBitmap,
    end_positions: Vec<ChunkOffset>,
    len: usize,
}

impl<T: SegmentValue> RunLengthSegment<T> {
    /// Encode a value segment
    pub fn encode(source: &ValueSegment<T>) -> Self {
        let mut values: Vec<T> = Vec::new();
        let mut flags: Vec<bool> = Vec::new();
        let mut end_positions: Vec<ChunkOffset> = Vec::new();

        for (position, value) in source.values().iter().enumerate() {
            let is_null = source.is_null(position);
            let starts_new_run = match (values.last(), flags.last()) {
                (Some(last_value), Some(&last_null)) => {
                    is_null != last_null || (!is_null && last_value != value)
                }
                _ => true,
            };
            if starts_new_run {
                values.push(if is_null { T::default() } else { value.clone() });
                flags.push(is_null);
                end_positions.push(position as ChunkOffset);
            } else {
                // Extend the current run.
                let last = end_positions.len() - 1;
                end_positions[last] = position as ChunkOffset;
            }
        }

        Self {
            values,
            null_flags: NullBitmap::from_flags(&flags),
            end_positions,
            len: source.len(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of runs
    pub fn run_count(&self) -> usize {
        self.values.len()
    }

    /// One representative value per run; null runs hold `T::default()`
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// One null flag per run
    pub fn null_flags(&self) -> &NullBitmap {
        &self.null_flags
    }

    /// Cumulative inclusive end position per run, strictly increasing
    pub fn end_positions(&self) -> &[ChunkOffset] {
        &self.end_positions
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        let mut count = 0usize;
        let mut run_start = 0usize;
        for (run, &end) in self.end_positions.iter().enumerate() {
            if self.null_flags.is_null(run) {
                count += end as usize + 1 - run_start;
            }
            run_start = end as usize + 1;
        }
        count
    }

    /// Index of the run covering `offset`
    fn run_for(&self, offset: ChunkOffset) -> usize {
        self.end_positions.partition_point(|&end| end < offset)
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        let run = self.run_for(offset);
        if self.null_flags.is_null(run) {
            (T::default(), true)
        } else {
            (self.values[run].clone(), false)
        }
    }

    /// Sequential iterator over every row in order
    pub fn iter(&self) -> RunLengthSegmentIter<'_, T> {
        RunLengthSegmentIter {
            segment: self,
            index: 0,
            run: 0,
        }
    }

    /// Point-access iterator over the given positions
    pub fn point_iter<'a>(
        &'a self,
        positions: &'a [ChunkOffset],
    ) -> Result<super::PointIter<'a, &'a Self, T>> {
        super::PointIter::new(self, positions)
    }

    /// Estimated heap bytes held by the segment
    pub fn heap_size(&self) -> usize {
        T::heap_size_of(&self.values)
            + self.null_flags.heap_size()
            + std::mem::size_of_val(self.end_positions.as_slice())
    }
}

impl<T: SegmentValue> SegmentRandomAccess<T> for &RunLengthSegment<T> {
    fn segment_len(&self) -> usize {
        self.len()
    }

    fn at(&self, offset: ChunkOffset) -> (T, bool) {
        RunLengthSegment::at(self, offset)
    }
}

/// Sequential iterator over a run-length segment; advances run-by-run
pub struct RunLengthSegmentIter<'a, T: SegmentValue> {
    segment: &'a RunLengthSegment<T>,
    index: usize,
    run: usize,
}

impl<T: SegmentValue> Iterator for RunLengthSegmentIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.segment.len() {
            return None;
        }
        let chunk_offset = self.index as ChunkOffset;
        if chunk_offset > self.segment.end_positions[self.run] {
            self.run += 1;
        }
        let is_null = self.segment.null_flags.is_null(self.run);
        let value = if is_null {
            T::default()
        } else {
            self.segment.values[self.run].clone()
        };
        self.index += 1;
        Some(SegmentPosition {
            value,
            is_null,
            chunk_offset,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.segment.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: SegmentValue> ExactSizeIterator for RunLengthSegmentIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_split_on_value_and_null_changes() {
        let source = ValueSegment::from_options(vec![
            Some(5i64),
            Some(5),
            Some(5),
            Some(7),
            Some(7),
            None,
            None,
            Some(5),
        ]);
        let segment = RunLengthSegment::encode(&source);

        assert_eq!(segment.run_count(), 4);
        assert_eq!(segment.values(), &[5, 7, 0, 5]);
        let flags: Vec<bool> = segment.null_flags().iter().collect();
        assert_eq!(flags, vec![false, false, true, false]);
        assert_eq!(segment.end_positions(), &[2, 4, 6, 7]);
        assert_eq!(segment.null_count(), 2);
    }

    #[test]
    fn decode_matches_source() {
        let source = ValueSegment::from_options(vec![
            Some(1i32),
            Some(1),
            None,
            Some(2),
            Some(2),
            Some(2),
        ]);
        let segment = RunLengthSegment::encode(&source);
        let decoded: Vec<_> = segment.iter().collect();
        let expected: Vec<_> = source.iter().collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn random_access_hits_the_right_run() {
        let source = ValueSegment::from_values(vec![9i32, 9, 4, 4, 4, 1]);
        let segment = RunLengthSegment::encode(&source);
        assert_eq!(segment.at(0), (9, false));
        assert_eq!(segment.at(4), (4, false));
        assert_eq!(segment.at(5), (1, false));
    }
}
