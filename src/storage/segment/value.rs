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

//! Value segment: plain value vector plus a parallel null bitmap
//!
//! The unencoded baseline every encoder starts from. Null slots hold
//! `T::default()` so the value vector stays densely indexed.

use crate::common::NullBitmap;
use crate::core::{ChunkOffset, Error, Result};

use super::{SegmentPosition, SegmentRandomAccess, SegmentValue};

/// Plain vector of values with an optional null bitmap
#[derive(Debug, Clone)]
pub struct ValueSegment<T: SegmentValue> {
    values: Vec<T>,
    nulls: Option<NullBitmap>,
}

impl<T: SegmentValue> ValueSegment<T> {
    /// Create a segment without nulls
    pub fn from_values(values: Vec<T>) -> Self {
        Self { values, nulls: None }
    }

    /// Create a segment from values and a parallel null bitmap
    pub fn from_values_and_nulls(values: Vec<T>, nulls: NullBitmap) -> Result<Self> {
        if nulls.len() != values.len() {
            return Err(Error::InvalidSegment(format!(
                "null bitmap covers {} rows, value vector holds {}",
                nulls.len(),
                values.len()
            )));
        }
        Ok(Self {
            values,
            nulls: Some(nulls),
        })
    }

    /// Create a segment from optional values; `None` becomes NULL
    pub fn from_options(rows: Vec<Option<T>>) -> Self {
        let mut nulls = NullBitmap::new(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            match row {
                Some(value) => values.push(value),
                None => {
                    values.push(T::default());
                    nulls.set(position, true);
                }
            }
        }
        Self {
            values,
            nulls: Some(nulls),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The dense value vector; null slots hold `T::default()`
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The null bitmap, if any row may be null
    pub fn nulls(&self) -> Option<&NullBitmap> {
        self.nulls.as_ref()
    }

    /// Returns true if the row at `position` is NULL
    pub fn is_null(&self, position: usize) -> bool {
        self.nulls
            .as_ref()
            .map(|bitmap| bitmap.is_null(position))
            .unwrap_or(false)
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        self.nulls
            .as_ref()
            .map(|bitmap| bitmap.null_count())
            .unwrap_or(0)
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        let position = offset as usize;
        if self.is_null(position) {
            (T::default(), true)
        } else {
            (self.values[position].clone(), false)
        }
    }

    /// Sequential iterator over every row in order
    pub fn iter(&self) -> ValueSegmentIter<'_, T> {
        ValueSegmentIter {
            segment: self,
            index: 0,
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
            + self.nulls.as_ref().map(|bitmap| bitmap.heap_size()).unwrap_or(0)
    }
}

impl<T: SegmentValue> SegmentRandomAccess<T> for &ValueSegment<T> {
    fn segment_len(&self) -> usize {
        self.len()
    }

    fn at(&self, offset: ChunkOffset) -> (T, bool) {
        ValueSegment::at(self, offset)
    }
}

/// Sequential iterator over a value segment
pub struct ValueSegmentIter<'a, T: SegmentValue> {
    segment: &'a ValueSegment<T>,
    index: usize,
}

impl<T: SegmentValue> Iterator for ValueSegmentIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.segment.len() {
            return None;
        }
        let chunk_offset = self.index as ChunkOffset;
        let (value, is_null) = self.segment.at(chunk_offset);
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

impl<T: SegmentValue> ExactSizeIterator for ValueSegmentIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_iteration_yields_every_offset() {
        let segment = ValueSegment::from_options(vec![Some(1i32), None, Some(3)]);
        let positions: Vec<_> = segment.iter().collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], SegmentPosition { value: 1, is_null: false, chunk_offset: 0 });
        assert_eq!(positions[1], SegmentPosition { value: 0, is_null: true, chunk_offset: 1 });
        assert_eq!(positions[2], SegmentPosition { value: 3, is_null: false, chunk_offset: 2 });
    }

    #[test]
    fn bitmap_length_must_match() {
        let err =
            ValueSegment::from_values_and_nulls(vec![1i32, 2], NullBitmap::new(3)).unwrap_err();
        assert!(matches!(err, Error::InvalidSegment(_)));
    }

    #[test]
    fn point_access_echoes_positions() {
        let segment = ValueSegment::from_values(vec![10i64, 20, 30]);
        let positions = [2, 0];
        let decoded: Vec<_> = segment.point_iter(&positions).unwrap().collect();
        assert_eq!(decoded[0].value, 30);
        assert_eq!(decoded[0].chunk_offset, 2);
        assert_eq!(decoded[1].value, 10);
        assert_eq!(decoded[1].chunk_offset, 0);
    }
}
