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

//! Dictionary segment: sorted unique dictionary plus compressed index vector
//!
//! The dictionary holds the D distinct non-null values in ascending order;
//! the attribute vector stores one index per row. Index D is the null code,
//! so the vector is sized for D + 1 code values. Text collation is raw byte
//! order.

use crate::core::{ChunkOffset, Result, VectorCompression};
use crate::storage::compressed_vector::CompressedVector;

use super::value::ValueSegment;
use super::{SegmentPosition, SegmentRandomAccess, SegmentValue};

/// Sorted unique dictionary plus per-row dictionary indices
#[derive(Debug, Clone)]
pub struct DictionarySegment<T: SegmentValue> {
    dictionary: Vec<T>,
    attribute_vector: CompressedVector,
}

impl<T: SegmentValue> DictionarySegment<T> {
    /// Encode a value segment
    pub fn encode(source: &ValueSegment<T>, compression: VectorCompression) -> Self {
        let mut dictionary: Vec<T> = Vec::new();
        for (position, value) in source.values().iter().enumerate() {
            if !source.is_null(position) {
                dictionary.push(value.clone());
            }
        }
        dictionary.sort_by(|a, b| a.total_cmp(b));
        dictionary.dedup_by(|a, b| a.total_cmp(b) == std::cmp::Ordering::Equal);

        let null_code = dictionary.len() as u64;
        let codes: Vec<u64> = source
            .values()
            .iter()
            .enumerate()
            .map(|(position, value)| {
                if source.is_null(position) {
                    null_code
                } else {
                    // The dictionary is sorted and complete, so the search
                    // always succeeds.
                    dictionary
                        .binary_search_by(|entry| entry.total_cmp(value))
                        .unwrap_or(0) as u64
                }
            })
            .collect();

        // Size the vector for the null code even when no row is null.
        let attribute_vector = CompressedVector::encode_with_max(&codes, null_code, compression);
        Self {
            dictionary,
            attribute_vector,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.attribute_vector.len()
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.attribute_vector.is_empty()
    }

    /// The sorted unique dictionary
    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    /// The per-row dictionary indices
    pub fn attribute_vector(&self) -> &CompressedVector {
        &self.attribute_vector
    }

    /// The reserved null index, equal to the dictionary length
    pub fn null_code(&self) -> u32 {
        self.dictionary.len() as u32
    }

    /// Number of distinct non-null values
    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        let null_code = self.null_code() as u64;
        self.attribute_vector
            .iter()
            .filter(|&code| code == null_code)
            .count()
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        let code = self.attribute_vector.get(offset as usize);
        if code == self.null_code() as u64 {
            (T::default(), true)
        } else {
            (self.dictionary[code as usize].clone(), false)
        }
    }

    /// Sequential iterator over every row in order
    pub fn iter(&self) -> DictionarySegmentIter<'_, T> {
        DictionarySegmentIter {
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
        T::heap_size_of(&self.dictionary) + self.attribute_vector.heap_size()
    }
}

impl<T: SegmentValue> SegmentRandomAccess<T> for &DictionarySegment<T> {
    fn segment_len(&self) -> usize {
        self.len()
    }

    fn at(&self, offset: ChunkOffset) -> (T, bool) {
        DictionarySegment::at(self, offset)
    }
}

/// Sequential iterator over a dictionary segment
pub struct DictionarySegmentIter<'a, T: SegmentValue> {
    segment: &'a DictionarySegment<T>,
    index: usize,
}

impl<T: SegmentValue> Iterator for DictionarySegmentIter<'_, T> {
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

impl<T: SegmentValue> ExactSizeIterator for DictionarySegmentIter<'_, T> {}
