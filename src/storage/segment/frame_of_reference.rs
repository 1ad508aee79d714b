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

//! Frame-of-reference segment: per-block reference plus bit-packed deltas
//!
//! Integral columns only. Values are split into fixed-size blocks; each
//! block stores its minimum as the reference and every value as a
//! bit-packed non-negative delta, so decoding is lossless by construction.
//! Null positions keep delta 0 and are tracked in a separate bitmap.

use crate::common::{check_cancelled, CancellationToken, NullBitmap};
use crate::core::{ChunkOffset, Result};
use crate::storage::compressed_vector::BitPackedVector;

use super::value::ValueSegment;
use super::{SegmentPosition, SegmentRandomAccess, SegmentValue};

/// Rows per frame-of-reference block
pub const FOR_BLOCK_SIZE: usize = 2048;

/// One encoded block: reference value plus bit-packed deltas
#[derive(Debug, Clone)]
pub struct ForBlock<T> {
    reference: T,
    deltas: BitPackedVector,
}

impl<T: SegmentValue> ForBlock<T> {
    /// The block's reference value (its minimum)
    pub fn reference(&self) -> &T {
        &self.reference
    }

    /// Width of each stored delta in bits
    pub fn bit_width(&self) -> u8 {
        self.deltas.bits()
    }

    /// The bit-packed deltas
    pub fn deltas(&self) -> &BitPackedVector {
        &self.deltas
    }
}

/// Frame-of-reference encoded segment
#[derive(Debug, Clone)]
pub struct FrameOfReferenceSegment<T: SegmentValue> {
    blocks: Vec<ForBlock<T>>,
    nulls: Option<NullBitmap>,
    block_size: usize,
    len: usize,
}

impl<T: SegmentValue> FrameOfReferenceSegment<T> {
    /// Encode a value segment with the default block size
    pub fn encode(
        source: &ValueSegment<T>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Self> {
        Self::encode_with_block_size(source, FOR_BLOCK_SIZE, cancellation)
    }

    /// Encode a value segment with an explicit block size
    pub fn encode_with_block_size(
        source: &ValueSegment<T>,
        block_size: usize,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Self> {
        debug_assert!(block_size > 0);
        let values = source.values();
        let mut blocks = Vec::with_capacity(values.len().div_ceil(block_size));

        for (block_index, block_values) in values.chunks(block_size).enumerate() {
            check_cancelled(cancellation)?;
            let block_start = block_index * block_size;
            let reference = block_values
                .iter()
                .enumerate()
                .filter(|(position, _)| !source.is_null(block_start + position))
                .map(|(_, value)| value)
                .min_by(|a, b| a.total_cmp(b))
                .cloned()
                .unwrap_or_default();
            let deltas: Vec<u64> = block_values
                .iter()
                .enumerate()
                .map(|(position, value)| {
                    if source.is_null(block_start + position) {
                        0
                    } else {
                        value.frame_delta(&reference)
                    }
                })
                .collect();
            blocks.push(ForBlock {
                reference,
                deltas: BitPackedVector::encode(&deltas),
            });
        }

        Ok(Self {
            blocks,
            nulls: source.nulls().cloned(),
            block_size,
            len: source.len(),
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rows per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The encoded blocks in order
    pub fn blocks(&self) -> &[ForBlock<T>] {
        &self.blocks
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        self.nulls
            .as_ref()
            .map(|bitmap| bitmap.null_count())
            .unwrap_or(0)
    }

    fn is_null(&self, position: usize) -> bool {
        self.nulls
            .as_ref()
            .map(|bitmap| bitmap.is_null(position))
            .unwrap_or(false)
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        let position = offset as usize;
        if self.is_null(position) {
            return (T::default(), true);
        }
        let block = &self.blocks[position / self.block_size];
        let delta = block.deltas.get(position % self.block_size);
        (T::apply_frame_delta(&block.reference, delta), false)
    }

    /// Sequential iterator over every row in order
    pub fn iter(&self) -> FrameOfReferenceSegmentIter<'_, T> {
        FrameOfReferenceSegmentIter {
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
        self.blocks
            .iter()
            .map(|block| std::mem::size_of::<T>() + block.deltas.heap_size())
            .sum::<usize>()
            + self.nulls.as_ref().map(|bitmap| bitmap.heap_size()).unwrap_or(0)
    }
}

impl<T: SegmentValue> SegmentRandomAccess<T> for &FrameOfReferenceSegment<T> {
    fn segment_len(&self) -> usize {
        self.len()
    }

    fn at(&self, offset: ChunkOffset) -> (T, bool) {
        FrameOfReferenceSegment::at(self, offset)
    }
}

/// Sequential iterator over a frame-of-reference segment
pub struct FrameOfReferenceSegmentIter<'a, T: SegmentValue> {
    segment: &'a FrameOfReferenceSegment<T>,
    index: usize,
}

impl<T: SegmentValue> Iterator for FrameOfReferenceSegmentIter<'_, T> {
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

impl<T: SegmentValue> ExactSizeIterator for FrameOfReferenceSegmentIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_references_and_widths() {
        let source = ValueSegment::from_values(vec![1000i32, 1001, 1002, 1050, 2000, 2001]);
        let segment =
            FrameOfReferenceSegment::encode_with_block_size(&source, 3, None).unwrap();

        assert_eq!(segment.blocks().len(), 2);
        assert_eq!(*segment.blocks()[0].reference(), 1000);
        assert_eq!(segment.blocks()[0].bit_width(), 2);
        assert_eq!(*segment.blocks()[1].reference(), 1050);
        assert_eq!(segment.blocks()[1].bit_width(), 10);

        let decoded: Vec<i32> = segment.iter().map(|position| position.value).collect();
        assert_eq!(decoded, vec![1000, 1001, 1002, 1050, 2000, 2001]);
    }

    #[test]
    fn negative_values_and_nulls_roundtrip() {
        let source = ValueSegment::from_options(vec![
            Some(-50i64),
            None,
            Some(-100),
            Some(0),
            Some(-100),
        ]);
        let segment = FrameOfReferenceSegment::encode_with_block_size(&source, 4, None).unwrap();
        let decoded: Vec<_> = segment.iter().collect();
        let expected: Vec<_> = source.iter().collect();
        assert_eq!(decoded, expected);
        assert_eq!(segment.null_count(), 1);
    }

    #[test]
    fn extreme_i64_range_is_lossless() {
        let source = ValueSegment::from_values(vec![i64::MIN, i64::MAX, 0]);
        let segment = FrameOfReferenceSegment::encode(&source, None).unwrap();
        let decoded: Vec<i64> = segment.iter().map(|position| position.value).collect();
        assert_eq!(decoded, vec![i64::MIN, i64::MAX, 0]);
    }

    #[test]
    fn cancellation_stops_between_blocks() {
        let token = CancellationToken::new();
        token.cancel();
        let source = ValueSegment::from_values((0..10i32).collect());
        let err = FrameOfReferenceSegment::encode_with_block_size(&source, 2, Some(&token))
            .unwrap_err();
        assert_eq!(err, crate::core::Error::Cancelled);
    }
}
