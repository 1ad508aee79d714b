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

//! LZ4 segment: whole-segment compressed blob plus a stored null bitmap
//!
//! The raw byte image of the value vector (length-prefixed for strings) is
//! compressed as a single frame. The null bitmap stays uncompressed so null
//! filtering never pays for a decode. Reading decompresses the entire
//! segment once per iterator or accessor construction.

use std::marker::PhantomData;

use crate::common::{check_cancelled, CancellationToken, NullBitmap};
use crate::core::{ChunkOffset, Error, Result};

use super::value::ValueSegment;
use super::{SegmentPosition, SegmentRandomAccess, SegmentValue};

/// Upper bound on the uncompressed byte image of one segment
pub const MAX_LZ4_INPUT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// LZ4-compressed segment
#[derive(Debug, Clone)]
pub struct Lz4Segment<T: SegmentValue> {
    decompressed_size: u64,
    compressed: Vec<u8>,
    nulls: NullBitmap,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: SegmentValue> Lz4Segment<T> {
    /// Encode a value segment
    ///
    /// Fails with `SegmentTooLarge` when the raw byte image exceeds
    /// [`MAX_LZ4_INPUT_BYTES`].
    pub fn encode(
        source: &ValueSegment<T>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Self> {
        let image_size = T::image_size(source.values());
        if image_size > MAX_LZ4_INPUT_BYTES {
            return Err(Error::SegmentTooLarge {
                limit: MAX_LZ4_INPUT_BYTES,
                got: image_size,
            });
        }
        check_cancelled(cancellation)?;

        let mut image = Vec::with_capacity(image_size as usize);
        T::write_image(source.values(), &mut image);
        check_cancelled(cancellation)?;
        let compressed = lz4_flex::block::compress(&image);

        let nulls = match source.nulls() {
            Some(bitmap) => bitmap.clone(),
            None => NullBitmap::new(source.len()),
        };
        Ok(Self {
            decompressed_size: image.len() as u64,
            compressed,
            nulls,
            len: source.len(),
            _marker: PhantomData,
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

    /// Size of the uncompressed byte image in bytes
    pub fn decompressed_size(&self) -> u64 {
        self.decompressed_size
    }

    /// Size of the compressed blob in bytes
    pub fn compressed_size(&self) -> u64 {
        self.compressed.len() as u64
    }

    /// The uncompressed null bitmap
    pub fn null_bitmap(&self) -> &NullBitmap {
        &self.nulls
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        self.nulls.null_count()
    }

    /// Decompress the whole segment into a random-access buffer
    pub fn decompress(&self) -> Result<Lz4Decompressed<T>> {
        let image = lz4_flex::block::decompress(&self.compressed, self.decompressed_size as usize)
            .map_err(|error| Error::InvalidSegment(format!("lz4 decode failed: {error}")))?;
        let values = T::read_image(&image, self.len)?;
        Ok(Lz4Decompressed {
            values,
            nulls: self.nulls.clone(),
        })
    }

    /// Sequential iterator; decompresses once at construction
    pub fn iter(&self) -> Result<Lz4SegmentIter<'_, T>> {
        let decompressed = self.decompress()?;
        Ok(Lz4SegmentIter {
            values: decompressed.values,
            nulls: &self.nulls,
            index: 0,
        })
    }

    /// Point-access iterator over the given positions
    pub fn point_iter<'a>(
        &self,
        positions: &'a [ChunkOffset],
    ) -> Result<super::PointIter<'a, Lz4Decompressed<T>, T>> {
        super::PointIter::new(self.decompress()?, positions)
    }

    /// Estimated heap bytes held by the segment
    pub fn heap_size(&self) -> usize {
        self.compressed.len() + self.nulls.heap_size()
    }
}

/// Fully decompressed copy of an LZ4 segment
pub struct Lz4Decompressed<T: SegmentValue> {
    values: Vec<T>,
    nulls: NullBitmap,
}

impl<T: SegmentValue + std::fmt::Debug> std::fmt::Debug for Lz4Decompressed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lz4Decompressed")
            .field("values", &self.values)
            .field("nulls", &self.nulls)
            .finish()
    }
}

impl<T: SegmentValue> Lz4Decompressed<T> {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the buffer holds no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        let position = offset as usize;
        if self.nulls.is_null(position) {
            (T::default(), true)
        } else {
            (self.values[position].clone(), false)
        }
    }
}

impl<T: SegmentValue> SegmentRandomAccess<T> for Lz4Decompressed<T> {
    fn segment_len(&self) -> usize {
        self.len()
    }

    fn at(&self, offset: ChunkOffset) -> (T, bool) {
        Lz4Decompressed::at(self, offset)
    }
}

/// Sequential iterator over a decompressed LZ4 segment
pub struct Lz4SegmentIter<'a, T: SegmentValue> {
    values: Vec<T>,
    nulls: &'a NullBitmap,
    index: usize,
}

impl<T: SegmentValue> Iterator for Lz4SegmentIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.values.len() {
            return None;
        }
        let chunk_offset = self.index as ChunkOffset;
        let is_null = self.nulls.is_null(self.index);
        let value = if is_null {
            T::default()
        } else {
            self.values[self.index].clone()
        };
        self.index += 1;
        Some(SegmentPosition {
            value,
            is_null,
            chunk_offset,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: SegmentValue> ExactSizeIterator for Lz4SegmentIter<'_, T> {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn integers_roundtrip() {
        let source = ValueSegment::from_options(vec![Some(7i64), None, Some(-3), Some(7)]);
        let segment = Lz4Segment::encode(&source, None).unwrap();
        assert_eq!(segment.decompressed_size(), 32);
        let decoded: Vec<_> = segment.iter().unwrap().collect();
        let expected: Vec<_> = source.iter().collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn strings_roundtrip_with_length_prefixes() {
        let rows: Vec<Option<Arc<str>>> = vec![
            Some(Arc::from("alpha")),
            Some(Arc::from("")),
            None,
            Some(Arc::from("Δ unicode")),
        ];
        let source = ValueSegment::from_options(rows);
        let segment = Lz4Segment::encode(&source, None).unwrap();
        let decoded: Vec<_> = segment.iter().unwrap().collect();
        let expected: Vec<_> = source.iter().collect();
        assert_eq!(decoded, expected);
        assert_eq!(segment.null_count(), 1);
    }

    #[test]
    fn null_filtering_needs_no_decode() {
        let source = ValueSegment::from_options(vec![None::<i32>, Some(1), None]);
        let segment = Lz4Segment::encode(&source, None).unwrap();
        assert!(segment.null_bitmap().is_null(0));
        assert!(!segment.null_bitmap().is_null(1));
        assert_eq!(segment.null_count(), 2);
    }

    #[test]
    fn corrupted_blob_is_detected() {
        let source = ValueSegment::from_values(vec![1i32, 2, 3, 4, 5, 6, 7, 8]);
        let mut segment = Lz4Segment::encode(&source, None).unwrap();
        segment.compressed.truncate(1);
        assert!(matches!(
            segment.decompress().unwrap_err(),
            Error::InvalidSegment(_)
        ));
    }
}
