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

//! Segment variants and the iteration contract
//!
//! A segment holds one column's data within one chunk under one encoding.
//! Segments are immutable after construction and safe to share across
//! threads. Iteration yields `(value, is_null, chunk_offset)` triples; the
//! encoding x type dispatch happens once at iterator construction, the
//! inner loops are monomorphic.

pub mod dictionary;
pub mod frame_of_reference;
pub mod lz4;
pub mod reference;
pub mod run_length;
pub mod value;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::{
    ChunkOffset, DataType, EncodingKind, Error, Result, Value, INVALID_CHUNK_OFFSET,
};

pub use dictionary::{DictionarySegment, DictionarySegmentIter};
pub use frame_of_reference::{
    ForBlock, FrameOfReferenceSegment, FrameOfReferenceSegmentIter, FOR_BLOCK_SIZE,
};
pub use lz4::{Lz4Decompressed, Lz4Segment, Lz4SegmentIter, MAX_LZ4_INPUT_BYTES};
pub use reference::{PosList, ReferenceSegment, ReferenceSegmentIter};
pub use run_length::{RunLengthSegment, RunLengthSegmentIter};
pub use value::{ValueSegment, ValueSegmentIter};

// =============================================================================
// The closed value type set
// =============================================================================

/// Values that can live inside a typed segment
///
/// Implemented exactly for `i32`, `i64`, `f32`, `f64` and `Arc<str>` — the
/// closed data type set. The frame-of-reference hooks are only meaningful
/// for the integral types; the encoder rejects every other type before they
/// are reached.
pub trait SegmentValue: Clone + Default + PartialEq + Send + Sync + 'static {
    /// The logical data type stored by this Rust type
    const DATA_TYPE: DataType;

    /// Strict extraction from a value carrier; no cross-tag coercion
    fn from_value(value: &Value) -> Option<Self>;

    /// Wrap into a value carrier
    fn into_value(self) -> Value;

    /// Total ordering; floats order NaN after all numbers
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// Borrow as text; `None` for non-text types
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Size in bytes of the raw byte image of `values`
    fn image_size(values: &[Self]) -> u64;

    /// Append the raw byte image of `values` to `buffer`
    fn write_image(values: &[Self], buffer: &mut Vec<u8>);

    /// Reconstruct `len` values from a raw byte image
    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>>;

    /// Non-negative distance to a block reference (integral types only)
    fn frame_delta(&self, reference: &Self) -> u64 {
        let _ = reference;
        0
    }

    /// Reconstruct a value from a block reference and a stored delta
    fn apply_frame_delta(reference: &Self, delta: u64) -> Self {
        let _ = delta;
        reference.clone()
    }

    /// Borrow the typed data segment out of an untyped segment handle
    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>>;

    /// Wrap a typed data segment into an untyped segment handle
    fn wrap_segment(data: DataSegment<Self>) -> Segment;

    /// Heap bytes held by a slice of values, including owned indirections
    fn heap_size_of(values: &[Self]) -> usize;
}

impl SegmentValue for i32 {
    const DATA_TYPE: DataType = DataType::Int32;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int32()
    }

    fn into_value(self) -> Value {
        Value::Int32(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn image_size(values: &[Self]) -> u64 {
        values.len() as u64 * 4
    }

    fn write_image(values: &[Self], buffer: &mut Vec<u8>) {
        for value in values {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>> {
        read_fixed_image(buffer, len, 4, |bytes| {
            i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        })
    }

    fn frame_delta(&self, reference: &Self) -> u64 {
        (*self as i64 - *reference as i64) as u64
    }

    fn apply_frame_delta(reference: &Self, delta: u64) -> Self {
        (*reference as i64 + delta as i64) as i32
    }

    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>> {
        match segment {
            Segment::Int32(data) => Some(data),
            _ => None,
        }
    }

    fn wrap_segment(data: DataSegment<Self>) -> Segment {
        Segment::Int32(data)
    }

    fn heap_size_of(values: &[Self]) -> usize {
        std::mem::size_of_val(values)
    }
}

impl SegmentValue for i64 {
    const DATA_TYPE: DataType = DataType::Int64;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int64()
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn image_size(values: &[Self]) -> u64 {
        values.len() as u64 * 8
    }

    fn write_image(values: &[Self], buffer: &mut Vec<u8>) {
        for value in values {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>> {
        read_fixed_image(buffer, len, 8, |bytes| {
            let mut array = [0u8; 8];
            array.copy_from_slice(bytes);
            i64::from_le_bytes(array)
        })
    }

    fn frame_delta(&self, reference: &Self) -> u64 {
        (*self as i128 - *reference as i128) as u64
    }

    fn apply_frame_delta(reference: &Self, delta: u64) -> Self {
        (*reference as i128 + delta as i128) as i64
    }

    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>> {
        match segment {
            Segment::Int64(data) => Some(data),
            _ => None,
        }
    }

    fn wrap_segment(data: DataSegment<Self>) -> Segment {
        Segment::Int64(data)
    }

    fn heap_size_of(values: &[Self]) -> usize {
        std::mem::size_of_val(values)
    }
}

impl SegmentValue for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }

    fn image_size(values: &[Self]) -> u64 {
        values.len() as u64 * 4
    }

    fn write_image(values: &[Self], buffer: &mut Vec<u8>) {
        for value in values {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>> {
        read_fixed_image(buffer, len, 4, |bytes| {
            f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        })
    }

    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>> {
        match segment {
            Segment::Float(data) => Some(data),
            _ => None,
        }
    }

    fn wrap_segment(data: DataSegment<Self>) -> Segment {
        Segment::Float(data)
    }

    fn heap_size_of(values: &[Self]) -> usize {
        std::mem::size_of_val(values)
    }
}

impl SegmentValue for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_double()
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }

    fn image_size(values: &[Self]) -> u64 {
        values.len() as u64 * 8
    }

    fn write_image(values: &[Self], buffer: &mut Vec<u8>) {
        for value in values {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>> {
        read_fixed_image(buffer, len, 8, |bytes| {
            let mut array = [0u8; 8];
            array.copy_from_slice(bytes);
            f64::from_le_bytes(array)
        })
    }

    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>> {
        match segment {
            Segment::Double(data) => Some(data),
            _ => None,
        }
    }

    fn wrap_segment(data: DataSegment<Self>) -> Segment {
        Segment::Double(data)
    }

    fn heap_size_of(values: &[Self]) -> usize {
        std::mem::size_of_val(values)
    }
}

impl SegmentValue for Arc<str> {
    const DATA_TYPE: DataType = DataType::Text;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_arc_str()
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn image_size(values: &[Self]) -> u64 {
        values
            .iter()
            .map(|value| 4 + value.len() as u64)
            .sum()
    }

    fn write_image(values: &[Self], buffer: &mut Vec<u8>) {
        for value in values {
            buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
            buffer.extend_from_slice(value.as_bytes());
        }
    }

    fn read_image(buffer: &[u8], len: usize) -> Result<Vec<Self>> {
        let mut values = Vec::with_capacity(len);
        let mut cursor = 0usize;
        for _ in 0..len {
            let Some(header) = buffer.get(cursor..cursor + 4) else {
                return Err(Error::InvalidSegment("truncated string image".to_string()));
            };
            let string_len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            cursor += 4;
            let Some(bytes) = buffer.get(cursor..cursor + string_len) else {
                return Err(Error::InvalidSegment("truncated string image".to_string()));
            };
            let text = std::str::from_utf8(bytes)
                .map_err(|_| Error::InvalidSegment("string image is not UTF-8".to_string()))?;
            values.push(Arc::from(text));
            cursor += string_len;
        }
        if cursor != buffer.len() {
            return Err(Error::InvalidSegment(
                "string image has trailing bytes".to_string(),
            ));
        }
        Ok(values)
    }

    fn extract_segment(segment: &Segment) -> Option<&DataSegment<Self>> {
        match segment {
            Segment::Text(data) => Some(data),
            _ => None,
        }
    }

    fn wrap_segment(data: DataSegment<Self>) -> Segment {
        Segment::Text(data)
    }

    fn heap_size_of(values: &[Self]) -> usize {
        std::mem::size_of_val(values) + values.iter().map(|value| value.len()).sum::<usize>()
    }
}

fn read_fixed_image<T>(
    buffer: &[u8],
    len: usize,
    width: usize,
    decode: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>> {
    if buffer.len() != len * width {
        return Err(Error::InvalidSegment(format!(
            "byte image of {} bytes does not hold {len} values of width {width}",
            buffer.len()
        )));
    }
    Ok(buffer.chunks_exact(width).map(decode).collect())
}

// =============================================================================
// Iteration contract
// =============================================================================

/// One decoded position of a segment
///
/// `value` is `T::default()` when `is_null` is set. Under point access,
/// `chunk_offset` echoes the requested position (or the null sentinel).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPosition<T> {
    pub value: T,
    pub is_null: bool,
    pub chunk_offset: ChunkOffset,
}

/// Random access into one decoded segment; backs point access and reference
/// resolution
pub trait SegmentRandomAccess<T: SegmentValue> {
    /// Number of rows
    fn segment_len(&self) -> usize;

    /// Decoded value and null flag at `offset`; `offset` must be in range
    fn at(&self, offset: ChunkOffset) -> (T, bool);
}

/// Point-access iterator shared by all segment encodings
///
/// Positions are validated once at construction; iteration is infallible.
/// Null-sentinel positions yield a null triple without touching the segment.
pub struct PointIter<'a, A, T> {
    access: A,
    positions: &'a [ChunkOffset],
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, A: SegmentRandomAccess<T>, T: SegmentValue> PointIter<'a, A, T> {
    pub(crate) fn new(access: A, positions: &'a [ChunkOffset]) -> Result<Self> {
        let len = access.segment_len();
        for &position in positions {
            if position != INVALID_CHUNK_OFFSET && position as usize >= len {
                return Err(Error::OutOfRange {
                    position,
                    size: len as u32,
                });
            }
        }
        Ok(Self {
            access,
            positions,
            index: 0,
            _marker: std::marker::PhantomData,
        })
    }
}

impl<A: SegmentRandomAccess<T>, T: SegmentValue> Iterator for PointIter<'_, A, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let &position = self.positions.get(self.index)?;
        self.index += 1;
        if position == INVALID_CHUNK_OFFSET {
            return Some(SegmentPosition {
                value: T::default(),
                is_null: true,
                chunk_offset: INVALID_CHUNK_OFFSET,
            });
        }
        let (value, is_null) = self.access.at(position);
        Some(SegmentPosition {
            value,
            is_null,
            chunk_offset: position,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.positions.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<A: SegmentRandomAccess<T>, T: SegmentValue> ExactSizeIterator for PointIter<'_, A, T> {}

// =============================================================================
// Typed segment dispatch
// =============================================================================

/// One column chunk under a concrete encoding, typed by its value type
#[derive(Debug, Clone)]
pub enum DataSegment<T: SegmentValue> {
    Value(ValueSegment<T>),
    Dictionary(DictionarySegment<T>),
    RunLength(RunLengthSegment<T>),
    FrameOfReference(FrameOfReferenceSegment<T>),
    Lz4(Lz4Segment<T>),
}

impl<T: SegmentValue> DataSegment<T> {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            DataSegment::Value(segment) => segment.len(),
            DataSegment::Dictionary(segment) => segment.len(),
            DataSegment::RunLength(segment) => segment.len(),
            DataSegment::FrameOfReference(segment) => segment.len(),
            DataSegment::Lz4(segment) => segment.len(),
        }
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The encoding tag of this segment
    pub fn encoding(&self) -> EncodingKind {
        match self {
            DataSegment::Value(_) => EncodingKind::Unencoded,
            DataSegment::Dictionary(_) => EncodingKind::Dictionary,
            DataSegment::RunLength(_) => EncodingKind::RunLength,
            DataSegment::FrameOfReference(_) => EncodingKind::FrameOfReference,
            DataSegment::Lz4(_) => EncodingKind::Lz4,
        }
    }

    /// Number of NULL rows
    pub fn null_count(&self) -> usize {
        match self {
            DataSegment::Value(segment) => segment.null_count(),
            DataSegment::Dictionary(segment) => segment.null_count(),
            DataSegment::RunLength(segment) => segment.null_count(),
            DataSegment::FrameOfReference(segment) => segment.null_count(),
            DataSegment::Lz4(segment) => segment.null_count(),
        }
    }

    /// Estimated heap bytes held by the segment
    pub fn heap_size(&self) -> usize {
        match self {
            DataSegment::Value(segment) => segment.heap_size(),
            DataSegment::Dictionary(segment) => segment.heap_size(),
            DataSegment::RunLength(segment) => segment.heap_size(),
            DataSegment::FrameOfReference(segment) => segment.heap_size(),
            DataSegment::Lz4(segment) => segment.heap_size(),
        }
    }

    /// Sequential iterator over every row in order
    ///
    /// LZ4 segments decompress once here; all other constructions are
    /// infallible.
    pub fn iter(&self) -> Result<DataSegmentIter<'_, T>> {
        Ok(match self {
            DataSegment::Value(segment) => DataSegmentIter::Value(segment.iter()),
            DataSegment::Dictionary(segment) => DataSegmentIter::Dictionary(segment.iter()),
            DataSegment::RunLength(segment) => DataSegmentIter::RunLength(segment.iter()),
            DataSegment::FrameOfReference(segment) => {
                DataSegmentIter::FrameOfReference(segment.iter())
            }
            DataSegment::Lz4(segment) => DataSegmentIter::Lz4(segment.iter()?),
        })
    }

    /// Point-access iterator over the given positions, in list order
    pub fn point_iter<'a>(
        &'a self,
        positions: &'a [ChunkOffset],
    ) -> Result<DataPointIter<'a, T>> {
        Ok(match self {
            DataSegment::Value(segment) => {
                DataPointIter::Value(PointIter::new(segment, positions)?)
            }
            DataSegment::Dictionary(segment) => {
                DataPointIter::Dictionary(PointIter::new(segment, positions)?)
            }
            DataSegment::RunLength(segment) => {
                DataPointIter::RunLength(PointIter::new(segment, positions)?)
            }
            DataSegment::FrameOfReference(segment) => {
                DataPointIter::FrameOfReference(PointIter::new(segment, positions)?)
            }
            DataSegment::Lz4(segment) => {
                DataPointIter::Lz4(PointIter::new(segment.decompress()?, positions)?)
            }
        })
    }
}

/// Sequential iterator over a typed segment, dispatched once at construction
pub enum DataSegmentIter<'a, T: SegmentValue> {
    Value(ValueSegmentIter<'a, T>),
    Dictionary(DictionarySegmentIter<'a, T>),
    RunLength(RunLengthSegmentIter<'a, T>),
    FrameOfReference(FrameOfReferenceSegmentIter<'a, T>),
    Lz4(Lz4SegmentIter<'a, T>),
}

impl<T: SegmentValue> Iterator for DataSegmentIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            DataSegmentIter::Value(iter) => iter.next(),
            DataSegmentIter::Dictionary(iter) => iter.next(),
            DataSegmentIter::RunLength(iter) => iter.next(),
            DataSegmentIter::FrameOfReference(iter) => iter.next(),
            DataSegmentIter::Lz4(iter) => iter.next(),
        }
    }
}

/// Point-access iterator over a typed segment
pub enum DataPointIter<'a, T: SegmentValue> {
    Value(PointIter<'a, &'a ValueSegment<T>, T>),
    Dictionary(PointIter<'a, &'a DictionarySegment<T>, T>),
    RunLength(PointIter<'a, &'a RunLengthSegment<T>, T>),
    FrameOfReference(PointIter<'a, &'a FrameOfReferenceSegment<T>, T>),
    Lz4(PointIter<'a, Lz4Decompressed<T>, T>),
}

impl<T: SegmentValue> Iterator for DataPointIter<'_, T> {
    type Item = SegmentPosition<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            DataPointIter::Value(iter) => iter.next(),
            DataPointIter::Dictionary(iter) => iter.next(),
            DataPointIter::RunLength(iter) => iter.next(),
            DataPointIter::FrameOfReference(iter) => iter.next(),
            DataPointIter::Lz4(iter) => iter.next(),
        }
    }
}

/// Expand a monomorphic body once per segment encoding
///
/// `$body` sees `$iter` as the encoding's concrete sequential iterator, so
/// the loop inside is specialized per (encoding, type) pair. The LZ4 arm
/// propagates its decompression error with `?`.
macro_rules! with_data_segment_iter {
    ($data:expr, |$iter:ident| $body:expr) => {
        match $data {
            $crate::storage::segment::DataSegment::Value(segment) => {
                let $iter = segment.iter();
                $body
            }
            $crate::storage::segment::DataSegment::Dictionary(segment) => {
                let $iter = segment.iter();
                $body
            }
            $crate::storage::segment::DataSegment::RunLength(segment) => {
                let $iter = segment.iter();
                $body
            }
            $crate::storage::segment::DataSegment::FrameOfReference(segment) => {
                let $iter = segment.iter();
                $body
            }
            $crate::storage::segment::DataSegment::Lz4(segment) => {
                let $iter = segment.iter()?;
                $body
            }
        }
    };
}
pub(crate) use with_data_segment_iter;

// =============================================================================
// Untyped segment handle
// =============================================================================

/// One column's data within one chunk; the type dispatch lives here
#[derive(Debug, Clone)]
pub enum Segment {
    Int32(DataSegment<i32>),
    Int64(DataSegment<i64>),
    Float(DataSegment<f32>),
    Double(DataSegment<f64>),
    Text(DataSegment<Arc<str>>),
    Reference(ReferenceSegment),
}

impl Segment {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Segment::Int32(data) => data.len(),
            Segment::Int64(data) => data.len(),
            Segment::Float(data) => data.len(),
            Segment::Double(data) => data.len(),
            Segment::Text(data) => data.len(),
            Segment::Reference(reference) => reference.len(),
        }
    }

    /// Returns true if the segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The logical data type of the stored column
    pub fn data_type(&self) -> DataType {
        match self {
            Segment::Int32(_) => DataType::Int32,
            Segment::Int64(_) => DataType::Int64,
            Segment::Float(_) => DataType::Float,
            Segment::Double(_) => DataType::Double,
            Segment::Text(_) => DataType::Text,
            Segment::Reference(reference) => reference.data_type(),
        }
    }

    /// The encoding tag; reference segments carry none
    pub fn encoding(&self) -> Option<EncodingKind> {
        match self {
            Segment::Int32(data) => Some(data.encoding()),
            Segment::Int64(data) => Some(data.encoding()),
            Segment::Float(data) => Some(data.encoding()),
            Segment::Double(data) => Some(data.encoding()),
            Segment::Text(data) => Some(data.encoding()),
            Segment::Reference(_) => None,
        }
    }

    /// Estimated heap bytes held by the segment
    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Segment::Int32(data) => data.heap_size(),
            Segment::Int64(data) => data.heap_size(),
            Segment::Float(data) => data.heap_size(),
            Segment::Double(data) => data.heap_size(),
            Segment::Text(data) => data.heap_size(),
            Segment::Reference(reference) => reference.heap_size(),
        }
    }

    /// Returns true for reference segments
    pub fn is_reference(&self) -> bool {
        matches!(self, Segment::Reference(_))
    }
}

// =============================================================================
// Typed random access through an untyped handle
// =============================================================================

/// Random access into one column of one chunk, resolved once per chunk
///
/// Reference-segment iteration builds one of these per referenced chunk. An
/// LZ4 target is decompressed here, once, and served from the buffer.
pub struct ChunkColumnAccessor<T: SegmentValue> {
    segment: Arc<Segment>,
    lz4: Option<Lz4Decompressed<T>>,
}

impl<T: SegmentValue> ChunkColumnAccessor<T> {
    /// Resolve an accessor for `segment`
    ///
    /// Fails with `TypeMismatch` when the segment stores another type and
    /// with `InvalidSegment` when the target is itself a reference segment.
    pub fn new(segment: Arc<Segment>) -> Result<Self> {
        if segment.is_reference() {
            return Err(Error::InvalidSegment(
                "reference segments must resolve to data segments".to_string(),
            ));
        }
        let lz4 = match T::extract_segment(&segment) {
            Some(DataSegment::Lz4(lz4_segment)) => Some(lz4_segment.decompress()?),
            Some(_) => None,
            None => {
                return Err(Error::TypeMismatch {
                    expected: T::DATA_TYPE,
                    got: segment.data_type(),
                })
            }
        };
        Ok(Self { segment, lz4 })
    }

    /// Number of rows in the underlying segment
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns true if the underlying segment holds no rows
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Decoded value and null flag at `offset`
    pub fn at(&self, offset: ChunkOffset) -> (T, bool) {
        if let Some(decompressed) = &self.lz4 {
            return decompressed.at(offset);
        }
        // The constructor established the type and ruled out LZ4/reference.
        match T::extract_segment(&self.segment) {
            Some(DataSegment::Value(segment)) => segment.at(offset),
            Some(DataSegment::Dictionary(segment)) => segment.at(offset),
            Some(DataSegment::RunLength(segment)) => segment.at(offset),
            Some(DataSegment::FrameOfReference(segment)) => segment.at(offset),
            Some(DataSegment::Lz4(_)) | None => (T::default(), true),
        }
    }
}
