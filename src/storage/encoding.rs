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

//! Encoder registry
//!
//! Encoders turn value segments into encoded segments; encoded segments are
//! read-only afterwards. Unsupported (encoding, data type) pairs fail with
//! `UnsupportedEncoding`. Chunk encoding checks the cancellation token
//! between columns; block-oriented encoders also check between blocks.

use std::sync::Arc;

use crate::common::{check_cancelled, CancellationToken};
use crate::core::{EncodingKind, Error, Result, VectorCompression};

use super::chunk::Chunk;
use super::segment::{
    DataSegment, DictionarySegment, FrameOfReferenceSegment, Lz4Segment, RunLengthSegment,
    Segment, SegmentValue,
};

/// Requested encoding for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEncodingSpec {
    pub encoding: EncodingKind,
    pub vector_compression: VectorCompression,
}

impl SegmentEncodingSpec {
    /// Spec with the default vector compression
    pub fn new(encoding: EncodingKind) -> Self {
        Self {
            encoding,
            vector_compression: VectorCompression::default(),
        }
    }

    /// Spec with an explicit vector compression
    pub fn with_compression(encoding: EncodingKind, vector_compression: VectorCompression) -> Self {
        Self {
            encoding,
            vector_compression,
        }
    }
}

impl Default for SegmentEncodingSpec {
    fn default() -> Self {
        Self::new(EncodingKind::default())
    }
}

/// Requested per-column encodings for one chunk
pub type ChunkEncodingSpec = Vec<SegmentEncodingSpec>;

/// Encode one value segment under the requested spec
///
/// The source must be an unencoded (value) segment; encoded segments are
/// immutable and never re-encoded.
pub fn encode_segment(
    spec: SegmentEncodingSpec,
    segment: &Segment,
    cancellation: Option<&CancellationToken>,
) -> Result<Segment> {
    match segment {
        Segment::Int32(data) => Ok(Segment::Int32(encode_data(spec, data, cancellation)?)),
        Segment::Int64(data) => Ok(Segment::Int64(encode_data(spec, data, cancellation)?)),
        Segment::Float(data) => Ok(Segment::Float(encode_data(spec, data, cancellation)?)),
        Segment::Double(data) => Ok(Segment::Double(encode_data(spec, data, cancellation)?)),
        Segment::Text(data) => Ok(Segment::Text(encode_data(spec, data, cancellation)?)),
        Segment::Reference(_) => Err(Error::InvalidSegment(
            "reference segments are never re-encoded".to_string(),
        )),
    }
}

fn encode_data<T: SegmentValue>(
    spec: SegmentEncodingSpec,
    data: &DataSegment<T>,
    cancellation: Option<&CancellationToken>,
) -> Result<DataSegment<T>> {
    let DataSegment::Value(source) = data else {
        return Err(Error::InvalidSegment(
            "encoders start from value segments".to_string(),
        ));
    };
    match spec.encoding {
        EncodingKind::Unencoded => Ok(DataSegment::Value(source.clone())),
        EncodingKind::Dictionary => Ok(DataSegment::Dictionary(DictionarySegment::encode(
            source,
            spec.vector_compression,
        ))),
        EncodingKind::RunLength => Ok(DataSegment::RunLength(RunLengthSegment::encode(source))),
        EncodingKind::FrameOfReference => {
            if !T::DATA_TYPE.is_integral() {
                return Err(Error::UnsupportedEncoding {
                    encoding: EncodingKind::FrameOfReference,
                    data_type: T::DATA_TYPE,
                });
            }
            Ok(DataSegment::FrameOfReference(FrameOfReferenceSegment::encode(
                source,
                cancellation,
            )?))
        }
        EncodingKind::Lz4 => Ok(DataSegment::Lz4(Lz4Segment::encode(source, cancellation)?)),
    }
}

/// Encode every column of a chunk under its per-column spec
///
/// The returned chunk carries no statistics; callers regenerate them.
pub fn encode_chunk(
    chunk: &Chunk,
    specs: &ChunkEncodingSpec,
    cancellation: Option<&CancellationToken>,
) -> Result<Chunk> {
    if specs.len() != chunk.column_count() {
        return Err(Error::ChunkColumnsMismatch {
            expected: chunk.column_count(),
            got: specs.len(),
        });
    }
    let mut segments = Vec::with_capacity(chunk.column_count());
    for (segment, &spec) in chunk.segments().iter().zip(specs) {
        check_cancelled(cancellation)?;
        segments.push(Arc::new(encode_segment(spec, segment, cancellation)?));
    }
    Chunk::new(segments)
}
