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

//! Storage layer for StrataDB
//!
//! This module contains the columnar storage components:
//! - Compressed integer vectors backing the dictionary and
//!   frame-of-reference encodings
//! - The segment family (value, dictionary, run-length, frame-of-reference,
//!   LZ4 and reference segments) with its iteration contract
//! - The encoder registry
//! - Chunks, tables and the name -> table catalog

pub mod chunk;
pub mod compressed_vector;
pub mod encoding;
pub mod segment;
pub mod storage_manager;
pub mod table;

pub use chunk::{Chunk, ChunkBuilder};
pub use compressed_vector::{bits_needed, BitPackedVector, CompressedVector};
pub use encoding::{encode_chunk, encode_segment, ChunkEncodingSpec, SegmentEncodingSpec};
pub use segment::{
    ChunkColumnAccessor, DataSegment, DictionarySegment, ForBlock, FrameOfReferenceSegment,
    Lz4Decompressed, Lz4Segment, PosList, ReferenceSegment, RunLengthSegment, Segment,
    SegmentPosition, SegmentValue, ValueSegment, FOR_BLOCK_SIZE, MAX_LZ4_INPUT_BYTES,
};
pub use storage_manager::StorageManager;
pub use table::Table;
