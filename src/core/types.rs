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

//! Core type definitions for StrataDB
//!
//! This module defines the fundamental types: DataType, PredicateCondition,
//! the row/chunk addressing types, and the encoding tags.

use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Logical data types supported by StrataDB
///
/// The set is closed: every column declares exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataType {
    /// NULL data type, used for unknown/unspecified types
    #[default]
    Null = 0,

    /// 32-bit signed integer
    Int32 = 1,

    /// 64-bit signed integer
    Int64 = 2,

    /// 32-bit floating point number
    Float = 3,

    /// 64-bit floating point number
    Double = 4,

    /// UTF-8 text string
    Text = 5,
}

impl DataType {
    /// Returns true if this type is numeric (integral or floating point)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int32 | DataType::Int64 | DataType::Float | DataType::Double
        )
    }

    /// Returns true if this type is integral (INT32 or INT64)
    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64)
    }

    /// Returns true if this type is a floating point type
    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Returns the type ID as u8 for serialization
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Create DataType from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::Null),
            1 => Some(DataType::Int32),
            2 => Some(DataType::Int64),
            3 => Some(DataType::Float),
            4 => Some(DataType::Double),
            5 => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Int32 => write!(f, "INT32"),
            DataType::Int64 => write!(f, "INT64"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NULL" => Ok(DataType::Null),
            "INT" | "INT32" | "INTEGER" | "SMALLINT" => Ok(DataType::Int32),
            "INT64" | "BIGINT" | "LONG" => Ok(DataType::Int64),
            "FLOAT" | "REAL" => Ok(DataType::Float),
            "DOUBLE" | "DOUBLE PRECISION" => Ok(DataType::Double),
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" => Ok(DataType::Text),
            other => Err(Error::InvalidArgument(format!("unknown data type '{other}'"))),
        }
    }
}

/// Predicate conditions for scans, statistics and pruning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PredicateCondition {
    /// Equality (=)
    Equals = 0,

    /// Inequality (!=)
    NotEquals = 1,

    /// Less than (<)
    LessThan = 2,

    /// Less than or equal (<=)
    LessThanEquals = 3,

    /// Greater than (>)
    GreaterThan = 4,

    /// Greater than or equal (>=)
    GreaterThanEquals = 5,

    /// Inclusive range (BETWEEN lo AND hi)
    Between = 6,

    /// Pattern matching (LIKE)
    Like = 7,

    /// Negated pattern matching (NOT LIKE)
    NotLike = 8,

    /// IS NULL check
    IsNull = 9,

    /// IS NOT NULL check
    IsNotNull = 10,
}

impl PredicateCondition {
    /// Returns true for conditions taking no comparison value
    pub fn is_unary(&self) -> bool {
        matches!(self, PredicateCondition::IsNull | PredicateCondition::IsNotNull)
    }

    /// Returns true for conditions taking exactly one comparison value
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            PredicateCondition::Equals
                | PredicateCondition::NotEquals
                | PredicateCondition::LessThan
                | PredicateCondition::LessThanEquals
                | PredicateCondition::GreaterThan
                | PredicateCondition::GreaterThanEquals
                | PredicateCondition::Like
                | PredicateCondition::NotLike
        )
    }

    /// Returns true for conditions taking two comparison values
    pub fn is_ternary(&self) -> bool {
        matches!(self, PredicateCondition::Between)
    }

    /// Returns true for conditions defined by the value ordering alone
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            PredicateCondition::Equals
                | PredicateCondition::NotEquals
                | PredicateCondition::LessThan
                | PredicateCondition::LessThanEquals
                | PredicateCondition::GreaterThan
                | PredicateCondition::GreaterThanEquals
        )
    }

    /// The condition matching exactly the rows this one rejects
    ///
    /// `Between` has no single-condition inverse and returns `None`.
    pub fn inverse(&self) -> Option<PredicateCondition> {
        match self {
            PredicateCondition::Equals => Some(PredicateCondition::NotEquals),
            PredicateCondition::NotEquals => Some(PredicateCondition::Equals),
            PredicateCondition::LessThan => Some(PredicateCondition::GreaterThanEquals),
            PredicateCondition::LessThanEquals => Some(PredicateCondition::GreaterThan),
            PredicateCondition::GreaterThan => Some(PredicateCondition::LessThanEquals),
            PredicateCondition::GreaterThanEquals => Some(PredicateCondition::LessThan),
            PredicateCondition::Like => Some(PredicateCondition::NotLike),
            PredicateCondition::NotLike => Some(PredicateCondition::Like),
            PredicateCondition::IsNull => Some(PredicateCondition::IsNotNull),
            PredicateCondition::IsNotNull => Some(PredicateCondition::IsNull),
            PredicateCondition::Between => None,
        }
    }

    /// The condition equivalent to this one with both operands swapped
    ///
    /// `a < b` flips to `b > a`; symmetric conditions flip to themselves.
    /// Conditions that cannot appear with swapped operands return `None`.
    pub fn flip(&self) -> Option<PredicateCondition> {
        match self {
            PredicateCondition::Equals => Some(PredicateCondition::Equals),
            PredicateCondition::NotEquals => Some(PredicateCondition::NotEquals),
            PredicateCondition::LessThan => Some(PredicateCondition::GreaterThan),
            PredicateCondition::LessThanEquals => Some(PredicateCondition::GreaterThanEquals),
            PredicateCondition::GreaterThan => Some(PredicateCondition::LessThan),
            PredicateCondition::GreaterThanEquals => Some(PredicateCondition::LessThanEquals),
            _ => None,
        }
    }
}

impl fmt::Display for PredicateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateCondition::Equals => write!(f, "="),
            PredicateCondition::NotEquals => write!(f, "!="),
            PredicateCondition::LessThan => write!(f, "<"),
            PredicateCondition::LessThanEquals => write!(f, "<="),
            PredicateCondition::GreaterThan => write!(f, ">"),
            PredicateCondition::GreaterThanEquals => write!(f, ">="),
            PredicateCondition::Between => write!(f, "BETWEEN"),
            PredicateCondition::Like => write!(f, "LIKE"),
            PredicateCondition::NotLike => write!(f, "NOT LIKE"),
            PredicateCondition::IsNull => write!(f, "IS NULL"),
            PredicateCondition::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Segment encodings supported by the encoder registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EncodingKind {
    /// Plain value vector plus null bitmap
    Unencoded = 0,

    /// Sorted unique dictionary plus compressed index vector
    #[default]
    Dictionary = 1,

    /// Parallel (value, null flag, end position) run arrays
    RunLength = 2,

    /// Per-block reference value plus bit-packed deltas (integers only)
    FrameOfReference = 3,

    /// Whole-segment LZ4 frame plus uncompressed null bitmap
    Lz4 = 4,
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingKind::Unencoded => write!(f, "Unencoded"),
            EncodingKind::Dictionary => write!(f, "Dictionary"),
            EncodingKind::RunLength => write!(f, "RunLength"),
            EncodingKind::FrameOfReference => write!(f, "FrameOfReference"),
            EncodingKind::Lz4 => write!(f, "LZ4"),
        }
    }
}

/// Layout families for compressed unsigned integer vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum VectorCompression {
    /// Fixed 8/16/32-bit lanes chosen by the maximum value
    #[default]
    FixedWidth = 0,

    /// Exactly ceil(log2(max + 1)) bits per code
    BitPacked = 1,
}

// =============================================================================
// Row and chunk addressing
// =============================================================================

/// Index of a chunk within a table
pub type ChunkId = u32;

/// Index of a column within a schema; position is identity
pub type ColumnId = u16;

/// Index of a row within a chunk
pub type ChunkOffset = u32;

/// Sentinel chunk id used by the null row id
pub const INVALID_CHUNK_ID: ChunkId = ChunkId::MAX;

/// Sentinel chunk offset used by null entries in position lists
pub const INVALID_CHUNK_OFFSET: ChunkOffset = ChunkOffset::MAX;

/// Address of one row: a chunk and an offset within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

/// Designated null entry for position lists; never dereferenced
pub const NULL_ROW_ID: RowId = RowId {
    chunk_id: INVALID_CHUNK_ID,
    chunk_offset: INVALID_CHUNK_OFFSET,
};

impl RowId {
    /// Create a new row id
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self { chunk_id, chunk_offset }
    }

    /// Returns true if this is the designated null row id
    pub fn is_null(&self) -> bool {
        *self == NULL_ROW_ID
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "RowId(NULL)")
        } else {
            write!(f, "RowId({}, {})", self.chunk_id, self.chunk_offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_an_involution() {
        let conditions = [
            PredicateCondition::Equals,
            PredicateCondition::NotEquals,
            PredicateCondition::LessThan,
            PredicateCondition::LessThanEquals,
            PredicateCondition::GreaterThan,
            PredicateCondition::GreaterThanEquals,
            PredicateCondition::Like,
            PredicateCondition::NotLike,
            PredicateCondition::IsNull,
            PredicateCondition::IsNotNull,
        ];
        for condition in conditions {
            let inverse = condition.inverse().unwrap();
            assert_eq!(inverse.inverse(), Some(condition));
        }
        assert_eq!(PredicateCondition::Between.inverse(), None);
    }

    #[test]
    fn flip_is_an_involution() {
        let flippable = [
            PredicateCondition::Equals,
            PredicateCondition::NotEquals,
            PredicateCondition::LessThan,
            PredicateCondition::LessThanEquals,
            PredicateCondition::GreaterThan,
            PredicateCondition::GreaterThanEquals,
        ];
        for condition in flippable {
            let flipped = condition.flip().unwrap();
            assert_eq!(flipped.flip(), Some(condition));
        }
        assert_eq!(PredicateCondition::Like.flip(), None);
        assert_eq!(PredicateCondition::Between.flip(), None);
    }

    #[test]
    fn condition_arity() {
        assert!(PredicateCondition::IsNull.is_unary());
        assert!(PredicateCondition::Equals.is_binary());
        assert!(PredicateCondition::Like.is_binary());
        assert!(PredicateCondition::Between.is_ternary());
        assert!(!PredicateCondition::Between.is_binary());
        assert!(!PredicateCondition::Like.is_ordering());
    }

    #[test]
    fn null_row_id_sentinel() {
        assert!(NULL_ROW_ID.is_null());
        assert!(!RowId::new(0, 0).is_null());
        assert_eq!(format!("{NULL_ROW_ID}"), "RowId(NULL)");
    }

    #[test]
    fn data_type_u8_roundtrip() {
        for byte in 0..=5u8 {
            let data_type = DataType::from_u8(byte).unwrap();
            assert_eq!(data_type.as_u8(), byte);
        }
        assert_eq!(DataType::from_u8(6), None);
    }
}
