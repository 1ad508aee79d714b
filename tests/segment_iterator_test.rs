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

//! Integration tests for the segment iteration contract
//!
//! Sequential iteration visits every offset in order; point access echoes
//! the requested positions; reference segments resolve rows through their
//! table and never dereference the null row id.

use std::sync::Arc;

use stratadb::storage::segment::DataSegment;
use stratadb::{
    encode_segment, ColumnDefinition, DataType, EncodingKind, Error, ReferenceSegment, RowId,
    Schema, Segment, SegmentEncodingSpec, Table, Value, ValueSegment, INVALID_CHUNK_OFFSET,
    NULL_ROW_ID,
};

fn all_encodings_of(source: ValueSegment<i32>) -> Vec<DataSegment<i32>> {
    let segment = Segment::Int32(DataSegment::Value(source));
    [
        EncodingKind::Unencoded,
        EncodingKind::Dictionary,
        EncodingKind::RunLength,
        EncodingKind::FrameOfReference,
        EncodingKind::Lz4,
    ]
    .into_iter()
    .map(|encoding| {
        let Segment::Int32(data) =
            encode_segment(SegmentEncodingSpec::new(encoding), &segment, None).unwrap()
        else {
            panic!("segment changed type");
        };
        data
    })
    .collect()
}

#[test]
fn sequential_iteration_yields_offsets_in_order() {
    let source = ValueSegment::from_options(vec![Some(4i32), None, Some(4), Some(9), None]);
    for data in all_encodings_of(source) {
        let positions: Vec<_> = data.iter().unwrap().collect();
        assert_eq!(positions.len(), 5, "{} missed rows", data.encoding());
        for (index, position) in positions.iter().enumerate() {
            assert_eq!(position.chunk_offset, index as u32);
        }
        assert!(positions[1].is_null && positions[4].is_null);
    }
}

#[test]
fn point_access_echoes_the_position_list() {
    let source = ValueSegment::from_options(vec![Some(10i32), Some(20), None, Some(40)]);
    let requested = [3u32, 0, INVALID_CHUNK_OFFSET, 0, 2];

    for data in all_encodings_of(source) {
        let positions: Vec<_> = data.point_iter(&requested).unwrap().collect();
        assert_eq!(positions.len(), requested.len());
        for (position, &offset) in positions.iter().zip(&requested) {
            assert_eq!(position.chunk_offset, offset, "{}", data.encoding());
        }
        assert_eq!(positions[0].value, 40);
        assert_eq!(positions[1].value, 10);
        assert!(positions[2].is_null);
        assert!(positions[4].is_null);
    }
}

#[test]
fn point_access_rejects_out_of_range_positions() {
    let source = ValueSegment::from_values(vec![1i32, 2, 3]);
    for data in all_encodings_of(source) {
        let err = data.point_iter(&[1, 3]).err();
        assert_eq!(err, Some(Error::OutOfRange { position: 3, size: 3 }));
    }
}

#[test]
fn reference_segments_preserve_nulls_without_dereferencing() {
    let schema = Arc::new(
        Schema::new(vec![ColumnDefinition::nullable("v", DataType::Text)]).unwrap(),
    );
    let table = Arc::new(Table::new(schema));
    table
        .append_rows(&[
            vec![Value::text("a")],
            vec![Value::Null],
            vec![Value::text("b")],
        ])
        .unwrap();

    let pos_list = Arc::new(vec![RowId::new(0, 2), NULL_ROW_ID, RowId::new(0, 0)]);
    let reference = ReferenceSegment::new(Arc::clone(&table), 0, pos_list).unwrap();

    let positions: Vec<_> = reference.iter::<Arc<str>>().unwrap().collect();
    assert_eq!(positions.len(), 3);

    assert_eq!(positions[0].value.as_ref(), "b");
    assert!(!positions[0].is_null);
    assert_eq!(positions[0].chunk_offset, 2);

    assert!(positions[1].is_null);
    assert_eq!(positions[1].chunk_offset, INVALID_CHUNK_OFFSET);

    assert_eq!(positions[2].value.as_ref(), "a");
    assert!(!positions[2].is_null);
    assert_eq!(positions[2].chunk_offset, 0);
}

#[test]
fn reference_segments_resolve_across_chunks_and_encodings() {
    let schema = Arc::new(Schema::new(vec![ColumnDefinition::new("v", DataType::Int32)]).unwrap());
    let table = Arc::new(Table::new(schema));
    table
        .append_rows(&[vec![Value::Int32(1)], vec![Value::Int32(2)]])
        .unwrap();
    table
        .append_rows(&[vec![Value::Int32(3)], vec![Value::Int32(4)]])
        .unwrap();
    // Mixed physical encodings behind the same logical rows.
    table
        .encode_chunk(1, &vec![SegmentEncodingSpec::new(EncodingKind::Lz4)], None)
        .unwrap();

    let pos_list = Arc::new(vec![
        RowId::new(1, 1),
        RowId::new(0, 0),
        RowId::new(1, 0),
    ]);
    let reference = ReferenceSegment::new(Arc::clone(&table), 0, pos_list).unwrap();
    let values: Vec<i32> = reference
        .iter::<i32>()
        .unwrap()
        .map(|position| position.value)
        .collect();
    assert_eq!(values, vec![4, 1, 3]);
}

#[test]
fn reference_segments_validate_their_position_lists() {
    let schema = Arc::new(Schema::new(vec![ColumnDefinition::new("v", DataType::Int32)]).unwrap());
    let table = Arc::new(Table::new(schema));
    table.append_rows(&[vec![Value::Int32(1)]]).unwrap();

    let bad_offset = Arc::new(vec![RowId::new(0, 5)]);
    assert!(ReferenceSegment::new(Arc::clone(&table), 0, bad_offset).is_err());

    let bad_chunk = Arc::new(vec![RowId::new(7, 0)]);
    assert!(ReferenceSegment::new(Arc::clone(&table), 0, bad_chunk).is_err());

    let typed = ReferenceSegment::new(Arc::clone(&table), 0, Arc::new(vec![RowId::new(0, 0)]))
        .unwrap();
    assert!(matches!(
        typed.iter::<i64>().unwrap_err(),
        Error::TypeMismatch { .. }
    ));
}
