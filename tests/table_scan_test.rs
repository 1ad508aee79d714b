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

//! Integration tests for table scans over heterogeneous encodings
//!
//! Scans must yield the same rows no matter how chunks are physically
//! encoded, produce composable reference-segment output, and honor
//! cancellation and type checks at construction.

use std::sync::Arc;

use stratadb::{
    CancellationToken, ColumnDefinition, DataType, EncodingKind, Error, PredicateCondition,
    Schema, Segment, SegmentEncodingSpec, Table, TableScan, Value,
};

/// id INT32 + label TEXT over four chunks, each under another encoding
fn mixed_encoding_table() -> Arc<Table> {
    let table = Table::new(Arc::new(
        Schema::new(vec![
            ColumnDefinition::new("id", DataType::Int32),
            ColumnDefinition::nullable("label", DataType::Text),
        ])
        .unwrap(),
    ));
    let labels = ["red", "green", "blue", "red", "cyan"];
    for chunk in 0..4i32 {
        let rows: Vec<Vec<Value>> = (0..5)
            .map(|row| {
                let id = chunk * 5 + row;
                let label = if row == 3 {
                    Value::Null
                } else {
                    Value::text(labels[(id % 5) as usize])
                };
                vec![Value::Int32(id), label]
            })
            .collect();
        table.append_rows(&rows).unwrap();
    }

    let encode = |encoding: EncodingKind| {
        vec![
            SegmentEncodingSpec::new(encoding),
            SegmentEncodingSpec::new(match encoding {
                // Frame-of-reference cannot hold text.
                EncodingKind::FrameOfReference => EncodingKind::Dictionary,
                other => other,
            }),
        ]
    };
    table.encode_chunk(1, &encode(EncodingKind::Dictionary), None).unwrap();
    table.encode_chunk(2, &encode(EncodingKind::FrameOfReference), None).unwrap();
    table.encode_chunk(3, &encode(EncodingKind::Lz4), None).unwrap();
    Arc::new(table)
}

fn collect_column_i32(result: &Table, column: u16) -> Vec<i32> {
    let mut rows = Vec::new();
    for chunk in result.chunks().iter() {
        let Segment::Reference(reference) = chunk.segment(column).unwrap().as_ref() else {
            panic!("scan output must be reference segments");
        };
        rows.extend(reference.iter::<i32>().unwrap().map(|position| position.value));
    }
    rows
}

#[test]
fn scans_see_through_every_encoding() {
    let table = mixed_encoding_table();
    let result = TableScan::new(
        Arc::clone(&table),
        0,
        PredicateCondition::GreaterThanEquals,
        Value::Int32(8),
    )
    .execute()
    .unwrap();

    assert_eq!(collect_column_i32(&result, 0), (8..20).collect::<Vec<i32>>());
}

#[test]
fn scan_output_is_a_reference_table_over_the_base() {
    let table = mixed_encoding_table();
    let result = TableScan::new(
        Arc::clone(&table),
        1,
        PredicateCondition::Equals,
        Value::text("red"),
    )
    .execute()
    .unwrap();

    // Both columns of each output chunk share one position list.
    for chunk in result.chunks().iter() {
        let Segment::Reference(id_reference) = chunk.segment(0).unwrap().as_ref() else {
            panic!("expected reference segments");
        };
        let Segment::Reference(label_reference) = chunk.segment(1).unwrap().as_ref() else {
            panic!("expected reference segments");
        };
        assert!(Arc::ptr_eq(id_reference.pos_list(), label_reference.pos_list()));
        assert!(Arc::ptr_eq(id_reference.referenced_table(), &table));
    }

    // "red" sits at id % 5 in {0, 3}, but the row at 3 is nulled.
    let ids = collect_column_i32(&result, 0);
    let expected: Vec<i32> = (0..20).filter(|id| id % 5 == 0).collect();
    assert_eq!(ids, expected);
}

#[test]
fn scanning_a_scan_result_references_the_base_table() {
    let table = mixed_encoding_table();
    let first = Arc::new(
        TableScan::new(
            Arc::clone(&table),
            0,
            PredicateCondition::GreaterThanEquals,
            Value::Int32(5),
        )
        .execute()
        .unwrap(),
    );

    let second = TableScan::new(
        Arc::clone(&first),
        0,
        PredicateCondition::LessThan,
        Value::Int32(12),
    )
    .execute()
    .unwrap();

    assert_eq!(collect_column_i32(&second, 0), (5..12).collect::<Vec<i32>>());
    // The composed output references the base table, not the first result.
    for chunk in second.chunks().iter() {
        let Segment::Reference(reference) = chunk.segment(0).unwrap().as_ref() else {
            panic!("expected reference segments");
        };
        assert!(Arc::ptr_eq(reference.referenced_table(), &table));
    }
}

#[test]
fn null_checks_scan_only_the_null_flags() {
    let table = mixed_encoding_table();
    let nulls = TableScan::new(
        Arc::clone(&table),
        1,
        PredicateCondition::IsNull,
        Value::Null,
    )
    .execute()
    .unwrap();
    // One nulled label per chunk.
    assert_eq!(collect_column_i32(&nulls, 0), vec![3, 8, 13, 18]);

    let non_nulls = TableScan::new(
        Arc::clone(&table),
        1,
        PredicateCondition::IsNotNull,
        Value::Null,
    )
    .execute()
    .unwrap();
    assert_eq!(non_nulls.row_count(), 16);
}

#[test]
fn like_scans_match_patterns() {
    let table = mixed_encoding_table();
    let result = TableScan::new(
        Arc::clone(&table),
        1,
        PredicateCondition::Like,
        Value::text("%e%"),
    )
    .execute()
    .unwrap();
    // "red", "green" and "blue" contain an 'e'; nulls never match LIKE.
    let ids = collect_column_i32(&result, 0);
    let expected: Vec<i32> = (0..20).filter(|id| matches!(id % 5, 0 | 1 | 2)).collect();
    assert_eq!(ids, expected);

    let negated = TableScan::new(
        Arc::clone(&table),
        1,
        PredicateCondition::NotLike,
        Value::text("%e%"),
    )
    .execute()
    .unwrap();
    assert_eq!(negated.row_count(), 16 - result.row_count());
}

#[test]
fn between_scans_are_inclusive() {
    let table = mixed_encoding_table();
    let result = TableScan::new(
        Arc::clone(&table),
        0,
        PredicateCondition::Between,
        Value::Int32(4),
    )
    .with_value2(Value::Int32(7))
    .execute()
    .unwrap();
    assert_eq!(collect_column_i32(&result, 0), vec![4, 5, 6, 7]);
}

#[test]
fn type_mismatches_fail_at_construction() {
    let table = mixed_encoding_table();
    let err = TableScan::new(
        Arc::clone(&table),
        0,
        PredicateCondition::Equals,
        Value::Int64(3),
    )
    .execute()
    .unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            expected: DataType::Int32,
            got: DataType::Int64,
        }
    );

    let like_on_int = TableScan::new(
        Arc::clone(&table),
        0,
        PredicateCondition::Like,
        Value::text("%"),
    )
    .execute()
    .unwrap_err();
    assert!(matches!(like_on_int, Error::TypeMismatch { .. }));
}

#[test]
fn cancelled_scans_abort() {
    let table = mixed_encoding_table();
    let token = CancellationToken::new();
    token.cancel();
    let err = TableScan::new(
        Arc::clone(&table),
        0,
        PredicateCondition::GreaterThan,
        Value::Int32(0),
    )
    .with_cancellation(token)
    .execute()
    .unwrap_err();
    assert_eq!(err, Error::Cancelled);
}
