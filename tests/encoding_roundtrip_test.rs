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

//! Integration tests for segment encoding round-trips
//!
//! Every encoding must reproduce the logical value sequence exactly,
//! including null positions, and re-encoding must never inflate the
//! reported memory usage for compressible data.

use std::sync::Arc;

use stratadb::storage::segment::{DataSegment, SegmentPosition};
use stratadb::{
    encode_segment, DictionarySegment, EncodingKind, FrameOfReferenceSegment, Segment,
    SegmentEncodingSpec, ValueSegment, VectorCompression,
};

fn text(value: &str) -> Arc<str> {
    Arc::from(value)
}

#[test]
fn dictionary_on_strings() {
    let source = ValueSegment::from_options(vec![
        Some(text("b")),
        Some(text("a")),
        Some(text("b")),
        Some(text("c")),
        None,
        Some(text("a")),
    ]);
    let expected: Vec<SegmentPosition<Arc<str>>> = source.iter().collect();

    let segment = DictionarySegment::encode(&source, VectorCompression::FixedWidth);
    assert_eq!(segment.dictionary(), &[text("a"), text("b"), text("c")]);
    assert_eq!(segment.null_code(), 3);
    let codes: Vec<u64> = segment.attribute_vector().iter().collect();
    assert_eq!(codes, vec![1, 0, 1, 2, 3, 0]);

    let decoded: Vec<SegmentPosition<Arc<str>>> = segment.iter().collect();
    assert_eq!(decoded, expected);
    let null_positions: Vec<u32> = decoded
        .iter()
        .filter(|position| position.is_null)
        .map(|position| position.chunk_offset)
        .collect();
    assert_eq!(null_positions, vec![4]);
}

#[test]
fn run_length_on_integers() {
    let source = ValueSegment::from_options(vec![
        Some(5i32),
        Some(5),
        Some(5),
        Some(7),
        Some(7),
        None,
        None,
        Some(5),
    ]);
    let encoded = encode_segment(
        SegmentEncodingSpec::new(EncodingKind::RunLength),
        &Segment::Int32(DataSegment::Value(source.clone())),
        None,
    )
    .unwrap();

    let Segment::Int32(DataSegment::RunLength(segment)) = &encoded else {
        panic!("expected a run-length segment");
    };
    assert_eq!(segment.values(), &[5, 7, 0, 5]);
    let null_flags: Vec<bool> = segment.null_flags().iter().collect();
    assert_eq!(null_flags, vec![false, false, true, false]);
    assert_eq!(segment.end_positions(), &[2, 4, 6, 7]);

    let decoded: Vec<_> = segment.iter().collect();
    let expected: Vec<_> = source.iter().collect();
    assert_eq!(decoded, expected);
}

#[test]
fn frame_of_reference_blocks() {
    let source = ValueSegment::from_values(vec![1000i32, 1001, 1002, 1050, 2000, 2001]);
    let segment = FrameOfReferenceSegment::encode_with_block_size(&source, 3, None).unwrap();

    assert_eq!(segment.blocks().len(), 2);
    assert_eq!(*segment.blocks()[0].reference(), 1000);
    assert_eq!(segment.blocks()[0].bit_width(), 2);
    let block0: Vec<u64> = (0..3).map(|i| segment.blocks()[0].deltas().get(i)).collect();
    assert_eq!(block0, vec![0, 1, 2]);

    assert_eq!(*segment.blocks()[1].reference(), 1050);
    assert_eq!(segment.blocks()[1].bit_width(), 10);
    let block1: Vec<u64> = (0..3).map(|i| segment.blocks()[1].deltas().get(i)).collect();
    assert_eq!(block1, vec![0, 950, 951]);

    let decoded: Vec<i32> = segment.iter().map(|position| position.value).collect();
    assert_eq!(decoded, vec![1000, 1001, 1002, 1050, 2000, 2001]);
}

#[test]
fn every_encoding_roundtrips_every_supported_type() {
    let int_rows = vec![Some(3i64), None, Some(3), Some(-20), Some(1_000_000)];
    let int_source = ValueSegment::from_options(int_rows);
    let int_expected: Vec<_> = int_source.iter().collect();
    let int_segment = Segment::Int64(DataSegment::Value(int_source));

    for encoding in [
        EncodingKind::Unencoded,
        EncodingKind::Dictionary,
        EncodingKind::RunLength,
        EncodingKind::FrameOfReference,
        EncodingKind::Lz4,
    ] {
        let encoded =
            encode_segment(SegmentEncodingSpec::new(encoding), &int_segment, None).unwrap();
        let Segment::Int64(data) = &encoded else {
            panic!("segment changed type under {encoding}");
        };
        let decoded: Vec<_> = data.iter().unwrap().collect();
        assert_eq!(decoded, int_expected, "INT64 roundtrip failed for {encoding}");
    }

    let text_rows = vec![
        Some(text("delta")),
        Some(text("alpha")),
        None,
        Some(text("alpha")),
        Some(text("")),
    ];
    let text_source = ValueSegment::from_options(text_rows);
    let text_expected: Vec<_> = text_source.iter().collect();
    let text_segment = Segment::Text(DataSegment::Value(text_source));

    for encoding in [
        EncodingKind::Unencoded,
        EncodingKind::Dictionary,
        EncodingKind::RunLength,
        EncodingKind::Lz4,
    ] {
        let encoded =
            encode_segment(SegmentEncodingSpec::new(encoding), &text_segment, None).unwrap();
        let Segment::Text(data) = &encoded else {
            panic!("segment changed type under {encoding}");
        };
        let decoded: Vec<_> = data.iter().unwrap().collect();
        assert_eq!(decoded, text_expected, "TEXT roundtrip failed for {encoding}");
    }

    let double_rows = vec![Some(0.5f64), Some(0.5), None, Some(-1.25)];
    let double_source = ValueSegment::from_options(double_rows);
    let double_expected: Vec<_> = double_source.iter().collect();
    let double_segment = Segment::Double(DataSegment::Value(double_source));

    for encoding in [
        EncodingKind::Dictionary,
        EncodingKind::RunLength,
        EncodingKind::Lz4,
    ] {
        let encoded =
            encode_segment(SegmentEncodingSpec::new(encoding), &double_segment, None).unwrap();
        let Segment::Double(data) = &encoded else {
            panic!("segment changed type under {encoding}");
        };
        let decoded: Vec<_> = data.iter().unwrap().collect();
        assert_eq!(decoded, double_expected, "DOUBLE roundtrip failed for {encoding}");
    }
}

#[test]
fn bit_packed_attribute_vectors_roundtrip() {
    let values: Vec<Option<i32>> = (0..500).map(|i| Some(i % 37)).collect();
    let source = ValueSegment::from_options(values);
    let expected: Vec<_> = source.iter().collect();

    let segment = DictionarySegment::encode(&source, VectorCompression::BitPacked);
    assert_eq!(segment.unique_values_count(), 37);
    let decoded: Vec<_> = segment.iter().collect();
    assert_eq!(decoded, expected);
}

/// Re-encoding compressible columns must not inflate reported memory.
///
/// The columns mimic the shapes a typical fact table exhibits: long
/// mixed-content strings, a small-domain decimal and a tiny-range integer.
#[test]
fn encoded_memory_never_exceeds_unencoded() {
    let comments: Vec<Option<Arc<str>>> = (0..2000)
        .map(|i| {
            Some(text(&format!(
                "carefully packed instructions haggle furiously across requests {}",
                i % 40
            )))
        })
        .collect();
    let comment_source = ValueSegment::from_options(comments);
    let comment_segment = Segment::Text(DataSegment::Value(comment_source));

    let taxes: Vec<Option<f64>> = (0..2000).map(|i| Some((i / 250 % 9) as f64 * 0.01)).collect();
    let tax_source = ValueSegment::from_options(taxes);
    let tax_segment = Segment::Double(DataSegment::Value(tax_source));

    let line_numbers: Vec<Option<i32>> = (0..2000).map(|i| Some(i % 7 + 1)).collect();
    let line_source = ValueSegment::from_options(line_numbers);
    let line_segment = Segment::Int32(DataSegment::Value(line_source));

    let cases: Vec<(&str, &Segment, Vec<EncodingKind>)> = vec![
        (
            "comment",
            &comment_segment,
            vec![EncodingKind::Dictionary, EncodingKind::Lz4],
        ),
        (
            "tax",
            &tax_segment,
            vec![EncodingKind::Dictionary, EncodingKind::RunLength, EncodingKind::Lz4],
        ),
        (
            "line_number",
            &line_segment,
            vec![
                EncodingKind::Dictionary,
                EncodingKind::FrameOfReference,
                EncodingKind::Lz4,
            ],
        ),
    ];

    for (name, segment, encodings) in cases {
        let unencoded = segment.estimate_memory_usage();
        for encoding in encodings {
            let encoded =
                encode_segment(SegmentEncodingSpec::new(encoding), segment, None).unwrap();
            assert!(
                encoded.estimate_memory_usage() <= unencoded,
                "{encoding} on '{name}' grew from {unencoded} to {} bytes",
                encoded.estimate_memory_usage()
            );
        }
    }
}
