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

//! Statistics for cardinality estimation and chunk pruning
//!
//! Per-segment histograms roll up into per-chunk and per-table statistics.
//! The optimizer consults `does_not_contain` to prove chunks empty before a
//! scan; estimates feed the cardinality estimator. Entries may be absent —
//! absence means "unknown, don't exclude".

pub mod chunk_statistics;
pub mod generate;
pub mod histogram;
pub mod segment_statistics;
pub mod table_statistics;

pub use chunk_statistics::ChunkStatistics;
pub use generate::{
    generate_chunk_statistics, generate_table_statistics, generate_table_statistics_for_chunks,
    DEFAULT_HISTOGRAM_BUCKETS,
};
pub use histogram::{
    CardinalityEstimate, EqualDistinctCountHistogram, EqualWidthHistogram, GenericHistogram,
    Histogram, HistogramBuckets, HistogramDomain, HistogramType,
};
pub use segment_statistics::{HistogramObject, SegmentStatistics, TypedSegmentStatistics};
pub use table_statistics::TableStatistics;
