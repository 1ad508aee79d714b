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

//! Equal-distinct-count histogram
//!
//! Buckets are chosen so each holds approximately the same number of
//! distinct values. Leading buckets absorb the remainder when the distinct
//! count does not divide evenly.

use super::{HistogramBuckets, HistogramDomain};

/// Histogram with ~equal distinct values per bucket
#[derive(Debug, Clone, PartialEq)]
pub struct EqualDistinctCountHistogram<T: HistogramDomain> {
    buckets: HistogramBuckets<T>,
}

impl<T: HistogramDomain> EqualDistinctCountHistogram<T> {
    /// Build from ascending distinct `(value, count)` pairs
    ///
    /// Returns `None` for empty input. `max_bucket_count` caps the number of
    /// buckets; fewer are used when there are fewer distinct values.
    pub fn from_distinct_counts(
        counts: &[(T, u64)],
        max_bucket_count: usize,
    ) -> Option<Self> {
        if counts.is_empty() || max_bucket_count == 0 {
            return None;
        }
        let distinct = counts.len();
        let bucket_count = max_bucket_count.min(distinct);
        let base = distinct / bucket_count;
        let remainder = distinct % bucket_count;

        let mut minima = Vec::with_capacity(bucket_count);
        let mut maxima = Vec::with_capacity(bucket_count);
        let mut heights = Vec::with_capacity(bucket_count);
        let mut distinct_counts = Vec::with_capacity(bucket_count);

        let mut cursor = 0usize;
        for bucket in 0..bucket_count {
            let group = base + usize::from(bucket < remainder);
            let slice = &counts[cursor..cursor + group];
            minima.push(slice[0].0.clone());
            maxima.push(slice[group - 1].0.clone());
            heights.push(slice.iter().map(|(_, count)| count).sum());
            distinct_counts.push(group as u64);
            cursor += group;
        }

        // Input pairs are ascending and distinct, so the invariants hold.
        let buckets = HistogramBuckets::new(minima, maxima, heights, distinct_counts).ok()?;
        Some(Self { buckets })
    }

    /// The shared bucket storage
    pub fn buckets(&self) -> &HistogramBuckets<T> {
        &self.buckets
    }

    /// Scale counts, preserving boundaries
    pub fn scale(&self, selectivity: f64) -> Self {
        Self {
            buckets: self.buckets.scale(selectivity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_spread_evenly() {
        let counts: Vec<(i32, u64)> = (0..10).map(|value| (value, 2)).collect();
        let histogram = EqualDistinctCountHistogram::from_distinct_counts(&counts, 3).unwrap();

        let buckets = histogram.buckets();
        assert_eq!(buckets.bucket_count(), 3);
        // 10 distinct over 3 buckets: 4 + 3 + 3.
        assert_eq!(buckets.distinct_counts(), &[4, 3, 3]);
        assert_eq!(buckets.heights(), &[8, 6, 6]);
        assert_eq!(buckets.total_count(), 20);
        assert_eq!(buckets.total_distinct_count(), 10);
        assert_eq!(buckets.minima()[0], 0);
        assert_eq!(buckets.maxima()[2], 9);
    }

    #[test]
    fn fewer_distinct_values_than_buckets() {
        let counts = [(5i64, 7u64), (9, 1)];
        let histogram = EqualDistinctCountHistogram::from_distinct_counts(&counts, 32).unwrap();
        assert_eq!(histogram.buckets().bucket_count(), 2);
        assert_eq!(histogram.buckets().heights(), &[7, 1]);
    }

    #[test]
    fn empty_input_yields_no_histogram() {
        assert!(EqualDistinctCountHistogram::<i32>::from_distinct_counts(&[], 8).is_none());
    }
}
