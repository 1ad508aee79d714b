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

//! Equal-width histogram
//!
//! Buckets span equal slices of the value range. Empty slices keep their
//! boundaries with zero counts, which lets equality probes into them prove
//! emptiness.

use super::{HistogramBuckets, HistogramDomain};

/// Histogram with equal value-range slices per bucket
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWidthHistogram<T: HistogramDomain> {
    buckets: HistogramBuckets<T>,
}

impl<T: HistogramDomain> EqualWidthHistogram<T> {
    /// Build from ascending distinct `(value, count)` pairs
    ///
    /// Returns `None` for empty input. The range `[min, max]` is cut into at
    /// most `bucket_count` equal slices in the value domain.
    pub fn from_distinct_counts(counts: &[(T, u64)], bucket_count: usize) -> Option<Self> {
        if counts.is_empty() || bucket_count == 0 {
            return None;
        }
        let min_position = counts[0].0.to_domain();
        let max_position = counts[counts.len() - 1].0.to_domain();

        let boundaries = if T::CONTINUOUS {
            continuous_boundaries(min_position, max_position, bucket_count)
        } else {
            discrete_boundaries(min_position, max_position, bucket_count)
        };
        let slices = boundaries.len() - 1;

        let mut minima: Vec<T> = Vec::with_capacity(slices);
        let mut maxima: Vec<T> = Vec::with_capacity(slices);
        for slice in 0..slices {
            let low = boundaries[slice];
            let high = if T::CONTINUOUS {
                boundaries[slice + 1]
            } else {
                boundaries[slice + 1] - 1.0
            };
            minima.push(T::from_domain(low));
            maxima.push(T::from_domain(high.max(low)));
        }
        // Pin the outer boundaries to the exact observed values; the domain
        // mapping may be lossy (string prefixes).
        minima[0] = counts[0].0.clone();
        maxima[slices - 1] = counts[counts.len() - 1].0.clone();

        let mut heights = vec![0u64; slices];
        let mut distinct_counts = vec![0u64; slices];
        for (value, count) in counts {
            let position = value.to_domain();
            // Upper boundaries are exclusive except for the last slice.
            let slice = boundaries[1..slices]
                .iter()
                .position(|&boundary| position < boundary)
                .unwrap_or(slices - 1);
            heights[slice] += count;
            distinct_counts[slice] += 1;
        }

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

/// Exclusive upper boundaries over an integer-valued domain
fn discrete_boundaries(min: f64, max: f64, bucket_count: usize) -> Vec<f64> {
    let range = max - min + 1.0;
    let slices = (bucket_count as f64).min(range).max(1.0) as usize;
    let mut boundaries = Vec::with_capacity(slices + 1);
    for index in 0..=slices {
        let offset = (range * index as f64 / slices as f64).floor();
        let boundary = min + offset;
        // Guard against precision collapse on very wide domains.
        match boundaries.last() {
            Some(&previous) if boundary <= previous => boundaries.push(previous + 1.0),
            _ => boundaries.push(boundary),
        }
    }
    boundaries
}

/// Shared boundaries over a dense domain
fn continuous_boundaries(min: f64, max: f64, bucket_count: usize) -> Vec<f64> {
    if max <= min {
        return vec![min, max.max(min)];
    }
    let width = (max - min) / bucket_count as f64;
    let mut boundaries: Vec<f64> = (0..=bucket_count)
        .map(|index| min + width * index as f64)
        .collect();
    boundaries[bucket_count] = max;
    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_cover_the_range_evenly() {
        let counts: Vec<(i32, u64)> = (0..30).map(|value| (value, 1)).collect();
        let histogram = EqualWidthHistogram::from_distinct_counts(&counts, 3).unwrap();

        let buckets = histogram.buckets();
        assert_eq!(buckets.bucket_count(), 3);
        assert_eq!(buckets.minima(), &[0, 10, 20]);
        assert_eq!(buckets.maxima(), &[9, 19, 29]);
        assert_eq!(buckets.heights(), &[10, 10, 10]);
    }

    #[test]
    fn empty_slices_keep_zero_counts() {
        // Values cluster at both ends; the middle slice stays empty.
        let counts = [(0i64, 5u64), (1, 5), (28, 5), (29, 5)];
        let histogram = EqualWidthHistogram::from_distinct_counts(&counts, 3).unwrap();

        let buckets = histogram.buckets();
        assert_eq!(buckets.bucket_count(), 3);
        assert_eq!(buckets.heights()[1], 0);
        assert_eq!(buckets.distinct_counts()[1], 0);
        assert_eq!(buckets.total_count(), 20);
    }

    #[test]
    fn continuous_domain_shares_boundaries() {
        let counts = [(0.0f64, 1u64), (0.5, 1), (1.0, 1)];
        let histogram = EqualWidthHistogram::from_distinct_counts(&counts, 2).unwrap();
        let buckets = histogram.buckets();
        assert_eq!(buckets.bucket_count(), 2);
        assert_eq!(buckets.minima()[1], 0.5);
        assert_eq!(buckets.heights(), &[1, 2]);
    }

    #[test]
    fn range_narrower_than_bucket_count() {
        let counts = [(7i32, 3u64), (8, 4)];
        let histogram = EqualWidthHistogram::from_distinct_counts(&counts, 16).unwrap();
        let buckets = histogram.buckets();
        assert_eq!(buckets.bucket_count(), 2);
        assert_eq!(buckets.total_count(), 7);
    }
}
