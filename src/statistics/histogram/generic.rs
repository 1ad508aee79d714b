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

//! Generic histogram with arbitrary, caller-chosen bucket boundaries

use crate::core::Result;

use super::{HistogramBuckets, HistogramDomain};

/// Histogram over explicitly given buckets
#[derive(Debug, Clone, PartialEq)]
pub struct GenericHistogram<T: HistogramDomain> {
    buckets: HistogramBuckets<T>,
}

impl<T: HistogramDomain> GenericHistogram<T> {
    /// Create from parallel bucket arrays
    ///
    /// Buckets must be ascending and disjoint with `min <= max` each.
    pub fn new(
        minima: Vec<T>,
        maxima: Vec<T>,
        heights: Vec<u64>,
        distinct_counts: Vec<u64>,
    ) -> Result<Self> {
        Ok(Self {
            buckets: HistogramBuckets::new(minima, maxima, heights, distinct_counts)?,
        })
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
    use crate::core::Error;

    use super::*;

    #[test]
    fn overlapping_buckets_are_rejected() {
        let err = GenericHistogram::new(
            vec![0i32, 5],
            vec![6, 10],
            vec![1, 1],
            vec![1, 1],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn arbitrary_gaps_are_allowed() {
        let histogram = GenericHistogram::new(
            vec![0i32, 100],
            vec![9, 109],
            vec![50, 50],
            vec![10, 10],
        )
        .unwrap();
        assert_eq!(histogram.buckets().total_count(), 100);
    }
}
