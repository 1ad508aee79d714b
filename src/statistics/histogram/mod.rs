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

//! Histograms over one segment's values
//!
//! A histogram is an ordered list of non-overlapping buckets, each carrying
//! `(min, max, height, distinct_count)`. Three variants share the bucket
//! storage and estimation logic: equal-distinct-count, equal-width and
//! generic. Estimation interpolates within buckets over a numeric domain;
//! exclusion decisions (`does_not_contain`) use only real value orderings
//! and are sound.

pub mod equal_distinct_count;
pub mod equal_width;
pub mod generic;
pub mod string_domain;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::{Error, PredicateCondition, Result};
use crate::storage::segment::SegmentValue;

use super::segment_statistics::{HistogramObject, SegmentStatistics, TypedSegmentStatistics};

pub use equal_distinct_count::EqualDistinctCountHistogram;
pub use equal_width::EqualWidthHistogram;
pub use generic::GenericHistogram;

// =============================================================================
// Numeric domain
// =============================================================================

/// Values a histogram can bucket: segment values with a numeric domain
///
/// The domain backs bucket-width arithmetic and within-bucket
/// interpolation. For strings it is the fixed-prefix code of
/// [`string_domain`], which is lossy beyond the prefix; exclusion logic
/// never relies on it.
pub trait HistogramDomain: SegmentValue {
    /// True for types whose domain is dense (floats)
    const CONTINUOUS: bool;

    /// Position of this value on the real line
    fn to_domain(&self) -> f64;

    /// A value at (approximately) the given domain position
    fn from_domain(position: f64) -> Self;

    /// Wrap a typed histogram into the type-erased statistics object
    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject;

    /// Wrap typed segment statistics into the type-erased carrier
    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics;
}

impl HistogramDomain for i32 {
    const CONTINUOUS: bool = false;

    fn to_domain(&self) -> f64 {
        *self as f64
    }

    fn from_domain(position: f64) -> Self {
        position.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }

    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject {
        HistogramObject::Int32(histogram)
    }

    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics {
        SegmentStatistics::Int32(statistics)
    }
}

impl HistogramDomain for i64 {
    const CONTINUOUS: bool = false;

    fn to_domain(&self) -> f64 {
        *self as f64
    }

    fn from_domain(position: f64) -> Self {
        position.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64
    }

    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject {
        HistogramObject::Int64(histogram)
    }

    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics {
        SegmentStatistics::Int64(statistics)
    }
}

impl HistogramDomain for f32 {
    const CONTINUOUS: bool = true;

    fn to_domain(&self) -> f64 {
        *self as f64
    }

    fn from_domain(position: f64) -> Self {
        position as f32
    }

    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject {
        HistogramObject::Float(histogram)
    }

    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics {
        SegmentStatistics::Float(statistics)
    }
}

impl HistogramDomain for f64 {
    const CONTINUOUS: bool = true;

    fn to_domain(&self) -> f64 {
        *self
    }

    fn from_domain(position: f64) -> Self {
        position
    }

    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject {
        HistogramObject::Double(histogram)
    }

    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics {
        SegmentStatistics::Double(statistics)
    }
}

impl HistogramDomain for Arc<str> {
    const CONTINUOUS: bool = false;

    fn to_domain(&self) -> f64 {
        string_domain::encode_prefix(self) as f64
    }

    fn from_domain(position: f64) -> Self {
        let code = position.round().clamp(0.0, u64::MAX as f64) as u64;
        Arc::from(string_domain::decode_prefix(code).as_str())
    }

    fn wrap_histogram(histogram: Histogram<Self>) -> HistogramObject {
        HistogramObject::Text(histogram)
    }

    fn wrap_statistics(statistics: TypedSegmentStatistics<Self>) -> SegmentStatistics {
        SegmentStatistics::Text(statistics)
    }
}

// =============================================================================
// Estimates
// =============================================================================

/// Estimated matching rows and distinct values for a predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardinalityEstimate {
    pub row_count: f64,
    pub distinct_count: f64,
}

impl CardinalityEstimate {
    fn new(row_count: f64, distinct_count: f64) -> Self {
        Self {
            row_count,
            distinct_count,
        }
    }
}

// =============================================================================
// Shared bucket storage
// =============================================================================

/// Where a probe value falls relative to the bucket list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Empty,
    BelowMin,
    InBucket(usize),
    /// Between bucket `index - 1` and bucket `index`
    InGap(usize),
    AboveMax,
}

/// Ordered non-overlapping buckets with per-bucket height and distinct count
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBuckets<T> {
    minima: Vec<T>,
    maxima: Vec<T>,
    heights: Vec<u64>,
    distinct_counts: Vec<u64>,
}

impl<T: HistogramDomain> HistogramBuckets<T> {
    /// Create bucket storage, validating the structural invariants
    pub fn new(
        minima: Vec<T>,
        maxima: Vec<T>,
        heights: Vec<u64>,
        distinct_counts: Vec<u64>,
    ) -> Result<Self> {
        if minima.len() != maxima.len()
            || minima.len() != heights.len()
            || minima.len() != distinct_counts.len()
        {
            return Err(Error::InvalidArgument(
                "histogram bucket arrays must have equal lengths".to_string(),
            ));
        }
        for index in 0..minima.len() {
            if minima[index].total_cmp(&maxima[index]) == Ordering::Greater {
                return Err(Error::InvalidArgument(
                    "histogram bucket with min > max".to_string(),
                ));
            }
            if index > 0 && maxima[index - 1].total_cmp(&minima[index]) != Ordering::Less {
                return Err(Error::InvalidArgument(
                    "histogram buckets must be disjoint and ascending".to_string(),
                ));
            }
        }
        Ok(Self {
            minima,
            maxima,
            heights,
            distinct_counts,
        })
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.minima.len()
    }

    /// Per-bucket minima, ascending
    pub fn minima(&self) -> &[T] {
        &self.minima
    }

    /// Per-bucket maxima, ascending
    pub fn maxima(&self) -> &[T] {
        &self.maxima
    }

    /// Per-bucket row counts
    pub fn heights(&self) -> &[u64] {
        &self.heights
    }

    /// Per-bucket distinct value counts
    pub fn distinct_counts(&self) -> &[u64] {
        &self.distinct_counts
    }

    /// Smallest covered value
    pub fn min(&self) -> Option<&T> {
        self.minima.first()
    }

    /// Largest covered value
    pub fn max(&self) -> Option<&T> {
        self.maxima.last()
    }

    /// Total row count over all buckets
    pub fn total_count(&self) -> u64 {
        self.heights.iter().sum()
    }

    /// Total distinct count over all buckets
    pub fn total_distinct_count(&self) -> u64 {
        self.distinct_counts.iter().sum()
    }

    fn locate(&self, value: &T) -> Location {
        if self.minima.is_empty() {
            return Location::Empty;
        }
        let index = self
            .minima
            .partition_point(|min| min.total_cmp(value) != Ordering::Greater);
        if index == 0 {
            return Location::BelowMin;
        }
        let candidate = index - 1;
        if self.maxima[candidate].total_cmp(value) != Ordering::Less {
            Location::InBucket(candidate)
        } else if candidate + 1 < self.minima.len() {
            Location::InGap(candidate + 1)
        } else {
            Location::AboveMax
        }
    }

    /// Share of bucket `index` lying strictly below `value`
    fn share_below(&self, index: usize, value: &T) -> f64 {
        let low = self.minima[index].to_domain();
        let high = self.maxima[index].to_domain();
        let position = value.to_domain();
        let span = if T::CONTINUOUS {
            high - low
        } else {
            high - low + 1.0
        };
        if span <= 0.0 {
            return 0.0;
        }
        ((position - low) / span).clamp(0.0, 1.0)
    }

    /// Rows and distinct values strictly below `value`
    fn count_below(&self, value: &T) -> (f64, f64) {
        match self.locate(value) {
            Location::Empty | Location::BelowMin => (0.0, 0.0),
            Location::InBucket(index) => {
                let share = self.share_below(index, value);
                let (mut rows, mut distinct) = self.prefix_totals(index);
                rows += share * self.heights[index] as f64;
                distinct += share * self.distinct_counts[index] as f64;
                (rows, distinct)
            }
            Location::InGap(index) => self.prefix_totals(index),
            Location::AboveMax => (
                self.total_count() as f64,
                self.total_distinct_count() as f64,
            ),
        }
    }

    /// Rows and distinct values equal to `value`
    fn count_equal(&self, value: &T) -> (f64, f64) {
        match self.locate(value) {
            Location::InBucket(index) if self.distinct_counts[index] > 0 => (
                self.heights[index] as f64 / self.distinct_counts[index] as f64,
                1.0,
            ),
            _ => (0.0, 0.0),
        }
    }

    fn prefix_totals(&self, bucket_count: usize) -> (f64, f64) {
        let rows: u64 = self.heights[..bucket_count].iter().sum();
        let distinct: u64 = self.distinct_counts[..bucket_count].iter().sum();
        (rows as f64, distinct as f64)
    }

    /// Estimate matching rows and distinct values for a predicate
    ///
    /// LIKE and the null checks fall back to the conservative upper bound;
    /// string-aware LIKE estimation lives on the text histogram.
    pub fn estimate(
        &self,
        condition: PredicateCondition,
        value: &T,
        value2: Option<&T>,
    ) -> CardinalityEstimate {
        let total = self.total_count() as f64;
        let total_distinct = self.total_distinct_count() as f64;
        let clamp = |estimate: CardinalityEstimate| {
            CardinalityEstimate::new(
                estimate.row_count.clamp(0.0, total),
                estimate.distinct_count.clamp(0.0, total_distinct),
            )
        };

        let estimate = match condition {
            PredicateCondition::Equals => {
                let (rows, distinct) = self.count_equal(value);
                CardinalityEstimate::new(rows, distinct)
            }
            PredicateCondition::NotEquals => {
                let (rows, distinct) = self.count_equal(value);
                CardinalityEstimate::new(total - rows, total_distinct - distinct)
            }
            PredicateCondition::LessThan => {
                let (rows, distinct) = self.count_below(value);
                CardinalityEstimate::new(rows, distinct)
            }
            PredicateCondition::LessThanEquals => {
                let (below_rows, below_distinct) = self.count_below(value);
                let (equal_rows, equal_distinct) = self.count_equal(value);
                CardinalityEstimate::new(below_rows + equal_rows, below_distinct + equal_distinct)
            }
            PredicateCondition::GreaterThan => {
                let (below_rows, below_distinct) = self.count_below(value);
                let (equal_rows, equal_distinct) = self.count_equal(value);
                CardinalityEstimate::new(
                    total - below_rows - equal_rows,
                    total_distinct - below_distinct - equal_distinct,
                )
            }
            PredicateCondition::GreaterThanEquals => {
                let (rows, distinct) = self.count_below(value);
                CardinalityEstimate::new(total - rows, total_distinct - distinct)
            }
            PredicateCondition::Between => {
                let upper = match value2 {
                    Some(upper) => upper,
                    None => return clamp(CardinalityEstimate::new(total, total_distinct)),
                };
                let (upper_rows, upper_distinct) = {
                    let (below_rows, below_distinct) = self.count_below(upper);
                    let (equal_rows, equal_distinct) = self.count_equal(upper);
                    (below_rows + equal_rows, below_distinct + equal_distinct)
                };
                let (lower_rows, lower_distinct) = self.count_below(value);
                CardinalityEstimate::new(upper_rows - lower_rows, upper_distinct - lower_distinct)
            }
            PredicateCondition::Like
            | PredicateCondition::NotLike
            | PredicateCondition::IsNull
            | PredicateCondition::IsNotNull => {
                CardinalityEstimate::new(total, total_distinct)
            }
        };
        clamp(estimate)
    }

    /// Returns true only if no covered row can match the predicate
    ///
    /// Sound by construction: every decision uses real value orderings, and
    /// conditions the buckets cannot decide return false.
    pub fn does_not_contain(
        &self,
        condition: PredicateCondition,
        value: &T,
        value2: Option<&T>,
    ) -> bool {
        let (Some(min), Some(max)) = (self.min(), self.max()) else {
            // No covered rows at all; any value predicate matches nothing.
            return true;
        };
        match condition {
            PredicateCondition::Equals => match self.locate(value) {
                Location::BelowMin | Location::AboveMax | Location::InGap(_) => true,
                Location::InBucket(index) => self.distinct_counts[index] == 0,
                Location::Empty => true,
            },
            PredicateCondition::LessThan => value.total_cmp(min) != Ordering::Greater,
            PredicateCondition::LessThanEquals => value.total_cmp(min) == Ordering::Less,
            PredicateCondition::GreaterThan => value.total_cmp(max) != Ordering::Less,
            PredicateCondition::GreaterThanEquals => value.total_cmp(max) == Ordering::Greater,
            PredicateCondition::NotEquals => {
                self.total_distinct_count() == 1
                    && min.total_cmp(value) == Ordering::Equal
                    && max.total_cmp(value) == Ordering::Equal
            }
            PredicateCondition::Between => match value2 {
                Some(upper) => {
                    upper.total_cmp(min) == Ordering::Less
                        || value.total_cmp(max) == Ordering::Greater
                        || value.total_cmp(upper) == Ordering::Greater
                }
                None => false,
            },
            PredicateCondition::Like
            | PredicateCondition::NotLike
            | PredicateCondition::IsNull
            | PredicateCondition::IsNotNull => false,
        }
    }

    /// Multiply every bucket's counts by `selectivity`, keeping boundaries
    pub fn scale(&self, selectivity: f64) -> Self {
        let selectivity = selectivity.clamp(0.0, 1.0);
        let heights: Vec<u64> = self
            .heights
            .iter()
            .map(|&height| (height as f64 * selectivity).round() as u64)
            .collect();
        let distinct_counts: Vec<u64> = self
            .distinct_counts
            .iter()
            .zip(&heights)
            .map(|(&distinct, &height)| {
                let scaled = (distinct as f64 * selectivity).round() as u64;
                if height > 0 {
                    scaled.clamp(1, distinct.max(1))
                } else {
                    scaled.min(distinct)
                }
            })
            .collect();
        Self {
            minima: self.minima.clone(),
            maxima: self.maxima.clone(),
            heights,
            distinct_counts,
        }
    }
}

// =============================================================================
// The tagged histogram variant
// =============================================================================

/// Kinds of histograms; a statistics slot carries exactly one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramType {
    EqualDistinctCount,
    EqualWidth,
    Generic,
}

/// A histogram of exactly one kind over one value type
#[derive(Debug, Clone, PartialEq)]
pub enum Histogram<T: HistogramDomain> {
    EqualDistinctCount(EqualDistinctCountHistogram<T>),
    EqualWidth(EqualWidthHistogram<T>),
    Generic(GenericHistogram<T>),
}

impl<T: HistogramDomain> Histogram<T> {
    /// The histogram's kind
    pub fn histogram_type(&self) -> HistogramType {
        match self {
            Histogram::EqualDistinctCount(_) => HistogramType::EqualDistinctCount,
            Histogram::EqualWidth(_) => HistogramType::EqualWidth,
            Histogram::Generic(_) => HistogramType::Generic,
        }
    }

    /// The shared bucket storage
    pub fn buckets(&self) -> &HistogramBuckets<T> {
        match self {
            Histogram::EqualDistinctCount(histogram) => histogram.buckets(),
            Histogram::EqualWidth(histogram) => histogram.buckets(),
            Histogram::Generic(histogram) => histogram.buckets(),
        }
    }

    /// Total row count
    pub fn total_count(&self) -> u64 {
        self.buckets().total_count()
    }

    /// Total distinct count
    pub fn total_distinct_count(&self) -> u64 {
        self.buckets().total_distinct_count()
    }

    /// Smallest covered value
    pub fn min(&self) -> Option<&T> {
        self.buckets().min()
    }

    /// Largest covered value
    pub fn max(&self) -> Option<&T> {
        self.buckets().max()
    }

    /// Estimate matching rows and distinct values for a predicate
    pub fn estimate_cardinality(
        &self,
        condition: PredicateCondition,
        value: &T,
        value2: Option<&T>,
    ) -> CardinalityEstimate {
        self.buckets().estimate(condition, value, value2)
    }

    /// Returns true only if no covered row can match the predicate
    pub fn does_not_contain(
        &self,
        condition: PredicateCondition,
        value: &T,
        value2: Option<&T>,
    ) -> bool {
        self.buckets().does_not_contain(condition, value, value2)
    }

    /// Scale every bucket's counts, preserving boundaries and the variant
    pub fn scale_with_selectivity(&self, selectivity: f64) -> Histogram<T> {
        match self {
            Histogram::EqualDistinctCount(histogram) => {
                Histogram::EqualDistinctCount(histogram.scale(selectivity))
            }
            Histogram::EqualWidth(histogram) => Histogram::EqualWidth(histogram.scale(selectivity)),
            Histogram::Generic(histogram) => Histogram::Generic(histogram.scale(selectivity)),
        }
    }
}

impl Histogram<Arc<str>> {
    /// Estimate a LIKE predicate from the literal prefix of its pattern
    ///
    /// A pattern without wildcards estimates like equality; a pattern with a
    /// literal prefix estimates the covered prefix range; a leading wildcard
    /// falls back to a fixed share of all rows.
    pub fn estimate_like(&self, pattern: &str) -> CardinalityEstimate {
        const WILDCARD_FALLBACK_SELECTIVITY: f64 = 0.1;

        let prefix: String = pattern
            .chars()
            .take_while(|&character| character != '%' && character != '_')
            .collect();
        if prefix.len() == pattern.len() {
            return self.estimate_cardinality(
                PredicateCondition::Equals,
                &Arc::from(pattern),
                None,
            );
        }
        if prefix.is_empty() {
            let total = self.total_count() as f64;
            let distinct = self.total_distinct_count() as f64;
            return CardinalityEstimate {
                row_count: total * WILDCARD_FALLBACK_SELECTIVITY,
                distinct_count: (distinct * WILDCARD_FALLBACK_SELECTIVITY).max(1.0),
            };
        }

        let lower: Arc<str> = Arc::from(prefix.as_str());
        let buckets = self.buckets();
        let (lower_rows, lower_distinct) = buckets.count_below(&lower);
        let (upper_rows, upper_distinct) = match string_domain::prefix_upper_bound(&prefix) {
            Some(code) => {
                let upper: Arc<str> = Arc::from(string_domain::decode_prefix(code).as_str());
                buckets.count_below(&upper)
            }
            None => (
                buckets.total_count() as f64,
                buckets.total_distinct_count() as f64,
            ),
        };
        CardinalityEstimate {
            row_count: (upper_rows - lower_rows).max(0.0),
            distinct_count: (upper_distinct - lower_distinct).max(0.0),
        }
    }
}
