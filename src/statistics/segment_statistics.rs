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

//! Per-segment statistics
//!
//! One statistics object per (chunk, column), carrying at most one
//! histogram plus the cached null count. `does_not_contain` is the pruning
//! entry point: it never errors, answering "false" (cannot prove exclusion)
//! for type mismatches, missing histograms and undecidable conditions.

use std::sync::Arc;

use crate::core::{DataType, Error, PredicateCondition, Result, Value};

use super::histogram::{CardinalityEstimate, Histogram, HistogramDomain, HistogramType};

/// Type-erased histogram, the installable statistics object
#[derive(Debug, Clone)]
pub enum HistogramObject {
    Int32(Histogram<i32>),
    Int64(Histogram<i64>),
    Float(Histogram<f32>),
    Double(Histogram<f64>),
    Text(Histogram<Arc<str>>),
}

impl HistogramObject {
    /// The value type the histogram was built over
    pub fn data_type(&self) -> DataType {
        match self {
            HistogramObject::Int32(_) => DataType::Int32,
            HistogramObject::Int64(_) => DataType::Int64,
            HistogramObject::Float(_) => DataType::Float,
            HistogramObject::Double(_) => DataType::Double,
            HistogramObject::Text(_) => DataType::Text,
        }
    }
}

/// Statistics for one segment of one value type
#[derive(Debug, Clone)]
pub struct TypedSegmentStatistics<T: HistogramDomain> {
    histogram: Option<Histogram<T>>,
    null_count: u64,
}

impl<T: HistogramDomain> TypedSegmentStatistics<T> {
    /// Create statistics with no histogram yet
    pub fn new(null_count: u64) -> Self {
        Self {
            histogram: None,
            null_count,
        }
    }

    /// Create statistics with a histogram
    pub fn with_histogram(histogram: Histogram<T>, null_count: u64) -> Self {
        Self {
            histogram: Some(histogram),
            null_count,
        }
    }

    /// The populated histogram, if any
    pub fn histogram(&self) -> Option<&Histogram<T>> {
        self.histogram.as_ref()
    }

    /// Cached NULL count
    pub fn null_count(&self) -> u64 {
        self.null_count
    }
}

/// Per-segment statistics, tagged by value type
#[derive(Debug, Clone)]
pub enum SegmentStatistics {
    Int32(TypedSegmentStatistics<i32>),
    Int64(TypedSegmentStatistics<i64>),
    Float(TypedSegmentStatistics<f32>),
    Double(TypedSegmentStatistics<f64>),
    Text(TypedSegmentStatistics<Arc<str>>),
}

impl SegmentStatistics {
    /// Empty statistics for a column of the given type
    pub fn new(data_type: DataType, null_count: u64) -> Result<Self> {
        match data_type {
            DataType::Int32 => Ok(SegmentStatistics::Int32(TypedSegmentStatistics::new(null_count))),
            DataType::Int64 => Ok(SegmentStatistics::Int64(TypedSegmentStatistics::new(null_count))),
            DataType::Float => Ok(SegmentStatistics::Float(TypedSegmentStatistics::new(null_count))),
            DataType::Double => Ok(SegmentStatistics::Double(TypedSegmentStatistics::new(null_count))),
            DataType::Text => Ok(SegmentStatistics::Text(TypedSegmentStatistics::new(null_count))),
            DataType::Null => Err(Error::InvalidArgument(
                "no statistics for NULL-typed columns".to_string(),
            )),
        }
    }

    /// The column's value type
    pub fn data_type(&self) -> DataType {
        match self {
            SegmentStatistics::Int32(_) => DataType::Int32,
            SegmentStatistics::Int64(_) => DataType::Int64,
            SegmentStatistics::Float(_) => DataType::Float,
            SegmentStatistics::Double(_) => DataType::Double,
            SegmentStatistics::Text(_) => DataType::Text,
        }
    }

    /// Cached NULL count
    pub fn null_count(&self) -> u64 {
        match self {
            SegmentStatistics::Int32(statistics) => statistics.null_count(),
            SegmentStatistics::Int64(statistics) => statistics.null_count(),
            SegmentStatistics::Float(statistics) => statistics.null_count(),
            SegmentStatistics::Double(statistics) => statistics.null_count(),
            SegmentStatistics::Text(statistics) => statistics.null_count(),
        }
    }

    /// Kind of the populated histogram, if any
    pub fn histogram_type(&self) -> Option<HistogramType> {
        match self {
            SegmentStatistics::Int32(statistics) => statistics.histogram().map(|h| h.histogram_type()),
            SegmentStatistics::Int64(statistics) => statistics.histogram().map(|h| h.histogram_type()),
            SegmentStatistics::Float(statistics) => statistics.histogram().map(|h| h.histogram_type()),
            SegmentStatistics::Double(statistics) => statistics.histogram().map(|h| h.histogram_type()),
            SegmentStatistics::Text(statistics) => statistics.histogram().map(|h| h.histogram_type()),
        }
    }

    /// Install a histogram, rejecting mismatched value types
    pub fn set_statistics_object(&mut self, object: HistogramObject) -> Result<()> {
        match (self, object) {
            (SegmentStatistics::Int32(statistics), HistogramObject::Int32(histogram)) => {
                statistics.histogram = Some(histogram);
                Ok(())
            }
            (SegmentStatistics::Int64(statistics), HistogramObject::Int64(histogram)) => {
                statistics.histogram = Some(histogram);
                Ok(())
            }
            (SegmentStatistics::Float(statistics), HistogramObject::Float(histogram)) => {
                statistics.histogram = Some(histogram);
                Ok(())
            }
            (SegmentStatistics::Double(statistics), HistogramObject::Double(histogram)) => {
                statistics.histogram = Some(histogram);
                Ok(())
            }
            (SegmentStatistics::Text(statistics), HistogramObject::Text(histogram)) => {
                statistics.histogram = Some(histogram);
                Ok(())
            }
            (statistics, object) => Err(Error::TypeMismatch {
                expected: statistics.data_type(),
                got: object.data_type(),
            }),
        }
    }

    /// Returns true only if no row of the segment can match the predicate
    ///
    /// Never errors: anything undecidable answers false.
    pub fn does_not_contain(
        &self,
        condition: PredicateCondition,
        value: &Value,
        value2: Option<&Value>,
    ) -> bool {
        fn typed<T: HistogramDomain>(
            statistics: &TypedSegmentStatistics<T>,
            condition: PredicateCondition,
            value: &Value,
            value2: Option<&Value>,
        ) -> bool {
            match condition {
                PredicateCondition::IsNull => return statistics.null_count() == 0,
                PredicateCondition::IsNotNull => {
                    return match statistics.histogram() {
                        Some(histogram) => {
                            histogram.total_count() == 0 && statistics.null_count() > 0
                        }
                        None => false,
                    }
                }
                _ => {}
            }
            let Some(histogram) = statistics.histogram() else {
                return false;
            };
            let Some(typed_value) = T::from_value(value) else {
                return false;
            };
            let typed_value2 = match value2 {
                Some(value2) => match T::from_value(value2) {
                    Some(typed) => Some(typed),
                    None => return false,
                },
                None => None,
            };
            histogram.does_not_contain(condition, &typed_value, typed_value2.as_ref())
        }

        match self {
            SegmentStatistics::Int32(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Int64(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Float(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Double(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Text(statistics) => typed(statistics, condition, value, value2),
        }
    }

    /// Estimate matching rows and distinct values for a predicate
    ///
    /// Errors on literal type mismatches and when no histogram is present.
    pub fn estimate_cardinality(
        &self,
        condition: PredicateCondition,
        value: &Value,
        value2: Option<&Value>,
    ) -> Result<CardinalityEstimate> {
        fn typed<T: HistogramDomain>(
            statistics: &TypedSegmentStatistics<T>,
            condition: PredicateCondition,
            value: &Value,
            value2: Option<&Value>,
        ) -> Result<CardinalityEstimate> {
            let histogram = statistics.histogram().ok_or_else(|| {
                Error::InvalidArgument("segment has no histogram".to_string())
            })?;
            match condition {
                PredicateCondition::IsNull => {
                    return Ok(CardinalityEstimate {
                        row_count: statistics.null_count() as f64,
                        distinct_count: if statistics.null_count() > 0 { 1.0 } else { 0.0 },
                    })
                }
                PredicateCondition::IsNotNull => {
                    return Ok(CardinalityEstimate {
                        row_count: histogram.total_count() as f64,
                        distinct_count: histogram.total_distinct_count() as f64,
                    })
                }
                _ => {}
            }
            let typed_value = T::from_value(value).ok_or(Error::TypeMismatch {
                expected: T::DATA_TYPE,
                got: value.data_type(),
            })?;
            let typed_value2 = value2
                .map(|value2| {
                    T::from_value(value2).ok_or(Error::TypeMismatch {
                        expected: T::DATA_TYPE,
                        got: value2.data_type(),
                    })
                })
                .transpose()?;
            Ok(histogram.estimate_cardinality(condition, &typed_value, typed_value2.as_ref()))
        }

        // LIKE over text gets the pattern-aware path.
        if let (
            SegmentStatistics::Text(statistics),
            PredicateCondition::Like | PredicateCondition::NotLike,
        ) = (self, condition)
        {
            let histogram = statistics.histogram().ok_or_else(|| {
                Error::InvalidArgument("segment has no histogram".to_string())
            })?;
            let pattern = value.as_str().ok_or(Error::TypeMismatch {
                expected: DataType::Text,
                got: value.data_type(),
            })?;
            let like = histogram.estimate_like(pattern);
            return Ok(match condition {
                PredicateCondition::Like => like,
                _ => CardinalityEstimate {
                    row_count: (histogram.total_count() as f64 - like.row_count).max(0.0),
                    distinct_count: (histogram.total_distinct_count() as f64
                        - like.distinct_count)
                        .max(0.0),
                },
            });
        }

        match self {
            SegmentStatistics::Int32(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Int64(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Float(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Double(statistics) => typed(statistics, condition, value, value2),
            SegmentStatistics::Text(statistics) => typed(statistics, condition, value, value2),
        }
    }

    /// Total non-null row count covered by the histogram, if present
    pub fn total_count(&self) -> Option<u64> {
        fn typed<T: HistogramDomain>(statistics: &TypedSegmentStatistics<T>) -> Option<u64> {
            statistics.histogram().map(|histogram| histogram.total_count())
        }
        match self {
            SegmentStatistics::Int32(statistics) => typed(statistics),
            SegmentStatistics::Int64(statistics) => typed(statistics),
            SegmentStatistics::Float(statistics) => typed(statistics),
            SegmentStatistics::Double(statistics) => typed(statistics),
            SegmentStatistics::Text(statistics) => typed(statistics),
        }
    }

    /// Scale the populated histogram and null count, returning new statistics
    pub fn scale_with_selectivity(&self, selectivity: f64) -> SegmentStatistics {
        fn typed<T: HistogramDomain>(
            statistics: &TypedSegmentStatistics<T>,
            selectivity: f64,
        ) -> TypedSegmentStatistics<T> {
            TypedSegmentStatistics {
                histogram: statistics
                    .histogram()
                    .map(|histogram| histogram.scale_with_selectivity(selectivity)),
                null_count: (statistics.null_count() as f64 * selectivity.clamp(0.0, 1.0)).round()
                    as u64,
            }
        }

        match self {
            SegmentStatistics::Int32(statistics) => {
                SegmentStatistics::Int32(typed(statistics, selectivity))
            }
            SegmentStatistics::Int64(statistics) => {
                SegmentStatistics::Int64(typed(statistics, selectivity))
            }
            SegmentStatistics::Float(statistics) => {
                SegmentStatistics::Float(typed(statistics, selectivity))
            }
            SegmentStatistics::Double(statistics) => {
                SegmentStatistics::Double(typed(statistics, selectivity))
            }
            SegmentStatistics::Text(statistics) => {
                SegmentStatistics::Text(typed(statistics, selectivity))
            }
        }
    }
}
