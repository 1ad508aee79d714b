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

//! Histogram-backed scan cardinality estimation
//!
//! Estimates the output row count of a predicate chain over a stored table.
//! The first predicate queries each chunk's histogram directly; follow-up
//! predicates query statistics scaled by the selectivity accumulated so
//! far. Anything unknown (no statistics, non-value operands, type
//! mismatches) estimates with selectivity one, keeping estimates an upper
//! bound rather than a guess.

use crate::executor::scan_predicate::OperatorScanPredicate;
use crate::statistics::SegmentStatistics;
use crate::storage::table::Table;

/// Scan output estimator over per-chunk histograms
#[derive(Debug, Default)]
pub struct CardinalityEstimator;

impl CardinalityEstimator {
    /// Create an estimator
    pub fn new() -> Self {
        Self
    }

    /// Estimated output rows of scanning `table` under conjoined predicates
    pub fn estimate_scan_output(
        &self,
        table: &Table,
        predicates: &[OperatorScanPredicate],
    ) -> f64 {
        let chunks = table.chunks();
        let Some(table_statistics) = table.table_statistics() else {
            return table.row_count() as f64;
        };

        let mut total = 0.0f64;
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let chunk_rows = chunk.size() as f64;
            let Some(chunk_statistics) =
                table_statistics.chunk_statistics_for(chunk_index as u32)
            else {
                total += chunk_rows;
                continue;
            };

            let mut selectivity = 1.0f64;
            for predicate in predicates {
                let Some(segment_statistics) =
                    chunk_statistics.segment_statistics(predicate.column_id)
                else {
                    continue;
                };
                selectivity *=
                    predicate_selectivity(segment_statistics, predicate, selectivity);
            }
            total += chunk_rows * selectivity;
        }
        total
    }
}

/// Selectivity of one predicate against (scaled) segment statistics
fn predicate_selectivity(
    statistics: &SegmentStatistics,
    predicate: &OperatorScanPredicate,
    accumulated_selectivity: f64,
) -> f64 {
    let Some(value) = predicate.value.as_value() else {
        return 1.0;
    };
    let value2 = predicate
        .value2
        .as_ref()
        .and_then(|operand| operand.as_value());

    let scaled = statistics.scale_with_selectivity(accumulated_selectivity);
    let Ok(estimate) = scaled.estimate_cardinality(predicate.condition, value, value2) else {
        return 1.0;
    };
    let covered = scaled.total_count().unwrap_or(0) + scaled.null_count();
    if covered == 0 {
        return 1.0;
    }
    (estimate.row_count / covered as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core::{
        ColumnDefinition, DataType, PredicateCondition, Schema, Value,
    };
    use crate::executor::scan_predicate::ScanOperand;

    use super::*;

    fn table_with_values(values: std::ops::Range<i32>) -> Table {
        let table = Table::new(Arc::new(
            Schema::new(vec![ColumnDefinition::new("v", DataType::Int32)]).unwrap(),
        ));
        let rows: Vec<Vec<Value>> = values.map(|value| vec![Value::Int32(value)]).collect();
        table.append_rows(&rows).unwrap();
        table.generate_statistics().unwrap();
        table
    }

    fn predicate(condition: PredicateCondition, value: i32) -> OperatorScanPredicate {
        OperatorScanPredicate {
            column_id: 0,
            condition,
            value: ScanOperand::Value(Value::Int32(value)),
            value2: None,
        }
    }

    #[test]
    fn range_estimates_track_the_data() {
        let table = table_with_values(0..100);
        let estimator = CardinalityEstimator::new();

        let half = estimator
            .estimate_scan_output(&table, &[predicate(PredicateCondition::LessThan, 50)]);
        assert!((30.0..=70.0).contains(&half), "estimate was {half}");

        let none = estimator
            .estimate_scan_output(&table, &[predicate(PredicateCondition::GreaterThan, 1000)]);
        assert!(none < 1.0, "estimate was {none}");
    }

    #[test]
    fn conjoined_predicates_shrink_the_estimate() {
        let table = table_with_values(0..100);
        let estimator = CardinalityEstimator::new();

        let one = estimator
            .estimate_scan_output(&table, &[predicate(PredicateCondition::LessThan, 50)]);
        let both = estimator.estimate_scan_output(
            &table,
            &[
                predicate(PredicateCondition::LessThan, 50),
                predicate(PredicateCondition::GreaterThanEquals, 25),
            ],
        );
        assert!(both < one);
    }

    #[test]
    fn missing_statistics_estimate_the_full_table() {
        let table = Table::new(Arc::new(
            Schema::new(vec![ColumnDefinition::new("v", DataType::Int32)]).unwrap(),
        ));
        table.append_rows(&[vec![Value::Int32(1)]]).unwrap();
        let estimator = CardinalityEstimator::new();
        let estimate = estimator
            .estimate_scan_output(&table, &[predicate(PredicateCondition::Equals, 7)]);
        assert_eq!(estimate, 1.0);
    }
}
