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

//! Chunk pruning rule
//!
//! Walks chains of predicate nodes down to a stored-table leaf and records
//! on that leaf the chunks the per-chunk statistics prove empty. Exclusion
//! is always a safe under-approximation: missing statistics, non-value
//! operands and type mismatches all mean "cannot prove, don't exclude".
//! The rule mutates stored-table metadata only and never rewrites the plan.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::ChunkId;
use crate::executor::scan_predicate::OperatorScanPredicate;
use crate::plan::{PlanNodeRef, PlanNodeType};
use crate::statistics::ChunkStatistics;

use super::{OptimizerContext, OptimizerRule};

/// Records statistics-proven empty chunks on stored-table nodes
#[derive(Debug, Default)]
pub struct ChunkPruningRule;

impl ChunkPruningRule {
    /// Create the rule
    pub fn new() -> Self {
        Self
    }

    fn apply_to_inputs(&self, node: &PlanNodeRef, context: &OptimizerContext<'_>) -> bool {
        match node.left_input() {
            Some(input) => self.apply(input, context),
            None => false,
        }
    }

    /// Chunks a single predicate proves empty
    fn compute_exclude_list(
        &self,
        statistics: &[Option<Arc<ChunkStatistics>>],
        predicate_node: &PlanNodeRef,
    ) -> FxHashSet<ChunkId> {
        let Some(expression) = predicate_node.as_predicate() else {
            return FxHashSet::default();
        };
        let Some(operator_predicates) = OperatorScanPredicate::from_expression(expression) else {
            return FxHashSet::default();
        };

        let mut excluded = FxHashSet::default();
        for operator_predicate in &operator_predicates {
            // Column-column comparisons and other non-value operands prove
            // nothing; the whole predicate contributes the empty set.
            let Some(value) = operator_predicate.value.as_value() else {
                return FxHashSet::default();
            };
            let value2 = match &operator_predicate.value2 {
                Some(operand) => match operand.as_value() {
                    Some(value2) => Some(value2),
                    None => return FxHashSet::default(),
                },
                None => None,
            };

            for (chunk_index, chunk_statistics) in statistics.iter().enumerate() {
                let Some(chunk_statistics) = chunk_statistics else {
                    continue;
                };
                let Some(segment_statistics) =
                    chunk_statistics.segment_statistics(operator_predicate.column_id)
                else {
                    continue;
                };
                if segment_statistics.does_not_contain(
                    operator_predicate.condition,
                    value,
                    value2,
                ) {
                    excluded.insert(chunk_index as ChunkId);
                }
            }
        }
        excluded
    }
}

impl OptimizerRule for ChunkPruningRule {
    fn name(&self) -> &'static str {
        "ChunkPruning"
    }

    fn apply(&self, node: &PlanNodeRef, context: &OptimizerContext<'_>) -> bool {
        // Only predicate chains are of interest here.
        if node.node_type() != PlanNodeType::Predicate {
            return self.apply_to_inputs(node, context);
        }

        // Gather consecutive predicate nodes.
        let mut predicate_nodes: Vec<PlanNodeRef> = Vec::new();
        let mut current = Arc::clone(node);
        while current.node_type() == PlanNodeType::Predicate {
            predicate_nodes.push(Arc::clone(&current));
            let Some(input) = current.left_input() else {
                return self.apply_to_inputs(node, context);
            };
            let input = Arc::clone(input);
            // A node with multiple consumers ends the chain; other parents
            // may observe the table without this chain's predicates.
            if input.node_type() == PlanNodeType::Predicate && input.output_count() > 1 {
                return self.apply_to_inputs(node, context);
            }
            current = input;
        }

        // Skip over a validate node.
        if current.node_type() == PlanNodeType::Validate {
            match current.left_input() {
                Some(input) => current = Arc::clone(input),
                None => return self.apply_to_inputs(node, context),
            }
        }

        if current.node_type() != PlanNodeType::StoredTable {
            return self.apply_to_inputs(node, context);
        }
        let stored_table = current;
        let Some(table_name) = stored_table.table_name() else {
            return false;
        };
        let Ok(table) = context.storage.table(table_name) else {
            return false;
        };

        let statistics: Vec<Option<Arc<ChunkStatistics>>> = match table.table_statistics() {
            Some(table_statistics) => table_statistics.chunk_statistics().to_vec(),
            None => vec![None; table.chunk_count()],
        };

        // A chunk any predicate of the chain proves empty is excluded; the
        // predicates conjoin, so the union is safe.
        let mut excluded_chunk_ids: FxHashSet<ChunkId> = FxHashSet::default();
        for predicate_node in &predicate_nodes {
            excluded_chunk_ids.extend(self.compute_exclude_list(&statistics, predicate_node));
        }

        let already_excluded = stored_table.excluded_chunk_ids();
        if !already_excluded.is_empty() {
            // TODO: intersecting keeps only chunks both passes proved empty;
            // the union of the two proof sets would prune strictly more and
            // stay sound. Revisit once the provenance of pre-existing
            // exclusion sets is pinned down.
            let intersection: Vec<ChunkId> = already_excluded
                .into_iter()
                .filter(|chunk_id| excluded_chunk_ids.contains(chunk_id))
                .collect();
            stored_table.set_excluded_chunk_ids(intersection);
        } else {
            stored_table.set_excluded_chunk_ids(excluded_chunk_ids.into_iter().collect());
        }

        // Metadata only; the plan structure is never modified.
        false
    }
}
