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

//! Logical plan nodes
//!
//! The minimal plan surface the optimizer rules walk: predicate chains over
//! validate and stored-table leaves, plus a projection node standing in for
//! every other operator. Nodes are shared (`Arc`); a node consumed by more
//! than one parent reports an output count above one, which pruning treats
//! as a barrier. The stored-table node owns the excluded-chunk metadata —
//! rules mutate that slot, never the plan structure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{ChunkId, ColumnId};
use crate::expression::PredicateExpression;

/// Shared handle to a plan node
pub type PlanNodeRef = Arc<PlanNode>;

/// Kinds of plan nodes the rules distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanNodeType {
    Predicate,
    Validate,
    StoredTable,
    Projection,
}

#[derive(Debug)]
enum PlanNodeKind {
    Predicate(PredicateExpression),
    Validate,
    StoredTable {
        table_name: String,
        excluded_chunk_ids: RwLock<Vec<ChunkId>>,
    },
    Projection(Vec<ColumnId>),
}

/// One node of a logical plan
#[derive(Debug)]
pub struct PlanNode {
    kind: PlanNodeKind,
    left: Option<PlanNodeRef>,
    output_count: AtomicUsize,
}

impl PlanNode {
    fn attach(kind: PlanNodeKind, left: Option<PlanNodeRef>) -> PlanNodeRef {
        if let Some(input) = &left {
            input.output_count.fetch_add(1, Ordering::Relaxed);
        }
        Arc::new(Self {
            kind,
            left,
            output_count: AtomicUsize::new(0),
        })
    }

    /// Leaf node referencing a stored table by name
    pub fn stored_table(table_name: impl Into<String>) -> PlanNodeRef {
        Self::attach(
            PlanNodeKind::StoredTable {
                table_name: table_name.into(),
                excluded_chunk_ids: RwLock::new(Vec::new()),
            },
            None,
        )
    }

    /// Predicate node over one input
    pub fn predicate(expression: PredicateExpression, input: PlanNodeRef) -> PlanNodeRef {
        Self::attach(PlanNodeKind::Predicate(expression), Some(input))
    }

    /// Validate node over one input
    pub fn validate(input: PlanNodeRef) -> PlanNodeRef {
        Self::attach(PlanNodeKind::Validate, Some(input))
    }

    /// Projection node over one input
    pub fn projection(columns: Vec<ColumnId>, input: PlanNodeRef) -> PlanNodeRef {
        Self::attach(PlanNodeKind::Projection(columns), Some(input))
    }

    /// The node's kind
    pub fn node_type(&self) -> PlanNodeType {
        match &self.kind {
            PlanNodeKind::Predicate(_) => PlanNodeType::Predicate,
            PlanNodeKind::Validate => PlanNodeType::Validate,
            PlanNodeKind::StoredTable { .. } => PlanNodeType::StoredTable,
            PlanNodeKind::Projection(_) => PlanNodeType::Projection,
        }
    }

    /// The node's single input, if any
    pub fn left_input(&self) -> Option<&PlanNodeRef> {
        self.left.as_ref()
    }

    /// How many parents consume this node's output
    pub fn output_count(&self) -> usize {
        self.output_count.load(Ordering::Relaxed)
    }

    /// The predicate expression of a predicate node
    pub fn as_predicate(&self) -> Option<&PredicateExpression> {
        match &self.kind {
            PlanNodeKind::Predicate(expression) => Some(expression),
            _ => None,
        }
    }

    /// The table name of a stored-table node
    pub fn table_name(&self) -> Option<&str> {
        match &self.kind {
            PlanNodeKind::StoredTable { table_name, .. } => Some(table_name),
            _ => None,
        }
    }

    /// The projected columns of a projection node
    pub fn projected_columns(&self) -> Option<&[ColumnId]> {
        match &self.kind {
            PlanNodeKind::Projection(columns) => Some(columns),
            _ => None,
        }
    }

    /// Excluded chunks recorded on a stored-table node (sorted)
    ///
    /// Empty for every other node kind.
    pub fn excluded_chunk_ids(&self) -> Vec<ChunkId> {
        match &self.kind {
            PlanNodeKind::StoredTable {
                excluded_chunk_ids, ..
            } => excluded_chunk_ids.read().clone(),
            _ => Vec::new(),
        }
    }

    /// Record excluded chunks on a stored-table node
    ///
    /// Ignored on every other node kind.
    pub fn set_excluded_chunk_ids(&self, mut chunk_ids: Vec<ChunkId>) {
        if let PlanNodeKind::StoredTable {
            excluded_chunk_ids, ..
        } = &self.kind
        {
            chunk_ids.sort_unstable();
            chunk_ids.dedup();
            *excluded_chunk_ids.write() = chunk_ids;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{PredicateCondition, Value};
    use crate::expression::Operand;

    use super::*;

    fn simple_predicate() -> PredicateExpression {
        PredicateExpression::binary(
            PredicateCondition::Equals,
            Operand::Column(0),
            Operand::Literal(Value::Int32(1)),
        )
    }

    #[test]
    fn output_counts_track_consumers() {
        let table = PlanNode::stored_table("t");
        let shared = PlanNode::predicate(simple_predicate(), Arc::clone(&table));
        let _left = PlanNode::predicate(simple_predicate(), Arc::clone(&shared));
        let _right = PlanNode::projection(vec![0], Arc::clone(&shared));

        assert_eq!(table.output_count(), 1);
        assert_eq!(shared.output_count(), 2);
    }

    #[test]
    fn excluded_chunks_live_on_stored_tables_only(){
        let table = PlanNode::stored_table("t");
        table.set_excluded_chunk_ids(vec![2, 0, 2]);
        assert_eq!(table.excluded_chunk_ids(), vec![0, 2]);

        let predicate = PlanNode::predicate(simple_predicate(), Arc::clone(&table));
        predicate.set_excluded_chunk_ids(vec![1]);
        assert!(predicate.excluded_chunk_ids().is_empty());
    }
}
