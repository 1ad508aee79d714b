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

//! Optimizer rules over logical plans
//!
//! - `chunk_pruning` - records statistics-proven empty chunks on
//!   stored-table nodes
//! - `cardinality` - histogram-backed scan output estimation

pub mod cardinality;
pub mod chunk_pruning;

use crate::plan::PlanNodeRef;
use crate::storage::storage_manager::StorageManager;

pub use cardinality::CardinalityEstimator;
pub use chunk_pruning::ChunkPruningRule;

/// Shared context handed to every rule application
pub struct OptimizerContext<'a> {
    pub storage: &'a StorageManager,
    pub cardinality_estimator: &'a CardinalityEstimator,
}

impl<'a> OptimizerContext<'a> {
    /// Create a context over a catalog and an estimator
    pub fn new(
        storage: &'a StorageManager,
        cardinality_estimator: &'a CardinalityEstimator,
    ) -> Self {
        Self {
            storage,
            cardinality_estimator,
        }
    }
}

/// An optimizer rule applied to a plan root
pub trait OptimizerRule {
    /// Rule name for diagnostics
    fn name(&self) -> &'static str;

    /// Apply to the subtree under `node`; returns whether the plan
    /// structure was modified
    fn apply(&self, node: &PlanNodeRef, context: &OptimizerContext<'_>) -> bool;
}
