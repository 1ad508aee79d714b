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

//! Execution layer: normalized scan predicates and the table scan
//!
//! - [`scan_predicate`] - the `(column, condition, value, value2?)` form
//!   shared by pruning and scans
//! - [`like`] - SQL LIKE pattern matching
//! - [`table_scan`] - predicate scans emitting reference-segment tables

pub mod like;
pub mod scan_predicate;
pub mod table_scan;

pub use like::LikeMatcher;
pub use scan_predicate::{OperatorScanPredicate, ScanOperand, ScanPredicates};
pub use table_scan::TableScan;
