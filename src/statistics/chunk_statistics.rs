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

//! Per-chunk statistics: one optional slot per column
//!
//! Slots are parallel to the chunk's segments. An absent slot means
//! "unknown"; pruning never excludes on unknown.

use std::sync::Arc;

use crate::core::ColumnId;

use super::segment_statistics::SegmentStatistics;

/// Statistics for every column of one chunk
#[derive(Debug, Clone)]
pub struct ChunkStatistics {
    segment_statistics: Vec<Option<Arc<SegmentStatistics>>>,
}

impl ChunkStatistics {
    /// Create from per-column slots, parallel to the chunk's segments
    pub fn new(segment_statistics: Vec<Option<Arc<SegmentStatistics>>>) -> Self {
        Self { segment_statistics }
    }

    /// Statistics for the given column, if known
    pub fn segment_statistics(&self, column_id: ColumnId) -> Option<&Arc<SegmentStatistics>> {
        self.segment_statistics
            .get(column_id as usize)
            .and_then(|slot| slot.as_ref())
    }

    /// All per-column slots in column order
    pub fn slots(&self) -> &[Option<Arc<SegmentStatistics>>] {
        &self.segment_statistics
    }

    /// Number of column slots
    pub fn column_count(&self) -> usize {
        self.segment_statistics.len()
    }
}
