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

//! Per-table statistics: one optional chunk-statistics slot per chunk
//!
//! `chunk_statistics[i]` describes `chunks[i]`; the table refreshes this
//! object whenever a chunk is appended or re-encoded.

use std::sync::Arc;

use crate::core::ChunkId;
use crate::storage::chunk::Chunk;

use super::chunk_statistics::ChunkStatistics;

/// Statistics for every chunk of one table
#[derive(Debug, Clone)]
pub struct TableStatistics {
    chunk_statistics: Vec<Option<Arc<ChunkStatistics>>>,
    row_count: u64,
}

impl TableStatistics {
    /// Create from per-chunk slots, parallel to the table's chunks
    pub fn new(chunk_statistics: Vec<Option<Arc<ChunkStatistics>>>, row_count: u64) -> Self {
        Self {
            chunk_statistics,
            row_count,
        }
    }

    /// Collect the statistics attached to each chunk
    pub fn from_chunks(chunks: &[Arc<Chunk>]) -> Self {
        Self {
            chunk_statistics: chunks.iter().map(|chunk| chunk.statistics()).collect(),
            row_count: chunks.iter().map(|chunk| chunk.size() as u64).sum(),
        }
    }

    /// Statistics for the given chunk, if known
    pub fn chunk_statistics_for(&self, chunk_id: ChunkId) -> Option<&Arc<ChunkStatistics>> {
        self.chunk_statistics
            .get(chunk_id as usize)
            .and_then(|slot| slot.as_ref())
    }

    /// All per-chunk slots in chunk order
    pub fn chunk_statistics(&self) -> &[Option<Arc<ChunkStatistics>>] {
        &self.chunk_statistics
    }

    /// Total row count at generation time
    pub fn row_count(&self) -> u64 {
        self.row_count
    }
}
