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

//! Storage manager: the name -> table catalog
//!
//! Stored-table plan nodes carry table names; the optimizer and scans
//! resolve them here.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{Error, Result};

use super::table::Table;

/// Catalog of named tables
#[derive(Debug, Default)]
pub struct StorageManager {
    tables: RwLock<FxHashMap<String, Arc<Table>>>,
}

impl StorageManager {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under a name
    pub fn add_table(&self, name: impl Into<String>, table: Table) -> Result<Arc<Table>> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        let table = Arc::new(table);
        tables.insert(name, Arc::clone(&table));
        Ok(table)
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Returns true if a table with the given name exists
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Remove a table from the catalog
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// All table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{ColumnDefinition, DataType, Schema};

    use super::*;

    fn empty_table() -> Table {
        Table::new(Arc::new(
            Schema::new(vec![ColumnDefinition::new("id", DataType::Int32)]).unwrap(),
        ))
    }

    #[test]
    fn add_get_drop() {
        let manager = StorageManager::new();
        manager.add_table("orders", empty_table()).unwrap();

        assert!(manager.has_table("orders"));
        assert!(manager.table("orders").is_ok());
        assert_eq!(
            manager.add_table("orders", empty_table()).unwrap_err(),
            Error::TableAlreadyExists("orders".to_string())
        );

        manager.drop_table("orders").unwrap();
        assert_eq!(
            manager.table("orders").unwrap_err(),
            Error::TableNotFound("orders".to_string())
        );
    }
}
