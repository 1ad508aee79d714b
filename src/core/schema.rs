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

//! Schema types for StrataDB - column definitions and table schemas
//!
//! A schema is an ordered sequence of column definitions; a column's
//! position in that sequence is its identity.

use std::fmt;

use rustc_hash::FxHashMap;

use super::error::{Error, Result};
use super::types::{ColumnId, DataType};

/// A column definition in a table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Data type of the column
    pub data_type: DataType,

    /// Whether the column can contain NULL values
    pub nullable: bool,
}

impl ColumnDefinition {
    /// Create a non-nullable column definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
        }
    }

    /// Create a nullable column definition
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

/// Ordered sequence of column definitions
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnDefinition>,
    by_name: FxHashMap<String, ColumnId>,
}

impl Schema {
    /// Create a schema from an ordered list of column definitions
    ///
    /// Column names must be unique.
    pub fn new(columns: Vec<ColumnDefinition>) -> Result<Self> {
        let mut by_name = FxHashMap::default();
        for (position, column) in columns.iter().enumerate() {
            if by_name.insert(column.name.clone(), position as ColumnId).is_some() {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, by_name })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column definition at the given position
    pub fn column(&self, column_id: ColumnId) -> Result<&ColumnDefinition> {
        self.columns
            .get(column_id as usize)
            .ok_or(Error::ColumnNotFound(column_id))
    }

    /// Position of the column with the given name
    pub fn column_id(&self, name: &str) -> Option<ColumnId> {
        self.by_name.get(name).copied()
    }

    /// Iterate over the column definitions in order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    /// The ordered column definitions
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_identity() {
        let schema = Schema::new(vec![
            ColumnDefinition::new("id", DataType::Int32),
            ColumnDefinition::nullable("name", DataType::Text),
        ])
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.column_id("name"), Some(1));
        assert_eq!(schema.column(0).unwrap().data_type, DataType::Int32);
        assert!(schema.column(1).unwrap().nullable);
        assert!(schema.column(2).is_err());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Schema::new(vec![
            ColumnDefinition::new("a", DataType::Int32),
            ColumnDefinition::new("a", DataType::Int64),
        ])
        .unwrap_err();
        assert_eq!(err, Error::DuplicateColumn("a".to_string()));
    }
}
