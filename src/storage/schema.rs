//! Database schema definitions

use rusqlite::Connection;

use crate::record::{Record, TableSchema};
use crate::{Error, Result};

/// The set of record types a store knows about
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tables: Vec<TableSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record type; registering the same table twice is a no-op
    pub fn register<R: Record>(mut self) -> Self {
        let schema = TableSchema::of::<R>();
        if !self.tables.iter().any(|t| t.name == schema.name) {
            self.tables.push(schema);
        }
        self
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn contains<R: Record>(&self) -> bool {
        self.tables.iter().any(|t| t.name == R::TABLE)
    }

    /// Fail with a validation error unless `R` was registered
    pub fn require<R: Record>(&self) -> Result<TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name == R::TABLE)
            .copied()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "record type `{}` is not registered with this store",
                    R::TABLE
                ))
            })
    }

    /// All schema creation statements
    pub fn all_schema_statements(&self) -> Vec<String> {
        self.tables.iter().map(TableSchema::create_table_sql).collect()
    }

    /// Create every registered table that does not exist yet
    pub fn create_all(&self, conn: &Connection) -> Result<()> {
        for stmt in self.all_schema_statements() {
            conn.execute(&stmt, [])?;
        }
        tracing::debug!(tables = self.tables.len(), "schema initialized");
        Ok(())
    }
}
