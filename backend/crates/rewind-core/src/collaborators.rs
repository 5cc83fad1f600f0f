//! Interfaces the engine consumes from its surroundings.
//!
//! Table metadata, the driver session that executed the original statement,
//! and read access to the rows currently stored are all owned by the caller.

use dashmap::DashMap;
use rewind_commons::{DriverError, Result, ResultRows, RewindError, TableMeta, TableRecords};
use std::sync::Arc;

use crate::undo::UndoStatement;

/// Source of table metadata
pub trait TableMetaProvider: Send + Sync {
    /// Metadata of `table_name`; fails with [`RewindError::TableNotFound`]
    /// when the table does not exist.
    fn table_meta(&self, table_name: &str) -> Result<Arc<TableMeta>>;
}

/// Outcome of asking the driver for the keys generated by the last statement
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedKeys {
    Available(ResultRows),
    /// The statement was executed without requesting generated keys.
    /// Recoverable through the dialect's last-identity query.
    NotRequested,
    Failed(DriverError),
}

/// The driver session that just executed the original statement.
///
/// Every call happens on the same connection, right after execution, so no
/// other statement interleaves between the insert and a fallback identity
/// query issued through [`execute_query`](Self::execute_query).
pub trait StatementSession {
    fn execute_query(&mut self, sql: &str) -> std::result::Result<ResultRows, DriverError>;

    fn generated_keys(&mut self) -> GeneratedKeys;

    /// Rows affected by the original statement
    fn update_count(&self) -> i64;
}

/// Reads the rows currently stored, used to check an undo log before compensating it.
pub trait CurrentImageReader {
    /// Run `query` and return its rows as an image of `meta`'s table.
    fn current_image(
        &mut self,
        meta: &TableMeta,
        query: &UndoStatement,
    ) -> std::result::Result<TableRecords, DriverError>;
}

/// Metadata provider backed by an in-memory map, keyed case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryTableMetaProvider {
    tables: DashMap<String, Arc<TableMeta>>,
}

impl MemoryTableMetaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, meta: TableMeta) {
        self.tables.insert(meta.table_name().to_lowercase(), Arc::new(meta));
    }

    pub fn remove(&self, table_name: &str) -> Option<Arc<TableMeta>> {
        self.tables.remove(&table_name.to_lowercase()).map(|(_, meta)| meta)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableMetaProvider for MemoryTableMetaProvider {
    fn table_meta(&self, table_name: &str) -> Result<Arc<TableMeta>> {
        self.tables
            .get(&table_name.to_lowercase())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RewindError::TableNotFound(table_name.to_string()))
    }
}
