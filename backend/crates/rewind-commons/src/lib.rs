//! # rewind-commons
//!
//! Shared types for the rewind undo engine.
//!
//! This crate holds the leaf of the engine: the row-image model that undo
//! logs are made of, the value type used for images, bound parameters and
//! driver results, and the error taxonomy every other crate reports with.
//!
//! ## Row-Image Model
//!
//! - `ColumnMeta` / `TableMeta`: immutable table metadata (primary key non-empty)
//! - `Field` / `Row` / `TableRecords`: before and after snapshots
//! - `SqlUndoLog` / `BranchUndoLog`: undo records, compensated newest first
//!
//! ## Example Usage
//!
//! ```rust
//! use rewind_commons::models::{ColumnMeta, SqlValue, TableMeta, TableRecords};
//!
//! let meta = TableMeta::new(
//!     "t",
//!     vec![ColumnMeta::new("id", "INT", 1).auto_increment(), ColumnMeta::new("name", "VARCHAR", 2)],
//!     vec!["id".to_string()],
//! )
//! .unwrap();
//! let after = TableRecords::from_values(&meta, vec![vec![("id", SqlValue::Int(5)), ("name", SqlValue::from("a"))]]);
//! let keys = after.rows[0].ordered_primary_keys(&meta).unwrap();
//! assert_eq!(keys[0].value, SqlValue::Int(5));
//! ```

pub mod errors;
pub mod models;

pub use errors::{DriverError, Result, RewindError};
pub use models::{
    BranchUndoLog, ColumnMeta, Field, KeyType, ResultRows, Row, SqlType, SqlUndoLog, SqlValue,
    TableMeta, TableRecords,
};
