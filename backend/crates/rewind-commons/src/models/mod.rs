//! Row-image model shared by every rewind crate.

pub mod row;
pub mod table_meta;
pub mod undo_log;
pub mod value;

pub use row::{Field, KeyType, Row, TableRecords};
pub use table_meta::{ColumnMeta, TableMeta};
pub use undo_log::{BranchUndoLog, SqlType, SqlUndoLog};
pub use value::{ResultRows, SqlValue};
