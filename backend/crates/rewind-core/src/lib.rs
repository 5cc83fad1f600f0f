//! rewind-core - the undo engine
//!
//! Given the statements a branch transaction executed and the row images
//! captured around them, rewind resolves the primary keys INSERTs actually
//! persisted and synthesizes the compensating statements that restore the
//! before state if the global transaction rolls back.
//!
//! - [`pk`]: primary-key resolution, generated keys and the step cache
//! - [`undo`]: undo log building, compensating statements, image queries and
//!   undo data validation
//! - [`dialects`] and [`registry`]: per-product plugins (db2, mysql, postgresql)
//! - [`engine::UndoEngine`]: the facade tying them together
//!
//! # Example
//!
//! ```
//! use rewind_commons::{ColumnMeta, SqlType, SqlValue, TableMeta, TableRecords};
//! use rewind_configs::{EngineConfig, ResourceSettings};
//! use rewind_core::{MemoryTableMetaProvider, UndoEngine};
//! use std::sync::Arc;
//!
//! let meta = TableMeta::new(
//!     "T",
//!     vec![ColumnMeta::new("id", "BIGINT", 1), ColumnMeta::new("v", "VARCHAR", 2)],
//!     vec!["id".to_string()],
//! )
//! .unwrap();
//! let provider = Arc::new(MemoryTableMetaProvider::new());
//! provider.insert(meta.clone());
//!
//! let engine = UndoEngine::new(EngineConfig::default(), provider);
//! engine.register_resource("ledger", ResourceSettings::new("db2"));
//!
//! let before = TableRecords::from_values(&meta, vec![vec![("id", SqlValue::Int(1)), ("v", "x".into())]]);
//! let after = TableRecords::from_values(&meta, vec![vec![("id", SqlValue::Int(1)), ("v", "y".into())]]);
//! let undo_log = engine.build_undo_log(SqlType::Update, before, after).unwrap();
//!
//! let undo = engine.synthesize_undo_statement("ledger", &undo_log).unwrap();
//! assert_eq!(undo.sql, "UPDATE T SET v = ? WHERE id = ?");
//! assert_eq!(undo.params, vec![SqlValue::from("x"), SqlValue::Int(1)]);
//! ```

pub mod collaborators;
pub mod dialects;
pub mod engine;
pub mod logging;
pub mod pk;
pub mod registry;
pub mod undo;

pub use collaborators::{
    CurrentImageReader, GeneratedKeys, MemoryTableMetaProvider, StatementSession, TableMetaProvider,
};
pub use dialects::{DialectPlugin, DialectProfile};
pub use engine::UndoEngine;
pub use pk::{AutoIncrementStepCache, PkValues};
pub use registry::DialectRegistry;
pub use undo::{ImageCheck, UndoStatement};
