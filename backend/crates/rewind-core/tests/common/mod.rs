//! Shared fixtures for rewind-core integration tests

#![allow(dead_code)]

use rewind_commons::{
    ColumnMeta, DriverError, ResultRows, SqlValue, TableMeta, TableRecords,
};
use rewind_configs::{EngineConfig, ResourceSettings};
use rewind_core::{
    CurrentImageReader, GeneratedKeys, MemoryTableMetaProvider, StatementSession, UndoEngine,
    UndoStatement,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `T(id BIGINT auto_increment, v VARCHAR)` keyed by `id`
pub fn auto_increment_table() -> TableMeta {
    TableMeta::new(
        "T",
        vec![
            ColumnMeta::new("id", "BIGINT", 1).auto_increment(),
            ColumnMeta::new("v", "VARCHAR", 2),
        ],
        vec!["id".to_string()],
    )
    .unwrap()
}

/// `order_line(order_id, line_no, qty)` keyed by `(order_id, line_no)`
pub fn composite_table() -> TableMeta {
    TableMeta::new(
        "order_line",
        vec![
            ColumnMeta::new("order_id", "BIGINT", 1),
            ColumnMeta::new("line_no", "INT", 2),
            ColumnMeta::new("qty", "INT", 3),
        ],
        vec!["order_id".to_string(), "line_no".to_string()],
    )
    .unwrap()
}

/// `code_book(code, label)` keyed by a plain `code` column
pub fn plain_key_table(default_code: Option<&str>) -> TableMeta {
    let code = ColumnMeta::new("code", "VARCHAR", 1);
    let code = match default_code {
        Some(default) => code.with_default(default),
        None => code,
    };
    TableMeta::new(
        "code_book",
        vec![code, ColumnMeta::new("label", "VARCHAR", 2)],
        vec!["code".to_string()],
    )
    .unwrap()
}

/// Engine with one resource per built-in dialect: `db2-res`, `mysql-res`, `pg-res`.
pub fn engine_with(config: EngineConfig, tables: Vec<TableMeta>) -> UndoEngine {
    init_logger();
    let provider = Arc::new(MemoryTableMetaProvider::new());
    for table in tables {
        provider.insert(table);
    }
    let engine = UndoEngine::new(config, provider);
    engine.register_resource("db2-res", ResourceSettings::new("db2"));
    engine.register_resource("mysql-res", ResourceSettings::new("mysql"));
    engine.register_resource("pg-res", ResourceSettings::new("postgresql"));
    engine
}

pub fn engine() -> UndoEngine {
    engine_with(
        EngineConfig::default(),
        vec![auto_increment_table(), composite_table(), plain_key_table(None)],
    )
}

pub fn ints(values: &[i64]) -> Vec<SqlValue> {
    values.iter().map(|v| SqlValue::Int(*v)).collect()
}

/// Driver session replaying scripted answers and recording every call.
pub struct ScriptedSession {
    pub generated: GeneratedKeys,
    pub update_count: i64,
    pub query_results: HashMap<String, Result<ResultRows, DriverError>>,
    pub queries: Vec<String>,
    pub generated_key_calls: usize,
}

impl ScriptedSession {
    pub fn new(generated: GeneratedKeys, update_count: i64) -> Self {
        Self {
            generated,
            update_count,
            query_results: HashMap::new(),
            queries: Vec::new(),
            generated_key_calls: 0,
        }
    }

    pub fn with_keys(keys: &[i64], update_count: i64) -> Self {
        Self::new(
            GeneratedKeys::Available(ResultRows::single_column(ints(keys))),
            update_count,
        )
    }

    pub fn answering(mut self, sql: &str, result: Result<ResultRows, DriverError>) -> Self {
        self.query_results.insert(sql.to_string(), result);
        self
    }

    pub fn driver_calls(&self) -> usize {
        self.generated_key_calls + self.queries.len()
    }
}

impl StatementSession for ScriptedSession {
    fn execute_query(&mut self, sql: &str) -> Result<ResultRows, DriverError> {
        self.queries.push(sql.to_string());
        self.query_results
            .get(sql)
            .cloned()
            .unwrap_or_else(|| Err(DriverError::new(format!("unexpected query: {}", sql))))
    }

    fn generated_keys(&mut self) -> GeneratedKeys {
        self.generated_key_calls += 1;
        self.generated.clone()
    }

    fn update_count(&self) -> i64 {
        self.update_count
    }
}

/// Current-image reader answering queries in order.
pub struct ScriptedReader {
    pub images: VecDeque<TableRecords>,
    pub queries: Vec<UndoStatement>,
}

impl ScriptedReader {
    pub fn new(images: Vec<TableRecords>) -> Self {
        Self {
            images: images.into(),
            queries: Vec::new(),
        }
    }
}

impl CurrentImageReader for ScriptedReader {
    fn current_image(
        &mut self,
        meta: &TableMeta,
        query: &UndoStatement,
    ) -> Result<TableRecords, DriverError> {
        self.queries.push(query.clone());
        Ok(self
            .images
            .pop_front()
            .unwrap_or_else(|| TableRecords::empty(meta.table_name())))
    }
}
