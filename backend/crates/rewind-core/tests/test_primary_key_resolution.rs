//! Integration tests for primary-key resolution
//!
//! Tests cover:
//! - Explicit keys resolved without driver calls
//! - Generated keys, the last-identity fallback and driver failures
//! - Batch INSERT key synthesis and the auto-increment step cache
//! - Composite keys, mixed keys and default-valued keys

mod common;

use common::*;
use rewind_commons::{DriverError, ResultRows, RewindError, SqlType, SqlValue};
use rewind_configs::{EngineConfig, ResourceSettings};
use rewind_core::{GeneratedKeys, PkValues, UndoEngine};
use std::sync::Arc;
use std::thread;

const MYSQL_STEP_QUERY: &str = "SHOW VARIABLES LIKE 'auto_increment_increment'";

fn resolve(
    engine: &UndoEngine,
    resource: &str,
    sql: &str,
    params: &[SqlValue],
    session: &mut ScriptedSession,
) -> Result<PkValues, RewindError> {
    let params = params.to_vec();
    let statement = engine.parse_statement(resource, sql)?;
    engine.resolve_primary_keys(resource, &statement, &params, session)
}

fn step_answer(step: &str) -> Result<ResultRows, DriverError> {
    Ok(ResultRows::new(vec![vec![
        SqlValue::from("auto_increment_increment"),
        SqlValue::from(step),
    ]]))
}

#[test]
fn test_generated_key_then_delete_compensation() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[5], 1);

    let pk = resolve(&engine, "db2-res", "INSERT INTO T(v) VALUES ('a')", &[], &mut session).unwrap();
    assert_eq!(pk, PkValues::from([("id".to_string(), ints(&[5]))]));
    assert_eq!(session.generated_key_calls, 1);
    assert!(session.queries.is_empty());

    let meta = auto_increment_table();
    let after = rewind_commons::TableRecords::from_values(
        &meta,
        vec![vec![("id", SqlValue::Int(5)), ("v", SqlValue::from("a"))]],
    );
    let log = engine
        .build_undo_log(SqlType::Insert, rewind_commons::TableRecords::empty("T"), after)
        .unwrap();
    let undo = engine.synthesize_undo_statement("db2-res", &log).unwrap();
    assert_eq!(undo.sql, "DELETE FROM T WHERE id = ?");
    assert_eq!(undo.params, ints(&[5]));
}

#[test]
fn test_explicit_keys_make_no_driver_calls() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 2);

    let pk = resolve(
        &engine,
        "mysql-res",
        "INSERT INTO T (id, v) VALUES (?, ?), (8, 'b')",
        &[SqlValue::Int(7), SqlValue::from("a")],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["id"], ints(&[7, 8]));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_postgres_numbered_parameters() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let pk = resolve(
        &engine,
        "pg-res",
        "INSERT INTO T (id, v) VALUES ($2, $1)",
        &[SqlValue::from("a"), SqlValue::Int(9)],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["id"], ints(&[9]));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_literal_key_beyond_i64_keeps_every_digit() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 2);
    let wide = "12345678901234567890123";

    let pk = resolve(
        &engine,
        "db2-res",
        &format!("INSERT INTO T (id, v) VALUES ({}, 'a'), (-9223372036854775808, 'b')", wide),
        &[],
        &mut session,
    )
    .unwrap();
    assert_eq!(
        pk["id"],
        vec![SqlValue::Decimal(wide.to_string()), SqlValue::Int(i64::MIN)]
    );
    assert_eq!(session.driver_calls(), 0);

    let queries = engine.select_by_primary_keys("db2-res", "T", &pk).unwrap();
    assert_eq!(queries[0].params[0].to_string(), wide);
}

#[test]
fn test_null_key_uses_generated_keys() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[31], 1);

    let pk = resolve(
        &engine,
        "pg-res",
        "INSERT INTO T (id, v) VALUES (NULL, $1)",
        &[SqlValue::from("a")],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["id"], ints(&[31]));
    assert_eq!(session.generated_key_calls, 1);
}

#[test]
fn test_fallback_identity_query_runs_once() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1).answering(
        "VALUES IDENTITY_VAL_LOCAL()",
        Ok(ResultRows::single_column(ints(&[42]))),
    );

    let pk = resolve(&engine, "db2-res", "INSERT INTO T (v) VALUES (?)", &[SqlValue::from("a")], &mut session)
        .unwrap();
    assert_eq!(pk["id"], ints(&[42]));
    assert_eq!(session.generated_key_calls, 1);
    assert_eq!(session.queries, vec!["VALUES IDENTITY_VAL_LOCAL()"]);
}

#[test]
fn test_fallback_query_failure_is_driver_error() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(&engine, "pg-res", "INSERT INTO T (v) VALUES ('a')", &[], &mut session).unwrap_err();
    assert!(matches!(err, RewindError::Driver(_)));
    assert_eq!(session.queries, vec!["SELECT lastval()"]);
}

#[test]
fn test_generated_keys_failure_is_driver_error() {
    let engine = engine();
    let mut session = ScriptedSession::new(
        GeneratedKeys::Failed(DriverError::with_state("08003", "connection closed")),
        1,
    );

    let err = resolve(&engine, "mysql-res", "INSERT INTO T (v) VALUES ('a')", &[], &mut session).unwrap_err();
    match err {
        RewindError::Driver(driver) => assert_eq!(driver.sql_state.as_deref(), Some("08003")),
        other => panic!("expected Driver error, got {:?}", other),
    }
    assert!(session.queries.is_empty());
}

#[test]
fn test_key_count_mismatch_is_invariant_violation() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[1, 2], 3);

    let err = resolve(
        &engine,
        "db2-res",
        "INSERT INTO T (v) VALUES ('a'), ('b'), ('c')",
        &[],
        &mut session,
    )
    .unwrap_err();
    assert!(matches!(err, RewindError::InvariantViolation(_)));
}

#[test]
fn test_batch_insert_uses_default_step_without_step_query() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[10], 3);

    let pk = resolve(
        &engine,
        "db2-res",
        "INSERT INTO T (v) VALUES ('a'), ('b'), ('c')",
        &[],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["id"], ints(&[10, 11, 12]));
    assert!(session.queries.is_empty());
}

#[test]
fn test_batch_insert_step_queried_once_and_cached() {
    let engine = engine();
    let sql = "INSERT INTO T (v) VALUES ('a'), ('b'), ('c')";

    let mut first = ScriptedSession::with_keys(&[10], 3).answering(MYSQL_STEP_QUERY, step_answer("5"));
    let pk = resolve(&engine, "mysql-res", sql, &[], &mut first).unwrap();
    assert_eq!(pk["id"], ints(&[10, 15, 20]));
    assert_eq!(first.queries, vec![MYSQL_STEP_QUERY]);

    let mut second = ScriptedSession::with_keys(&[100], 2);
    let pk = resolve(&engine, "mysql-res", "INSERT INTO T (v) VALUES ('d'), ('e')", &[], &mut second).unwrap();
    assert_eq!(pk["id"], ints(&[100, 105]));
    assert!(second.queries.is_empty());
    assert_eq!(engine.step_cache().get("mysql-res"), Some(5));
}

#[test]
fn test_batch_size_follows_update_count_then_row_count() {
    let engine = engine();
    let sql = "INSERT INTO T (v) VALUES ('a'), ('b')";

    // update count unknown: fall back to the VALUES rows
    let mut session = ScriptedSession::with_keys(&[4], -1).answering(MYSQL_STEP_QUERY, step_answer("1"));
    let pk = resolve(&engine, "mysql-res", sql, &[], &mut session).unwrap();
    assert_eq!(pk["id"], ints(&[4, 5]));
}

#[test]
fn test_unusable_step_answer_falls_back_to_default() {
    let mut config = EngineConfig::default();
    config.resolver.default_auto_increment_step = 3;
    let engine = engine_with(config, vec![auto_increment_table()]);

    let mut session = ScriptedSession::with_keys(&[1], 2).answering(MYSQL_STEP_QUERY, Ok(ResultRows::default()));
    let pk = resolve(&engine, "mysql-res", "INSERT INTO T (v) VALUES ('a'), ('b')", &[], &mut session).unwrap();
    assert_eq!(pk["id"], ints(&[1, 4]));
}

#[test]
fn test_configured_step_skips_step_query() {
    let engine = engine();
    engine.register_resource("mysql-stepped", ResourceSettings::new("mysql").with_step(2));

    let mut session = ScriptedSession::with_keys(&[10], 3);
    let pk = resolve(
        &engine,
        "mysql-stepped",
        "INSERT INTO T (v) VALUES ('a'), ('b'), ('c')",
        &[],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["id"], ints(&[10, 12, 14]));
    assert!(session.queries.is_empty());
}

#[test]
fn test_unregister_forgets_cached_step() {
    let engine = engine();
    let sql = "INSERT INTO T (v) VALUES ('a'), ('b')";

    let mut session = ScriptedSession::with_keys(&[1], 2).answering(MYSQL_STEP_QUERY, step_answer("2"));
    resolve(&engine, "mysql-res", sql, &[], &mut session).unwrap();
    assert_eq!(engine.step_cache().get("mysql-res"), Some(2));

    engine.unregister_resource("mysql-res");
    assert_eq!(engine.step_cache().get("mysql-res"), None);

    engine.register_resource("mysql-res", ResourceSettings::new("mysql"));
    let mut session = ScriptedSession::with_keys(&[1], 2).answering(MYSQL_STEP_QUERY, step_answer("4"));
    let pk = resolve(&engine, "mysql-res", sql, &[], &mut session).unwrap();
    assert_eq!(pk["id"], ints(&[1, 5]));
    assert_eq!(session.queries.len(), 1);
}

#[test]
fn test_concurrent_first_use_queries_step_once() {
    let engine = Arc::new(engine());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let first = 100 * (i + 1);
                let mut session =
                    ScriptedSession::with_keys(&[first], 2).answering(MYSQL_STEP_QUERY, step_answer("7"));
                let pk = resolve(&engine, "mysql-res", "INSERT INTO T (v) VALUES ('a'), ('b')", &[], &mut session)
                    .unwrap();
                assert_eq!(pk["id"], ints(&[first, first + 7]));
                session.queries.len()
            })
        })
        .collect();

    let step_queries: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(step_queries, 1);
}

#[test]
fn test_composite_key_rejected_on_db2() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(
        &engine,
        "db2-res",
        "INSERT INTO order_line (order_id, line_no, qty) VALUES (1, 1, 3)",
        &[],
        &mut session,
    )
    .unwrap_err();
    assert_eq!(
        err,
        RewindError::unsupported("composite primary key is not supported in db2")
    );
}

#[test]
fn test_composite_key_explicit_values() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 2);

    let pk = resolve(
        &engine,
        "mysql-res",
        "INSERT INTO order_line (qty, line_no, order_id) VALUES (3, 1, ?), (4, 2, ?)",
        &ints(&[9, 9]),
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["order_id"], ints(&[9, 9]));
    assert_eq!(pk["line_no"], ints(&[1, 2]));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_composite_key_with_generated_value_rejected() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[1], 1);

    let err = resolve(
        &engine,
        "pg-res",
        "INSERT INTO order_line (order_id, line_no, qty) VALUES (nextval('orders_seq'), 1, 3)",
        &[],
        &mut session,
    )
    .unwrap_err();
    assert!(matches!(err, RewindError::UnsupportedConstruct(_)));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_mixed_explicit_and_generated_keys_rejected() {
    let engine = engine();
    let mut session = ScriptedSession::with_keys(&[2], 2);

    let err = resolve(
        &engine,
        "mysql-res",
        "INSERT INTO T (id, v) VALUES (1, 'a'), (NULL, 'b')",
        &[],
        &mut session,
    )
    .unwrap_err();
    assert!(matches!(err, RewindError::UnsupportedConstruct(msg) if msg.contains("mixing explicit and generated")));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_omitted_key_with_declared_default_rejected() {
    let engine = engine_with(EngineConfig::default(), vec![plain_key_table(Some("'NONE'"))]);
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(&engine, "pg-res", "INSERT INTO code_book (label) VALUES ('x')", &[], &mut session)
        .unwrap_err();
    assert!(matches!(err, RewindError::UnsupportedConstruct(msg) if msg.contains("default value is not yet supported")));
}

#[test]
fn test_omitted_key_without_generation_is_invariant_violation() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(&engine, "mysql-res", "INSERT INTO code_book (label) VALUES ('x')", &[], &mut session)
        .unwrap_err();
    assert!(matches!(err, RewindError::InvariantViolation(_)));
    assert_eq!(session.driver_calls(), 0);
}

#[test]
fn test_computed_key_read_from_generated_keys() {
    let engine = engine();
    let mut session = ScriptedSession::new(
        GeneratedKeys::Available(ResultRows::single_column(vec![SqlValue::from("A")])),
        1,
    );

    let pk = resolve(
        &engine,
        "pg-res",
        "INSERT INTO code_book (code, label) VALUES (upper($1), $2)",
        &[SqlValue::from("a"), SqlValue::from("b")],
        &mut session,
    )
    .unwrap();
    assert_eq!(pk["code"], vec![SqlValue::from("A")]);
}

#[test]
fn test_non_insert_statement_rejected() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(&engine, "mysql-res", "DELETE FROM T WHERE id = 1", &[], &mut session).unwrap_err();
    assert!(matches!(err, RewindError::InvariantViolation(_)));
}

#[test]
fn test_unknown_table() {
    let engine = engine();
    let mut session = ScriptedSession::new(GeneratedKeys::NotRequested, 1);

    let err = resolve(&engine, "mysql-res", "INSERT INTO missing (id) VALUES (1)", &[], &mut session).unwrap_err();
    assert!(matches!(err, RewindError::TableNotFound(_)));
}

#[test]
fn test_unregistered_dialect() {
    let engine = engine();
    engine.register_resource("ora", ResourceSettings::new("oracle"));
    let err = engine.parse_statement("ora", "INSERT INTO T (v) VALUES ('a')").unwrap_err();
    assert!(matches!(err, RewindError::Configuration(_)));
}
