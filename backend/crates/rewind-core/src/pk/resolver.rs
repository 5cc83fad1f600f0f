//! Resolves the primary-key values an executed INSERT actually persisted.
//!
//! Explicit key values are taken from the statement and its parameters
//! without touching the driver. NULL, DEFAULT, computed or omitted keys come
//! from the driver's generated keys, or from the dialect's last-identity
//! query when the statement did not request them.

use super::{PkValues, StepContext};
use crate::collaborators::{GeneratedKeys, StatementSession};
use crate::dialects::{DialectProfile, PrimaryKeyResolver, StepQuery};
use rewind_commons::{ColumnMeta, Result, ResultRows, RewindError, SqlValue, TableMeta};
use rewind_sql::analyzer::{InsertFacts, ParameterSource, ResolvedValue};

/// Key resolver driven by a [`DialectProfile`]
#[derive(Debug, Clone, Copy)]
pub struct DefaultKeyResolver {
    profile: &'static DialectProfile,
}

/// How the key values of one key column are known
enum KeySource {
    Explicit(Vec<SqlValue>),
    Generated,
}

impl DefaultKeyResolver {
    pub fn new(profile: &'static DialectProfile) -> Self {
        Self { profile }
    }

    fn resolve_composite(
        &self,
        facts: &InsertFacts,
        meta: &TableMeta,
        params: &dyn ParameterSource,
    ) -> Result<PkValues> {
        if !self.profile.supports_composite_keys() {
            return Err(RewindError::unsupported(format!(
                "composite primary key is not supported in {}",
                self.profile.id
            )));
        }

        let mut pk_values = PkValues::new();
        for column in meta.primary_key_columns() {
            match key_source(facts, meta, column, params)? {
                KeySource::Explicit(values) => {
                    pk_values.insert(column.name.clone(), values);
                },
                KeySource::Generated => {
                    return Err(RewindError::unsupported(format!(
                        "composite primary key with generated values is not supported in {} (column '{}')",
                        self.profile.id, column.name
                    )));
                },
            }
        }
        Ok(pk_values)
    }

    /// Keys the store generated for the rows just inserted.
    fn generated_keys(
        &self,
        facts: &InsertFacts,
        meta: &TableMeta,
        session: &mut dyn StatementSession,
        steps: &StepContext<'_>,
    ) -> Result<Vec<SqlValue>> {
        let rows = match request_generated_keys(session) {
            Ok(rows) => rows,
            Err(RewindError::TransientResolutionFailure(reason)) => {
                log::error!(
                    "{}; falling back to `{}`. The fallback returns the wrong key if another insert ran on this connection in between",
                    reason,
                    self.profile.identity_query
                );
                session.execute_query(self.profile.identity_query)?
            },
            Err(err) => return Err(err),
        };

        let keys: Vec<SqlValue> = rows.column(0).into_iter().filter(|v| !v.is_null()).collect();
        let inserted = inserted_row_count(facts, session);

        let keys = if keys.len() == 1 && inserted > 1 && meta.can_auto_increment() {
            let first_key = keys.first().and_then(SqlValue::as_i64).ok_or_else(|| {
                RewindError::invariant(format!(
                    "generated key {:?} of '{}' is not an integer",
                    keys.first(),
                    meta.table_name()
                ))
            })?;
            let step = self.auto_increment_step(session, steps)?;
            log::debug!(
                "Synthesizing {} keys of '{}' from first key {} with step {}",
                inserted,
                meta.table_name(),
                first_key,
                step
            );
            batch_keys(first_key, step, inserted)?
        } else {
            keys
        };

        if keys.is_empty() || keys.len() != inserted {
            return Err(RewindError::invariant(format!(
                "resolved {} primary key value(s) of '{}' for {} inserted row(s)",
                keys.len(),
                meta.table_name(),
                inserted
            )));
        }
        Ok(keys)
    }

    fn auto_increment_step(
        &self,
        session: &mut dyn StatementSession,
        steps: &StepContext<'_>,
    ) -> Result<i64> {
        steps.step_or_load(|| match self.profile.step_query {
            Some(query) => query_step(session, query),
            None => Ok(None),
        })
    }
}

impl PrimaryKeyResolver for DefaultKeyResolver {
    fn resolve_primary_keys(
        &self,
        facts: &InsertFacts,
        meta: &TableMeta,
        params: &dyn ParameterSource,
        session: &mut dyn StatementSession,
        steps: &StepContext<'_>,
    ) -> Result<PkValues> {
        if meta.is_composite_key() {
            return self.resolve_composite(facts, meta, params);
        }

        let column = meta.primary_key_columns().next().ok_or_else(|| {
            RewindError::invariant(format!("table '{}' has no primary key", meta.table_name()))
        })?;

        let values = match key_source(facts, meta, column, params)? {
            KeySource::Explicit(values) => {
                log::debug!(
                    "Primary key '{}' of '{}' written explicitly for {} row(s)",
                    column.name,
                    meta.table_name(),
                    values.len()
                );
                values
            },
            KeySource::Generated => self.generated_keys(facts, meta, session, steps)?,
        };

        Ok(PkValues::from([(column.name.clone(), values)]))
    }
}

/// Ask the driver for generated keys; a statement executed without
/// requesting them surfaces as `TransientResolutionFailure`.
fn request_generated_keys(session: &mut dyn StatementSession) -> Result<ResultRows> {
    match session.generated_keys() {
        GeneratedKeys::Available(rows) => Ok(rows),
        GeneratedKeys::NotRequested => Err(RewindError::TransientResolutionFailure(
            "generated keys were not requested for the statement".to_string(),
        )),
        GeneratedKeys::Failed(err) => Err(RewindError::Driver(err)),
    }
}

fn query_step(session: &mut dyn StatementSession, query: StepQuery) -> Result<Option<i64>> {
    let rows = session.execute_query(query.sql)?;
    match rows.first_value(query.column).and_then(SqlValue::as_i64) {
        Some(step) if step > 0 => Ok(Some(step)),
        other => {
            log::warn!(
                "`{}` returned no usable auto-increment step ({:?}); using the default",
                query.sql,
                other
            );
            Ok(None)
        },
    }
}

fn inserted_row_count(facts: &InsertFacts, session: &dyn StatementSession) -> usize {
    usize::try_from(session.update_count())
        .ok()
        .filter(|count| *count > 0)
        .unwrap_or_else(|| facts.row_count())
}

/// `first + i * step` for `i` in `0..count`
fn batch_keys(first: i64, step: i64, count: usize) -> Result<Vec<SqlValue>> {
    (0..count)
        .map(|i| {
            i64::try_from(i)
                .ok()
                .and_then(|i| step.checked_mul(i))
                .and_then(|offset| first.checked_add(offset))
                .map(SqlValue::Int)
                .ok_or_else(|| {
                    RewindError::invariant(format!(
                        "auto-increment key overflow: {} + {} * {}",
                        first, i, step
                    ))
                })
        })
        .collect()
}

/// Position of the key column in each VALUES row, if the statement writes it.
fn key_position(facts: &InsertFacts, meta: &TableMeta, column: &ColumnMeta) -> Result<Option<usize>> {
    if facts.has_column_list() {
        return Ok(facts.column_index(&column.name));
    }

    let width = meta.columns().len();
    if let Some(row) = facts.rows.iter().find(|row| row.len() != width) {
        return Err(RewindError::unsupported(format!(
            "INSERT without column list supplying {} values for the {} columns of '{}'",
            row.len(),
            width,
            meta.table_name()
        )));
    }
    Ok(meta
        .columns()
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(&column.name)))
}

fn key_source(
    facts: &InsertFacts,
    meta: &TableMeta,
    column: &ColumnMeta,
    params: &dyn ParameterSource,
) -> Result<KeySource> {
    let Some(index) = key_position(facts, meta, column)? else {
        require_generation(meta, column, false)?;
        return Ok(KeySource::Generated);
    };

    let resolved = facts
        .rows
        .iter()
        .map(|row| {
            row.get(index)
                .ok_or_else(|| {
                    RewindError::invariant(format!("VALUES row has no value at position {}", index))
                })
                .and_then(|expr| expr.resolve(params))
        })
        .collect::<Result<Vec<_>>>()?;

    let generated = resolved.iter().filter(|v| v.is_generated()).count();
    if generated == 0 {
        let values = resolved
            .into_iter()
            .filter_map(|v| match v {
                ResolvedValue::Value(value) => Some(value),
                _ => None,
            })
            .collect();
        return Ok(KeySource::Explicit(values));
    }
    if generated < resolved.len() {
        return Err(RewindError::unsupported(format!(
            "mixing explicit and generated values of primary key '{}' in one INSERT",
            column.name
        )));
    }

    let all_computed = resolved
        .iter()
        .all(|v| matches!(v, ResolvedValue::Computed(_)));
    require_generation(meta, column, all_computed)?;
    Ok(KeySource::Generated)
}

/// A key left to the store must be auto-increment, or be produced by an
/// expression whose result the driver reports back.
fn require_generation(meta: &TableMeta, column: &ColumnMeta, all_computed: bool) -> Result<()> {
    if column.auto_increment || all_computed {
        return Ok(());
    }
    if column.default_value.is_some() {
        return Err(RewindError::unsupported(format!(
            "default value is not yet supported (primary key '{}' of '{}')",
            column.name,
            meta.table_name()
        )));
    }
    Err(RewindError::invariant(format!(
        "primary key '{}' of '{}' has no value and is not auto-increment",
        column.name,
        meta.table_name()
    )))
}
