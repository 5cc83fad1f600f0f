//! Undo engine facade
//!
//! Ties the dialect registry, registered resources, the step cache and the
//! metadata provider together. Every operation runs synchronously on the
//! calling thread; the engine can be shared across branch threads.

use crate::collaborators::{CurrentImageReader, StatementSession, TableMetaProvider};
use crate::dialects::DialectPlugin;
use crate::pk::{AutoIncrementStepCache, PkValues, StepContext};
use crate::registry::DialectRegistry;
use crate::undo::validation::{self, CompensatedRows};
use crate::undo::{build_undo_log, image_query, ImageCheck, UndoStatement};
use dashmap::DashMap;
use rewind_commons::{
    BranchUndoLog, Result, RewindError, SqlType, SqlUndoLog, TableMeta, TableRecords,
};
use rewind_configs::{EngineConfig, ResourceSettings};
use rewind_sql::analyzer::{ParameterSource, StatementFacts};
use rewind_sql::parse_single_statement;
use sqlparser::ast::Statement;
use std::sync::Arc;

pub struct UndoEngine {
    config: EngineConfig,
    registry: DialectRegistry,
    meta_provider: Arc<dyn TableMetaProvider>,
    resources: DashMap<String, ResourceSettings>,
    step_cache: Arc<AutoIncrementStepCache>,
}

impl UndoEngine {
    /// Engine with the built-in dialects; resources declared in `config` are
    /// registered immediately.
    pub fn new(config: EngineConfig, meta_provider: Arc<dyn TableMetaProvider>) -> Self {
        Self::with_parts(
            config,
            meta_provider,
            DialectRegistry::new(),
            Arc::new(AutoIncrementStepCache::new()),
        )
    }

    pub fn with_parts(
        config: EngineConfig,
        meta_provider: Arc<dyn TableMetaProvider>,
        registry: DialectRegistry,
        step_cache: Arc<AutoIncrementStepCache>,
    ) -> Self {
        let resources = DashMap::new();
        for (id, settings) in &config.resources {
            resources.insert(id.clone(), settings.clone());
        }
        Self {
            config,
            registry,
            meta_provider,
            resources,
            step_cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    pub fn step_cache(&self) -> &Arc<AutoIncrementStepCache> {
        &self.step_cache
    }

    /// Register or replace a resource. The dialect is not resolved until the
    /// resource is first used.
    pub fn register_resource(&self, resource_id: impl Into<String>, settings: ResourceSettings) {
        let resource_id = resource_id.into();
        log::info!("Registering resource {} ({})", resource_id, settings.db_type);
        if self.resources.insert(resource_id.clone(), settings).is_some() {
            self.step_cache.invalidate(&resource_id);
        }
    }

    /// Remove a resource together with its cached auto-increment step.
    pub fn unregister_resource(&self, resource_id: &str) -> Option<ResourceSettings> {
        self.step_cache.invalidate(resource_id);
        let removed = self.resources.remove(resource_id).map(|(_, settings)| settings);
        if removed.is_some() {
            log::info!("Unregistered resource {}", resource_id);
        }
        removed
    }

    pub fn resource(&self, resource_id: &str) -> Result<ResourceSettings> {
        self.resources
            .get(resource_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                RewindError::configuration(format!("resource '{}' is not registered", resource_id))
            })
    }

    /// Dialect plugin bound to a resource
    pub fn dialect(&self, resource_id: &str) -> Result<Arc<DialectPlugin>> {
        let settings = self.resource(resource_id)?;
        self.registry.get(&settings.db_type)
    }

    pub fn table_meta(&self, table_name: &str) -> Result<Arc<TableMeta>> {
        self.meta_provider.table_meta(table_name)
    }

    /// Parse one statement with the resource's SQL dialect.
    pub fn parse_statement(&self, resource_id: &str, sql: &str) -> Result<Statement> {
        let dialect = self.dialect(resource_id)?;
        parse_single_statement(sql, dialect.profile().parser.build().as_ref())
    }

    /// Structured facts of a mutating statement
    pub fn analyze(&self, resource_id: &str, statement: &Statement) -> Result<StatementFacts> {
        self.dialect(resource_id)?.analyzer().analyze(statement)
    }

    /// Key values persisted by an INSERT that `session` just executed.
    ///
    /// When the statement did not request generated keys, the dialect's
    /// last-identity query runs on `session`. That result is only correct
    /// if no other insert ran on the same connection in between.
    pub fn resolve_primary_keys(
        &self,
        resource_id: &str,
        statement: &Statement,
        params: &dyn ParameterSource,
        session: &mut dyn StatementSession,
    ) -> Result<PkValues> {
        let settings = self.resource(resource_id)?;
        let dialect = self.registry.get(&settings.db_type)?;

        let facts = dialect.analyzer().analyze(statement)?;
        let Some(insert) = facts.as_insert() else {
            return Err(RewindError::invariant(format!(
                "primary keys are resolved for INSERT only, got {}",
                facts.sql_type()
            )));
        };
        let meta = self.table_meta(&insert.table_name)?;

        let steps = StepContext {
            resource_id,
            cache: &self.step_cache,
            configured_step: settings.auto_increment_step,
            default_step: self.config.resolver.default_auto_increment_step,
        };
        dialect
            .resolver()
            .resolve_primary_keys(insert, &meta, params, session, &steps)
    }

    pub fn build_undo_log(
        &self,
        sql_type: SqlType,
        before_image: TableRecords,
        after_image: TableRecords,
    ) -> Result<SqlUndoLog> {
        build_undo_log(sql_type, before_image, after_image)
    }

    /// Compensating statement for a single-row undo log (the first image row).
    pub fn synthesize_undo_statement(
        &self,
        resource_id: &str,
        undo_log: &SqlUndoLog,
    ) -> Result<UndoStatement> {
        self.synthesize_undo_statements(resource_id, undo_log)?
            .into_iter()
            .next()
            .ok_or_else(|| RewindError::invariant("undo log produced no compensating statement"))
    }

    /// One compensating statement per image row.
    pub fn synthesize_undo_statements(
        &self,
        resource_id: &str,
        undo_log: &SqlUndoLog,
    ) -> Result<Vec<UndoStatement>> {
        let dialect = self.dialect(resource_id)?;
        let meta = self.table_meta(&undo_log.table_name)?;
        dialect.synthesizer().synthesize(undo_log, &meta)
    }

    /// Query capturing the before image of an UPDATE or DELETE.
    pub fn before_image_query(
        &self,
        resource_id: &str,
        facts: &StatementFacts,
        params: &dyn ParameterSource,
    ) -> Result<UndoStatement> {
        let dialect = self.dialect(resource_id)?;
        let meta = self.table_meta(facts.table_name())?;
        image_query::before_image_query(dialect.profile(), &meta, facts, params)
    }

    /// Queries reading rows back by primary key, e.g. the after image of an INSERT.
    pub fn select_by_primary_keys(
        &self,
        resource_id: &str,
        table_name: &str,
        pk_values: &PkValues,
    ) -> Result<Vec<UndoStatement>> {
        let dialect = self.dialect(resource_id)?;
        let meta = self.table_meta(table_name)?;
        image_query::select_by_primary_keys(
            dialect.profile(),
            &meta,
            pk_values,
            self.config.undo.max_in_size,
        )
    }

    /// Check an undo log against the rows currently stored.
    pub fn validate_undo_log(
        &self,
        resource_id: &str,
        undo_log: &SqlUndoLog,
        reader: &mut dyn CurrentImageReader,
    ) -> Result<ImageCheck> {
        let meta = self.table_meta(&undo_log.table_name)?;
        self.check_undo_log(resource_id, undo_log, &meta, reader, &CompensatedRows::new())
    }

    fn check_undo_log(
        &self,
        resource_id: &str,
        undo_log: &SqlUndoLog,
        meta: &TableMeta,
        reader: &mut dyn CurrentImageReader,
        compensated: &CompensatedRows,
    ) -> Result<ImageCheck> {
        let dialect = self.dialect(resource_id)?;
        let queries = image_query::current_image_queries(
            dialect.profile(),
            meta,
            undo_log,
            self.config.undo.max_in_size,
        )?;
        let mut current = TableRecords::empty(undo_log.table_name.clone());
        for query in &queries {
            current.rows.extend(reader.current_image(meta, query)?.rows);
        }
        let current = compensated.overlay(undo_log, current, meta)?;
        validation::check_current_image(undo_log, &current, meta)
    }

    /// Compensating statements for a whole branch, in execution order.
    ///
    /// Undo logs are unwound newest first. With `undo.data_validation` on,
    /// each log is checked through `reader` first: logs already compensated
    /// contribute nothing, and rows changed outside the branch fail with
    /// [`RewindError::DirtyImage`]. A row touched by several logs is checked
    /// against the state the newer compensations restore.
    pub fn compensate_branch(
        &self,
        resource_id: &str,
        branch: &BranchUndoLog,
        reader: &mut dyn CurrentImageReader,
    ) -> Result<Vec<UndoStatement>> {
        let mut statements = Vec::new();
        let mut compensated = CompensatedRows::new();
        for undo_log in branch.rollback_order() {
            if self.config.undo.data_validation {
                let meta = self.table_meta(&undo_log.table_name)?;
                let check =
                    self.check_undo_log(resource_id, undo_log, &meta, reader, &compensated)?;
                compensated.record(undo_log, &meta)?;
                if check == ImageCheck::Skip {
                    continue;
                }
            }
            statements.extend(self.synthesize_undo_statements(resource_id, undo_log)?);
        }
        log::debug!(
            "Branch {}:{} compensates with {} statement(s)",
            branch.xid,
            branch.branch_id,
            statements.len()
        );
        Ok(statements)
    }
}

impl std::fmt::Debug for UndoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoEngine")
            .field("resources", &self.resources.len())
            .field("dialects", &self.registry.ids())
            .finish()
    }
}
