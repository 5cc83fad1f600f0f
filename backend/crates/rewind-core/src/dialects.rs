//! Database-product plugins
//!
//! Each supported product contributes a [`DialectProfile`] describing its
//! quoting, placeholder syntax and identity queries. A [`DialectPlugin`] binds
//! the analyzer, key resolver and undo synthesizer for one profile.

pub mod db2;
pub mod mysql;
pub mod postgres;

use crate::collaborators::StatementSession;
use crate::pk::resolver::DefaultKeyResolver;
use crate::pk::{PkValues, StepContext};
use crate::undo::synthesizer::DefaultUndoSynthesizer;
use crate::undo::UndoStatement;
use rewind_commons::{Result, SqlUndoLog, TableMeta};
use rewind_sql::analyzer::{analyze_statement, InsertFacts, ParameterSource, PlaceholderStyle};
use rewind_sql::{IdentifierRules, StatementFacts};
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect};

/// sqlparser dialect used to parse statements of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserDialect {
    Generic,
    MySql,
    PostgreSql,
}

impl ParserDialect {
    pub fn build(self) -> Box<dyn Dialect> {
        match self {
            ParserDialect::Generic => Box::new(GenericDialect {}),
            ParserDialect::MySql => Box::new(MySqlDialect {}),
            ParserDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
        }
    }
}

/// Query returning a resource's auto-increment step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepQuery {
    pub sql: &'static str,
    /// 0-based column holding the step in the first result row
    pub column: usize,
}

/// How far a product supports multi-column primary keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKeySupport {
    /// Rejected by the resolver and the synthesizer
    Unsupported,
    /// Accepted when every key value is written explicitly
    ExplicitValuesOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectProfile {
    /// Registry identifier, matched exactly
    pub id: &'static str,
    pub parser: ParserDialect,
    pub identifiers: IdentifierRules,
    pub placeholders: PlaceholderStyle,
    /// Returns the identity generated by the last insert on the session
    pub identity_query: &'static str,
    pub step_query: Option<StepQuery>,
    pub composite_keys: CompositeKeySupport,
}

impl DialectProfile {
    pub fn escape(&self, name: &str) -> String {
        self.identifiers.escape(name)
    }

    pub fn supports_composite_keys(&self) -> bool {
        self.composite_keys != CompositeKeySupport::Unsupported
    }
}

/// Extracts statement facts from a parsed statement.
pub trait StatementAnalyzer: Send + Sync {
    fn analyze(&self, statement: &Statement) -> Result<StatementFacts>;
}

/// Resolves the key values an executed INSERT persisted.
pub trait PrimaryKeyResolver: Send + Sync {
    fn resolve_primary_keys(
        &self,
        facts: &InsertFacts,
        meta: &TableMeta,
        params: &dyn ParameterSource,
        session: &mut dyn StatementSession,
        steps: &StepContext<'_>,
    ) -> Result<PkValues>;
}

/// Builds compensating statements from an undo log.
pub trait UndoSynthesizer: Send + Sync {
    /// One statement per image row, in image order.
    fn synthesize(&self, undo_log: &SqlUndoLog, meta: &TableMeta) -> Result<Vec<UndoStatement>>;
}

/// Analyzer shared by every profile; the statement shapes rewind accepts do
/// not differ between products once parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnalyzer;

impl StatementAnalyzer for DefaultAnalyzer {
    fn analyze(&self, statement: &Statement) -> Result<StatementFacts> {
        analyze_statement(statement)
    }
}

/// Analyzer, resolver and synthesizer of one product
pub struct DialectPlugin {
    profile: &'static DialectProfile,
    analyzer: Box<dyn StatementAnalyzer>,
    resolver: Box<dyn PrimaryKeyResolver>,
    synthesizer: Box<dyn UndoSynthesizer>,
}

impl DialectPlugin {
    pub fn new(
        profile: &'static DialectProfile,
        analyzer: Box<dyn StatementAnalyzer>,
        resolver: Box<dyn PrimaryKeyResolver>,
        synthesizer: Box<dyn UndoSynthesizer>,
    ) -> Self {
        Self {
            profile,
            analyzer,
            resolver,
            synthesizer,
        }
    }

    /// Plugin built from the default implementations of each capability.
    pub fn from_profile(profile: &'static DialectProfile) -> Self {
        Self::new(
            profile,
            Box::new(DefaultAnalyzer),
            Box::new(DefaultKeyResolver::new(profile)),
            Box::new(DefaultUndoSynthesizer::new(profile)),
        )
    }

    pub fn id(&self) -> &'static str {
        self.profile.id
    }

    pub fn profile(&self) -> &'static DialectProfile {
        self.profile
    }

    pub fn analyzer(&self) -> &dyn StatementAnalyzer {
        self.analyzer.as_ref()
    }

    pub fn resolver(&self) -> &dyn PrimaryKeyResolver {
        self.resolver.as_ref()
    }

    pub fn synthesizer(&self) -> &dyn UndoSynthesizer {
        self.synthesizer.as_ref()
    }
}

impl std::fmt::Debug for DialectPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectPlugin").field("id", &self.profile.id).finish()
    }
}
