//! Primary-key resolution for executed INSERT statements

pub mod resolver;
pub mod step_cache;

pub use resolver::DefaultKeyResolver;
pub use step_cache::AutoIncrementStepCache;

use rewind_commons::{Result, SqlValue};
use std::collections::BTreeMap;

/// Key column name → one value per inserted row, in insertion order
pub type PkValues = BTreeMap<String, Vec<SqlValue>>;

/// Where the auto-increment step of the current resource comes from.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub resource_id: &'a str,
    pub cache: &'a AutoIncrementStepCache,
    /// Per-resource override from configuration
    pub configured_step: Option<i64>,
    pub default_step: i64,
}

impl StepContext<'_> {
    /// Cached step of the resource, computing it with `query` on first use.
    ///
    /// Precedence: configured step, then `query` (when it yields a value),
    /// then the default step.
    pub fn step_or_load<F>(&self, query: F) -> Result<i64>
    where
        F: FnOnce() -> Result<Option<i64>>,
    {
        self.cache.get_or_try_load(self.resource_id, || {
            if let Some(step) = self.configured_step {
                return Ok(step);
            }
            Ok(query()?.unwrap_or(self.default_step))
        })
    }
}
