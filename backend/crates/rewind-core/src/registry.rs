//! Dialect registry
//!
//! Maps a database-product identifier to its [`DialectPlugin`]. Products are
//! declared statically; a plugin is built the first time a resource of that
//! product is used and shared afterwards. Lookup is by exact identifier.

use crate::dialects::{db2, mysql, postgres, DialectPlugin};
use dashmap::DashMap;
use rewind_commons::{Result, RewindError};
use std::sync::Arc;

/// Factory of one registered product
pub type PluginFactory = fn() -> DialectPlugin;

/// Products registered out of the box
pub const BUILTIN_DIALECTS: &[(&str, PluginFactory)] = &[
    (db2::DB2, db2::plugin),
    (mysql::MYSQL, mysql::plugin),
    (postgres::POSTGRESQL, postgres::plugin),
];

#[derive(Debug)]
pub struct DialectRegistry {
    factories: DashMap<String, PluginFactory>,
    plugins: DashMap<String, Arc<DialectPlugin>>,
}

impl DialectRegistry {
    /// Registry with no products
    pub fn empty() -> Self {
        Self {
            factories: DashMap::new(),
            plugins: DashMap::new(),
        }
    }

    /// Registry with the built-in products
    pub fn new() -> Self {
        let registry = Self::empty();
        for (id, factory) in BUILTIN_DIALECTS {
            registry.register(id, *factory);
        }
        registry
    }

    /// Declare a product. Replaces any earlier declaration under `id`.
    pub fn register(&self, id: &str, factory: PluginFactory) {
        self.plugins.remove(id);
        self.factories.insert(id.to_string(), factory);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Plugin of `id`, built on first use.
    pub fn get(&self, id: &str) -> Result<Arc<DialectPlugin>> {
        if let Some(plugin) = self.plugins.get(id) {
            return Ok(Arc::clone(plugin.value()));
        }

        let factory = self
            .factories
            .get(id)
            .map(|f| *f.value())
            .ok_or_else(|| {
                RewindError::configuration(format!(
                    "no dialect registered for db type '{}' (registered: {})",
                    id,
                    self.ids().join(", ")
                ))
            })?;

        let plugin = self
            .plugins
            .entry(id.to_string())
            .or_insert_with(|| {
                log::debug!("Loading dialect plugin '{}'", id);
                Arc::new(factory())
            })
            .value()
            .clone();
        Ok(plugin)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
