use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub undo: UndoSettings,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Per-resource settings keyed by resource id.
    /// Configure via TOML tables:
    /// [resources.orders-db]
    /// db_type = "mysql"
    #[serde(default)]
    pub resources: HashMap<String, ResourceSettings>,
}

/// Compensation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoSettings {
    /// Compare the current rows with the after-image before compensating
    #[serde(default = "default_true")]
    pub data_validation: bool,
    /// Longest IN list an image query may carry before it is split
    #[serde(default = "default_max_in_size")]
    pub max_in_size: usize,
}

impl Default for UndoSettings {
    fn default() -> Self {
        Self {
            data_validation: true,
            max_in_size: default_max_in_size(),
        }
    }
}

/// Primary-key resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Step used for batch-insert key synthesis when a resource neither
    /// configures one nor its dialect can query it
    #[serde(default = "default_auto_increment_step")]
    pub default_auto_increment_step: i64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            default_auto_increment_step: default_auto_increment_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional per-target log level overrides
    /// Configure via a TOML table:
    /// [logging.targets]
    /// rewind_core = "debug"
    /// sqlparser = "warn"
    #[serde(default)]
    pub targets: HashMap<String, String>,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Append logs to this file as well
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            targets: HashMap::new(),
            format: default_log_format(),
            log_to_console: true,
            file_path: None,
        }
    }
}

/// Settings of one registered resource (data source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSettings {
    /// Database product identifier, e.g. "db2", "mysql", "postgresql".
    /// Resolved against the dialect registry when the resource is first used.
    pub db_type: String,
    /// Auto-increment step override; skips the dialect's step query
    #[serde(default)]
    pub auto_increment_step: Option<i64>,
}

impl ResourceSettings {
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            auto_increment_step: None,
        }
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.auto_increment_step = Some(step);
        self
    }
}
