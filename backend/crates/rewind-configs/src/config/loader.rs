use super::defaults::{valid_log_formats, valid_log_levels};
use super::types::EngineConfig;
use std::fs;
use std::path::Path;

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration settings.
    ///
    /// Unknown `db_type` values are accepted here: dialects are resolved when a
    /// resource is first used.
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = valid_log_levels();
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !valid_levels.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    valid_levels.join(", ")
                ));
            }
        }

        let valid_formats = valid_log_formats();
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        if self.resolver.default_auto_increment_step <= 0 {
            return Err(anyhow::anyhow!(
                "default_auto_increment_step must be positive, got {}",
                self.resolver.default_auto_increment_step
            ));
        }

        if self.undo.max_in_size == 0 {
            return Err(anyhow::anyhow!("max_in_size cannot be 0"));
        }

        for (resource_id, resource) in &self.resources {
            if resource.db_type.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "Resource '{}' has an empty db_type",
                    resource_id
                ));
            }
            if let Some(step) = resource.auto_increment_step {
                if step <= 0 {
                    return Err(anyhow::anyhow!(
                        "Resource '{}' auto_increment_step must be positive, got {}",
                        resource_id,
                        step
                    ));
                }
            }
        }

        Ok(())
    }
}
