// Logging setup for processes embedding the engine
//
// The engine itself logs through the `log` facade. `init_logging` installs a
// tracing-subscriber backend and bridges `log` records into it with
// `tracing_log::LogTracer`.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;

use rewind_configs::LoggingSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the base level, noisy-crate overrides, and
/// per-target overrides from config.
pub fn build_env_filter(
    level: &str,
    target_levels: &HashMap<String, String>,
) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    // sqlparser logs every token at debug
    directives.push("sqlparser=warn".to_string());

    let mut targets: Vec<_> = target_levels.iter().collect();
    targets.sort();
    for (target, lvl) in targets {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Initialize logging from configuration.
///
/// Installs a console layer (when `log_to_console` is set) and a file layer
/// (when `file_path` is set), each compact text or JSON lines. Calling it
/// again after a subscriber is installed leaves the existing one in place.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let format = LogFormat::parse(&settings.format);

    let log_file = match &settings.file_path {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        },
        None => None,
    };

    // Bridge `log` crate → tracing
    tracing_log::LogTracer::init().ok();

    let console_layer = if settings.log_to_console {
        let layer = tracing_subscriber::fmt::layer().with_target(true).with_thread_names(true);
        let layer = match format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Compact => layer.with_ansi(true).boxed(),
        };
        Some(layer.with_filter(build_env_filter(&settings.level, &settings.targets)?))
    } else {
        None
    };

    let file_layer = match log_file {
        Some(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_target(true)
                .with_thread_names(true);
            let layer = match format {
                LogFormat::Json => layer.json().boxed(),
                LogFormat::Compact => layer.with_ansi(false).boxed(),
            };
            Some(layer.with_filter(build_env_filter(&settings.level, &settings.targets)?))
        },
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
    match installed {
        Ok(()) => tracing::trace!(
            "Logging initialized: level={}, console={}, file={:?}",
            settings.level,
            settings.log_to_console,
            settings.file_path
        ),
        Err(_) => log::debug!("A global subscriber is already installed; keeping it"),
    }

    Ok(())
}
