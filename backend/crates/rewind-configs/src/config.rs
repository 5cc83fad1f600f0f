//! Configuration module: TOML-backed settings for the undo engine.

pub mod defaults;
pub mod loader;
pub mod types;

pub use types::*;
