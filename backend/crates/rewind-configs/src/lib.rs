//! rewind-configs
//!
//! Engine configuration types and loader for rewind.

pub mod config;

pub use config::*;
pub use config::defaults;
