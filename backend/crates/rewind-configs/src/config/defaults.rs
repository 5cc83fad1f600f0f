// Default value functions

pub fn default_true() -> bool {
    true
}

pub fn default_auto_increment_step() -> i64 {
    1 // Matches the out-of-the-box increment of every supported store
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_max_in_size() -> usize {
    1000 // Rows per image query before it is split into several queries
}

pub fn valid_log_levels() -> &'static [&'static str] {
    &["error", "warn", "info", "debug", "trace"]
}

pub fn valid_log_formats() -> &'static [&'static str] {
    &["compact", "json"]
}
