// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

/// Read a boolean preference from the environment, falling back to `default`
fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether comments are carried along as trivia (dropped otherwise)
    pub keep_comments: bool,

    /// Whether `#` directive lines are carried along as trivia
    pub keep_directives: bool,

    /// Whether to collect per-category token metrics
    pub collect_detailed_metrics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            keep_comments: env_flag(env_vars::LEXICAL_KEEP_COMMENTS, true),
            keep_directives: env_flag(env_vars::LEXICAL_KEEP_DIRECTIVES, true),
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorPreferences {
    /// Whether every substitution is logged at debug level
    pub log_substitutions: bool,

    /// Whether filter registrations are logged
    pub log_registrations: bool,
}

impl Default for PreprocessorPreferences {
    fn default() -> Self {
        Self {
            log_substitutions: env_flag(env_vars::PREPROCESSOR_LOG_SUBSTITUTIONS, false),
            log_registrations: env_flag(env_vars::PREPROCESSOR_LOG_REGISTRATIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub preprocessor: PreprocessorPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const LEXICAL_KEEP_COMMENTS: &str = "CXX_LEXICAL_KEEP_COMMENTS";
    pub const LEXICAL_KEEP_DIRECTIVES: &str = "CXX_LEXICAL_KEEP_DIRECTIVES";
    pub const LEXICAL_DETAILED_METRICS: &str = "CXX_LEXICAL_DETAILED_METRICS";

    // Preprocessor
    pub const PREPROCESSOR_LOG_SUBSTITUTIONS: &str = "CXX_PREPROCESSOR_LOG_SUBSTITUTIONS";
    pub const PREPROCESSOR_LOG_REGISTRATIONS: &str = "CXX_PREPROCESSOR_LOG_REGISTRATIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CXX_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "CXX_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "CXX_LOGGING_INCLUDE_FILE_CONTEXT";
}
