//! Configuration structures.
//!
//! Configuration is read from environment variables once at startup and then
//! threaded into the translators, which never consult the environment
//! themselves.

use serde::{Deserialize, Serialize};

/// Environment variable that disables the stage prefix on gateway hosts.
pub const STRIP_STAGE_PATH_VAR: &str = "STRIP_STAGE_PATH";

/// Environment variable overriding the default log level.
pub const LOG_LEVEL_VAR: &str = "LAMBDA_BRIDGE_LOG_LEVEL";

/// Environment variable selecting the log format (`json` or anything else).
pub const LOG_FORMAT_VAR: &str = "LAMBDA_BRIDGE_LOG_FORMAT";

/// Global bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Request translation behaviour.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ObservabilityConfig::default();
        Self {
            translation: TranslationConfig {
                strip_stage_path: lookup(STRIP_STAGE_PATH_VAR)
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
            },
            observability: ObservabilityConfig {
                log_level: lookup(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
                json_logs: lookup(LOG_FORMAT_VAR)
                    .map(|v| v.trim().eq_ignore_ascii_case("json"))
                    .unwrap_or(defaults.json_logs),
            },
        }
    }
}

/// Settings consumed by the request translator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TranslationConfig {
    /// Drop the `/<stage>` script name even when the request came through a
    /// managed gateway hostname.
    #[serde(default)]
    pub strip_stage_path: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Interpret a boolean toggle: `yes`, `y`, `true`, `t` and `1` (any case,
/// surrounding whitespace ignored) are true, everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "t" | "1"
    )
}
