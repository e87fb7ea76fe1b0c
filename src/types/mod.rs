//! Core types for the bridge.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Translation error types with thiserror derives
//! - **Config**: Translation and observability settings

mod config;
mod errors;

pub use config::{
    parse_flag, Config, ObservabilityConfig, TranslationConfig, LOG_FORMAT_VAR, LOG_LEVEL_VAR,
    STRIP_STAGE_PATH_VAR,
};
pub use errors::{Error, Result};
