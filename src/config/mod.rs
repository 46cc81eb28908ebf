//! Configuration module.
//!
//! Handles connection settings and environment variable expansion.

mod settings;

pub use settings::{expand_env_vars, ConnectionSettings, Settings, SettingsError};
