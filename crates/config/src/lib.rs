//! Per-environment application configuration for web services
//!
//! Loads a YAML settings file, selects the section for the active deployment
//! environment, and derives the listening port and application root URL.

pub mod environment;
pub mod loader;

pub use environment::{Environment, UnknownEnvironment};
pub use loader::{
    with_yaml_environment, AppConfig, ConfigError, ConfigSettings, DEFAULT_CONFIG_FILE,
};
