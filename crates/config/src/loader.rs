//! Configuration loading from per-environment YAML documents
//!
//! The settings file maps environment names to sections with optional
//! `ssl`, `host`, `port`, and `approot` scalars plus arbitrary extra keys:
//! - `ssl` enables the https scheme and the 443 port default
//! - `port` falls back to 443 (ssl) or 80 (plain)
//! - `approot` is taken verbatim when present, otherwise synthesized from
//!   `host`, the scheme, and the port

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the settings file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/settings.yml";

/// String forms the `ssl` field accepts as true (case-sensitive)
const TRUTHY: &[&str] = &["true", "TRUE", "yes", "YES", "Y", "1"];

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the settings file
    #[error("failed to read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("failed to parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The document's top level is not a mapping
    #[error("top level of {} is not a mapping", .path.display())]
    NotMapping { path: PathBuf },

    /// No section for the requested environment
    #[error("no configuration section for environment '{environment}'")]
    MissingEnvironment { environment: String },

    /// A scalar field holds a mapping or sequence
    #[error("config field '{field}' must be a scalar value")]
    FieldType { field: &'static str },

    /// The port field does not parse as a port number
    #[error("invalid port '{value}'")]
    InvalidPort { value: String },

    /// Neither `host` nor `approot` is present
    #[error("must supply either 'host' or 'approot'")]
    MissingHost,

    /// The caller-supplied extra loader failed
    #[error("failed to load extra settings: {0}")]
    Extra(String),
}

/// Fully resolved application configuration
///
/// Produced by [`ConfigSettings::load`]; `extra` carries whatever the
/// configured extra loader extracted from the same environment section.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig<E, Extra> {
    pub environment: E,
    pub port: u16,
    pub approot: String,
    pub extra: Extra,
}

impl<E, Extra> AppConfig<E, Extra> {
    /// Apply environment variable overrides to the loaded configuration
    ///
    /// A nonzero `PORT` replaces the configured port; invalid values are
    /// ignored. The approot keeps the port that was current during loading.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("PORT") {
            if let Ok(port) = val.parse::<u16>() {
                if port != 0 {
                    self.port = port;
                }
            }
        }
    }
}

/// Construction-time parameters for [`AppConfig`]
///
/// Holds the environment value and three replaceable strategies: where the
/// settings file lives, how the per-environment section is extracted from
/// the document, and how the extra payload is read from that section.
pub struct ConfigSettings<E, Extra> {
    environment: E,
    load_extra: Box<dyn Fn(&E, &Value) -> Result<Extra, ConfigError>>,
    config_file: Box<dyn Fn(&E) -> PathBuf>,
    section: Box<dyn Fn(&E, &Value) -> Result<Value, ConfigError>>,
}

impl<E: fmt::Display> ConfigSettings<E, Value> {
    /// Settings with every strategy defaulted
    ///
    /// The extra payload is the raw per-environment section.
    pub fn new(environment: E) -> Self {
        Self::with_extra(environment, |_, section| Ok(section.clone()))
    }
}

impl<E: fmt::Display, Extra: DeserializeOwned> ConfigSettings<E, Extra> {
    /// Settings whose extra payload deserializes the environment section
    /// into `Extra`
    pub fn typed(environment: E) -> Self {
        Self::with_extra(environment, |_, section| {
            serde_yaml::from_value(section.clone()).map_err(|e| ConfigError::Extra(e.to_string()))
        })
    }
}

impl<E: fmt::Display, Extra> ConfigSettings<E, Extra> {
    /// Settings with a caller-supplied extra loader
    pub fn with_extra<F>(environment: E, load_extra: F) -> Self
    where
        F: Fn(&E, &Value) -> Result<Extra, ConfigError> + 'static,
    {
        Self {
            environment,
            load_extra: Box::new(load_extra),
            config_file: Box::new(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
            section: Box::new(|env: &E, doc: &Value| {
                let key = env.to_string();
                doc.get(key.as_str())
                    .cloned()
                    .ok_or(ConfigError::MissingEnvironment { environment: key })
            }),
        }
    }

    /// Replace the settings-file resolver (default: [`DEFAULT_CONFIG_FILE`])
    pub fn config_file<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&E) -> PathBuf + 'static,
    {
        self.config_file = Box::new(resolve);
        self
    }

    /// Replace the section resolver (default: top-level lookup by the
    /// environment's canonical name)
    pub fn section<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&E, &Value) -> Result<Value, ConfigError> + 'static,
    {
        self.section = Box::new(resolve);
        self
    }

    /// Load and resolve the configuration
    ///
    /// Reads the settings file, extracts the environment section, derives
    /// ssl/port/approot, and runs the extra loader. Any failure aborts the
    /// load; no partial configuration is returned.
    pub fn load(self) -> Result<AppConfig<E, Extra>, ConfigError> {
        let path = (self.config_file)(&self.environment);
        let doc = load_document(&path)?;
        let section = (self.section)(&self.environment, &doc)?;

        // All four fields are read up front so a wrong-typed field is an
        // error even when derivation would not otherwise consult it
        let ssl_field = lookup_scalar(&section, "ssl")?;
        let host = lookup_scalar(&section, "host")?;
        let port_field = lookup_scalar(&section, "port")?;
        let approot_field = lookup_scalar(&section, "approot")?;

        let ssl = matches!(ssl_field, Some(v) if TRUTHY.contains(&v.as_str()));

        let port = match port_field {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None if ssl => 443,
            None => 80,
        };

        let approot = match (approot_field, host) {
            // Explicit approot wins verbatim; host/port/ssl are ignored here
            (Some(root), _) => root,
            (None, Some(host)) => derive_approot(ssl, &host, port),
            (None, None) => return Err(ConfigError::MissingHost),
        };

        let extra = (self.load_extra)(&self.environment, &section)?;

        Ok(AppConfig {
            environment: self.environment,
            port,
            approot,
            extra,
        })
    }
}

/// Parse a settings file, look up the section for `environment` in the
/// top-level mapping, and hand it to `handler`
///
/// Lower-level companion to [`ConfigSettings::load`] for callers that want
/// the raw section without port/approot derivation.
pub fn with_yaml_environment<E, T, F>(
    path: impl AsRef<Path>,
    environment: &E,
    handler: F,
) -> Result<T, ConfigError>
where
    E: fmt::Display,
    F: FnOnce(&Value) -> Result<T, ConfigError>,
{
    let doc = load_document(path.as_ref())?;
    let key = environment.to_string();
    let section = doc
        .get(key.as_str())
        .ok_or(ConfigError::MissingEnvironment { environment: key })?;
    handler(section)
}

/// Read and parse a YAML file, requiring a mapping at the top level
fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !doc.is_mapping() {
        return Err(ConfigError::NotMapping {
            path: path.to_path_buf(),
        });
    }
    Ok(doc)
}

/// Read an optional scalar field as its string form
///
/// Strings, numbers, and booleans are all scalars; a mapping or sequence in
/// a scalar position is a type error rather than an absent value.
fn lookup_scalar(section: &Value, field: &'static str) -> Result<Option<String>, ConfigError> {
    match section.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(ConfigError::FieldType { field }),
    }
}

/// Synthesize an approot from host, scheme, and port
///
/// The port suffix is omitted exactly when it matches the scheme's default
/// (443 for https, 80 for http).
fn derive_approot(ssl: bool, host: &str, port: u16) -> String {
    let scheme = if ssl { "https" } else { "http" };
    let default_port = if ssl { 443 } else { 80 };
    if port == default_port {
        format!("{}://{}", scheme, host)
    } else {
        format!("{}://{}:{}", scheme, host, port)
    }
}
