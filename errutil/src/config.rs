//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! that controls logging and location rendering.
//!
//! # Usage
//!
//! ```rust,no_run
//! use errutil::config::{ConfigError, ConfigLoader, ErrutilConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ErrutilConfig::load(Path::new("errutil.toml"))?;
//!     config.validate()?;
//!     errutil::init_tracing(config.log_level);
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BoxError;
use crate::location::{FileLineError, SourceLocation, UNKNOWN_FILE};

/// Error type for configuration loading operations.
///
/// This enum represents all possible errors that can occur when loading
/// configuration files.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// How the file part of a location is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Path as reported by the compiler, e.g. `errutil/src/lib.rs`.
    #[default]
    Full,
    /// Final path component only, e.g. `lib.rs`.
    FileName,
}

/// Location rendering settings.
///
/// # TOML Example
///
/// ```toml
/// [location]
/// path_style = "file_name"
/// unknown_file = "???"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    /// Path rendering.
    #[serde(default)]
    pub path_style: PathStyle,

    /// File marker used when no location is known.
    #[serde(default = "default_unknown_file")]
    pub unknown_file: String,
}

fn default_unknown_file() -> String {
    UNKNOWN_FILE.to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            path_style: PathStyle::default(),
            unknown_file: default_unknown_file(),
        }
    }
}

impl LocationConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `unknown_file` is empty or
    /// contains `:` or a line break.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unknown_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "location.unknown_file cannot be empty".to_string(),
            ));
        }
        if self.unknown_file.contains([':', '\n', '\r']) {
            return Err(ConfigError::ValidationError(format!(
                "location.unknown_file contains a reserved character: {:?}",
                self.unknown_file
            )));
        }
        Ok(())
    }

    /// Apply path style and unknown marker to `location`.
    pub fn render(&self, location: SourceLocation) -> SourceLocation {
        if location.is_unknown() {
            return location.with_file(Cow::Owned(self.unknown_file.clone()));
        }
        match self.path_style {
            PathStyle::Full => location,
            PathStyle::FileName => {
                let name = Path::new(location.file())
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_owned);
                match name {
                    Some(name) => location.with_file(Cow::Owned(name)),
                    None => location,
                }
            }
        }
    }

    /// Decorate `err` with the caller's location, rendered per this config.
    #[track_caller]
    pub fn annotate(&self, err: impl Into<BoxError>) -> FileLineError {
        FileLineError::new(err, self.render(SourceLocation::caller()))
    }

    /// Decorate `err` with explicit, possibly missing, location parts.
    pub fn annotate_at(
        &self,
        err: impl Into<BoxError>,
        file: Option<&str>,
        line: Option<u32>,
    ) -> FileLineError {
        FileLineError::new(err, self.render(SourceLocation::from_parts(file, line)))
    }
}

/// Top-level configuration file.
///
/// # TOML Example
///
/// ```toml
/// log_level = "debug"
///
/// [location]
/// path_style = "file_name"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrutilConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Location rendering.
    #[serde(default)]
    pub location: LocationConfig,
}

impl ErrutilConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.location.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
