//! Settings errors.
//!
//! Each variant names the layer that failed: a file on disk, inline text,
//! a value rejected by validation, or an environment override.

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Why a [`CitadelConfig`](crate::CitadelConfig) could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A settings file was requested explicitly but is not there.
    #[error("settings file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// A settings file exists but could not be read.
    #[error("cannot read settings file {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Settings text does not fit the schema: bad syntax, wrong types or an
    /// unknown key.
    #[error("{origin} does not match the settings schema: {message}")]
    Schema {
        /// File path, or `inline toml` / `inline json`.
        origin: String,
        /// Deserializer message, with line and column when known.
        message: String,
    },

    /// The format is neither TOML nor JSON.
    #[error("cannot tell the settings format of '{0}' (expected toml or json)")]
    UnknownFormat(String),

    /// A setting deserialized but its value is unusable.
    #[error("setting {section}.{key} rejected: {problem}")]
    Rejected {
        /// Section name (`server`, `auth`, `logging`, `metrics`).
        section: &'static str,
        /// Key within the section.
        key: &'static str,
        /// What is wrong with the value.
        problem: String,
    },

    /// An environment override could not be parsed.
    #[error("environment override {var}={value:?} rejected: expected {expected}")]
    Override {
        /// The variable name, prefix included.
        var: String,
        /// The raw value.
        value: String,
        /// What the key accepts.
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(origin: impl Into<String>, err: impl Display) -> Self {
        Self::Schema {
            origin: origin.into(),
            message: err.to_string(),
        }
    }

    /// A validation failure for `section.key`.
    pub fn rejected(section: &'static str, key: &'static str, problem: impl Into<String>) -> Self {
        Self::Rejected {
            section,
            key,
            problem: problem.into(),
        }
    }

    pub(crate) fn env_override(var: &str, value: &str, expected: &'static str) -> Self {
        Self::Override {
            var: var.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}
