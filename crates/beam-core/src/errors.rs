//! Structured error types shared across beam crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and the values that explain a failure.
///
/// Codes are short kebab-case identifiers (`unknown-element`,
/// `ragged-row`) that tests and reports match on; the message is for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable identifier of the failure.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// Offending values keyed by name, e.g. `element`, `path`, `line`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    /// What the caller can change to avoid the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload without context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records an offending value; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the beam engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BeamError {
    /// Invalid or inconsistent run configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Lattice construction and lattice file errors.
    #[error("lattice error: {0}")]
    Lattice(ErrorInfo),
    /// Distribution parameter errors.
    #[error("distribution error: {0}")]
    Distribution(ErrorInfo),
    /// Violations of physical preconditions (unphysical energies, etc.).
    #[error("physics error: {0}")]
    Physics(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Malformed diagnostic or input text.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// Regression check evaluation errors.
    #[error("check error: {0}")]
    Check(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl BeamError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BeamError::Config(info)
            | BeamError::Lattice(info)
            | BeamError::Distribution(info)
            | BeamError::Physics(info)
            | BeamError::Io(info)
            | BeamError::Parse(info)
            | BeamError::Check(info)
            | BeamError::Rng(info)
            | BeamError::Serde(info) => info,
        }
    }

    /// Wraps a filesystem error, recording the offending path.
    pub fn io(code: &str, path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        BeamError::Io(
            ErrorInfo::new(code, err.to_string())
                .with_context("path", path.as_ref().display().to_string()),
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type BeamResult<T> = Result<T, BeamError>;
