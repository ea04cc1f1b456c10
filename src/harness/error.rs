//! Error types for the playground harness
//!
//! Domain errors use thiserror. Interpreter failures never escape `run`;
//! they are converted to diagnostics at the controller boundary.

use std::io;
use thiserror::Error;

/// Top-level harness error
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A run was requested while diagnostics from a previous failure are outstanding
    #[error("Run rejected: {outstanding} outstanding diagnostic line(s) must be reset first")]
    RunRejected {
        /// Number of diagnostic lines still held by the session
        outstanding: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an external interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// Textual failure message, possibly carrying a diagnostic banner
    #[error("{0}")]
    Raised(String),

    /// Structured failure payload supplied by interpreters that can describe
    /// their errors directly
    #[error("{kind}: {}", lines.join("; "))]
    Structured {
        /// Short failure classification (e.g. "ParseError")
        kind: String,
        /// Human-readable lines to display as diagnostics
        lines: Vec<String>,
    },

    /// Failure without any usable message
    #[error("interpreter failed without a message")]
    Opaque,
}

impl InterpretError {
    /// Build a textual failure.
    pub fn raised(message: impl Into<String>) -> Self {
        InterpretError::Raised(message.into())
    }

    /// Build a structured failure.
    pub fn structured<S: Into<String>>(kind: impl Into<String>, lines: impl IntoIterator<Item = S>) -> Self {
        InterpretError::Structured {
            kind: kind.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result type using HarnessError
pub type Result<T> = std::result::Result<T, HarnessError>;
