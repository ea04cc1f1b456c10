//! Playground – run source text through an external interpreter and observe the result
//!
//! This crate implements the harness around an opaque interpreter:
//! - Scoped capture of everything the interpreter prints, rendered to display strings
//! - Classification of failure messages into diagnostic lines via banner matching
//! - A run lifecycle (idle, running, completed) that refuses new runs while
//!   diagnostics are outstanding
//! - A driver for pre-compiled interpreters executed as child processes

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Interpreters executed as child processes
pub mod external;
/// Output capture, diagnostics and run lifecycle
pub mod harness;

// Re-export key types for convenience
pub use harness::{HarnessConfig, Playground};

/// Current version of the playground harness
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
