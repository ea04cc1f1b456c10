//! Run harness and public API
//!
//! Wires the output sink, the diagnostic extractor and the run controller
//! together and holds the harness configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::external::CommandSpec;

// Submodules
pub mod control;
pub mod controller;
pub mod diagnostic;
pub mod error;
pub mod loggable;
pub mod session;
pub mod sink;
pub mod storage;

use diagnostic::{DEFAULT_MARKER, DEFAULT_MIN_RUN, DiagnosticExtractor};
use sink::{LogChannel, NullChannel, TracingChannel};

/// Configuration for the playground harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root directory holding `config.json` (default: .playground/)
    pub root: PathBuf,

    /// Character that forms banner delimiters in failure messages
    pub banner_marker: char,

    /// Minimum delimiter run length
    pub banner_min_run: usize,

    /// Forward captured output to `tracing` in addition to the session
    pub echo_output: bool,

    /// External interpreter executable, if any
    pub interpreter: Option<CommandSpec>,

    /// Enable debug tracing
    pub debug: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".playground"),
            banner_marker: DEFAULT_MARKER,
            banner_min_run: DEFAULT_MIN_RUN,
            echo_output: true,
            interpreter: None,
            debug: false,
        }
    }
}

impl HarnessConfig {
    /// Build the diagnostic extractor described by this configuration.
    pub fn extractor(&self) -> error::Result<DiagnosticExtractor> {
        DiagnosticExtractor::new(self.banner_marker, self.banner_min_run)
    }

    /// Downstream channel captured output is forwarded to.
    pub fn downstream(&self) -> Box<dyn LogChannel> {
        if self.echo_output {
            Box::new(TracingChannel)
        } else {
            Box::new(NullChannel)
        }
    }
}

// Re-export commonly used types
pub use control::{Playground, SessionSnapshot};
pub use controller::{Interpreter, RunController, from_fn};
pub use error::{HarnessError, InterpretError};
pub use loggable::{Loggable, Primitive};
pub use session::{RunOutcome, Session, Status, Tab};
pub use sink::{OutputSink, capture};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_asterisk_banner() {
        let config = HarnessConfig::default();
        let extractor = config.extractor().unwrap();
        assert_eq!(extractor.marker(), '*');
        assert_eq!(extractor.min_run(), 6);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: HarnessConfig = serde_json::from_str(r#"{"banner_min_run": 3}"#).unwrap();
        assert_eq!(config.banner_min_run, 3);
        assert_eq!(config.banner_marker, '*');
        assert!(config.echo_output);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = HarnessConfig {
            banner_min_run: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(config.extractor(), Err(HarnessError::Config(_))));
    }
}
