//! Playground control facade for the presentation layer and tests
//!
//! Bundles one session with its controller and exposes the run/clear/reset
//! surface plus everything a view needs to bind to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HarnessConfig;
use super::controller::{Interpreter, RunController};
use super::diagnostic::DiagnosticExtractor;
use super::error::Result;
use super::session::{RunOutcome, RunSummary, Session, Status, Tab};
use super::sink::LogChannel;

/// A session bound to an interpreter.
pub struct Playground<I> {
    session: Session,
    controller: RunController<I>,
}

impl<I: Interpreter> Playground<I> {
    /// Create a playground with default settings; output is echoed to `tracing`.
    pub fn new(interpreter: I, code: impl Into<String>) -> Self {
        Self {
            session: Session::new(code),
            controller: RunController::new(interpreter),
        }
    }

    /// Create a playground from configuration.
    pub fn with_config(
        interpreter: I,
        code: impl Into<String>,
        config: &HarnessConfig,
    ) -> Result<Self> {
        let controller =
            RunController::with_parts(interpreter, config.extractor()?, config.downstream());
        Ok(Self {
            session: Session::new(code),
            controller,
        })
    }

    /// Create a playground forwarding captured values to `channel`.
    pub fn with_channel(
        interpreter: I,
        code: impl Into<String>,
        channel: Box<dyn LogChannel>,
    ) -> Self {
        Self {
            session: Session::new(code),
            controller: RunController::with_parts(
                interpreter,
                DiagnosticExtractor::default(),
                channel,
            ),
        }
    }

    /// Run the current code. Fails with `RunRejected` while diagnostics are outstanding.
    pub fn run(&mut self) -> Result<RunOutcome> {
        self.controller.run(&mut self.session)
    }

    /// Empty the console output.
    pub fn clear(&mut self) {
        self.controller.clear(&mut self.session);
    }

    /// Dismiss diagnostics so the next run is accepted.
    pub fn reset(&mut self) {
        self.controller.reset(&mut self.session);
    }

    /// Replace the code used by the next run.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.session.set_code(code);
    }

    /// Whether the run action is enabled.
    pub fn can_run(&self) -> bool {
        self.session.can_run()
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.session.status()
    }

    /// Captured output.
    pub fn output(&self) -> &[String] {
        self.session.output()
    }

    /// Diagnostics of the last failure.
    pub fn diagnostics(&self) -> &[String] {
        self.session.diagnostics()
    }

    /// Tab currently in focus.
    pub fn active_tab(&self) -> Tab {
        self.session.active_tab()
    }

    /// Focus a tab.
    pub fn select_tab(&mut self, tab: Tab) {
        self.session.select_tab(tab);
    }

    /// Number of problems in the current diagnostics.
    pub fn problem_count(&self) -> usize {
        self.controller
            .extractor()
            .problem_count(self.session.diagnostics())
    }

    /// Display label for `tab`, e.g. `Problems(2)`.
    pub fn tab_label(&self, tab: Tab) -> String {
        match tab {
            Tab::Problems if !self.session.diagnostics().is_empty() => {
                format!("{}({})", tab.name(), self.problem_count())
            }
            _ => tab.name().to_string(),
        }
    }

    /// Underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Underlying controller.
    pub fn controller_mut(&mut self) -> &mut RunController<I> {
        &mut self.controller
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session.id(),
            status: self.session.status(),
            output: self.session.output().to_vec(),
            diagnostics: self.session.diagnostics().to_vec(),
            active_tab: self.session.active_tab(),
            problem_count: self.problem_count(),
            can_run: self.can_run(),
            last_run: self.session.last_run().cloned(),
        }
    }
}

/// Session state for display or export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: Uuid,

    /// Lifecycle state
    pub status: Status,

    /// Captured output
    pub output: Vec<String>,

    /// Diagnostic lines
    pub diagnostics: Vec<String>,

    /// Tab in focus
    pub active_tab: Tab,

    /// Problems shown on the diagnostics tab
    pub problem_count: usize,

    /// Whether the run action is enabled
    pub can_run: bool,

    /// Most recent run
    pub last_run: Option<RunSummary>,
}
