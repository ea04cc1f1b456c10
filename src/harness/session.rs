//! Session state shared between the controller and the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The interpreter returned normally.
    Success,
    /// The interpreter failed; diagnostics were recorded.
    Failure,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No run has happened since creation or the last reset.
    Idle,
    /// The interpreter is executing.
    Running,
    /// The last run finished with the given outcome.
    Completed(RunOutcome),
}

/// View the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    /// Captured output.
    Console,
    /// Diagnostics of the last failure.
    Problems,
}

impl Tab {
    /// Base label of the tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Console => "Console",
            Tab::Problems => "Problems",
        }
    }
}

/// Timing and outcome of the most recent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// When the interpreter was invoked.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time spent inside the interpreter.
    pub elapsed: Duration,
    /// Output entries captured during the run.
    pub captured: usize,
}

/// One run cycle's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    code: String,
    status: Status,
    output: Vec<String>,
    diagnostics: Vec<String>,
    active_tab: Tab,
    last_run: Option<RunSummary>,
}

impl Session {
    /// Create an idle session holding `code`.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            status: Status::Idle,
            output: Vec::new(),
            diagnostics: Vec::new(),
            active_tab: Tab::Console,
            last_run: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current source text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace the source text used by the next run.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Captured output, in emission order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Diagnostic lines of the last failure.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Whether a run would be accepted.
    pub fn can_run(&self) -> bool {
        self.diagnostics.is_empty() && self.status != Status::Running
    }

    /// Tab the presentation layer should show.
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Switch the visible tab.
    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// Summary of the most recent run.
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub(crate) fn output_mut(&mut self) -> &mut Vec<String> {
        &mut self.output
    }

    pub(crate) fn replace_diagnostics(&mut self, lines: Vec<String>) {
        self.diagnostics = lines;
    }

    pub(crate) fn record_run(&mut self, summary: RunSummary) {
        self.last_run = Some(summary);
    }
}
