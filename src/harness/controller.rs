//! Run lifecycle
//!
//! The controller drives one session through `Idle -> Running -> Completed`.
//! A run is refused while the session still holds diagnostics. The
//! interpreter call is synchronous and cannot be interrupted: a program that
//! never terminates blocks the caller indefinitely.

use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use super::diagnostic::{DiagnosticExtractor, UNKNOWN_ERROR};
use super::error::{HarnessError, InterpretError, Result};
use super::session::{RunOutcome, RunSummary, Session, Status, Tab};
use super::sink::{LogChannel, OutputSink, TracingChannel};

/// Entry point of an external interpreter.
pub trait Interpreter {
    /// Execute `code`, printing through `console`.
    fn interpret(
        &mut self,
        code: &str,
        console: &mut dyn LogChannel,
    ) -> std::result::Result<(), InterpretError>;
}

impl<F> Interpreter for F
where
    F: FnMut(&str, &mut dyn LogChannel) -> std::result::Result<(), InterpretError>,
{
    fn interpret(
        &mut self,
        code: &str,
        console: &mut dyn LogChannel,
    ) -> std::result::Result<(), InterpretError> {
        self(code, console)
    }
}

/// Use a closure as an [`Interpreter`].
pub fn from_fn<F>(f: F) -> F
where
    F: FnMut(&str, &mut dyn LogChannel) -> std::result::Result<(), InterpretError>,
{
    f
}

/// Orchestrates runs of an interpreter against sessions.
pub struct RunController<I> {
    interpreter: I,
    extractor: DiagnosticExtractor,
    channel: Box<dyn LogChannel>,
}

impl<I: Interpreter> RunController<I> {
    /// Create a controller forwarding captured output to `tracing`.
    pub fn new(interpreter: I) -> Self {
        Self::with_parts(interpreter, DiagnosticExtractor::default(), Box::new(TracingChannel))
    }

    /// Create a controller from explicit parts.
    pub fn with_parts(
        interpreter: I,
        extractor: DiagnosticExtractor,
        channel: Box<dyn LogChannel>,
    ) -> Self {
        Self {
            interpreter,
            extractor,
            channel,
        }
    }

    /// Replace the downstream channel captured values are forwarded to.
    pub fn set_channel(&mut self, channel: Box<dyn LogChannel>) {
        self.channel = channel;
    }

    /// The extractor used to classify failures.
    pub fn extractor(&self) -> &DiagnosticExtractor {
        &self.extractor
    }

    /// Run the session's code once.
    ///
    /// Rejected without touching the session or the interpreter while
    /// diagnostics are outstanding. Every interpreter failure, including a
    /// panic, is converted into diagnostics and reported as
    /// [`RunOutcome::Failure`].
    pub fn run(&mut self, session: &mut Session) -> Result<RunOutcome> {
        if !session.diagnostics().is_empty() {
            let outstanding = session.diagnostics().len();
            tracing::warn!(session = %session.id(), outstanding, "run rejected");
            return Err(HarnessError::RunRejected { outstanding });
        }

        session.set_status(Status::Running);
        let code = session.code().to_string();
        let started_at = Utc::now();
        let clock = Instant::now();

        let (result, captured) = {
            let interpreter = &mut self.interpreter;
            let mut sink = OutputSink::install(session.output_mut(), self.channel.as_mut());
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                interpreter.interpret(&code, &mut sink)
            }));
            (result, sink.captured())
        };
        let elapsed = clock.elapsed();

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(payload) => Some(panic_to_error(payload)),
        };

        let outcome = match failure {
            None => {
                session.replace_diagnostics(Vec::new());
                RunOutcome::Success
            }
            Some(err) => {
                tracing::error!(session = %session.id(), error = %err, "interpreter failed");
                session.replace_diagnostics(self.diagnose(&err));
                session.select_tab(Tab::Problems);
                RunOutcome::Failure
            }
        };

        session.set_status(Status::Completed(outcome));
        session.record_run(RunSummary {
            outcome,
            started_at,
            elapsed,
            captured,
        });
        tracing::info!(
            session = %session.id(),
            ?outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            captured,
            "run completed"
        );

        Ok(outcome)
    }

    /// Empty the captured output. Diagnostics and status are left alone.
    pub fn clear(&self, session: &mut Session) {
        session.output_mut().clear();
    }

    /// Drop outstanding diagnostics and return the session to `Idle`.
    ///
    /// Output is kept; use [`RunController::clear`] for that.
    pub fn reset(&self, session: &mut Session) {
        session.replace_diagnostics(Vec::new());
        session.set_status(Status::Idle);
        session.select_tab(Tab::Console);
        tracing::debug!(session = %session.id(), "session reset");
    }

    fn diagnose(&self, err: &InterpretError) -> Vec<String> {
        match err {
            InterpretError::Raised(message) => self.extractor.extract(message),
            InterpretError::Structured { kind, lines } if lines.is_empty() => vec![kind.clone()],
            InterpretError::Structured { lines, .. } => lines.clone(),
            InterpretError::Opaque => vec![UNKNOWN_ERROR.to_string()],
        }
    }
}

/// Panics carrying text are treated like raised messages; anything else is opaque.
fn panic_to_error(payload: Box<dyn Any + Send>) -> InterpretError {
    if let Some(message) = payload.downcast_ref::<&str>() {
        InterpretError::Raised(message.to_string())
    } else if let Some(message) = payload.downcast_ref::<String>() {
        InterpretError::Raised(message.clone())
    } else {
        InterpretError::Opaque
    }
}
