//! Output channel interception
//!
//! Interpreters print through a [`LogChannel`]. For the duration of a run the
//! controller installs an [`OutputSink`] in front of the downstream channel:
//! every emitted value is rendered into the session output and then handed on
//! unchanged, so the downstream channel keeps working for local debugging.
//! The sink borrows both ends, so dropping it is the release and happens on
//! every exit path.

use parking_lot::Mutex;
use std::sync::Arc;

use super::loggable::Loggable;

/// Target used when forwarding interpreter output to `tracing`.
pub const CONSOLE_TARGET: &str = "playground::console";

/// Channel an interpreter prints through.
pub trait LogChannel {
    /// Emit one print call. Each value becomes one output entry.
    fn log(&mut self, values: &[Loggable]);

    /// Whether this channel already captures into a session.
    fn is_capturing(&self) -> bool {
        false
    }
}

/// Render one emitted value into its display string.
///
/// Never fails: structured values that cannot be serialized fall back to an
/// `[object <Type>]` tag.
pub fn capture(value: &Loggable) -> String {
    match value {
        Loggable::Null => "null".to_string(),
        Loggable::Primitive(primitive) => primitive.to_string(),
        Loggable::Structured(structured) => match structured.to_json() {
            Ok(json) => json.to_string(),
            Err(err) => {
                tracing::debug!(error = %err, "structured value not serializable, using type tag");
                format!("[object {}]", structured.type_tag())
            }
        },
    }
}

/// Scoped interceptor in front of a downstream channel.
pub struct OutputSink<'a> {
    output: Option<&'a mut Vec<String>>,
    downstream: &'a mut dyn LogChannel,
    captured: usize,
}

impl<'a> OutputSink<'a> {
    /// Install the sink in front of `downstream`, appending to `output`.
    ///
    /// Installing over a channel that is already capturing yields a
    /// pass-through sink, so values are never captured twice.
    pub fn install(output: &'a mut Vec<String>, downstream: &'a mut dyn LogChannel) -> Self {
        let output = if downstream.is_capturing() {
            tracing::debug!("output sink already active, installing pass-through");
            None
        } else {
            tracing::debug!("output sink installed");
            Some(output)
        };

        Self {
            output,
            downstream,
            captured: 0,
        }
    }

    /// Number of entries this sink appended.
    pub fn captured(&self) -> usize {
        self.captured
    }
}

impl LogChannel for OutputSink<'_> {
    fn log(&mut self, values: &[Loggable]) {
        if let Some(output) = self.output.as_deref_mut() {
            output.extend(values.iter().map(capture));
            self.captured += values.len();
        }
        self.downstream.log(values);
    }

    fn is_capturing(&self) -> bool {
        true
    }
}

impl Drop for OutputSink<'_> {
    fn drop(&mut self) {
        if self.output.is_some() {
            tracing::debug!(captured = self.captured, "output sink released");
        }
    }
}

/// Downstream channel forwarding every value to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingChannel;

impl LogChannel for TracingChannel {
    fn log(&mut self, values: &[Loggable]) {
        for value in values {
            tracing::info!(target: CONSOLE_TARGET, "{}", capture(value));
        }
    }
}

/// Downstream channel that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl LogChannel for NullChannel {
    fn log(&mut self, _values: &[Loggable]) {}
}

/// Downstream channel printing each value on its own stdout line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutChannel;

impl LogChannel for StdoutChannel {
    fn log(&mut self, values: &[Loggable]) {
        for value in values {
            println!("{}", capture(value));
        }
    }
}

/// Downstream channel recording rendered lines in shared memory.
///
/// Clones share the same buffer, so a handle kept by the caller sees what
/// the harness forwarded.
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines forwarded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LogChannel for MemoryChannel {
    fn log(&mut self, values: &[Loggable]) {
        self.lines.lock().extend(values.iter().map(capture));
    }
}
