//! Pre-compiled interpreters driven as child processes.
//!
//! The executable receives the source text on stdin. Each stdout line is one
//! printed value, kept verbatim. With `json_lines` set, lines that parse as
//! JSON keep their structure instead. Invalid UTF-8 is replaced, never fatal.
//! A non-zero exit is a failure whose message is the
//! process's stderr, so banner-formatted errors classify as usual.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::harness::controller::Interpreter;
use crate::harness::error::InterpretError;
use crate::harness::loggable::Loggable;
use crate::harness::sink::LogChannel;

/// Executable and arguments of an external interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments passed before the source is written to stdin.
    #[serde(default)]
    pub args: Vec<String>,
    /// Decode stdout lines as JSON values instead of plain text.
    #[serde(default)]
    pub json_lines: bool,
}

impl CommandSpec {
    /// Command without arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            json_lines: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Decode stdout lines as JSON.
    pub fn json_lines(mut self, enabled: bool) -> Self {
        self.json_lines = enabled;
        self
    }
}

/// [`Interpreter`] backed by an external executable.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    spec: CommandSpec,
}

impl CommandInterpreter {
    /// Wrap `spec`.
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl Interpreter for CommandInterpreter {
    fn interpret(
        &mut self,
        code: &str,
        console: &mut dyn LogChannel,
    ) -> Result<(), InterpretError> {
        let program = &self.spec.program;
        let mut child = Command::new(program)
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| InterpretError::Raised(format!("failed to spawn '{program}': {err}")))?;
        tracing::debug!(program = %program, pid = child.id(), "interpreter process spawned");

        // stdin and stderr are serviced on helper threads while stdout is read here.
        let writer = child.stdin.take().map(|mut stdin| {
            let source = code.to_string();
            thread::spawn(move || stdin.write_all(source.as_bytes()))
        });
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut bytes = Vec::new();
                stderr
                    .read_to_end(&mut bytes)
                    .map(|_| String::from_utf8_lossy(&bytes).into_owned())
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(strip_newline(&buf));
                        console.log(&[self.decode(&line)]);
                    }
                    Err(err) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(InterpretError::Raised(format!(
                            "failed to read output from '{program}': {err}"
                        )));
                    }
                }
            }
        }

        let status = child.wait().map_err(|err| {
            InterpretError::Raised(format!("failed to wait for '{program}': {err}"))
        })?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Err(err)) => {
                    tracing::debug!(program = %program, error = %err, "interpreter closed stdin early")
                }
                Ok(Ok(())) => {}
                Err(_) => tracing::warn!(program = %program, "stdin writer panicked"),
            }
        }
        let stderr = match stderr_reader.map(|handle| handle.join()) {
            Some(Ok(Ok(text))) => text,
            _ => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        tracing::debug!(program = %program, code = ?status.code(), "interpreter exited with failure");
        if stderr.trim().is_empty() {
            Err(InterpretError::Opaque)
        } else {
            Err(InterpretError::Raised(stderr))
        }
    }
}

impl CommandInterpreter {
    fn decode(&self, line: &str) -> Loggable {
        if !self.spec.json_lines {
            return line.into();
        }
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => value.into(),
            Err(_) => line.into(),
        }
    }
}

fn strip_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::sink::capture;

    #[test]
    fn test_lines_are_verbatim_by_default() {
        let interpreter = CommandInterpreter::new(CommandSpec::new("lox"));
        for line in ["1.50", "12345678901234567890", "\"hi\"", "-0", " 7 ", "null"] {
            assert_eq!(capture(&interpreter.decode(line)), line);
        }
    }

    #[test]
    fn test_json_lines_decode() {
        let interpreter = CommandInterpreter::new(CommandSpec::new("lox").json_lines(true));
        assert_eq!(capture(&interpreter.decode("42")), "42");
        assert_eq!(capture(&interpreter.decode("nil")), "nil");
        assert_eq!(capture(&interpreter.decode("\"quoted\"")), "quoted");
        assert_eq!(capture(&interpreter.decode("{\"a\": [1, 2]}")), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline(b"abc\r\n"), b"abc");
        assert_eq!(strip_newline(b"abc\n"), b"abc");
        assert_eq!(strip_newline(b"abc"), b"abc");
    }

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("lox").arg("-q").args(["--stdin", "--color=never"]);
        assert_eq!(spec.program, "lox");
        assert_eq!(spec.args, vec!["-q", "--stdin", "--color=never"]);
        assert!(!spec.json_lines);
    }

    #[test]
    fn test_missing_program_is_raised() {
        let mut interpreter =
            CommandInterpreter::new(CommandSpec::new("definitely-not-an-interpreter-binary"));
        let mut console = crate::harness::sink::NullChannel;
        let err = interpreter.interpret("", &mut console).unwrap_err();
        assert!(matches!(err, InterpretError::Raised(ref msg) if msg.contains("failed to spawn")));
    }
}
