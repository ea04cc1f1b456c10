//! Failure message classification
//!
//! External interpreters report failures as free text. The only structure
//! they promise is a banner: a block opened and closed by a run of marker
//! characters (six `*` by default), e.g.
//!
//! ```text
//! ******
//! Oops! scan tokens errors:
//! Unexpected character in line 1 column 4
//! ******
//! ```
//!
//! The matched banner, delimiters included, is split into diagnostic lines.
//! Messages without a banner classify as [`UNKNOWN_ERROR`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{HarnessError, Result};

/// Diagnostic used when a failure carries no banner.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Default banner marker character.
pub const DEFAULT_MARKER: char = '*';

/// Default minimum length of a banner delimiter run.
pub const DEFAULT_MIN_RUN: usize = 6;

static DEFAULT_EXTRACTOR: Lazy<DiagnosticExtractor> = Lazy::new(DiagnosticExtractor::default);

/// Extract diagnostics from `raw` using the default banner convention.
pub fn extract(raw: &str) -> Vec<String> {
    DEFAULT_EXTRACTOR.extract(raw)
}

/// Banner-based failure classifier.
#[derive(Debug, Clone)]
pub struct DiagnosticExtractor {
    marker: char,
    min_run: usize,
    banner: Regex,
}

impl DiagnosticExtractor {
    /// Build an extractor for banners delimited by at least `min_run` copies of `marker`.
    pub fn new(marker: char, min_run: usize) -> Result<Self> {
        if min_run == 0 {
            return Err(HarnessError::Config(
                "banner delimiter run must be at least one character".into(),
            ));
        }
        if marker.is_whitespace() {
            return Err(HarnessError::Config(format!(
                "banner marker {:?} must not be whitespace",
                marker
            )));
        }

        let escaped = regex::escape(&marker.to_string());
        let pattern = format!("(?s){escaped}{{{min_run}}}.*{escaped}{{{min_run}}}");
        let banner = Regex::new(&pattern)
            .map_err(|err| HarnessError::Config(format!("invalid banner pattern: {err}")))?;

        Ok(Self {
            marker,
            min_run,
            banner,
        })
    }

    /// Marker character this extractor looks for.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Minimum delimiter run length.
    pub fn min_run(&self) -> usize {
        self.min_run
    }

    /// Return the banner text in `raw`, delimiters included, if any.
    pub fn find_banner<'a>(&self, raw: &'a str) -> Option<&'a str> {
        self.banner.find(raw).map(|found| found.as_str())
    }

    /// Classify `raw` into ordered diagnostic lines.
    ///
    /// The banner (or the fallback) is split on `'\n'` only; lines are not trimmed.
    pub fn extract(&self, raw: &str) -> Vec<String> {
        let key = self.find_banner(raw).unwrap_or(UNKNOWN_ERROR);
        key.split('\n').map(str::to_string).collect()
    }

    /// Whether `line` is a banner delimiter (only marker characters, ignoring surrounding whitespace).
    pub fn is_delimiter(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.chars().count() >= self.min_run && trimmed.chars().all(|c| c == self.marker)
    }

    /// Number of problems represented by `lines`.
    ///
    /// Blank lines and delimiters are not problems. Inside a banner with more
    /// than one content line, the first line is the heading and is not counted.
    pub fn problem_count(&self, lines: &[String]) -> usize {
        let content = lines
            .iter()
            .filter(|line| !line.trim().is_empty() && !self.is_delimiter(line))
            .count();

        let banner = lines.len() >= 2
            && lines.first().is_some_and(|line| self.is_delimiter(line))
            && lines.last().is_some_and(|line| self.is_delimiter(line));

        if banner && content > 1 {
            content - 1
        } else {
            content
        }
    }
}

impl Default for DiagnosticExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_MIN_RUN).expect("default banner pattern is valid")
    }
}
