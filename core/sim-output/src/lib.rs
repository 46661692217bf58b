//! Simulator Output Schema v1
//!
//! Defines how a single numeric measurement is read out of the merged
//! stdout/stderr text of one simulator run.

use std::fmt;

/// Separator between a label and its value, e.g. `Elapsed time: 0.023`
pub const DELIMITER: &str = ": ";

/// Errors raised while reading a measurement. Always recoverable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line index {index} out of range for {len} lines")]
    LineOutOfRange { index: isize, len: usize },

    #[error("no \": \" delimiter in line {line:?}")]
    MissingDelimiter { line: String },

    #[error("not a number: {text:?}")]
    InvalidNumber { text: String },

    #[error("non-finite measurement: {value}")]
    NonFinite { value: f64 },
}

/// Position of the measurement line in the output.
///
/// Non-negative values count from the first line, negative values count
/// back from the end (`-1` is the last line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineIndex(pub isize);

impl LineIndex {
    pub const LAST: LineIndex = LineIndex(-1);

    /// Resolve against an output of `len` lines
    pub fn resolve(self, len: usize) -> Option<usize> {
        if self.0 >= 0 {
            let idx = self.0 as usize;
            (idx < len).then_some(idx)
        } else {
            len.checked_sub(self.0.unsigned_abs())
        }
    }
}

impl fmt::Display for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labeled value read from one output line
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub label: String,
    pub value: f64,
}

impl Measurement {
    /// Parse `"<label>: <value>"`.
    ///
    /// The value is the text between the first delimiter and the next one
    /// (if any), trimmed.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split(DELIMITER);
        let label = parts.next().unwrap_or_default();
        let text = parts.next().ok_or_else(|| ParseError::MissingDelimiter {
            line: line.to_string(),
        })?;

        let value: f64 = text.trim().parse().map_err(|_| ParseError::InvalidNumber {
            text: text.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ParseError::NonFinite { value });
        }

        Ok(Self {
            label: label.trim().to_string(),
            value,
        })
    }
}

/// Split raw process output into lines (`\n` or `\r\n` terminated)
pub fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Read the measurement at `index` from a run's output lines
pub fn parse_measurement<S: AsRef<str>>(
    lines: &[S],
    index: LineIndex,
) -> Result<Measurement, ParseError> {
    let idx = index.resolve(lines.len()).ok_or(ParseError::LineOutOfRange {
        index: index.0,
        len: lines.len(),
    })?;
    Measurement::parse_line(lines[idx].as_ref())
}
