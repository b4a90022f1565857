//! Line-numbered parse errors shared by every format codec.

use std::fmt::{Display, Formatter};

/// A malformed-input error carrying the 1-based line number and the offending content, so
/// callers can report `error: line 14: ...` without re-deriving position from a raw `anyhow`
/// message.
#[derive(Debug)]
pub struct ParseError {
	pub line_number: usize,
	pub message: String,
}

impl Display for ParseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "line {}: {}", self.line_number, self.message)
	}
}

impl std::error::Error for ParseError {}

impl ParseError {
	pub fn new(line_number: usize, message: impl Into<String>) -> ParseError {
		ParseError { line_number, message: message.into() }
	}
}

pub trait OnLine<T> {
	fn on_line(self, line_number: usize) -> anyhow::Result<T>;
}

impl<T> OnLine<T> for anyhow::Result<T> {
	fn on_line(self, line_number: usize) -> anyhow::Result<T> {
		self.map_err(|e| anyhow::Error::new(ParseError::new(line_number, e.to_string())))
	}
}
