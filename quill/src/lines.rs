//! Indent-depth-tracking line iteration, shared by every tab/indent state-machine codec
//! (TSRG, Tiny v2, Enigma).

use std::cmp::Ordering;
use std::fmt::Debug;
use std::iter::Peekable;
use anyhow::{anyhow, Context, Result};

pub trait Line: Debug {
	fn indent(&self) -> usize;
	fn line_number(&self) -> usize;
}

/// Yields only the lines at exactly `depth`, stopping (without consuming) at the first line with
/// a shallower indent. A line with a deeper indent than expected is a parse error: callers inside
/// a nested record (`next_level`) are only ever handed lines one level deeper than their own.
pub struct WithMoreIndentIter<'a, I: Iterator> {
	depth: usize,
	iter: &'a mut Peekable<I>,
}

impl<'a, I, L> WithMoreIndentIter<'a, I>
where
	I: Iterator<Item = Result<L>>,
	L: Line,
{
	pub fn new(iter: &'a mut Peekable<I>) -> WithMoreIndentIter<'a, I> {
		WithMoreIndentIter { depth: 0, iter }
	}

	pub fn next_level(&mut self) -> WithMoreIndentIter<'_, I> {
		WithMoreIndentIter { depth: self.depth + 1, iter: self.iter }
	}

	pub fn on_every_line(mut self, mut f: impl FnMut(&mut Self, L) -> Result<()>) -> Result<()> {
		while let Some(line) = self.next() {
			let line = line?;
			let line_number = line.line_number();
			f(&mut self, line).with_context(|| anyhow!("in line {line_number}"))?;
		}
		Ok(())
	}
}

impl<I, L> Iterator for WithMoreIndentIter<'_, I>
where
	I: Iterator<Item = Result<L>>,
	L: Line,
{
	type Item = Result<L>;

	fn next(&mut self) -> Option<Self::Item> {
		match self.iter.peek()? {
			Ok(line) => match line.indent().cmp(&self.depth) {
				Ordering::Less => None,
				Ordering::Equal => self.iter.next(),
				Ordering::Greater => Some(Err(anyhow!("expected an indentation of {} for line {}: {:?}", self.depth, line.line_number(), line))),
			},
			Err(_) => self.iter.next(),
		}
	}
}

/// A tab/space-separated line, split into fields, with helpers mirroring how every tabular
/// format here (SRG/CSRG/Tiny/TSRG/Recaf) is actually tokenized once the indent prefix is
/// stripped.
#[derive(Debug)]
pub struct FieldLine {
	line_number: usize,
	indent: usize,
	fields: std::vec::IntoIter<String>,
}

impl FieldLine {
	pub fn new(line_number: usize, line: &str, indent_char: char, separator: char) -> FieldLine {
		let indent = line.chars().take_while(|&c| c == indent_char).count();
		let line = &line[indent..];
		let fields: Vec<String> = line.split(separator).map(|s| s.to_owned()).collect();
		FieldLine { line_number, indent, fields: fields.into_iter() }
	}

	pub fn line_number(&self) -> usize {
		self.line_number
	}

	pub fn next(&mut self) -> Result<String> {
		self.fields.next().with_context(|| anyhow!("expected another field in line {}", self.line_number))
	}

	pub fn next_opt(&mut self) -> Option<String> {
		self.fields.next()
	}

	pub fn rest(&mut self) -> Vec<String> {
		self.fields.by_ref().collect()
	}

	pub fn end(mut self) -> Result<()> {
		if let Some(extra) = self.fields.next() {
			anyhow::bail!("line {} contained unexpected extra field {extra:?}", self.line_number);
		}
		Ok(())
	}
}

impl Line for FieldLine {
	fn indent(&self) -> usize {
		self.indent
	}
	fn line_number(&self) -> usize {
		self.line_number
	}
}

/// Splits text into `(1-based line number, line)` pairs, skipping a trailing empty line from a
/// final newline but keeping blank lines in the middle (codecs decide whether those are
/// significant).
pub fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
	text.lines().enumerate().map(|(i, line)| (i + 1, line))
}
