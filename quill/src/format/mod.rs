//! Mapping file codecs, and the explicit/auto-detecting entry points over all of them.

pub mod compacted;
pub mod csrg;
pub mod enigma;
pub mod proguard;
pub mod recaf;
pub mod srg;
pub mod tiny_v1;
pub mod tiny_v2;
pub mod tsrg;

use anyhow::{bail, Context, Result};
use crate::tree::mappings::Mappings;

/// Every codec this crate knows how to read/write, named independently of file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingsFormat {
	TinyV1,
	TinyV2,
	Srg,
	Xsrg,
	Csrg,
	TsrgV1,
	TsrgV2,
	Proguard,
	Enigma,
	Recaf,
	Compacted,
}

impl MappingsFormat {
	/// The order [`detect`] tries formats in. `Csrg`, `Recaf` and `Compacted` are not
	/// auto-detectable (arity-based or binary) and are excluded; callers must select them
	/// explicitly via [`parse_as`].
	const DETECTION_ORDER: &'static [MappingsFormat] = &[
		MappingsFormat::TinyV1,
		MappingsFormat::TinyV2,
		MappingsFormat::Srg,
		MappingsFormat::Xsrg,
		MappingsFormat::Proguard,
		MappingsFormat::TsrgV1,
		MappingsFormat::TsrgV2,
		MappingsFormat::Enigma,
	];

	fn looks_like(self, text: &str) -> bool {
		let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
		match self {
			MappingsFormat::TinyV1 => first_line.starts_with("v1\t"),
			MappingsFormat::TinyV2 => first_line.starts_with("tiny\t2\t0"),
			MappingsFormat::Srg => {
				let is_fd = first_line.starts_with("FD:");
				(is_fd && first_line.split_whitespace().count() != 4) || first_line.starts_with("CL:") || first_line.starts_with("MD:") || first_line.starts_with("PK:")
			}
			MappingsFormat::Xsrg => first_line.starts_with("FD:") && first_line.split_whitespace().count() == 4,
			MappingsFormat::Csrg => false,
			MappingsFormat::TsrgV1 => first_line.contains(' ') && !first_line.starts_with("tsrg2"),
			MappingsFormat::TsrgV2 => first_line.starts_with("tsrg2 "),
			MappingsFormat::Proguard => first_line.trim_end().ends_with(':') && first_line.contains(" -> "),
			MappingsFormat::Enigma => first_line.starts_with("CLASS "),
			MappingsFormat::Recaf => false,
			MappingsFormat::Compacted => false,
		}
	}

	pub fn parse(self, text: &str) -> Result<Mappings> {
		match self {
			MappingsFormat::TinyV1 => tiny_v1::parse(text),
			MappingsFormat::TinyV2 => tiny_v2::parse(text),
			MappingsFormat::Srg => srg::parse(text, false),
			MappingsFormat::Xsrg => srg::parse(text, true),
			MappingsFormat::Csrg => csrg::parse(text),
			MappingsFormat::TsrgV1 => tsrg::parse_v1(text),
			MappingsFormat::TsrgV2 => tsrg::parse_v2(text),
			MappingsFormat::Proguard => proguard::parse(text),
			MappingsFormat::Enigma => enigma::parse(text),
			MappingsFormat::Recaf => recaf::parse(text),
			MappingsFormat::Compacted => bail!("compacted mappings are a binary format, use compacted::read on bytes"),
		}
	}

	pub fn write(self, mappings: &Mappings) -> Result<String> {
		match self {
			MappingsFormat::TinyV1 => tiny_v1::write(mappings),
			MappingsFormat::TinyV2 => tiny_v2::write(mappings, false),
			MappingsFormat::Srg => srg::write(mappings, false),
			MappingsFormat::Xsrg => srg::write(mappings, true),
			MappingsFormat::Csrg => csrg::write(mappings),
			MappingsFormat::TsrgV1 => tsrg::write_v1(mappings),
			MappingsFormat::TsrgV2 => tsrg::write_v2(mappings),
			MappingsFormat::Proguard => proguard::write(mappings),
			MappingsFormat::Enigma => enigma::write(mappings),
			MappingsFormat::Recaf => recaf::write(mappings),
			MappingsFormat::Compacted => bail!("compacted mappings are a binary format, use compacted::write for bytes"),
		}
	}
}

/// Explicit-format entry point (SPEC_FULL §4.10): skips detection entirely.
pub fn parse_as(format: MappingsFormat, text: &str) -> Result<Mappings> {
	format.parse(text).with_context(|| format!("parsing as {format:?}"))
}

pub fn write_as(format: MappingsFormat, mappings: &Mappings) -> Result<String> {
	format.write(mappings).with_context(|| format!("writing as {format:?}"))
}

/// Tries every auto-detectable codec in [`MappingsFormat::DETECTION_ORDER`] and parses with the
/// first whose heuristic matches. Ambiguous input is resolved by that fixed order, not by trying
/// every codec and picking the one that parses cleanly.
pub fn detect(text: &str) -> Result<Mappings> {
	for &format in MappingsFormat::DETECTION_ORDER {
		if format.looks_like(text) {
			return parse_as(format, text);
		}
	}
	bail!("could not detect a mappings format from the input")
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn detects_plain_srg_by_its_three_token_fd_line() {
		let text = "CL: a/A b/B\nFD: a/A/f b/B/g\n";
		assert!(MappingsFormat::Srg.looks_like(text));
		assert!(!MappingsFormat::Xsrg.looks_like(text));
	}

	#[test]
	fn detects_xsrg_by_its_four_token_fd_line_even_though_srg_is_tried_first() {
		let text = "FD: a/A/f Ld; b/B/g\n";
		assert!(!MappingsFormat::Srg.looks_like(text));
		assert!(MappingsFormat::Xsrg.looks_like(text));

		let mut tried = MappingsFormat::DETECTION_ORDER.iter().copied();
		let chosen = tried.find(|f| f.looks_like(text));
		assert_eq!(chosen, Some(MappingsFormat::Xsrg));
	}
}
