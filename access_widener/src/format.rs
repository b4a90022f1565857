//! Text format: `accessWidener v<N> <namespace>` header followed by `<access> <kind> <args...>`
//! lines. v1 tolerates arbitrary whitespace; v2 forbids leading whitespace and is otherwise
//! whitespace-delimited the same way.

use anyhow::{bail, Context, Result};
use crate::model::{AccessWidener, AccessedMember, ACCESSIBLE, EXTENDABLE, MUTABLE, TRANSITIVE_ACCESSIBLE, TRANSITIVE_EXTENDABLE, TRANSITIVE_MUTABLE};

fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
	text.lines().enumerate().map(|(i, line)| (i + 1, line))
}

fn parse_access(token: &str, version: u32, line_number: usize) -> Result<(u8, bool)> {
	let (transitive, base) = match token.strip_prefix("transitive-") {
		Some(rest) => {
			if version < 2 {
				bail!("line {line_number}: `transitive-` requires v2 or later");
			}
			(true, rest)
		}
		None => (false, token),
	};
	let bit = match base {
		"accessible" => {
			if transitive {
				TRANSITIVE_ACCESSIBLE
			} else {
				ACCESSIBLE
			}
		}
		"extendable" => {
			if transitive {
				TRANSITIVE_EXTENDABLE
			} else {
				EXTENDABLE
			}
		}
		"mutable" => {
			if transitive {
				TRANSITIVE_MUTABLE
			} else {
				MUTABLE
			}
		}
		other => bail!("line {line_number}: unknown access kind {other:?}"),
	};
	Ok((bit, transitive))
}

pub fn parse(text: &str) -> Result<AccessWidener> {
	let mut lines = numbered_lines(text).filter(|(_, l)| !l.trim().is_empty());

	let (header_number, header_line) = lines.next().context("empty access widener: no header")?;
	let header_tokens: Vec<&str> = header_line.split_whitespace().collect();
	let [head, version_token, namespace] = header_tokens.as_slice() else {
		bail!("line {header_number}: malformed header {header_line:?}, expected `accessWidener v<N> <namespace>`");
	};
	if *head != "accessWidener" {
		bail!("line {header_number}: not an access widener file");
	}
	let version_str = version_token.strip_prefix('v').with_context(|| format!("line {header_number}: version must look like `v1` or `v2`"))?;
	let version: u32 = version_str.parse().with_context(|| format!("line {header_number}: invalid version {version_token:?}"))?;
	if !(1..=2).contains(&version) {
		bail!("line {header_number}: unsupported access widener version {version}");
	}

	let mut widener = AccessWidener::new(version, *namespace);

	for (line_number, raw_line) in lines {
		if raw_line.trim_start().starts_with('#') {
			continue;
		}
		if version >= 2 && raw_line.starts_with(|c: char| c.is_whitespace()) {
			bail!("line {line_number}: v2 forbids leading whitespace");
		}

		let tokens: Vec<&str> = raw_line.split_whitespace().collect();
		let [access_token, kind, args @ ..] = tokens.as_slice() else {
			bail!("line {line_number}: empty line survived blank-line filtering");
		};

		let (bit, _transitive) = parse_access(access_token, version, line_number)?;

		match *kind {
			"class" => {
				let [name] = args else {
					bail!("line {line_number}: `class` takes exactly one argument, got {}", args.len());
				};
				if bit & (MUTABLE | TRANSITIVE_MUTABLE) != 0 {
					bail!("line {line_number}: `mutable` is not valid on a class");
				}
				widener.add_class(*name, bit);
			}
			"method" | "field" => {
				let [owner, name, desc] = args else {
					bail!("line {line_number}: `{kind}` takes exactly three arguments, got {}", args.len());
				};
				let member = AccessedMember::new(*owner, *name, *desc);
				if *kind == "method" {
					if bit & (MUTABLE | TRANSITIVE_MUTABLE) != 0 {
						bail!("line {line_number}: `mutable` is not valid on a method");
					}
					widener.add_method(member, bit);
				} else {
					if bit & (EXTENDABLE | TRANSITIVE_EXTENDABLE) != 0 {
						bail!("line {line_number}: `extendable` is not valid on a field");
					}
					widener.add_field(member, bit);
				}
			}
			other => bail!("line {line_number}: unknown kind {other:?}"),
		}
	}

	Ok(widener)
}

fn push_bit_lines(out: &mut String, prefix_kind: &str, args: &str, mask: u8) {
	for (bit, base_name) in [(ACCESSIBLE, "accessible"), (EXTENDABLE, "extendable"), (MUTABLE, "mutable")] {
		if mask & bit != 0 {
			out.push_str(base_name);
			out.push(' ');
			out.push_str(prefix_kind);
			out.push(' ');
			out.push_str(args);
			out.push('\n');
		}
		let transitive_bit = match bit {
			ACCESSIBLE => TRANSITIVE_ACCESSIBLE,
			EXTENDABLE => TRANSITIVE_EXTENDABLE,
			MUTABLE => TRANSITIVE_MUTABLE,
			_ => unreachable!(),
		};
		if mask & transitive_bit != 0 {
			out.push_str("transitive-");
			out.push_str(base_name);
			out.push(' ');
			out.push_str(prefix_kind);
			out.push(' ');
			out.push_str(args);
			out.push('\n');
		}
	}
}

/// Deterministic: header, then one line per (class, mask bit), (field, mask bit), (method, mask
/// bit); classes before fields before methods, each group in insertion order.
pub fn write(widener: &AccessWidener) -> Result<String> {
	let mut out = String::new();
	out.push_str(&format!("accessWidener\tv{}\t{}\n", widener.version, widener.namespace));

	for (name, mask) in &widener.classes {
		push_bit_lines(&mut out, "class", name, mask.0);
	}
	for (member, mask) in &widener.fields {
		push_bit_lines(&mut out, "field", &format!("{} {} {}", member.owner, member.name, member.desc), mask.0);
	}
	for (member, mask) in &widener.methods {
		push_bit_lines(&mut out, "method", &format!("{} {} {}", member.owner, member.name, member.desc), mask.0);
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_v2_header_and_class_line() {
		let widener = parse("accessWidener\tv2\tofficial\naccessible\tclass\tcom/example/Foo\n").unwrap();
		assert_eq!(widener.version, 2);
		assert_eq!(widener.namespace, "official");
		assert_eq!(widener.classes.get("com/example/Foo"), Some(&crate::model::AccessMask(ACCESSIBLE)));
	}

	#[test]
	fn v1_tolerates_arbitrary_whitespace_and_indentation() {
		let widener = parse("accessWidener   v1   official\n   accessible  class   com/example/Foo  \n").unwrap();
		assert_eq!(widener.classes.get("com/example/Foo"), Some(&crate::model::AccessMask(ACCESSIBLE)));
	}

	#[test]
	fn v2_rejects_leading_whitespace() {
		let err = parse("accessWidener\tv2\tofficial\n\taccessible\tclass\tcom/example/Foo\n").unwrap_err();
		assert!(err.to_string().contains("leading"), "{err}");
	}

	#[test]
	fn mutable_on_class_is_rejected() {
		let err = parse("accessWidener\tv2\tofficial\nmutable\tclass\tcom/example/Foo\n").unwrap_err();
		assert!(err.to_string().contains("not valid on a class"), "{err}");
	}

	#[test]
	fn extendable_on_field_is_rejected() {
		let err = parse("accessWidener\tv2\tofficial\nextendable\tfield\tcom/example/Foo\tbar\tI\n").unwrap_err();
		assert!(err.to_string().contains("not valid on a field"), "{err}");
	}

	#[test]
	fn transitive_prefix_requires_v2() {
		let err = parse("accessWidener\tv1\tofficial\ntransitive-accessible\tclass\tcom/example/Foo\n").unwrap_err();
		assert!(err.to_string().contains("v2"), "{err}");
	}

	#[test]
	fn duplicate_lines_combine_with_or() {
		let widener = parse("accessWidener\tv2\tofficial\naccessible\tclass\tcom/example/Foo\nextendable\tclass\tcom/example/Foo\n").unwrap();
		let mask = widener.classes.get("com/example/Foo").unwrap();
		assert!(mask.contains(ACCESSIBLE));
		assert!(mask.contains(EXTENDABLE));
	}

	#[test]
	fn write_round_trips_through_parse() {
		let mut widener = AccessWidener::new(2, "official");
		widener.add_class("com/example/Foo", ACCESSIBLE | EXTENDABLE);
		widener.add_method(AccessedMember::new("com/example/Foo", "bar", "()V"), ACCESSIBLE);
		widener.add_field(AccessedMember::new("com/example/Foo", "baz", "I"), MUTABLE);

		let text = write(&widener).unwrap();
		let parsed = parse(&text).unwrap();
		assert_eq!(parsed, widener);
	}
}
