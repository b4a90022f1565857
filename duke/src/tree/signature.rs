//! Generic-signature parsing and rewriting (JVMS 4.7.9.1). A class/method/field `signature`
//! attribute carries a richer, generics-aware grammar than a plain descriptor, but the class
//! names embedded in it need remapping the same way; this walks the grammar just far enough to
//! find those names without losing wildcards, type variables or bounds.

use std::iter::Peekable;
use std::str::Chars;
use anyhow::{bail, Result};

fn is_identifier_char(c: char) -> bool {
	!matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':')
}

fn read_identifier(chars: &mut Peekable<Chars>) -> String {
	let mut out = String::new();
	while let Some(&c) = chars.peek() {
		if is_identifier_char(c) {
			out.push(c);
			chars.next();
		} else {
			break;
		}
	}
	out
}

fn expect(chars: &mut Peekable<Chars>, expected: char) -> Result<()> {
	match chars.next() {
		Some(c) if c == expected => Ok(()),
		other => bail!("expected {expected:?}, got {other:?}"),
	}
}

/// A `ClassTypeSignature`: `L` (package-qualified name) [`<` type arguments `>`] (`.` inner
/// segment)* `;`. Only the outermost qualified name is looked up; inner-class suffixes and type
/// arguments are walked recursively but their simple names aren't independently remapped.
fn class_type_signature(chars: &mut Peekable<Chars>, out: &mut String, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
	expect(chars, 'L')?;
	out.push('L');

	let mut name = String::new();
	while let Some(&c) = chars.peek() {
		if c == '/' || is_identifier_char(c) {
			name.push(c);
			chars.next();
		} else {
			break;
		}
	}
	out.push_str(&lookup(&name).unwrap_or(name));

	if chars.peek() == Some(&'<') {
		type_arguments(chars, out, lookup)?;
	}

	while chars.peek() == Some(&'.') {
		out.push('.');
		chars.next();
		out.push_str(&read_identifier(chars));
		if chars.peek() == Some(&'<') {
			type_arguments(chars, out, lookup)?;
		}
	}

	expect(chars, ';')?;
	out.push(';');
	Ok(())
}

fn type_arguments(chars: &mut Peekable<Chars>, out: &mut String, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
	expect(chars, '<')?;
	out.push('<');
	while chars.peek() != Some(&'>') {
		match chars.peek() {
			Some('*') => {
				out.push('*');
				chars.next();
			}
			Some(&sign @ ('+' | '-')) => {
				out.push(sign);
				chars.next();
				type_signature(chars, out, lookup)?;
			}
			None => bail!("unterminated type argument list"),
			_ => type_signature(chars, out, lookup)?,
		}
	}
	expect(chars, '>')?;
	out.push('>');
	Ok(())
}

fn type_signature(chars: &mut Peekable<Chars>, out: &mut String, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
	match chars.peek() {
		Some('L') => class_type_signature(chars, out, lookup),
		Some('T') => {
			out.push('T');
			chars.next();
			out.push_str(&read_identifier(chars));
			expect(chars, ';')?;
			out.push(';');
			Ok(())
		}
		Some('[') => {
			out.push('[');
			chars.next();
			type_signature(chars, out, lookup)
		}
		Some(&c) if matches!(c, 'Z' | 'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S') => {
			out.push(c);
			chars.next();
			Ok(())
		}
		other => bail!("unexpected {other:?} in type signature"),
	}
}

/// A bound in a `FormalTypeParameter`: either absent (no class bound, only interface bounds
/// follow) or a `FieldTypeSignature`.
fn optional_bound(chars: &mut Peekable<Chars>, out: &mut String, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
	if chars.peek() == Some(&':') || chars.peek() == Some(&'>') {
		return Ok(());
	}
	type_signature(chars, out, lookup)
}

fn formal_type_parameters(chars: &mut Peekable<Chars>, out: &mut String, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
	expect(chars, '<')?;
	out.push('<');
	while chars.peek() != Some(&'>') {
		out.push_str(&read_identifier(chars));
		expect(chars, ':')?;
		out.push(':');
		optional_bound(chars, out, lookup)?;
		while chars.peek() == Some(&':') {
			out.push(':');
			chars.next();
			type_signature(chars, out, lookup)?;
		}
	}
	expect(chars, '>')?;
	out.push('>');
	Ok(())
}

/// Rewrites every class name embedded in a class, method or field generic-signature string
/// through `lookup`, leaving type variables, wildcards, arrays, primitives and bounds structure
/// otherwise intact.
pub fn map_signature(signature: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
	let mut chars = signature.chars().peekable();
	let mut out = String::new();

	if chars.peek() == Some(&'<') {
		formal_type_parameters(&mut chars, &mut out, lookup)?;
	}

	if chars.peek() == Some(&'(') {
		out.push('(');
		chars.next();
		while chars.peek() != Some(&')') {
			type_signature(&mut chars, &mut out, lookup)?;
		}
		expect(&mut chars, ')')?;
		out.push(')');
		if chars.peek() == Some(&'V') {
			out.push('V');
			chars.next();
		} else {
			type_signature(&mut chars, &mut out, lookup)?;
		}
		while chars.peek() == Some(&'^') {
			out.push('^');
			chars.next();
			type_signature(&mut chars, &mut out, lookup)?;
		}
	} else {
		while chars.peek().is_some() {
			type_signature(&mut chars, &mut out, lookup)?;
		}
	}

	if chars.peek().is_some() {
		bail!("trailing data after signature {signature:?}");
	}
	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;

	fn rename(from: &str, to: &str) -> impl Fn(&str) -> Option<String> {
		let from = from.to_owned();
		let to = to.to_owned();
		move |n: &str| (n == from).then(|| to.clone())
	}

	#[test]
	fn field_signature_rewrites_type_argument() {
		let sig = "Ljava/util/List<Lfoo/Bar;>;";
		let mapped = map_signature(sig, &rename("foo/Bar", "a/B")).unwrap();
		assert_eq!(mapped, "Ljava/util/List<La/B;>;");
	}

	#[test]
	fn class_signature_rewrites_superclass_and_interfaces() {
		let sig = "<T:Ljava/lang/Object;>Lfoo/Base<TT;>;Ljava/io/Serializable;";
		let mapped = map_signature(sig, &rename("foo/Base", "a/Base")).unwrap();
		assert_eq!(mapped, "<T:Ljava/lang/Object;>La/Base<TT;>;Ljava/io/Serializable;");
	}

	#[test]
	fn method_signature_rewrites_params_return_and_throws() {
		let sig = "(Lfoo/Bar;)Lfoo/Baz;^Lfoo/Err;";
		let mapped = map_signature(
			sig,
			&|n| match n {
				"foo/Bar" => Some("a/B".to_owned()),
				"foo/Baz" => Some("a/C".to_owned()),
				"foo/Err" => Some("a/E".to_owned()),
				_ => None,
			},
		)
		.unwrap();
		assert_eq!(mapped, "(La/B;)La/C;^La/E;");
	}

	#[test]
	fn type_variables_and_wildcards_are_left_alone() {
		let sig = "Ljava/util/List<+Ljava/lang/Number;>;";
		let mapped = map_signature(sig, &|_| None).unwrap();
		assert_eq!(mapped, sig);

		let sig = "TT;";
		assert_eq!(map_signature(sig, &|_| None).unwrap(), sig);
	}

	#[test]
	fn inner_class_suffix_round_trips() {
		let sig = "Lfoo/Outer<Ljava/lang/String;>.Inner;";
		let mapped = map_signature(sig, &rename("foo/Outer", "a/Outer")).unwrap();
		assert_eq!(mapped, "La/Outer<Ljava/lang/String;>.Inner;");
	}
}
