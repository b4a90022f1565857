//! Parsing and writing of JVM field/method descriptors (JVMS 4.3.2, 4.3.3).

use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};

/// A single JVM type, as it appears in a descriptor.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	Boolean,
	Byte,
	Char,
	Short,
	Int,
	Long,
	Float,
	Double,
	Object(String),
	/// `dimensions` is always `>= 1`; the inner type is never itself an `Array`.
	Array(u8, Box<Type>),
}

impl Type {
	pub fn is_primitive(&self) -> bool {
		!matches!(self, Type::Object(_) | Type::Array(..))
	}
}

fn read_one(chars: &mut Peekable<Chars>) -> Result<Type> {
	let mut dims = 0u8;
	while chars.next_if_eq(&'[').is_some() {
		dims += 1;
	}

	let c = chars.next().ok_or_else(|| anyhow!("unexpected end of descriptor"))?;
	let base = match c {
		'Z' => Type::Boolean,
		'B' => Type::Byte,
		'C' => Type::Char,
		'S' => Type::Short,
		'I' => Type::Int,
		'J' => Type::Long,
		'F' => Type::Float,
		'D' => Type::Double,
		'L' => {
			let mut name = String::new();
			loop {
				match chars.next() {
					Some(';') => break,
					Some(c) => name.push(c),
					None => bail!("unterminated object type, missing ';'"),
				}
			}
			if name.is_empty() {
				bail!("empty class name in descriptor");
			}
			Type::Object(name)
		},
		other => bail!("unexpected character {other:?} in descriptor"),
	};

	Ok(if dims == 0 {
		base
	} else {
		Type::Array(dims, Box::new(base))
	})
}

fn write_one(t: &Type, out: &mut String) {
	match t {
		Type::Boolean => out.push('Z'),
		Type::Byte => out.push('B'),
		Type::Char => out.push('C'),
		Type::Short => out.push('S'),
		Type::Int => out.push('I'),
		Type::Long => out.push('J'),
		Type::Float => out.push('F'),
		Type::Double => out.push('D'),
		Type::Object(name) => {
			out.push('L');
			out.push_str(name);
			out.push(';');
		},
		Type::Array(dims, inner) => {
			for _ in 0..*dims {
				out.push('[');
			}
			write_one(inner, out);
		},
	}
}

/// A parsed field (or generally: a single-type) descriptor, e.g. `Lfoo/Bar;` or `[I`.
pub fn parse_field_descriptor(desc: &str) -> Result<Type> {
	let mut chars = desc.chars().peekable();
	let t = read_one(&mut chars).with_context(|| anyhow!("failed to parse field descriptor {desc:?}"))?;
	if chars.peek().is_some() {
		bail!("trailing data after field descriptor {desc:?}");
	}
	Ok(t)
}

pub fn write_field_descriptor(t: &Type) -> String {
	let mut s = String::new();
	write_one(t, &mut s);
	s
}

/// A parsed method descriptor: `(args)ret`, with `None` as the return type standing for `void`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MethodDescriptor {
	pub parameters: Vec<Type>,
	pub return_type: Option<Type>,
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
	let mut chars = desc.chars().peekable();
	if chars.next_if_eq(&'(').is_none() {
		bail!("method descriptor {desc:?} doesn't start with '('");
	}

	let mut parameters = Vec::new();
	loop {
		if chars.next_if_eq(&')').is_some() {
			break;
		}
		parameters.push(read_one(&mut chars).with_context(|| anyhow!("failed to parse parameter of {desc:?}"))?);
	}

	let return_type = if chars.next_if_eq(&'V').is_some() {
		None
	} else {
		Some(read_one(&mut chars).with_context(|| anyhow!("failed to parse return type of {desc:?}"))?)
	};

	if chars.peek().is_some() {
		bail!("trailing data after method descriptor {desc:?}");
	}

	Ok(MethodDescriptor { parameters, return_type })
}

pub fn write_method_descriptor(d: &MethodDescriptor) -> String {
	let mut s = String::from("(");
	for p in &d.parameters {
		write_one(p, &mut s);
	}
	s.push(')');
	match &d.return_type {
		Some(t) => write_one(t, &mut s),
		None => s.push('V'),
	}
	s
}

/// Returns the argument size (slots), counting the implicit `this` as one. `double`/`long`
/// parameters occupy two slots each. Used to compute invocation stack effects.
pub fn argument_slots(d: &MethodDescriptor, is_static: bool) -> u16 {
	let mut slots = if is_static { 0 } else { 1 };
	for p in &d.parameters {
		slots += match p {
			Type::Long | Type::Double => 2,
			_ => 1,
		};
	}
	slots
}

/// Rewrites every `Lowner;` reference (and array element type) in a field descriptor through
/// `lookup`. Primitives and array brackets are left untouched.
pub fn map_type(desc: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
	let t = parse_field_descriptor(desc)?;
	Ok(write_field_descriptor(&map_type_tree(t, lookup)))
}

fn map_type_tree(t: Type, lookup: &impl Fn(&str) -> Option<String>) -> Type {
	match t {
		Type::Object(name) => Type::Object(lookup(&name).unwrap_or(name)),
		Type::Array(dims, inner) => Type::Array(dims, Box::new(map_type_tree(*inner, lookup))),
		other => other,
	}
}

/// Rewrites every object type referenced in a method descriptor's arguments and return type.
pub fn map_method_desc(desc: &str, lookup: &impl Fn(&str) -> Option<String>) -> Result<String> {
	let d = parse_method_descriptor(desc)?;
	let parameters = d.parameters.into_iter().map(|t| map_type_tree(t, lookup)).collect();
	let return_type = d.return_type.map(|t| map_type_tree(t, lookup));
	Ok(write_method_descriptor(&MethodDescriptor { parameters, return_type }))
}

#[cfg(test)]
mod testing {
	use super::*;

	#[test]
	fn field_round_trip() {
		for desc in ["I", "Ljava/lang/Object;", "[I", "[[Lfoo/Bar;", "Z"] {
			let parsed = parse_field_descriptor(desc).unwrap();
			assert_eq!(write_field_descriptor(&parsed), desc);
		}
	}

	#[test]
	fn method_round_trip() {
		let desc = "(Ljava/lang/String;[ILfoo/Bar;)V";
		let parsed = parse_method_descriptor(desc).unwrap();
		assert_eq!(write_method_descriptor(&parsed), desc);

		let desc = "()I";
		let parsed = parse_method_descriptor(desc).unwrap();
		assert_eq!(parsed.parameters.len(), 0);
		assert_eq!(write_method_descriptor(&parsed), desc);
	}

	#[test]
	fn map_type_identity() {
		let desc = "[[Lfoo/Bar;";
		assert_eq!(map_type(desc, &|_| None).unwrap(), desc);
	}

	#[test]
	fn map_type_rewrites_owner() {
		let mapped = map_type("Lfoo/Bar;", &|n| (n == "foo/Bar").then(|| "a/B".to_owned())).unwrap();
		assert_eq!(mapped, "La/B;");

		let mapped = map_type("[Lfoo/Bar;", &|n| (n == "foo/Bar").then(|| "a/B".to_owned())).unwrap();
		assert_eq!(mapped, "[La/B;");
	}

	#[test]
	fn map_method_desc_rewrites_args_and_return() {
		let mapped = map_method_desc(
			"(Lfoo/Bar;)Lfoo/Baz;",
			&|n| match n {
				"foo/Bar" => Some("a/B".to_owned()),
				"foo/Baz" => Some("a/C".to_owned()),
				_ => None,
			},
		).unwrap();
		assert_eq!(mapped, "(La/B;)La/C;");
	}

	#[test]
	fn composition_law() {
		let desc = "Lfoo/Bar;";
		let f = |n: &str| (n == "foo/Bar").then(|| "a/B".to_owned());
		let g = |n: &str| (n == "a/B").then(|| "x/Y".to_owned());

		let step = map_type(desc, &f).unwrap();
		let double = map_type(&step, &g).unwrap();

		let composed = map_type(desc, &|n| f(n).map(|n2| g(&n2).unwrap_or(n2)).or_else(|| g(n))).unwrap();
		assert_eq!(double, composed);
	}
}
