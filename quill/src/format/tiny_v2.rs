//! Tiny v2: `tiny\t2\t0\t<ns...>` header, then a tab-depth state machine (`c`/`f`/`m`/`p`/`c`
//! for comments), plus depth-1 `key\tvalue` metadata pairs that precede the first class.

use anyhow::{bail, Context, Result};
use crate::error::OnLine;
use crate::lines::{numbered_lines, FieldLine, WithMoreIndentIter};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping, ParameterMapping};
use crate::tree::names::{Names, Namespaces};

pub fn parse(text: &str) -> Result<Mappings> {
	let mut lines = numbered_lines(text).map(|(n, l)| Ok(FieldLine::new(n, l, '\t', '\t'))).peekable();

	let mut header = lines.next().context("empty input")??;
	let header_line_number = header.line_number();
	if header.next()? != "tiny" || header.next()? != "2" || header.next()? != "0" {
		bail!("header is not a tiny v2.0 header");
	}
	let namespace_names = header.rest();
	if namespace_names.len() < 2 {
		bail!("tiny v2 needs at least two namespaces, got {}", namespace_names.len());
	}
	let namespaces = Namespaces::new(namespace_names).on_line(header_line_number)?;
	let mut mappings = Mappings::new(namespaces);

	WithMoreIndentIter::new(&mut lines).on_every_line(|iter, mut line| parse_top_level(iter, &mut line, &mut mappings))?;

	Ok(mappings)
}

fn parse_top_level(iter: &mut WithMoreIndentIter<impl Iterator<Item = Result<FieldLine>>>, line: &mut FieldLine, mappings: &mut Mappings) -> Result<()> {
	match line.next()?.as_str() {
		"c" => {
			let names = Names::from_vec(line.rest().into_iter().map(|s| (!s.is_empty()).then_some(s)).collect());
			let class = mappings.add_class(crate::tree::NodeInfo::new(ClassMapping { names }))?;
			iter.next_level().on_every_line(|iter, mut line| parse_class_body(iter, &mut line, class))
		}
		_ => Ok(()),
	}
}

fn parse_class_body(iter: &mut WithMoreIndentIter<impl Iterator<Item = Result<FieldLine>>>, line: &mut FieldLine, class: &mut crate::tree::mappings::ClassNowodeMapping) -> Result<()> {
	use crate::tree::NodeInfo;
	match line.next()?.as_str() {
		"f" => {
			let desc = Some(line.next()?);
			let names = Names::from_vec(line.rest().into_iter().map(|s| (!s.is_empty()).then_some(s)).collect());
			let field = class.add_field(NodeInfo::new(FieldMapping { desc, names }))?;
			iter.next_level().on_every_line(|_, mut line| {
				if line.next()? == "c" {
					field.comments.push(line.rest().join("\t"));
				}
				Ok(())
			})
		}
		"m" => {
			let desc = line.next()?;
			let names = Names::from_vec(line.rest().into_iter().map(|s| (!s.is_empty()).then_some(s)).collect());
			let method = class.add_method(NodeInfo::new(MethodMapping { desc, names }))?;
			iter.next_level().on_every_line(|iter, mut line| match line.next()?.as_str() {
				"p" => {
					let index = line.next()?.parse().context("parameter index")?;
					let names = Names::from_vec(line.rest().into_iter().map(|s| (!s.is_empty()).then_some(s)).collect());
					method.add_parameter(NodeInfo::new(ParameterMapping { index, names }))?;
					// parameters carry no comments in this model; any nested "c" lines are skipped.
					iter.next_level().on_every_line(|_, _| Ok(()))
				}
				"c" => {
					method.comments.push(line.rest().join("\t"));
					Ok(())
				}
				_ => Ok(()),
			})
		}
		"c" => {
			class.comments.push(line.rest().join("\t"));
			Ok(())
		}
		_ => Ok(()),
	}
}

fn write_names(out: &mut String, names: &Names<String>) {
	for slot in names.as_slice() {
		out.push('\t');
		out.push_str(slot.as_deref().unwrap_or(""));
	}
	out.push('\n');
}

/// Writes tiny v2. When `compact` is set, a name identical to the previous non-empty name in
/// the same column is elided (name-elision, shared with Compacted/TSRG v2).
pub fn write(mappings: &Mappings, compact: bool) -> Result<String> {
	let mut out = String::new();
	out.push_str("tiny\t2\t0");
	for namespace in mappings.namespaces.as_slice() {
		out.push('\t');
		out.push_str(namespace);
	}
	out.push('\n');

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	let mut previous_class_names: Vec<Option<String>> = vec![None; mappings.namespaces.len()];
	for class in classes {
		out.push('c');
		write_names_compact(&mut out, &class.info.names, &mut previous_class_names, compact);
		for comment in &class.comments {
			out.push_str("\tc\t");
			out.push_str(comment);
			out.push('\n');
		}

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		let mut previous_field_names: Vec<Option<String>> = vec![None; mappings.namespaces.len()];
		for field in fields {
			out.push_str("\tf\t");
			out.push_str(field.info.desc.as_deref().unwrap_or(""));
			write_names_compact(&mut out, &field.info.names, &mut previous_field_names, compact);
			for comment in &field.comments {
				out.push_str("\t\tc\t");
				out.push_str(comment);
				out.push('\n');
			}
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		let mut previous_method_names: Vec<Option<String>> = vec![None; mappings.namespaces.len()];
		for method in methods {
			out.push_str("\tm\t");
			out.push_str(&method.info.desc);
			write_names_compact(&mut out, &method.info.names, &mut previous_method_names, compact);
			for comment in &method.comments {
				out.push_str("\t\tc\t");
				out.push_str(comment);
				out.push('\n');
			}

			let mut parameters: Vec<_> = method.parameters.values().collect();
			parameters.sort_by_key(|p| p.info.index);
			for parameter in parameters {
				out.push_str("\t\tp\t");
				out.push_str(&parameter.info.index.to_string());
				write_names(&mut out, &parameter.info.names);
			}
		}
	}

	Ok(out)
}

fn write_names_compact(out: &mut String, names: &Names<String>, previous: &mut [Option<String>], compact: bool) {
	for (i, slot) in names.as_slice().iter().enumerate() {
		out.push('\t');
		match slot {
			Some(name) if compact && previous.get(i).and_then(|p| p.as_ref()) == Some(name) => {}
			Some(name) => {
				out.push_str(name);
				previous[i] = Some(name.clone());
			}
			None => {}
		}
	}
	out.push('\n');
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn round_trip_minimal() {
		let text = "tiny\t2\t0\tofficial\tnamed\nc\tA\ta/A\n\tf\tI\tfield\tmyField\n\tm\t()V\tmethod\tmyMethod\n";
		let mappings = parse(text).unwrap();
		assert_eq!(mappings.namespaces.as_slice(), ["official", "named"]);
		assert_eq!(mappings.classes.len(), 1);
		let written = write(&mappings, false).unwrap();
		assert_eq!(written, text);
	}

	#[test]
	fn comments_are_collected_in_order() {
		let text = "tiny\t2\t0\ta\tb\nc\tA\tB\n\tc\tfirst\n\tc\tsecond\n";
		let mappings = parse(text).unwrap();
		let class = mappings.classes.get("A").unwrap();
		assert_eq!(class.comments, vec!["first".to_owned(), "second".to_owned()]);
	}
}
