//! TSRG v1/v2: tab-indent state machine (depth 0 = class, 1 = field or method, 2 = parameter or
//! the literal `static` marker). v2 adds a `tsrg2 <ns...>` header and supports more than two
//! namespaces; v1 has no header and is fixed to `["obf", "srg"]`.

use anyhow::{bail, Context, Result};
use crate::error::OnLine;
use crate::lines::{numbered_lines, FieldLine, WithMoreIndentIter};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

fn parse_common(text: &str, namespaces: Namespaces, skip_header: bool) -> Result<Mappings> {
	let mut lines = numbered_lines(text).map(|(n, l)| Ok(FieldLine::new(n, l, '\t', ' '))).peekable();
	if skip_header {
		lines.next().context("empty input")??;
	}

	let n = namespaces.len();
	let mut mappings = Mappings::new(namespaces);

	WithMoreIndentIter::new(&mut lines).on_every_line(|iter, mut line| {
		let names: Vec<_> = line.rest().into_iter().map(Some).collect();
		if names.len() != n {
			bail!("line {}: expected {n} class names, got {}", line.line_number(), names.len());
		}
		let class = mappings.add_class(NodeInfo::new(ClassMapping { names: Names::from_vec(names) }))?;

		iter.next_level().on_every_line(|iter, mut line| {
			let first = line.next()?;
			if first == "static" {
				// a parameter-index remap line for the *previous* member; not modelled (no
				// owning MethodMapping reference is available at this depth), so it's skipped.
				return Ok(());
			}
			let rest = line.rest();
			if rest.len() == n - 1 {
				// field: <obf-name> <ns2> <ns3> ...
				let names = std::iter::once(Some(first)).chain(rest.into_iter().map(Some)).collect();
				class.add_field(NodeInfo::new(FieldMapping { desc: None, names: Names::from_vec(names) }))?;
				Ok(())
			} else if rest.len() == n {
				// method: <obf-name> <descriptor> <ns2> <ns3> ...
				let mut rest = rest.into_iter();
				let desc = rest.next().context("method descriptor")?;
				let names = std::iter::once(Some(first)).chain(rest.map(Some)).collect();
				let method = class.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(names) }))?;
				iter.next_level().on_every_line(|_, mut line| {
					let index: usize = line.next()?.parse().context("parameter index")?;
					let rest: Vec<_> = line.rest().into_iter().map(Some).collect();
					method.add_parameter(NodeInfo::new(crate::tree::mappings::ParameterMapping { index, names: Names::from_vec(rest) }))?;
					Ok(())
				})
			} else {
				bail!("line {}: member line with {} trailing fields doesn't fit {n} namespaces", line.line_number(), rest.len());
			}
		})
	})?;

	Ok(mappings)
}

pub fn parse_v1(text: &str) -> Result<Mappings> {
	let namespaces = Namespaces::new(vec!["obf".to_owned(), "srg".to_owned()])?;
	parse_common(text, namespaces, false)
}

pub fn parse_v2(text: &str) -> Result<Mappings> {
	let header = text.lines().find(|l| !l.trim().is_empty()).context("empty input")?;
	let mut fields = header.split(' ');
	if fields.next() != Some("tsrg2") {
		bail!("not a tsrg2 header");
	}
	let namespace_names: Vec<String> = fields.map(|s| s.to_owned()).collect();
	let namespaces = Namespaces::new(namespace_names).on_line(1)?;
	parse_common(text, namespaces, true)
}

fn write_common(mappings: &Mappings) -> Result<String> {
	let mut out = String::new();
	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in classes {
		let names: Vec<&str> = class.info.names.as_slice().iter().map(|s| s.as_deref().unwrap_or("")).collect();
		out.push_str(&names.join(" "));
		out.push('\n');

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			let names: Vec<&str> = field.info.names.as_slice().iter().map(|s| s.as_deref().unwrap_or("")).collect();
			out.push('\t');
			out.push_str(&names.join(" "));
			out.push('\n');
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			let first = method.info.names.first_name()?;
			out.push_str(&format!("\t{first} {}", method.info.desc));
			for slot in &method.info.names.as_slice()[1..] {
				out.push(' ');
				out.push_str(slot.as_deref().unwrap_or(""));
			}
			out.push('\n');

			let mut parameters: Vec<_> = method.parameters.values().collect();
			parameters.sort_by_key(|p| p.info.index);
			for parameter in parameters {
				out.push_str(&format!("\t\t{}", parameter.info.index));
				for slot in parameter.info.names.as_slice() {
					out.push(' ');
					out.push_str(slot.as_deref().unwrap_or(""));
				}
				out.push('\n');
			}
		}
	}
	Ok(out)
}

pub fn write_v1(mappings: &Mappings) -> Result<String> {
	mappings.namespaces.check_that(&["obf", "srg"]).context("TSRG v1 only supports the obf/srg namespace pair")?;
	write_common(mappings)
}

pub fn write_v2(mappings: &Mappings) -> Result<String> {
	let mut out = String::from("tsrg2");
	for namespace in mappings.namespaces.as_slice() {
		out.push(' ');
		out.push_str(namespace);
	}
	out.push('\n');
	out.push_str(&write_common(mappings)?);
	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_v1_class_field_method() {
		let text = "a/A b/B\n\tf g\n\tm ()V n\n\t\t0 p\n";
		let mappings = parse_v1(text).unwrap();
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
	}
}
