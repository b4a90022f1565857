//! Enigma: nested `CLASS`/`FIELD`/`METHOD`/`ARG`/`COMMENT` records, indented one tab per nesting
//! level. An inner class's record sits nested under its outer `CLASS` record in the text, but is
//! stored here as an independent top-level entry named `Outer$Inner`, the way the JVM's own
//! InnerClasses attribute (and every other format in this crate) names nested classes; the writer
//! reverses that by re-nesting any class whose name starts with `<other>$` under that other class.

use anyhow::{anyhow, bail, Context, Result};
use crate::lines::{numbered_lines, FieldLine, WithMoreIndentIter};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping, ParameterMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::{NodeInfo, ToKey};

const CLASS: &str = "CLASS";
const FIELD: &str = "FIELD";
const METHOD: &str = "METHOD";
const PARAMETER: &str = "ARG";
const COMMENT: &str = "COMMENT";

fn is_modifier(s: &str) -> bool {
	s.starts_with("ACC:")
}

pub fn parse(text: &str) -> Result<Mappings> {
	let namespaces = Namespaces::new(vec!["official".to_owned(), "named".to_owned()])?;
	let mut lines = numbered_lines(text).map(|(n, l)| Ok(FieldLine::new(n, l, '\t', ' '))).peekable();
	let mut mappings = Mappings::new(namespaces);

	WithMoreIndentIter::new(&mut lines).on_every_line(|iter, mut line| {
		if line.next()? != CLASS {
			bail!("line {}: only CLASS records are allowed at the top level", line.line_number());
		}
		parse_class(iter, line, &mut mappings, None)
	})?;

	Ok(mappings)
}

/// Parses one `CLASS` record and everything nested under it, adding the class itself (and any
/// classes nested inside it, flattened to `Outer$Inner` names) directly to `mappings`.
fn parse_class(iter: &mut WithMoreIndentIter<impl Iterator<Item = Result<FieldLine>>>, mut line: FieldLine, mappings: &mut Mappings, parent: Option<(&str, &str)>) -> Result<()> {
	let fields: Vec<String> = line.rest().into_iter().filter(|f| !is_modifier(f)).collect();
	let (src, dst) = match fields.as_slice() {
		[src] => (src.clone(), None),
		[src, dst] => (src.clone(), Some(dst.clone())),
		other => bail!("class record with {} name fields", other.len()),
	};

	let (src, dst) = match parent {
		Some((parent_src, parent_dst)) => (format!("{parent_src}${src}"), dst.map(|d| format!("{parent_dst}${d}")).or_else(|| Some(format!("{parent_dst}${src}")))),
		None => (src, dst),
	};
	let class_src = src.clone();
	let class_dst = dst.clone().unwrap_or_else(|| src.clone());

	let mut class = crate::tree::mappings::ClassNowodeMapping::new(ClassMapping { names: Names::from_vec(vec![Some(src), dst]) });
	let mut nested_classes = Vec::new();

	iter.next_level().on_every_line(|iter, mut line| {
		let kind = line.next()?;
		match kind.as_str() {
			CLASS => {
				// Parse into a scratch class/mappings pair isn't needed: recurse directly into a
				// throwaway Mappings sharing the same namespaces, then move its one class out.
				let mut scratch = Mappings::new(Namespaces::new(vec!["official".to_owned(), "named".to_owned()])?);
				parse_class(iter, line, &mut scratch, Some((&class_src, &class_dst)))?;
				nested_classes.extend(scratch.classes.into_values());
				Ok(())
			}
			FIELD => {
				let fields: Vec<String> = line.rest().into_iter().filter(|f| !is_modifier(f)).collect();
				let (src, dst, desc) = match fields.as_slice() {
					[src, desc] => (src.clone(), None, desc.clone()),
					[src, dst, desc] => (src.clone(), Some(dst.clone()), desc.clone()),
					other => bail!("field record with {} fields", other.len()),
				};
				let field = class.add_field(NodeInfo::new(FieldMapping { desc: Some(desc), names: Names::from_vec(vec![Some(src), dst]) }))?;
				iter.next_level().on_every_line(|_, mut line| {
					if line.next()? == COMMENT {
						field.comments.push(line.rest().join(" "));
					}
					Ok(())
				})
			}
			METHOD => {
				let fields: Vec<String> = line.rest().into_iter().filter(|f| !is_modifier(f)).collect();
				let (src, dst, desc) = match fields.as_slice() {
					[src, desc] => (src.clone(), None, desc.clone()),
					[src, dst, desc] => (src.clone(), Some(dst.clone()), desc.clone()),
					other => bail!("method record with {} fields", other.len()),
				};
				let method = class.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(vec![Some(src), dst]) }))?;
				iter.next_level().on_every_line(|_, mut line| {
					let kind = line.next()?;
					match kind.as_str() {
						PARAMETER => {
							let fields = line.rest();
							let [index, dst]: [String; 2] = fields.try_into().map_err(|f: Vec<String>| anyhow!("ARG record with {} fields", f.len()))?;
							let index: usize = index.parse().context("parameter index")?;
							method.add_parameter(NodeInfo::new(ParameterMapping { index, names: Names::from_vec(vec![None, Some(dst)]) }))?;
							Ok(())
						}
						COMMENT => {
							method.comments.push(line.rest().join(" "));
							Ok(())
						}
						other => bail!("unknown method sub-record {other:?}"),
					}
				})
			}
			COMMENT => {
				class.comments.push(line.rest().join(" "));
				Ok(())
			}
			other => bail!("unknown class sub-record {other:?}"),
		}
	})?;

	mappings.add_class(class)?;
	for nested in nested_classes {
		let key = nested.info.get_key();
		mappings.classes.insert(key, nested);
	}
	Ok(())
}

pub fn write(mappings: &Mappings) -> Result<String> {
	mappings.namespaces.check_that(&["official", "named"]).context("Enigma only supports the official/named namespace pair")?;
	let mut out = String::new();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in &classes {
		let src = class.info.names.first_name()?;
		if let Some((outer, _)) = src.rsplit_once('$') {
			if mappings.classes.contains_key(outer) {
				continue;
			}
		}
		write_class(&mut out, mappings, class, 0)?;
	}

	Ok(out)
}

fn write_class(out: &mut String, mappings: &Mappings, class: &crate::tree::mappings::ClassNowodeMapping, depth: usize) -> Result<()> {
	let indent = "\t".repeat(depth);
	let src = class.info.names.first_name()?;
	let relative_src = src.rsplit('$').next().unwrap_or(src);
	let dst = class.info.names.as_slice()[1].as_ref();
	out.push_str(&indent);
	out.push_str(CLASS);
	out.push(' ');
	out.push_str(relative_src);
	if let Some(dst) = dst {
		let relative_dst = dst.rsplit('$').next().unwrap_or(dst);
		if relative_dst != relative_src {
			out.push(' ');
			out.push_str(relative_dst);
		}
	}
	out.push('\n');

	for comment in &class.comments {
		out.push_str(&indent);
		out.push('\t');
		out.push_str(COMMENT);
		out.push(' ');
		out.push_str(comment);
		out.push('\n');
	}

	let mut fields: Vec<_> = class.fields.values().collect();
	fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
	for field in fields {
		out.push_str(&indent);
		out.push('\t');
		out.push_str(FIELD);
		out.push(' ');
		out.push_str(field.info.names.first_name()?);
		if let Some(dst) = field.info.names.as_slice()[1].as_ref() {
			out.push(' ');
			out.push_str(dst);
		}
		out.push(' ');
		out.push_str(field.info.desc.as_deref().unwrap_or(""));
		out.push('\n');
		for comment in &field.comments {
			out.push_str(&indent);
			out.push_str("\t\t");
			out.push_str(COMMENT);
			out.push(' ');
			out.push_str(comment);
			out.push('\n');
		}
	}

	let mut methods: Vec<_> = class.methods.values().collect();
	methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
	for method in methods {
		out.push_str(&indent);
		out.push('\t');
		out.push_str(METHOD);
		out.push(' ');
		out.push_str(method.info.names.first_name()?);
		if let Some(dst) = method.info.names.as_slice()[1].as_ref() {
			out.push(' ');
			out.push_str(dst);
		}
		out.push(' ');
		out.push_str(&method.info.desc);
		out.push('\n');
		for comment in &method.comments {
			out.push_str(&indent);
			out.push_str("\t\t");
			out.push_str(COMMENT);
			out.push(' ');
			out.push_str(comment);
			out.push('\n');
		}
		let mut parameters: Vec<_> = method.parameters.values().collect();
		parameters.sort_by_key(|p| p.info.index);
		for parameter in parameters {
			if let Some(dst) = parameter.info.names.as_slice().get(1).and_then(|s| s.as_ref()) {
				out.push_str(&indent);
				out.push_str("\t\t");
				out.push_str(PARAMETER);
				out.push(' ');
				out.push_str(&parameter.info.index.to_string());
				out.push(' ');
				out.push_str(dst);
				out.push('\n');
			}
		}
	}

	let src_prefix = format!("{src}$");
	let mut nested: Vec<_> = mappings.classes.values().filter(|c| c.info.names.first_name().map(|n| n.starts_with(&src_prefix) && !n[src_prefix.len()..].contains('$')).unwrap_or(false)).collect();
	nested.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
	for inner in nested {
		write_class(out, mappings, inner, depth + 1)?;
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_class_field_method_and_argument() {
		let text = "CLASS a b\n\tFIELD f g I\n\tMETHOD m n (I)V\n\t\tARG 0 x\n";
		let mappings = parse(text).unwrap();
		let class = mappings.classes.get("a").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
		let method = class.methods.values().next().unwrap();
		let parameter = method.parameters.values().next().unwrap();
		assert_eq!(parameter.info.names.as_slice()[1].as_deref(), Some("x"));
	}

	#[test]
	fn parses_nested_class_as_dollar_qualified() {
		let text = "CLASS a b\n\tCLASS a$1 b$1\n";
		let mappings = parse(text).unwrap();
		assert_eq!(mappings.classes.len(), 2);
		assert!(mappings.classes.contains_key("a$a$1"));
	}
}
