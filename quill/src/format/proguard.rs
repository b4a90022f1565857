//! Proguard mapping files: `<named> -> <official>:` class headers, with indented member lines
//! using source-style types (`int`, `java.lang.String`, `Foo[]`) and an optional `a:b:`
//! line-number prefix on method entries. Always exactly two namespaces: `named`, `official`.

use anyhow::{bail, Context, Result};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

fn source_to_internal(source: &str) -> String {
	match source {
		"boolean" => "Z".to_owned(),
		"byte" => "B".to_owned(),
		"char" => "C".to_owned(),
		"short" => "S".to_owned(),
		"int" => "I".to_owned(),
		"long" => "J".to_owned(),
		"float" => "F".to_owned(),
		"double" => "D".to_owned(),
		"void" => "V".to_owned(),
		other => {
			if let Some(element) = other.strip_suffix("[]") {
				format!("[{}", source_to_internal(element))
			} else {
				format!("L{};", other.replace('.', "/"))
			}
		}
	}
}

fn internal_to_source(internal: &str) -> String {
	if let Some(rest) = internal.strip_prefix('[') {
		return format!("{}[]", internal_to_source(rest));
	}
	match internal {
		"Z" => "boolean".to_owned(),
		"B" => "byte".to_owned(),
		"C" => "char".to_owned(),
		"S" => "short".to_owned(),
		"I" => "int".to_owned(),
		"J" => "long".to_owned(),
		"F" => "float".to_owned(),
		"D" => "double".to_owned(),
		"V" => "void".to_owned(),
		other => other.strip_prefix('L').and_then(|s| s.strip_suffix(';')).map_or_else(|| other.to_owned(), |s| s.replace('/', ".")),
	}
}

fn parse_field_desc_args(args: &str) -> String {
	if args.trim().is_empty() {
		return String::new();
	}
	args.split(',').map(|a| source_to_internal(a.trim())).collect()
}

fn build_method_descriptor(return_type: &str, args: &str) -> String {
	format!("({}){}", parse_field_desc_args(args), source_to_internal(return_type))
}

pub fn parse(text: &str) -> Result<Mappings> {
	let namespaces = Namespaces::new(vec!["named".to_owned(), "official".to_owned()])?;
	let mut mappings = Mappings::new(namespaces);
	let mut current_owner: Option<String> = None;

	for (line_no, raw_line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
		let line = raw_line.split('#').next().unwrap_or("").trim_end();
		if line.trim().is_empty() {
			continue;
		}
		if !raw_line.starts_with(' ') && !raw_line.starts_with('\t') {
			let line = line.trim_end_matches(':');
			let (named, official) = line.split_once(" -> ").with_context(|| format!("line {line_no}: expected '<named> -> <official>:'"))?;
			let named = named.trim().replace('.', "/");
			let official = official.trim().replace('.', "/");
			mappings
				.add_class(NodeInfo::new(ClassMapping { names: Names::from_vec(vec![Some(named.clone()), Some(official)]) }))
				.with_context(|| format!("line {line_no}"))?;
			current_owner = Some(named);
			continue;
		}

		let owner = current_owner.as_ref().with_context(|| format!("line {line_no}: member line before any class header"))?.clone();
		let line = line.trim();
		let (body, mapped) = line.split_once(" -> ").with_context(|| format!("line {line_no}: expected '... -> mapped'"))?;
		// strip an optional leading "a:b:" line-number range prefix
		let body = match body.split_once(':') {
			Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit() || c == ':') => rest,
			_ => body,
		};
		let class = mappings.classes.get_mut(&owner).with_context(|| format!("line {line_no}: unknown owner {owner:?}"))?;

		if let Some(paren) = body.find('(') {
			let before_paren = &body[..paren];
			let (return_type, name) = before_paren.rsplit_once(' ').with_context(|| format!("line {line_no}: expected 'type name(args)'"))?;
			let args = body[paren + 1..].trim_end_matches(')');
			let desc = build_method_descriptor(return_type.trim(), args);
			class
				.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(vec![Some(name.to_owned()), Some(mapped.trim().to_owned())]) }))
				.with_context(|| format!("line {line_no}"))?;
		} else {
			let (type_name, name) = body.rsplit_once(' ').with_context(|| format!("line {line_no}: expected 'type name'"))?;
			let desc = source_to_internal(type_name.trim());
			class
				.add_field(NodeInfo::new(FieldMapping { desc: Some(desc), names: Names::from_vec(vec![Some(name.to_owned()), Some(mapped.trim().to_owned())]) }))
				.with_context(|| format!("line {line_no}"))?;
		}
	}

	Ok(mappings)
}

pub fn write(mappings: &Mappings) -> Result<String> {
	mappings.namespaces.check_that(&["named", "official"]).context("Proguard only supports the named/official namespace pair")?;
	let mut out = String::new();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in classes {
		let named = class.info.names.first_name()?.replace('/', ".");
		let official = class.info.names.as_slice()[1].as_deref().unwrap_or(named.as_str()).replace('/', ".");
		out.push_str(&format!("{named} -> {official}:\n"));

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			let name = field.info.names.first_name()?;
			let mapped = field.info.names.as_slice()[1].as_deref().unwrap_or(name);
			let type_source = field.info.desc.as_deref().map_or_else(|| "?".to_owned(), internal_to_source);
			out.push_str(&format!("    {type_source} {name} -> {mapped}\n"));
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			let name = method.info.names.first_name()?;
			let mapped = method.info.names.as_slice()[1].as_deref().unwrap_or(name);
			let parsed = duke::tree::descriptor::parse_method_descriptor(&method.info.desc)?;
			let return_source = parsed.return_type.map_or_else(|| "void".to_owned(), |t| internal_to_source(&duke::tree::descriptor::write_field_descriptor(&t)));
			let args_source: Vec<String> = parsed.parameters.iter().map(|t| internal_to_source(&duke::tree::descriptor::write_field_descriptor(t))).collect();
			out.push_str(&format!("    {return_source} {name}({}) -> {mapped}\n", args_source.join(",")));
		}
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_class_field_and_method() {
		let text = "a.A -> b.B:\n    int field -> f\n    void method(int,java.lang.String) -> m\n";
		let mappings = parse(text).unwrap();
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
		let method = class.methods.values().next().unwrap();
		assert_eq!(method.info.desc, "(ILjava/lang/String;)V");
	}
}
