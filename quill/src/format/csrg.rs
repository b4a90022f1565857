//! CSRG: whitespace-separated, arity picks the record kind (2=class, 3=field, 4=method). Never
//! auto-detected — arity alone is too ambiguous with TSRG v1 and Recaf, so callers must select
//! it explicitly.

use anyhow::{bail, Context, Result};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

pub fn parse(text: &str) -> Result<Mappings> {
	let namespaces = Namespaces::new(vec!["obf".to_owned(), "deobf".to_owned()])?;
	let mut mappings = Mappings::new(namespaces);

	for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
		if line.trim().is_empty() {
			continue;
		}
		let fields: Vec<&str> = line.split_whitespace().collect();
		match fields.as_slice() {
			[obf, deobf] => {
				ensure_class(&mut mappings, obf, deobf, line_no)?;
			}
			[obf_owner, obf_name, deobf_name] => {
				let class = ensure_class(&mut mappings, obf_owner, obf_owner, line_no)?;
				class
					.add_field(NodeInfo::new(FieldMapping { desc: None, names: Names::from_vec(vec![Some(obf_name.to_string()), Some(deobf_name.to_string())]) }))
					.with_context(|| format!("line {line_no}"))?;
			}
			[obf_owner, obf_name, obf_desc, deobf_name] => {
				let class = ensure_class(&mut mappings, obf_owner, obf_owner, line_no)?;
				class
					.add_method(NodeInfo::new(MethodMapping {
						desc: obf_desc.to_string(),
						names: Names::from_vec(vec![Some(obf_name.to_string()), Some(deobf_name.to_string())]),
					}))
					.with_context(|| format!("line {line_no}"))?;
			}
			_ => bail!("line {line_no}: expected 2, 3 or 4 fields, got {}", fields.len()),
		}
	}

	Ok(mappings)
}

fn ensure_class<'a>(mappings: &'a mut Mappings, obf: &str, deobf: &str, line_no: usize) -> Result<&'a mut crate::tree::mappings::ClassNowodeMapping> {
	if !mappings.classes.contains_key(obf) {
		let names = Names::from_vec(vec![Some(obf.to_owned()), Some(deobf.to_owned())]);
		mappings.add_class(NodeInfo::new(ClassMapping { names })).with_context(|| format!("line {line_no}"))?;
	}
	mappings.classes.get_mut(obf).with_context(|| format!("line {line_no}: unknown class {obf:?}"))
}

pub fn write(mappings: &Mappings) -> Result<String> {
	mappings.namespaces.check_that(&["obf", "deobf"]).context("CSRG only supports the obf/deobf namespace pair")?;
	let mut out = String::new();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in &classes {
		let obf = class.info.names.first_name()?;
		let deobf = class.info.names.as_slice()[1].as_deref().unwrap_or(obf);
		out.push_str(&format!("{obf} {deobf}\n"));

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			let obf_name = field.info.names.first_name()?;
			let deobf_name = field.info.names.as_slice()[1].as_deref().unwrap_or(obf_name);
			out.push_str(&format!("{obf} {obf_name} {deobf_name}\n"));
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			let obf_name = method.info.names.first_name()?;
			let deobf_name = method.info.names.as_slice()[1].as_deref().unwrap_or(obf_name);
			out.push_str(&format!("{obf} {obf_name} {} {deobf_name}\n", method.info.desc));
		}
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_mixed_arity() {
		let text = "a/A b/B\na/A f g\na/A m ()V n\n";
		let mappings = parse(text).unwrap();
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
	}
}
