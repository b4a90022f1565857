//! SRG and XSRG: `CL:`/`FD:`/`MD:`/`PK:` prefixed lines, two namespaces (`obf`, `deobf`). XSRG
//! inserts the owner-qualified source field descriptor after the source name on `FD:` lines.

use anyhow::{bail, Context, Result};
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

fn split_owner(qualified: &str) -> (&str, &str) {
	qualified.rsplit_once('/').map_or(("", qualified), |(owner, name)| (owner, name))
}

pub fn parse(text: &str, extended: bool) -> Result<Mappings> {
	let namespaces = Namespaces::new(vec!["obf".to_owned(), "deobf".to_owned()])?;
	let mut mappings = Mappings::new(namespaces);

	for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
		let line = line.trim_end();
		if line.is_empty() || line.starts_with("PK:") {
			continue;
		}
		let mut fields = line.split_whitespace();
		let kind = fields.next().with_context(|| format!("line {line_no}: empty record"))?;
		match kind {
			"CL:" => {
				let obf = fields.next().with_context(|| format!("line {line_no}: missing obf class name"))?;
				let deobf = fields.next().with_context(|| format!("line {line_no}: missing deobf class name"))?;
				ensure_class(&mut mappings, obf, deobf, line_no)?;
			}
			"FD:" => {
				let obf_qualified = fields.next().with_context(|| format!("line {line_no}: missing obf field"))?;
				let second = fields.next().with_context(|| format!("line {line_no}: missing deobf field"))?;
				let (desc, deobf_qualified) = if extended {
					let desc = second.to_owned();
					let deobf_qualified = fields.next().with_context(|| format!("line {line_no}: xsrg missing deobf field"))?;
					(Some(desc), deobf_qualified)
				} else {
					(None, second)
				};
				let (obf_owner, obf_name) = split_owner(obf_qualified);
				let (_, deobf_name) = split_owner(deobf_qualified);
				let class = ensure_class(&mut mappings, obf_owner, obf_owner, line_no)?;
				class
					.add_field(NodeInfo::new(FieldMapping { desc, names: Names::from_vec(vec![Some(obf_name.to_owned()), Some(deobf_name.to_owned())]) }))
					.with_context(|| format!("line {line_no}"))?;
			}
			"MD:" => {
				let obf_qualified = fields.next().with_context(|| format!("line {line_no}: missing obf method"))?;
				let obf_desc = fields.next().with_context(|| format!("line {line_no}: missing obf descriptor"))?;
				let deobf_qualified = fields.next().with_context(|| format!("line {line_no}: missing deobf method"))?;
				let _deobf_desc = fields.next().with_context(|| format!("line {line_no}: missing deobf descriptor"))?;
				let (obf_owner, obf_name) = split_owner(obf_qualified);
				let (_, deobf_name) = split_owner(deobf_qualified);
				let class = ensure_class(&mut mappings, obf_owner, obf_owner, line_no)?;
				class
					.add_method(NodeInfo::new(MethodMapping {
						desc: obf_desc.to_owned(),
						names: Names::from_vec(vec![Some(obf_name.to_owned()), Some(deobf_name.to_owned())]),
					}))
					.with_context(|| format!("line {line_no}"))?;
			}
			other => bail!("line {line_no}: unknown SRG record kind {other:?}"),
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

pub fn write(mappings: &Mappings, extended: bool) -> Result<String> {
	mappings.namespaces.check_that(&["obf", "deobf"]).context("SRG only supports the obf/deobf namespace pair")?;
	let mut out = String::new();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in &classes {
		let obf = class.info.names.first_name()?;
		let deobf = class.info.names.as_slice()[1].as_deref().unwrap_or(obf);
		if obf != deobf {
			out.push_str(&format!("CL: {obf} {deobf}\n"));
		}
	}
	for class in &classes {
		let obf_owner = class.info.names.first_name()?;
		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			let obf_name = field.info.names.first_name()?;
			let deobf_name = field.info.names.as_slice()[1].as_deref().unwrap_or(obf_name);
			if extended {
				let desc = field.info.desc.as_deref().unwrap_or("");
				out.push_str(&format!("FD: {obf_owner}/{obf_name} {desc} {obf_owner}/{deobf_name}\n"));
			} else {
				out.push_str(&format!("FD: {obf_owner}/{obf_name} {obf_owner}/{deobf_name}\n"));
			}
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			let obf_name = method.info.names.first_name()?;
			let deobf_name = method.info.names.as_slice()[1].as_deref().unwrap_or(obf_name);
			out.push_str(&format!("MD: {obf_owner}/{obf_name} {} {obf_owner}/{deobf_name} {}\n", method.info.desc, method.info.desc));
		}
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_class_and_field() {
		let text = "CL: a/A b/B\nFD: a/A/f b/B/g\n";
		let mappings = parse(text, false).unwrap();
		assert_eq!(mappings.classes.len(), 1);
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
	}
}
