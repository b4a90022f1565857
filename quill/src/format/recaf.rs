//! Recaf: flat lines, never auto-detected. Arity 2 is either a plain class rename (`obf deobf`)
//! or a method rename with the owner and obf name fused into one token (`owner.name(desc) mapped`
//! — distinguished by the presence of `(`); arity 3 is always a field (`owner.name desc mapped`).
//! Owners that only ever appear fused into a member line get a synthesized self-mapped class
//! entry, same as SRG/CSRG/Tiny v1.

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
			[first, mapped] if first.contains('(') => {
				let (qualified, desc) = first.split_once('(').context("malformed method token")?;
				let desc = format!("({desc}");
				let (owner, name) = qualified.rsplit_once('.').with_context(|| format!("line {line_no}: expected 'owner.name(desc)'"))?;
				let class = ensure_class(&mut mappings, owner, line_no)?;
				class
					.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(vec![Some(name.to_owned()), Some(mapped.to_string())]) }))
					.with_context(|| format!("line {line_no}"))?;
			}
			[obf, deobf] => {
				let names = Names::from_vec(vec![Some(obf.to_string()), Some(deobf.to_string())]);
				mappings.add_class(NodeInfo::new(ClassMapping { names })).with_context(|| format!("line {line_no}"))?;
			}
			[qualified, desc, mapped] => {
				let (owner, name) = qualified.rsplit_once('.').with_context(|| format!("line {line_no}: expected 'owner.name'"))?;
				let class = ensure_class(&mut mappings, owner, line_no)?;
				class
					.add_field(NodeInfo::new(FieldMapping { desc: Some(desc.to_string()), names: Names::from_vec(vec![Some(name.to_owned()), Some(mapped.to_string())]) }))
					.with_context(|| format!("line {line_no}"))?;
			}
			_ => bail!("line {line_no}: expected 2 or 3 fields, got {}", fields.len()),
		}
	}

	Ok(mappings)
}

fn ensure_class<'a>(mappings: &'a mut Mappings, owner: &str, line_no: usize) -> Result<&'a mut crate::tree::mappings::ClassNowodeMapping> {
	if !mappings.classes.contains_key(owner) {
		let names = Names::from_vec(vec![Some(owner.to_owned()), Some(owner.to_owned())]);
		mappings.add_class(NodeInfo::new(ClassMapping { names })).with_context(|| format!("line {line_no}"))?;
	}
	mappings.classes.get_mut(owner).with_context(|| format!("line {line_no}: unknown class {owner:?}"))
}

pub fn write(mappings: &Mappings) -> Result<String> {
	mappings.namespaces.check_that(&["obf", "deobf"]).context("Recaf only supports the obf/deobf namespace pair")?;
	let mut out = String::new();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in &classes {
		let obf = class.info.names.first_name()?;
		let deobf = class.info.names.as_slice()[1].as_deref().unwrap_or(obf);
		if obf != deobf {
			out.push_str(&format!("{obf} {deobf}\n"));
		}

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			let name = field.info.names.first_name()?;
			let mapped = field.info.names.as_slice()[1].as_deref().unwrap_or(name);
			let desc = field.info.desc.as_deref().context("Recaf fields must carry a descriptor")?;
			out.push_str(&format!("{obf}.{name} {desc} {mapped}\n"));
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			let name = method.info.names.first_name()?;
			let mapped = method.info.names.as_slice()[1].as_deref().unwrap_or(name);
			out.push_str(&format!("{obf}.{name}{} {mapped}\n", method.info.desc));
		}
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_fused_method_and_holes_in_owner() {
		let text = "a/A.m(I)V n\na/A.f I g\n";
		let mappings = parse(text).unwrap();
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
		assert_eq!(class.info.names.as_slice()[1].as_deref(), Some("a/A"));
	}
}
