//! Tiny v1: `v1\t<ns...>` header, then flat (non-nested) `CLASS`/`FIELD`/`METHOD` lines. Field
//! and method lines carry their owner's first-namespace name directly, so they don't need to
//! follow a `CLASS` line — the hole fix-up in [`super::detect`]'s callers (here, inline) covers
//! owners that are never otherwise declared.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

pub fn parse(text: &str) -> Result<Mappings> {
	let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l)).filter(|(_, l)| !l.trim().is_empty());

	let (header_no, header) = lines.next().context("empty input")?;
	let mut header_fields = header.split('\t');
	if header_fields.next() != Some("v1") {
		bail!("line {header_no}: not a tiny v1 header");
	}
	let namespace_names: Vec<String> = header_fields.map(|s| s.to_owned()).collect();
	let n = namespace_names.len();
	let namespaces = Namespaces::new(namespace_names).with_context(|| format!("line {header_no}"))?;
	let mut mappings = Mappings::new(namespaces);

	// Fields/methods may reference an owner that never gets its own CLASS line.
	let mut known_owners: IndexMap<String, ()> = IndexMap::new();

	for (line_no, line) in lines {
		let mut fields = line.split('\t');
		let kind = fields.next().with_context(|| format!("line {line_no}: empty record"))?;
		match kind {
			"CLASS" => {
				let names: Vec<_> = fields.map(|s| (!s.is_empty()).then(|| s.to_owned())).collect();
				if names.len() != n {
					bail!("line {line_no}: expected {n} class names, got {}", names.len());
				}
				let first = names.first().cloned().flatten().with_context(|| format!("line {line_no}: class missing first-namespace name"))?;
				known_owners.insert(first, ());
				mappings.add_class(NodeInfo::new(ClassMapping { names: Names::from_vec(names) })).with_context(|| format!("line {line_no}"))?;
			}
			"FIELD" | "METHOD" => {
				let owner = fields.next().with_context(|| format!("line {line_no}: missing owner"))?.to_owned();
				let desc = fields.next().with_context(|| format!("line {line_no}: missing descriptor"))?.to_owned();
				let names: Vec<_> = fields.map(|s| (!s.is_empty()).then(|| s.to_owned())).collect();
				if names.len() != n {
					bail!("line {line_no}: expected {n} names, got {}", names.len());
				}
				if !mappings.classes.contains_key(&owner) {
					let owner_names = Names::from_first_name(n, owner.clone());
					mappings.add_class(NodeInfo::new(ClassMapping { names: owner_names })).with_context(|| format!("line {line_no}"))?;
				}
				let class = mappings.classes.get_mut(&owner).with_context(|| format!("line {line_no}: unknown owner {owner:?}"))?;
				if kind == "FIELD" {
					class.add_field(NodeInfo::new(FieldMapping { desc: Some(desc), names: Names::from_vec(names) })).with_context(|| format!("line {line_no}"))?;
				} else {
					class.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(names) })).with_context(|| format!("line {line_no}"))?;
				}
			}
			other => bail!("line {line_no}: unknown record kind {other:?}"),
		}
	}

	Ok(mappings)
}

pub fn write(mappings: &Mappings) -> Result<String> {
	let mut out = String::from("v1");
	for namespace in mappings.namespaces.as_slice() {
		out.push('\t');
		out.push_str(namespace);
	}
	out.push('\n');

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	for class in &classes {
		out.push_str("CLASS");
		for slot in class.info.names.as_slice() {
			out.push('\t');
			out.push_str(slot.as_deref().unwrap_or(""));
		}
		out.push('\n');
	}
	for class in &classes {
		let owner = class.info.names.first_name()?;
		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for field in fields {
			out.push_str("FIELD\t");
			out.push_str(owner);
			out.push('\t');
			out.push_str(field.info.desc.as_deref().unwrap_or(""));
			for slot in field.info.names.as_slice() {
				out.push('\t');
				out.push_str(slot.as_deref().unwrap_or(""));
			}
			out.push('\n');
		}
		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		for method in methods {
			out.push_str("METHOD\t");
			out.push_str(owner);
			out.push('\t');
			out.push_str(&method.info.desc);
			for slot in method.info.names.as_slice() {
				out.push('\t');
				out.push_str(slot.as_deref().unwrap_or(""));
			}
			out.push('\n');
		}
	}

	Ok(out)
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_hole_fixup_owner() {
		let text = "v1\tofficial\tnamed\nFIELD\ta/A\tI\tb\tfieldName\n";
		let mappings = parse(text).unwrap();
		assert_eq!(mappings.classes.len(), 1);
		let class = mappings.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
	}
}
