//! Rewriting an access widener from one namespace to another.

use anyhow::Result;
use quill::remapper::{ARemapper, BRemapper, SuperClassProvider};
use quill::tree::mappings::Mappings;
use crate::model::{AccessWidener, AccessedMember};

impl AccessWidener {
	/// No-op if `to_namespace` is this widener's own namespace. Otherwise every class key is
	/// rewritten through a name-only remapper; every field/method key has its owner rewritten the
	/// same way and its name/descriptor rewritten through the method-name path (so the
	/// inheritance walk resolves names declared on a supertype). Masks are carried over unchanged.
	pub fn remap<I: SuperClassProvider>(&self, mappings: &Mappings, to_namespace: &str, inheritance: &I) -> Result<AccessWidener> {
		if self.namespace == to_namespace {
			return Ok(self.clone());
		}

		let from = mappings.namespace(&self.namespace)?;
		let to = mappings.namespace(to_namespace)?;
		let remapper = mappings.remapper_b(from, to, inheritance)?;

		let mut result = AccessWidener::new(self.version, to_namespace);

		for (name, mask) in &self.classes {
			result.add_class(remapper.map_class(name)?, mask.0);
		}
		for (member, mask) in &self.methods {
			let owner = remapper.map_class(&member.owner)?;
			let (name, desc) = remapper.map_method(&member.owner, &member.name, &member.desc)?;
			result.add_method(AccessedMember::new(owner, name, desc), mask.0);
		}
		for (member, mask) in &self.fields {
			let owner = remapper.map_class(&member.owner)?;
			let (name, desc) = remapper.map_field(&member.owner, &member.name, &member.desc)?;
			result.add_field(AccessedMember::new(owner, name, desc), mask.0);
		}

		Ok(result)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::model::ACCESSIBLE;
	use pretty_assertions::assert_eq;
	use quill::remapper::NoSuperClassProvider;
	use quill::tree::mappings::{ClassMapping, FieldMapping, MethodMapping};
	use quill::tree::names::Namespaces;
	use quill::tree::NodeInfo;

	fn sample_mappings() -> Mappings {
		let namespaces = Namespaces::new(vec!["official".to_owned(), "named".to_owned()]).unwrap();
		let mut mappings = Mappings::new(namespaces);
		let class = mappings
			.add_class(NodeInfo::new(ClassMapping { names: quill::tree::names::Names::from_vec(vec![Some("a".to_owned()), Some("com/example/Foo".to_owned())]) }))
			.unwrap();
		class
			.add_method(NodeInfo::new(MethodMapping {
				desc: "()V".to_owned(),
				names: quill::tree::names::Names::from_vec(vec![Some("m".to_owned()), Some("bar".to_owned())]),
			}))
			.unwrap();
		class
			.add_field(NodeInfo::new(FieldMapping {
				desc: Some("I".to_owned()),
				names: quill::tree::names::Names::from_vec(vec![Some("f".to_owned()), Some("baz".to_owned())]),
			}))
			.unwrap();
		mappings
	}

	#[test]
	fn remap_rewrites_owners_and_member_names() {
		let mappings = sample_mappings();
		let mut widener = AccessWidener::new(2, "official");
		widener.add_class("a", ACCESSIBLE);
		widener.add_method(AccessedMember::new("a", "m", "()V"), ACCESSIBLE);
		widener.add_field(AccessedMember::new("a", "f", "I"), ACCESSIBLE);

		let remapped = widener.remap(&mappings, "named", &NoSuperClassProvider).unwrap();
		assert_eq!(remapped.namespace, "named");
		assert!(remapped.classes.contains_key("com/example/Foo"));
		assert!(remapped.methods.contains_key(&AccessedMember::new("com/example/Foo", "bar", "()V")));
		assert!(remapped.fields.contains_key(&AccessedMember::new("com/example/Foo", "baz", "I")));
	}

	#[test]
	fn remap_to_own_namespace_is_a_no_op() {
		let mappings = sample_mappings();
		let mut widener = AccessWidener::new(2, "official");
		widener.add_class("a", ACCESSIBLE);

		let remapped = widener.remap(&mappings, "official", &NoSuperClassProvider).unwrap();
		assert_eq!(remapped, widener);
	}
}
