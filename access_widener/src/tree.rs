//! The derived per-class view used for class-file application: every member widening grouped by
//! owner, plus the mask that widening propagates up onto the owning class.

use indexmap::IndexMap;
use crate::model::{AccessMask, AccessWidener, MUTABLE, TRANSITIVE_MUTABLE};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberIdentifier {
	pub name: String,
	pub desc: String,
}

impl MemberIdentifier {
	pub fn new(name: impl Into<String>, desc: impl Into<String>) -> MemberIdentifier {
		MemberIdentifier { name: name.into(), desc: desc.into() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessedClass {
	/// The mask declared directly on the class itself (may be empty if only members were widened).
	pub mask: AccessMask,
	pub methods: IndexMap<MemberIdentifier, AccessMask>,
	pub fields: IndexMap<MemberIdentifier, AccessMask>,
	/// The union of every member mask, with `MUTABLE` stripped: widening a member implies the
	/// class itself must be at least `ACCESSIBLE` (a `private` class can't expose an `accessible`
	/// method), but widening a field's mutability says nothing about the class's own access.
	pub propagated: AccessMask,
	/// `mask | propagated`: what application actually mutates the class's own flags with.
	pub total: AccessMask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessWidenerTree {
	pub namespace: String,
	pub classes: IndexMap<String, AccessedClass>,
}

impl AccessWidener {
	pub fn to_tree(&self) -> AccessWidenerTree {
		let mut classes: IndexMap<String, AccessedClass> = IndexMap::new();

		for (name, mask) in &self.classes {
			let entry = classes.entry(name.clone()).or_default();
			entry.mask = entry.mask.union(*mask);
		}

		for (member, mask) in &self.methods {
			let class = classes.entry(member.owner.clone()).or_default();
			let id = MemberIdentifier::new(member.name.clone(), member.desc.clone());
			let entry = class.methods.entry(id).or_insert(AccessMask::empty());
			*entry = entry.union(*mask);
		}

		for (member, mask) in &self.fields {
			let class = classes.entry(member.owner.clone()).or_default();
			let id = MemberIdentifier::new(member.name.clone(), member.desc.clone());
			let entry = class.fields.entry(id).or_insert(AccessMask::empty());
			*entry = entry.union(*mask);
		}

		for class in classes.values_mut() {
			let propagated = class
				.methods
				.values()
				.chain(class.fields.values())
				.fold(AccessMask::empty(), |acc, m| acc.union(*m))
				.without(MUTABLE | TRANSITIVE_MUTABLE);
			class.propagated = propagated;
			class.total = class.mask.union(propagated);
		}

		AccessWidenerTree { namespace: self.namespace.clone(), classes }
	}
}

impl AccessMask {
	#[must_use]
	pub fn without(self, mask: u8) -> AccessMask {
		AccessMask(self.0 & !mask)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::model::{AccessedMember, ACCESSIBLE, EXTENDABLE};
	use pretty_assertions::assert_eq;

	#[test]
	fn propagated_excludes_mutable_but_includes_accessible() {
		let mut widener = AccessWidener::new(2, "official");
		widener.add_method(AccessedMember::new("com/example/Foo", "bar", "()V"), EXTENDABLE);
		widener.add_field(AccessedMember::new("com/example/Foo", "baz", "I"), crate::model::MUTABLE);

		let tree = widener.to_tree();
		let class = tree.classes.get("com/example/Foo").unwrap();
		assert!(class.propagated.contains(EXTENDABLE));
		assert!(!class.propagated.is_mutable());
		assert_eq!(class.total, class.propagated);
	}

	#[test]
	fn total_unions_own_mask_with_propagated() {
		let mut widener = AccessWidener::new(2, "official");
		widener.add_class("com/example/Foo", ACCESSIBLE);
		widener.add_method(AccessedMember::new("com/example/Foo", "bar", "()V"), EXTENDABLE);

		let tree = widener.to_tree();
		let class = tree.classes.get("com/example/Foo").unwrap();
		assert!(class.total.contains(ACCESSIBLE));
		assert!(class.total.contains(EXTENDABLE));
	}
}
