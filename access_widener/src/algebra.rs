//! Combining access wideners: `a + b` unions two wideners pointwise, `join` folds any number of
//! them the same way.

use std::ops::Add;
use anyhow::{anyhow, bail, Result};
use crate::model::AccessWidener;

impl AccessWidener {
	/// Unions `self` and `other` pointwise via mask-OR, taking the lower of the two versions.
	/// Both must share a namespace; combining across namespaces is a caller error, not something
	/// a remap should paper over.
	pub fn combine(&self, other: &AccessWidener) -> Result<AccessWidener> {
		if self.namespace != other.namespace {
			bail!("cannot combine access wideners in different namespaces: {:?} vs {:?}", self.namespace, other.namespace);
		}

		let mut result = AccessWidener::new(self.version.min(other.version), self.namespace.clone());
		for (name, mask) in self.classes.iter().chain(other.classes.iter()) {
			result.add_class(name.clone(), mask.0);
		}
		for (member, mask) in self.methods.iter().chain(other.methods.iter()) {
			result.add_method(member.clone(), mask.0);
		}
		for (member, mask) in self.fields.iter().chain(other.fields.iter()) {
			result.add_field(member.clone(), mask.0);
		}
		Ok(result)
	}
}

impl Add for &AccessWidener {
	type Output = Result<AccessWidener>;

	fn add(self, other: &AccessWidener) -> Result<AccessWidener> {
		self.combine(other)
	}
}

/// Folds every widener in `wideners` with [`AccessWidener::combine`]. Errors if the iterator is
/// empty: there's no sensible identity namespace to return.
pub fn join(wideners: impl IntoIterator<Item = AccessWidener>) -> Result<AccessWidener> {
	let mut iter = wideners.into_iter();
	let first = iter.next().ok_or_else(|| anyhow!("cannot join an empty collection of access wideners"))?;
	iter.try_fold(first, |acc, next| acc.combine(&next))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::model::{AccessedMember, ACCESSIBLE, EXTENDABLE, MUTABLE};
	use pretty_assertions::assert_eq;

	#[test]
	fn combine_unions_masks_and_takes_min_version() {
		let mut a = AccessWidener::new(2, "official");
		a.add_class("com/example/Foo", ACCESSIBLE);
		let mut b = AccessWidener::new(1, "official");
		b.add_class("com/example/Foo", EXTENDABLE);

		let combined = a.combine(&b).unwrap();
		assert_eq!(combined.version, 1);
		let mask = combined.classes.get("com/example/Foo").unwrap();
		assert!(mask.contains(ACCESSIBLE));
		assert!(mask.contains(EXTENDABLE));
	}

	#[test]
	fn combine_rejects_mismatched_namespaces() {
		let a = AccessWidener::new(2, "official");
		let b = AccessWidener::new(2, "intermediary");
		assert!(a.combine(&b).is_err());
	}

	#[test]
	fn join_folds_every_widener() {
		let mut a = AccessWidener::new(2, "official");
		a.add_method(AccessedMember::new("com/example/Foo", "bar", "()V"), ACCESSIBLE);
		let mut b = AccessWidener::new(2, "official");
		b.add_field(AccessedMember::new("com/example/Foo", "baz", "I"), MUTABLE);

		let joined = join([a, b]).unwrap();
		assert!(joined.methods.contains_key(&AccessedMember::new("com/example/Foo", "bar", "()V")));
		assert!(joined.fields.contains_key(&AccessedMember::new("com/example/Foo", "baz", "I")));
	}

	#[test]
	fn join_of_empty_is_an_error() {
		assert!(join(Vec::new()).is_err());
	}
}
