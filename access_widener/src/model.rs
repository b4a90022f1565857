//! The access widener data model: a bag of per-class/field/method access relaxations, keyed by
//! owner-qualified member identity and combined with bitwise OR on duplicates.

use std::fmt::{Display, Formatter};
use indexmap::IndexMap;

pub const ACCESSIBLE: u8 = 0b0000_0001;
pub const EXTENDABLE: u8 = 0b0000_0010;
pub const MUTABLE: u8 = 0b0000_0100;
/// Set alongside the corresponding base bit when the source line carried a `transitive-` prefix
/// (v2+ only). A widener's own single-class application doesn't distinguish transitive access
/// from direct access; the bit exists so `+`/`join`/serialization round-trip it faithfully for
/// callers that compose wideners across a dependency graph.
pub const TRANSITIVE_ACCESSIBLE: u8 = 0b0000_1000;
pub const TRANSITIVE_EXTENDABLE: u8 = 0b0001_0000;
pub const TRANSITIVE_MUTABLE: u8 = 0b0010_0000;

/// A bitset of `{ACCESSIBLE, EXTENDABLE, MUTABLE}` (plus their `transitive-` counterparts).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct AccessMask(pub u8);

impl AccessMask {
	pub fn empty() -> AccessMask {
		AccessMask(0)
	}

	pub fn contains(self, bit: u8) -> bool {
		self.0 & bit == bit
	}

	pub fn any(self, mask: u8) -> bool {
		self.0 & mask != 0
	}

	pub fn is_empty(self) -> bool {
		self.0 == 0
	}

	#[must_use]
	pub fn with(self, bit: u8) -> AccessMask {
		AccessMask(self.0 | bit)
	}

	#[must_use]
	pub fn union(self, other: AccessMask) -> AccessMask {
		AccessMask(self.0 | other.0)
	}

	/// The base (non-`transitive-`) bits only.
	#[must_use]
	pub fn direct(self) -> AccessMask {
		AccessMask(self.0 & (ACCESSIBLE | EXTENDABLE | MUTABLE))
	}

	pub fn is_accessible(self) -> bool {
		self.any(ACCESSIBLE | TRANSITIVE_ACCESSIBLE)
	}

	pub fn is_extendable(self) -> bool {
		self.any(EXTENDABLE | TRANSITIVE_EXTENDABLE)
	}

	pub fn is_mutable(self) -> bool {
		self.any(MUTABLE | TRANSITIVE_MUTABLE)
	}
}

/// An owner-qualified field or method identity, e.g. as seen from a `method <owner> <name> <desc>`
/// access widener line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessedMember {
	pub owner: String,
	pub name: String,
	pub desc: String,
}

impl AccessedMember {
	pub fn new(owner: impl Into<String>, name: impl Into<String>, desc: impl Into<String>) -> AccessedMember {
		AccessedMember { owner: owner.into(), name: name.into(), desc: desc.into() }
	}
}

impl Display for AccessedMember {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {} {}", self.owner, self.name, self.desc)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessWidener {
	pub version: u32,
	pub namespace: String,
	pub classes: IndexMap<String, AccessMask>,
	pub methods: IndexMap<AccessedMember, AccessMask>,
	pub fields: IndexMap<AccessedMember, AccessMask>,
}

impl AccessWidener {
	pub fn new(version: u32, namespace: impl Into<String>) -> AccessWidener {
		AccessWidener { version, namespace: namespace.into(), classes: IndexMap::new(), methods: IndexMap::new(), fields: IndexMap::new() }
	}

	pub fn add_class(&mut self, name: impl Into<String>, mask: u8) {
		let entry = self.classes.entry(name.into()).or_insert(AccessMask::empty());
		*entry = entry.with(mask);
	}

	pub fn add_method(&mut self, member: AccessedMember, mask: u8) {
		let entry = self.methods.entry(member).or_insert(AccessMask::empty());
		*entry = entry.with(mask);
	}

	pub fn add_field(&mut self, member: AccessedMember, mask: u8) {
		let entry = self.fields.entry(member).or_insert(AccessMask::empty());
		*entry = entry.with(mask);
	}
}
