//! JVM access flag bitmasks (JVMS 4.1, 4.5, 4.6) shared by classes, fields and methods.
//!
//! Flags are kept as a plain `u16` wrapper rather than an enum set: the class-file format
//! defines the bits once and reuses most of them across classes/fields/methods, so a single
//! newtype with `contains`/`with`/`without` helpers maps onto JVMS more directly than three
//! separate bitflag types would.

use std::fmt::{Debug, Formatter};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

/// The bitmask of `{PRIVATE, STATIC, FINAL}`: a method with any of these bits set is never
/// resolved virtually, so an inheritance provider walking superclasses for overridable methods
/// should skip it.
pub const NON_INHERITABLE: u16 = ACC_PRIVATE | ACC_STATIC | ACC_FINAL;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
	pub fn new(bits: u16) -> AccessFlags {
		AccessFlags(bits)
	}

	pub fn contains(self, mask: u16) -> bool {
		self.0 & mask == mask
	}

	pub fn any(self, mask: u16) -> bool {
		self.0 & mask != 0
	}

	#[must_use]
	pub fn with(self, mask: u16) -> AccessFlags {
		AccessFlags(self.0 | mask)
	}

	#[must_use]
	pub fn without(self, mask: u16) -> AccessFlags {
		AccessFlags(self.0 & !mask)
	}

	/// Clears `PUBLIC`, `PROTECTED` and `PRIVATE`, then sets `mask` (which should be one of them,
	/// or none for package-private).
	#[must_use]
	pub fn with_visibility(self, mask: u16) -> AccessFlags {
		self.without(ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE).with(mask)
	}

	pub fn is_at_least_protected(self) -> bool {
		self.contains(ACC_PUBLIC) || self.contains(ACC_PROTECTED)
	}
}

impl Debug for AccessFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "AccessFlags({:#06x})", self.0)
	}
}
