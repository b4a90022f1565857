//! The `Module` attribute (JVMS 4.7.25): present only on `module-info.class` files, describing a
//! JPMS module's name, its `requires`/`exports`/`opens`/`uses`/`provides` directives.

use std::fmt::{Debug, Formatter};
use crate::tree::class::ClassName;
use crate::tree::make_name_like;

make_name_like!(
	/// A module name, e.g. `java.base`. Dot-separated, unlike a [`ClassName`].
	ModuleName
);
make_name_like!(
	/// A package name as it appears in a `requires`/`exports`/`opens` directive.
	PackageName
);

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
	pub name: ModuleName,
	pub flags: ModuleFlags,
	pub version: Option<String>,
	pub requires: Vec<ModuleRequires>,
	pub exports: Vec<ModuleExports>,
	pub opens: Vec<ModuleOpens>,
	pub uses: Vec<ClassName>,
	pub provides: Vec<ModuleProvides>,
}

#[derive(Copy, Clone, PartialEq)]
pub struct ModuleFlags {
	pub is_open: bool,
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleFlags { ")?;
		if self.is_open { f.write_str("open ")?; }
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleFlags {
	fn from(value: u16) -> Self {
		ModuleFlags {
			is_open: value & 0x0020 != 0,
			is_synthetic: value & 0x1000 != 0,
			is_mandated: value & 0x8000 != 0,
		}
	}
}

impl From<ModuleFlags> for u16 {
	fn from(value: ModuleFlags) -> Self {
		(if value.is_open { 0x0020 } else { 0 }) | (if value.is_synthetic { 0x1000 } else { 0 }) | (if value.is_mandated { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRequires {
	pub name: ModuleName,
	pub flags: ModuleRequiresFlags,
	pub version: Option<String>,
}

#[derive(Copy, Clone, PartialEq)]
pub struct ModuleRequiresFlags {
	pub is_transitive: bool,
	pub is_static_phase: bool,
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleRequiresFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleRequiresFlags { ")?;
		if self.is_transitive { f.write_str("transitive ")?; }
		if self.is_static_phase { f.write_str("static-phase ")?; }
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleRequiresFlags {
	fn from(value: u16) -> Self {
		ModuleRequiresFlags {
			is_transitive: value & 0x0020 != 0,
			is_static_phase: value & 0x0040 != 0,
			is_synthetic: value & 0x1000 != 0,
			is_mandated: value & 0x8000 != 0,
		}
	}
}

impl From<ModuleRequiresFlags> for u16 {
	fn from(value: ModuleRequiresFlags) -> Self {
		(if value.is_transitive { 0x0020 } else { 0 })
			| (if value.is_static_phase { 0x0040 } else { 0 })
			| (if value.is_synthetic { 0x1000 } else { 0 })
			| (if value.is_mandated { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExports {
	pub name: PackageName,
	pub flags: ModuleExportsFlags,
	pub exports_to: Vec<ModuleName>,
}

#[derive(Copy, Clone, PartialEq)]
pub struct ModuleExportsFlags {
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleExportsFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleExportsFlags { ")?;
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleExportsFlags {
	fn from(value: u16) -> Self {
		ModuleExportsFlags { is_synthetic: value & 0x1000 != 0, is_mandated: value & 0x8000 != 0 }
	}
}

impl From<ModuleExportsFlags> for u16 {
	fn from(value: ModuleExportsFlags) -> Self {
		(if value.is_synthetic { 0x1000 } else { 0 }) | (if value.is_mandated { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOpens {
	pub name: PackageName,
	pub flags: ModuleOpensFlags,
	pub opens_to: Vec<ModuleName>,
}

#[derive(Copy, Clone, PartialEq)]
pub struct ModuleOpensFlags {
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleOpensFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleOpensFlags { ")?;
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleOpensFlags {
	fn from(value: u16) -> Self {
		ModuleOpensFlags { is_synthetic: value & 0x1000 != 0, is_mandated: value & 0x8000 != 0 }
	}
}

impl From<ModuleOpensFlags> for u16 {
	fn from(value: ModuleOpensFlags) -> Self {
		(if value.is_synthetic { 0x1000 } else { 0 }) | (if value.is_mandated { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProvides {
	pub name: ClassName,
	pub provides_with: Vec<ClassName>,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn flags_round_trip_through_u16() {
		let flags = ModuleFlags { is_open: true, is_synthetic: false, is_mandated: true };
		let bits: u16 = flags.into();
		assert_eq!(ModuleFlags::from(bits), flags);
	}

	#[test]
	fn requires_flags_round_trip_through_u16() {
		let flags = ModuleRequiresFlags { is_transitive: true, is_static_phase: false, is_synthetic: true, is_mandated: false };
		let bits: u16 = flags.into();
		assert_eq!(ModuleRequiresFlags::from(bits), flags);
	}
}
