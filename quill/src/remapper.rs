//! Remappers for class names, descriptors, fields and methods.
//!
//! For remapping just classes and descriptors, use [`ARemapper`]. To also remap field and method
//! names (walking the inheritance chain), use [`BRemapper`]. Both are produced from a
//! [`Mappings`] value via [`Mappings::remapper_a`]/[`Mappings::remapper_b`].

use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};
use crate::tree::mappings::Mappings;
use crate::tree::names::Namespace;

pub trait ARemapper {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>>;

	fn map_class(&self, class: &str) -> Result<String> {
		Ok(self.map_class_fail(class)?.unwrap_or_else(|| class.to_owned()))
	}

	/// Rewrites a generic-signature string (class/method/field/local-variable `signature`
	/// attribute) through [`map_class`](Self::map_class). Empty input (no signature) maps to
	/// `None`; otherwise the underlying signature grammar is walked and every embedded class name
	/// is looked up the same way a descriptor's would be.
	fn map_signature(&self, signature: &str) -> Result<Option<String>> {
		if signature.is_empty() {
			return Ok(None);
		}
		Ok(Some(duke::tree::signature::map_signature(signature, &|name| self.map_class(name).ok())?))
	}

	fn map_desc(&self, desc: &str) -> Result<String> {
		let mut out = String::new();
		let mut chars = desc.chars();

		while let Some(ch) = chars.next() {
			out.push(ch);
			if ch == 'L' {
				let mut class_name = String::new();
				for ch in chars.by_ref() {
					class_name.push(ch);
					if ch == ';' {
						break;
					}
				}
				if class_name.pop() != Some(';') {
					bail!("descriptor {desc:?} has a missing semicolon");
				}
				out.push_str(&self.map_class(&class_name)?);
				out.push(';');
			}
		}

		Ok(out)
	}
}

pub struct ARemapperImpl<'a> {
	classes: IndexMap<&'a str, &'a str>,
}

impl ARemapper for ARemapperImpl<'_> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(self.classes.get(class).map(|&s| s.to_owned()))
	}
}

impl Mappings {
	pub fn remapper_a(&self, from: Namespace, to: Namespace) -> Result<ARemapperImpl<'_>> {
		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(from_name), Some(to_name)) = (class.info.names.get(from), class.info.names.get(to)) {
				classes.insert(from_name.as_str(), to_name.as_str());
			}
		}
		Ok(ARemapperImpl { classes })
	}
}

/// Adds field/method name remapping (and the inheritance walk that entails) on top of
/// [`ARemapper`]. If you only need class names and descriptors, prefer [`ARemapper`].
pub trait BRemapper: ARemapper {
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<String>>;
	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<String>>;

	fn map_field(&self, owner: &str, name: &str, desc: &str) -> Result<(String, String)> {
		match self.map_field_fail(owner, name, desc)? {
			Some(mapped) => Ok((mapped, self.map_desc(desc)?)),
			None => Ok((name.to_owned(), self.map_desc(desc)?)),
		}
	}

	fn map_method(&self, owner: &str, name: &str, desc: &str) -> Result<(String, String)> {
		if name == "<init>" || name == "<clinit>" {
			return Ok((name.to_owned(), self.map_desc(desc)?));
		}
		match self.map_method_fail(owner, name, desc)? {
			Some(mapped) => Ok((mapped, self.map_desc(desc)?)),
			None => Ok((name.to_owned(), self.map_desc(desc)?)),
		}
	}
}

struct BRemapperClass<'a> {
	name: &'a str,
	fields: IndexMap<(&'a str, String), &'a str>,
	methods: IndexMap<(&'a str, String), &'a str>,
}

pub struct BRemapperImpl<'a, 'i, I> {
	classes: IndexMap<&'a str, BRemapperClass<'a>>,
	inheritance: &'i I,
}

impl<I> ARemapper for BRemapperImpl<'_, '_, I> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		Ok(self.classes.get(class).map(|c| c.name.to_owned()))
	}
}

/// Supplies the superclass/interface chain a [`BRemapper`] walks when a field or method isn't
/// declared directly on the requested owner.
pub trait SuperClassProvider {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>>;
}

impl<S: SuperClassProvider> SuperClassProvider for Vec<S> {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		for map in self {
			if let Some(found) = map.get_super_classes(class)? {
				return Ok(Some(found));
			}
		}
		Ok(None)
	}
}

impl<S: SuperClassProvider + ?Sized> SuperClassProvider for std::sync::Arc<S> {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		(**self).get_super_classes(class)
	}
}

impl<S: SuperClassProvider + ?Sized> SuperClassProvider for Box<S> {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		(**self).get_super_classes(class)
	}
}

impl<I: SuperClassProvider> BRemapper for BRemapperImpl<'_, '_, I> {
	fn map_field_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<String>> {
		if let Some(class) = self.classes.get(owner) {
			if let Some(&mapped) = class.fields.get(&(name, desc.to_owned())) {
				return Ok(Some(mapped.to_owned()));
			}
			if let Some(supers) = self.inheritance.get_super_classes(owner)? {
				for super_class in supers {
					if let Some(mapped) = self.map_field_fail(super_class, name, desc)? {
						return Ok(Some(mapped));
					}
				}
			}
		}
		Ok(None)
	}

	fn map_method_fail(&self, owner: &str, name: &str, desc: &str) -> Result<Option<String>> {
		if let Some(class) = self.classes.get(owner) {
			if let Some(&mapped) = class.methods.get(&(name, desc.to_owned())) {
				return Ok(Some(mapped.to_owned()));
			}
			if let Some(supers) = self.inheritance.get_super_classes(owner)? {
				for super_class in supers {
					if let Some(mapped) = self.map_method_fail(super_class, name, desc)? {
						return Ok(Some(mapped));
					}
				}
			}
		}
		Ok(None)
	}
}

impl Mappings {
	pub fn remapper_b<'i, I>(&self, from: Namespace, to: Namespace, inheritance: &'i I) -> Result<BRemapperImpl<'_, 'i, I>> {
		let first = Namespace::new(0, self.namespaces.len())?;
		let remapper_a_from = self.remapper_a(first, from)?;

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(name_from), Some(name_to)) = (class.info.names.get(from), class.info.names.get(to)) {
				let mut fields = IndexMap::new();
				for field in class.fields.values() {
					if let (Some(f_from), Some(f_to)) = (field.info.names.get(from), field.info.names.get(to)) {
						if let Some(desc) = &field.info.desc {
							let desc_from = remapper_a_from.map_desc(desc)?;
							fields.insert((f_from.as_str(), desc_from), f_to.as_str());
						}
					}
				}
				let mut methods = IndexMap::new();
				for method in class.methods.values() {
					if let (Some(m_from), Some(m_to)) = (method.info.names.get(from), method.info.names.get(to)) {
						let desc_from = remapper_a_from.map_desc(&method.info.desc)?;
						methods.insert((m_from.as_str(), desc_from), m_to.as_str());
					}
				}
				classes.insert(name_from.as_str(), BRemapperClass { name: name_to.as_str(), fields, methods });
			}
		}
		Ok(BRemapperImpl { classes, inheritance })
	}
}

pub struct NoSuperClassProvider;

impl SuperClassProvider for NoSuperClassProvider {
	fn get_super_classes(&self, _class: &str) -> Result<Option<&IndexSet<String>>> {
		Ok(None)
	}
}

/// Lifts a plain [`ARemapper`] to [`BRemapper`] by leaving every field/method name unchanged
/// (descriptors are still rewritten). Used where a caller only has class-name remapping available
/// but the whole-class remapping bridge requires a `BRemapper`.
pub struct ARemapperAsBRemapper<T: ARemapper>(pub T);

impl<T: ARemapper> ARemapper for ARemapperAsBRemapper<T> {
	fn map_class_fail(&self, class: &str) -> Result<Option<String>> {
		self.0.map_class_fail(class)
	}
}

impl<T: ARemapper> BRemapper for ARemapperAsBRemapper<T> {
	fn map_field_fail(&self, _owner: &str, _name: &str, _desc: &str) -> Result<Option<String>> {
		Ok(None)
	}

	fn map_method_fail(&self, _owner: &str, _name: &str, _desc: &str) -> Result<Option<String>> {
		Ok(None)
	}
}
