//! Pure operations that take a [`Mappings`] (or several) and produce a new one: namespace algebra
//! (rename/reorder/filter/dedup/extract), joining two mappings on a shared namespace, recovering
//! missing field descriptors from a node provider, and pruning locally-redundant method overrides.

use anyhow::{bail, Context, Result};
use indexmap::{IndexMap, IndexSet};
use crate::remapper::ARemapper;
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, FieldMapping, FieldNowodeMapping, Mappings, MethodMapping, MethodNowodeMapping, ParameterMapping, ParameterNowodeMapping};
use crate::tree::names::{Names, Namespace, Namespaces};
use crate::tree::ToKey;

/// The four non-inheritable access-flag bits used to decide whether a declared method can be
/// overridden by a subclass, per the class-file spec's `ACC_PRIVATE`/`ACC_STATIC`/`ACC_FINAL`.
pub const NON_INHERITABLE: u16 = 0b11010;

const DATA_METHODS: &[(&str, &str)] = &[("<init>", ""), ("<clinit>", "()V"), ("equals", "(Ljava/lang/Object;)Z"), ("hashCode", "()I"), ("toString", "()Ljava/lang/String;")];

fn is_data_method(name: &str, desc: &str) -> bool {
	name == "<init>" || DATA_METHODS.iter().any(|&(n, d)| n == name && d == desc)
}

impl Mappings {
	pub fn rename_namespaces(&self, to: Vec<String>) -> Result<Mappings> {
		if to.len() != self.namespaces.len() {
			bail!("rename_namespaces needs {} names, got {}", self.namespaces.len(), to.len());
		}
		Ok(Mappings { namespaces: Namespaces::new(to)?, classes: self.classes.clone() })
	}

	pub fn reorder_namespaces(&self, order: &[&str]) -> Result<Mappings> {
		let table: Vec<Namespace> = order.iter().map(|name| self.namespaces.namespace_of(name)).collect::<Result<_>>()?;
		let first = Namespace::new(0, self.namespaces.len())?;
		let remapper = self.remapper_a(first, table[0])?;

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let names = class.info.names.reorder(&table);
			let key = names.first_name().context("reordered class lost its first-namespace name")?.clone();

			let mut fields = IndexMap::new();
			for field in class.fields.values() {
				let desc = field.info.desc.as_ref().map(|d| remapper.map_desc(d)).transpose()?;
				let names = field.info.names.reorder(&table);
				let node = FieldNowodeMapping { info: FieldMapping { desc, names }, comments: field.comments.clone() };
				fields.insert(node.info.get_key(), node);
			}

			let mut methods = IndexMap::new();
			for method in class.methods.values() {
				let desc = remapper.map_desc(&method.info.desc)?;
				let names = method.info.names.reorder(&table);
				let mut parameters = IndexMap::new();
				for parameter in method.parameters.values() {
					let names = parameter.info.names.reorder(&table);
					parameters.insert(parameter.info.index, ParameterNowodeMapping { info: ParameterMapping { index: parameter.info.index, names } });
				}
				let node = MethodNowodeMapping { info: MethodMapping { desc, names }, parameters, variables: method.variables.clone(), comments: method.comments.clone() };
				methods.insert(node.info.get_key(), node);
			}

			classes.insert(key, ClassNowodeMapping { info: ClassMapping { names }, fields, methods, comments: class.comments.clone() });
		}

		Ok(Mappings { namespaces: self.namespaces.reorder(&table), classes })
	}

	pub fn extract_namespaces(&self, from: &str, to: &str) -> Result<Mappings> {
		self.reorder_namespaces(&[from, to])
	}

	pub fn filter_namespaces(&self, allowed: &[&str], allow_duplicates: bool) -> Result<Mappings> {
		let mut kept_indices = Vec::new();
		let mut kept_names = Vec::new();
		let mut seen = IndexSet::new();
		for (i, name) in self.namespaces.as_slice().iter().enumerate() {
			if allowed.contains(&name.as_str()) && (allow_duplicates || seen.insert(name.clone())) {
				kept_indices.push(i);
				kept_names.push(name.clone());
			}
		}

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let names = class.info.names.filter_indices(&kept_indices);
			if names.as_slice().first().and_then(|o| o.as_ref()).is_none() {
				continue;
			}
			let key = names.first_name()?.clone();

			let mut fields = IndexMap::new();
			for field in class.fields.values() {
				let names = field.info.names.filter_indices(&kept_indices);
				if names.as_slice().first().and_then(|o| o.as_ref()).is_none() {
					continue;
				}
				let node = FieldNowodeMapping { info: FieldMapping { desc: field.info.desc.clone(), names }, comments: field.comments.clone() };
				fields.insert(node.info.get_key(), node);
			}

			let mut methods = IndexMap::new();
			for method in class.methods.values() {
				let names = method.info.names.filter_indices(&kept_indices);
				if names.as_slice().first().and_then(|o| o.as_ref()).is_none() {
					continue;
				}
				let mut parameters = IndexMap::new();
				for parameter in method.parameters.values() {
					let names = parameter.info.names.filter_indices(&kept_indices);
					parameters.insert(parameter.info.index, ParameterNowodeMapping { info: ParameterMapping { index: parameter.info.index, names } });
				}
				let node = MethodNowodeMapping { info: MethodMapping { desc: method.info.desc.clone(), names }, parameters, variables: method.variables.clone(), comments: method.comments.clone() };
				methods.insert(node.info.get_key(), node);
			}

			classes.insert(key, ClassNowodeMapping { info: ClassMapping { names }, fields, methods, comments: class.comments.clone() });
		}

		Ok(Mappings { namespaces: Namespaces::new(kept_names)?, classes })
	}

	pub fn deduplicate_namespaces(&self) -> Result<Mappings> {
		let unique: Vec<&str> = {
			let mut seen = IndexSet::new();
			self.namespaces.as_slice().iter().filter(|n| seen.insert(n.as_str())).map(|s| s.as_str()).collect()
		};
		self.filter_namespaces(&unique, false)
	}

	/// Recovers `desc: None` fields by looking up the field's descriptor on the class via a
	/// caller-provided lookup (typically a classpath/inheritance provider). Fields whose
	/// descriptor cannot be recovered are dropped, since the invariant that every field here
	/// carries a descriptor must hold once this returns.
	pub fn recover_field_descriptors(&self, lookup: &impl Fn(&str, &str) -> Result<Option<String>>) -> Result<Mappings> {
		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let owner = class.info.names.first_name()?;
			let mut fields = IndexMap::new();
			for field in class.fields.values() {
				let desc = match &field.info.desc {
					Some(desc) => Some(desc.clone()),
					None => {
						let name = field.info.names.first_name()?;
						lookup(owner, name)?
					}
				};
				if let Some(desc) = desc {
					let node = FieldNowodeMapping { info: FieldMapping { desc: Some(desc), names: field.info.names.clone() }, comments: field.comments.clone() };
					fields.insert(node.info.get_key(), node);
				}
			}
			classes.insert(
				owner.clone(),
				ClassNowodeMapping { info: class.info.clone(), fields, methods: class.methods.clone(), comments: class.comments.clone() },
			);
		}
		Ok(Mappings { namespaces: self.namespaces.clone(), classes })
	}

	pub fn map_classes(&self, f: impl Fn(&ClassNowodeMapping) -> Result<ClassNowodeMapping>) -> Result<Mappings> {
		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let mapped = f(class)?;
			classes.insert(mapped.info.get_key(), mapped);
		}
		Ok(Mappings { namespaces: self.namespaces.clone(), classes })
	}

	pub fn filter_classes(&self, pred: impl Fn(&ClassNowodeMapping) -> bool) -> Mappings {
		let classes = self.classes.iter().filter(|(_, c)| pred(c)).map(|(k, v)| (k.clone(), v.clone())).collect();
		Mappings { namespaces: self.namespaces.clone(), classes }
	}

	/// For each class, drops declared methods that are also declared, inheritably, on some
	/// transitive super-type, since such an override carries no information the super-type's
	/// entry doesn't already carry. `<init>`/`<clinit>`/`equals`/`hashCode`/`toString` are kept
	/// regardless, as they're never meaningfully "redundant" overrides.
	///
	/// `declared_inheritable_methods(owner)` mirrors
	/// `dukebox::inheritance::InheritanceProvider::declared_methods(owner, true)`: each entry is
	/// `"{name}{descriptor}"` for a method actually declared on `owner`'s class file, with
	/// `{PRIVATE, STATIC, FINAL}` members excluded. That exclusion matters: a private method
	/// sharing `name+desc` with a same-named private method on a supertype is never an override
	/// (private methods are never resolved virtually), so it must not be dropped as redundant.
	/// Mappings alone carry no access-flag information, so that set has to come from the real
	/// class files via this closure, not from the mappings' own per-class method lists.
	pub fn remove_redundancy(&self, parents: &impl Fn(&str) -> Result<Vec<String>>, declared_inheritable_methods: &impl Fn(&str) -> Result<Vec<String>>) -> Result<Mappings> {
		let mut super_methods_cache: IndexMap<String, IndexSet<String>> = IndexMap::new();

		fn collect_super_methods(
			owner: &str,
			parents: &impl Fn(&str) -> Result<Vec<String>>,
			declared_inheritable_methods: &impl Fn(&str) -> Result<Vec<String>>,
			cache: &mut IndexMap<String, IndexSet<String>>,
			seen: &mut IndexSet<String>,
		) -> Result<IndexSet<String>> {
			if let Some(cached) = cache.get(owner) {
				return Ok(cached.clone());
			}
			let mut result = IndexSet::new();
			for parent in parents(owner)? {
				if !seen.insert(parent.clone()) {
					continue;
				}
				result.extend(declared_inheritable_methods(&parent)?);
				result.extend(collect_super_methods(&parent, parents, declared_inheritable_methods, cache, seen)?);
			}
			cache.insert(owner.to_owned(), result.clone());
			Ok(result)
		}

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let owner = class.info.names.first_name()?.clone();
			let mut seen = IndexSet::new();
			let super_methods = collect_super_methods(&owner, parents, declared_inheritable_methods, &mut super_methods_cache, &mut seen)?;

			let mut methods = IndexMap::new();
			for method in class.methods.values() {
				let name = method.info.names.first_name()?;
				let key = format!("{name}{}", method.info.desc);
				if is_data_method(name, &method.info.desc) || !super_methods.contains(&key) {
					methods.insert(method.info.get_key(), method.clone());
				}
			}

			classes.insert(owner, ClassNowodeMapping { info: class.info.clone(), fields: class.fields.clone(), methods, comments: class.comments.clone() });
		}

		Ok(Mappings { namespaces: self.namespaces.clone(), classes })
	}
}

/// Aligns two mappings by their shared `intermediate` namespace: each side contributes its
/// namespaces (deduplicated against `intermediate`) in order, with `intermediate` placed between
/// them. Classes/fields/methods are unioned by intermediate-namespace identity; ties on
/// first-namespace name keep the left side's descriptor, and comments are concatenated (self
/// before other).
pub fn join(a: &Mappings, b: &Mappings, intermediate: &str, require_match: bool) -> Result<Mappings> {
	let a_mid = a.namespaces.namespace_of(intermediate)?;
	let b_mid = b.namespaces.namespace_of(intermediate)?;

	let mut output_names = Vec::new();
	for name in a.namespaces.as_slice() {
		if name != intermediate && !output_names.contains(name) {
			output_names.push(name.clone());
		}
	}
	output_names.push(intermediate.to_owned());
	for name in b.namespaces.as_slice() {
		if name != intermediate && !output_names.contains(name) {
			output_names.push(name.clone());
		}
	}
	let output_namespaces = Namespaces::new(output_names.clone())?;
	let mid_output_index = output_names.iter().position(|n| n == intermediate).expect("intermediate namespace was just inserted");

	let a_first = Namespace::new(0, a.namespaces.len())?;
	let remapper_a_to_mid = a.remapper_a(a_first, a_mid)?;
	let b_first = Namespace::new(0, b.namespaces.len())?;
	let remapper_b_to_mid = b.remapper_a(b_first, b_mid)?;

	let mut a_by_mid: IndexMap<String, &ClassNowodeMapping> = IndexMap::new();
	for class in a.classes.values() {
		if let Some(mid) = class.info.names.get(a_mid) {
			a_by_mid.insert(mid.clone(), class);
		}
	}
	let mut b_by_mid: IndexMap<String, &ClassNowodeMapping> = IndexMap::new();
	for class in b.classes.values() {
		if let Some(mid) = class.info.names.get(b_mid) {
			b_by_mid.insert(mid.clone(), class);
		}
	}

	if require_match {
		let a_keys: IndexSet<&String> = a_by_mid.keys().collect();
		let b_keys: IndexSet<&String> = b_by_mid.keys().collect();
		if a_keys != b_keys {
			bail!("join with require_match: class sets differ between the two mappings");
		}
	}

	let mut all_mid_keys: IndexSet<String> = a_by_mid.keys().cloned().collect();
	all_mid_keys.extend(b_by_mid.keys().cloned());

	let mut classes = IndexMap::new();
	for mid_key in all_mid_keys {
		let a_class = a_by_mid.get(&mid_key).copied();
		let b_class = b_by_mid.get(&mid_key).copied();

		let names = build_joined_names(a_class.map(|c| &c.info.names), a_mid, b_class.map(|c| &c.info.names), b_mid, &output_names, a, b, mid_output_index)?;
		let key = names.first_name()?.clone();
		let comments = a_class.map(|c| c.comments.clone()).unwrap_or_default().into_iter().chain(b_class.map(|c| c.comments.clone()).unwrap_or_default()).collect();

		// Union fields by their intermediate-namespace name.
		let mut a_fields_by_mid: IndexMap<String, &FieldNowodeMapping> = IndexMap::new();
		for field in a_class.map(|c| c.fields.values()).into_iter().flatten() {
			if let Some(mid) = field.info.names.get(a_mid) {
				a_fields_by_mid.insert(mid.clone(), field);
			}
		}
		let mut b_fields_by_mid: IndexMap<String, &FieldNowodeMapping> = IndexMap::new();
		for field in b_class.map(|c| c.fields.values()).into_iter().flatten() {
			if let Some(mid) = field.info.names.get(b_mid) {
				b_fields_by_mid.insert(mid.clone(), field);
			}
		}
		let mut field_mid_keys: IndexSet<String> = a_fields_by_mid.keys().cloned().collect();
		field_mid_keys.extend(b_fields_by_mid.keys().cloned());

		let mut fields = IndexMap::new();
		for mid_key in field_mid_keys {
			let a_field = a_fields_by_mid.get(&mid_key).copied();
			let b_field = b_fields_by_mid.get(&mid_key).copied();
			let names = build_joined_names(a_field.map(|f| &f.info.names), a_mid, b_field.map(|f| &f.info.names), b_mid, &output_names, a, b, mid_output_index)?;
			let desc = match (a_field, b_field) {
				(Some(f), _) => f.info.desc.as_ref().map(|d| remapper_a_to_mid.map_desc(d)).transpose()?,
				(None, Some(f)) => f.info.desc.as_ref().map(|d| remapper_b_to_mid.map_desc(d)).transpose()?,
				(None, None) => None,
			};
			let comments = a_field.map(|f| f.comments.clone()).unwrap_or_default().into_iter().chain(b_field.map(|f| f.comments.clone()).unwrap_or_default()).collect();
			let node = FieldNowodeMapping { info: FieldMapping { desc, names }, comments };
			fields.insert(node.info.get_key(), node);
		}

		// Union methods by intermediate name + intermediate-normalized descriptor.
		let mut a_methods_by_mid: IndexMap<(String, String), &MethodNowodeMapping> = IndexMap::new();
		for method in a_class.map(|c| c.methods.values()).into_iter().flatten() {
			if let Some(mid) = method.info.names.get(a_mid) {
				let desc = remapper_a_to_mid.map_desc(&method.info.desc)?;
				a_methods_by_mid.insert((mid.clone(), desc), method);
			}
		}
		let mut b_methods_by_mid: IndexMap<(String, String), &MethodNowodeMapping> = IndexMap::new();
		for method in b_class.map(|c| c.methods.values()).into_iter().flatten() {
			if let Some(mid) = method.info.names.get(b_mid) {
				let desc = remapper_b_to_mid.map_desc(&method.info.desc)?;
				b_methods_by_mid.insert((mid.clone(), desc), method);
			}
		}
		let mut method_mid_keys: IndexSet<(String, String)> = a_methods_by_mid.keys().cloned().collect();
		method_mid_keys.extend(b_methods_by_mid.keys().cloned());

		let mut methods = IndexMap::new();
		for mid_key in method_mid_keys {
			let a_method = a_methods_by_mid.get(&mid_key).copied();
			let b_method = b_methods_by_mid.get(&mid_key).copied();
			let names = build_joined_names(a_method.map(|m| &m.info.names), a_mid, b_method.map(|m| &m.info.names), b_mid, &output_names, a, b, mid_output_index)?;
			let desc = match a_method {
				Some(m) => remapper_a_to_mid.map_desc(&m.info.desc)?,
				None => remapper_b_to_mid.map_desc(&b_method.expect("method present on at least one side").info.desc)?,
			};
			let comments = a_method.map(|m| m.comments.clone()).unwrap_or_default().into_iter().chain(b_method.map(|m| m.comments.clone()).unwrap_or_default()).collect();
			// parameter and local-variable info is not merged by design
			let node = MethodNowodeMapping { info: MethodMapping { desc, names }, parameters: IndexMap::new(), variables: Vec::new(), comments };
			methods.insert(node.info.get_key(), node);
		}

		classes.insert(key, ClassNowodeMapping { info: ClassMapping { names }, fields, methods, comments });
	}

	Ok(Mappings { namespaces: output_namespaces, classes })
}

#[allow(clippy::too_many_arguments)]
fn build_joined_names(
	a_names: Option<&Names<String>>,
	a_mid: Namespace,
	b_names: Option<&Names<String>>,
	b_mid: Namespace,
	output_names: &[String],
	a: &Mappings,
	b: &Mappings,
	mid_output_index: usize,
) -> Result<Names<String>> {
	let mut out = vec![None; output_names.len()];
	out[mid_output_index] = a_names.and_then(|n| n.get(a_mid)).or_else(|| b_names.and_then(|n| n.get(b_mid))).cloned();
	for (i, out_name) in output_names.iter().enumerate() {
		if i == mid_output_index {
			continue;
		}
		let value = if let (Ok(ns), Some(names)) = (a.namespaces.namespace_of(out_name), a_names) {
			names.get(ns).cloned()
		} else {
			None
		};
		let value = value.or_else(|| {
			if let (Ok(ns), Some(names)) = (b.namespaces.namespace_of(out_name), b_names) { names.get(ns).cloned() } else { None }
		});
		out[i] = value;
	}
	Ok(Names::from_vec(out))
}

pub trait JoinableIter {
	fn join_all(self, intermediate: &str, require_match: bool) -> Result<Mappings>;
}

impl<'a, I: IntoIterator<Item = &'a Mappings>> JoinableIter for I {
	fn join_all(self, intermediate: &str, require_match: bool) -> Result<Mappings> {
		let mut iter = self.into_iter();
		let first = match iter.next() {
			Some(first) => first.clone(),
			None => bail!("join_all on an empty sequence of mappings"),
		};
		iter.try_fold(first, |acc, next| join(&acc, next, intermediate, require_match))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;
	use crate::tree::mappings::GenericMappings;

	fn simple(namespaces: &[&str], class_names: &[&str]) -> Mappings {
		let mut builder = GenericMappings::new(namespaces.iter().map(|s| s.to_string()).collect()).unwrap();
		builder.add_class(class_names.iter().map(|s| Some(s.to_string())).collect()).unwrap();
		builder.build().unwrap()
	}

	#[test]
	fn rename_namespaces_replaces_labels() {
		let mappings = simple(&["a", "b"], &["X", "Y"]);
		let renamed = mappings.rename_namespaces(vec!["p".to_owned(), "q".to_owned()]).unwrap();
		assert_eq!(renamed.namespaces.as_slice(), ["p", "q"]);
	}

	#[test]
	fn deduplicate_namespaces_keeps_first_occurrence() {
		let mappings = simple(&["a", "b", "a"], &["X", "Y", "X"]);
		let deduped = mappings.deduplicate_namespaces().unwrap();
		assert_eq!(deduped.namespaces.as_slice(), ["a", "b"]);
	}

	#[test]
	fn extract_namespaces_reorders_to_two_columns() {
		let mappings = simple(&["a", "b", "c"], &["X", "Y", "Z"]);
		let extracted = mappings.extract_namespaces("c", "a").unwrap();
		assert_eq!(extracted.namespaces.as_slice(), ["c", "a"]);
		let class = extracted.classes.get("Z").unwrap();
		assert_eq!(class.info.names.as_slice()[1].as_deref(), Some("X"));
	}

	fn class_with_methods(owner: &str, methods: &[(&str, &str)]) -> ClassNowodeMapping {
		let mut class: ClassNowodeMapping = crate::tree::NodeInfo::new(ClassMapping { names: Names::from_first_name(1, owner.to_owned()) });
		for &(name, desc) in methods {
			class.add_method(crate::tree::NodeInfo::new(MethodMapping { desc: desc.to_owned(), names: Names::from_first_name(1, name.to_owned()) })).unwrap();
		}
		class
	}

	#[test]
	fn remove_redundancy_drops_inherited_overrides_but_keeps_non_inheritable_name_clashes() {
		let mut mappings = Mappings::new(Namespaces::new(vec!["official".to_owned()]).unwrap());
		mappings.add_class(class_with_methods("Super", &[("m", "()V"), ("n", "()V")])).unwrap();
		mappings.add_class(class_with_methods("Sub", &[("m", "()V"), ("n", "()V")])).unwrap();

		let parents = |owner: &str| -> Result<Vec<String>> {
			Ok(match owner {
				"Sub" => vec!["Super".to_owned()],
				_ => Vec::new(),
			})
		};
		// "m()V" is private on Super, so it's excluded here, mirroring
		// `InheritanceProvider::declared_methods(_, true)` filtering out `NON_INHERITABLE` members.
		let declared_inheritable_methods = |owner: &str| -> Result<Vec<String>> {
			Ok(match owner {
				"Super" => vec!["n()V".to_owned()],
				_ => Vec::new(),
			})
		};

		let result = mappings.remove_redundancy(&parents, &declared_inheritable_methods).unwrap();

		let sub = result.classes.get("Sub").unwrap();
		let names: IndexSet<&str> = sub.methods.values().map(|m| m.info.names.first_name().unwrap().as_str()).collect();
		assert!(names.contains("m"), "a private same-named method on a supertype must not make this one redundant");
		assert!(!names.contains("n"), "an inheritable same-named method on a supertype makes this one redundant");
	}
}
