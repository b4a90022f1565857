//! Resolving the superclass/interface chain of a class, for inheritance-aware remapping and for
//! [`quill::transform::Mappings::remove_redundancy`]'s transitive-parent walk.

use std::sync::Mutex;
use anyhow::Result;
use duke::access::NON_INHERITABLE;
use indexmap::{IndexMap, IndexSet};
use quill::remapper::SuperClassProvider;
use crate::classpath::ClasspathLoader;
use crate::storage::Jar;

pub trait InheritanceProvider {
	/// Super class first (if present), then interfaces, in declared order.
	fn direct_parents(&self, name: &str) -> Result<Vec<String>>;

	/// Each entry is `"{name}{descriptor}"`. When `inheritable_only`, members carrying any of
	/// `{PRIVATE, STATIC, FINAL}` are excluded (they're never resolved virtually).
	fn declared_methods(&self, name: &str, inheritable_only: bool) -> Result<Vec<String>>;

	/// Depth-first traversal skipping already-visited nodes, yielding every ancestor of `start`
	/// (not `start` itself) in pre-order: each node's super class is visited (and fully recursed
	/// into) before its interfaces, matching [`direct_parents`](InheritanceProvider::direct_parents)'s own ordering.
	fn parents(&self, start: &str) -> Result<Vec<String>> {
		let mut visited = IndexSet::new();
		visited.insert(start.to_owned());
		let mut result = Vec::new();
		self.collect_parents(start, &mut visited, &mut result)?;
		Ok(result)
	}

	fn collect_parents(&self, node: &str, visited: &mut IndexSet<String>, result: &mut Vec<String>) -> Result<()> {
		for parent in self.direct_parents(node)? {
			if visited.insert(parent.clone()) {
				result.push(parent.clone());
				self.collect_parents(&parent, visited, result)?;
			}
		}
		Ok(())
	}
}

/// The default implementation: reads just the class headers (super/interfaces) and declared
/// method signatures of a class via a [`ClasspathLoader`], skipping code and debug info. Classes
/// unknown to the loader are treated as having no parents and no declared methods.
pub struct ClasspathInheritanceProvider<L: ClasspathLoader> {
	loader: L,
}

impl<L: ClasspathLoader> ClasspathInheritanceProvider<L> {
	pub fn new(loader: L) -> ClasspathInheritanceProvider<L> {
		ClasspathInheritanceProvider { loader }
	}
}

impl<L: ClasspathLoader> InheritanceProvider for ClasspathInheritanceProvider<L> {
	fn direct_parents(&self, name: &str) -> Result<Vec<String>> {
		let Some(bytes) = self.loader.load(name)? else { return Ok(Vec::new()) };
		let class = duke::read_class(&bytes)?;
		let mut parents: Vec<String> = class.super_class.iter().map(|s| s.as_str().to_owned()).collect();
		parents.extend(class.interfaces.iter().map(|i| i.as_str().to_owned()));
		Ok(parents)
	}

	fn declared_methods(&self, name: &str, inheritable_only: bool) -> Result<Vec<String>> {
		let Some(bytes) = self.loader.load(name)? else { return Ok(Vec::new()) };
		let class = duke::read_class(&bytes)?;
		Ok(class
			.methods
			.iter()
			.filter(|m| !inheritable_only || !m.access.any(NON_INHERITABLE))
			.map(|m| format!("{}{}", m.name, m.descriptor))
			.collect())
	}
}

/// Caches `direct_parents` and `declared_methods` (the latter keyed by `(name, inheritable_only)`)
/// behind a mutex. Entries are populated on demand and never evicted.
pub struct MemoizedInheritanceProvider<P: InheritanceProvider> {
	inner: P,
	parents_cache: Mutex<IndexMap<String, Vec<String>>>,
	methods_cache: Mutex<IndexMap<(String, bool), Vec<String>>>,
}

impl<P: InheritanceProvider> MemoizedInheritanceProvider<P> {
	pub fn new(inner: P) -> MemoizedInheritanceProvider<P> {
		MemoizedInheritanceProvider { inner, parents_cache: Mutex::new(IndexMap::new()), methods_cache: Mutex::new(IndexMap::new()) }
	}
}

impl<P: InheritanceProvider> InheritanceProvider for MemoizedInheritanceProvider<P> {
	fn direct_parents(&self, name: &str) -> Result<Vec<String>> {
		if let Some(cached) = self.parents_cache.lock().unwrap_or_else(|e| e.into_inner()).get(name) {
			return Ok(cached.clone());
		}
		let parents = self.inner.direct_parents(name)?;
		self.parents_cache.lock().unwrap_or_else(|e| e.into_inner()).insert(name.to_owned(), parents.clone());
		Ok(parents)
	}

	fn declared_methods(&self, name: &str, inheritable_only: bool) -> Result<Vec<String>> {
		let key = (name.to_owned(), inheritable_only);
		if let Some(cached) = self.methods_cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
			return Ok(cached.clone());
		}
		let methods = self.inner.declared_methods(name, inheritable_only)?;
		self.methods_cache.lock().unwrap_or_else(|e| e.into_inner()).insert(key, methods.clone());
		Ok(methods)
	}
}

/// An eagerly-built `class -> {super, interfaces}` map, satisfying [`SuperClassProvider`]'s
/// by-reference lookup (which a lazily-loading [`InheritanceProvider`] can't: there's nothing
/// owned to borrow from until the whole jar has been scanned once, up front).
pub struct SuperClassMap {
	super_classes: IndexMap<String, IndexSet<String>>,
}

impl SuperClassMap {
	/// Scans every class in `jar` once, recording its direct super class and interfaces.
	pub fn from_jar(jar: &impl Jar) -> Result<SuperClassMap> {
		Self::from_entries(&jar.entries()?)
	}

	/// Same as [`from_jar`](SuperClassMap::from_jar), but over entries a caller already has in
	/// hand (so a jar already opened for its class/resource split doesn't get read twice).
	pub fn from_entries(entries: &[crate::storage::JarEntry]) -> Result<SuperClassMap> {
		let mut super_classes = IndexMap::new();
		for entry in entries {
			if entry.is_class() {
				let class = duke::read_class(&entry.data)?;
				let mut set = IndexSet::new();
				if let Some(super_class) = &class.super_class {
					set.insert(super_class.as_str().to_owned());
				}
				for interface in &class.interfaces {
					set.insert(interface.as_str().to_owned());
				}
				super_classes.insert(class.name.as_str().to_owned(), set);
			}
		}
		Ok(SuperClassMap { super_classes })
	}
}

impl SuperClassProvider for SuperClassMap {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<String>>> {
		Ok(self.super_classes.get(class))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	struct Fixed(IndexMap<&'static str, Vec<&'static str>>);

	impl InheritanceProvider for Fixed {
		fn direct_parents(&self, name: &str) -> Result<Vec<String>> {
			Ok(self.0.get(name).map(|v| v.iter().map(|s| s.to_string()).collect()).unwrap_or_default())
		}
		fn declared_methods(&self, _name: &str, _inheritable_only: bool) -> Result<Vec<String>> {
			Ok(Vec::new())
		}
	}

	#[test]
	fn parents_is_a_deduplicated_dfs() {
		let mut graph = IndexMap::new();
		graph.insert("c", vec!["b", "i"]);
		graph.insert("b", vec!["a"]);
		graph.insert("i", vec!["a"]);
		let provider = Fixed(graph);

		let parents = provider.parents("c").unwrap();
		assert_eq!(parents, vec!["b".to_owned(), "a".to_owned(), "i".to_owned()]);
	}
}
