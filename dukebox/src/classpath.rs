//! Classpath loaders: `internal_name -> Option<class bytes>`, safe for concurrent use.
//!
//! Every combinator here (`compound`, `memoized`, `remapping`, ...) takes and returns a
//! [`ClasspathLoader`], so they compose freely: `memoized(compound(vec![from_jars(...), from_system_loader()]))`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use anyhow::Result;
use indexmap::IndexMap;
use quill::remapper::{ARemapper, ARemapperAsBRemapper, BRemapper};
use quill::tree::mappings::Mappings;
use quill::tree::names::Namespace;
use crate::storage::Jar;

pub trait ClasspathLoader: Send + Sync {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

impl<F> ClasspathLoader for F
where
	F: Fn(&str) -> Result<Option<Vec<u8>>> + Send + Sync,
{
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		self(name)
	}
}

/// Reads `<name>.class` relative to `root`, as a single class-loader "resource root" would.
struct DirLoader {
	root: PathBuf,
}

impl ClasspathLoader for DirLoader {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		let path = self.root.join(format!("{name}.class"));
		match std::fs::read(&path) {
			Ok(data) => Ok(Some(data)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}
}

pub fn from_loader(root: impl AsRef<Path>) -> impl ClasspathLoader {
	DirLoader { root: root.as_ref().to_path_buf() }
}

/// The classpath root most tools mean by "system classloader": the process's working directory.
pub fn from_system_loader() -> impl ClasspathLoader {
	from_loader(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

struct LookupLoader {
	classes: IndexMap<String, Vec<u8>>,
}

impl ClasspathLoader for LookupLoader {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		Ok(self.classes.get(name).cloned())
	}
}

pub fn from_lookup(classes: IndexMap<String, Vec<u8>>) -> impl ClasspathLoader {
	LookupLoader { classes }
}

/// Builds an index of every `.class` entry across `jars`, keyed by internal name (entry name with
/// the `.class` suffix stripped).
pub fn from_jars(jars: &[Box<dyn Jar>]) -> Result<impl ClasspathLoader> {
	let mut classes = IndexMap::new();
	for jar in jars {
		for entry in jar.entries()? {
			if entry.is_class() {
				let name = entry.name.strip_suffix(".class").unwrap_or(&entry.name).to_owned();
				classes.entry(name).or_insert(entry.data);
			}
		}
	}
	Ok(from_lookup(classes))
}

struct CompoundLoader {
	loaders: Vec<Box<dyn ClasspathLoader>>,
}

impl ClasspathLoader for CompoundLoader {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		for loader in &self.loaders {
			if let Some(bytes) = loader.load(name)? {
				return Ok(Some(bytes));
			}
		}
		Ok(None)
	}
}

/// Tries each loader in order, first non-`None` result wins. A `CompoundLoader` passed back into
/// `compound` is just one more entry in the list; lookup order (and thus which source wins) is
/// identical whether or not it's been flattened into this call's `Vec`, so flattening is left to
/// the caller rather than attempted via downcasting trait objects here.
pub fn compound(loaders: Vec<Box<dyn ClasspathLoader>>) -> impl ClasspathLoader {
	CompoundLoader { loaders }
}

/// The shared, thread-safe cache a [`memoized_to`] loader writes into: values are `None` for a
/// confirmed miss, written at most once per key (first writer wins).
pub type SharedClassCache = Arc<Mutex<HashMap<String, Option<Vec<u8>>>>>;

pub fn new_shared_cache() -> SharedClassCache {
	Arc::new(Mutex::new(HashMap::new()))
}

struct MemoizedLoader<L: ClasspathLoader> {
	inner: L,
	cache: SharedClassCache,
}

impl<L: ClasspathLoader> ClasspathLoader for MemoizedLoader<L> {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		if let Some(cached) = self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(name) {
			return Ok(cached.clone());
		}
		let loaded = self.inner.load(name)?;
		self.cache.lock().unwrap_or_else(|e| e.into_inner()).entry(name.to_owned()).or_insert_with(|| loaded.clone());
		Ok(loaded)
	}
}

pub fn memoized(inner: impl ClasspathLoader) -> impl ClasspathLoader {
	memoized_to(inner, new_shared_cache())
}

pub fn memoized_to(inner: impl ClasspathLoader, cache: SharedClassCache) -> impl ClasspathLoader {
	MemoizedLoader { inner, cache }
}

struct RemappingLoader<L: ClasspathLoader, R: BRemapper + Send + Sync> {
	inner: L,
	remapper: R,
}

impl<L: ClasspathLoader, R: BRemapper + Send + Sync> ClasspathLoader for RemappingLoader<L, R> {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		let Some(bytes) = self.inner.load(name)? else { return Ok(None) };
		let mut class = duke::read_class(&bytes)?;
		quill::class_remap::remap_class(&self.remapper, &mut class)?;
		Ok(Some(duke::write_class(&class)?))
	}
}

/// Returns class bytes with `remapper` applied to every class/field/method reference.
pub fn remapping(inner: impl ClasspathLoader, remapper: impl BRemapper + Send + Sync) -> impl ClasspathLoader {
	RemappingLoader { inner, remapper }
}

struct RemappingNamesLoader<L: ClasspathLoader> {
	inner: L,
	mappings: Mappings,
	from: Namespace,
	to: Namespace,
}

impl<L: ClasspathLoader> ClasspathLoader for RemappingNamesLoader<L> {
	fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
		let reverse = self.mappings.remapper_a(self.to, self.from)?;
		let original_name = reverse.map_class(name)?;

		let Some(bytes) = self.inner.load(&original_name)? else { return Ok(None) };

		let forward = self.mappings.remapper_a(self.from, self.to)?;
		let remapper = ARemapperAsBRemapper(forward);
		let mut class = duke::read_class(&bytes)?;
		quill::class_remap::remap_class(&remapper, &mut class)?;
		Ok(Some(duke::write_class(&class)?))
	}
}

/// Translates the lookup key through the reverse name map (`to` -> `from`), loads with the
/// original name, then rewrites class references in the returned bytes forward (`from` -> `to`).
pub fn remapping_names(inner: impl ClasspathLoader, mappings: Mappings, from: Namespace, to: Namespace) -> impl ClasspathLoader {
	RemappingNamesLoader { inner, mappings, from, to }
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn compound_tries_loaders_in_order() {
		let mut a = IndexMap::new();
		a.insert("pkg/A".to_owned(), vec![1]);
		let mut b = IndexMap::new();
		b.insert("pkg/A".to_owned(), vec![2]);
		b.insert("pkg/B".to_owned(), vec![3]);

		let loader = compound(vec![Box::new(from_lookup(a)), Box::new(from_lookup(b))]);
		assert_eq!(loader.load("pkg/A").unwrap(), Some(vec![1]));
		assert_eq!(loader.load("pkg/B").unwrap(), Some(vec![3]));
		assert_eq!(loader.load("pkg/C").unwrap(), None);
	}

	#[test]
	fn memoized_caches_misses_too() {
		use std::sync::atomic::{AtomicUsize, Ordering};
		let calls = Arc::new(AtomicUsize::new(0));
		let calls2 = calls.clone();
		let loader = memoized(move |_: &str| -> Result<Option<Vec<u8>>> {
			calls2.fetch_add(1, Ordering::SeqCst);
			Ok(None)
		});
		loader.load("a/A").unwrap();
		loader.load("a/A").unwrap();
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
