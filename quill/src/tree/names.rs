//! Runtime-sized namespace columns.
//!
//! The upstream `Mappings<N>` model fixes the namespace count at compile time via a const
//! generic. Formats here are detected and transformed at runtime (`join`, `reorder_namespaces`
//! and friends can all change the namespace count), so namespaces are a `Vec<String>` and every
//! per-entity name list a `Vec<Option<String>>` instead, checked against `namespaces.len()` where
//! it matters rather than enforced by the type system.

use std::fmt::Debug;
use anyhow::{bail, Result};

/// An index into a [`Namespaces`]/[`Names`] pair, valid only relative to the `len` it was
/// constructed against. Carrying the bound alongside the index lets callers trust the index
/// without re-checking on every access, the way the upstream `Namespace<N>` trusts `N`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Namespace {
	index: usize,
}

impl Namespace {
	pub fn new(index: usize, len: usize) -> Result<Namespace> {
		if index >= len {
			bail!("cannot create namespace with index {index} >= namespace count {len}");
		}
		Ok(Namespace { index })
	}

	pub fn index(self) -> usize {
		self.index
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
	names: Vec<String>,
}

impl Namespaces {
	pub fn new(names: Vec<String>) -> Result<Namespaces> {
		if names.iter().any(|n| n.is_empty()) {
			bail!("namespace names must be non-empty, got {names:?}");
		}
		Ok(Namespaces { names })
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn as_slice(&self) -> &[String] {
		&self.names
	}

	pub fn get(&self, namespace: Namespace) -> &str {
		&self.names[namespace.index]
	}

	pub fn namespace_of(&self, name: &str) -> Result<Namespace> {
		self.names
			.iter()
			.position(|n| n == name)
			.map(|index| Namespace { index })
			.ok_or_else(|| anyhow::anyhow!("cannot find namespace {name:?}, only got {:?}", self.names))
	}

	pub fn check_that(&self, names: &[&str]) -> Result<()> {
		if self.names != names {
			bail!("expected namespaces {names:?}, got {:?}", self.names);
		}
		Ok(())
	}

	pub fn reorder(&self, order: &[Namespace]) -> Namespaces {
		Namespaces { names: order.iter().map(|ns| self.names[ns.index].clone()).collect() }
	}
}

/// A per-entity column of names, one per namespace, following [`Namespaces`]'s order. The first
/// entry is always present once constructed from a real entity (format codecs are responsible for
/// materializing elided/duplicate-of-previous names before building one of these).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names<T> {
	names: Vec<Option<T>>,
}

impl<T: Clone + Debug> Names<T> {
	pub fn none(len: usize) -> Names<T> {
		Names { names: vec![None; len] }
	}

	pub fn from_first_name(len: usize, first: T) -> Names<T> {
		let mut names = vec![None; len];
		if let Some(slot) = names.first_mut() {
			*slot = Some(first);
		}
		Names { names }
	}

	pub fn from_vec(names: Vec<Option<T>>) -> Names<T> {
		Names { names }
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn as_slice(&self) -> &[Option<T>] {
		&self.names
	}

	pub fn get(&self, namespace: Namespace) -> Option<&T> {
		self.names[namespace.index()].as_ref()
	}

	pub fn set(&mut self, namespace: Namespace, name: Option<T>) {
		self.names[namespace.index()] = name;
	}

	pub fn first_name(&self) -> Result<&T> {
		self.names.first().and_then(|o| o.as_ref()).ok_or_else(|| anyhow::anyhow!("no name for the first namespace: {self:?}"))
	}

	pub fn reorder(&self, order: &[Namespace]) -> Names<T> {
		Names { names: order.iter().map(|ns| self.names[ns.index()].clone()).collect() }
	}

	pub fn filter_indices(&self, keep: &[usize]) -> Names<T> {
		Names { names: keep.iter().map(|&i| self.names[i].clone()).collect() }
	}
}
