pub mod names;
pub mod mappings;

use crate::tree::names::Names;

/// A tree node carrying a payload `I` (its "info") plus, in subtypes, child maps.
pub trait NodeInfo<I> {
	fn get_node_info(&self) -> &I;
	fn get_node_info_mut(&mut self) -> &mut I;
	fn new(info: I) -> Self;
}

pub trait ToKey<K> {
	fn get_key(&self) -> K;
}

pub trait FromKey<K> {
	fn from_key(key: K) -> Self;
}

pub trait GetNames<T> {
	fn get_names(&self) -> &Names<T>;
	fn get_names_mut(&mut self) -> &mut Names<T>;
}
