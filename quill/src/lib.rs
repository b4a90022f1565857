//! The in-memory mappings data model: a namespaced class/field/method/parameter/local rename
//! table ("nowode" tree), the format codecs that read and write it, the transformations that
//! combine and reshape it, and the remappers that apply it to class files.

pub mod class_remap;
pub mod error;
pub mod format;
pub mod lines;
pub mod remapper;
pub mod transform;
pub mod tree;
