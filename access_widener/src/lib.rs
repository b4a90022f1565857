//! Parsing, combining, remapping and applying access wideners: files declaring access-flag
//! relaxations (`accessible`/`extendable`/`mutable`) on classes, fields and methods, layered on
//! top of `duke` (class files) and `quill` (mappings/remappers).

pub mod model;
pub mod format;
pub mod algebra;
pub mod tree;
pub mod remap;
pub mod apply;

pub use model::{AccessMask, AccessWidener, AccessedMember};
pub use tree::{AccessWidenerTree, AccessedClass, MemberIdentifier};
