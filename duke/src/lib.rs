//! A small class-file reader, writer and tree model.
//!
//! This crate plays the role of the "ASM-like" class-file collaborator: it knows how to turn
//! class file bytes into a [`tree::class::ClassFile`] and back, and exposes a [`visitor`] API
//! for streaming consumers that don't want to hold the whole tree in memory. Everything that
//! cares about *mapping names* (quill, dukebox, access_widener) builds on top of this crate
//! without needing to know about the constant pool or the bytecode format.

pub mod tree;
pub mod visitor;
pub mod access;
mod class_reader;
mod class_writer;

use std::io::{Cursor, Read};
use anyhow::Result;
use tree::class::ClassFile;

/// Parses a class file from the given bytes.
pub fn read_class(bytes: &[u8]) -> Result<ClassFile> {
	class_reader::read_class(&mut Cursor::new(bytes))
}

/// Parses a class file from a reader.
pub fn read_class_from(reader: &mut impl Read) -> Result<ClassFile> {
	class_reader::read_class(reader)
}

/// Serializes a class file back into bytes.
pub fn write_class(class: &ClassFile) -> Result<Vec<u8>> {
	class_writer::write_class(class)
}
