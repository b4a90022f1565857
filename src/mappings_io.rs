//! Reading a mappings file off disk: content-sniffed for the text formats, falling back to the
//! binary compacted format when the bytes aren't valid UTF-8.

use std::path::Path;
use anyhow::{Context, Result};
use quill::tree::mappings::Mappings;

pub fn load_mappings(path: &Path) -> Result<Mappings> {
	let bytes = std::fs::read(path).with_context(|| format!("reading mappings file {}", path.display()))?;

	match String::from_utf8(bytes) {
		Ok(text) => quill::format::detect(&text).with_context(|| format!("parsing mappings file {}", path.display())),
		Err(e) => quill::format::compacted::parse(e.as_bytes()).with_context(|| format!("parsing mappings file {} as compacted", path.display())),
	}
}
