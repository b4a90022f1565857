//! Reading and writing jar (zip) archives.
//!
//! A [`Jar`] is anything that can be opened and enumerated as a flat list of entries; [`FileJar`]
//! and [`MemJar`] cover the two sources the pipeline needs (a path on disk, and bytes already in
//! memory, e.g. produced by a previous pipeline stage in tests). [`write_jar`] is the writing
//! counterpart used once a task has finished remapping every entry.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone)]
pub struct JarEntry {
	pub name: String,
	pub is_dir: bool,
	pub data: Vec<u8>,
}

impl JarEntry {
	pub fn is_class(&self) -> bool {
		!self.is_dir && self.name.ends_with(".class")
	}
}

pub trait Jar {
	fn entries(&self) -> Result<Vec<JarEntry>>;
}

/// Blanket-implemented for anything that can hand out a fresh `Read + Seek` over the same
/// underlying bytes every time it's asked, which is all [`Jar::entries`] actually needs.
trait JarFromReader {
	type Reader<'a>: Read + Seek
	where
		Self: 'a;

	fn open(&self) -> Result<Self::Reader<'_>>;
}

impl<T: JarFromReader> Jar for T {
	fn entries(&self) -> Result<Vec<JarEntry>> {
		let reader = self.open()?;
		let mut zip = ZipArchive::new(reader).context("not a valid zip archive")?;

		let mut out = Vec::with_capacity(zip.len());
		for index in 0..zip.len() {
			let mut file = zip.by_index(index)?;
			let mut data = Vec::new();
			file.read_to_end(&mut data)?;
			out.push(JarEntry { name: file.name().to_owned(), is_dir: file.is_dir(), data });
		}
		Ok(out)
	}
}

#[derive(Debug, Clone)]
pub struct FileJar {
	path: PathBuf,
}

impl FileJar {
	pub fn new(path: impl Into<PathBuf>) -> FileJar {
		FileJar { path: path.into() }
	}
}

impl JarFromReader for FileJar {
	type Reader<'a> = File;

	fn open(&self) -> Result<File> {
		File::open(&self.path).with_context(|| anyhow!("failed to open jar at {:?}", self.path))
	}
}

#[derive(Debug, Clone)]
pub struct MemJar {
	data: Vec<u8>,
}

impl MemJar {
	pub fn new(data: Vec<u8>) -> MemJar {
		MemJar { data }
	}
}

impl JarFromReader for MemJar {
	type Reader<'a> = Cursor<&'a Vec<u8>>;

	fn open(&self) -> Result<Cursor<&Vec<u8>>> {
		Ok(Cursor::new(&self.data))
	}
}

/// Writes `entries` to a zip archive at `path`, in iteration order. Directory entries (those
/// whose name ends in `/`) are written without content.
pub fn write_jar(path: impl AsRef<Path>, entries: impl IntoIterator<Item = JarEntry>) -> Result<()> {
	let file = File::create(path.as_ref()).with_context(|| anyhow!("failed to create jar at {:?}", path.as_ref()))?;
	let mut zip = ZipWriter::new(file);
	let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

	for entry in entries {
		if entry.is_dir {
			zip.add_directory(entry.name, options)?;
		} else {
			zip.start_file(entry.name, options)?;
			zip.write_all(&entry.data)?;
		}
	}

	zip.finish()?;
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn round_trips_entries_through_a_written_jar() {
		let dir = std::env::temp_dir().join(format!("dukebox-test-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("round_trip.jar");

		let entries = vec![
			JarEntry { name: "a/A.class".to_owned(), is_dir: false, data: vec![1, 2, 3] },
			JarEntry { name: "a/README.txt".to_owned(), is_dir: false, data: b"hi".to_vec() },
		];
		write_jar(&path, entries).unwrap();

		let jar = FileJar::new(path.clone());
		let read_back = jar.entries().unwrap();
		assert_eq!(read_back.len(), 2);
		assert!(read_back.iter().find(|e| e.name == "a/A.class").unwrap().is_class());
		assert!(!read_back.iter().find(|e| e.name == "a/README.txt").unwrap().is_class());

		std::fs::remove_file(&path).unwrap();
	}
}
