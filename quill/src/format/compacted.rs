//! Compacted: a custom binary variant of Tiny. 4-byte magic `ACMF`, a version byte, a namespace
//! list, a per-file prefix dictionary (v2 only, up to 31 entries), then one block per class:
//! namespace names (dictionary-prefixed or literal) followed by a varint member count and that
//! many field/method records. Name elision (empty name = repeat of the previous non-empty name in
//! the same column) is always on, matching Tiny v2's opt-in `compact` mode made mandatory.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use crate::tree::mappings::{ClassMapping, FieldMapping, Mappings, MethodMapping};
use crate::tree::names::{Names, Namespaces};
use crate::tree::NodeInfo;

const MAGIC: [u8; 4] = *b"ACMF";
const MAX_DICTIONARY_ENTRIES: usize = 31;

const DESC_OBJECT: &str = "Ljava/lang/Object;";
const DESC_STRING: &str = "Ljava/lang/String;";
const DESC_LIST: &str = "Ljava/util/List;";

struct Reader<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Reader { bytes, pos: 0 }
	}

	fn byte(&mut self) -> Result<u8> {
		let b = *self.bytes.get(self.pos).context("unexpected end of compacted mappings data")?;
		self.pos += 1;
		Ok(b)
	}

	fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
		let end = self.pos.checked_add(n).context("length overflow")?;
		let slice = self.bytes.get(self.pos..end).context("unexpected end of compacted mappings data")?;
		self.pos = end;
		Ok(slice)
	}

	fn varint(&mut self) -> Result<u64> {
		let mut result: u64 = 0;
		let mut shift = 0;
		loop {
			let b = self.byte()?;
			result |= u64::from(b & 0x7f) << shift;
			if b & 0x80 == 0 {
				return Ok(result);
			}
			shift += 7;
			if shift >= 64 {
				bail!("varint too long");
			}
		}
	}

	fn length_prefixed_string(&mut self) -> Result<String> {
		let len = self.byte()? as usize;
		let bytes = self.bytes(len)?;
		String::from_utf8(bytes.to_vec()).context("non-UTF8 string in compacted mappings data")
	}

	/// One token in a name column: a descriptor-shortcut byte (`A`/`G`/`R`), a dictionary-index
	/// byte (`0x00..=0x1e` meaning "prefix dictionary entry N" followed by the literal suffix), or
	/// a plain length-prefixed literal (`0x1f` marker).
	fn name_token(&mut self, dictionary: &[String]) -> Result<String> {
		let marker = self.byte()?;
		match marker {
			0x1f => self.length_prefixed_string(),
			index if (index as usize) < dictionary.len().min(MAX_DICTIONARY_ENTRIES) => {
				let suffix = self.length_prefixed_string()?;
				Ok(format!("{}{}", dictionary[index as usize], suffix))
			}
			other => bail!("invalid name token marker {other}"),
		}
	}

	fn descriptor(&mut self, dictionary: &[String]) -> Result<String> {
		let marker = self.byte()?;
		match marker {
			b'A' => Ok(DESC_OBJECT.to_owned()),
			b'G' => Ok(DESC_STRING.to_owned()),
			b'R' => Ok(DESC_LIST.to_owned()),
			0x1f => self.length_prefixed_string(),
			index if (index as usize) < dictionary.len().min(MAX_DICTIONARY_ENTRIES) => {
				let suffix = self.length_prefixed_string()?;
				Ok(format!("{}{}", dictionary[index as usize], suffix))
			}
			other => bail!("invalid descriptor token marker {other}"),
		}
	}
}

pub fn parse(bytes: &[u8]) -> Result<Mappings> {
	let mut reader = Reader::new(bytes);
	let magic = reader.bytes(4)?;
	if magic != MAGIC {
		bail!("not a compacted mappings file: bad magic {magic:?}");
	}
	let version = reader.byte()?;
	if version != 1 && version != 2 {
		bail!("unsupported compacted mappings version {version}");
	}

	let namespace_count = reader.byte()? as usize;
	let mut namespace_names = Vec::with_capacity(namespace_count);
	for _ in 0..namespace_count {
		namespace_names.push(reader.length_prefixed_string()?);
	}
	let namespaces = Namespaces::new(namespace_names)?;

	let dictionary = if version == 2 {
		let count = reader.byte()? as usize;
		let mut dictionary = Vec::with_capacity(count);
		for _ in 0..count {
			dictionary.push(reader.length_prefixed_string()?);
		}
		dictionary
	} else {
		Vec::new()
	};

	let n = namespaces.len();
	let mut mappings = Mappings::new(namespaces);
	let class_count = reader.varint()? as usize;

	for _ in 0..class_count {
		let names = read_name_column(&mut reader, &dictionary, n, None)?;
		let class = mappings.add_class(NodeInfo::new(ClassMapping { names }))?;
		let member_count = reader.varint()?;
		let mut previous_field: Vec<Option<String>> = vec![None; n];
		let mut previous_method: Vec<Option<String>> = vec![None; n];
		for _ in 0..member_count {
			let kind = reader.byte()?;
			match kind {
				b'f' => {
					let names = read_name_column_with_default(&mut reader, &dictionary, n, &previous_field)?;
					previous_field = names.as_slice().to_vec();
					let desc = Some(reader.descriptor(&dictionary)?);
					class.add_field(NodeInfo::new(FieldMapping { desc, names: Names::from_vec(names.as_slice().to_vec()) }))?;
				}
				b'm' => {
					let names = read_name_column_with_default(&mut reader, &dictionary, n, &previous_method)?;
					previous_method = names.as_slice().to_vec();
					let desc = reader.descriptor(&dictionary)?;
					class.add_method(NodeInfo::new(MethodMapping { desc, names: Names::from_vec(names.as_slice().to_vec()) }))?;
				}
				other => bail!("unknown member kind byte {other}"),
			}
		}
	}

	Ok(mappings)
}

fn read_name_column(reader: &mut Reader, dictionary: &[String], n: usize, default: Option<&[Option<String>]>) -> Result<Names<String>> {
	let mut names = Vec::with_capacity(n);
	for i in 0..n {
		let marker = reader.byte()?;
		if marker == 0xff {
			// elided: repeat the previous non-empty name in this column
			let previous = default.and_then(|d| d.get(i)).and_then(|o| o.clone());
			names.push(previous);
		} else {
			reader.pos -= 1;
			names.push(Some(reader.name_token(dictionary)?));
		}
	}
	Ok(Names::from_vec(names))
}

fn read_name_column_with_default(reader: &mut Reader, dictionary: &[String], n: usize, previous: &[Option<String>]) -> Result<Names<String>> {
	read_name_column(reader, dictionary, n, Some(previous))
}

struct Writer {
	bytes: Vec<u8>,
}

impl Writer {
	fn new() -> Self {
		Writer { bytes: Vec::new() }
	}

	fn byte(&mut self, b: u8) {
		self.bytes.push(b);
	}

	fn bytes(&mut self, b: &[u8]) {
		self.bytes.extend_from_slice(b);
	}

	fn varint(&mut self, mut value: u64) {
		loop {
			let mut b = (value & 0x7f) as u8;
			value >>= 7;
			if value != 0 {
				b |= 0x80;
			}
			self.byte(b);
			if value == 0 {
				break;
			}
		}
	}

	fn length_prefixed_string(&mut self, s: &str) {
		self.byte(s.len() as u8);
		self.bytes(s.as_bytes());
	}

	fn name_token(&mut self, name: &str, dictionary: &[(String, u8)]) {
		if let Some((prefix, index)) = dictionary.iter().filter(|(p, _)| name.starts_with(p.as_str())).max_by_key(|(p, _)| p.len()) {
			self.byte(*index);
			self.length_prefixed_string(&name[prefix.len()..]);
		} else {
			self.byte(0x1f);
			self.length_prefixed_string(name);
		}
	}

	fn descriptor(&mut self, desc: &str, dictionary: &[(String, u8)]) {
		match desc {
			DESC_OBJECT => self.byte(b'A'),
			DESC_STRING => self.byte(b'G'),
			DESC_LIST => self.byte(b'R'),
			_ => self.name_token(desc, dictionary),
		}
	}
}

/// Scores substrings of `namespace` names (up to the last `/`) by occurrence frequency across
/// every class/field/method name in that namespace, keeping up to 31, longest-first among ties.
fn build_dictionary(mappings: &Mappings) -> Vec<String> {
	let mut counts: HashMap<String, usize> = HashMap::new();
	let mut visit = |name: &str| {
		if let Some(slash) = name.rfind('/') {
			let prefix = &name[..=slash];
			let mut start = 0;
			while let Some(next) = prefix[start..].find('/') {
				let end = start + next + 1;
				*counts.entry(prefix[..end].to_owned()).or_insert(0) += 1;
				start = end;
			}
		}
	};
	for class in mappings.classes.values() {
		for name in class.info.names.as_slice().iter().flatten() {
			visit(name);
		}
	}
	let mut entries: Vec<(String, usize)> = counts.into_iter().filter(|(_, count)| *count > 1).collect();
	entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.len().cmp(&a.0.len())));
	entries.into_iter().take(MAX_DICTIONARY_ENTRIES).map(|(prefix, _)| prefix).collect()
}

pub fn write(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut writer = Writer::new();
	writer.bytes(&MAGIC);
	writer.byte(2);

	let namespace_names = mappings.namespaces.as_slice();
	writer.byte(namespace_names.len() as u8);
	for name in namespace_names {
		writer.length_prefixed_string(name);
	}

	let dictionary_strings = build_dictionary(mappings);
	writer.byte(dictionary_strings.len() as u8);
	for entry in &dictionary_strings {
		writer.length_prefixed_string(entry);
	}
	let dictionary: Vec<(String, u8)> = dictionary_strings.iter().enumerate().map(|(i, s)| (s.clone(), i as u8)).collect();

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
	writer.varint(classes.len() as u64);

	for class in classes {
		write_names(&mut writer, class.info.names.as_slice(), &dictionary, None);

		let member_count = class.fields.len() + class.methods.len();
		writer.varint(member_count as u64);

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		let mut previous: Vec<Option<String>> = vec![None; namespace_names.len()];
		for field in fields {
			writer.byte(b'f');
			write_names(&mut writer, field.info.names.as_slice(), &dictionary, Some(&previous));
			previous = field.info.names.as_slice().to_vec();
			writer.descriptor(field.info.desc.as_deref().unwrap_or(DESC_OBJECT), &dictionary);
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));
		let mut previous: Vec<Option<String>> = vec![None; namespace_names.len()];
		for method in methods {
			writer.byte(b'm');
			write_names(&mut writer, method.info.names.as_slice(), &dictionary, Some(&previous));
			previous = method.info.names.as_slice().to_vec();
			writer.descriptor(&method.info.desc, &dictionary);
		}
	}

	Ok(writer.bytes)
}

fn write_names(writer: &mut Writer, names: &[Option<String>], dictionary: &[(String, u8)], previous: Option<&[Option<String>]>) {
	for (i, name) in names.iter().enumerate() {
		let elided = match (previous, name) {
			(Some(previous), Some(name)) => previous.get(i).and_then(|o| o.as_deref()) == Some(name.as_str()),
			_ => false,
		};
		if elided {
			writer.byte(0xff);
		} else {
			writer.name_token(name.as_deref().unwrap_or(""), dictionary);
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;
	use crate::tree::mappings::GenericMappings;

	#[test]
	fn round_trips_class_field_and_method() -> Result<()> {
		let mut builder = GenericMappings::new(vec!["obf".to_owned(), "named".to_owned()])?;
		let class = builder.add_class(vec![Some("a/A".to_owned()), Some("b/B".to_owned())])?;
		class.add_field(NodeInfo::new(FieldMapping { desc: Some(DESC_STRING.to_owned()), names: Names::from_vec(vec![Some("f".to_owned()), Some("g".to_owned())]) }))?;
		class.add_method(NodeInfo::new(MethodMapping { desc: "()V".to_owned(), names: Names::from_vec(vec![Some("m".to_owned()), Some("n".to_owned())]) }))?;
		let mappings = builder.build()?;

		let bytes = write(&mappings)?;
		assert_eq!(&bytes[0..4], &MAGIC);
		let round_tripped = parse(&bytes)?;
		let class = round_tripped.classes.get("a/A").unwrap();
		assert_eq!(class.fields.len(), 1);
		assert_eq!(class.methods.len(), 1);
		let field = class.fields.values().next().unwrap();
		assert_eq!(field.info.desc.as_deref(), Some(DESC_STRING));
		Ok(())
	}
}
