//! A condensed class-file reader: enough of the constant pool and attribute table to populate
//! [`ClassFile`](crate::tree::class::ClassFile). Attributes this crate doesn't model (stack map
//! tables, line numbers, ...) are skipped by length rather than parsed.

use std::io::Read;

use anyhow::{bail, Context, Result};

use crate::access::AccessFlags;
use crate::tree::annotation::{Annotation, ConstValue, ElementValue};
use crate::tree::class::{ClassFile, EnclosingMethod, InnerClass, RecordComponent};
use crate::tree::field::{Field, FieldRef};
use crate::tree::method::code::{Code, ExceptionHandler, Handle, Instruction, InstructionKind, InvokeDynamic, Loadable, LocalVariable, Offset, opcode};
use crate::tree::method::{Method, MethodRef};
use crate::tree::module::{Module, ModuleExports, ModuleExportsFlags, ModuleFlags, ModuleOpens, ModuleOpensFlags, ModuleProvides, ModuleRequires, ModuleRequiresFlags};
use crate::tree::version::Version;

#[derive(Debug, Clone)]
enum PoolEntry {
	Utf8(String),
	Integer(i32),
	Float(f32),
	Long(i64),
	Double(f64),
	Class(u16),
	String(u16),
	FieldRef { class: u16, name_and_type: u16 },
	MethodRef { class: u16, name_and_type: u16 },
	InterfaceMethodRef { class: u16, name_and_type: u16 },
	NameAndType { name: u16, descriptor: u16 },
	MethodHandle { kind: u8, reference: u16 },
	MethodType(u16),
	InvokeDynamic { bootstrap_method_attr: u16, name_and_type: u16 },
	Dummy,
}

struct Pool(Vec<PoolEntry>);

impl Pool {
	fn get(&self, index: u16) -> Result<&PoolEntry> {
		self.0.get(index as usize).with_context(|| format!("constant pool index {index} out of bounds"))
	}

	fn utf8(&self, index: u16) -> Result<String> {
		match self.get(index)? {
			PoolEntry::Utf8(s) => Ok(s.clone()),
			other => bail!("expected Utf8 at {index}, got {other:?}"),
		}
	}

	fn opt_utf8(&self, index: u16) -> Result<Option<String>> {
		if index == 0 {
			Ok(None)
		} else {
			Ok(Some(self.utf8(index)?))
		}
	}

	fn class_name(&self, index: u16) -> Result<String> {
		match self.get(index)? {
			PoolEntry::Class(name_index) => self.utf8(*name_index),
			other => bail!("expected Class at {index}, got {other:?}"),
		}
	}

	fn opt_class_name(&self, index: u16) -> Result<Option<String>> {
		if index == 0 {
			Ok(None)
		} else {
			Ok(Some(self.class_name(index)?))
		}
	}

	fn name_and_type(&self, index: u16) -> Result<(String, String)> {
		match self.get(index)? {
			PoolEntry::NameAndType { name, descriptor } => Ok((self.utf8(*name)?, self.utf8(*descriptor)?)),
			other => bail!("expected NameAndType at {index}, got {other:?}"),
		}
	}

	fn field_ref(&self, index: u16) -> Result<FieldRef> {
		match self.get(index)? {
			PoolEntry::FieldRef { class, name_and_type } => {
				let owner = self.class_name(*class)?;
				let (name, descriptor) = self.name_and_type(*name_and_type)?;
				Ok(FieldRef { owner, name, descriptor })
			}
			other => bail!("expected FieldRef at {index}, got {other:?}"),
		}
	}

	fn method_ref(&self, index: u16) -> Result<MethodRef> {
		match self.get(index)? {
			PoolEntry::MethodRef { class, name_and_type } => {
				let owner = self.class_name(*class)?;
				let (name, descriptor) = self.name_and_type(*name_and_type)?;
				Ok(MethodRef { owner, name, descriptor, is_interface: false })
			}
			PoolEntry::InterfaceMethodRef { class, name_and_type } => {
				let owner = self.class_name(*class)?;
				let (name, descriptor) = self.name_and_type(*name_and_type)?;
				Ok(MethodRef { owner, name, descriptor, is_interface: true })
			}
			other => bail!("expected MethodRef at {index}, got {other:?}"),
		}
	}

	fn handle(&self, index: u16) -> Result<Handle> {
		match self.get(index)? {
			PoolEntry::MethodHandle { kind, reference } => {
				let reference = *reference;
				match kind {
					1 => Ok(Handle::GetField(self.field_ref(reference)?)),
					2 => Ok(Handle::GetStatic(self.field_ref(reference)?)),
					3 => Ok(Handle::PutField(self.field_ref(reference)?)),
					4 => Ok(Handle::PutStatic(self.field_ref(reference)?)),
					5 => Ok(Handle::InvokeVirtual(self.method_ref(reference)?)),
					6 => Ok(Handle::InvokeStatic(self.method_ref(reference)?)),
					7 => Ok(Handle::InvokeSpecial(self.method_ref(reference)?)),
					8 => Ok(Handle::NewInvokeSpecial(self.method_ref(reference)?)),
					9 => Ok(Handle::InvokeInterface(self.method_ref(reference)?)),
					other => bail!("unknown method handle reference kind {other}"),
				}
			}
			other => bail!("expected MethodHandle at {index}, got {other:?}"),
		}
	}

	fn loadable(&self, index: u16) -> Result<Loadable> {
		match self.get(index)? {
			PoolEntry::Integer(v) => Ok(Loadable::Integer(*v)),
			PoolEntry::Float(v) => Ok(Loadable::Float(*v)),
			PoolEntry::Long(v) => Ok(Loadable::Long(*v)),
			PoolEntry::Double(v) => Ok(Loadable::Double(*v)),
			PoolEntry::String(utf8) => Ok(Loadable::String(self.utf8(*utf8)?)),
			PoolEntry::Class(name) => Ok(Loadable::Class(self.utf8(*name)?)),
			PoolEntry::MethodHandle { .. } => Ok(Loadable::MethodHandle(self.handle(index)?)),
			PoolEntry::MethodType(descriptor) => Ok(Loadable::MethodType(self.utf8(*descriptor)?)),
			other => bail!("expected a loadable constant at {index}, got {other:?}"),
		}
	}
}

fn read_u8(r: &mut impl Read) -> Result<u8> {
	let mut buf = [0u8; 1];
	r.read_exact(&mut buf)?;
	Ok(buf[0])
}

fn read_u16(r: &mut impl Read) -> Result<u16> {
	let mut buf = [0u8; 2];
	r.read_exact(&mut buf)?;
	Ok(u16::from_be_bytes(buf))
}

fn read_i32(r: &mut impl Read) -> Result<i32> {
	let mut buf = [0u8; 4];
	r.read_exact(&mut buf)?;
	Ok(i32::from_be_bytes(buf))
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
	let mut buf = [0u8; 4];
	r.read_exact(&mut buf)?;
	Ok(u32::from_be_bytes(buf))
}

fn read_i64(r: &mut impl Read) -> Result<i64> {
	let mut buf = [0u8; 8];
	r.read_exact(&mut buf)?;
	Ok(i64::from_be_bytes(buf))
}

fn read_bytes(r: &mut impl Read, n: usize) -> Result<Vec<u8>> {
	let mut buf = vec![0u8; n];
	r.read_exact(&mut buf)?;
	Ok(buf)
}

fn read_pool(r: &mut impl Read) -> Result<Pool> {
	let count = read_u16(r)?;
	let mut entries = Vec::with_capacity(count as usize);
	entries.push(PoolEntry::Dummy);

	let mut i = 1;
	while i < count {
		let tag = read_u8(r)?;
		let entry = match tag {
			1 => {
				let len = read_u16(r)? as usize;
				let bytes = read_bytes(r, len)?;
				PoolEntry::Utf8(String::from_utf8(bytes).context("non-UTF8 constant pool entry")?)
			}
			3 => PoolEntry::Integer(read_i32(r)?),
			4 => PoolEntry::Float(f32::from_bits(read_u32(r)?)),
			5 => PoolEntry::Long(read_i64(r)?),
			6 => PoolEntry::Double(f64::from_bits(read_i64(r)? as u64)),
			7 => PoolEntry::Class(read_u16(r)?),
			8 => PoolEntry::String(read_u16(r)?),
			9 => PoolEntry::FieldRef { class: read_u16(r)?, name_and_type: read_u16(r)? },
			10 => PoolEntry::MethodRef { class: read_u16(r)?, name_and_type: read_u16(r)? },
			11 => PoolEntry::InterfaceMethodRef { class: read_u16(r)?, name_and_type: read_u16(r)? },
			12 => PoolEntry::NameAndType { name: read_u16(r)?, descriptor: read_u16(r)? },
			15 => PoolEntry::MethodHandle { kind: read_u8(r)?, reference: read_u16(r)? },
			16 => PoolEntry::MethodType(read_u16(r)?),
			18 => PoolEntry::InvokeDynamic { bootstrap_method_attr: read_u16(r)?, name_and_type: read_u16(r)? },
			19 | 20 => {
				// Module / Package: rare outside module-info, kept as an opaque name index.
				PoolEntry::Class(read_u16(r)?)
			}
			other => bail!("unknown constant pool tag {other}"),
		};

		let is_wide = matches!(entry, PoolEntry::Long(_) | PoolEntry::Double(_));
		entries.push(entry);
		i += 1;
		if is_wide {
			entries.push(PoolEntry::Dummy);
			i += 1;
		}
	}

	Ok(Pool(entries))
}

struct RawAttribute {
	name: String,
	data: Vec<u8>,
}

fn read_attributes(r: &mut impl Read, pool: &Pool) -> Result<Vec<RawAttribute>> {
	let count = read_u16(r)?;
	let mut attributes = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let name = pool.utf8(read_u16(r)?)?;
		let length = read_u32(r)? as usize;
		let data = read_bytes(r, length)?;
		attributes.push(RawAttribute { name, data });
	}
	Ok(attributes)
}

fn find_attribute<'a>(attributes: &'a [RawAttribute], name: &str) -> Option<&'a [u8]> {
	attributes.iter().find(|a| a.name == name).map(|a| a.data.as_slice())
}

struct BootstrapMethod {
	handle: Handle,
	arguments: Vec<Loadable>,
}

fn read_bootstrap_methods(data: &[u8], pool: &Pool) -> Result<Vec<BootstrapMethod>> {
	let mut cursor = std::io::Cursor::new(data);
	let count = read_u16(&mut cursor)?;
	let mut methods = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let handle = pool.handle(read_u16(&mut cursor)?)?;
		let arg_count = read_u16(&mut cursor)?;
		let mut arguments = Vec::with_capacity(arg_count as usize);
		for _ in 0..arg_count {
			arguments.push(pool.loadable(read_u16(&mut cursor)?)?);
		}
		methods.push(BootstrapMethod { handle, arguments });
	}
	Ok(methods)
}

fn read_annotations(data: &[u8], pool: &Pool) -> Result<Vec<Annotation>> {
	let mut cursor = std::io::Cursor::new(data);
	let count = read_u16(&mut cursor)?;
	let mut annotations = Vec::with_capacity(count as usize);
	for _ in 0..count {
		annotations.push(read_annotation(&mut cursor, pool)?);
	}
	Ok(annotations)
}

fn read_annotation(r: &mut impl Read, pool: &Pool) -> Result<Annotation> {
	let descriptor = pool.utf8(read_u16(r)?)?;
	let pair_count = read_u16(r)?;
	let mut values = Vec::with_capacity(pair_count as usize);
	for _ in 0..pair_count {
		let name = pool.utf8(read_u16(r)?)?;
		let value = read_element_value(r, pool)?;
		values.push((name, value));
	}
	Ok(Annotation { descriptor, values })
}

fn read_element_value(r: &mut impl Read, pool: &Pool) -> Result<ElementValue> {
	let tag = read_u8(r)?;
	Ok(match tag {
		b'B' => ElementValue::Const(ConstValue::Byte(match pool.loadable(read_u16(r)?)? { Loadable::Integer(v) => v as i8, _ => bail!("bad byte element value") })),
		b'C' => ElementValue::Const(ConstValue::Char(match pool.loadable(read_u16(r)?)? { Loadable::Integer(v) => v as u16, _ => bail!("bad char element value") })),
		b'D' => ElementValue::Const(ConstValue::Double(match pool.loadable(read_u16(r)?)? { Loadable::Double(v) => v, _ => bail!("bad double element value") })),
		b'F' => ElementValue::Const(ConstValue::Float(match pool.loadable(read_u16(r)?)? { Loadable::Float(v) => v, _ => bail!("bad float element value") })),
		b'I' => ElementValue::Const(ConstValue::Int(match pool.loadable(read_u16(r)?)? { Loadable::Integer(v) => v, _ => bail!("bad int element value") })),
		b'J' => ElementValue::Const(ConstValue::Long(match pool.loadable(read_u16(r)?)? { Loadable::Long(v) => v, _ => bail!("bad long element value") })),
		b'S' => ElementValue::Const(ConstValue::Short(match pool.loadable(read_u16(r)?)? { Loadable::Integer(v) => v as i16, _ => bail!("bad short element value") })),
		b'Z' => ElementValue::Const(ConstValue::Boolean(match pool.loadable(read_u16(r)?)? { Loadable::Integer(v) => v != 0, _ => bail!("bad boolean element value") })),
		b's' => ElementValue::Const(ConstValue::String(pool.utf8(read_u16(r)?)?)),
		b'e' => {
			let type_name = pool.utf8(read_u16(r)?)?;
			let const_name = pool.utf8(read_u16(r)?)?;
			ElementValue::Enum { type_name, const_name }
		}
		b'c' => ElementValue::Class(pool.utf8(read_u16(r)?)?),
		b'@' => ElementValue::Annotation(read_annotation(r, pool)?),
		b'[' => {
			let count = read_u16(r)?;
			let mut values = Vec::with_capacity(count as usize);
			for _ in 0..count {
				values.push(read_element_value(r, pool)?);
			}
			ElementValue::Array(values)
		}
		other => bail!("unknown element value tag {other:#x}"),
	})
}

fn read_field(r: &mut impl Read, pool: &Pool) -> Result<Field> {
	let access = AccessFlags::new(read_u16(r)?);
	let name = pool.utf8(read_u16(r)?)?.into();
	let descriptor = pool.utf8(read_u16(r)?)?;
	let attributes = read_attributes(r, pool)?;

	let signature = find_attribute(&attributes, "Signature").map(|d| pool.utf8(u16::from_be_bytes([d[0], d[1]]))).transpose()?;
	let constant_value = find_attribute(&attributes, "ConstantValue")
		.map(|d| {
			let index = u16::from_be_bytes([d[0], d[1]]);
			match pool.loadable(index)? {
				Loadable::Integer(v) => Ok(ConstValue::Int(v)),
				Loadable::Long(v) => Ok(ConstValue::Long(v)),
				Loadable::Float(v) => Ok(ConstValue::Float(v)),
				Loadable::Double(v) => Ok(ConstValue::Double(v)),
				Loadable::String(v) => Ok(ConstValue::String(v)),
				other => bail!("invalid ConstantValue {other:?}"),
			}
		})
		.transpose()?;

	let annotations = read_all_annotation_attrs(&attributes, pool)?;

	Ok(Field { access, name, descriptor, signature, constant_value, annotations })
}

fn read_all_annotation_attrs(attributes: &[RawAttribute], pool: &Pool) -> Result<Vec<Annotation>> {
	let mut out = Vec::new();
	for attr_name in ["RuntimeVisibleAnnotations", "RuntimeInvisibleAnnotations"] {
		if let Some(data) = find_attribute(attributes, attr_name) {
			out.extend(read_annotations(data, pool)?);
		}
	}
	Ok(out)
}

fn read_method(r: &mut impl Read, pool: &Pool) -> Result<Method> {
	let access = AccessFlags::new(read_u16(r)?);
	let name = pool.utf8(read_u16(r)?)?.into();
	let descriptor = pool.utf8(read_u16(r)?)?;
	let attributes = read_attributes(r, pool)?;

	let signature = find_attribute(&attributes, "Signature").map(|d| pool.utf8(u16::from_be_bytes([d[0], d[1]]))).transpose()?;

	let exceptions = find_attribute(&attributes, "Exceptions")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u16(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				out.push(pool.class_name(read_u16(&mut cursor)?)?);
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let parameter_names = find_attribute(&attributes, "MethodParameters")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u8(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				let name_index = read_u16(&mut cursor)?;
				let _access = read_u16(&mut cursor)?;
				out.push(pool.opt_utf8(name_index)?.map(Into::into));
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let bootstrap_methods = find_attribute(&attributes, "BootstrapMethods").map(|d| read_bootstrap_methods(d, pool)).transpose()?.unwrap_or_default();

	let code = find_attribute(&attributes, "Code").map(|data| read_code(data, pool, &bootstrap_methods)).transpose()?;

	let annotations = read_all_annotation_attrs(&attributes, pool)?;

	Ok(Method { access, name, descriptor, signature, exceptions, parameter_names, code, annotations })
}

fn read_code(data: &[u8], pool: &Pool, bootstrap_methods: &[BootstrapMethod]) -> Result<Code> {
	let mut cursor = std::io::Cursor::new(data);
	let max_stack = read_u16(&mut cursor)?;
	let max_locals = read_u16(&mut cursor)?;
	let code_length = read_u32(&mut cursor)? as usize;
	let code_bytes = read_bytes(&mut cursor, code_length)?;
	let instructions = read_instructions(&code_bytes, pool, bootstrap_methods)?;

	let exception_count = read_u16(&mut cursor)?;
	let mut exception_table = Vec::with_capacity(exception_count as usize);
	for _ in 0..exception_count {
		let start = Offset(read_u16(&mut cursor)? as u32);
		let end = Offset(read_u16(&mut cursor)? as u32);
		let handler = Offset(read_u16(&mut cursor)? as u32);
		let catch_type_index = read_u16(&mut cursor)?;
		let catch_type = pool.opt_class_name(catch_type_index)?;
		exception_table.push(ExceptionHandler { start, end, handler, catch_type });
	}

	let code_attributes = read_attributes(&mut cursor, pool)?;
	let local_variables = find_attribute(&code_attributes, "LocalVariableTable")
		.map(|d| read_local_variable_table(d, pool))
		.transpose()?
		.unwrap_or_default();

	Ok(Code { max_stack, max_locals, instructions, exception_table, local_variables })
}

fn read_local_variable_table(data: &[u8], pool: &Pool) -> Result<Vec<LocalVariable>> {
	let mut cursor = std::io::Cursor::new(data);
	let count = read_u16(&mut cursor)?;
	let mut out = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let start = Offset(read_u16(&mut cursor)? as u32);
		let _length = read_u16(&mut cursor)?;
		let name = pool.utf8(read_u16(&mut cursor)?)?;
		let descriptor = Some(pool.utf8(read_u16(&mut cursor)?)?);
		let index = read_u16(&mut cursor)?;
		out.push(LocalVariable { start, index, lvt_index: -1, name, descriptor, signature: None });
	}
	Ok(out)
}

/// Decodes the subset of opcodes this crate models; everything else is kept raw via
/// [`InstructionKind::Other`] so the method body can still be written back byte-for-byte.
fn read_instructions(code: &[u8], pool: &Pool, bootstrap_methods: &[BootstrapMethod]) -> Result<Vec<Instruction>> {
	let mut instructions = Vec::new();
	let mut cursor = std::io::Cursor::new(code);
	let mut pos = 0u32;

	loop {
		let op = match read_u8(&mut cursor) {
			Ok(op) => op,
			Err(_) => break,
		};
		let offset = Offset(pos);
		pos += 1;

		macro_rules! operand_u16 {
			() => {{
				let v = read_u16(&mut cursor)?;
				pos += 2;
				v
			}};
		}

		let kind = match op {
			opcode::GETSTATIC => InstructionKind::GetStatic(pool.field_ref(operand_u16!())?),
			opcode::PUTSTATIC => InstructionKind::PutStatic(pool.field_ref(operand_u16!())?),
			opcode::GETFIELD => InstructionKind::GetField(pool.field_ref(operand_u16!())?),
			opcode::PUTFIELD => InstructionKind::PutField(pool.field_ref(operand_u16!())?),
			opcode::INVOKEVIRTUAL => InstructionKind::InvokeVirtual(pool.method_ref(operand_u16!())?),
			opcode::INVOKESPECIAL => InstructionKind::InvokeSpecial(pool.method_ref(operand_u16!())?),
			opcode::INVOKESTATIC => InstructionKind::InvokeStatic(pool.method_ref(operand_u16!())?),
			opcode::INVOKEINTERFACE => {
				let method_ref = pool.method_ref(operand_u16!())?;
				let _count = read_u8(&mut cursor)?;
				let _zero = read_u8(&mut cursor)?;
				pos += 2;
				InstructionKind::InvokeInterface(method_ref)
			}
			opcode::INVOKEDYNAMIC => {
				let index = operand_u16!();
				let _zero = read_u16(&mut cursor)?;
				pos += 2;
				let (bootstrap_attr, name_and_type) = match pool.get(index)? {
					PoolEntry::InvokeDynamic { bootstrap_method_attr, name_and_type } => (*bootstrap_method_attr, *name_and_type),
					other => bail!("expected InvokeDynamic at {index}, got {other:?}"),
				};
				let (name, descriptor) = pool.name_and_type(name_and_type)?;
				let bootstrap = bootstrap_methods.get(bootstrap_attr as usize).with_context(|| format!("bootstrap method {bootstrap_attr} out of bounds"))?;
				InstructionKind::InvokeDynamic(InvokeDynamic {
					name,
					descriptor,
					bootstrap_handle: bootstrap.handle.clone(),
					bootstrap_arguments: bootstrap.arguments.clone(),
				})
			}
			opcode::NEW => InstructionKind::New(pool.class_name(operand_u16!())?),
			opcode::ANEWARRAY => InstructionKind::ANewArray(pool.class_name(operand_u16!())?),
			opcode::CHECKCAST => InstructionKind::CheckCast(pool.class_name(operand_u16!())?),
			opcode::INSTANCEOF => InstructionKind::InstanceOf(pool.class_name(operand_u16!())?),
			opcode::MULTIANEWARRAY => {
				let class = pool.class_name(operand_u16!())?;
				let dims = read_u8(&mut cursor)?;
				pos += 1;
				InstructionKind::MultiANewArray(class, dims)
			}
			opcode::LDC => {
				let index = read_u8(&mut cursor)? as u16;
				pos += 1;
				InstructionKind::Ldc(pool.loadable(index)?)
			}
			opcode::LDC_W | opcode::LDC2_W => InstructionKind::Ldc(pool.loadable(operand_u16!())?),
			opcode::GOTO => InstructionKind::Jump(Offset(offset.0.wrapping_add(read_i16_as_offset(&mut cursor, &mut pos)?))),
			opcode::GOTO_W => InstructionKind::Jump(Offset(offset.0.wrapping_add(read_i32(&mut cursor)? as u32))).tap_pos(&mut pos, 4),
			other => {
				let operand_len = fixed_operand_len(other);
				let operands = read_bytes(&mut cursor, operand_len)?;
				pos += operand_len as u32;
				InstructionKind::Other(other, operands)
			}
		};

		instructions.push(Instruction { offset, kind });
	}

	Ok(instructions)
}

fn read_i16_as_offset(cursor: &mut impl Read, pos: &mut u32) -> Result<u32> {
	let v = read_u16(cursor)? as i16;
	*pos += 2;
	Ok(v as i32 as u32)
}

trait TapPos {
	fn tap_pos(self, pos: &mut u32, n: u32) -> Self;
}
impl TapPos for InstructionKind {
	fn tap_pos(self, pos: &mut u32, n: u32) -> Self {
		*pos += n;
		self
	}
}

/// Operand byte length for opcodes not specially modelled. `tableswitch`/`lookupswitch`/`wide`
/// have variable-length encodings this reader doesn't support; such methods fail to parse.
fn fixed_operand_len(op: u8) -> usize {
	match op {
		0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => 1,
		0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xa8 | 0xb2..=0xb9 | 0xbb | 0xbd | 0xc0 | 0xc1 | 0xc6 | 0xc7 => 2,
		0xc5 => 3,
		0xb8 | 0xba | 0xc8 => 4,
		_ => 0,
	}
}

pub fn read_class(r: &mut impl Read) -> Result<ClassFile> {
	let magic = read_u32(r)?;
	if magic != 0xCAFEBABE {
		bail!("bad magic number {magic:#x}");
	}
	let minor = read_u16(r)?;
	let major = read_u16(r)?;
	let pool = read_pool(r)?;

	let access = AccessFlags::new(read_u16(r)?);
	let name = pool.class_name(read_u16(r)?)?.into();
	let super_class = pool.opt_class_name(read_u16(r)?)?.map(Into::into);

	let interface_count = read_u16(r)?;
	let mut interfaces = Vec::with_capacity(interface_count as usize);
	for _ in 0..interface_count {
		interfaces.push(pool.class_name(read_u16(r)?)?.into());
	}

	let field_count = read_u16(r)?;
	let mut fields = Vec::with_capacity(field_count as usize);
	for _ in 0..field_count {
		fields.push(read_field(r, &pool)?);
	}

	let method_count = read_u16(r)?;
	let mut methods = Vec::with_capacity(method_count as usize);
	for _ in 0..method_count {
		methods.push(read_method(r, &pool)?);
	}

	let attributes = read_attributes(r, &pool)?;

	let signature = find_attribute(&attributes, "Signature").map(|d| pool.utf8(u16::from_be_bytes([d[0], d[1]]))).transpose()?;
	let source_file = find_attribute(&attributes, "SourceFile").map(|d| pool.utf8(u16::from_be_bytes([d[0], d[1]]))).transpose()?;

	let inner_classes = find_attribute(&attributes, "InnerClasses")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u16(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				let inner_class = pool.class_name(read_u16(&mut cursor)?)?.into();
				let outer_class = pool.opt_class_name(read_u16(&mut cursor)?)?.map(Into::into);
				let inner_name = pool.opt_utf8(read_u16(&mut cursor)?)?;
				let access = AccessFlags::new(read_u16(&mut cursor)?);
				out.push(InnerClass { inner_class, outer_class, inner_name, access });
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let enclosing_method = find_attribute(&attributes, "EnclosingMethod")
		.map(|data| {
			let class = pool.class_name(u16::from_be_bytes([data[0], data[1]]))?.into();
			let name_and_type_index = u16::from_be_bytes([data[2], data[3]]);
			let (method_name, method_descriptor) = if name_and_type_index == 0 {
				(None, None)
			} else {
				let (n, d) = pool.name_and_type(name_and_type_index)?;
				(Some(n), Some(d))
			};
			Ok::<_, anyhow::Error>(EnclosingMethod { class, method_name, method_descriptor })
		})
		.transpose()?;

	let nest_host = find_attribute(&attributes, "NestHost").map(|d| pool.class_name(u16::from_be_bytes([d[0], d[1]])).map(Into::into)).transpose()?;

	let nest_members = find_attribute(&attributes, "NestMembers")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u16(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				out.push(pool.class_name(read_u16(&mut cursor)?)?.into());
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let permitted_subclasses = find_attribute(&attributes, "PermittedSubclasses")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u16(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				out.push(pool.class_name(read_u16(&mut cursor)?)?.into());
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let record_components = find_attribute(&attributes, "Record")
		.map(|data| {
			let mut cursor = std::io::Cursor::new(data);
			let count = read_u16(&mut cursor)?;
			let mut out = Vec::with_capacity(count as usize);
			for _ in 0..count {
				let name = pool.utf8(read_u16(&mut cursor)?)?;
				let descriptor = pool.utf8(read_u16(&mut cursor)?)?;
				let component_attributes = read_attributes(&mut cursor, &pool)?;
				let signature = find_attribute(&component_attributes, "Signature").map(|d| pool.utf8(u16::from_be_bytes([d[0], d[1]]))).transpose()?;
				let annotations = read_all_annotation_attrs(&component_attributes, &pool)?;
				out.push(RecordComponent { name, descriptor, signature, annotations });
			}
			Ok::<_, anyhow::Error>(out)
		})
		.transpose()?
		.unwrap_or_default();

	let module = find_attribute(&attributes, "Module").map(|data| read_module(data, &pool)).transpose()?;

	let annotations = read_all_annotation_attrs(&attributes, &pool)?;

	let mut class = ClassFile::new(Version::new(major, minor), access, name, super_class, interfaces);
	class.fields = fields;
	class.methods = methods;
	class.signature = signature;
	class.source_file = source_file;
	class.inner_classes = inner_classes;
	class.enclosing_method = enclosing_method;
	class.nest_host = nest_host;
	class.nest_members = nest_members;
	class.permitted_subclasses = permitted_subclasses;
	class.record_components = record_components;
	class.module = module;
	class.annotations = annotations;

	Ok(class)
}

fn read_module(data: &[u8], pool: &Pool) -> Result<Module> {
	let mut cursor = std::io::Cursor::new(data);

	let name = pool.class_name(read_u16(&mut cursor)?)?.into();
	let flags = ModuleFlags::from(read_u16(&mut cursor)?);
	let version = pool.opt_utf8(read_u16(&mut cursor)?)?;

	let requires_count = read_u16(&mut cursor)?;
	let mut requires = Vec::with_capacity(requires_count as usize);
	for _ in 0..requires_count {
		let name = pool.class_name(read_u16(&mut cursor)?)?.into();
		let flags = ModuleRequiresFlags::from(read_u16(&mut cursor)?);
		let version = pool.opt_utf8(read_u16(&mut cursor)?)?;
		requires.push(ModuleRequires { name, flags, version });
	}

	let exports_count = read_u16(&mut cursor)?;
	let mut exports = Vec::with_capacity(exports_count as usize);
	for _ in 0..exports_count {
		let name = pool.class_name(read_u16(&mut cursor)?)?.into();
		let flags = ModuleExportsFlags::from(read_u16(&mut cursor)?);
		let to_count = read_u16(&mut cursor)?;
		let mut exports_to = Vec::with_capacity(to_count as usize);
		for _ in 0..to_count {
			exports_to.push(pool.class_name(read_u16(&mut cursor)?)?.into());
		}
		exports.push(ModuleExports { name, flags, exports_to });
	}

	let opens_count = read_u16(&mut cursor)?;
	let mut opens = Vec::with_capacity(opens_count as usize);
	for _ in 0..opens_count {
		let name = pool.class_name(read_u16(&mut cursor)?)?.into();
		let flags = ModuleOpensFlags::from(read_u16(&mut cursor)?);
		let to_count = read_u16(&mut cursor)?;
		let mut opens_to = Vec::with_capacity(to_count as usize);
		for _ in 0..to_count {
			opens_to.push(pool.class_name(read_u16(&mut cursor)?)?.into());
		}
		opens.push(ModuleOpens { name, flags, opens_to });
	}

	let uses_count = read_u16(&mut cursor)?;
	let mut uses = Vec::with_capacity(uses_count as usize);
	for _ in 0..uses_count {
		uses.push(pool.class_name(read_u16(&mut cursor)?)?.into());
	}

	let provides_count = read_u16(&mut cursor)?;
	let mut provides = Vec::with_capacity(provides_count as usize);
	for _ in 0..provides_count {
		let name = pool.class_name(read_u16(&mut cursor)?)?.into();
		let with_count = read_u16(&mut cursor)?;
		let mut provides_with = Vec::with_capacity(with_count as usize);
		for _ in 0..with_count {
			provides_with.push(pool.class_name(read_u16(&mut cursor)?)?.into());
		}
		provides.push(ModuleProvides { name, provides_with });
	}

	Ok(Module { name, flags, version, requires, exports, opens, uses, provides })
}
