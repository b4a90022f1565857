//! The inverse of [`class_reader`](crate::class_reader): serializes a [`ClassFile`] back into
//! bytes, rebuilding the constant pool from scratch (no attempt to preserve original pool order
//! or deduplicate entries the original didn't share).

use std::io::Write;

use anyhow::Result;

use crate::tree::annotation::{Annotation, ConstValue, ElementValue};
use crate::tree::class::ClassFile;
use crate::tree::field::{Field, FieldRef};
use crate::tree::method::code::{Code, Handle, Instruction, InstructionKind, Loadable, opcode};
use crate::tree::method::{Method, MethodRef};
use crate::tree::module::Module;

#[derive(Default)]
struct PoolBuilder {
	entries: Vec<Vec<u8>>,
	utf8: std::collections::HashMap<String, u16>,
	class: std::collections::HashMap<String, u16>,
	module_name: std::collections::HashMap<String, u16>,
	package_name: std::collections::HashMap<String, u16>,
	name_and_type: std::collections::HashMap<(String, String), u16>,
	field_ref: std::collections::HashMap<(String, String, String), u16>,
	method_ref: std::collections::HashMap<(String, String, String, bool), u16>,
	string: std::collections::HashMap<String, u16>,
	integer: std::collections::HashMap<i32, u16>,
	long: std::collections::HashMap<i64, u16>,
	float_bits: std::collections::HashMap<u32, u16>,
	double_bits: std::collections::HashMap<u64, u16>,
	method_type: std::collections::HashMap<String, u16>,
	method_handle: Vec<(Handle, u16)>,
	bootstrap_methods: Vec<(Handle, Vec<Loadable>)>,
	invoke_dynamic: Vec<(u16, String, String, u16)>,
}

impl PoolBuilder {
	fn push(&mut self, bytes: Vec<u8>, wide: bool) -> u16 {
		let index = self.entries.len() as u16 + 1;
		self.entries.push(bytes);
		if wide {
			self.entries.push(Vec::new());
		}
		index
	}

	fn utf8(&mut self, s: &str) -> u16 {
		if let Some(&i) = self.utf8.get(s) {
			return i;
		}
		let mut bytes = vec![1u8];
		bytes.extend((s.len() as u16).to_be_bytes());
		bytes.extend(s.as_bytes());
		let index = self.push(bytes, false);
		self.utf8.insert(s.to_owned(), index);
		index
	}

	fn class(&mut self, name: &str) -> u16 {
		if let Some(&i) = self.class.get(name) {
			return i;
		}
		let name_index = self.utf8(name);
		let mut bytes = vec![7u8];
		bytes.extend(name_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.class.insert(name.to_owned(), index);
		index
	}

	fn module(&mut self, name: &str) -> u16 {
		if let Some(&i) = self.module_name.get(name) {
			return i;
		}
		let name_index = self.utf8(name);
		let mut bytes = vec![19u8];
		bytes.extend(name_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.module_name.insert(name.to_owned(), index);
		index
	}

	fn package(&mut self, name: &str) -> u16 {
		if let Some(&i) = self.package_name.get(name) {
			return i;
		}
		let name_index = self.utf8(name);
		let mut bytes = vec![20u8];
		bytes.extend(name_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.package_name.insert(name.to_owned(), index);
		index
	}

	fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
		let key = (name.to_owned(), descriptor.to_owned());
		if let Some(&i) = self.name_and_type.get(&key) {
			return i;
		}
		let name_index = self.utf8(name);
		let descriptor_index = self.utf8(descriptor);
		let mut bytes = vec![12u8];
		bytes.extend(name_index.to_be_bytes());
		bytes.extend(descriptor_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.name_and_type.insert(key, index);
		index
	}

	fn field_ref(&mut self, f: &FieldRef) -> u16 {
		let key = (f.owner.clone(), f.name.clone(), f.descriptor.clone());
		if let Some(&i) = self.field_ref.get(&key) {
			return i;
		}
		let class_index = self.class(&f.owner);
		let nat_index = self.name_and_type(&f.name, &f.descriptor);
		let mut bytes = vec![9u8];
		bytes.extend(class_index.to_be_bytes());
		bytes.extend(nat_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.field_ref.insert(key, index);
		index
	}

	fn method_ref(&mut self, m: &MethodRef) -> u16 {
		let key = (m.owner.clone(), m.name.clone(), m.descriptor.clone(), m.is_interface);
		if let Some(&i) = self.method_ref.get(&key) {
			return i;
		}
		let class_index = self.class(&m.owner);
		let nat_index = self.name_and_type(&m.name, &m.descriptor);
		let tag = if m.is_interface { 11u8 } else { 10u8 };
		let mut bytes = vec![tag];
		bytes.extend(class_index.to_be_bytes());
		bytes.extend(nat_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.method_ref.insert(key, index);
		index
	}

	fn string(&mut self, s: &str) -> u16 {
		if let Some(&i) = self.string.get(s) {
			return i;
		}
		let utf8_index = self.utf8(s);
		let mut bytes = vec![8u8];
		bytes.extend(utf8_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.string.insert(s.to_owned(), index);
		index
	}

	fn integer(&mut self, v: i32) -> u16 {
		if let Some(&i) = self.integer.get(&v) {
			return i;
		}
		let mut bytes = vec![3u8];
		bytes.extend(v.to_be_bytes());
		let index = self.push(bytes, false);
		self.integer.insert(v, index);
		index
	}

	fn long(&mut self, v: i64) -> u16 {
		if let Some(&i) = self.long.get(&v) {
			return i;
		}
		let mut bytes = vec![5u8];
		bytes.extend(v.to_be_bytes());
		let index = self.push(bytes, true);
		self.long.insert(v, index);
		index
	}

	fn float(&mut self, v: f32) -> u16 {
		let bits = v.to_bits();
		if let Some(&i) = self.float_bits.get(&bits) {
			return i;
		}
		let mut bytes = vec![4u8];
		bytes.extend(bits.to_be_bytes());
		let index = self.push(bytes, false);
		self.float_bits.insert(bits, index);
		index
	}

	fn double(&mut self, v: f64) -> u16 {
		let bits = v.to_bits();
		if let Some(&i) = self.double_bits.get(&bits) {
			return i;
		}
		let mut bytes = vec![6u8];
		bytes.extend(bits.to_be_bytes());
		let index = self.push(bytes, true);
		self.double_bits.insert(bits, index);
		index
	}

	fn method_type(&mut self, descriptor: &str) -> u16 {
		if let Some(&i) = self.method_type.get(descriptor) {
			return i;
		}
		let descriptor_index = self.utf8(descriptor);
		let mut bytes = vec![16u8];
		bytes.extend(descriptor_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.method_type.insert(descriptor.to_owned(), index);
		index
	}

	fn method_handle(&mut self, handle: &Handle) -> u16 {
		if let Some((_, index)) = self.method_handle.iter().find(|(h, _)| h == handle) {
			return *index;
		}
		let reference_index = match handle {
			Handle::GetField(f) | Handle::GetStatic(f) | Handle::PutField(f) | Handle::PutStatic(f) => self.field_ref(f),
			Handle::InvokeVirtual(m) | Handle::InvokeStatic(m) | Handle::InvokeSpecial(m) | Handle::NewInvokeSpecial(m) | Handle::InvokeInterface(m) => self.method_ref(m),
		};
		let mut bytes = vec![15u8, handle.reference_kind()];
		bytes.extend(reference_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.method_handle.push((handle.clone(), index));
		index
	}

	fn loadable(&mut self, loadable: &Loadable) -> u16 {
		match loadable {
			Loadable::Integer(v) => self.integer(*v),
			Loadable::Float(v) => self.float(*v),
			Loadable::Long(v) => self.long(*v),
			Loadable::Double(v) => self.double(*v),
			Loadable::String(v) => self.string(v),
			Loadable::Class(v) => self.class(v),
			Loadable::MethodHandle(h) => self.method_handle(h),
			Loadable::MethodType(d) => self.method_type(d),
		}
	}

	/// Registers a bootstrap method (deduplicating by handle+arguments) and returns its index
	/// into the eventual `BootstrapMethods` attribute.
	fn bootstrap_method(&mut self, handle: Handle, arguments: Vec<Loadable>) -> u16 {
		if let Some(i) = self.bootstrap_methods.iter().position(|(h, a)| *h == handle && *a == arguments) {
			return i as u16;
		}
		self.bootstrap_methods.push((handle, arguments));
		(self.bootstrap_methods.len() - 1) as u16
	}

	fn invoke_dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
		let nat_index = self.name_and_type(name, descriptor);
		if let Some((_, _, _, index)) = self.invoke_dynamic.iter().find(|(b, n, d, _)| *b == bootstrap && n == name && d == descriptor) {
			return *index;
		}
		let mut bytes = vec![18u8];
		bytes.extend(bootstrap.to_be_bytes());
		bytes.extend(nat_index.to_be_bytes());
		let index = self.push(bytes, false);
		self.invoke_dynamic.push((bootstrap, name.to_owned(), descriptor.to_owned(), index));
		index
	}

	fn finish(self) -> (Vec<u8>, Vec<(Handle, Vec<Loadable>)>) {
		let mut out = Vec::new();
		out.extend(((self.entries.len() + 1) as u16).to_be_bytes());
		for entry in &self.entries {
			out.extend(entry);
		}
		(out, self.bootstrap_methods)
	}
}

struct AttributeList(Vec<(u16, Vec<u8>)>);

impl AttributeList {
	fn new() -> Self {
		AttributeList(Vec::new())
	}

	fn add(&mut self, name_index: u16, data: Vec<u8>) {
		self.0.push((name_index, data));
	}

	fn write(&self, out: &mut Vec<u8>) {
		out.extend((self.0.len() as u16).to_be_bytes());
		for (name_index, data) in &self.0 {
			out.extend(name_index.to_be_bytes());
			out.extend((data.len() as u32).to_be_bytes());
			out.extend(data);
		}
	}
}

fn write_module(pool: &mut PoolBuilder, module: &Module) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend(pool.module(module.name.as_str()).to_be_bytes());
	out.extend(u16::from(module.flags).to_be_bytes());
	out.extend(module.version.as_deref().map(|v| pool.utf8(v)).unwrap_or(0).to_be_bytes());

	out.extend((module.requires.len() as u16).to_be_bytes());
	for requires in &module.requires {
		out.extend(pool.module(requires.name.as_str()).to_be_bytes());
		out.extend(u16::from(requires.flags).to_be_bytes());
		out.extend(requires.version.as_deref().map(|v| pool.utf8(v)).unwrap_or(0).to_be_bytes());
	}

	out.extend((module.exports.len() as u16).to_be_bytes());
	for exports in &module.exports {
		out.extend(pool.package(exports.name.as_str()).to_be_bytes());
		out.extend(u16::from(exports.flags).to_be_bytes());
		out.extend((exports.exports_to.len() as u16).to_be_bytes());
		for to in &exports.exports_to {
			out.extend(pool.module(to.as_str()).to_be_bytes());
		}
	}

	out.extend((module.opens.len() as u16).to_be_bytes());
	for opens in &module.opens {
		out.extend(pool.package(opens.name.as_str()).to_be_bytes());
		out.extend(u16::from(opens.flags).to_be_bytes());
		out.extend((opens.opens_to.len() as u16).to_be_bytes());
		for to in &opens.opens_to {
			out.extend(pool.module(to.as_str()).to_be_bytes());
		}
	}

	out.extend((module.uses.len() as u16).to_be_bytes());
	for uses in &module.uses {
		out.extend(pool.class(uses.as_str()).to_be_bytes());
	}

	out.extend((module.provides.len() as u16).to_be_bytes());
	for provides in &module.provides {
		out.extend(pool.class(provides.name.as_str()).to_be_bytes());
		out.extend((provides.provides_with.len() as u16).to_be_bytes());
		for with in &provides.provides_with {
			out.extend(pool.class(with.as_str()).to_be_bytes());
		}
	}

	out
}

fn write_annotations(pool: &mut PoolBuilder, annotations: &[Annotation]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend((annotations.len() as u16).to_be_bytes());
	for annotation in annotations {
		write_annotation(pool, annotation, &mut out);
	}
	out
}

fn write_annotation(pool: &mut PoolBuilder, annotation: &Annotation, out: &mut Vec<u8>) {
	out.extend(pool.utf8(&annotation.descriptor).to_be_bytes());
	out.extend((annotation.values.len() as u16).to_be_bytes());
	for (name, value) in &annotation.values {
		out.extend(pool.utf8(name).to_be_bytes());
		write_element_value(pool, value, out);
	}
}

fn write_element_value(pool: &mut PoolBuilder, value: &ElementValue, out: &mut Vec<u8>) {
	match value {
		ElementValue::Const(c) => match c {
			ConstValue::Byte(v) => {
				out.push(b'B');
				out.extend(pool.integer(*v as i32).to_be_bytes());
			}
			ConstValue::Char(v) => {
				out.push(b'C');
				out.extend(pool.integer(*v as i32).to_be_bytes());
			}
			ConstValue::Double(v) => {
				out.push(b'D');
				out.extend(pool.double(*v).to_be_bytes());
			}
			ConstValue::Float(v) => {
				out.push(b'F');
				out.extend(pool.float(*v).to_be_bytes());
			}
			ConstValue::Int(v) => {
				out.push(b'I');
				out.extend(pool.integer(*v).to_be_bytes());
			}
			ConstValue::Long(v) => {
				out.push(b'J');
				out.extend(pool.long(*v).to_be_bytes());
			}
			ConstValue::Short(v) => {
				out.push(b'S');
				out.extend(pool.integer(*v as i32).to_be_bytes());
			}
			ConstValue::Boolean(v) => {
				out.push(b'Z');
				out.extend(pool.integer(*v as i32).to_be_bytes());
			}
			ConstValue::String(v) => {
				out.push(b's');
				out.extend(pool.utf8(v).to_be_bytes());
			}
		},
		ElementValue::Enum { type_name, const_name } => {
			out.push(b'e');
			out.extend(pool.utf8(type_name).to_be_bytes());
			out.extend(pool.utf8(const_name).to_be_bytes());
		}
		ElementValue::Class(name) => {
			out.push(b'c');
			out.extend(pool.utf8(name).to_be_bytes());
		}
		ElementValue::Annotation(a) => {
			out.push(b'@');
			write_annotation(pool, a, out);
		}
		ElementValue::Array(values) => {
			out.push(b'[');
			out.extend((values.len() as u16).to_be_bytes());
			for v in values {
				write_element_value(pool, v, out);
			}
		}
	}
}

fn write_field(pool: &mut PoolBuilder, field: &Field) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend(field.access.0.to_be_bytes());
	out.extend(pool.utf8(field.name.as_str()).to_be_bytes());
	out.extend(pool.utf8(&field.descriptor).to_be_bytes());

	let mut attributes = AttributeList::new();
	if let Some(signature) = &field.signature {
		let name_index = pool.utf8("Signature");
		let value_index = pool.utf8(signature);
		attributes.add(name_index, value_index.to_be_bytes().to_vec());
	}
	if let Some(constant) = &field.constant_value {
		let name_index = pool.utf8("ConstantValue");
		let value_index = match constant {
			ConstValue::Int(v) => pool.integer(*v),
			ConstValue::Long(v) => pool.long(*v),
			ConstValue::Float(v) => pool.float(*v),
			ConstValue::Double(v) => pool.double(*v),
			ConstValue::String(v) => pool.string(v),
			_ => pool.integer(0),
		};
		attributes.add(name_index, value_index.to_be_bytes().to_vec());
	}
	if !field.annotations.is_empty() {
		let name_index = pool.utf8("RuntimeVisibleAnnotations");
		let data = write_annotations(pool, &field.annotations);
		attributes.add(name_index, data);
	}
	attributes.write(&mut out);
	out
}

fn write_method(pool: &mut PoolBuilder, method: &Method) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend(method.access.0.to_be_bytes());
	out.extend(pool.utf8(method.name.as_str()).to_be_bytes());
	out.extend(pool.utf8(&method.descriptor).to_be_bytes());

	let mut attributes = AttributeList::new();
	if let Some(signature) = &method.signature {
		let name_index = pool.utf8("Signature");
		let value_index = pool.utf8(signature);
		attributes.add(name_index, value_index.to_be_bytes().to_vec());
	}
	if !method.exceptions.is_empty() {
		let name_index = pool.utf8("Exceptions");
		let mut data = Vec::new();
		data.extend((method.exceptions.len() as u16).to_be_bytes());
		for ex in &method.exceptions {
			data.extend(pool.class(ex).to_be_bytes());
		}
		attributes.add(name_index, data);
	}
	if !method.parameter_names.is_empty() {
		let name_index = pool.utf8("MethodParameters");
		let mut data = vec![method.parameter_names.len() as u8];
		for p in &method.parameter_names {
			let idx = match p {
				Some(name) => pool.utf8(name.as_str()),
				None => 0,
			};
			data.extend(idx.to_be_bytes());
			data.extend(0u16.to_be_bytes());
		}
		attributes.add(name_index, data);
	}
	if !method.annotations.is_empty() {
		let name_index = pool.utf8("RuntimeVisibleAnnotations");
		let data = write_annotations(pool, &method.annotations);
		attributes.add(name_index, data);
	}
	if let Some(code) = &method.code {
		let name_index = pool.utf8("Code");
		let data = write_code(pool, code);
		attributes.add(name_index, data);
	}
	attributes.write(&mut out);
	out
}

fn write_code(pool: &mut PoolBuilder, code: &Code) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend(code.max_stack.to_be_bytes());
	out.extend(code.max_locals.to_be_bytes());

	let mut body = Vec::new();
	for instruction in &code.instructions {
		write_instruction(pool, instruction, &mut body);
	}
	out.extend((body.len() as u32).to_be_bytes());
	out.extend(&body);

	out.extend((code.exception_table.len() as u16).to_be_bytes());
	for handler in &code.exception_table {
		out.extend((handler.start.0 as u16).to_be_bytes());
		out.extend((handler.end.0 as u16).to_be_bytes());
		out.extend((handler.handler.0 as u16).to_be_bytes());
		let catch_type_index = handler.catch_type.as_deref().map(|c| pool.class(c)).unwrap_or(0);
		out.extend(catch_type_index.to_be_bytes());
	}

	let mut attributes = AttributeList::new();
	if !code.local_variables.is_empty() {
		let name_index = pool.utf8("LocalVariableTable");
		let mut data = Vec::new();
		data.extend((code.local_variables.len() as u16).to_be_bytes());
		for lv in &code.local_variables {
			data.extend((lv.start.0 as u16).to_be_bytes());
			data.extend(0u16.to_be_bytes());
			data.extend(pool.utf8(&lv.name).to_be_bytes());
			data.extend(pool.utf8(lv.descriptor.as_deref().unwrap_or("")).to_be_bytes());
			data.extend(lv.index.to_be_bytes());
		}
		attributes.add(name_index, data);
	}
	attributes.write(&mut out);
	out
}

fn write_instruction(pool: &mut PoolBuilder, instruction: &Instruction, out: &mut Vec<u8>) {
	match &instruction.kind {
		InstructionKind::GetStatic(f) => {
			out.push(opcode::GETSTATIC);
			out.extend(pool.field_ref(f).to_be_bytes());
		}
		InstructionKind::PutStatic(f) => {
			out.push(opcode::PUTSTATIC);
			out.extend(pool.field_ref(f).to_be_bytes());
		}
		InstructionKind::GetField(f) => {
			out.push(opcode::GETFIELD);
			out.extend(pool.field_ref(f).to_be_bytes());
		}
		InstructionKind::PutField(f) => {
			out.push(opcode::PUTFIELD);
			out.extend(pool.field_ref(f).to_be_bytes());
		}
		InstructionKind::InvokeVirtual(m) => {
			out.push(opcode::INVOKEVIRTUAL);
			out.extend(pool.method_ref(m).to_be_bytes());
		}
		InstructionKind::InvokeSpecial(m) => {
			out.push(opcode::INVOKESPECIAL);
			out.extend(pool.method_ref(m).to_be_bytes());
		}
		InstructionKind::InvokeStatic(m) => {
			out.push(opcode::INVOKESTATIC);
			out.extend(pool.method_ref(m).to_be_bytes());
		}
		InstructionKind::InvokeInterface(m) => {
			out.push(opcode::INVOKEINTERFACE);
			out.extend(pool.method_ref(m).to_be_bytes());
			let slots = crate::tree::descriptor::argument_slots(&crate::tree::descriptor::parse_method_descriptor(&m.descriptor).unwrap_or(crate::tree::descriptor::MethodDescriptor { parameters: vec![], return_type: None }), false);
			out.push((slots + 1) as u8);
			out.push(0);
		}
		InstructionKind::InvokeDynamic(invoke_dynamic) => {
			let bootstrap_index = pool.bootstrap_method(invoke_dynamic.bootstrap_handle.clone(), invoke_dynamic.bootstrap_arguments.clone());
			for arg in &invoke_dynamic.bootstrap_arguments {
				pool.loadable(arg);
			}
			pool.method_handle(&invoke_dynamic.bootstrap_handle);
			let index = pool.invoke_dynamic(bootstrap_index, &invoke_dynamic.name, &invoke_dynamic.descriptor);
			out.push(opcode::INVOKEDYNAMIC);
			out.extend(index.to_be_bytes());
			out.extend(0u16.to_be_bytes());
		}
		InstructionKind::New(name) => {
			out.push(opcode::NEW);
			out.extend(pool.class(name).to_be_bytes());
		}
		InstructionKind::ANewArray(name) => {
			out.push(opcode::ANEWARRAY);
			out.extend(pool.class(name).to_be_bytes());
		}
		InstructionKind::CheckCast(name) => {
			out.push(opcode::CHECKCAST);
			out.extend(pool.class(name).to_be_bytes());
		}
		InstructionKind::InstanceOf(name) => {
			out.push(opcode::INSTANCEOF);
			out.extend(pool.class(name).to_be_bytes());
		}
		InstructionKind::MultiANewArray(name, dims) => {
			out.push(opcode::MULTIANEWARRAY);
			out.extend(pool.class(name).to_be_bytes());
			out.push(*dims);
		}
		InstructionKind::Ldc(loadable) => {
			let index = pool.loadable(loadable);
			let wide = matches!(loadable, Loadable::Long(_) | Loadable::Double(_));
			if wide {
				out.push(opcode::LDC2_W);
				out.extend(index.to_be_bytes());
			} else if index > u8::MAX as u16 {
				out.push(opcode::LDC_W);
				out.extend(index.to_be_bytes());
			} else {
				out.push(opcode::LDC);
				out.push(index as u8);
			}
		}
		InstructionKind::Jump(target) => {
			let delta = target.0 as i64 - instruction.offset.0 as i64;
			if delta >= i16::MIN as i64 && delta <= i16::MAX as i64 {
				out.push(opcode::GOTO);
				out.extend((delta as i16).to_be_bytes());
			} else {
				out.push(opcode::GOTO_W);
				out.extend((delta as i32).to_be_bytes());
			}
		}
		InstructionKind::Other(op, operands) => {
			out.push(*op);
			out.extend(operands);
		}
	}
}

pub fn write_class(class: &ClassFile) -> Result<Vec<u8>> {
	let mut pool = PoolBuilder::default();

	let name_index = pool.class(class.name.as_str());
	let super_index = class.super_class.as_ref().map(|s| pool.class(s.as_str())).unwrap_or(0);
	let interface_indices: Vec<u16> = class.interfaces.iter().map(|i| pool.class(i.as_str())).collect();

	let field_bodies: Vec<Vec<u8>> = class.fields.iter().map(|f| write_field(&mut pool, f)).collect();
	let method_bodies: Vec<Vec<u8>> = class.methods.iter().map(|m| write_method(&mut pool, m)).collect();

	let mut attributes = AttributeList::new();
	if let Some(signature) = &class.signature {
		let name_index = pool.utf8("Signature");
		let value_index = pool.utf8(signature);
		attributes.add(name_index, value_index.to_be_bytes().to_vec());
	}
	if let Some(source_file) = &class.source_file {
		let name_index = pool.utf8("SourceFile");
		let value_index = pool.utf8(source_file);
		attributes.add(name_index, value_index.to_be_bytes().to_vec());
	}
	if !class.inner_classes.is_empty() {
		let attr_name_index = pool.utf8("InnerClasses");
		let mut data = Vec::new();
		data.extend((class.inner_classes.len() as u16).to_be_bytes());
		for inner in &class.inner_classes {
			data.extend(pool.class(inner.inner_class.as_str()).to_be_bytes());
			data.extend(inner.outer_class.as_ref().map(|c| pool.class(c.as_str())).unwrap_or(0).to_be_bytes());
			data.extend(inner.inner_name.as_deref().map(|n| pool.utf8(n)).unwrap_or(0).to_be_bytes());
			data.extend(inner.access.0.to_be_bytes());
		}
		attributes.add(attr_name_index, data);
	}
	if let Some(enclosing) = &class.enclosing_method {
		let attr_name_index = pool.utf8("EnclosingMethod");
		let mut data = Vec::new();
		data.extend(pool.class(enclosing.class.as_str()).to_be_bytes());
		let nat_index = match (&enclosing.method_name, &enclosing.method_descriptor) {
			(Some(n), Some(d)) => pool.name_and_type(n, d),
			_ => 0,
		};
		data.extend(nat_index.to_be_bytes());
		attributes.add(attr_name_index, data);
	}
	if let Some(nest_host) = &class.nest_host {
		let attr_name_index = pool.utf8("NestHost");
		let value_index = pool.class(nest_host.as_str());
		attributes.add(attr_name_index, value_index.to_be_bytes().to_vec());
	}
	if !class.nest_members.is_empty() {
		let attr_name_index = pool.utf8("NestMembers");
		let mut data = Vec::new();
		data.extend((class.nest_members.len() as u16).to_be_bytes());
		for member in &class.nest_members {
			data.extend(pool.class(member.as_str()).to_be_bytes());
		}
		attributes.add(attr_name_index, data);
	}
	if !class.permitted_subclasses.is_empty() {
		let attr_name_index = pool.utf8("PermittedSubclasses");
		let mut data = Vec::new();
		data.extend((class.permitted_subclasses.len() as u16).to_be_bytes());
		for subclass in &class.permitted_subclasses {
			data.extend(pool.class(subclass.as_str()).to_be_bytes());
		}
		attributes.add(attr_name_index, data);
	}
	if !class.record_components.is_empty() {
		let attr_name_index = pool.utf8("Record");
		let mut data = Vec::new();
		data.extend((class.record_components.len() as u16).to_be_bytes());
		for component in &class.record_components {
			data.extend(pool.utf8(&component.name).to_be_bytes());
			data.extend(pool.utf8(&component.descriptor).to_be_bytes());
			let mut component_attrs = AttributeList::new();
			if let Some(signature) = &component.signature {
				let sig_name_index = pool.utf8("Signature");
				let sig_value_index = pool.utf8(signature);
				component_attrs.add(sig_name_index, sig_value_index.to_be_bytes().to_vec());
			}
			let mut component_out = Vec::new();
			component_attrs.write(&mut component_out);
			data.extend(component_out);
		}
		attributes.add(attr_name_index, data);
	}
	if let Some(module) = &class.module {
		let attr_name_index = pool.utf8("Module");
		let data = write_module(&mut pool, module);
		attributes.add(attr_name_index, data);
	}
	if !class.annotations.is_empty() {
		let attr_name_index = pool.utf8("RuntimeVisibleAnnotations");
		let data = write_annotations(&mut pool, &class.annotations);
		attributes.add(attr_name_index, data);
	}

	if !pool.bootstrap_methods.is_empty() {
		let attr_name_index = pool.utf8("BootstrapMethods");
		let mut data = Vec::new();
		data.extend((pool.bootstrap_methods.len() as u16).to_be_bytes());
		let methods = pool.bootstrap_methods.clone();
		for (handle, arguments) in &methods {
			data.extend(pool.method_handle(handle).to_be_bytes());
			data.extend((arguments.len() as u16).to_be_bytes());
			for arg in arguments {
				data.extend(pool.loadable(arg).to_be_bytes());
			}
		}
		attributes.add(attr_name_index, data);
	}

	let (pool_bytes, _) = pool.finish();

	let mut out = Vec::new();
	out.extend(0xCAFEBABEu32.to_be_bytes());
	out.extend(class.version.minor.to_be_bytes());
	out.extend(class.version.major.to_be_bytes());
	out.extend(pool_bytes);
	out.extend(class.access.0.to_be_bytes());
	out.extend(name_index.to_be_bytes());
	out.extend(super_index.to_be_bytes());
	out.extend((interface_indices.len() as u16).to_be_bytes());
	for i in interface_indices {
		out.extend(i.to_be_bytes());
	}
	out.extend((field_bodies.len() as u16).to_be_bytes());
	for body in field_bodies {
		out.extend(body);
	}
	out.extend((method_bodies.len() as u16).to_be_bytes());
	for body in method_bodies {
		out.extend(body);
	}
	attributes.write(&mut out);

	let mut result = Vec::new();
	result.write_all(&out)?;
	Ok(result)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::access::AccessFlags;
	use crate::class_reader::read_class;
	use crate::tree::module::{ModuleExports, ModuleExportsFlags, ModuleFlags, ModuleProvides, ModuleRequires, ModuleRequiresFlags};
	use crate::tree::version::Version;

	#[test]
	fn module_info_round_trips_through_write_and_read() {
		let mut class = ClassFile::new(Version::JAVA_17, AccessFlags::new(crate::access::ACC_MODULE), "module-info".into(), None, Vec::new());
		class.module = Some(Module {
			name: "greeter".into(),
			flags: ModuleFlags { is_open: false, is_synthetic: false, is_mandated: false },
			version: Some("1.0".to_owned()),
			requires: vec![ModuleRequires {
				name: "java.base".into(),
				flags: ModuleRequiresFlags { is_transitive: false, is_static_phase: false, is_synthetic: false, is_mandated: true },
				version: None,
			}],
			exports: vec![ModuleExports { name: "com/example/greeter".into(), flags: ModuleExportsFlags { is_synthetic: false, is_mandated: false }, exports_to: Vec::new() }],
			opens: Vec::new(),
			uses: vec!["com/example/Service".into()],
			provides: vec![ModuleProvides { name: "com/example/Service".into(), provides_with: vec!["com/example/ServiceImpl".into()] }],
		});

		let bytes = write_class(&class).unwrap();
		let read_back = read_class(&mut std::io::Cursor::new(bytes)).unwrap();

		let module = read_back.module.unwrap();
		assert_eq!(module.name.as_str(), "greeter");
		assert_eq!(module.version.as_deref(), Some("1.0"));
		assert_eq!(module.requires[0].name.as_str(), "java.base");
		assert!(module.requires[0].flags.is_mandated);
		assert_eq!(module.exports[0].name.as_str(), "com/example/greeter");
		assert_eq!(module.uses[0].as_str(), "com/example/Service");
		assert_eq!(module.provides[0].provides_with[0].as_str(), "com/example/ServiceImpl");
	}
}
