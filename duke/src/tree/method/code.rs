//! A reduced bytecode model: enough instruction variants to let the remapper and the access
//! widener rewrite references and promote call sites, without modelling the full JVM opcode
//! table (stack map frames, `jsr`/`ret`, and sub-byte array-type opcodes are out of scope, see
//! `Instruction::Other`).

use crate::tree::field::FieldRef;
use crate::tree::method::MethodRef;

/// A bytecode offset within a method body. Used as jump targets and exception ranges.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Code {
	pub max_stack: u16,
	pub max_locals: u16,
	pub instructions: Vec<Instruction>,
	pub exception_table: Vec<ExceptionHandler>,
	pub local_variables: Vec<LocalVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionHandler {
	pub start: Offset,
	pub end: Offset,
	pub handler: Offset,
	pub catch_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
	pub start: Offset,
	pub index: u16,
	/// `-1` means unset, matching `MappedLocal.lvt_index` in the mappings data model.
	pub lvt_index: i32,
	pub name: String,
	pub descriptor: Option<String>,
	pub signature: Option<String>,
}

/// A single bytecode instruction, tagged with its own offset so visitors can address it without
/// a separate label table.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
	pub offset: Offset,
	pub kind: InstructionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
	GetStatic(FieldRef),
	PutStatic(FieldRef),
	GetField(FieldRef),
	PutField(FieldRef),
	InvokeVirtual(MethodRef),
	InvokeSpecial(MethodRef),
	InvokeStatic(MethodRef),
	InvokeInterface(MethodRef),
	InvokeDynamic(InvokeDynamic),
	New(String),
	ANewArray(String),
	CheckCast(String),
	InstanceOf(String),
	MultiANewArray(String, u8),
	Ldc(Loadable),
	Jump(Offset),
	/// Anything not specially modelled (arithmetic, local loads/stores, returns, ...). The raw
	/// opcode and operand bytes are kept so the class can still be written back unchanged.
	Other(u8, Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable {
	Integer(i32),
	Float(f32),
	Long(i64),
	Double(f64),
	String(String),
	Class(String),
	MethodHandle(Handle),
	MethodType(String),
}

/// A `MethodHandle` constant pool entry (JVMS 4.4.8). The reference kind tags (`H_INVOKESPECIAL`
/// etc.) are collapsed into these variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
	GetField(FieldRef),
	GetStatic(FieldRef),
	PutField(FieldRef),
	PutStatic(FieldRef),
	InvokeVirtual(MethodRef),
	InvokeStatic(MethodRef),
	InvokeSpecial(MethodRef),
	NewInvokeSpecial(MethodRef),
	InvokeInterface(MethodRef),
}

impl Handle {
	/// Returns the method/field reference kind tag used on the wire (JVMS Table 4.4.8-A).
	pub fn reference_kind(&self) -> u8 {
		match self {
			Handle::GetField(_) => 1,
			Handle::GetStatic(_) => 2,
			Handle::PutField(_) => 3,
			Handle::PutStatic(_) => 4,
			Handle::InvokeVirtual(_) => 5,
			Handle::InvokeStatic(_) => 6,
			Handle::InvokeSpecial(_) => 7,
			Handle::NewInvokeSpecial(_) => 8,
			Handle::InvokeInterface(_) => 9,
		}
	}

	/// Promotes an `H_INVOKESPECIAL` handle to `H_INVOKEVIRTUAL`, leaving every other handle
	/// kind untouched. Widening a private virtual method to be callable from outside its nest
	/// also has to promote every method handle that invokes it specially, or the handle would
	/// keep binding to the now-stale private dispatch rule.
	#[must_use]
	pub fn promote_invokespecial(self) -> Handle {
		match self {
			Handle::InvokeSpecial(method_ref) => Handle::InvokeVirtual(method_ref),
			other => other,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeDynamic {
	/// The member name carried on the `invokedynamic` instruction. For lambda metafactory
	/// bootstraps this name doesn't correspond to any real member: remapping it is meaningless,
	/// and a remapper should instead resolve and rename the synthetic lambda body method.
	pub name: String,
	pub descriptor: String,
	pub bootstrap_handle: Handle,
	pub bootstrap_arguments: Vec<Loadable>,
}

impl InvokeDynamic {
	/// Whether the bootstrap method is `LambdaMetafactory.metafactory`/`altMetafactory`.
	pub fn is_lambda_metafactory(&self) -> bool {
		matches!(
			&self.bootstrap_handle,
			Handle::InvokeStatic(method_ref)
				if method_ref.owner == "java/lang/invoke/LambdaMetafactory"
					&& (method_ref.name == "metafactory" || method_ref.name == "altMetafactory")
		)
	}

	/// The erased method descriptor of the lambda body: the first bootstrap argument, which is
	/// always a `MethodType` constant for `LambdaMetafactory` bootstraps.
	pub fn lambda_body_descriptor(&self) -> Option<&str> {
		match self.bootstrap_arguments.first() {
			Some(Loadable::MethodType(desc)) => Some(desc),
			_ => None,
		}
	}
}

pub mod opcode {
	pub const GETSTATIC: u8 = 0xB2;
	pub const PUTSTATIC: u8 = 0xB3;
	pub const GETFIELD: u8 = 0xB4;
	pub const PUTFIELD: u8 = 0xB5;
	pub const INVOKEVIRTUAL: u8 = 0xB6;
	pub const INVOKESPECIAL: u8 = 0xB7;
	pub const INVOKESTATIC: u8 = 0xB8;
	pub const INVOKEINTERFACE: u8 = 0xB9;
	pub const INVOKEDYNAMIC: u8 = 0xBA;
	pub const NEW: u8 = 0xBB;
	pub const ANEWARRAY: u8 = 0xBD;
	pub const CHECKCAST: u8 = 0xC0;
	pub const INSTANCEOF: u8 = 0xC1;
	pub const MULTIANEWARRAY: u8 = 0xC5;
	pub const LDC: u8 = 0x12;
	pub const LDC_W: u8 = 0x13;
	pub const LDC2_W: u8 = 0x14;
	pub const GOTO: u8 = 0xA7;
	pub const GOTO_W: u8 = 0xC8;
}
