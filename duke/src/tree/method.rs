pub mod code;

use crate::access::AccessFlags;
use crate::tree::annotation::Annotation;
use crate::tree::make_name_like;
use crate::tree::method::code::Code;

make_name_like!(
	/// The (unqualified) name of a method, e.g. `<init>` or `doStuff`.
	MethodName
);
make_name_like!(
	/// The name of a method parameter, read from a `MethodParameters` attribute or debug info.
	ParameterName
);

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
	pub access: AccessFlags,
	pub name: MethodName,
	/// The method descriptor, e.g. `(Ljava/lang/String;)V`.
	pub descriptor: String,
	pub signature: Option<String>,
	pub exceptions: Vec<String>,
	pub parameter_names: Vec<Option<ParameterName>>,
	pub code: Option<Code>,
	pub annotations: Vec<Annotation>,
}

/// A reference to a method as seen from an `invoke*` instruction, or from a `MethodRef`/
/// `InterfaceMethodRef` constant pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
	pub owner: String,
	pub name: String,
	pub descriptor: String,
	pub is_interface: bool,
}
