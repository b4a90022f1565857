use crate::access::AccessFlags;
use crate::tree::annotation::Annotation;
use crate::tree::make_name_like;

make_name_like!(
	/// The (unqualified) name of a field.
	FieldName
);

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	pub access: AccessFlags,
	pub name: FieldName,
	/// The field descriptor, e.g. `Ljava/lang/String;`.
	pub descriptor: String,
	pub signature: Option<String>,
	pub constant_value: Option<crate::tree::annotation::ConstValue>,
	pub annotations: Vec<Annotation>,
}

/// A reference to a field as seen from a `getfield`/`putfield`/`getstatic`/`putstatic`
/// instruction, or from a `FieldRef` constant pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
	pub owner: String,
	pub name: String,
	pub descriptor: String,
}
