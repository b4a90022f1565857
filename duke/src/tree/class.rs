use crate::access::AccessFlags;
use crate::tree::annotation::Annotation;
use crate::tree::field::Field;
use crate::tree::make_name_like;
use crate::tree::method::Method;
use crate::tree::module::Module;
use crate::tree::version::Version;

make_name_like!(
	/// The internal (slash-separated) binary name of a class, e.g. `java/lang/Object`.
	ClassName
);

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
	pub version: Version,
	pub access: AccessFlags,
	pub name: ClassName,
	pub super_class: Option<ClassName>,
	pub interfaces: Vec<ClassName>,

	pub fields: Vec<Field>,
	pub methods: Vec<Method>,

	pub signature: Option<String>,
	pub source_file: Option<String>,

	pub inner_classes: Vec<InnerClass>,
	pub enclosing_method: Option<EnclosingMethod>,

	pub nest_host: Option<ClassName>,
	pub nest_members: Vec<ClassName>,
	pub permitted_subclasses: Vec<ClassName>,

	pub record_components: Vec<RecordComponent>,

	/// Present only on `module-info.class`, describing the JPMS module it declares.
	pub module: Option<Module>,

	pub annotations: Vec<Annotation>,
}

impl ClassFile {
	pub fn new(version: Version, access: AccessFlags, name: ClassName, super_class: Option<ClassName>, interfaces: Vec<ClassName>) -> ClassFile {
		ClassFile {
			version,
			access,
			name,
			super_class,
			interfaces,
			fields: Vec::new(),
			methods: Vec::new(),
			signature: None,
			source_file: None,
			inner_classes: Vec::new(),
			enclosing_method: None,
			nest_host: None,
			nest_members: Vec::new(),
			permitted_subclasses: Vec::new(),
			record_components: Vec::new(),
			module: None,
			annotations: Vec::new(),
		}
	}

	pub fn is_interface(&self) -> bool {
		self.access.contains(crate::access::ACC_INTERFACE)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
	pub inner_class: ClassName,
	pub outer_class: Option<ClassName>,
	pub inner_name: Option<String>,
	pub access: AccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnclosingMethod {
	pub class: ClassName,
	pub method_name: Option<String>,
	pub method_descriptor: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
	pub name: String,
	pub descriptor: String,
	pub signature: Option<String>,
	pub annotations: Vec<Annotation>,
}
