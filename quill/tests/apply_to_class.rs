use duke::access::{AccessFlags, ACC_PRIVATE, ACC_PUBLIC};
use duke::tree::class::ClassFile;
use duke::tree::field::Field;
use duke::tree::method::Method;
use duke::tree::version::Version;
use pretty_assertions::assert_eq;
use quill::format::tiny_v2;
use quill::remapper::NoSuperClassProvider;

const INPUT: &str = "tiny\t2\t0\tofficial\tnamed\n\
c\ta\tMain\n\
\tf\tLd;\tb\tstate\n\
\tm\t()Le;\tc\taction\n\
\tm\t()Le;\td\tanotherAction\n\
c\td\tSomeState\n\
c\te\tSomeOtherState\n";

fn sample_class() -> ClassFile {
	let mut class = ClassFile::new(Version::JAVA_17, AccessFlags::new(ACC_PUBLIC), "a".into(), Some("java/lang/Object".into()), Vec::new());

	class.fields.push(Field {
		access: AccessFlags::new(ACC_PRIVATE),
		name: "b".into(),
		descriptor: "Ld;".to_owned(),
		signature: None,
		constant_value: None,
		annotations: Vec::new(),
	});

	for name in ["c", "d"] {
		class.methods.push(Method {
			access: AccessFlags::new(ACC_PUBLIC),
			name: name.into(),
			descriptor: "()Le;".to_owned(),
			signature: None,
			exceptions: Vec::new(),
			parameter_names: Vec::new(),
			code: None,
			annotations: Vec::new(),
		});
	}

	class
}

#[test]
fn remaps_class_field_and_method_names_and_descriptors() {
	let mappings = tiny_v2::parse(INPUT).unwrap();
	let from = mappings.namespace("official").unwrap();
	let to = mappings.namespace("named").unwrap();
	let remapper = mappings.remapper_b(from, to, &NoSuperClassProvider).unwrap();

	let mut class = sample_class();
	quill::class_remap::remap_class(&remapper, &mut class).unwrap();

	assert_eq!(class.name.as_str(), "Main");
	assert_eq!(class.fields[0].name.as_str(), "state");
	assert_eq!(class.fields[0].descriptor, "LSomeState;");

	let mut methods = class.methods.clone();
	methods.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));

	assert_eq!(methods[0].name.as_str(), "action");
	assert_eq!(methods[0].descriptor, "()LSomeOtherState;");
	assert_eq!(methods[1].name.as_str(), "anotherAction");
	assert_eq!(methods[1].descriptor, "()LSomeOtherState;");
}

#[test]
fn remaps_generic_signatures_and_module_provides() {
	use duke::tree::method::code::{Code, LocalVariable, Offset};
	use duke::tree::module::{Module, ModuleFlags, ModuleProvides};

	let mappings = tiny_v2::parse(INPUT).unwrap();
	let from = mappings.namespace("official").unwrap();
	let to = mappings.namespace("named").unwrap();
	let remapper = mappings.remapper_b(from, to, &NoSuperClassProvider).unwrap();

	let mut class = sample_class();
	class.fields[0].signature = Some("Ld;".to_owned());
	class.methods[0].signature = Some("()Le;".to_owned());
	class.methods[0].code = Some(Code {
		max_stack: 0,
		max_locals: 1,
		instructions: Vec::new(),
		exception_table: Vec::new(),
		local_variables: vec![LocalVariable { start: Offset(0), index: 0, lvt_index: -1, name: "this".to_owned(), descriptor: Some("Ld;".to_owned()), signature: Some("Ld;".to_owned()) }],
	});
	class.module = Some(Module {
		name: "m".into(),
		flags: ModuleFlags { is_open: false, is_synthetic: false, is_mandated: false },
		version: None,
		requires: Vec::new(),
		exports: Vec::new(),
		opens: Vec::new(),
		uses: vec!["d".into()],
		provides: vec![ModuleProvides { name: "d".into(), provides_with: vec!["d".into()] }],
	});

	quill::class_remap::remap_class(&remapper, &mut class).unwrap();

	assert_eq!(class.fields[0].signature.as_deref(), Some("LSomeState;"));
	assert_eq!(class.methods[0].signature.as_deref(), Some("()LSomeOtherState;"));
	let local = &class.methods[0].code.as_ref().unwrap().local_variables[0];
	assert_eq!(local.signature.as_deref(), Some("LSomeState;"));

	let module = class.module.as_ref().unwrap();
	assert_eq!(module.uses[0].as_str(), "SomeState");
	assert_eq!(module.provides[0].name.as_str(), "SomeState");
	assert_eq!(module.provides[0].provides_with[0].as_str(), "SomeState");
}
