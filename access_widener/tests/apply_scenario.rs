use access_widener::apply::apply_in_place;
use access_widener::format;
use duke::access::{AccessFlags, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC};
use duke::tree::class::ClassFile;
use duke::tree::field::Field;
use duke::tree::method::Method;
use duke::tree::version::Version;
use pretty_assertions::assert_eq;

const INPUT: &str = "accessWidener\tv2\tofficial\n\
accessible\tclass\ta\n\
accessible\tmethod\ta\tc\t()Le;\n\
extendable\tmethod\ta\td\t()Le;\n\
mutable\tfield\ta\tb\tLd;\n";

#[test]
fn widens_class_methods_and_field_as_the_format_describes() {
	let tree = format::parse(INPUT).unwrap().to_tree();

	let mut class = ClassFile::new(Version::JAVA_17, AccessFlags::new(ACC_PRIVATE | ACC_FINAL), "a".into(), Some("java/lang/Object".into()), Vec::new());

	class.methods.push(Method {
		access: AccessFlags::new(ACC_PRIVATE | ACC_FINAL),
		name: "c".into(),
		descriptor: "()Le;".to_owned(),
		signature: None,
		exceptions: Vec::new(),
		parameter_names: Vec::new(),
		code: None,
		annotations: Vec::new(),
	});
	class.methods.push(Method {
		access: AccessFlags::new(ACC_PRIVATE | ACC_FINAL),
		name: "d".into(),
		descriptor: "()Le;".to_owned(),
		signature: None,
		exceptions: Vec::new(),
		parameter_names: Vec::new(),
		code: None,
		annotations: Vec::new(),
	});
	class.fields.push(Field {
		access: AccessFlags::new(ACC_PUBLIC | ACC_FINAL),
		name: "b".into(),
		descriptor: "Ld;".to_owned(),
		signature: None,
		constant_value: None,
		annotations: Vec::new(),
	});

	apply_in_place(&tree, &mut class).unwrap();

	assert!(class.access.contains(ACC_PUBLIC));

	let c = class.methods.iter().find(|m| m.name.as_str() == "c").unwrap();
	assert!(c.access.contains(ACC_PUBLIC));

	let d = class.methods.iter().find(|m| m.name.as_str() == "d").unwrap();
	assert!(d.access.contains(ACC_PROTECTED));
	assert!(!d.access.contains(ACC_PUBLIC));

	assert!(class.fields[0].access.contains(ACC_PUBLIC));
	assert!(!class.fields[0].access.contains(ACC_FINAL));
}
