use pretty_assertions::assert_eq;
use quill::format::{proguard, tiny_v2};

const PROGUARD: &str = "Main -> a:\n\
    d state -> b\n\
    e action() -> c\n\
    e anotherAction() -> d\n\
SomeState -> d:\n\
SomeOtherState -> e:\n";

const TINY: &str = "tiny\t2\t0\tofficial\tnamed\n\
c\ta\tMain\n\
\tf\tLd;\tb\tstate\n\
\tm\t()Le;\tc\taction\n\
\tm\t()Le;\td\tanotherAction\n\
c\td\tSomeState\n\
c\te\tSomeOtherState\n";

#[test]
fn proguard_and_tiny_v2_agree_once_reordered_onto_the_same_namespace_order() {
	let from_proguard = proguard::parse(PROGUARD).unwrap().reorder_namespaces(&["official", "named"]).unwrap();
	let from_tiny = tiny_v2::parse(TINY).unwrap();

	assert_eq!(from_proguard.namespaces, from_tiny.namespaces);
	assert_eq!(from_proguard.classes.len(), from_tiny.classes.len());

	for (key, tiny_class) in &from_tiny.classes {
		let proguard_class = from_proguard.classes.get(key).unwrap_or_else(|| panic!("missing class {key}"));
		assert_eq!(proguard_class.info.names, tiny_class.info.names);

		for (field_key, tiny_field) in &tiny_class.fields {
			let proguard_field = proguard_class.fields.get(field_key).unwrap_or_else(|| panic!("missing field {field_key:?}"));
			assert_eq!(proguard_field.info.names, tiny_field.info.names);
		}

		for (method_key, tiny_method) in &tiny_class.methods {
			let proguard_method = proguard_class.methods.get(method_key).unwrap_or_else(|| panic!("missing method {method_key:?}"));
			assert_eq!(proguard_method.info.names, tiny_method.info.names);
		}
	}
}
