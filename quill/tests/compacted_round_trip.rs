use pretty_assertions::assert_eq;
use quill::format::{compacted, tiny_v2};

const TINY: &str = "tiny\t2\t0\tofficial\tnamed\n\
c\ta\tMain\n\
\tf\tLd;\tb\tstate\n\
\tm\t()Le;\tc\taction\n\
\tm\t()Le;\td\tanotherAction\n\
c\td\tSomeState\n\
c\te\tSomeOtherState\n";

#[test]
fn round_trips_through_the_binary_format() {
	let original = tiny_v2::parse(TINY).unwrap();

	let bytes = compacted::write(&original).unwrap();
	let round_tripped = compacted::parse(&bytes).unwrap();

	assert_eq!(round_tripped.namespaces, original.namespaces);
	assert_eq!(round_tripped.classes.len(), original.classes.len());

	for (key, class) in &original.classes {
		let round_tripped_class = round_tripped.classes.get(key).unwrap_or_else(|| panic!("missing class {key}"));
		assert_eq!(round_tripped_class.info.names, class.info.names);
		assert_eq!(round_tripped_class.fields.len(), class.fields.len());
		assert_eq!(round_tripped_class.methods.len(), class.methods.len());

		for (field_key, field) in &class.fields {
			let round_tripped_field = round_tripped_class.fields.get(field_key).unwrap_or_else(|| panic!("missing field {field_key:?}"));
			assert_eq!(round_tripped_field.info.names, field.info.names);
			assert_eq!(round_tripped_field.info.desc, field.info.desc);
		}

		for (method_key, method) in &class.methods {
			let round_tripped_method = round_tripped_class.methods.get(method_key).unwrap_or_else(|| panic!("missing method {method_key:?}"));
			assert_eq!(round_tripped_method.info.names, method.info.names);
		}
	}
}
