use access_widener::format;
use access_widener::model::{ACCESSIBLE, EXTENDABLE, MUTABLE};
use pretty_assertions::assert_eq;

const INPUT: &str = "accessWidener\tv2\tofficial\n\
accessible\tclass\ta\n\
accessible\tmethod\ta\tc\t()Le;\n\
extendable\tmethod\ta\tc\t()Le;\n\
extendable\tmethod\ta\td\t()Le;\n\
mutable\tfield\ta\tb\tLd;\n";

#[test]
fn parses_records_and_propagates_onto_the_owning_class() {
	let widener = format::parse(INPUT).unwrap();

	assert_eq!(widener.version, 2);
	assert_eq!(widener.namespace, "official");
	assert_eq!(*widener.classes.get("a").unwrap(), access_widener::model::AccessMask(ACCESSIBLE));

	let c_method = widener.methods.get(&access_widener::model::AccessedMember::new("a", "c", "()Le;")).unwrap();
	assert!(c_method.contains(ACCESSIBLE));
	assert!(c_method.contains(EXTENDABLE));

	let d_method = widener.methods.get(&access_widener::model::AccessedMember::new("a", "d", "()Le;")).unwrap();
	assert!(!d_method.contains(ACCESSIBLE));
	assert!(d_method.contains(EXTENDABLE));

	let b_field = widener.fields.get(&access_widener::model::AccessedMember::new("a", "b", "Ld;")).unwrap();
	assert!(b_field.contains(MUTABLE));

	let tree = widener.to_tree();
	let class = tree.classes.get("a").unwrap();
	assert!(class.mask.contains(ACCESSIBLE));
	assert!(!class.mask.contains(EXTENDABLE));
	assert!(class.propagated.contains(ACCESSIBLE));
	assert!(class.propagated.contains(EXTENDABLE));
	assert!(!class.propagated.is_mutable());
	assert!(class.total.contains(ACCESSIBLE));
	assert!(class.total.contains(EXTENDABLE));
}
