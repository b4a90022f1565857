use pretty_assertions::assert_eq;
use quill::format::tiny_v2;

const INPUT: &str = "tiny\t2\t0\tofficial\tnamed\n\
c\ta\tMain\n\
\tc\tTest comment\n\
\tf\tLd;\tb\tstate\n\
\t\tc\tElectric boogaloo\n\
\tm\t()Le;\tc\taction\n\
\t\tc\tCrazy\n\
\t\tc\tTwo comments!\n\
\tm\t()Le;\td\tanotherAction\n\
c\td\tSomeState\n\
c\te\tSomeOtherState\n";

#[test]
fn parses_classes_fields_methods_and_comments() {
	let mappings = tiny_v2::parse(INPUT).unwrap();

	assert_eq!(mappings.namespaces.as_slice(), ["official", "named"]);
	assert_eq!(mappings.classes.len(), 3);

	let main = mappings.classes.get("a").unwrap();
	assert_eq!(main.info.names.as_slice(), &[Some("a".to_owned()), Some("Main".to_owned())]);
	assert_eq!(main.comments, vec!["Test comment".to_owned()]);

	assert_eq!(main.fields.len(), 1);
	let state = main.fields.values().next().unwrap();
	assert_eq!(state.info.desc.as_deref(), Some("Ld;"));
	assert_eq!(state.info.names.as_slice(), &[Some("b".to_owned()), Some("state".to_owned())]);
	assert_eq!(state.comments, vec!["Electric boogaloo".to_owned()]);

	assert_eq!(main.methods.len(), 2);
	let mut methods: Vec<_> = main.methods.values().collect();
	methods.sort_by(|a, b| a.info.names.first_name().ok().cmp(&b.info.names.first_name().ok()));

	let action = &methods[0];
	assert_eq!(action.info.desc, "()Le;");
	assert_eq!(action.info.names.as_slice(), &[Some("c".to_owned()), Some("action".to_owned())]);
	assert_eq!(action.comments, vec!["Crazy".to_owned(), "Two comments!".to_owned()]);

	let another_action = &methods[1];
	assert_eq!(another_action.info.desc, "()Le;");
	assert_eq!(another_action.info.names.as_slice(), &[Some("d".to_owned()), Some("anotherAction".to_owned())]);
	assert!(another_action.comments.is_empty());

	assert!(mappings.classes.contains_key("d"));
	assert!(mappings.classes.contains_key("e"));
}
