//! Applying an [`AccessWidenerTree`] to a class file: widening access flags and promoting
//! `invokespecial` call sites that would otherwise keep binding to a now-stale private dispatch
//! rule. Both the in-place node application ([`apply_in_place`]) and the streaming
//! [`ApplyAccessWidener`] visitor share the same flag-mutation functions below, so the two must
//! produce identical output for the same input.

use anyhow::Result;
use duke::access::{AccessFlags, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC};
use duke::tree::class::ClassFile;
use duke::tree::field::Field;
use duke::tree::method::code::{Handle, Instruction, InstructionKind, Loadable};
use duke::tree::method::Method;
use duke::visitor::{accept, ClassVisitor};
use crate::model::AccessMask;
use crate::tree::{AccessWidenerTree, AccessedClass, MemberIdentifier};

fn class_flags(original: AccessFlags, mask: AccessMask) -> AccessFlags {
	let mut flags = original;
	if mask.is_accessible() {
		flags = flags.with_visibility(ACC_PUBLIC);
	}
	if mask.is_extendable() {
		flags = flags.with_visibility(ACC_PUBLIC).without(ACC_FINAL);
	}
	flags
}

fn field_flags(original: AccessFlags, mask: AccessMask, owner_is_interface: bool) -> AccessFlags {
	let mut flags = original;
	if mask.is_accessible() {
		flags = flags.with_visibility(ACC_PUBLIC);
	}
	if mask.is_mutable() {
		let is_interface_constant = owner_is_interface && original.contains(ACC_STATIC);
		if !is_interface_constant {
			flags = flags.without(ACC_FINAL);
		}
	}
	flags
}

fn method_flags(original: AccessFlags, mask: AccessMask, name: &str, owner_is_interface: bool) -> AccessFlags {
	let mut flags = original;
	if mask.is_accessible() {
		let was_private = original.contains(ACC_PRIVATE);
		flags = flags.with_visibility(ACC_PUBLIC);
		if was_private && (name == "<init>" || owner_is_interface || original.contains(ACC_STATIC)) {
			flags = flags.with(ACC_FINAL);
		}
	}
	if mask.is_extendable() {
		if !flags.is_at_least_protected() {
			flags = flags.with_visibility(ACC_PROTECTED);
		}
		flags = flags.without(ACC_FINAL);
	}
	flags
}

/// Whether `owner`/`name`/`desc` has been widened (any bit) on `owner`'s own entry in `tree`, and
/// isn't `<init>` — the condition under which a same-class `invokespecial` call site must be
/// promoted to `invokevirtual`.
fn is_promoted_target(tree: &AccessWidenerTree, owner: &str, name: &str, desc: &str) -> bool {
	if name == "<init>" {
		return false;
	}
	tree.classes.get(owner).is_some_and(|class| class.methods.contains_key(&MemberIdentifier::new(name, desc)))
}

fn promote_instruction(tree: &AccessWidenerTree, current_class: &str, instruction: &mut Instruction) {
	match &mut instruction.kind {
		InstructionKind::InvokeSpecial(method_ref) if method_ref.owner == current_class && is_promoted_target(tree, &method_ref.owner, &method_ref.name, &method_ref.descriptor) => {
			let method_ref = method_ref.clone();
			instruction.kind = InstructionKind::InvokeVirtual(method_ref);
		}
		InstructionKind::InvokeDynamic(id) => {
			id.bootstrap_handle = promote_handle(tree, current_class, id.bootstrap_handle.clone());
			for argument in &mut id.bootstrap_arguments {
				if let Loadable::MethodHandle(handle) = argument {
					*argument = Loadable::MethodHandle(promote_handle(tree, current_class, handle.clone()));
				}
			}
		}
		_ => {}
	}
}

fn promote_handle(tree: &AccessWidenerTree, current_class: &str, handle: Handle) -> Handle {
	match &handle {
		Handle::InvokeSpecial(method_ref) if method_ref.owner == current_class && is_promoted_target(tree, &method_ref.owner, &method_ref.name, &method_ref.descriptor) => handle.promote_invokespecial(),
		_ => handle,
	}
}

/// Mutates `class` according to `tree`, in place: class/inner-class flags, then every field and
/// method flag, then every call site in every method body, then the sealed-class list.
pub fn apply_in_place(tree: &AccessWidenerTree, class: &mut ClassFile) -> Result<()> {
	let name = class.name.as_str().to_owned();
	let is_interface = class.is_interface();
	let empty = AccessedClass::default();
	let widened = tree.classes.get(&name).unwrap_or(&empty);

	class.access = class_flags(class.access, widened.total);
	for inner in &mut class.inner_classes {
		if inner.inner_class.as_str() == name {
			inner.access = class_flags(inner.access, widened.total);
		}
	}

	for field in &mut class.fields {
		if let Some(mask) = widened.fields.get(&MemberIdentifier::new(field.name.as_str(), field.descriptor.clone())) {
			field.access = field_flags(field.access, *mask, is_interface);
		}
	}

	for method in &mut class.methods {
		if let Some(mask) = widened.methods.get(&MemberIdentifier::new(method.name.as_str(), method.descriptor.clone())) {
			method.access = method_flags(method.access, *mask, method.name.as_str(), is_interface);
		}
		if let Some(code) = &mut method.code {
			for instruction in &mut code.instructions {
				promote_instruction(tree, &name, instruction);
			}
		}
	}

	if widened.mask.is_extendable() {
		class.permitted_subclasses.clear();
	}

	Ok(())
}

/// The streaming counterpart of [`apply_in_place`], for callers driving [`accept`] themselves
/// (e.g. as one more stage in a jar pipeline's class-visitor chain).
pub struct ApplyAccessWidener<'t> {
	tree: &'t AccessWidenerTree,
	current_is_interface: bool,
}

impl<'t> ApplyAccessWidener<'t> {
	pub fn new(tree: &'t AccessWidenerTree) -> ApplyAccessWidener<'t> {
		ApplyAccessWidener { tree, current_is_interface: false }
	}

	fn widened_class(&self, name: &str) -> AccessedClass {
		self.tree.classes.get(name).cloned().unwrap_or_default()
	}
}

impl ClassVisitor for ApplyAccessWidener<'_> {
	fn visit_class(&mut self, class: &mut ClassFile) -> Result<()> {
		self.current_is_interface = class.is_interface();
		let name = class.name.as_str().to_owned();
		let widened = self.widened_class(&name);

		class.access = class_flags(class.access, widened.total);
		for inner in &mut class.inner_classes {
			if inner.inner_class.as_str() == name {
				inner.access = class_flags(inner.access, widened.total);
			}
		}
		if widened.mask.is_extendable() {
			class.permitted_subclasses.clear();
		}
		Ok(())
	}

	fn visit_field(&mut self, owner: &str, field: &mut Field) -> Result<()> {
		let widened = self.widened_class(owner);
		if let Some(mask) = widened.fields.get(&MemberIdentifier::new(field.name.as_str(), field.descriptor.clone())) {
			field.access = field_flags(field.access, *mask, self.current_is_interface);
		}
		Ok(())
	}

	fn visit_method(&mut self, owner: &str, method: &mut Method) -> Result<()> {
		let widened = self.widened_class(owner);
		if let Some(mask) = widened.methods.get(&MemberIdentifier::new(method.name.as_str(), method.descriptor.clone())) {
			method.access = method_flags(method.access, *mask, method.name.as_str(), self.current_is_interface);
		}
		Ok(())
	}

	fn visit_instruction(&mut self, owner: &str, _method_name: &str, instruction: &mut Instruction) -> Result<()> {
		promote_instruction(self.tree, owner, instruction);
		Ok(())
	}
}

/// Convenience wrapper driving [`accept`] with [`ApplyAccessWidener`], for callers that don't need
/// to compose it into a larger visitor chain.
pub fn apply_via_visitor(tree: &AccessWidenerTree, class: &mut ClassFile) -> Result<()> {
	accept(class, &mut ApplyAccessWidener::new(tree))
}

#[cfg(test)]
mod test {
	use super::*;
	use duke::tree::method::code::{Code, Offset};
	use duke::tree::method::MethodRef;
	use duke::tree::version::Version;
	use crate::model::{AccessedMember, ACCESSIBLE, EXTENDABLE, MUTABLE};
	use pretty_assertions::assert_eq;

	fn sample_class() -> ClassFile {
		let mut class = ClassFile::new(
			Version::JAVA_17,
			AccessFlags::new(0),
			"com/example/Foo".into(),
			Some("java/lang/Object".into()),
			Vec::new(),
		);

		class.fields.push(Field {
			access: AccessFlags::new(ACC_PRIVATE | ACC_FINAL),
			name: "baz".into(),
			descriptor: "I".to_owned(),
			signature: None,
			constant_value: None,
			annotations: Vec::new(),
		});

		class.methods.push(Method {
			access: AccessFlags::new(ACC_PRIVATE),
			name: "bar".into(),
			descriptor: "()V".to_owned(),
			signature: None,
			exceptions: Vec::new(),
			parameter_names: Vec::new(),
			code: Some(Code {
				max_stack: 1,
				max_locals: 1,
				instructions: vec![Instruction {
					offset: Offset(0),
					kind: InstructionKind::InvokeSpecial(MethodRef {
						owner: "com/example/Foo".to_owned(),
						name: "bar".to_owned(),
						descriptor: "()V".to_owned(),
						is_interface: false,
					}),
				}],
				exception_table: Vec::new(),
				local_variables: Vec::new(),
			}),
			annotations: Vec::new(),
		});

		class
	}

	fn sample_tree() -> AccessWidenerTree {
		let mut widener = crate::model::AccessWidener::new(2, "official");
		widener.add_class("com/example/Foo", EXTENDABLE);
		widener.add_method(AccessedMember::new("com/example/Foo", "bar", "()V"), ACCESSIBLE);
		widener.add_field(AccessedMember::new("com/example/Foo", "baz", "I"), MUTABLE);
		widener.to_tree()
	}

	#[test]
	fn class_extendable_clears_final_and_sets_public() {
		let original = AccessFlags::new(ACC_PUBLIC | ACC_FINAL);
		let flags = class_flags(original, AccessMask(EXTENDABLE));
		assert!(flags.contains(ACC_PUBLIC));
		assert!(!flags.contains(ACC_FINAL));
	}

	#[test]
	fn field_mutable_clears_final_unless_interface_constant() {
		let original = AccessFlags::new(ACC_FINAL);
		let widened = field_flags(original, AccessMask(MUTABLE), false);
		assert!(!widened.contains(ACC_FINAL));

		let interface_constant = AccessFlags::new(ACC_FINAL | ACC_STATIC);
		let unchanged = field_flags(interface_constant, AccessMask(MUTABLE), true);
		assert!(unchanged.contains(ACC_FINAL));
	}

	#[test]
	fn method_accessible_private_init_becomes_public_final() {
		let original = AccessFlags::new(ACC_PRIVATE);
		let widened = method_flags(original, AccessMask(ACCESSIBLE), "<init>", false);
		assert!(widened.contains(ACC_PUBLIC));
		assert!(widened.contains(ACC_FINAL));
	}

	#[test]
	fn method_extendable_promotes_to_protected_and_clears_final() {
		let original = AccessFlags::new(ACC_PRIVATE | ACC_FINAL);
		let widened = method_flags(original, AccessMask(EXTENDABLE), "doStuff", false);
		assert!(widened.is_at_least_protected());
		assert!(!widened.contains(ACC_FINAL));
	}

	#[test]
	fn apply_in_place_widens_members_and_promotes_call_site() {
		let tree = sample_tree();
		let mut class = sample_class();
		apply_in_place(&tree, &mut class).unwrap();

		assert!(class.access.contains(ACC_PUBLIC));
		assert!(!class.fields[0].access.contains(ACC_FINAL));
		assert!(class.methods[0].access.contains(ACC_PUBLIC));

		let code = class.methods[0].code.as_ref().unwrap();
		assert!(matches!(code.instructions[0].kind, InstructionKind::InvokeVirtual(_)));
	}

	#[test]
	fn apply_in_place_and_visitor_agree() {
		let tree = sample_tree();

		let mut via_in_place = sample_class();
		apply_in_place(&tree, &mut via_in_place).unwrap();

		let mut via_visitor = sample_class();
		apply_via_visitor(&tree, &mut via_visitor).unwrap();

		assert_eq!(via_in_place, via_visitor);
	}

	#[test]
	fn sealed_class_permitted_subclasses_cleared_when_extendable() {
		let tree = sample_tree();
		let mut class = sample_class();
		class.permitted_subclasses.push("com/example/Bar".into());

		apply_in_place(&tree, &mut class).unwrap();
		assert!(class.permitted_subclasses.is_empty());
	}

	#[test]
	fn invokedynamic_bootstrap_handle_is_promoted() {
		let tree = sample_tree();
		let method_ref = MethodRef { owner: "com/example/Foo".to_owned(), name: "bar".to_owned(), descriptor: "()V".to_owned(), is_interface: false };
		let mut instruction = Instruction {
			offset: Offset(0),
			kind: InstructionKind::InvokeDynamic(duke::tree::method::code::InvokeDynamic {
				name: "run".to_owned(),
				descriptor: "()Ljava/lang/Runnable;".to_owned(),
				bootstrap_handle: Handle::InvokeSpecial(method_ref),
				bootstrap_arguments: Vec::new(),
			}),
		};

		promote_instruction(&tree, "com/example/Foo", &mut instruction);

		match instruction.kind {
			InstructionKind::InvokeDynamic(id) => assert!(matches!(id.bootstrap_handle, Handle::InvokeVirtual(_))),
			other => panic!("expected invokedynamic, got {other:?}"),
		}
	}

	#[test]
	fn unrelated_invokespecial_is_left_alone() {
		let tree = sample_tree();
		let mut instruction = Instruction {
			offset: Offset(0),
			kind: InstructionKind::InvokeSpecial(MethodRef {
				owner: "java/lang/Object".to_owned(),
				name: "<init>".to_owned(),
				descriptor: "()V".to_owned(),
				is_interface: false,
			}),
		};
		promote_instruction(&tree, "com/example/Foo", &mut instruction);
		assert!(matches!(instruction.kind, InstructionKind::InvokeSpecial(_)));
	}
}
