//! Whole-class remapping: rewrites every type, descriptor, signature and name reference in a
//! [`ClassFile`], including the lambda-aware `invokedynamic` special case and, for
//! `module-info.class`, its module directives.

use anyhow::{Context, Result};
use duke::tree::annotation::{Annotation, ElementValue};
use duke::tree::class::ClassFile;
use duke::tree::descriptor::{map_method_desc, map_type};
use duke::tree::field::FieldRef;
use duke::tree::method::MethodRef;
use duke::tree::method::code::{Handle, Instruction, InstructionKind, InvokeDynamic, Loadable};
use duke::tree::module::{Module, ModuleProvides};
use crate::remapper::BRemapper;

fn map_signature_opt(remapper: &impl BRemapper, signature: &Option<String>) -> Result<Option<String>> {
	match signature {
		Some(s) => Ok(remapper.map_signature(s)?),
		None => Ok(None),
	}
}

fn map_element_value(remapper: &impl BRemapper, value: &ElementValue) -> Result<ElementValue> {
	Ok(match value {
		ElementValue::Enum { type_name, const_name } => {
			let owner = remapper.map_class(type_name)?;
			let (mapped_name, _) = remapper.map_field(type_name, const_name, &format!("L{type_name};"))?;
			ElementValue::Enum { type_name: owner, const_name: mapped_name }
		}
		ElementValue::Class(desc) => ElementValue::Class(map_type(desc, &|name| remapper.map_class(name).ok())?),
		ElementValue::Annotation(inner) => ElementValue::Annotation(map_annotation(remapper, inner)?),
		ElementValue::Array(values) => ElementValue::Array(values.iter().map(|v| map_element_value(remapper, v)).collect::<Result<Vec<_>>>()?),
		ElementValue::Const(c) => ElementValue::Const(c.clone()),
	})
}

fn map_annotation(remapper: &impl BRemapper, annotation: &Annotation) -> Result<Annotation> {
	Ok(Annotation {
		descriptor: map_type(&annotation.descriptor, &|name| remapper.map_class(name).ok())?,
		values: annotation
			.values
			.iter()
			.map(|(name, value)| Ok::<_, anyhow::Error>((name.clone(), map_element_value(remapper, value)?)))
			.collect::<Result<Vec<_>>>()?,
	})
}

fn map_annotations(remapper: &impl BRemapper, annotations: &mut Vec<Annotation>) -> Result<()> {
	*annotations = annotations.iter().map(|a| map_annotation(remapper, a)).collect::<Result<Vec<_>>>()?;
	Ok(())
}

fn map_field_ref(remapper: &impl BRemapper, f: &FieldRef) -> Result<FieldRef> {
	let owner = remapper.map_class(&f.owner)?;
	let (name, desc) = remapper.map_field(&f.owner, &f.name, &f.descriptor)?;
	Ok(FieldRef { owner, name, descriptor: desc })
}

fn map_method_ref(remapper: &impl BRemapper, m: &MethodRef) -> Result<MethodRef> {
	let owner = remapper.map_class(&m.owner)?;
	let (name, desc) = remapper.map_method(&m.owner, &m.name, &m.descriptor)?;
	Ok(MethodRef { owner, name, descriptor: desc, is_interface: m.is_interface })
}

fn map_handle(remapper: &impl BRemapper, handle: &Handle) -> Result<Handle> {
	Ok(match handle {
		Handle::GetField(f) => Handle::GetField(map_field_ref(remapper, f)?),
		Handle::GetStatic(f) => Handle::GetStatic(map_field_ref(remapper, f)?),
		Handle::PutField(f) => Handle::PutField(map_field_ref(remapper, f)?),
		Handle::PutStatic(f) => Handle::PutStatic(map_field_ref(remapper, f)?),
		Handle::InvokeVirtual(m) => Handle::InvokeVirtual(map_method_ref(remapper, m)?),
		Handle::InvokeStatic(m) => Handle::InvokeStatic(map_method_ref(remapper, m)?),
		Handle::InvokeSpecial(m) => Handle::InvokeSpecial(map_method_ref(remapper, m)?),
		Handle::NewInvokeSpecial(m) => Handle::NewInvokeSpecial(map_method_ref(remapper, m)?),
		Handle::InvokeInterface(m) => Handle::InvokeInterface(map_method_ref(remapper, m)?),
	})
}

fn map_loadable(remapper: &impl BRemapper, loadable: &Loadable) -> Result<Loadable> {
	Ok(match loadable {
		Loadable::Class(name) => Loadable::Class(remapper.map_class(name)?),
		Loadable::MethodHandle(h) => Loadable::MethodHandle(map_handle(remapper, h)?),
		Loadable::MethodType(desc) => Loadable::MethodType(remapper.map_desc(desc)?),
		other => other.clone(),
	})
}

/// Resolves the name on a lambda-metafactory `invokedynamic`: the member doesn't exist on any
/// real type, so it's looked up via the instruction's own return type (the functional interface)
/// and the erased lambda body descriptor, not the bootstrap method's owner.
fn map_invoke_dynamic_name(remapper: &impl BRemapper, id: &InvokeDynamic) -> Result<String> {
	let parsed = duke::tree::descriptor::parse_method_descriptor(&id.descriptor)?;
	let Some(duke::tree::descriptor::Type::Object(functional_interface)) = parsed.return_type else {
		return Ok(id.name.clone());
	};
	let Some(body_desc) = id.lambda_body_descriptor() else {
		return Ok(id.name.clone());
	};
	let (mapped, _) = remapper.map_method(&functional_interface, &id.name, body_desc)?;
	Ok(mapped)
}

fn map_instruction(remapper: &impl BRemapper, instruction: &mut Instruction) -> Result<()> {
	instruction.kind = match &instruction.kind {
		InstructionKind::GetStatic(f) => InstructionKind::GetStatic(map_field_ref(remapper, f)?),
		InstructionKind::PutStatic(f) => InstructionKind::PutStatic(map_field_ref(remapper, f)?),
		InstructionKind::GetField(f) => InstructionKind::GetField(map_field_ref(remapper, f)?),
		InstructionKind::PutField(f) => InstructionKind::PutField(map_field_ref(remapper, f)?),
		InstructionKind::InvokeVirtual(m) => InstructionKind::InvokeVirtual(map_method_ref(remapper, m)?),
		InstructionKind::InvokeSpecial(m) => InstructionKind::InvokeSpecial(map_method_ref(remapper, m)?),
		InstructionKind::InvokeStatic(m) => InstructionKind::InvokeStatic(map_method_ref(remapper, m)?),
		InstructionKind::InvokeInterface(m) => InstructionKind::InvokeInterface(map_method_ref(remapper, m)?),
		InstructionKind::InvokeDynamic(id) => {
			let bootstrap_handle = map_handle(remapper, &id.bootstrap_handle)?;
			let bootstrap_arguments = id.bootstrap_arguments.iter().map(|a| map_loadable(remapper, a)).collect::<Result<Vec<_>>>()?;
			let name = if id.is_lambda_metafactory() { map_invoke_dynamic_name(remapper, id)? } else { id.name.clone() };
			let descriptor = remapper.map_desc(&id.descriptor)?;
			InstructionKind::InvokeDynamic(InvokeDynamic { name, descriptor, bootstrap_handle, bootstrap_arguments })
		}
		InstructionKind::New(name) => InstructionKind::New(remapper.map_class(name)?),
		InstructionKind::ANewArray(name) => InstructionKind::ANewArray(remapper.map_class(name)?),
		InstructionKind::CheckCast(name) => InstructionKind::CheckCast(remapper.map_class(name)?),
		InstructionKind::InstanceOf(name) => InstructionKind::InstanceOf(remapper.map_class(name)?),
		InstructionKind::MultiANewArray(name, dims) => InstructionKind::MultiANewArray(remapper.map_class(name)?, *dims),
		InstructionKind::Ldc(loadable) => InstructionKind::Ldc(map_loadable(remapper, loadable)?),
		other @ (InstructionKind::Jump(_) | InstructionKind::Other(_, _)) => other.clone(),
	};
	Ok(())
}

/// Rewrites every class-level and member-level reference in `class` through `remapper`. Renames
/// the class itself last, so the original owner name is still available while remapping members.
pub fn remap_class(remapper: &impl BRemapper, class: &mut ClassFile) -> Result<()> {
	let owner = class.name.as_str().to_owned();

	class.super_class = class.super_class.as_ref().map(|s| remapper.map_class(s.as_str())).transpose()?.map(Into::into);
	class.interfaces = class.interfaces.iter().map(|i| remapper.map_class(i.as_str())).collect::<Result<Vec<_>>>()?.into_iter().map(Into::into).collect();
	class.signature = map_signature_opt(remapper, &class.signature)?;

	for field in &mut class.fields {
		let (name, desc) = remapper.map_field(&owner, field.name.as_str(), &field.descriptor)?;
		field.signature = map_signature_opt(remapper, &field.signature)?;
		field.descriptor = desc;
		field.name = name.into();
		map_annotations(remapper, &mut field.annotations)?;
	}

	for method in &mut class.methods {
		let (name, desc) = remapper.map_method(&owner, method.name.as_str(), &method.descriptor)?;
		method.exceptions = method.exceptions.iter().map(|e| remapper.map_class(e)).collect::<Result<Vec<_>>>()?;
		method.signature = map_signature_opt(remapper, &method.signature)?;

		if let Some(code) = &mut method.code {
			for instruction in &mut code.instructions {
				map_instruction(remapper, instruction).with_context(|| format!("remapping instruction in {owner}.{}{}", method.name, method.descriptor))?;
			}
			for handler in &mut code.exception_table {
				handler.catch_type = handler.catch_type.as_ref().map(|t| remapper.map_class(t)).transpose()?;
			}
			for local in &mut code.local_variables {
				local.descriptor = local.descriptor.as_ref().map(|d| remapper.map_desc(d)).transpose()?;
				local.signature = map_signature_opt(remapper, &local.signature)?;
			}
		}

		method.descriptor = desc;
		method.name = name.into();
		map_annotations(remapper, &mut method.annotations)?;
	}

	for inner in &mut class.inner_classes {
		inner.inner_class = remapper.map_class(inner.inner_class.as_str())?.into();
		inner.outer_class = inner.outer_class.as_ref().map(|o| remapper.map_class(o.as_str())).transpose()?.map(Into::into);
	}
	if let Some(enclosing) = &mut class.enclosing_method {
		let enclosing_owner = enclosing.class.as_str().to_owned();
		if let (Some(name), Some(desc)) = (&enclosing.method_name, &enclosing.method_descriptor) {
			let (mapped_name, mapped_desc) = remapper.map_method(&enclosing_owner, name, desc)?;
			enclosing.method_name = Some(mapped_name);
			enclosing.method_descriptor = Some(mapped_desc);
		}
		enclosing.class = remapper.map_class(&enclosing_owner)?.into();
	}
	class.nest_host = class.nest_host.as_ref().map(|h| remapper.map_class(h.as_str())).transpose()?.map(Into::into);
	class.nest_members = class.nest_members.iter().map(|m| remapper.map_class(m.as_str())).collect::<Result<Vec<_>>>()?.into_iter().map(Into::into).collect();
	class.permitted_subclasses = class.permitted_subclasses.iter().map(|p| remapper.map_class(p.as_str())).collect::<Result<Vec<_>>>()?.into_iter().map(Into::into).collect();

	for component in &mut class.record_components {
		let (name, desc) = remapper.map_field(&owner, &component.name, &component.descriptor)?;
		component.name = name;
		component.descriptor = desc;
		component.signature = map_signature_opt(remapper, &component.signature)?;
		map_annotations(remapper, &mut component.annotations)?;
	}

	if let Some(module) = &mut class.module {
		map_module(remapper, module)?;
	}

	map_annotations(remapper, &mut class.annotations)?;

	class.name = remapper.map_class(&owner)?.into();

	Ok(())
}

/// Rewrites the class names referenced by a `module-info.class`'s directives: `uses`/`provides`
/// targets and `provides ... with ...` implementations. `requires`/`exports`/`opens` reference
/// module and package names, which live in a different namespace and aren't touched here.
fn map_module(remapper: &impl BRemapper, module: &mut Module) -> Result<()> {
	module.uses = module.uses.iter().map(|c| remapper.map_class(c.as_str())).collect::<Result<Vec<_>>>()?.into_iter().map(Into::into).collect();
	for ModuleProvides { name, provides_with } in &mut module.provides {
		*name = remapper.map_class(name.as_str())?.into();
		*provides_with = provides_with.iter().map(|c| remapper.map_class(c.as_str())).collect::<Result<Vec<_>>>()?.into_iter().map(Into::into).collect();
	}
	Ok(())
}

pub fn remap_field_descriptor(remapper: &impl BRemapper, desc: &str) -> Result<String> {
	map_type(desc, &|name| remapper.map_class(name).ok())
}

pub fn remap_method_descriptor(remapper: &impl BRemapper, desc: &str) -> Result<String> {
	map_method_desc(desc, &|name| remapper.map_class(name).ok())
}
