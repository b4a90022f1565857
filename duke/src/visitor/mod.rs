//! A minimal streaming visitor API over [`ClassFile`](crate::tree::class::ClassFile).
//!
//! Real ASM-like libraries use continuation-passing "visit"/"visitEnd" pairs so a writer can
//! stream bytes without holding a full tree. Since this crate already materializes the whole
//! class as a tree, the visitor here is simpler: [`accept`] walks an in-memory `ClassFile` and
//! calls back into a [`ClassVisitor`], which may mutate access flags and instructions in place.
//! This still gives callers (the jar pipeline's class-visitor adapters, access_widener's
//! streaming application) an ordered, composable hook without needing a second representation.

use anyhow::Result;
use crate::tree::class::ClassFile;
use crate::tree::field::Field;
use crate::tree::method::Method;
use crate::tree::method::code::Instruction;

pub trait ClassVisitor {
	fn visit_class(&mut self, _class: &mut ClassFile) -> Result<()> {
		Ok(())
	}

	fn visit_field(&mut self, _owner: &str, _field: &mut Field) -> Result<()> {
		Ok(())
	}

	fn visit_method(&mut self, _owner: &str, _method: &mut Method) -> Result<()> {
		Ok(())
	}

	fn visit_instruction(&mut self, _owner: &str, _method_name: &str, _instruction: &mut Instruction) -> Result<()> {
		Ok(())
	}
}

/// Drives `visitor` over every part of `class` that [`ClassVisitor`] exposes, in declaration
/// order: the class itself, then each field, then each method and its instructions.
pub fn accept(class: &mut ClassFile, visitor: &mut impl ClassVisitor) -> Result<()> {
	visitor.visit_class(class)?;

	let owner = class.name.as_str().to_owned();

	for field in &mut class.fields {
		visitor.visit_field(&owner, field)?;
	}

	for method in &mut class.methods {
		let method_name = method.name.as_str().to_owned();
		visitor.visit_method(&owner, method)?;

		if let Some(code) = &mut method.code {
			for instruction in &mut code.instructions {
				visitor.visit_instruction(&owner, &method_name, instruction)?;
			}
		}
	}

	Ok(())
}

/// A class-level transform composed into an ordered chain by the jar remap pipeline.
/// Unlike [`ClassVisitor`], adapters own and return the whole class, which is the shape the jar
/// pipeline needs: each adapter may replace the owner name for the next adapter in the chain.
pub trait ClassVisitorAdapter: Send + Sync {
	fn visit(&self, class: ClassFile) -> Result<ClassFile>;
}

impl<F> ClassVisitorAdapter for F
where
	F: Fn(ClassFile) -> Result<ClassFile> + Send + Sync,
{
	fn visit(&self, class: ClassFile) -> Result<ClassFile> {
		self(class)
	}
}

/// A resource-level transform in the jar pipeline's resource visitor chain. Returning
/// `None` drops the resource from the output archive.
pub trait ResourceVisitor: Send + Sync {
	fn visit(&self, name: &str, data: Vec<u8>) -> Result<Option<Vec<u8>>>;
}

impl<F> ResourceVisitor for F
where
	F: Fn(&str, Vec<u8>) -> Result<Option<Vec<u8>>> + Send + Sync,
{
	fn visit(&self, name: &str, data: Vec<u8>) -> Result<Option<Vec<u8>>> {
		self(name, data)
	}
}

/// The default resource visitor: drops JAR-signature files, which become invalid once classes
/// inside the archive are rewritten.
pub struct DropSignatureFiles;

impl ResourceVisitor for DropSignatureFiles {
	fn visit(&self, name: &str, data: Vec<u8>) -> Result<Option<Vec<u8>>> {
		let upper = name.to_ascii_uppercase();
		if upper.starts_with("META-INF/") && (upper.ends_with(".RSA") || upper.ends_with(".SF") || upper.ends_with(".DSA")) {
			Ok(None)
		} else {
			Ok(Some(data))
		}
	}
}
