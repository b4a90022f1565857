use anyhow::{anyhow, bail, Context, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;
use crate::tree::names::{Names, Namespace, Namespaces};
use crate::tree::{FromKey, NodeInfo, ToKey};

#[derive(Debug, Clone)]
pub struct Mappings {
	pub namespaces: Namespaces,
	pub classes: IndexMap<String, ClassNowodeMapping>,
}

impl Mappings {
	pub fn new(namespaces: Namespaces) -> Mappings {
		Mappings { namespaces, classes: IndexMap::new() }
	}

	pub fn add_class(&mut self, child: ClassNowodeMapping) -> Result<&mut ClassNowodeMapping> {
		let key = child.info.get_key();
		match self.classes.entry(key) {
			Entry::Occupied(e) => bail!("duplicate class entry for key {:?}", e.key()),
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	pub fn namespace(&self, name: &str) -> Result<Namespace> {
		self.namespaces.namespace_of(name)
	}

	/// Ensures every entity's name column matches the namespace count (invariant 1 of the data
	/// model). Format codecs call this once after building a `Mappings` from scratch.
	pub fn validate(&self) -> Result<()> {
		let n = self.namespaces.len();
		for class in self.classes.values() {
			if class.info.names.len() != n {
				bail!("class {:?} has {} names, expected {n}", class.info.names, class.info.names.len());
			}
			class.info.names.first_name().with_context(|| anyhow!("class missing a name in the first namespace"))?;
			for field in class.fields.values() {
				if field.info.names.len() != n {
					bail!("field {:?} has wrong name count", field.info.names);
				}
			}
			for method in class.methods.values() {
				if method.info.names.len() != n {
					bail!("method {:?} has wrong name count", method.info.names);
				}
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone)]
pub struct ClassNowodeMapping {
	pub info: ClassMapping,
	pub fields: IndexMap<FieldKey, FieldNowodeMapping>,
	pub methods: IndexMap<MethodKey, MethodNowodeMapping>,
	pub comments: Vec<String>,
}

impl NodeInfo<ClassMapping> for ClassNowodeMapping {
	fn get_node_info(&self) -> &ClassMapping {
		&self.info
	}
	fn get_node_info_mut(&mut self) -> &mut ClassMapping {
		&mut self.info
	}
	fn new(info: ClassMapping) -> Self {
		ClassNowodeMapping { info, fields: IndexMap::new(), methods: IndexMap::new(), comments: Vec::new() }
	}
}

impl ClassNowodeMapping {
	pub fn add_field(&mut self, child: FieldNowodeMapping) -> Result<&mut FieldNowodeMapping> {
		let key = child.info.get_key();
		match self.fields.entry(key) {
			Entry::Occupied(e) => bail!("duplicate field entry for key {:?}", e.key()),
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	pub fn add_method(&mut self, child: MethodNowodeMapping) -> Result<&mut MethodNowodeMapping> {
		let key = child.info.get_key();
		match self.methods.entry(key) {
			Entry::Occupied(e) => bail!("duplicate method entry for key {:?}", e.key()),
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct FieldNowodeMapping {
	pub info: FieldMapping,
	pub comments: Vec<String>,
}

impl NodeInfo<FieldMapping> for FieldNowodeMapping {
	fn get_node_info(&self) -> &FieldMapping {
		&self.info
	}
	fn get_node_info_mut(&mut self) -> &mut FieldMapping {
		&mut self.info
	}
	fn new(info: FieldMapping) -> Self {
		FieldNowodeMapping { info, comments: Vec::new() }
	}
}

#[derive(Debug, Clone)]
pub struct MethodNowodeMapping {
	pub info: MethodMapping,
	pub parameters: IndexMap<usize, ParameterNowodeMapping>,
	pub variables: Vec<MappedLocal>,
	pub comments: Vec<String>,
}

impl NodeInfo<MethodMapping> for MethodNowodeMapping {
	fn get_node_info(&self) -> &MethodMapping {
		&self.info
	}
	fn get_node_info_mut(&mut self) -> &mut MethodMapping {
		&mut self.info
	}
	fn new(info: MethodMapping) -> Self {
		MethodNowodeMapping { info, parameters: IndexMap::new(), variables: Vec::new(), comments: Vec::new() }
	}
}

impl MethodNowodeMapping {
	pub fn add_parameter(&mut self, child: ParameterNowodeMapping) -> Result<&mut ParameterNowodeMapping> {
		let key = child.info.index;
		match self.parameters.entry(key) {
			Entry::Occupied(_) => bail!("duplicate parameter entry for index {key}"),
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct ParameterNowodeMapping {
	pub info: ParameterMapping,
}

impl NodeInfo<ParameterMapping> for ParameterNowodeMapping {
	fn get_node_info(&self) -> &ParameterMapping {
		&self.info
	}
	fn get_node_info_mut(&mut self) -> &mut ParameterMapping {
		&mut self.info
	}
	fn new(info: ParameterMapping) -> Self {
		ParameterNowodeMapping { info }
	}
}

/// A local variable mapping. Not keyed into a node map: locals are identified by `(start_offset,
/// index, lvt_index)` and are purely additive metadata on a method.
#[derive(Debug, Clone)]
pub struct MappedLocal {
	pub index: u16,
	pub start_offset: u16,
	/// `< 0` means unset, matching `duke::tree::method::code::LocalVariable::lvt_index`.
	pub lvt_index: i32,
	pub names: Names<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ClassKey(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
	pub names: Names<String>,
}

impl ToKey<String> for ClassMapping {
	fn get_key(&self) -> String {
		self.names.first_name().expect("class mapping must have a first-namespace name").clone()
	}
}

impl FromKey<String> for ClassMapping {
	fn from_key(key: String) -> ClassMapping {
		ClassMapping { names: Names::from_first_name(1, key) }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
	pub desc: Option<String>,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
	pub desc: Option<String>,
	pub names: Names<String>,
}

impl ToKey<FieldKey> for FieldMapping {
	fn get_key(&self) -> FieldKey {
		FieldKey { desc: self.desc.clone(), name: self.names.first_name().expect("field mapping must have a first-namespace name").clone() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
	pub desc: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodMapping {
	pub desc: String,
	pub names: Names<String>,
}

impl ToKey<MethodKey> for MethodMapping {
	fn get_key(&self) -> MethodKey {
		MethodKey { desc: self.desc.clone(), name: self.names.first_name().expect("method mapping must have a first-namespace name").clone() }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
	pub index: usize,
	pub names: Names<String>,
}

impl ToKey<usize> for ParameterMapping {
	fn get_key(&self) -> usize {
		self.index
	}
}

/// Builds a [`Mappings`] value incrementally, for codecs that parse class/field/method records
/// as they stream in, and for tests that construct fixtures without going through a codec.
pub struct GenericMappings {
	mappings: Mappings,
}

impl GenericMappings {
	pub fn new(namespace_names: Vec<String>) -> Result<GenericMappings> {
		Ok(GenericMappings { mappings: Mappings::new(Namespaces::new(namespace_names)?) })
	}

	pub fn add_class(&mut self, names: Vec<Option<String>>) -> Result<&mut ClassNowodeMapping> {
		let key = names.first().cloned().flatten().context("class must have a first-namespace name")?;
		let node = ClassNowodeMapping::new(ClassMapping { names: Names::from_vec(names) });
		self.mappings.add_class(node)?;
		self.mappings.classes.get_mut(&key).context("just-inserted class vanished")
	}

	pub fn build(self) -> Result<Mappings> {
		self.mappings.validate()?;
		Ok(self.mappings)
	}
}
