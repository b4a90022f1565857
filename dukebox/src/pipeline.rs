//! The concurrent jar remap pipeline: one task per `(input, output, from, to)` quadruple, run
//! under a supervised `tokio::task::JoinSet`, sharing a single immutable `Mappings` and a single
//! pre-scanned classpath super/interface map across all tasks.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use duke::visitor::{ClassVisitorAdapter, DropSignatureFiles, ResourceVisitor};
use quill::remapper::SuperClassProvider;
use quill::tree::mappings::Mappings;
use crate::inheritance::SuperClassMap;
use crate::storage::{write_jar, FileJar, Jar, JarEntry};

pub struct Task {
	pub input: PathBuf,
	pub output: PathBuf,
	pub from_namespace: String,
	pub to_namespace: String,
}

/// The resources shared, read-only, across every task in a run: the mappings, and the
/// super/interface map scanned once from the classpath jars passed to [`Pipeline::new`].
///
/// Classpath *byte* loading (e.g. for an [`crate::inheritance::InheritanceProvider`]-based
/// lookup outside of remapping itself) is a separate, independently usable concern — see
/// [`crate::classpath`] — and isn't threaded through the pipeline, since `BRemapper`'s
/// inheritance walk needs the already-scanned, by-reference [`SuperClassMap`] rather than a
/// lazily-loading classpath.
pub struct Pipeline {
	mappings: Arc<Mappings>,
	shared_super_classes: Arc<Vec<SuperClassMap>>,
	class_visitors: Arc<Vec<Box<dyn ClassVisitorAdapter>>>,
	resource_visitors: Arc<Vec<Box<dyn ResourceVisitor>>>,
	copy_resources: bool,
}

impl Pipeline {
	pub fn new(
		mappings: Mappings,
		classpath_jars: Vec<Box<dyn Jar>>,
		class_visitors: Vec<Box<dyn ClassVisitorAdapter>>,
		mut resource_visitors: Vec<Box<dyn ResourceVisitor>>,
		copy_resources: bool,
	) -> Result<Pipeline> {
		resource_visitors.push(Box::new(DropSignatureFiles));

		let mut super_classes = Vec::new();
		for jar in &classpath_jars {
			super_classes.push(SuperClassMap::from_entries(&jar.entries()?)?);
		}

		Ok(Pipeline {
			mappings: Arc::new(mappings),
			shared_super_classes: Arc::new(super_classes),
			class_visitors: Arc::new(class_visitors),
			resource_visitors: Arc::new(resource_visitors),
			copy_resources,
		})
	}

	/// Runs every task concurrently. A task failure surfaces to the caller without aborting
	/// sibling tasks; if more than one task fails, the first failure is returned and the rest are
	/// logged.
	pub async fn run(&self, tasks: Vec<Task>) -> Result<()> {
		for task in &tasks {
			self.mappings.namespace(&task.from_namespace).with_context(|| anyhow!("task {:?}: unknown from-namespace", task.input))?;
			self.mappings.namespace(&task.to_namespace).with_context(|| anyhow!("task {:?}: unknown to-namespace", task.input))?;
		}

		let mut join_set = tokio::task::JoinSet::new();
		for task in tasks {
			let mappings = self.mappings.clone();
			let shared_super_classes = self.shared_super_classes.clone();
			let class_visitors = self.class_visitors.clone();
			let resource_visitors = self.resource_visitors.clone();
			let copy_resources = self.copy_resources;

			join_set.spawn_blocking(move || run_task(task, mappings, shared_super_classes, class_visitors, resource_visitors, copy_resources));
		}

		let mut first_error: Option<anyhow::Error> = None;
		while let Some(outcome) = join_set.join_next().await {
			let result = outcome.map_err(|e| anyhow!("jar remap task panicked: {e}")).and_then(|r| r);
			if let Err(e) = result {
				if let Some(first) = &first_error {
					log::error!("additional jar remap task failure: {e:?}");
					let _ = first;
				} else {
					first_error = Some(e);
				}
			}
		}

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

fn run_task(
	task: Task,
	mappings: Arc<Mappings>,
	shared_super_classes: Arc<Vec<SuperClassMap>>,
	class_visitors: Arc<Vec<Box<dyn ClassVisitorAdapter>>>,
	resource_visitors: Arc<Vec<Box<dyn ResourceVisitor>>>,
	copy_resources: bool,
) -> Result<()> {
	let from = mappings.namespace(&task.from_namespace)?;
	let to = mappings.namespace(&task.to_namespace)?;

	let input_jar = FileJar::new(&task.input);
	let entries = input_jar.entries().with_context(|| anyhow!("reading {:?}", task.input))?;

	let mut class_entries = Vec::new();
	let mut resource_entries = Vec::new();
	for entry in entries {
		if entry.is_dir {
			continue;
		} else if entry.is_class() {
			class_entries.push(entry);
		} else {
			resource_entries.push(entry);
		}
	}

	let local_super_classes = SuperClassMap::from_entries(&class_entries)?;
	let super_classes: Vec<Box<dyn SuperClassProvider>> = vec![Box::new(local_super_classes), Box::new(shared_super_classes.clone())];

	let remapper = mappings.remapper_b(from, to, &super_classes)?;

	let mut output_entries = Vec::new();

	if copy_resources {
		for entry in resource_entries {
			let mut data = Some(entry.data);
			for visitor in resource_visitors.iter() {
				let Some(d) = data else { break };
				data = visitor.visit(&entry.name, d)?;
			}
			if let Some(data) = data {
				output_entries.push(JarEntry { name: entry.name, is_dir: false, data });
			}
		}
	}

	for entry in class_entries {
		let mut class = duke::read_class(&entry.data).with_context(|| anyhow!("parsing {:?}", entry.name))?;

		let mut out_class = class.clone();
		for adapter in class_visitors.iter() {
			out_class = adapter.visit(out_class)?;
		}
		class = out_class;

		quill::class_remap::remap_class(&remapper, &mut class).with_context(|| anyhow!("remapping {:?}", entry.name))?;

		let bytes = duke::write_class(&class)?;
		output_entries.push(JarEntry { name: format!("{}.class", class.name.as_str()), is_dir: false, data: bytes });
	}

	write_jar(&task.output, output_entries).with_context(|| anyhow!("writing {:?}", task.output))
}
