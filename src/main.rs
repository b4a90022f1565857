//! `remap`: a standalone CLI over the `quill`/`duke`/`dukebox`/`access_widener` libraries, wiring
//! mappings loading, classpath scanning and the jar remap pipeline together (SPEC_FULL §6).

mod cli;
mod logging;
mod mappings_io;

use anyhow::{Context, Result};
use clap::Parser;
use dukebox::pipeline::{Pipeline, Task};
use dukebox::storage::{FileJar, Jar};

use crate::cli::{Cli, RemapArgs};

fn main() {
	let cli = Cli::parse();
	let stacktrace = cli.stacktrace;

	let args = match cli.validate() {
		Ok(args) => args,
		Err(usage_error) => {
			println!("{}", Cli::usage_line());
			eprintln!("error: {}", usage_error.0);
			std::process::exit(-1);
		}
	};

	if let Err(e) = logging::init() {
		eprintln!("error: failed to initialize logging: {e}");
		std::process::exit(-1);
	}

	let runtime = match tokio::runtime::Runtime::new() {
		Ok(runtime) => runtime,
		Err(e) => {
			eprintln!("error: failed to start async runtime: {e}");
			std::process::exit(-1);
		}
	};

	if let Err(e) = runtime.block_on(run(args)) {
		if stacktrace {
			eprintln!("error: {e:?}");
		} else {
			eprintln!("error: {e}");
		}
		std::process::exit(-1);
	}
}

async fn run(args: RemapArgs) -> Result<()> {
	let mappings = mappings_io::load_mappings(&args.mappings)?;

	let mut classpath_jars: Vec<Box<dyn Jar>> = Vec::with_capacity(args.classpath.len());
	for path in &args.classpath {
		classpath_jars.push(Box::new(FileJar::new(path.clone())));
	}

	let pipeline = Pipeline::new(mappings, classpath_jars, Vec::new(), Vec::new(), !args.skip_resources).context("setting up the remap pipeline")?;

	let task = Task { input: args.input.clone(), output: args.output.clone(), from_namespace: args.from_namespace.clone(), to_namespace: args.to_namespace.clone() };

	pipeline.run(vec![task]).await.with_context(|| format!("remapping {} -> {}", args.input.display(), args.output.display()))
}
