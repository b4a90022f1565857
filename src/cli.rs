//! Argument parsing and validation for the `remap` command (SPEC_FULL §6).

use std::path::{Path, PathBuf};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
	name = "remap",
	about = "Remaps a jar between two namespaces of a mappings file.",
	override_usage = "remap [-s|--skip-resources] [-f|--force] [-v|--stacktrace] -- <input> <output> <mappings> <from> <to> [classpath...]"
)]
pub struct Cli {
	/// Do not copy non-class resources into the output jar.
	#[arg(short = 's', long = "skip-resources")]
	pub skip_resources: bool,

	/// Overwrite the output file if it already exists.
	#[arg(short = 'f', long = "force")]
	pub force: bool,

	/// Print a full error trace instead of a one-line message on failure.
	#[arg(short = 'v', long = "stacktrace")]
	pub stacktrace: bool,

	/// `<input> <output> <mappings> <from> <to> [classpath...]`
	#[arg(value_name = "ARGS")]
	pub positionals: Vec<String>,
}

/// The five-plus-classpath positionals, validated and split apart.
#[derive(Debug)]
pub struct RemapArgs {
	pub input: PathBuf,
	pub output: PathBuf,
	pub mappings: PathBuf,
	pub from_namespace: String,
	pub to_namespace: String,
	pub classpath: Vec<PathBuf>,
	pub skip_resources: bool,
	pub force: bool,
}

/// A usage violation: reported with the usage line on stdout, distinct from a failure that
/// happened while actually running the remap (which is reported as `error: ...` on stderr).
#[derive(Debug)]
pub struct UsageError(pub String);

impl Cli {
	pub fn usage_line() -> &'static str {
		"usage: remap [-s|--skip-resources] [-f|--force] [-v|--stacktrace] -- <input> <output> <mappings> <from> <to> [classpath...]"
	}

	pub fn validate(self) -> Result<RemapArgs, UsageError> {
		if self.positionals.len() < 5 {
			return Err(UsageError(format!(
				"expected at least 5 positional arguments (input, output, mappings, from, to), got {}",
				self.positionals.len()
			)));
		}

		let input = PathBuf::from(&self.positionals[0]);
		let output = PathBuf::from(&self.positionals[1]);
		let mappings = PathBuf::from(&self.positionals[2]);
		let from_namespace = self.positionals[3].clone();
		let to_namespace = self.positionals[4].clone();
		let classpath: Vec<PathBuf> = self.positionals[5..].iter().map(PathBuf::from).collect();

		require_file(&input)?;
		require_file(&mappings)?;
		for jar in &classpath {
			require_file(jar)?;
		}

		match output.parent() {
			Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
				return Err(UsageError(format!("output parent directory does not exist: {}", parent.display())));
			}
			_ => {}
		}

		if output.exists() && !self.force {
			return Err(UsageError(format!("output already exists (use --force to overwrite): {}", output.display())));
		}

		Ok(RemapArgs {
			input,
			output,
			mappings,
			from_namespace,
			to_namespace,
			classpath,
			skip_resources: self.skip_resources,
			force: self.force,
		})
	}
}

fn require_file(path: &Path) -> Result<(), UsageError> {
	if !path.is_file() {
		return Err(UsageError(format!("no such file: {}", path.display())));
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use pretty_assertions::assert_eq;

	fn cli(positionals: Vec<&str>) -> Cli {
		Cli { skip_resources: false, force: false, stacktrace: false, positionals: positionals.into_iter().map(str::to_owned).collect() }
	}

	#[test]
	fn rejects_fewer_than_five_positionals() {
		let err = cli(vec!["a", "b", "c"]).validate().unwrap_err();
		assert!(err.0.contains("at least 5"));
	}

	#[test]
	fn rejects_missing_input_file() {
		let dir = std::env::temp_dir().join(format!("nsremap-cli-test-{}-missing", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let mappings = dir.join("mappings.tiny");
		std::fs::write(&mappings, "v1\tofficial\tnamed\n").unwrap();

		let err = cli(vec!["/no/such/input.jar", "out.jar", mappings.to_str().unwrap(), "official", "named"]).validate().unwrap_err();
		assert!(err.0.contains("no such file"));

		std::fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn rejects_existing_output_without_force() {
		let dir = std::env::temp_dir().join(format!("nsremap-cli-test-{}-exists", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let input = dir.join("in.jar");
		std::fs::write(&input, b"").unwrap();
		let mappings = dir.join("mappings.tiny");
		std::fs::write(&mappings, "v1\tofficial\tnamed\n").unwrap();
		let output = dir.join("out.jar");
		std::fs::write(&output, b"").unwrap();

		let err = cli(vec![input.to_str().unwrap(), output.to_str().unwrap(), mappings.to_str().unwrap(), "official", "named"]).validate().unwrap_err();
		assert!(err.0.contains("already exists"));

		std::fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn accepts_well_formed_arguments_with_classpath() {
		let dir = std::env::temp_dir().join(format!("nsremap-cli-test-{}-ok", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let input = dir.join("in.jar");
		std::fs::write(&input, b"").unwrap();
		let mappings = dir.join("mappings.tiny");
		std::fs::write(&mappings, "v1\tofficial\tnamed\n").unwrap();
		let classpath_jar = dir.join("lib.jar");
		std::fs::write(&classpath_jar, b"").unwrap();
		let output = dir.join("out.jar");

		let args = cli(vec![
			input.to_str().unwrap(),
			output.to_str().unwrap(),
			mappings.to_str().unwrap(),
			"official",
			"named",
			classpath_jar.to_str().unwrap(),
		])
		.validate()
		.unwrap();

		assert_eq!(args.from_namespace, "official");
		assert_eq!(args.to_namespace, "named");
		assert_eq!(args.classpath.len(), 1);

		std::fs::remove_dir_all(&dir).unwrap();
	}
}
