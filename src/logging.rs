//! `fern`-backed logging setup. Mirrors the crate's dependency on `log`/`fern` for the one binary
//! that actually needs to print anything: the library crates only ever call `log::*` macros and
//! never configure a logger themselves.

use anyhow::Result;

pub fn init() -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| out.finish(format_args!("[{} {}] {}", record.target(), record.level(), message)))
		.level(log::LevelFilter::Info)
		.chain(std::io::stderr())
		.apply()?;
	Ok(())
}
