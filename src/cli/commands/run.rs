use std::path::PathBuf;

use colored::Colorize as _;
use semver::Version;

use crate::cli::commands::RuntimeCommand;
use crate::dispatcher::{Dispatcher, DEFAULT_AGENTS_FILE, DEFAULT_METHODS_FILE};
use crate::method::compile_method;

/// Compiles `method_file` under `method_name`/`version`, spawns one agent
/// bound to it, drives the queue to quiescence, and persists the resulting
/// methods and agents into `--dir` before shutting down (§6.4).
#[derive(clap::Parser)]
pub struct RunCommand {
	/// Path to the method's source file.
	pub method_file: PathBuf,

	/// The name to register the method under.
	pub method_name: String,

	/// The method's version.
	pub version: Version,

	/// Directory holding the persisted `methodology.agerun`/`agency.agerun`
	/// files; created if it doesn't already exist.
	#[arg(long, default_value = ".")]
	pub dir: PathBuf,
}

impl RuntimeCommand for RunCommand {
	fn execute(&self) -> anyhow::Result<i32> {
		let dispatcher = self.try_run()?;
		match dispatcher {
			Some(dispatcher) => {
				dispatcher.log().flush();
				Ok(0)
			},
			None => Ok(1),
		}
	}
}

impl RunCommand {
	/// Returns `Ok(Some(dispatcher))` on success, `Ok(None)` for an
	/// initialization failure (exit 1), or `Err` for a runtime/I/O failure
	/// (exit 2, surfaced through `anyhow` by the caller).
	fn try_run(&self) -> anyhow::Result<Option<Dispatcher>> {
		let source = std::fs::read_to_string(&self.method_file)?;
		let mut dispatcher = Dispatcher::new();

		let Some(method) = compile_method(&self.method_name, &self.version, &source, dispatcher.log()) else {
			eprintln!("{}", "failed to compile method".red().bold());
			return Ok(None);
		};
		dispatcher.register_method(method);

		let Some(agent_id) = dispatcher.init(&self.method_name, Some(&self.version)) else {
			eprintln!("{}", "failed to spawn initial agent".red().bold());
			return Ok(None);
		};
		println!("{} agent {agent_id}", "spawned".green().bold());

		let processed = dispatcher.run_until_quiet();
		println!("{} {processed} message(s)", "processed".green().bold());

		std::fs::create_dir_all(&self.dir)?;
		dispatcher.save_methods(self.dir.join(DEFAULT_METHODS_FILE))?;
		dispatcher.save_agents(self.dir.join(DEFAULT_AGENTS_FILE))?;
		dispatcher.shutdown();
		Ok(Some(dispatcher))
	}
}
