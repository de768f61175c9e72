use std::path::PathBuf;

use colored::Colorize as _;

use crate::cli::commands::RuntimeCommand;
use crate::dispatcher::{Dispatcher, DEFAULT_AGENTS_FILE, DEFAULT_METHODS_FILE};
use crate::value::Value;

/// Loads a previously saved dispatcher state from `--dir`, enqueues one
/// message to `agent_id`, runs to quiescence, and saves the result back.
///
/// Not part of §6.4's contract-only CLI surface; added for interactive
/// poking during development, alongside `run` and `check`.
#[derive(clap::Parser)]
pub struct SendCommand {
	/// The target agent id. Id 0 is the no-op sink.
	pub agent_id: i64,

	/// The message value. Parsed as an integer, then a double, then falls
	/// back to a literal string.
	pub value: String,

	/// Directory holding the persisted `methodology.agerun`/`agency.agerun` files.
	#[arg(long, default_value = ".")]
	pub dir: PathBuf,
}

impl RuntimeCommand for SendCommand {
	fn execute(&self) -> anyhow::Result<i32> {
		let mut dispatcher = Dispatcher::new();
		dispatcher.load_methods(self.dir.join(DEFAULT_METHODS_FILE))?;
		dispatcher.load_agents(self.dir.join(DEFAULT_AGENTS_FILE))?;

		if !dispatcher.send(self.agent_id, parse_value(&self.value)) {
			eprintln!("{}", format!("agent {} does not exist", self.agent_id).red().bold());
			return Ok(1);
		}

		let processed = dispatcher.run_until_quiet();
		println!("{} {processed} message(s)", "processed".green().bold());

		dispatcher.save_methods(self.dir.join(DEFAULT_METHODS_FILE))?;
		dispatcher.save_agents(self.dir.join(DEFAULT_AGENTS_FILE))?;
		Ok(0)
	}
}

/// Interprets a raw command-line argument as the most specific `Value` it parses as.
fn parse_value(raw: &str) -> Value {
	if let Ok(integer) = raw.parse::<i64>() {
		return Value::Integer(integer);
	}
	if let Ok(double) = raw.parse::<f64>() {
		return Value::Double(double);
	}
	Value::String(raw.to_owned())
}
