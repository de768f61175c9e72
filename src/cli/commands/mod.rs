use crate::cli::commands::{check::CheckCommand, run::RunCommand, send::SendCommand};

/// The `run` subcommand: compiles, spawns, drives to quiescence, and persists.
pub mod run;

/// The `check` subcommand: parses a method source file without executing it.
pub mod check;

/// The `send` subcommand: pokes a message at a previously-saved dispatcher state.
pub mod send;

/// A runtime subcommand, dispatched to whichever variant `clap` parsed.
///
/// Returns the process exit code directly (§6.4: 0 success, 1 initialization
/// failure, 2 runtime error) rather than a bare `Result<()>`, since the CLI's
/// contract is defined in terms of exit codes, not just success/failure.
#[enum_dispatch::enum_dispatch]
pub trait RuntimeCommand {
	/// Executes this subcommand, returning the process exit code to use.
	fn execute(&self) -> anyhow::Result<i32>;
}

/// The subcommands this binary accepts.
#[derive(clap::Subcommand)]
#[enum_dispatch::enum_dispatch(RuntimeCommand)]
pub enum SubCommand {
	/// Compiles a method, spawns one agent bound to it, runs until the queue
	/// is quiet, then saves methods and agents to `--dir` before shutting down.
	Run(RunCommand),

	/// Parses a method source file and reports any parse error's position,
	/// without spawning or running anything.
	Check(CheckCommand),

	/// Loads a previously saved dispatcher state, enqueues one message to an
	/// agent, runs to quiescence, and saves the result back.
	Send(SendCommand),
}
