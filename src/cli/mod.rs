//! The `agerun` command-line binary (§6.4).

use crate::cli::commands::SubCommand;

/// The commands module, handling `agerun run`, `agerun check`, and `agerun send`.
pub mod commands;

/// Top-level command-line arguments.
#[derive(clap::Parser)]
#[command(name = "agerun", about = "Drive agents that script a small embedded language.")]
pub struct CliArgs {
	/// The subcommand to run.
	#[command(subcommand)]
	pub command: SubCommand,
}
