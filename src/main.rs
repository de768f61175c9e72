//! `agerun`: the command-line binary driving the actor runtime (§6.4).

use clap::Parser as _;
use colored::Colorize as _;

use agerun_rt::cli::{commands::RuntimeCommand, CliArgs};

/// Parses arguments, runs the selected subcommand, and exits with its
/// reported code, or with code 2 if the subcommand itself errored out
/// (§6.4: "0 success, 1 initialization failure, 2 runtime error").
fn main() {
	let exit_code = match CliArgs::parse().command.execute() {
		Ok(code) => code,
		Err(error) => {
			eprintln!("{} {error}", "error:".red().bold());
			2
		},
	};
	std::process::exit(exit_code);
}
