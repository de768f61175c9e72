use std::path::PathBuf;

use colored::Colorize as _;
use semver::Version;

use crate::cli::commands::RuntimeCommand;
use crate::log::{Log, Severity};
use crate::method::compile_method;

/// Parses `method_file` as a method and reports the first parse error's
/// position, without registering or running anything (§6.4).
#[derive(clap::Parser)]
pub struct CheckCommand {
	/// Path to the method's source file.
	pub method_file: PathBuf,
}

impl RuntimeCommand for CheckCommand {
	fn execute(&self) -> anyhow::Result<i32> {
		let source = std::fs::read_to_string(&self.method_file)?;
		let log = Log::new();

		// Name and version are irrelevant to a syntax check; any placeholders work.
		match compile_method("check", &Version::new(0, 0, 0), &source, &log) {
			Some(method) => {
				println!("{} {} instruction(s)", "ok,".green().bold(), method.instructions().len());
				Ok(0)
			},
			None => {
				if let Some(event) = log.last_at_severity(Severity::Error) {
					print_highlighted(&source, event.position, &event.message);
				}
				Ok(1)
			},
		}
	}
}

/// Prints the source line containing `position` (if known), underlining the
/// offending byte with a caret, in the style of `log.rs`'s own event output.
fn print_highlighted(source: &str, position: Option<usize>, message: &str) {
	eprintln!("{} {message}", "error:".red().bold());
	let Some(position) = position else { return };

	let mut line_start = 0;
	for line in source.split_inclusive('\n') {
		let line_end = line_start + line.len();
		if position < line_end || line_end == source.len() {
			let column = position.saturating_sub(line_start);
			let trimmed = line.trim_end_matches('\n');
			eprintln!("  {}", trimmed.dimmed());
			eprintln!("  {}{}", " ".repeat(column), "^".red().bold());
			return;
		}
		line_start = line_end;
	}
}
