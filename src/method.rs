//! A named, versioned piece of scripted source text with a parsed Method AST
//! (§3.4). Methods are immutable once registered; a new version is a distinct
//! entry. Stateless, and sharable across agents.

use semver::Version;

use crate::instr::{Instruction, InstructionParser};
use crate::log::Log;

/// The ordered sequence of instructions a method's source compiles to.
pub type MethodAst = Vec<Instruction>;

/// A registered method: name, version, source text, and its parsed AST.
///
/// `is_persistent` governs whether agents bound to this method are written out
/// by `save_agents` (§6.3); every method compiled by [`compile_method`] is
/// persistent, since §3.4 names no syntax for declaring otherwise.
#[derive(Debug, Clone)]
pub struct Method {
	name: String,
	version: Version,
	source: String,
	instructions: MethodAst,
	is_persistent: bool,
}

impl Method {
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub const fn version(&self) -> &Version {
		&self.version
	}

	#[must_use]
	pub fn source(&self) -> &str {
		&self.source
	}

	#[must_use]
	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}

	#[must_use]
	pub const fn is_persistent(&self) -> bool {
		self.is_persistent
	}
}

/// Parses `source` (one instruction per non-blank, non-comment line) into a
/// `Method`, failing if any line fails to parse as an instruction.
pub fn compile_method(name: &str, version: &Version, source: &str, log: &Log) -> Option<Method> {
	let parser = InstructionParser::new(log);
	let mut instructions = Vec::new();

	for line in source.lines() {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}
		let instruction = parser.parse(trimmed)?;
		instructions.push(instruction);
	}

	Some(Method { name: name.to_owned(), version: version.clone(), source: source.to_owned(), instructions, is_persistent: true })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compiles_multi_line_method() {
		let log = Log::new();
		let version = Version::new(1, 0, 0);
		let method = compile_method("echo", &version, "send(0, message)\n", &log).expect("valid method");
		assert_eq!(method.instructions().len(), 1);
	}

	#[test]
	fn skips_comments_and_blank_lines() {
		let log = Log::new();
		let version = Version::new(1, 0, 0);
		let source = "# a comment\n\nsend(0, message)\n# trailing\n";
		let method = compile_method("echo", &version, source, &log).expect("valid method");
		assert_eq!(method.instructions().len(), 1);
	}

	#[test]
	fn fails_on_unrecognized_line() {
		let log = Log::new();
		let version = Version::new(1, 0, 0);
		assert!(compile_method("bad", &version, "not an instruction !!!", &log).is_none());
	}
}
