//! Parser for `memory.PATH := EXPR` (§4.2, §4.4.1).

use crate::error::RuntimeError;
use crate::expr::parse_expression;
use crate::instr::ast::Instruction;
use crate::log::Log;

/// Parses a plain assignment once the dispatch facade has already determined
/// the instruction is not a function-call assignment.
pub struct AssignmentInstructionParser<'log> {
	log: &'log Log,
}

impl<'log> AssignmentInstructionParser<'log> {
	#[must_use]
	pub const fn new(log: &'log Log) -> Self {
		Self { log }
	}

	/// `target` is the raw text to the left of `:=`; `raw_expression` the raw
	/// text to the right. The target must begin with `memory.` (any other root
	/// is `ReadOnlyTarget`, since `context` and `message` are immutable).
	pub fn parse(&self, target: &str, raw_expression: &str) -> Option<Instruction> {
		let target = target.trim();
		let Some(path_text) = target.strip_prefix("memory.") else {
			self.log.error(&RuntimeError::ReadOnlyTarget(target.to_owned()));
			return None;
		};
		if path_text.is_empty() {
			self.log.error(&RuntimeError::ReadOnlyTarget(target.to_owned()));
			return None;
		}
		let target_path: Vec<String> = path_text.split('.').map(str::to_owned).collect();

		let raw_expression = raw_expression.trim();
		let expression = match parse_expression(raw_expression) {
			Ok(expression) => expression,
			Err(error) => {
				self.log.error(&error);
				return None;
			},
		};

		Some(Instruction::Assignment { target_path, expression, raw_expression: raw_expression.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_nested_path() {
		let log = Log::new();
		let parser = AssignmentInstructionParser::new(&log);
		let instruction = parser.parse("memory.user.name", "\"Alice\"").expect("valid assignment");
		assert!(matches!(instruction, Instruction::Assignment { target_path, .. } if target_path == vec!["user".to_owned(), "name".to_owned()]));
	}

	#[test]
	fn rejects_non_memory_target() {
		let log = Log::new();
		let parser = AssignmentInstructionParser::new(&log);
		assert!(parser.parse("context.x", "1").is_none());
	}
}
