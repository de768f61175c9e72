//! The instruction-parser facade that decides between assignment and function
//! call (§4.2), then hands off to the matching specialized parser (§4.2, §3.3).
//!
//! Dispatch rule, scanning left to right while respecting string quoting:
//!
//! 1. Find the first unquoted `:=`. If present, the text before it is the
//!    assignment target and the text after it is the right-hand side.
//!    - If the right-hand side is itself `name(args)` for a recognized
//!      function name, this is a `FunctionCall` instruction with `result_path`
//!      taken from the target text (§4.4.10).
//!    - Otherwise it is a plain `Assignment` (§4.4.1).
//! 2. If no `:=` is present, find the first unquoted `(`. If present, this is
//!    a bare `FunctionCall` with no result path.
//! 3. If neither is present, the instruction is unrecognized.
//!
//! This mirrors `ar_instruction_parser__parse`'s dispatch-by-function-name
//! design from the original interpreter, holding one specialized parser
//! instance per form, constructed once and reused, sharing a single log
//! reference for structured error reporting.

use crate::error::RuntimeError;
use crate::instr::ast::{FunctionKind, Instruction};
use crate::instr::forms::{
	assignment::AssignmentInstructionParser, build::BuildInstructionParser, compile::CompileInstructionParser, deprecate::DeprecateInstructionParser,
	exit::ExitInstructionParser, if_form::ConditionInstructionParser, parse::ParseInstructionParser, send::SendInstructionParser, spawn::SpawnInstructionParser,
};
use crate::instr::scan::{find_unquoted, split_call};
use crate::log::Log;

/// Owns one specialized parser per instruction form (§4.2).
pub struct InstructionParser<'log> {
	log: &'log Log,
	assignment: AssignmentInstructionParser<'log>,
	send: SendInstructionParser<'log>,
	condition: ConditionInstructionParser<'log>,
	parse_form: ParseInstructionParser<'log>,
	build: BuildInstructionParser<'log>,
	compile: CompileInstructionParser<'log>,
	spawn: SpawnInstructionParser<'log>,
	exit: ExitInstructionParser<'log>,
	deprecate: DeprecateInstructionParser<'log>,
}

impl<'log> InstructionParser<'log> {
	#[must_use]
	pub const fn new(log: &'log Log) -> Self {
		Self {
			log,
			assignment: AssignmentInstructionParser::new(log),
			send: SendInstructionParser::new(log),
			condition: ConditionInstructionParser::new(log),
			parse_form: ParseInstructionParser::new(log),
			build: BuildInstructionParser::new(log),
			compile: CompileInstructionParser::new(log),
			spawn: SpawnInstructionParser::new(log),
			exit: ExitInstructionParser::new(log),
			deprecate: DeprecateInstructionParser::new(log),
		}
	}

	/// Parses one line of instruction source text.
	pub fn parse(&self, instruction_text: &str) -> Option<Instruction> {
		let text = instruction_text.trim();
		if text.is_empty() {
			return None;
		}

		match find_unquoted(text, ":=") {
			Some(assign_position) => {
				let target = text[..assign_position].trim();
				let rhs = text[assign_position + 2..].trim();
				if let Some((kind, raw_arguments)) = split_call(rhs) {
					let Some(path) = target.strip_prefix("memory.").filter(|path| !path.is_empty()) else {
						self.log.error(&RuntimeError::ReadOnlyTarget(target.to_owned()));
						return None;
					};
					let result_path = path.split('.').map(str::to_owned).collect();
					self.dispatch_call(kind, raw_arguments, Some(result_path))
				} else {
					self.assignment.parse(target, rhs)
				}
			},
			None => match split_call(text) {
				Some((kind, raw_arguments)) => self.dispatch_call(kind, raw_arguments, None),
				None => {
					self.log.error(&RuntimeError::ParseError { position: 0, detail: format!("unrecognized instruction: {text}") });
					None
				},
			},
		}
	}

	fn dispatch_call(&self, kind: FunctionKind, raw_arguments: Vec<String>, result_path: Option<Vec<String>>) -> Option<Instruction> {
		match kind {
			FunctionKind::Send => self.send.parse(raw_arguments, result_path),
			FunctionKind::If => self.condition.parse(raw_arguments, result_path),
			FunctionKind::Parse => self.parse_form.parse(raw_arguments, result_path),
			FunctionKind::Build => self.build.parse(raw_arguments, result_path),
			FunctionKind::Compile => self.compile.parse(raw_arguments, result_path),
			FunctionKind::Spawn => self.spawn.parse(raw_arguments, result_path),
			FunctionKind::Exit => self.exit.parse(raw_arguments, result_path),
			FunctionKind::Deprecate => self.deprecate.parse(raw_arguments, result_path),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::instr::ast::FunctionKind;

	#[test]
	fn dispatches_plain_assignment() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		let instruction = parser.parse("memory.count := 0").expect("valid instruction");
		assert!(matches!(instruction, Instruction::Assignment { .. }));
	}

	#[test]
	fn dispatches_bare_function_call() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		let instruction = parser.parse("send(0, message)").expect("valid instruction");
		assert!(matches!(instruction, Instruction::FunctionCall { kind: FunctionKind::Send, result_path: None, .. }));
	}

	#[test]
	fn dispatches_function_call_assignment() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		let instruction = parser.parse("memory.ok := send(0, message)").expect("valid instruction");
		assert!(matches!(instruction, Instruction::FunctionCall { kind: FunctionKind::Send, result_path: Some(_), .. }));
	}

	#[test]
	fn rejects_non_memory_target_read_only() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		assert!(parser.parse("context.x := 1").is_none());
	}

	#[test]
	fn quoted_colon_equals_inside_string_does_not_split() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		let instruction = parser.parse(r#"memory.x := "a:=b""#).expect("valid instruction");
		assert!(matches!(instruction, Instruction::Assignment { .. }));
	}

	#[test]
	fn unrecognized_instruction_returns_none() {
		let log = Log::new();
		let parser = InstructionParser::new(&log);
		assert!(parser.parse("banana").is_none());
	}
}
