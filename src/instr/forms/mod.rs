//! One parser per instruction form (§4.2), grounded in the original
//! `ar_send_instruction_parser`, `ar_condition_instruction_parser`, etc. family —
//! each specialized parser owns no mutable state between invocations and shares
//! a `&Log` for structured error reporting.

pub mod assignment;
pub mod build;
pub mod compile;
pub mod deprecate;
pub mod exit;
pub mod if_form;
pub mod parse;
pub mod send;
pub mod spawn;

use crate::error::RuntimeError;
use crate::expr::{parse_expression, Expr};
use crate::instr::ast::{Action, FunctionKind};
use crate::instr::scan::{find_unquoted, split_call};
use crate::log::Log;

/// Parses every raw argument substring as an expression, logging and returning
/// `None` at the first failure. Shared by every function-call form parser.
pub(super) fn parse_arguments(log: &Log, raw_arguments: &[String]) -> Option<Vec<Expr>> {
	let mut arguments = Vec::with_capacity(raw_arguments.len());
	for raw in raw_arguments {
		match parse_expression(raw) {
			Ok(expression) => arguments.push(expression),
			Err(error) => {
				log.error(&error);
				return None;
			},
		}
	}
	Some(arguments)
}

/// Checks the raw argument count against the form's exact arity, logging
/// `ArityMismatch` on mismatch.
pub(super) fn check_arity(log: &Log, function: &str, expected: usize, raw_arguments: &[String]) -> bool {
	if raw_arguments.len() == expected {
		true
	} else {
		log.error(&RuntimeError::ArityMismatch { function: function.to_owned(), expected, got: raw_arguments.len() });
		false
	}
}

/// Parses one `if` branch (§4.4.3, §8 S2): worked examples pass whole
/// instructions — `memory.count := 0`, `send(0, build(...))` — as branches, not
/// bare expressions, so this recognizes the same three shapes the top-level
/// facade does (assignment, bare call, plain expression) before falling back.
pub(super) fn parse_action(log: &Log, text: &str) -> Option<Action> {
	let text = text.trim();

	if let Some(assign_position) = find_unquoted(text, ":=") {
		let target = text[..assign_position].trim();
		let rhs = text[assign_position + 2..].trim();
		let Some(path) = target.strip_prefix("memory.").filter(|path| !path.is_empty()) else {
			log.error(&RuntimeError::ReadOnlyTarget(target.to_owned()));
			return None;
		};
		let target_path: Vec<String> = path.split('.').map(str::to_owned).collect();
		return match split_call(rhs) {
			Some((FunctionKind::If, _)) => {
				log.error(&RuntimeError::ParseError { position: 0, detail: "nested if is not supported as an if branch".to_owned() });
				None
			},
			Some((kind, raw_arguments)) => {
				let arguments = parse_arguments(log, &raw_arguments)?;
				Some(Action::Call { kind, arguments, result_path: Some(target_path) })
			},
			None => {
				let expression = parse_expression(rhs).map_err(|error| log.error(&error)).ok()?;
				Some(Action::Assignment { target_path, expression })
			},
		};
	}

	match split_call(text) {
		Some((FunctionKind::If, _)) => {
			log.error(&RuntimeError::ParseError { position: 0, detail: "nested if is not supported as an if branch".to_owned() });
			None
		},
		Some((kind, raw_arguments)) => {
			let arguments = parse_arguments(log, &raw_arguments)?;
			Some(Action::Call { kind, arguments, result_path: None })
		},
		None => {
			let expression = parse_expression(text).map_err(|error| log.error(&error)).ok()?;
			Some(Action::Expr(expression))
		},
	}
}
