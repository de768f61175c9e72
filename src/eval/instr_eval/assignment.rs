//! Evaluator for `memory.PATH := EXPR` (§4.4.1).

use crate::error::RuntimeError;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assign_path;
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::log::Log;

pub fn evaluate(target_path: &[String], expression: &Expr, frame: &mut Frame, log: &Log) -> bool {
	let Some(result) = expr_eval::evaluate(expression, frame, log) else {
		return false;
	};
	store(target_path, result, frame, log)
}

/// Shared by plain assignment and function-call assignment (§4.4.10): both
/// store a single evaluated value at a `memory.`-rooted path with the same
/// ownership rule.
pub(super) fn store(target_path: &[String], result: EvalResult, frame: &mut Frame, log: &Log) -> bool {
	let Some(value) = result.materialize() else {
		log.error(&RuntimeError::TypeMismatch("cannot copy a value containing a nested map or list".to_owned()));
		return false;
	};
	if !assign_path(frame.memory, target_path, value) {
		log.error(&RuntimeError::TypeMismatch(format!("cannot assign through a non-map intermediate at '{}'", target_path.join("."))));
		return false;
	}
	true
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::parse_expression;
	use crate::value::Value;
	use std::collections::BTreeMap;

	#[test]
	fn stores_literal_at_path() {
		let log = Log::new();
		let mut memory = Value::Map(BTreeMap::new());
		let context = Value::Map(BTreeMap::new());
		let message = Value::String(String::new());
		let mut frame = Frame::new(&mut memory, &context, &message);
		let expression = parse_expression("\"hi\"").expect("parses");
		assert!(evaluate(&["greeting".to_owned()], &expression, &mut frame, &log));
		let Value::Map(map) = &memory else { unreachable!() };
		assert_eq!(map.get("greeting"), Some(&Value::String("hi".to_owned())));
	}
}
