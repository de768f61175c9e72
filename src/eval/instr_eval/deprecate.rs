//! Evaluator for `deprecate(method_name, version)` (§4.4.9).

use crate::error::RuntimeError;
use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assignment::store;
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::value::Value;

pub fn evaluate(arguments: &[Expr], result_path: Option<&[String]>, frame: &mut Frame, effects: &mut Effects) -> bool {
	let Some(name_result) = expr_eval::evaluate(&arguments[0], frame, effects.log) else {
		return false;
	};
	let Some(version_result) = expr_eval::evaluate(&arguments[1], frame, effects.log) else {
		return false;
	};

	let (Value::String(name), Value::String(version_text)) = (name_result.into_value(), version_result.into_value()) else {
		effects.log.error(&RuntimeError::TypeMismatch("deprecate requires two String arguments".to_owned()));
		return false;
	};

	let removed = match version_text.parse() {
		Ok(version) => effects.methodology.deprecate(&name, &version),
		Err(_) => {
			effects.log.error(&RuntimeError::ParseError { position: 0, detail: format!("invalid version '{version_text}'") });
			false
		},
	};

	match result_path {
		Some(path) => store(path, EvalResult::Owned(Value::Integer(i64::from(removed))), frame, effects.log),
		None => removed,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::log::Log;
	use crate::method::compile_method;
	use crate::methodology::Methodology;
	use crate::registry::{AgentRegistry, MessageQueue};
	use std::collections::BTreeMap;

	#[test]
	fn deprecate_removes_registered_method() {
		let log = Log::new();
		let mut methodology = Methodology::new();
		methodology.register(compile_method("echo", &"1.0.0".parse().unwrap(), "send(0, message)\n", &log).unwrap());
		let mut registry = AgentRegistry::new();
		let mut queue = MessageQueue::new();
		let mut effects = Effects::new(&mut methodology, &mut registry, &mut queue, &log, 1);
		let mut memory = Value::Map(BTreeMap::new());
		let context = Value::Map(BTreeMap::new());
		let message = Value::String(String::new());
		let mut frame = Frame::new(&mut memory, &context, &message);
		let arguments = vec![Expr::LiteralString("echo".to_owned()), Expr::LiteralString("1.0.0".to_owned())];
		assert!(evaluate(&arguments, None, &mut frame, &mut effects));
		assert!(effects.methodology.find("echo", &"1.0.0".parse().unwrap()).is_none());
	}
}
