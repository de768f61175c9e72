//! Evaluator for `send(target, message)` (§4.4.2).

use crate::agent::SINK_AGENT_ID;
use crate::error::RuntimeError;
use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assignment::store;
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::value::{Owned, Value};

pub fn evaluate(arguments: &[Expr], result_path: Option<&[String]>, frame: &mut Frame, effects: &mut Effects) -> bool {
	let Some(target_result) = expr_eval::evaluate(&arguments[0], frame, effects.log) else {
		return false;
	};
	let Some(message_result) = expr_eval::evaluate(&arguments[1], frame, effects.log) else {
		return false;
	};

	let Value::Integer(target) = target_result.into_value() else {
		effects.log.error(&RuntimeError::TypeMismatch("send target must be an Integer agent id".to_owned()));
		return false;
	};

	let success = deliver(target, message_result, effects);

	if let Some(path) = result_path {
		return store(path, EvalResult::Owned(Value::Integer(i64::from(success))), frame, effects.log);
	}
	success
}

fn deliver(target: i64, message_result: EvalResult, effects: &mut Effects) -> bool {
	if target == SINK_AGENT_ID {
		// Message is dropped unowned; §4.4.2's no-op case.
		return true;
	}
	if target != effects.self_id && !effects.registry.exists(target) {
		return false;
	}
	let Some(message_value) = message_result.materialize() else {
		effects.log.error(&RuntimeError::TypeMismatch("cannot copy message value containing a nested map or list".to_owned()));
		return false;
	};
	effects.queue.push(target, Owned::unowned(message_value));
	true
}
