//! Evaluator for `exit(agent_id)` (§4.4.8).

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
	let Value::Integer(target) = target_result.into_value() else {
		effects.log.error(&RuntimeError::TypeMismatch("exit requires an Integer agent id".to_owned()));
		return false;
	};

	let existed = request_exit(target, effects);

	match result_path {
		Some(path) => store(path, EvalResult::Owned(Value::Integer(i64::from(existed))), frame, effects.log),
		None => existed,
	}
}

/// Marks the target agent draining and queues its final `"__sleep__"`
/// message. The executing agent itself isn't reachable through `registry`
/// (the interpreter holds it out for the duration of this step), so
/// self-targeted exit is recorded on `effects.self_exit` and applied by the
/// interpreter once the step finishes.
fn request_exit(target: i64, effects: &mut Effects) -> bool {
	if target == effects.self_id {
		effects.self_exit = true;
		effects.queue.push(target, Owned::unowned(Value::String("__sleep__".to_owned())));
		return true;
	}
	let Some(agent) = effects.registry.get_mut(target) else {
		return false;
	};
	agent.deactivate();
	effects.queue.push(target, Owned::unowned(Value::String("__sleep__".to_owned())));
	true
}
