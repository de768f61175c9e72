//! Evaluator for `if(condition, then_action, else_action)` (§4.4.3, §8 S2).
//!
//! Only the chosen branch is evaluated. A branch may be a bare expression or a
//! nested instruction (assignment, function call) executed for its side
//! effect; §4.4.10's "1 on success, 0 on failure" convention applies when a
//! nested instruction's outcome needs to be stored under `if`'s own
//! `result_path`.

use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assignment;
use crate::eval::instr_eval::assignment::store;
use crate::eval::instr_eval::{build, compile, deprecate, exit, parse, send, spawn};
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::instr::ast::{Action, FunctionKind};
use crate::value::Value;

pub fn evaluate(condition: &Expr, then_branch: &Action, else_branch: &Action, result_path: Option<&[String]>, frame: &mut Frame, effects: &mut Effects) -> bool {
	let Some(condition_result) = expr_eval::evaluate(condition, frame, effects.log) else {
		return false;
	};
	let chosen = if is_truthy(condition_result.value()) { then_branch } else { else_branch };

	let Some(chosen_result) = execute_action(chosen, frame, effects) else {
		return false;
	};

	match result_path {
		Some(path) => store(path, chosen_result, frame, effects.log),
		None => true,
	}
}

/// Runs the chosen branch. A bare expression passes its [`EvalResult`] through
/// unchanged (preserving borrowed-memory-access semantics); a nested
/// instruction executes for effect and reports success as owned Integer 1/0,
/// per §4.4.10.
fn execute_action(action: &Action, frame: &mut Frame, effects: &mut Effects) -> Option<EvalResult> {
	match action {
		Action::Expr(expression) => expr_eval::evaluate(expression, frame, effects.log),
		Action::Assignment { target_path, expression } => {
			let ok = assignment::evaluate(target_path, expression, frame, effects.log);
			Some(EvalResult::Owned(Value::Integer(i64::from(ok))))
		},
		Action::Call { kind, arguments, result_path } => {
			let result_path = result_path.as_deref();
			let ok = match kind {
				FunctionKind::Send => send::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Parse => parse::evaluate(arguments, result_path, frame, effects.log),
				FunctionKind::Build => build::evaluate(arguments, result_path, frame, effects.log),
				FunctionKind::Compile => compile::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Spawn => spawn::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Exit => exit::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Deprecate => deprecate::evaluate(arguments, result_path, frame, effects),
				FunctionKind::If => unreachable!("nested if is rejected at parse time"),
			};
			Some(EvalResult::Owned(Value::Integer(i64::from(ok))))
		},
	}
}

/// Integer 0 and the empty string are false; everything else, including
/// Double 0.0, is true (§4.4.3 names exactly these two falsy cases).
fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Integer(0) => false,
		Value::String(text) if text.is_empty() => false,
		_ => true,
	}
}
