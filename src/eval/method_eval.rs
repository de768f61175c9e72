//! Executes a [`Method`]'s instruction list against a frame (§4.5).

use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::{assignment, build, compile, deprecate, exit, if_form, parse, send, spawn};
use crate::instr::{FunctionKind, Instruction};
use crate::method::Method;

/// Runs every instruction of `method` against `frame` in order. Stops at the
/// first failing instruction and logs its index; a method is stateless, so
/// multiple agents may share the same `Method` reference.
pub fn evaluate(method: &Method, frame: &mut Frame, effects: &mut Effects) -> bool {
	for (index, instruction) in method.instructions().iter().enumerate() {
		if !evaluate_instruction(instruction, frame, effects) {
			effects.log.warning(format!("method '{}' v{} failed at instruction {index}", method.name(), method.version()));
			return false;
		}
	}
	true
}

fn evaluate_instruction(instruction: &Instruction, frame: &mut Frame, effects: &mut Effects) -> bool {
	match instruction {
		Instruction::Assignment { target_path, expression, .. } => assignment::evaluate(target_path, expression, frame, effects.log),
		Instruction::If { condition, then_branch, else_branch, result_path, .. } => {
			if_form::evaluate(condition, then_branch, else_branch, result_path.as_deref(), frame, effects)
		},
		Instruction::FunctionCall { kind, arguments, result_path, .. } => {
			let result_path = result_path.as_deref();
			match kind {
				FunctionKind::Send => send::evaluate(arguments, result_path, frame, effects),
				FunctionKind::If => unreachable!("if is always parsed into Instruction::If"),
				FunctionKind::Parse => parse::evaluate(arguments, result_path, frame, effects.log),
				FunctionKind::Build => build::evaluate(arguments, result_path, frame, effects.log),
				FunctionKind::Compile => compile::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Spawn => spawn::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Exit => exit::evaluate(arguments, result_path, frame, effects),
				FunctionKind::Deprecate => deprecate::evaluate(arguments, result_path, frame, effects),
			}
		},
	}
}
