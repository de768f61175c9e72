//! Evaluator for `spawn(method_name, version, context)` (§4.4.7).

use crate::agent::{Agent, MethodBinding, SINK_AGENT_ID};
use crate::error::RuntimeError;
use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assignment::store;
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::value::{shallow_copy, Owned, Value};

pub fn evaluate(arguments: &[Expr], result_path: Option<&[String]>, frame: &mut Frame, effects: &mut Effects) -> bool {
	let Some(name_result) = expr_eval::evaluate(&arguments[0], frame, effects.log) else {
		return false;
	};
	let Some(version_result) = expr_eval::evaluate(&arguments[1], frame, effects.log) else {
		return false;
	};
	let Some(context_result) = expr_eval::evaluate(&arguments[2], frame, effects.log) else {
		return false;
	};

	let new_agent_id = try_spawn(name_result.into_value(), version_result.into_value(), context_result, effects);

	match result_path {
		Some(path) => store(path, EvalResult::Owned(Value::Integer(new_agent_id)), frame, effects.log),
		None => true,
	}
}

fn try_spawn(name_value: Value, version_value: Value, context_result: EvalResult, effects: &mut Effects) -> i64 {
	let method_name = match &name_value {
		Value::String(text) if !text.is_empty() => text.clone(),
		Value::String(_) | Value::Integer(0) => return SINK_AGENT_ID,
		other => {
			effects.log.error(&RuntimeError::TypeMismatch(format!("spawn method_name must be a String, got {}", other.type_name())));
			return SINK_AGENT_ID;
		},
	};

	let method = match &version_value {
		Value::String(text) if text.is_empty() || text == "0" => effects.methodology.find_latest(&method_name),
		Value::String(text) => text.parse().ok().and_then(|version| effects.methodology.find(&method_name, &version)),
		other => {
			effects.log.error(&RuntimeError::TypeMismatch(format!("spawn version must be a String, got {}", other.type_name())));
			return SINK_AGENT_ID;
		},
	};

	let Some(method) = method else {
		effects.log.error(&RuntimeError::UnknownMethod { name: method_name, version: display_version(&version_value) });
		return SINK_AGENT_ID;
	};

	let Value::Map(_) = context_result.value() else {
		effects.log.error(&RuntimeError::TypeMismatch("spawn context must be a Map".to_owned()));
		return SINK_AGENT_ID;
	};
	let Some(context_value) = context_result.materialize().and_then(|value| shallow_copy(&value)) else {
		effects.log.error(&RuntimeError::TypeMismatch("spawn context must not contain nested maps or lists".to_owned()));
		return SINK_AGENT_ID;
	};

	let binding = MethodBinding { name: method.name().to_owned(), version: method.version().clone() };
	let is_persistent = method.is_persistent();
	let new_id = effects.registry.allocate_id();
	let agent = Agent::new(new_id, binding, context_value, is_persistent);
	effects.registry.insert(agent);
	effects.queue.push(new_id, Owned::unowned(Value::String("__wake__".to_owned())));
	new_id
}

fn display_version(version_value: &Value) -> String {
	match version_value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
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
	fn spawns_agent_bound_to_latest_version_and_enqueues_wake() {
		let log = Log::new();
		let mut methodology = Methodology::new();
		methodology.register(compile_method("echo", &"1.0.0".parse().unwrap(), "send(0, message)\n", &log).unwrap());
		let mut registry = AgentRegistry::new();
		let mut queue = MessageQueue::new();
		let mut effects = Effects::new(&mut methodology, &mut registry, &mut queue, &log, 0);
		let mut memory = Value::Map(BTreeMap::new());
		let context = Value::Map(BTreeMap::new());
		let message = Value::String(String::new());
		let mut frame = Frame::new(&mut memory, &context, &message);
		let arguments = vec![Expr::LiteralString("echo".to_owned()), Expr::LiteralString(String::new()), Expr::MemoryAccess { base: crate::expr::Base::Context, path: vec![] }];
		assert!(evaluate(&arguments, None, &mut frame, &mut effects));
		assert_eq!(effects.registry.count(), 1);
		let queued = queue.pop().expect("wake message queued");
		assert_eq!(queued.target_agent_id, 1);
	}

	#[test]
	fn spawn_with_unknown_method_returns_zero() {
		let log = Log::new();
		let mut methodology = Methodology::new();
		let mut registry = AgentRegistry::new();
		let mut queue = MessageQueue::new();
		let mut effects = Effects::new(&mut methodology, &mut registry, &mut queue, &log, 0);
		let new_id = try_spawn(Value::String("missing".to_owned()), Value::String(String::new()), EvalResult::Owned(Value::Map(BTreeMap::new())), &mut effects);
		assert_eq!(new_id, 0);
	}
}
