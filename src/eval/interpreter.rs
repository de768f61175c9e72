//! Per-agent driver (§4.6): builds one frame from an agent and an incoming
//! message, then runs the method evaluator against it. Does not own the
//! agent or the registries — the dispatcher does, and removes the agent from
//! the registry for the duration of the call so its memory can be borrowed
//! mutably alongside `&mut AgentRegistry` for the other agents.

use crate::agent::Agent;
use crate::error::RuntimeError;
use crate::eval::effects::Effects;
use crate::eval::frame::Frame;
use crate::eval::method_eval;
use crate::log::Log;
use crate::methodology::Methodology;
use crate::registry::{AgentRegistry, MessageQueue};
use crate::value::Value;

/// Runs `agent`'s bound method against `message`. Returns `true` if the
/// method ran to completion without a failing instruction; `false` if the
/// bound method version no longer resolves, or execution failed partway.
pub fn run(agent: &mut Agent, message: &Value, methodology: &mut Methodology, registry: &mut AgentRegistry, queue: &mut MessageQueue, log: &Log) -> bool {
	let self_id = agent.id();
	let binding = agent.method().clone();
	let Some(method) = methodology.resolve_bound(&binding.name, &binding.version).cloned() else {
		log.error(&RuntimeError::UnknownMethod { name: binding.name, version: binding.version.to_string() });
		return false;
	};

	let context = agent.context().clone();
	let memory = agent.memory_mut();
	let mut frame = Frame::new(memory, &context, message);
	let mut effects = Effects::new(methodology, registry, queue, log, self_id);

	let success = method_eval::evaluate(&method, &mut frame, &mut effects);
	if effects.self_exit {
		agent.deactivate();
	}
	success
}
