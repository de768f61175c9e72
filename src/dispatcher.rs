//! The top-level orchestrator (§4.7): owns the method registry, the agent
//! registry, the message queue, and the log, and exposes the public API
//! everything else in this crate is built to serve.

use std::collections::BTreeMap;
use std::path::Path;

use semver::Version;

use crate::agent::{Agent, MethodBinding, SINK_AGENT_ID};
use crate::error::RuntimeError;
use crate::eval::interpreter;
use crate::log::Log;
use crate::method::Method;
use crate::methodology::Methodology;
use crate::persistence;
use crate::registry::{AgentRegistry, MessageQueue};
use crate::value::{Owned, Value};

/// The default on-disk filenames named in §6.3.
pub const DEFAULT_METHODS_FILE: &str = "methodology.agerun";
pub const DEFAULT_AGENTS_FILE: &str = "agency.agerun";

/// Wraps the reserved `"__wake__"` system message.
fn wake() -> Owned {
	Owned::unowned(Value::String("__wake__".to_owned()))
}

/// Owns every process-wide mutable structure named in §3.6 and drives agents
/// through it. There are no process-wide globals (REDESIGN FLAGS: "Shared
/// mutable registries... should be owned by the Dispatcher object").
#[derive(Debug, Default)]
pub struct Dispatcher {
	methodology: Methodology,
	registry: AgentRegistry,
	queue: MessageQueue,
	log: Log,
}

impl Dispatcher {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub const fn log(&self) -> &Log {
		&self.log
	}

	#[must_use]
	pub const fn methodology(&self) -> &Methodology {
		&self.methodology
	}

	/// Registers a pre-compiled method directly, bypassing `compile()` —
	/// used by the CLI to seed the initial method before `init()`.
	pub fn register_method(&mut self, method: Method) {
		self.methodology.register(method);
	}

	/// Spawns one agent bound to `(method_name, version)` — exact version if
	/// given, otherwise the latest registered version — and enqueues
	/// `"__wake__"` to it. Returns `None` if no matching method is registered.
	pub fn init(&mut self, method_name: &str, version: Option<&Version>) -> Option<i64> {
		let method = match version {
			Some(version) => self.methodology.find(method_name, version),
			None => self.methodology.find_latest(method_name),
		}?;
		let binding = MethodBinding { name: method.name().to_owned(), version: method.version().clone() };
		let is_persistent = method.is_persistent();
		let id = self.registry.allocate_id();
		let agent = Agent::new(id, binding, Value::Map(BTreeMap::new()), is_persistent);
		self.registry.insert(agent);
		self.queue.push(id, wake());
		Some(id)
	}

	/// Enqueues `value` for `agent_id`. Succeeds unconditionally for the sink
	/// agent (id 0); for any other id, succeeds only if that agent is
	/// currently registered (§4.7, §5: "a message sent to a destroyed agent
	/// fails").
	pub fn send(&mut self, agent_id: i64, value: Value) -> bool {
		if agent_id == SINK_AGENT_ID {
			return true;
		}
		if !self.registry.exists(agent_id) {
			return false;
		}
		self.queue.push(agent_id, Owned::unowned(value));
		true
	}

	/// Dequeues at most one message and, if its target agent is still
	/// registered, runs the interpreter on it. A draining (inactive) agent
	/// still receives and processes its queued messages — it is only
	/// destroyed once its last message has been delivered (§4.7: "a message
	/// sent to a draining agent is accepted and still delivered before
	/// destruction"). Returns `true` if a message was dequeued, regardless of
	/// whether its target still existed — an empty queue is the only `false`
	/// case (§4.7).
	pub fn step(&mut self) -> bool {
		let Some(queued) = self.queue.pop() else {
			return false;
		};
		let target_id = queued.target_agent_id;

		let Some(mut agent) = self.registry.remove(target_id) else {
			// Target was destroyed between enqueue and dequeue; the message
			// is simply dropped — this is not itself a failure of `step`.
			return true;
		};

		let message = queued.message.into_value();
		interpreter::run(&mut agent, &message, &mut self.methodology, &mut self.registry, &mut self.queue, &self.log);

		self.registry.insert(agent);
		self.reap_if_drained(target_id);
		true
	}

	/// Destroys `id` once it is both inactive and has nothing left addressed
	/// to it in the global queue. The agent's own inbox is never the source
	/// of truth here — the queue is the single shared FIFO (§3.6) — so
	/// draining can't be decided from the agent alone.
	fn reap_if_drained(&mut self, id: i64) {
		let drained = self.registry.get(id).is_some_and(|agent| !agent.is_active()) && !self.queue.pending_for(id);
		if drained {
			self.registry.remove(id);
		}
	}

	/// Repeats `step()` until the queue is empty. A step may itself enqueue
	/// further messages (`__wake__`/`__sleep__`, or user `send`s); those are
	/// processed in the same run, so this is a fixpoint over FIFO order.
	pub fn run_until_quiet(&mut self) -> usize {
		let mut processed = 0;
		while self.step() {
			processed += 1;
		}
		processed
	}

	#[must_use]
	pub fn count_agents(&self) -> usize {
		self.registry.count()
	}

	#[must_use]
	pub fn agent_exists(&self, id: i64) -> bool {
		self.registry.exists(id)
	}

	/// Returns the memory map of `id`, for inspection (tests, CLI `send`).
	#[must_use]
	pub fn agent_memory(&self, id: i64) -> Option<&Value> {
		self.registry.get(id).map(Agent::memory)
	}

	/// Marks every registered agent inactive, enqueuing a final `"__sleep__"`
	/// to each and letting one more `run_until_quiet` drain them — mirrors
	/// `exit()`'s cooperative shutdown path (§4.4.8) rather than discarding
	/// agents outright, for every *persistent* agent; non-persistent agents
	/// are dropped immediately since nothing will ever reload them.
	///
	/// This is distinct from `shutdown()`, which discards the queue instead
	/// (§4.7); `drain_all` is a convenience some CLI flows use before saving.
	pub fn drain_all(&mut self) {
		let ids: Vec<i64> = self.registry.ids().collect();
		for id in ids {
			if let Some(agent) = self.registry.get_mut(id) {
				agent.deactivate();
			}
			self.queue.push(id, Owned::unowned(Value::String("__sleep__".to_owned())));
		}
		self.run_until_quiet();
	}

	/// Drains the queue by discarding remaining messages, destroys every
	/// agent without further ticks, and clears the registries (§4.7). Saving
	/// beforehand is the caller's responsibility.
	pub fn shutdown(&mut self) {
		self.queue.clear();
		self.registry.clear();
	}

	/// Writes every registered method to `path`, atomically (§6.3).
	///
	/// # Errors
	/// Returns [`RuntimeError::IoFailure`] if the write fails.
	pub fn save_methods(&self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
		persistence::save_methods(path, self.methodology.all_methods())
	}

	/// Replays a methods file into this dispatcher's `Methodology`, in the
	/// order methods were written (§6.3: "earlier versions exist before later
	/// ones that reference them").
	///
	/// # Errors
	/// Returns [`RuntimeError::PersistenceCorruption`] for a malformed file,
	/// or [`RuntimeError::IoFailure`] if the file can't be read, restoring
	/// from the file's `.bak` companion on corruption per §6.3.
	pub fn load_methods(&mut self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
		let loaded = persistence::load_methods(path, &self.log)?;
		for method in loaded {
			self.methodology.register(method);
		}
		Ok(())
	}

	/// Writes every persistent agent to `path` (§6.3); non-persistent agents
	/// are skipped.
	///
	/// # Errors
	/// Returns [`RuntimeError::IoFailure`] if the write fails.
	pub fn save_agents(&self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
		persistence::save_agents(path, self.registry.iter())
	}

	/// Replays an agents file, rebuilding each agent and advancing the id
	/// allocator past the maximum observed id (§6.3).
	///
	/// # Errors
	/// Returns [`RuntimeError::PersistenceCorruption`] for a malformed file
	/// or an agent bound to an unregistered method, or
	/// [`RuntimeError::IoFailure`] if the file can't be read.
	pub fn load_agents(&mut self, path: impl AsRef<Path>) -> Result<(), RuntimeError> {
		let loaded = persistence::load_agents(path)?;
		for agent in loaded {
			if self.methodology.find(&agent.method().name, &agent.method().version).is_none() {
				return Err(RuntimeError::PersistenceCorruption(format!(
					"agent {} is bound to unregistered method '{}' v{}",
					agent.id(),
					agent.method().name,
					agent.method().version
				)));
			}
			self.registry.observe_loaded_id(agent.id());
			self.registry.insert(agent);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::method::compile_method;

	fn dispatcher_with(name: &str, source: &str) -> Dispatcher {
		let mut dispatcher = Dispatcher::new();
		let method = compile_method(name, &Version::new(1, 0, 0), source, dispatcher.log()).expect("valid method");
		dispatcher.register_method(method);
		dispatcher
	}

	#[test]
	fn init_spawns_one_agent_and_enqueues_wake() {
		let mut dispatcher = dispatcher_with("echo", "send(0, message)\n");
		let id = dispatcher.init("echo", None).expect("method exists");
		assert_eq!(id, 1);
		assert_eq!(dispatcher.count_agents(), 1);
	}

	#[test]
	fn init_on_unknown_method_returns_none() {
		let mut dispatcher = Dispatcher::new();
		assert!(dispatcher.init("missing", None).is_none());
	}

	#[test]
	fn scenario_s1_echo_agent_processes_wake_then_hi() {
		let mut dispatcher = dispatcher_with("echo", "send(0, message)\n");
		let agent_id = dispatcher.init("echo", None).expect("method exists");
		assert_eq!(dispatcher.run_until_quiet(), 1);
		assert!(dispatcher.send(agent_id, Value::String("hi".to_owned())));
		assert_eq!(dispatcher.run_until_quiet(), 1);
	}

	#[test]
	fn scenario_s2_counter_tracks_three_increments() {
		// The "get" branch here is §8 S2's `send(0, build(...))` split
		// into two instructions, since a function call's arguments are plain
		// expressions (§6.1) and build(...) is not one.
		let source = "if(message == \"__wake__\", memory.count := 0, \"\")\n\
			if(message == \"inc\", memory.count := memory.count + 1, \"\")\n\
			if(message == \"get\", memory.reply := build(\"Count: {count}\", memory), \"\")\n\
			if(message == \"get\", send(0, memory.reply), \"\")\n";
		let mut dispatcher = dispatcher_with("counter", source);
		let agent_id = dispatcher.init("counter", None).expect("method exists");
		assert_eq!(dispatcher.run_until_quiet(), 1);
		for _ in 0..3 {
			dispatcher.send(agent_id, Value::String("inc".to_owned()));
		}
		assert_eq!(dispatcher.run_until_quiet(), 3);
		let Value::Map(memory) = dispatcher.agent_memory(agent_id).expect("agent exists") else { unreachable!() };
		assert_eq!(memory.get("count"), Some(&Value::Integer(3)));
	}

	#[test]
	fn run_until_quiet_on_empty_queue_is_idempotent() {
		let mut dispatcher = Dispatcher::new();
		assert_eq!(dispatcher.run_until_quiet(), 0);
		assert_eq!(dispatcher.count_agents(), 0);
	}

	#[test]
	fn agent_exists_reflects_registry_and_sink() {
		let mut dispatcher = dispatcher_with("echo", "send(0, message)\n");
		let id = dispatcher.init("echo", None).expect("method exists");
		assert!(dispatcher.agent_exists(id));
		assert!(dispatcher.agent_exists(SINK_AGENT_ID));
		assert!(!dispatcher.agent_exists(id + 1));
	}

	#[test]
	fn send_to_nonexistent_agent_fails() {
		let mut dispatcher = Dispatcher::new();
		assert!(!dispatcher.send(42, Value::Integer(1)));
	}

	#[test]
	fn send_to_sink_always_succeeds() {
		let mut dispatcher = Dispatcher::new();
		assert!(dispatcher.send(SINK_AGENT_ID, Value::Integer(1)));
	}

	#[test]
	fn shutdown_clears_registries_and_queue() {
		let mut dispatcher = dispatcher_with("echo", "send(0, message)\n");
		dispatcher.init("echo", None);
		dispatcher.shutdown();
		assert_eq!(dispatcher.count_agents(), 0);
		assert!(!dispatcher.step());
	}

	#[test]
	fn exit_drains_self_and_agent_is_reaped() {
		let mut dispatcher = dispatcher_with("dying", "if(message == \"__wake__\", exit(context.self_id), \"\")\n");
		let binding_method = dispatcher.methodology.find("dying", &Version::new(1, 0, 0)).expect("registered").clone();
		dispatcher.registry.insert(Agent::new(1, MethodBinding { name: binding_method.name().to_owned(), version: binding_method.version().clone() }, {
			let mut context = BTreeMap::new();
			context.insert("self_id".to_owned(), Value::Integer(1));
			Value::Map(context)
		}, true));
		dispatcher.registry.observe_loaded_id(1);
		dispatcher.queue.push(1, wake());
		assert_eq!(dispatcher.run_until_quiet(), 2);
		assert_eq!(dispatcher.count_agents(), 0);
	}
}
