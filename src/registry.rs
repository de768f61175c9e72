//! The agent registry and the global message queue (§3.6).

use std::collections::{BTreeMap, VecDeque};

use crate::agent::{Agent, SINK_AGENT_ID};
use crate::value::Owned;

/// id → [`Agent`], with a monotonically increasing id allocator. Iteration
/// order is stable by id (`BTreeMap` gives this for free).
#[derive(Debug, Default)]
pub struct AgentRegistry {
	agents: BTreeMap<i64, Agent>,
	next_id: i64,
}

impl AgentRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self { agents: BTreeMap::new(), next_id: 1 }
	}

	/// Allocates the next agent id without registering anything yet.
	pub fn allocate_id(&mut self) -> i64 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}

	/// Advances the allocator so ids never collide with a freshly loaded
	/// agent's id (§6.3 load: "id-allocator advancement").
	pub fn observe_loaded_id(&mut self, id: i64) {
		if id >= self.next_id {
			self.next_id = id + 1;
		}
	}

	pub fn insert(&mut self, agent: Agent) {
		self.agents.insert(agent.id(), agent);
	}

	/// Removes and returns the agent with `id`, if registered. Used by the
	/// interpreter to take sole ownership of the executing agent's memory for
	/// the duration of one step, since a `&mut Agent` borrowed from inside the
	/// registry can't coexist with a `&mut AgentRegistry` passed to the same
	/// step for `spawn`/`exit`/`send` to reach every *other* agent.
	pub fn remove(&mut self, id: i64) -> Option<Agent> {
		self.agents.remove(&id)
	}

	#[must_use]
	pub fn get(&self, id: i64) -> Option<&Agent> {
		self.agents.get(&id)
	}

	pub fn get_mut(&mut self, id: i64) -> Option<&mut Agent> {
		self.agents.get_mut(&id)
	}

	#[must_use]
	pub fn exists(&self, id: i64) -> bool {
		id == SINK_AGENT_ID || self.agents.contains_key(&id)
	}

	#[must_use]
	pub fn count(&self) -> usize {
		self.agents.len()
	}

	/// Ids of every registered agent, in stable ascending order.
	pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
		self.agents.keys().copied()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Agent> {
		self.agents.values()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
		self.agents.values_mut()
	}

	/// Clears every agent, discarding them (shutdown, §4.7).
	pub fn clear(&mut self) {
		self.agents.clear();
	}
}

/// One entry in the global FIFO: the target agent id and the owned message
/// value travelling to it. `target_agent_id == SINK_AGENT_ID` entries are
/// never actually enqueued (§4.4.2); this type only represents messages that
/// made it into the queue.
#[derive(Debug)]
pub struct QueuedMessage {
	pub target_agent_id: i64,
	pub message: Owned,
}

/// The dispatcher's single global FIFO. Only the dispatcher dequeues from it.
#[derive(Debug, Default)]
pub struct MessageQueue {
	queue: VecDeque<QueuedMessage>,
}

impl MessageQueue {
	#[must_use]
	pub fn new() -> Self {
		Self { queue: VecDeque::new() }
	}

	pub fn push(&mut self, target_agent_id: i64, message: Owned) {
		self.queue.push_back(QueuedMessage { target_agent_id, message });
	}

	pub fn pop(&mut self) -> Option<QueuedMessage> {
		self.queue.pop_front()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Whether any still-queued entry targets `id`. The dispatcher uses this to
	/// decide when a draining agent has truly seen its last message, since the
	/// global FIFO — not any single agent's own inbox — is the source of truth
	/// for what's still pending delivery (§3.6, §4.7).
	#[must_use]
	pub fn pending_for(&self, id: i64) -> bool {
		self.queue.iter().any(|queued| queued.target_agent_id == id)
	}

	/// Discards every queued message (shutdown, §4.7): nothing further is
	/// delivered, and `__sleep__` is not synthesized for these drops.
	pub fn clear(&mut self) {
		self.queue.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::agent::MethodBinding;
	use crate::value::Value;
	use semver::Version;
	use std::collections::BTreeMap as Map;

	fn binding() -> MethodBinding {
		MethodBinding { name: "echo".to_owned(), version: Version::new(1, 0, 0) }
	}

	#[test]
	fn allocate_id_is_monotonic() {
		let mut registry = AgentRegistry::new();
		assert_eq!(registry.allocate_id(), 1);
		assert_eq!(registry.allocate_id(), 2);
	}

	#[test]
	fn observe_loaded_id_advances_allocator_past_collisions() {
		let mut registry = AgentRegistry::new();
		registry.observe_loaded_id(7);
		assert_eq!(registry.allocate_id(), 8);
	}

	#[test]
	fn sink_agent_always_exists() {
		let registry = AgentRegistry::new();
		assert!(registry.exists(SINK_AGENT_ID));
	}

	#[test]
	fn get_mut_reflects_deactivate() {
		let mut registry = AgentRegistry::new();
		registry.insert(Agent::new(1, binding(), Value::Map(Map::new()), true));
		registry.get_mut(1).expect("agent is registered").deactivate();
		assert!(!registry.get(1).expect("still registered").is_active());
	}

	#[test]
	fn pending_for_reflects_remaining_targets() {
		let mut queue = MessageQueue::new();
		queue.push(1, Owned::unowned(Value::Integer(1)));
		assert!(queue.pending_for(1));
		assert!(!queue.pending_for(2));
		queue.pop();
		assert!(!queue.pending_for(1));
	}

	#[test]
	fn message_queue_is_fifo() {
		let mut queue = MessageQueue::new();
		queue.push(1, Owned::unowned(Value::Integer(1)));
		queue.push(2, Owned::unowned(Value::Integer(2)));
		let first = queue.pop().expect("first message");
		assert_eq!(first.target_agent_id, 1);
		let second = queue.pop().expect("second message");
		assert_eq!(second.target_agent_id, 2);
		assert!(queue.pop().is_none());
	}
}
