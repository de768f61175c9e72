//! A single agent: its private memory, fixed context, and lifecycle flags
//! (§3.5).
//!
//! §3.5 describes each agent as owning its own inbox FIFO, but this crate
//! realizes that inbox as the subset of the dispatcher's single global
//! [`crate::registry::MessageQueue`] addressed to this agent's id, rather
//! than a second, separate per-agent queue — see `Dispatcher::reap_if_drained`
//! for why the global queue, not a per-agent structure, is the source of
//! truth for "has this agent's inbox drained".

use std::collections::BTreeMap;

use semver::Version;

use crate::value::{Owned, OwnerId, Value};

/// Agent id 0 is the reserved no-op sink: `send(0, …)` always succeeds and
/// never enqueues.
pub const SINK_AGENT_ID: i64 = 0;

/// Which name+version a [`crate::method::Method`] is bound to, kept alongside
/// the agent rather than borrowing the `Method` itself so an agent survives a
/// `deprecate()` of its own method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
	pub name: String,
	pub version: Version,
}

/// One running (or draining) agent.
#[derive(Debug)]
pub struct Agent {
	id: i64,
	method: MethodBinding,
	memory: Owned,
	context: Owned,
	is_persistent: bool,
	is_active: bool,
}

impl Agent {
	/// Builds a freshly spawned agent: empty memory, the given fixed context,
	/// and `is_active = true`.
	#[must_use]
	pub fn new(id: i64, method: MethodBinding, context: Value, is_persistent: bool) -> Self {
		let owner = OwnerId::new(id as u64);
		Self {
			id,
			method,
			memory: Owned::owned_by(Value::Map(BTreeMap::new()), owner),
			context: Owned::owned_by(context, owner),
			is_persistent,
			is_active: true,
		}
	}

	/// Rebuilds an agent from persisted state (§6.3 load), with an explicit
	/// memory map rather than starting from empty.
	#[must_use]
	pub fn from_persisted(id: i64, method: MethodBinding, memory: BTreeMap<String, Value>, context: BTreeMap<String, Value>) -> Self {
		let owner = OwnerId::new(id as u64);
		Self {
			id,
			method,
			memory: Owned::owned_by(Value::Map(memory), owner),
			context: Owned::owned_by(Value::Map(context), owner),
			is_persistent: true,
			is_active: true,
		}
	}

	#[must_use]
	pub const fn id(&self) -> i64 {
		self.id
	}

	#[must_use]
	pub const fn method(&self) -> &MethodBinding {
		&self.method
	}

	#[must_use]
	pub const fn memory(&self) -> &Value {
		self.memory.value()
	}

	#[must_use]
	pub fn memory_mut(&mut self) -> &mut Value {
		self.memory.value_mut()
	}

	#[must_use]
	pub const fn context(&self) -> &Value {
		self.context.value()
	}

	#[must_use]
	pub const fn is_persistent(&self) -> bool {
		self.is_persistent
	}

	#[must_use]
	pub const fn is_active(&self) -> bool {
		self.is_active
	}

	/// Marks the agent for draining: it stops accepting new work once its
	/// current inbox has been exhausted (§4.4.8, §4.7).
	pub fn deactivate(&mut self) {
		self.is_active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn binding() -> MethodBinding {
		MethodBinding { name: "echo".to_owned(), version: Version::new(1, 0, 0) }
	}

	#[test]
	fn new_agent_starts_active_with_empty_memory() {
		let agent = Agent::new(1, binding(), Value::Map(BTreeMap::new()), true);
		assert!(agent.is_active());
		assert_eq!(agent.memory(), &Value::Map(BTreeMap::new()));
	}

	#[test]
	fn deactivate_turns_off_is_active() {
		let mut agent = Agent::new(1, binding(), Value::Map(BTreeMap::new()), true);
		agent.deactivate();
		assert!(!agent.is_active());
	}
}
