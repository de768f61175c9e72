//! The runtime's dynamically-typed data atom.
//!
//! Every [`Value`] carries an [`Owner`] marker instead of a raw pointer back to
//! whichever component currently holds it. This is the idiomatic replacement for
//! the hand-rolled ownership bookkeeping in the original interpreter: rather than
//! a component manually tracking "do I own this heap cell", the marker is a plain
//! field checked by the four methods below, and the borrow checker still enforces
//! that a `&mut Value` can't be mutated through two places at once.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque identity of whichever component currently owns a [`Value`].
///
/// This stands in for the original interpreter's raw pointer-to-owner; two
/// `OwnerId`s are equal only if they were constructed from the same owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
	/// Builds an owner id from an arbitrary discriminant. Callers typically pass
	/// an agent id, or a small constant for singleton owners like the dispatcher.
	#[must_use]
	pub const fn new(discriminant: u64) -> Self {
		Self(discriminant)
	}

	/// The owner id used for values currently held by the dispatcher's message queue.
	pub const DISPATCHER: Self = Self::new(0);
}

impl fmt::Display for OwnerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "owner#{}", self.0)
	}
}

/// The dynamically-typed sum this language's values are built from.
///
/// Maps preserve no required key order (a `BTreeMap` is used only for
/// deterministic iteration in tests and persistence, not because order is
/// meaningful); lists are plain ordered vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Integer(i64),
	Double(f64),
	String(String),
	Map(BTreeMap<String, Value>),
	List(Vec<Value>),
}

impl Value {
	/// Returns a human-readable type name, used in diagnostic messages such as
	/// "Cannot access field 'x' on Integer value 5".
	#[must_use]
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::Integer(_) => "Integer",
			Self::Double(_) => "Double",
			Self::String(_) => "String",
			Self::Map(_) => "Map",
			Self::List(_) => "List",
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Integer(integer) => write!(f, "{integer}"),
			Self::Double(double) => write!(f, "{double}"),
			Self::String(string) => write!(f, "{string}"),
			Self::Map(_) => write!(f, "<map>"),
			Self::List(_) => write!(f, "<list>"),
		}
	}
}

/// A [`Value`] paired with whoever currently owns it, or `None` if it is unowned.
///
/// This is the unit of ownership transfer described by §3.1: a value is either
/// owned by exactly one party or unowned. Values that are *borrowed references*
/// into a container (the result of a memory access) are represented separately
/// by [`crate::eval::expr_eval::EvalResult::Borrowed`]; `Owned` only tracks values
/// that a component is free to move, store, or destroy.
#[derive(Debug, Clone, PartialEq)]
pub struct Owned {
	value: Value,
	owner: Option<OwnerId>,
}

impl Owned {
	/// Wraps a value as currently unowned.
	#[must_use]
	pub const fn unowned(value: Value) -> Self {
		Self { value, owner: None }
	}

	/// Wraps a value as already owned by `owner`.
	#[must_use]
	pub const fn owned_by(value: Value, owner: OwnerId) -> Self {
		Self { value, owner: Some(owner) }
	}

	#[must_use]
	pub const fn value(&self) -> &Value {
		&self.value
	}

	/// Mutable access to the wrapped value, regardless of current ownership.
	/// Safe to expose unconditionally: reaching a `&mut Owned` already proves
	/// exclusive access, independent of the ownership marker it carries.
	#[must_use]
	pub fn value_mut(&mut self) -> &mut Value {
		&mut self.value
	}

	#[must_use]
	pub fn into_value(self) -> Value {
		self.value
	}

	#[must_use]
	pub const fn owner(&self) -> Option<OwnerId> {
		self.owner
	}

	/// Succeeds iff this value is currently unowned; on success it becomes owned by `who`.
	pub fn take_ownership(&mut self, who: OwnerId) -> bool {
		if self.owner.is_some() {
			return false;
		}
		self.owner = Some(who);
		true
	}

	/// Succeeds iff this value is owned by `who`; on success it becomes unowned.
	pub fn drop_ownership(&mut self, who: OwnerId) -> bool {
		if self.owner != Some(who) {
			return false;
		}
		self.owner = None;
		true
	}

	/// If unowned, takes ownership for `who` in place. If already owned, produces a
	/// shallow, unowned copy instead of mutating `self` (deep copy is deliberately
	/// not provided: a `Map`/`List` that itself contains a nested `Map`/`List` cannot
	/// be shallow-copied and this returns `None`).
	#[must_use]
	pub fn claim_or_copy(&mut self, who: OwnerId) -> Option<Owned> {
		if self.take_ownership(who) {
			return Some(Self::owned_by(self.value.clone(), who));
		}
		shallow_copy(&self.value).map(Owned::unowned)
	}

	/// No-op unless this value is owned by `who`, in which case it is dropped.
	pub fn destroy_if_owned(&mut self, who: OwnerId) {
		if self.owner == Some(who) {
			self.owner = None;
		}
	}
}

/// Shallow-copies a value; fails (returns `None`) for `Map`/`List` values that
/// contain a nested `Map` or `List`, per §3.1's "deep copy is deliberately not
/// provided".
#[must_use]
pub fn shallow_copy(value: &Value) -> Option<Value> {
	match value {
		Value::Integer(_) | Value::Double(_) | Value::String(_) => Some(value.clone()),
		Value::Map(map) => {
			if map.values().any(is_container) {
				None
			} else {
				Some(Value::Map(map.clone()))
			}
		},
		Value::List(list) => {
			if list.iter().any(is_container) {
				None
			} else {
				Some(Value::List(list.clone()))
			}
		},
	}
}

const fn is_container(value: &Value) -> bool {
	matches!(value, Value::Map(_) | Value::List(_))
}
