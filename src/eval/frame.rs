//! An execution frame: mutable memory, immutable context, immutable incoming
//! message (§4.3).

use crate::value::Value;

/// The three maps every expression and instruction evaluates against.
///
/// `memory` is the only field a method may mutate; `context` is fixed at
/// agent creation and `message` is the value currently being delivered.
pub struct Frame<'a> {
	pub memory: &'a mut Value,
	pub context: &'a Value,
	pub message: &'a Value,
}

impl<'a> Frame<'a> {
	#[must_use]
	pub fn new(memory: &'a mut Value, context: &'a Value, message: &'a Value) -> Self {
		Self { memory, context, message }
	}
}
