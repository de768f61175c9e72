//! The dispatcher-level state an instruction evaluator may reach beyond its
//! own [`super::frame::Frame`]: the method registry, the agent registry, the
//! global message queue, and the log.
//!
//! The currently executing agent is not reachable through `registry` — the
//! interpreter removes it before evaluation so its memory can be borrowed
//! mutably through the frame at the same time. An `exit()` targeting the
//! executing agent itself therefore can't go through `registry`; it is
//! recorded in `self_exit` and applied by the interpreter after the step.

use crate::log::Log;
use crate::methodology::Methodology;
use crate::registry::{AgentRegistry, MessageQueue};

pub struct Effects<'a> {
	pub methodology: &'a mut Methodology,
	pub registry: &'a mut AgentRegistry,
	pub queue: &'a mut MessageQueue,
	pub log: &'a Log,
	pub self_id: i64,
	pub self_exit: bool,
}

impl<'a> Effects<'a> {
	#[must_use]
	pub fn new(methodology: &'a mut Methodology, registry: &'a mut AgentRegistry, queue: &'a mut MessageQueue, log: &'a Log, self_id: i64) -> Self {
		Self { methodology, registry, queue, log, self_id, self_exit: false }
	}
}
