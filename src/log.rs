//! A minimal structured event log.
//!
//! §1 lists "a line-buffered event log" as an external collaborator, out of
//! scope for this crate's core. But every parser and evaluator in §4 holds a
//! reference to one and calls into it on failure, so a narrow, real
//! implementation lives here rather than a stub: it buffers up to ten events and
//! flushes (printing through `colored`) on overflow or teardown. Rotation,
//! querying, and persistence of the log itself remain out of scope.

use chrono::{DateTime, Utc};
use colored::Colorize as _;
use std::cell::RefCell;

use crate::error::RuntimeError;

/// How serious a logged event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Error,
	Warning,
	Info,
}

impl Severity {
	const fn label(self) -> &'static str {
		match self {
			Self::Error => "ERROR",
			Self::Warning => "WARNING",
			Self::Info => "INFO",
		}
	}
}

/// One entry in the event log.
#[derive(Debug, Clone)]
pub struct LogEvent {
	pub timestamp: DateTime<Utc>,
	pub severity: Severity,
	pub message: String,
	pub position: Option<usize>,
}

impl LogEvent {
	fn print(&self) {
		let label = match self.severity {
			Severity::Error => self.severity.label().red().bold(),
			Severity::Warning => self.severity.label().yellow().bold(),
			Severity::Info => self.severity.label().blue().bold(),
		};
		let position = self.position.map(|byte| format!(" @{byte}")).unwrap_or_default();
		eprintln!("{} [{}{}] {}", self.timestamp.to_rfc3339(), label, position, self.message);
	}
}

/// Buffers up to ten [`LogEvent`]s and flushes them on the eleventh push or on drop.
///
/// A `RefCell` is used rather than threading `&mut Log` through every evaluator
/// call, since the log is logically a passive observer shared by many read-only
/// borrows of the frame it's attached to; the runtime is single-threaded, so a
/// `RefCell` (rather than a `Mutex`) is the right tool, per §5.
pub struct Log {
	buffer: RefCell<Vec<LogEvent>>,
}

const BUFFER_CAPACITY: usize = 10;

impl Log {
	#[must_use]
	pub fn new() -> Self {
		Self { buffer: RefCell::new(Vec::with_capacity(BUFFER_CAPACITY)) }
	}

	fn push(&self, severity: Severity, message: String, position: Option<usize>) {
		let event = LogEvent { timestamp: Utc::now(), severity, message, position };
		let mut buffer = self.buffer.borrow_mut();
		buffer.push(event);
		if buffer.len() >= BUFFER_CAPACITY {
			Self::flush_locked(&mut buffer);
		}
	}

	/// Logs an error produced by a parser, at the byte offset the failure was detected.
	pub fn error_at(&self, error: &RuntimeError, position: usize) {
		self.push(Severity::Error, error.to_string(), Some(position));
	}

	/// Logs an error, threading through the byte position already carried by a
	/// [`RuntimeError::ParseError`] (§4.1: "position is the byte offset where
	/// the failure was detected") so callers holding one don't have to
	/// destructure it themselves before choosing between this and
	/// [`Log::error_at`]. Errors without an inherent position are logged with
	/// none, as most evaluator failures are (most evaluator failures are not
	/// byte-addressed — they fail against an already-parsed AST).
	pub fn error(&self, error: &RuntimeError) {
		match error {
			RuntimeError::ParseError { position, .. } => self.error_at(error, *position),
			_ => self.push(Severity::Error, error.to_string(), None),
		}
	}

	pub fn warning(&self, message: impl Into<String>) {
		self.push(Severity::Warning, message.into(), None);
	}

	pub fn info(&self, message: impl Into<String>) {
		self.push(Severity::Info, message.into(), None);
	}

	/// Prints and clears every buffered event.
	pub fn flush(&self) {
		let mut buffer = self.buffer.borrow_mut();
		Self::flush_locked(&mut buffer);
	}

	fn flush_locked(buffer: &mut Vec<LogEvent>) {
		for event in buffer.drain(..) {
			event.print();
		}
	}

	/// Returns the most recent buffered event at or above the given severity, if any.
	/// Lets library embedders "query the last error of each severity", per §7.
	#[must_use]
	pub fn last_at_severity(&self, severity: Severity) -> Option<LogEvent> {
		self.buffer.borrow().iter().rev().find(|event| event.severity == severity).cloned()
	}
}

impl Default for Log {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Log {
	fn drop(&mut self) {
		self.flush();
	}
}
