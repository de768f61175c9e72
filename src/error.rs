//! The structured error taxonomy of the embedded language (not exception types —
//! parsers and evaluators still return `bool`/`Option` at their call boundary, per
//! the propagation policy below; this enum is what gets logged through [`crate::log::Log`]
//! so the structured kind is never lost).

use thiserror::Error;

/// One of the error kinds the interpreter can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
	#[error("parse error at byte {position}: {detail}")]
	ParseError { position: usize, detail: String },

	#[error("type mismatch: {0}")]
	TypeMismatch(String),

	#[error("division by zero")]
	DivisionByZero,

	#[error("unknown field '{0}'")]
	UnknownField(String),

	#[error("cannot assign to read-only target '{0}'")]
	ReadOnlyTarget(String),

	#[error("wrong number of arguments for '{function}': expected {expected}, got {got}")]
	ArityMismatch { function: String, expected: usize, got: usize },

	#[error("unknown method '{name}' version {version}")]
	UnknownMethod { name: String, version: String },

	#[error("unknown agent {0}")]
	UnknownAgent(i64),

	#[error("persistence file corrupt: {0}")]
	PersistenceCorruption(String),

	#[error("I/O failure: {0}")]
	IoFailure(String),

	#[error("out of memory")]
	OutOfMemory,
}

impl RuntimeError {
	/// Constructs the structured "cannot access field" message used by the
	/// expression evaluator's field-access failures.
	#[must_use]
	pub fn cannot_access_field(field: &str, on_type: &str, on_value: &str) -> Self {
		Self::TypeMismatch(format!("Cannot access field '{field}' on {on_type} value {on_value}"))
	}
}
