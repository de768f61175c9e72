//! Structural-recursion expression evaluator (§4.3), grounded in
//! `original_source/modules/ar_expression_evaluator.c`'s per-node-kind
//! evaluation routines, replaced here by exhaustive matching on [`Expr`].

use crate::error::RuntimeError;
use crate::eval::frame::Frame;
use crate::expr::{Base, BinaryOperator, Expr};
use crate::log::Log;
use crate::value::{shallow_copy, Value};

/// The result of evaluating an expression: either a value freshly produced by
/// this evaluation (a literal or a binary-op result, callers are free to
/// claim it outright), or a value read out of a map (memory/context/message
/// access), which must be shallow-copied before a caller may store or send it
/// (§3.1, §4.3: "memory accesses return borrowed references... callers must
/// copy to extract").
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
	Owned(Value),
	Borrowed(Value),
}

impl EvalResult {
	#[must_use]
	pub fn into_value(self) -> Value {
		match self {
			Self::Owned(value) | Self::Borrowed(value) => value,
		}
	}

	#[must_use]
	pub fn value(&self) -> &Value {
		match self {
			Self::Owned(value) | Self::Borrowed(value) => value,
		}
	}

	/// Converts this result into a standalone [`Value`] ready to be stored or
	/// sent, applying the ownership rule of §4.4.1/§4.4.10: an owned result is
	/// taken as-is; a borrowed result must be shallow-copied, which fails for a
	/// Map/List containing nested containers.
	#[must_use]
	pub fn materialize(self) -> Option<Value> {
		match self {
			Self::Owned(value) => Some(value),
			Self::Borrowed(value) => shallow_copy(&value),
		}
	}
}

/// Evaluates `expr` against `frame`, logging and returning `None` on failure.
pub fn evaluate(expr: &Expr, frame: &Frame, log: &Log) -> Option<EvalResult> {
	match expr {
		Expr::LiteralInt(value) => Some(EvalResult::Owned(Value::Integer(*value))),
		Expr::LiteralDouble(value) => Some(EvalResult::Owned(Value::Double(*value))),
		Expr::LiteralString(value) => Some(EvalResult::Owned(Value::String(value.clone()))),
		Expr::MemoryAccess { base, path } => evaluate_memory_access(*base, path, frame, log),
		Expr::BinaryOp { operator, left, right } => evaluate_binary_op(*operator, left, right, frame, log),
	}
}

fn evaluate_memory_access(base: Base, path: &[String], frame: &Frame, log: &Log) -> Option<EvalResult> {
	let mut current: &Value = match base {
		Base::Memory => &*frame.memory,
		Base::Context => frame.context,
		Base::Message => frame.message,
	};

	for (index, field) in path.iter().enumerate() {
		match current {
			Value::Map(map) => match map.get(field) {
				Some(next) => current = next,
				None => {
					log.error(&RuntimeError::UnknownField(path[..=index].join(".")));
					return None;
				},
			},
			other => {
				log.error(&RuntimeError::cannot_access_field(field, other.type_name(), &other.to_string()));
				return None;
			},
		}
	}

	Some(EvalResult::Borrowed(current.clone()))
}

fn evaluate_binary_op(operator: BinaryOperator, left: &Expr, right: &Expr, frame: &Frame, log: &Log) -> Option<EvalResult> {
	let left_value = evaluate(left, frame, log)?.into_value();
	let right_value = evaluate(right, frame, log)?.into_value();

	let result = match (&left_value, &right_value) {
		(Value::Integer(left), Value::Integer(right)) => evaluate_integer_op(operator, *left, *right, log)?,
		(Value::String(left), Value::String(right)) => evaluate_string_op(operator, left, right, log)?,
		(left, right) if left.type_name() == "Integer" || left.type_name() == "Double" => {
			if right.type_name() != "Integer" && right.type_name() != "Double" {
				log.error(&RuntimeError::TypeMismatch(format!("cannot apply {operator:?} to {} and {}", left.type_name(), right.type_name())));
				return None;
			}
			evaluate_double_op(operator, as_double(left), as_double(right), log)?
		},
		(left, right) => {
			log.error(&RuntimeError::TypeMismatch(format!("cannot apply {operator:?} to {} and {}", left.type_name(), right.type_name())));
			return None;
		},
	};

	Some(EvalResult::Owned(result))
}

fn as_double(value: &Value) -> f64 {
	match value {
		Value::Integer(integer) => *integer as f64,
		Value::Double(double) => *double,
		_ => unreachable!("caller already checked numeric type"),
	}
}

fn evaluate_integer_op(operator: BinaryOperator, left: i64, right: i64, log: &Log) -> Option<Value> {
	use BinaryOperator::{Add, Divide, Equal, GreaterOrEqual, GreaterThan, LessOrEqual, LessThan, Multiply, NotEqual, Subtract};

	let value = match operator {
		Add => Value::Integer(left.wrapping_add(right)),
		Subtract => Value::Integer(left.wrapping_sub(right)),
		Multiply => Value::Integer(left.wrapping_mul(right)),
		Divide => match left.checked_div(right) {
			Some(quotient) => Value::Integer(quotient),
			None => {
				log.error(&RuntimeError::DivisionByZero);
				return None;
			},
		},
		Equal => Value::Integer(i64::from(left == right)),
		NotEqual => Value::Integer(i64::from(left != right)),
		LessThan => Value::Integer(i64::from(left < right)),
		LessOrEqual => Value::Integer(i64::from(left <= right)),
		GreaterThan => Value::Integer(i64::from(left > right)),
		GreaterOrEqual => Value::Integer(i64::from(left >= right)),
	};
	Some(value)
}

fn evaluate_double_op(operator: BinaryOperator, left: f64, right: f64, log: &Log) -> Option<Value> {
	use BinaryOperator::{Add, Divide, Equal, GreaterOrEqual, GreaterThan, LessOrEqual, LessThan, Multiply, NotEqual, Subtract};

	let value = if operator.is_comparison() {
		let result = match operator {
			Equal => left == right,
			NotEqual => left != right,
			LessThan => left < right,
			LessOrEqual => left <= right,
			GreaterThan => left > right,
			GreaterOrEqual => left >= right,
			_ => unreachable!("arithmetic operators are handled below"),
		};
		Value::Integer(i64::from(result))
	} else {
		match operator {
			Add => Value::Double(left + right),
			Subtract => Value::Double(left - right),
			Multiply => Value::Double(left * right),
			Divide => {
				if right == 0.0 {
					log.error(&RuntimeError::DivisionByZero);
					return None;
				}
				Value::Double(left / right)
			},
			_ => unreachable!("comparison operators are handled above"),
		}
	};
	Some(value)
}

fn evaluate_string_op(operator: BinaryOperator, left: &str, right: &str, log: &Log) -> Option<Value> {
	use BinaryOperator::{Add, Equal, NotEqual};

	match operator {
		Add => Some(Value::String(format!("{left}{right}"))),
		Equal => Some(Value::Integer(i64::from(left == right))),
		NotEqual => Some(Value::Integer(i64::from(left != right))),
		_ => {
			log.error(&RuntimeError::TypeMismatch(format!("operator {operator:?} is not defined for strings")));
			None
		},
	}
}
