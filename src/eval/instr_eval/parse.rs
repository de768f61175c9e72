//! Evaluator for `parse(template, input)` (§4.4.4).

use std::collections::BTreeMap;

use crate::error::RuntimeError;
use crate::eval::frame::Frame;
use crate::eval::instr_eval::assignment::store;
use crate::eval::{expr_eval, EvalResult};
use crate::expr::Expr;
use crate::log::Log;
use crate::value::Value;

pub fn evaluate(arguments: &[Expr], result_path: Option<&[String]>, frame: &mut Frame, log: &Log) -> bool {
	let Some(template_result) = expr_eval::evaluate(&arguments[0], frame, log) else {
		return false;
	};
	let Some(input_result) = expr_eval::evaluate(&arguments[1], frame, log) else {
		return false;
	};

	let (Value::String(template), Value::String(input)) = (template_result.into_value(), input_result.into_value()) else {
		log.error(&RuntimeError::TypeMismatch("parse requires two String arguments".to_owned()));
		return false;
	};

	let captured = Value::Map(parse_template(&template, &input));

	match result_path {
		Some(path) => store(path, EvalResult::Owned(captured), frame, log),
		None => true,
	}
}

/// Matches `input` against `template`'s literal segments and `{name}`
/// placeholders, left to right. Each placeholder captures the text up to the
/// next literal segment (or end of input for a trailing placeholder).
/// Captured text is auto-typed: a pure decimal integer becomes Integer, a
/// decimal containing `.` becomes Double, otherwise it stays a String. A
/// non-matching template yields an empty map, not a failure.
fn parse_template(template: &str, input: &str) -> BTreeMap<String, Value> {
	let segments = split_template(template);
	let mut captures = BTreeMap::new();
	let mut cursor = input;

	for (index, segment) in segments.iter().enumerate() {
		match segment {
			Segment::Literal(text) => {
				let Some(rest) = cursor.strip_prefix(text.as_str()) else {
					return BTreeMap::new();
				};
				cursor = rest;
			},
			Segment::Placeholder(name) => {
				let next_literal = segments[index + 1..].iter().find_map(|segment| match segment {
					Segment::Literal(text) if !text.is_empty() => Some(text.as_str()),
					_ => None,
				});
				let (captured, rest) = match next_literal {
					Some(literal) => match cursor.find(literal) {
						Some(position) => (&cursor[..position], &cursor[position..]),
						None => return BTreeMap::new(),
					},
					None => (cursor, ""),
				};
				captures.insert(name.clone(), auto_type(captured));
				cursor = rest;
			},
		}
	}

	captures
}

enum Segment {
	Literal(String),
	Placeholder(String),
}

fn split_template(template: &str) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut chars = template.chars().peekable();

	while let Some(character) = chars.next() {
		if character == '{' {
			if !literal.is_empty() {
				segments.push(Segment::Literal(std::mem::take(&mut literal)));
			}
			let mut name = String::new();
			for next in chars.by_ref() {
				if next == '}' {
					break;
				}
				name.push(next);
			}
			segments.push(Segment::Placeholder(name));
		} else {
			literal.push(character);
		}
	}
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	segments
}

fn auto_type(text: &str) -> Value {
	if let Ok(integer) = text.parse::<i64>() {
		return Value::Integer(integer);
	}
	if text.contains('.') {
		if let Ok(double) = text.parse::<f64>() {
			return Value::Double(double);
		}
	}
	Value::String(text.to_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn captures_typed_placeholders() {
		let captures = parse_template("user={u}, age={a}", "user=alice, age=30");
		assert_eq!(captures.get("u"), Some(&Value::String("alice".to_owned())));
		assert_eq!(captures.get("a"), Some(&Value::Integer(30)));
	}

	#[test]
	fn non_matching_template_yields_empty_map() {
		let captures = parse_template("user={u}", "nope");
		assert!(captures.is_empty());
	}

	#[test]
	fn trailing_placeholder_captures_remainder() {
		let captures = parse_template("name: {n}", "name: rest of input");
		assert_eq!(captures.get("n"), Some(&Value::String("rest of input".to_owned())));
	}
}
