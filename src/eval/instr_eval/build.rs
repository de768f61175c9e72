//! Evaluator for `build(template, values)` (§4.4.5).

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
	let Some(values_result) = expr_eval::evaluate(&arguments[1], frame, log) else {
		return false;
	};

	let Value::String(template) = template_result.into_value() else {
		log.error(&RuntimeError::TypeMismatch("build requires a String template".to_owned()));
		return false;
	};
	let Value::Map(values) = values_result.into_value() else {
		log.error(&RuntimeError::TypeMismatch("build requires a Map of values".to_owned()));
		return false;
	};

	let Some(built) = build_template(&template, &values, log) else {
		return false;
	};

	match result_path {
		Some(path) => store(path, EvalResult::Owned(Value::String(built)), frame, log),
		None => true,
	}
}

/// Replaces each `{name}` placeholder with the string form of `values[name]`.
/// A missing key leaves the placeholder text unchanged. Maps and Lists may
/// not be interpolated (`TypeMismatch`).
fn build_template(template: &str, values: &std::collections::BTreeMap<String, Value>, log: &Log) -> Option<String> {
	let mut output = String::new();
	let mut chars = template.chars().peekable();

	while let Some(character) = chars.next() {
		if character != '{' {
			output.push(character);
			continue;
		}
		let mut name = String::new();
		let mut closed = false;
		for next in chars.by_ref() {
			if next == '}' {
				closed = true;
				break;
			}
			name.push(next);
		}
		if !closed {
			output.push('{');
			output.push_str(&name);
			continue;
		}
		match values.get(&name) {
			Some(Value::Map(_) | Value::List(_)) => {
				log.error(&RuntimeError::TypeMismatch(format!("build cannot interpolate a Map/List value for '{name}'")));
				return None;
			},
			Some(value) => output.push_str(&format_interpolated(value)),
			None => {
				output.push('{');
				output.push_str(&name);
				output.push('}');
			},
		}
	}

	Some(output)
}

/// Formats a scalar for interpolation into a built string (§4.4.5: "Integer:
/// decimal; Double: shortest round-trip decimal; String: as-is"). `Value`'s
/// own `Display` impl is not reused for `Double` here: Rust's default `f64`
/// formatting drops the decimal point for a whole number (`3.0` prints as
/// `"3"`), which `parse`'s auto-typing (§4.4.4) would then read back as an
/// Integer, not a Double — breaking the build/parse round trip.
fn format_interpolated(value: &Value) -> String {
	match value {
		Value::Double(double) => {
			let text = double.to_string();
			if text.contains('.') { text } else { format!("{text}.0") }
		},
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	#[test]
	fn substitutes_known_keys() {
		let log = Log::new();
		let mut values = BTreeMap::new();
		values.insert("count".to_owned(), Value::Integer(3));
		let built = build_template("Count: {count}", &values, &log).expect("builds");
		assert_eq!(built, "Count: 3");
	}

	#[test]
	fn whole_number_double_keeps_its_decimal_point() {
		let log = Log::new();
		let mut values = BTreeMap::new();
		values.insert("ratio".to_owned(), Value::Double(3.0));
		let built = build_template("Ratio: {ratio}", &values, &log).expect("builds");
		assert_eq!(built, "Ratio: 3.0", "a whole-number Double must stay distinguishable from an Integer for parse() to round-trip it");
	}

	#[test]
	fn fractional_double_is_unaffected() {
		let log = Log::new();
		let mut values = BTreeMap::new();
		values.insert("ratio".to_owned(), Value::Double(0.5));
		let built = build_template("Ratio: {ratio}", &values, &log).expect("builds");
		assert_eq!(built, "Ratio: 0.5");
	}

	#[test]
	fn leaves_missing_keys_as_placeholder_text() {
		let log = Log::new();
		let values = BTreeMap::new();
		let built = build_template("Hi {name}", &values, &log).expect("builds");
		assert_eq!(built, "Hi {name}");
	}

	#[test]
	fn rejects_nested_container_values() {
		let log = Log::new();
		let mut values = BTreeMap::new();
		values.insert("nested".to_owned(), Value::Map(BTreeMap::new()));
		assert!(build_template("{nested}", &values, &log).is_none());
	}
}
