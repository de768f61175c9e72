//! One evaluator per instruction form (§4.4), dispatched by
//! [`super::method_eval`]. Mirrors the `instr::forms` parser layout.

pub mod assignment;
pub mod build;
pub mod compile;
pub mod deprecate;
pub mod exit;
pub mod if_form;
pub mod parse;
pub mod send;
pub mod spawn;

use std::collections::BTreeMap;

use crate::value::Value;

/// Writes `new_value` at `path` inside `memory`, creating intermediate maps
/// for missing keys. Fails if an intermediate path segment is already a
/// non-map scalar, or if `memory` itself is not a Map, or if `path` is empty.
pub(super) fn assign_path(memory: &mut Value, path: &[String], new_value: Value) -> bool {
	let Value::Map(map) = memory else {
		return false;
	};
	assign_path_in_map(map, path, new_value)
}

fn assign_path_in_map(map: &mut BTreeMap<String, Value>, path: &[String], new_value: Value) -> bool {
	match path {
		[] => false,
		[last] => {
			map.insert(last.clone(), new_value);
			true
		},
		[head, rest @ ..] => match map.entry(head.clone()).or_insert_with(|| Value::Map(BTreeMap::new())) {
			Value::Map(inner) => assign_path_in_map(inner, rest, new_value),
			_ => false,
		},
	}
}
