//! Quote-respecting plain-text scanning helpers shared by the instruction dispatch
//! facade and its argument splitter.

use crate::instr::ast::FunctionKind;

/// Finds the byte offset of the first unquoted occurrence of `needle` in `text`,
/// skipping over `"..."` string literals (with `\"` and `\\` escapes) so that a
/// `:=` or `(` appearing inside a string literal argument is never mistaken for
/// syntax.
#[must_use]
pub fn find_unquoted(text: &str, needle: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	let needle_bytes = needle.as_bytes();
	let mut index = 0;
	let mut in_string = false;

	while index < bytes.len() {
		if in_string {
			match bytes[index] {
				b'\\' => index += 2,
				b'"' => {
					in_string = false;
					index += 1;
				},
				_ => index += 1,
			}
			continue;
		}

		if bytes[index] == b'"' {
			in_string = true;
			index += 1;
			continue;
		}

		if bytes[index..].starts_with(needle_bytes) {
			return Some(index);
		}
		index += 1;
	}
	None
}

/// Splits the interior of a parenthesized argument list on top-level commas,
/// respecting string quoting and nested parens (so a `send(a, build("x", y))`
/// argument's inner comma does not split the outer list).
#[must_use]
pub fn split_top_level_commas(text: &str) -> Vec<String> {
	let trimmed = text.trim();
	if trimmed.is_empty() {
		return Vec::new();
	}

	let bytes = trimmed.as_bytes();
	let mut arguments = Vec::new();
	let mut depth = 0_i32;
	let mut in_string = false;
	let mut start = 0;
	let mut index = 0;

	while index < bytes.len() {
		if in_string {
			match bytes[index] {
				b'\\' => index += 2,
				b'"' => {
					in_string = false;
					index += 1;
				},
				_ => index += 1,
			}
			continue;
		}

		match bytes[index] {
			b'"' => {
				in_string = true;
				index += 1;
			},
			b'(' => {
				depth += 1;
				index += 1;
			},
			b')' => {
				depth -= 1;
				index += 1;
			},
			b',' if depth == 0 => {
				arguments.push(trimmed[start..index].trim().to_owned());
				index += 1;
				start = index;
			},
			_ => index += 1,
		}
	}
	arguments.push(trimmed[start..].trim().to_owned());
	arguments
}

/// Splits `"name(raw, args)"` text into the recognized function kind and its raw
/// argument substrings. Returns `None` if there's no unquoted `(` at all, or the
/// text before it isn't a known function name, or the call isn't properly
/// closed with a trailing `)`. Shared by the top-level dispatch facade and by
/// `if`'s nested branch-action parser.
#[must_use]
pub(crate) fn split_call(text: &str) -> Option<(FunctionKind, Vec<String>)> {
	let open = find_unquoted(text, "(")?;
	let name = text[..open].trim();
	let kind = FunctionKind::from_name(name)?;
	let closing = text.trim_end();
	if !closing.ends_with(')') {
		return None;
	}
	let inside = &closing[open + 1..closing.len() - 1];
	Some((kind, split_top_level_commas(inside)))
}
