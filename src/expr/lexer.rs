//! Tokenizer for expression text (§4.1).
//!
//! Single-pass, consumed eagerly into a `Vec<Token>` rather than produced lazily;
//! expressions in this language are short (one instruction argument at a time)
//! so there's no benefit to streaming.

use crate::error::RuntimeError;

/// A lexical token kind. Named by what the token looks like, not by its use in
/// the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
	Integer(i64),
	Double(f64),
	String(String),
	Identifier(String),
	Dot,
	Plus,
	Minus,
	Star,
	Slash,
	EqualEqual,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	LeftParen,
	RightParen,
	Comma,
	Eof,
}

/// A token together with the byte offset its first character was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub position: usize,
}

/// Tokenizes `source` front to back. Returns `RuntimeError::ParseError` with the
/// byte offset of the offending character for `UnterminatedString` and
/// `InvalidNumber` (per §4.1's error list; `UnexpectedToken`/`TrailingInput` are
/// detected by the parser, not the lexer, since they depend on grammar context).
pub fn tokenize(source: &str) -> Result<Vec<Token>, RuntimeError> {
	let bytes = source.as_bytes();
	let mut tokens = Vec::new();
	let mut index = 0;

	while index < bytes.len() {
		let byte = bytes[index];

		if byte.is_ascii_whitespace() {
			index += 1;
			continue;
		}

		if byte == b'#' {
			while index < bytes.len() && bytes[index] != b'\n' {
				index += 1;
			}
			continue;
		}

		let start = index;
		let kind = match byte {
			b'.' => {
				index += 1;
				TokenKind::Dot
			},
			b'+' => {
				index += 1;
				TokenKind::Plus
			},
			b'*' => {
				index += 1;
				TokenKind::Star
			},
			b'/' => {
				index += 1;
				TokenKind::Slash
			},
			b'(' => {
				index += 1;
				TokenKind::LeftParen
			},
			b')' => {
				index += 1;
				TokenKind::RightParen
			},
			b',' => {
				index += 1;
				TokenKind::Comma
			},
			b'=' if bytes.get(index + 1) == Some(&b'=') => {
				index += 2;
				TokenKind::EqualEqual
			},
			b'!' if bytes.get(index + 1) == Some(&b'=') => {
				index += 2;
				TokenKind::NotEqual
			},
			b'<' if bytes.get(index + 1) == Some(&b'=') => {
				index += 2;
				TokenKind::LessEqual
			},
			b'<' => {
				index += 1;
				TokenKind::Less
			},
			b'>' if bytes.get(index + 1) == Some(&b'=') => {
				index += 2;
				TokenKind::GreaterEqual
			},
			b'>' => {
				index += 1;
				TokenKind::Greater
			},
			b'"' => {
				let (value, next) = read_string(bytes, index)?;
				index = next;
				TokenKind::String(value)
			},
			b'-' if bytes.get(index + 1).is_some_and(u8::is_ascii_digit) && starts_value_context(tokens.last().map(|token| &token.kind)) => {
				let (kind, next) = read_number(bytes, index)?;
				index = next;
				kind
			},
			b'-' => {
				index += 1;
				TokenKind::Minus
			},
			byte if byte.is_ascii_digit() => {
				let (kind, next) = read_number(bytes, index)?;
				index = next;
				kind
			},
			byte if byte.is_ascii_alphabetic() || byte == b'_' => {
				while index < bytes.len() && (bytes[index].is_ascii_alphanumeric() || bytes[index] == b'_') {
					index += 1;
				}
				TokenKind::Identifier(source[start..index].to_owned())
			},
			other => {
				return Err(RuntimeError::ParseError { position: start, detail: format!("unexpected character '{}'", other as char) });
			},
		};

		tokens.push(Token { kind, position: start });
	}

	tokens.push(Token { kind: TokenKind::Eof, position: bytes.len() });
	Ok(tokens)
}

/// Whether a `-` immediately followed by a digit should be read as the sign of
/// a negative number literal (§4.1: "Integers are optionally signed") rather
/// than the binary subtraction operator. True at the start of the token
/// stream and right after any token that can't itself end an expression (an
/// operator, a comparison, `(`, or `,`); false right after a value or a `)`,
/// since a `-` there is subtraction, not a sign.
const fn starts_value_context(previous: Option<&TokenKind>) -> bool {
	!matches!(previous, Some(TokenKind::Integer(_) | TokenKind::Double(_) | TokenKind::String(_) | TokenKind::Identifier(_) | TokenKind::RightParen))
}

fn read_string(bytes: &[u8], start: usize) -> Result<(String, usize), RuntimeError> {
	let mut index = start + 1;
	let mut value = String::new();
	loop {
		match bytes.get(index) {
			None => return Err(RuntimeError::ParseError { position: start, detail: "unterminated string literal".to_owned() }),
			Some(b'"') => {
				index += 1;
				return Ok((value, index));
			},
			Some(b'\\') => match bytes.get(index + 1) {
				Some(b'"') => {
					value.push('"');
					index += 2;
				},
				Some(b'\\') => {
					value.push('\\');
					index += 2;
				},
				_ => return Err(RuntimeError::ParseError { position: index, detail: "invalid escape sequence".to_owned() }),
			},
			Some(&byte) => {
				value.push(byte as char);
				index += 1;
			},
		}
	}
}

fn read_number(bytes: &[u8], start: usize) -> Result<(TokenKind, usize), RuntimeError> {
	let mut index = start;
	if bytes[index] == b'-' {
		index += 1;
	}
	let digits_start = index;
	while index < bytes.len() && bytes[index].is_ascii_digit() {
		index += 1;
	}
	if index == digits_start {
		return Err(RuntimeError::ParseError { position: start, detail: "invalid number literal".to_owned() });
	}

	if bytes.get(index) == Some(&b'.') {
		index += 1;
		let fraction_start = index;
		while index < bytes.len() && bytes[index].is_ascii_digit() {
			index += 1;
		}
		if index == fraction_start {
			return Err(RuntimeError::ParseError { position: start, detail: "invalid number literal".to_owned() });
		}
		let text = std::str::from_utf8(&bytes[start..index]).unwrap_or_default();
		let value: f64 = text.parse().map_err(|_| RuntimeError::ParseError { position: start, detail: "invalid double literal".to_owned() })?;
		return Ok((TokenKind::Double(value), index));
	}

	let text = std::str::from_utf8(&bytes[start..index]).unwrap_or_default();
	let value: i64 = text.parse().map_err(|_| RuntimeError::ParseError { position: start, detail: "invalid integer literal".to_owned() })?;
	Ok((TokenKind::Integer(value), index))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenizes_arithmetic() {
		let tokens = tokenize("2 + 3 * 4").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(
			kinds,
			vec![
				TokenKind::Integer(2),
				TokenKind::Plus,
				TokenKind::Integer(3),
				TokenKind::Star,
				TokenKind::Integer(4),
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn tokenizes_memory_path() {
		let tokens = tokenize("memory.user.name").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(
			kinds,
			vec![
				TokenKind::Identifier("memory".to_owned()),
				TokenKind::Dot,
				TokenKind::Identifier("user".to_owned()),
				TokenKind::Dot,
				TokenKind::Identifier("name".to_owned()),
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn rejects_unterminated_string() {
		let error = tokenize("\"unterminated").unwrap_err();
		assert!(matches!(error, RuntimeError::ParseError { position: 0, .. }));
	}

	#[test]
	fn bare_minus_after_a_value_is_subtraction() {
		let tokens = tokenize("10 - 3").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(kinds, vec![TokenKind::Integer(10), TokenKind::Minus, TokenKind::Integer(3), TokenKind::Eof]);
	}

	#[test]
	fn minus_without_whitespace_after_a_value_is_still_subtraction() {
		let tokens = tokenize("10-3").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(kinds, vec![TokenKind::Integer(10), TokenKind::Minus, TokenKind::Integer(3), TokenKind::Eof]);
	}

	#[test]
	fn leading_minus_before_a_digit_is_a_negative_literal() {
		let tokens = tokenize("-5").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(kinds, vec![TokenKind::Integer(-5), TokenKind::Eof]);
	}

	#[test]
	fn minus_after_an_operator_is_a_negative_literal() {
		let tokens = tokenize("3 * -4").expect("valid expression");
		let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
		assert_eq!(kinds, vec![TokenKind::Integer(3), TokenKind::Star, TokenKind::Integer(-4), TokenKind::Eof]);
	}

	#[test]
	fn escapes_quotes_and_backslashes() {
		let tokens = tokenize(r#""a\"b\\c""#).expect("valid string");
		assert_eq!(tokens[0].kind, TokenKind::String("a\"b\\c".to_owned()));
	}
}
