//! Recursive-descent expression parser (§4.1).
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! comparison := additive (('==' | '!=' | '<' | '<=' | '>' | '>=') additive)*
//! additive   := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary      := literal | memory-access | '(' comparison ')'
//! ```
//!
//! The grammar has no unary minus; a leading `-` is only valid as part of a
//! numeric literal (consumed by the lexer), matching §4.1's "integers are
//! optionally signed decimals".

use crate::error::RuntimeError;
use crate::expr::ast::{Base, BinaryOperator, Expr};
use crate::expr::lexer::{tokenize, Token, TokenKind};

/// Parses a complete expression from source text. Fails with `TrailingInput` if
/// tokens remain after a complete expression is parsed.
pub fn parse_expression(source: &str) -> Result<Expr, RuntimeError> {
	let tokens = tokenize(source)?;
	let mut cursor = Cursor { tokens: &tokens, position: 0 };
	let expression = parse_comparison(&mut cursor)?;
	if !matches!(cursor.peek().kind, TokenKind::Eof) {
		return Err(RuntimeError::ParseError { position: cursor.peek().position, detail: "trailing input after expression".to_owned() });
	}
	Ok(expression)
}

struct Cursor<'tokens> {
	tokens: &'tokens [Token],
	position: usize,
}

impl<'tokens> Cursor<'tokens> {
	fn peek(&self) -> &'tokens Token {
		&self.tokens[self.position]
	}

	fn advance(&mut self) -> &'tokens Token {
		let token = &self.tokens[self.position];
		if self.position + 1 < self.tokens.len() {
			self.position += 1;
		}
		token
	}
}

fn parse_comparison(cursor: &mut Cursor<'_>) -> Result<Expr, RuntimeError> {
	let mut left = parse_additive(cursor)?;
	loop {
		let operator = match cursor.peek().kind {
			TokenKind::EqualEqual => BinaryOperator::Equal,
			TokenKind::NotEqual => BinaryOperator::NotEqual,
			TokenKind::Less => BinaryOperator::LessThan,
			TokenKind::LessEqual => BinaryOperator::LessOrEqual,
			TokenKind::Greater => BinaryOperator::GreaterThan,
			TokenKind::GreaterEqual => BinaryOperator::GreaterOrEqual,
			_ => break,
		};
		cursor.advance();
		let right = parse_additive(cursor)?;
		left = Expr::BinaryOp { operator, left: Box::new(left), right: Box::new(right) };
	}
	Ok(left)
}

fn parse_additive(cursor: &mut Cursor<'_>) -> Result<Expr, RuntimeError> {
	let mut left = parse_multiplicative(cursor)?;
	loop {
		let operator = match cursor.peek().kind {
			TokenKind::Plus => BinaryOperator::Add,
			TokenKind::Minus => BinaryOperator::Subtract,
			_ => break,
		};
		cursor.advance();
		let right = parse_multiplicative(cursor)?;
		left = Expr::BinaryOp { operator, left: Box::new(left), right: Box::new(right) };
	}
	Ok(left)
}

fn parse_multiplicative(cursor: &mut Cursor<'_>) -> Result<Expr, RuntimeError> {
	let mut left = parse_primary(cursor)?;
	loop {
		let operator = match cursor.peek().kind {
			TokenKind::Star => BinaryOperator::Multiply,
			TokenKind::Slash => BinaryOperator::Divide,
			_ => break,
		};
		cursor.advance();
		let right = parse_primary(cursor)?;
		left = Expr::BinaryOp { operator, left: Box::new(left), right: Box::new(right) };
	}
	Ok(left)
}

fn parse_primary(cursor: &mut Cursor<'_>) -> Result<Expr, RuntimeError> {
	let token = cursor.peek().clone();
	match token.kind {
		TokenKind::Integer(value) => {
			cursor.advance();
			Ok(Expr::LiteralInt(value))
		},
		TokenKind::Double(value) => {
			cursor.advance();
			Ok(Expr::LiteralDouble(value))
		},
		TokenKind::String(value) => {
			cursor.advance();
			Ok(Expr::LiteralString(value))
		},
		TokenKind::LeftParen => {
			cursor.advance();
			let inner = parse_comparison(cursor)?;
			match cursor.peek().kind {
				TokenKind::RightParen => {
					cursor.advance();
					Ok(inner)
				},
				_ => Err(RuntimeError::ParseError { position: cursor.peek().position, detail: "expected ')'".to_owned() }),
			}
		},
		TokenKind::Identifier(name) => {
			cursor.advance();
			let Some(base) = Base::from_name(&name) else {
				return Err(RuntimeError::ParseError { position: token.position, detail: format!("unknown memory base '{name}'") });
			};
			let mut path = Vec::new();
			while matches!(cursor.peek().kind, TokenKind::Dot) {
				cursor.advance();
				let TokenKind::Identifier(field) = cursor.peek().kind.clone() else {
					return Err(RuntimeError::ParseError { position: cursor.peek().position, detail: "expected field name after '.'".to_owned() });
				};
				cursor.advance();
				path.push(field);
			}
			Ok(Expr::MemoryAccess { base, path })
		},
		_ => Err(RuntimeError::ParseError { position: token.position, detail: "unexpected token".to_owned() }),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn precedence_is_multiplicative_over_additive() {
		let expression = parse_expression("2 + 3 * 4").expect("valid expression");
		assert_eq!(
			expression,
			Expr::BinaryOp {
				operator: BinaryOperator::Add,
				left: Box::new(Expr::LiteralInt(2)),
				right: Box::new(Expr::BinaryOp {
					operator: BinaryOperator::Multiply,
					left: Box::new(Expr::LiteralInt(3)),
					right: Box::new(Expr::LiteralInt(4)),
				}),
			}
		);
	}

	#[test]
	fn parses_memory_access_path() {
		let expression = parse_expression("memory.user.name").expect("valid expression");
		assert_eq!(expression, Expr::MemoryAccess { base: Base::Memory, path: vec!["user".to_owned(), "name".to_owned()] });
	}

	#[test]
	fn rejects_unknown_base() {
		let error = parse_expression("foo.bar").unwrap_err();
		assert!(matches!(error, RuntimeError::ParseError { .. }));
	}

	#[test]
	fn rejects_trailing_input() {
		let error = parse_expression("1 2").unwrap_err();
		assert!(matches!(error, RuntimeError::ParseError { .. }));
	}

	#[test]
	fn left_associative_subtraction() {
		let expression = parse_expression("10 - 3 - 2").expect("valid expression");
		assert_eq!(
			expression,
			Expr::BinaryOp {
				operator: BinaryOperator::Subtract,
				left: Box::new(Expr::BinaryOp {
					operator: BinaryOperator::Subtract,
					left: Box::new(Expr::LiteralInt(10)),
					right: Box::new(Expr::LiteralInt(3)),
				}),
				right: Box::new(Expr::LiteralInt(2)),
			}
		);
	}
}
