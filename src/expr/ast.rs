//! Expression AST node definitions (§3.2).

/// The reserved root an expression's memory access is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Base {
	Memory,
	Context,
	Message,
}

impl Base {
	/// Matches a reserved root name, returning `None` for anything else (§4.1:
	/// `UnknownBase`).
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		use strum::IntoEnumIterator as _;
		Self::iter().find(|base| base.to_string() == name)
	}
}

/// The six comparison and four arithmetic binary operators the language supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
	Add,
	Subtract,
	Multiply,
	Divide,
	Equal,
	NotEqual,
	LessThan,
	LessOrEqual,
	GreaterThan,
	GreaterOrEqual,
}

impl BinaryOperator {
	#[must_use]
	pub const fn is_comparison(self) -> bool {
		matches!(self, Self::Equal | Self::NotEqual | Self::LessThan | Self::LessOrEqual | Self::GreaterThan | Self::GreaterOrEqual)
	}

	/// Multiplicative operators bind tighter than additive, which bind tighter
	/// than comparison; all operators are left-associative (§4.1).
	#[must_use]
	pub const fn precedence(self) -> u8 {
		match self {
			Self::Multiply | Self::Divide => 2,
			Self::Add | Self::Subtract => 1,
			Self::Equal | Self::NotEqual | Self::LessThan | Self::LessOrEqual | Self::GreaterThan | Self::GreaterOrEqual => 0,
		}
	}
}

/// A parsed expression. Immutable once constructed; parents own their children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	LiteralInt(i64),
	LiteralDouble(f64),
	LiteralString(String),
	MemoryAccess { base: Base, path: Vec<String> },
	BinaryOp { operator: BinaryOperator, left: Box<Expr>, right: Box<Expr> },
}
