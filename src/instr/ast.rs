//! Instruction AST definitions (§3.3).

use crate::expr::Expr;

/// Which built-in function a `FunctionCall` instruction invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FunctionKind {
	Send,
	If,
	Parse,
	Build,
	Compile,
	Spawn,
	Exit,
	Deprecate,
}

impl FunctionKind {
	/// The exact number of arguments this function form accepts (§4.2: "each
	/// function parser enforces its exact arity").
	#[must_use]
	pub const fn arity(self) -> usize {
		match self {
			Self::Send => 2,
			Self::If => 3,
			Self::Parse | Self::Build => 2,
			Self::Compile => 3,
			Self::Spawn => 3,
			Self::Exit => 1,
			Self::Deprecate => 2,
		}
	}

	/// Matches a function name against the eight recognized kinds.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		use strum::IntoEnumIterator as _;
		Self::iter().find(|kind| kind.to_string() == name)
	}
}

/// A single parsed instruction. Both raw source text (for diagnostics) and the
/// pre-parsed expression ASTs of every argument are kept, per §3.3.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
	Assignment {
		/// The `memory.`-rooted path being assigned to, without the `memory.` prefix.
		target_path: Vec<String>,
		expression: Expr,
		raw_expression: String,
	},
	FunctionCall {
		kind: FunctionKind,
		arguments: Vec<Expr>,
		raw_arguments: Vec<String>,
		/// Present when the call appears on the right of `:=`.
		result_path: Option<Vec<String>>,
	},
	/// `if(cond, then_action, else_action)`. Worked examples (§8 S2) use full
	/// instructions — assignments, nested calls — as branches, not bare
	/// expressions, so each branch is itself parsed recursively as an [`Action`].
	If {
		condition: Expr,
		raw_condition: String,
		then_branch: Action,
		else_branch: Action,
		/// Present when the call appears on the right of `:=`.
		result_path: Option<Vec<String>>,
	},
}

/// One `if` branch: either a bare expression or a nested instruction (assignment
/// or function call) executed for its side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
	Expr(Expr),
	Assignment {
		target_path: Vec<String>,
		expression: Expr,
	},
	Call {
		kind: FunctionKind,
		arguments: Vec<Expr>,
		result_path: Option<Vec<String>>,
	},
}
