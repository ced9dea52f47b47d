//! Compiled expression tree.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Axis {
	Child,
	Descendant,
	DescendantOrSelf,
	SelfAxis,
	Parent,
	Ancestor,
	AncestorOrSelf,
	Attribute,
}

impl Axis {
	pub fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"child" => Self::Child,
			"descendant" => Self::Descendant,
			"descendant-or-self" => Self::DescendantOrSelf,
			"self" => Self::SelfAxis,
			"parent" => Self::Parent,
			"ancestor" => Self::Ancestor,
			"ancestor-or-self" => Self::AncestorOrSelf,
			"attribute" => Self::Attribute,
			_ => return None,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum NodeTest {
	Name(String),
	/// `*`: any node of the axis' principal type.
	Wildcard,
	/// `node()`: any node at all.
	AnyNode,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Step {
	pub axis: Axis,
	pub test: NodeTest,
	pub predicates: Vec<Expr>,
}

impl Step {
	/// The step `//` abbreviates.
	pub fn descendant_or_self() -> Self {
		Self {
			axis: Axis::DescendantOrSelf,
			test: NodeTest::AnyNode,
			predicates: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BinaryOp {
	Or,
	And,
	Eq,
	Neq,
	Lt,
	Le,
	Gt,
	Ge,
	Add,
	Sub,
}

impl BinaryOp {
	pub fn symbol(self) -> &'static str {
		match self {
			Self::Or => "or",
			Self::And => "and",
			Self::Eq => "=",
			Self::Neq => "!=",
			Self::Lt => "<",
			Self::Le => "<=",
			Self::Gt => ">",
			Self::Ge => ">=",
			Self::Add => "+",
			Self::Sub => "-",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
	/// Location path; absolute paths start at the document node.
	Path { absolute: bool, steps: Vec<Step> },
	/// Primary expression with predicates, optionally continued by a path.
	Filter {
		primary: Box<Expr>,
		predicates: Vec<Expr>,
		steps: Vec<Step>,
	},
	Binary(BinaryOp, Box<Expr>, Box<Expr>),
	Negate(Box<Expr>),
	Union(Box<Expr>, Box<Expr>),
	Literal(String),
	Number(f64),
	Variable(String),
	Call { name: String, args: Vec<Expr> },
}

impl Expr {
	/// Calls `f` with this expression and every subexpression, including step
	/// predicates, in source order.
	pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
		f(self);
		match self {
			Self::Path { steps, .. } => walk_steps(steps, f),
			Self::Filter {
				primary,
				predicates,
				steps,
			} => {
				primary.walk(f);
				for predicate in predicates {
					predicate.walk(f);
				}
				walk_steps(steps, f);
			}
			Self::Binary(_, lhs, rhs) | Self::Union(lhs, rhs) => {
				lhs.walk(f);
				rhs.walk(f);
			}
			Self::Negate(inner) => inner.walk(f),
			Self::Call { args, .. } => {
				for arg in args {
					arg.walk(f);
				}
			}
			Self::Literal(_) | Self::Number(_) | Self::Variable(_) => {}
		}
	}
}

fn walk_steps<'a>(steps: &'a [Step], f: &mut impl FnMut(&'a Expr)) {
	for step in steps {
		for predicate in &step.predicates {
			predicate.walk(f);
		}
	}
}
