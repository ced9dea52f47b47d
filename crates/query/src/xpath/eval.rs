//! Tree-walking evaluation of compiled expressions.
//!
//! Node sequences are kept sorted in document order without duplicates. The
//! virtual document node sits above the tree root so that `/Root` and
//! `//Kind` address the root the way rule authors expect.

use std::cell::RefCell;
use std::cmp::Ordering;

use quarry_tree::{AttrValue, NodeIdx, SyntaxTree};
use regex::Regex;
use rustc_hash::FxHashMap;

use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use crate::dialect::XPathVersion;
use crate::engine::{Properties, QueryError, QueryErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Item {
	Document,
	Node(NodeIdx),
	/// Attribute of a node, by index.
	Attr(NodeIdx, usize),
}

impl Item {
	fn order_key(self) -> (u8, usize, usize) {
		match self {
			Self::Document => (0, 0, 0),
			Self::Node(n) => (1, n.get(), 0),
			Self::Attr(n, i) => (1, n.get(), i + 1),
		}
	}
}

impl Ord for Item {
	fn cmp(&self, other: &Self) -> Ordering {
		self.order_key().cmp(&other.order_key())
	}
}

impl PartialOrd for Item {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Value {
	Nodes(Vec<Item>),
	Str(String),
	Num(f64),
	Bool(bool),
}

/// Atomized operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
enum Atom {
	/// Text of a node: takes the type of the other operand.
	Untyped(String),
	Str(String),
	Num(f64),
	Bool(bool),
}

impl Atom {
	fn type_name(&self) -> &'static str {
		match self {
			Self::Untyped(_) => "xs:untypedAtomic",
			Self::Str(_) => "xs:string",
			Self::Num(n) if n.fract() == 0.0 => "xs:integer",
			Self::Num(_) => "xs:double",
			Self::Bool(_) => "xs:boolean",
		}
	}

	fn as_str(&self) -> String {
		match self {
			Self::Untyped(s) | Self::Str(s) => s.clone(),
			Self::Num(n) => format_number(*n),
			Self::Bool(b) => b.to_string(),
		}
	}

	fn as_num(&self) -> f64 {
		match self {
			Self::Untyped(s) | Self::Str(s) => parse_number(s),
			Self::Num(n) => *n,
			Self::Bool(b) => f64::from(u8::from(*b)),
		}
	}

	fn as_bool(&self) -> bool {
		match self {
			Self::Untyped(s) | Self::Str(s) => !s.is_empty(),
			Self::Num(n) => *n != 0.0 && !n.is_nan(),
			Self::Bool(b) => *b,
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Context {
	pub item: Item,
	pub position: usize,
	pub size: usize,
}

pub(super) struct Evaluator<'a> {
	pub(super) tree: &'a SyntaxTree,
	pub(super) version: XPathVersion,
	variables: FxHashMap<&'a str, Value>,
	regexes: RefCell<FxHashMap<String, Regex>>,
}

impl<'a> Evaluator<'a> {
	pub fn new(tree: &'a SyntaxTree, version: XPathVersion, properties: &'a Properties) -> Self {
		let variables = properties
			.iter()
			.map(|(name, value)| (name.as_str(), property_value(value)))
			.collect();
		Self {
			tree,
			version,
			variables,
			regexes: RefCell::default(),
		}
	}

	/// Rejects unbound variables and unavailable functions before anything
	/// is evaluated.
	pub fn check_static(&self, expr: &Expr) -> Result<(), QueryError> {
		let mut first_error = None;
		expr.walk(&mut |e| {
			if first_error.is_some() {
				return;
			}
			first_error = match e {
				Expr::Variable(name) if !self.variables.contains_key(name.as_str()) => {
					Some(self.undeclared_variable(name))
				}
				Expr::Call { name, args } => self.check_call(name, args.len()).err(),
				_ => None,
			};
		});
		first_error.map_or(Ok(()), Err)
	}

	fn undeclared_variable(&self, name: &str) -> QueryError {
		let message = match self.version {
			XPathVersion::V1 => format!("Variable {name}"),
			XPathVersion::V1Compat | XPathVersion::V2 => {
				format!("Undeclared variable in XPath expression: ${name}")
			}
		};
		QueryError::new(QueryErrorKind::UndeclaredVariable, message)
	}

	pub fn root_context(&self) -> Context {
		Context {
			item: Item::Node(self.tree.root()),
			position: 1,
			size: 1,
		}
	}

	pub fn eval(&self, expr: &Expr, ctx: Context) -> Result<Value, QueryError> {
		match expr {
			Expr::Path { absolute, steps } => {
				let start = if *absolute { Item::Document } else { ctx.item };
				self.apply_steps(vec![start], steps).map(Value::Nodes)
			}
			Expr::Filter {
				primary,
				predicates,
				steps,
			} => {
				let Value::Nodes(items) = self.eval(primary, ctx)? else {
					return Err(QueryError::type_error("Filter and path steps require a node sequence"));
				};
				let filtered = self.filter(items, predicates)?;
				self.apply_steps(filtered, steps).map(Value::Nodes)
			}
			Expr::Union(lhs, rhs) => {
				let (Value::Nodes(mut left), Value::Nodes(right)) = (self.eval(lhs, ctx)?, self.eval(rhs, ctx)?) else {
					return Err(QueryError::type_error("Union operands must be node sequences"));
				};
				left.extend(right);
				left.sort_unstable();
				left.dedup();
				Ok(Value::Nodes(left))
			}
			Expr::Binary(BinaryOp::Or, lhs, rhs) => {
				Ok(Value::Bool(self.boolean(&self.eval(lhs, ctx)?) || self.boolean(&self.eval(rhs, ctx)?)))
			}
			Expr::Binary(BinaryOp::And, lhs, rhs) => {
				Ok(Value::Bool(self.boolean(&self.eval(lhs, ctx)?) && self.boolean(&self.eval(rhs, ctx)?)))
			}
			Expr::Binary(op @ (BinaryOp::Add | BinaryOp::Sub), lhs, rhs) => {
				let a = self.arithmetic_operand(*op, self.eval(lhs, ctx)?)?;
				let b = self.arithmetic_operand(*op, self.eval(rhs, ctx)?)?;
				Ok(Value::Num(if *op == BinaryOp::Add { a + b } else { a - b }))
			}
			Expr::Binary(op, lhs, rhs) => {
				let lhs = self.eval(lhs, ctx)?;
				let rhs = self.eval(rhs, ctx)?;
				self.compare(*op, &lhs, &rhs).map(Value::Bool)
			}
			Expr::Negate(inner) => {
				let value = self.eval(inner, ctx)?;
				Ok(Value::Num(-self.arithmetic_operand(BinaryOp::Sub, value)?))
			}
			Expr::Literal(s) => Ok(Value::Str(s.clone())),
			Expr::Number(n) => Ok(Value::Num(*n)),
			Expr::Variable(name) => self.variables.get(name.as_str()).cloned().ok_or_else(|| self.undeclared_variable(name)),
			Expr::Call { name, args } => self.call(name, args, ctx),
		}
	}

	fn apply_steps(&self, mut items: Vec<Item>, steps: &[Step]) -> Result<Vec<Item>, QueryError> {
		for step in steps {
			let mut next = Vec::new();
			for &item in &items {
				let candidates: Vec<Item> = self
					.axis(item, step.axis)
					.into_iter()
					.filter(|&c| self.matches_test(c, step.axis, &step.test))
					.collect();
				next.extend(self.filter(candidates, &step.predicates)?);
			}
			next.sort_unstable();
			next.dedup();
			items = next;
		}
		Ok(items)
	}

	/// Applies predicates; `items` are in axis order, which is the order
	/// positions count in.
	fn filter(&self, mut items: Vec<Item>, predicates: &[Expr]) -> Result<Vec<Item>, QueryError> {
		for predicate in predicates {
			let size = items.len();
			let mut kept = Vec::with_capacity(size);
			for (i, &item) in items.iter().enumerate() {
				let ctx = Context {
					item,
					position: i + 1,
					size,
				};
				let keep = match self.eval(predicate, ctx)? {
					Value::Num(n) => n == ctx.position as f64,
					other => self.boolean(&other),
				};
				if keep {
					kept.push(item);
				}
			}
			items = kept;
		}
		Ok(items)
	}

	/// Items reachable along `axis`, in axis order.
	fn axis(&self, item: Item, axis: Axis) -> Vec<Item> {
		let tree = self.tree;
		let root = tree.root();
		let every_node = || std::iter::once(root).chain(tree.descendants(root)).map(Item::Node);

		match (item, axis) {
			(_, Axis::SelfAxis) => vec![item],

			(Item::Document, Axis::Child) => vec![Item::Node(root)],
			(Item::Document, Axis::Descendant) => every_node().collect(),
			(Item::Document, Axis::DescendantOrSelf) => std::iter::once(Item::Document).chain(every_node()).collect(),
			(Item::Document, Axis::AncestorOrSelf) => vec![Item::Document],
			(Item::Document, _) => Vec::new(),

			(Item::Node(n), Axis::Child) => tree.children(n).iter().copied().map(Item::Node).collect(),
			(Item::Node(n), Axis::Descendant) => tree.descendants(n).map(Item::Node).collect(),
			(Item::Node(n), Axis::DescendantOrSelf) => {
				std::iter::once(n).chain(tree.descendants(n)).map(Item::Node).collect()
			}
			(Item::Node(n), Axis::Parent) => vec![tree.parent(n).map_or(Item::Document, Item::Node)],
			(Item::Node(n), Axis::Ancestor) => self.ancestors_of(n),
			(Item::Node(n), Axis::AncestorOrSelf) => std::iter::once(item).chain(self.ancestors_of(n)).collect(),
			(Item::Node(n), Axis::Attribute) => {
				(0..tree.node(n).attributes().len()).map(|i| Item::Attr(n, i)).collect()
			}

			(Item::Attr(n, _), Axis::Parent) => vec![Item::Node(n)],
			(Item::Attr(n, _), Axis::Ancestor) => std::iter::once(Item::Node(n)).chain(self.ancestors_of(n)).collect(),
			(Item::Attr(n, _), Axis::AncestorOrSelf) => [item, Item::Node(n)]
				.into_iter()
				.chain(self.ancestors_of(n))
				.collect(),
			(Item::Attr(..), _) => Vec::new(),
		}
	}

	fn ancestors_of(&self, n: NodeIdx) -> Vec<Item> {
		self.tree
			.ancestors(n)
			.map(Item::Node)
			.chain(std::iter::once(Item::Document))
			.collect()
	}

	fn matches_test(&self, item: Item, axis: Axis, test: &NodeTest) -> bool {
		match (test, item) {
			(NodeTest::AnyNode, _) => true,
			(NodeTest::Wildcard, Item::Attr(..)) => axis == Axis::Attribute,
			(NodeTest::Wildcard, Item::Node(_)) => axis != Axis::Attribute,
			(NodeTest::Name(name), Item::Attr(n, i)) => {
				axis == Axis::Attribute && self.tree.node(n).attributes()[i].name == name.as_str()
			}
			(NodeTest::Name(name), Item::Node(n)) => axis != Axis::Attribute && self.tree.kind(n) == name.as_str(),
			(_, Item::Document) => false,
		}
	}

	pub(super) fn item_string(&self, item: Item) -> String {
		match item {
			Item::Document => self.tree.source().to_string(),
			Item::Node(n) => self.tree.text(n).to_string(),
			Item::Attr(n, i) => self.tree.node(n).attributes()[i].value.to_string(),
		}
	}

	pub(super) fn string(&self, value: &Value) -> String {
		match value {
			Value::Nodes(items) => items.first().map(|&i| self.item_string(i)).unwrap_or_default(),
			Value::Str(s) => s.clone(),
			Value::Num(n) => format_number(*n),
			Value::Bool(b) => b.to_string(),
		}
	}

	pub(super) fn number(&self, value: &Value) -> f64 {
		match value {
			Value::Nodes(_) => parse_number(&self.string(value)),
			Value::Str(s) => parse_number(s),
			Value::Num(n) => *n,
			Value::Bool(b) => f64::from(u8::from(*b)),
		}
	}

	pub(super) fn boolean(&self, value: &Value) -> bool {
		match value {
			Value::Nodes(items) => !items.is_empty(),
			Value::Str(s) => !s.is_empty(),
			Value::Num(n) => *n != 0.0 && !n.is_nan(),
			Value::Bool(b) => *b,
		}
	}

	fn arithmetic_operand(&self, op: BinaryOp, value: Value) -> Result<f64, QueryError> {
		if let Value::Str(s) = &value
			&& !self.version.coerces_comparisons()
			&& parse_number(s).is_nan()
		{
			return Err(QueryError::type_error(format!(
				"Arithmetic operator '{}' is not defined for xs:string",
				op.symbol()
			)));
		}
		Ok(self.number(&value))
	}

	fn atoms(&self, value: &Value) -> Vec<Atom> {
		match value {
			Value::Nodes(items) => items
				.iter()
				.map(|&item| match item {
					Item::Attr(n, i) => match &self.tree.node(n).attributes()[i].value {
						AttrValue::Str(s) => Atom::Str(s.clone()),
						AttrValue::Int(v) => Atom::Num(*v as f64),
						AttrValue::Bool(b) => Atom::Bool(*b),
					},
					other => Atom::Untyped(self.item_string(other)),
				})
				.collect(),
			Value::Str(s) => vec![Atom::Str(s.clone())],
			Value::Num(n) => vec![Atom::Num(*n)],
			Value::Bool(b) => vec![Atom::Bool(*b)],
		}
	}

	/// General comparison: true if any pair of atoms compares true.
	fn compare(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<bool, QueryError> {
		if self.version.coerces_comparisons() {
			// XPath 1.0: an empty node-set compared to a boolean is `false`.
			match (lhs, rhs) {
				(Value::Nodes(items), Value::Bool(b)) => {
					if items.is_empty() {
						return Ok(ordered(op, false, *b));
					}
				}
				(Value::Bool(b), Value::Nodes(items)) => {
					if items.is_empty() {
						return Ok(ordered(op, *b, false));
					}
				}
				_ => {}
			}
		}

		let left = self.atoms(lhs);
		let right = self.atoms(rhs);
		for a in &left {
			for b in &right {
				if self.compare_atoms(op, a, b)? {
					return Ok(true);
				}
			}
		}
		Ok(false)
	}

	fn compare_atoms(&self, op: BinaryOp, a: &Atom, b: &Atom) -> Result<bool, QueryError> {
		let equality = matches!(op, BinaryOp::Eq | BinaryOp::Neq);
		if self.version.coerces_comparisons() {
			return Ok(match (a, b) {
				(Atom::Bool(_), _) | (_, Atom::Bool(_)) if equality => ordered(op, a.as_bool(), b.as_bool()),
				(Atom::Num(_), _) | (_, Atom::Num(_)) => ordered_f64(op, a.as_num(), b.as_num()),
				_ if equality => ordered(op, a.as_str(), b.as_str()),
				_ => ordered_f64(op, a.as_num(), b.as_num()),
			});
		}

		Ok(match (a, b) {
			(Atom::Untyped(x), Atom::Untyped(y))
			| (Atom::Untyped(x), Atom::Str(y))
			| (Atom::Str(x), Atom::Untyped(y))
			| (Atom::Str(x), Atom::Str(y)) => ordered(op, x.as_str(), y.as_str()),
			(Atom::Num(x), Atom::Num(y)) => ordered_f64(op, *x, *y),
			(Atom::Untyped(x), Atom::Num(y)) => ordered_f64(op, parse_number(x), *y),
			(Atom::Num(x), Atom::Untyped(y)) => ordered_f64(op, *x, parse_number(y)),
			(Atom::Bool(x), Atom::Bool(y)) => ordered(op, *x, *y),
			(Atom::Untyped(x), Atom::Bool(y)) => ordered(op, untyped_bool(x), *y),
			(Atom::Bool(x), Atom::Untyped(y)) => ordered(op, *x, untyped_bool(y)),
			_ => {
				return Err(QueryError::type_error(format!(
					"Cannot compare {} to {}",
					a.type_name(),
					b.type_name()
				)));
			}
		})
	}

	pub(super) fn regex(&self, pattern: &str) -> Result<Regex, QueryError> {
		if let Some(re) = self.regexes.borrow().get(pattern) {
			return Ok(re.clone());
		}
		let re = Regex::new(pattern)
			.map_err(|e| QueryError::new(QueryErrorKind::Regex, format!("Invalid regular expression '{pattern}': {e}")))?;
		self.regexes.borrow_mut().insert(pattern.to_string(), re.clone());
		Ok(re)
	}
}

fn ordered<T: PartialOrd>(op: BinaryOp, a: T, b: T) -> bool {
	match op {
		BinaryOp::Eq => a == b,
		BinaryOp::Neq => a != b,
		BinaryOp::Lt => a < b,
		BinaryOp::Le => a <= b,
		BinaryOp::Gt => a > b,
		BinaryOp::Ge => a >= b,
		_ => false,
	}
}

fn ordered_f64(op: BinaryOp, a: f64, b: f64) -> bool {
	ordered(op, a, b)
}

fn untyped_bool(s: &str) -> bool {
	matches!(s.trim(), "true" | "1")
}

/// Bound property values are typed by their text.
fn property_value(text: &str) -> Value {
	match text {
		"true" => Value::Bool(true),
		"false" => Value::Bool(false),
		_ => match text.trim().parse::<f64>() {
			Ok(n) => Value::Num(n),
			Err(_) => Value::Str(text.to_string()),
		},
	}
}

fn parse_number(s: &str) -> f64 {
	s.trim().parse().unwrap_or(f64::NAN)
}

pub(super) fn format_number(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_string()
	} else if n.is_infinite() {
		if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
	} else if n.fract() == 0.0 && n.abs() < 1e15 {
		format!("{}", n as i64)
	} else {
		n.to_string()
	}
}
