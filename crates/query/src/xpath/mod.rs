//! Built-in XPath evaluator.
//!
//! Supports location paths with the `child`, `descendant`,
//! `descendant-or-self`, `self`, `parent`, `ancestor`, `ancestor-or-self` and
//! `attribute` axes, name and `*` tests, `node()`, predicates, unions,
//! boolean and comparison operators, `+`/`-`, literals, `$variables` bound
//! from properties and a small function library.
//!
//! Element names are node kinds; attributes are the node's attributes with
//! their types kept (`@Public = true()` compares booleans).

mod ast;
mod eval;
mod functions;
mod lexer;
mod parser;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use quarry_tree::{NodeRef, SyntaxTree};
use tracing::trace;

use self::ast::Expr;
use self::eval::{Evaluator, Item, Value};
use crate::dialect::XPathVersion;
use crate::engine::{Properties, QueryEngine, QueryError};

/// XPath evaluator keeping the last compiled expression.
#[derive(Default)]
pub struct XPathEngine {
	compiled: RefCell<Option<(String, Rc<Expr>)>>,
}

impl XPathEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Checks that `expression` parses.
	pub fn validate(&self, expression: &str) -> Result<(), QueryError> {
		self.compile(expression).map(drop)
	}

	fn compile(&self, expression: &str) -> Result<Rc<Expr>, QueryError> {
		if let Some((source, expr)) = self.compiled.borrow().as_ref()
			&& source == expression
		{
			return Ok(Rc::clone(expr));
		}
		let expr = Rc::new(parser::parse(expression)?);
		*self.compiled.borrow_mut() = Some((expression.to_string(), Rc::clone(&expr)));
		Ok(expr)
	}
}

impl QueryEngine for XPathEngine {
	fn evaluate(
		&self,
		tree: &Arc<SyntaxTree>,
		version: XPathVersion,
		expression: &str,
		properties: &Properties,
	) -> Result<Vec<NodeRef>, QueryError> {
		let expr = self.compile(expression)?;
		let evaluator = Evaluator::new(tree, version, properties);
		evaluator.check_static(&expr)?;

		let Value::Nodes(items) = evaluator.eval(&expr, evaluator.root_context())? else {
			let message = match version {
				XPathVersion::V1 => "Expression does not evaluate to a node-set",
				XPathVersion::V1Compat | XPathVersion::V2 => "Query must return a sequence of nodes",
			};
			return Err(QueryError::type_error(message));
		};

		let mut nodes: Vec<_> = items
			.into_iter()
			.map(|item| match item {
				Item::Document => tree.root(),
				Item::Node(n) | Item::Attr(n, _) => n,
			})
			.collect();
		nodes.dedup();
		trace!(%version, expression, matches = nodes.len(), "xpath.evaluated");
		Ok(nodes.into_iter().map(|n| NodeRef::new(Arc::clone(tree), n)).collect())
	}
}

#[cfg(test)]
mod tests;
