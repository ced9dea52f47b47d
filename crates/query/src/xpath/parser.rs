//! Recursive-descent parser from tokens to [`Expr`].

use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use super::lexer::{Spanned, Token, tokenize};
use crate::engine::QueryError;

pub(super) fn parse(expression: &str) -> Result<Expr, QueryError> {
	let tokens = tokenize(expression)?;
	let mut parser = Parser { tokens, pos: 0 };
	let expr = parser.expr()?;
	match parser.peek() {
		None => Ok(expr),
		Some(_) => Err(parser.unexpected()),
	}
}

struct Parser {
	tokens: Vec<Spanned>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos).map(|s| &s.token)
	}

	fn peek_at(&self, offset: usize) -> Option<&Token> {
		self.tokens.get(self.pos + offset).map(|s| &s.token)
	}

	fn bump(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.pos).map(|s| s.token.clone());
		self.pos += 1;
		token
	}

	fn eat(&mut self, token: &Token) -> bool {
		if self.peek() == Some(token) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn eat_keyword(&mut self, keyword: &str) -> bool {
		if matches!(self.peek(), Some(Token::Name(n)) if n == keyword) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn expect(&mut self, token: Token) -> Result<(), QueryError> {
		if self.eat(&token) { Ok(()) } else { Err(self.unexpected()) }
	}

	fn unexpected(&self) -> QueryError {
		match self.tokens.get(self.pos) {
			Some(s) => QueryError::syntax(format!("Unexpected token {:?} at position {}", s.token, s.at)),
			None => QueryError::syntax("Unexpected end of expression"),
		}
	}

	fn expr(&mut self) -> Result<Expr, QueryError> {
		self.or_expr()
	}

	fn or_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.and_expr()?;
		while self.eat_keyword("or") {
			let rhs = self.and_expr()?;
			lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
		}
		Ok(lhs)
	}

	fn and_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.equality_expr()?;
		while self.eat_keyword("and") {
			let rhs = self.equality_expr()?;
			lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
		}
		Ok(lhs)
	}

	fn equality_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.relational_expr()?;
		loop {
			let op = match self.peek() {
				Some(Token::Eq) => BinaryOp::Eq,
				Some(Token::Neq) => BinaryOp::Neq,
				_ => return Ok(lhs),
			};
			self.pos += 1;
			let rhs = self.relational_expr()?;
			lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
		}
	}

	fn relational_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.additive_expr()?;
		loop {
			let op = match self.peek() {
				Some(Token::Lt) => BinaryOp::Lt,
				Some(Token::Le) => BinaryOp::Le,
				Some(Token::Gt) => BinaryOp::Gt,
				Some(Token::Ge) => BinaryOp::Ge,
				_ => return Ok(lhs),
			};
			self.pos += 1;
			let rhs = self.additive_expr()?;
			lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
		}
	}

	fn additive_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.unary_expr()?;
		loop {
			let op = match self.peek() {
				Some(Token::Plus) => BinaryOp::Add,
				Some(Token::Minus) => BinaryOp::Sub,
				_ => return Ok(lhs),
			};
			self.pos += 1;
			let rhs = self.unary_expr()?;
			lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
		}
	}

	fn unary_expr(&mut self) -> Result<Expr, QueryError> {
		if self.eat(&Token::Minus) {
			return Ok(Expr::Negate(Box::new(self.unary_expr()?)));
		}
		self.union_expr()
	}

	fn union_expr(&mut self) -> Result<Expr, QueryError> {
		let mut lhs = self.path_expr()?;
		while self.eat(&Token::Pipe) {
			let rhs = self.path_expr()?;
			lhs = Expr::Union(Box::new(lhs), Box::new(rhs));
		}
		Ok(lhs)
	}

	fn path_expr(&mut self) -> Result<Expr, QueryError> {
		if self.starts_primary() {
			let primary = self.primary_expr()?;
			let predicates = self.predicates()?;
			let steps = match self.peek() {
				Some(Token::Slash | Token::DoubleSlash) => self.continued_steps()?,
				_ => Vec::new(),
			};
			if predicates.is_empty() && steps.is_empty() {
				return Ok(primary);
			}
			return Ok(Expr::Filter {
				primary: Box::new(primary),
				predicates,
				steps,
			});
		}

		match self.peek() {
			Some(Token::Slash) => {
				self.pos += 1;
				let steps = if self.starts_step() { self.relative_path()? } else { Vec::new() };
				Ok(Expr::Path { absolute: true, steps })
			}
			Some(Token::DoubleSlash) => {
				self.pos += 1;
				let mut steps = vec![Step::descendant_or_self()];
				steps.extend(self.relative_path()?);
				Ok(Expr::Path { absolute: true, steps })
			}
			_ => Ok(Expr::Path {
				absolute: false,
				steps: self.relative_path()?,
			}),
		}
	}

	/// Literals, numbers, variables, parenthesized expressions and function
	/// calls. `node()` is a node test, not a call.
	fn starts_primary(&self) -> bool {
		match self.peek() {
			Some(Token::Literal(_) | Token::Number(_) | Token::Variable(_) | Token::LParen) => true,
			Some(Token::Name(name)) => {
				self.peek_at(1) == Some(&Token::LParen) && name != "node" && Axis::from_name(name).is_none()
			}
			_ => false,
		}
	}

	fn starts_step(&self) -> bool {
		matches!(
			self.peek(),
			Some(Token::Name(_) | Token::Star | Token::At | Token::Dot | Token::DotDot)
		)
	}

	fn primary_expr(&mut self) -> Result<Expr, QueryError> {
		match self.bump() {
			Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
			Some(Token::Number(n)) => Ok(Expr::Number(n)),
			Some(Token::Variable(v)) => Ok(Expr::Variable(v)),
			Some(Token::LParen) => {
				let inner = self.expr()?;
				self.expect(Token::RParen)?;
				Ok(inner)
			}
			Some(Token::Name(name)) => {
				self.expect(Token::LParen)?;
				let mut args = Vec::new();
				if !self.eat(&Token::RParen) {
					loop {
						args.push(self.expr()?);
						if self.eat(&Token::RParen) {
							break;
						}
						self.expect(Token::Comma)?;
					}
				}
				Ok(Expr::Call { name, args })
			}
			_ => {
				self.pos -= 1;
				Err(self.unexpected())
			}
		}
	}

	/// Steps after a filter expression: `(...)/a//b`.
	fn continued_steps(&mut self) -> Result<Vec<Step>, QueryError> {
		let mut steps = Vec::new();
		loop {
			match self.peek() {
				Some(Token::Slash) => self.pos += 1,
				Some(Token::DoubleSlash) => {
					self.pos += 1;
					steps.push(Step::descendant_or_self());
				}
				_ => return Ok(steps),
			}
			steps.push(self.step()?);
		}
	}

	fn relative_path(&mut self) -> Result<Vec<Step>, QueryError> {
		let mut steps = vec![self.step()?];
		steps.extend(self.continued_steps()?);
		Ok(steps)
	}

	fn step(&mut self) -> Result<Step, QueryError> {
		if self.eat(&Token::Dot) {
			return Ok(Step {
				axis: Axis::SelfAxis,
				test: NodeTest::AnyNode,
				predicates: Vec::new(),
			});
		}
		if self.eat(&Token::DotDot) {
			return Ok(Step {
				axis: Axis::Parent,
				test: NodeTest::AnyNode,
				predicates: Vec::new(),
			});
		}

		let axis = if self.eat(&Token::At) {
			Axis::Attribute
		} else if let (Some(Token::Name(name)), Some(Token::ColonColon)) = (self.peek(), self.peek_at(1)) {
			let axis = Axis::from_name(name)
				.ok_or_else(|| QueryError::syntax(format!("Unknown axis '{name}'")))?;
			self.pos += 2;
			axis
		} else {
			Axis::Child
		};

		let test = match self.bump() {
			Some(Token::Star) => NodeTest::Wildcard,
			Some(Token::Name(name)) if name == "node" && self.peek() == Some(&Token::LParen) => {
				self.expect(Token::LParen)?;
				self.expect(Token::RParen)?;
				NodeTest::AnyNode
			}
			Some(Token::Name(name)) => NodeTest::Name(name),
			_ => {
				self.pos -= 1;
				return Err(self.unexpected());
			}
		};

		Ok(Step {
			axis,
			test,
			predicates: self.predicates()?,
		})
	}

	fn predicates(&mut self) -> Result<Vec<Expr>, QueryError> {
		let mut predicates = Vec::new();
		while self.eat(&Token::LBracket) {
			predicates.push(self.expr()?);
			self.expect(Token::RBracket)?;
		}
		Ok(predicates)
	}
}
