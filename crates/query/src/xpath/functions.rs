//! Function library.

use super::ast::Expr;
use super::eval::{Context, Evaluator, Value};
use crate::dialect::XPathVersion;
use crate::engine::{QueryError, QueryErrorKind};

struct Signature {
	name: &'static str,
	min: usize,
	max: usize,
	/// Only available in the XPath 2.0 dialects.
	v2: bool,
}

const fn sig(name: &'static str, min: usize, max: usize, v2: bool) -> Signature {
	Signature { name, min, max, v2 }
}

const FUNCTIONS: &[Signature] = &[
	sig("boolean", 1, 1, false),
	sig("concat", 2, usize::MAX, false),
	sig("contains", 2, 2, false),
	sig("count", 1, 1, false),
	sig("false", 0, 0, false),
	sig("last", 0, 0, false),
	sig("not", 1, 1, false),
	sig("number", 0, 1, false),
	sig("position", 0, 0, false),
	sig("starts-with", 2, 2, false),
	sig("string", 0, 1, false),
	sig("string-length", 0, 1, false),
	sig("true", 0, 0, false),
	sig("ends-with", 2, 2, true),
	sig("lower-case", 1, 1, true),
	sig("matches", 2, 2, true),
	sig("upper-case", 1, 1, true),
];

impl Evaluator<'_> {
	pub(super) fn call(&self, name: &str, args: &[Expr], ctx: Context) -> Result<Value, QueryError> {
		self.check_call(name, args.len())?;

		let values = args
			.iter()
			.map(|a| self.eval(a, ctx))
			.collect::<Result<Vec<_>, _>>()?;
		let context_string = || self.item_string(ctx.item);
		let str_arg = |i: usize| self.string(&values[i]);

		Ok(match name {
			"boolean" => Value::Bool(self.boolean(&values[0])),
			"concat" => Value::Str(values.iter().map(|v| self.string(v)).collect()),
			"contains" => Value::Bool(str_arg(0).contains(&str_arg(1))),
			"count" => match &values[0] {
				Value::Nodes(items) => Value::Num(items.len() as f64),
				_ => return Err(QueryError::type_error("count() requires a node sequence")),
			},
			"false" => Value::Bool(false),
			"last" => Value::Num(ctx.size as f64),
			"not" => Value::Bool(!self.boolean(&values[0])),
			"number" => Value::Num(match values.first() {
				Some(v) => self.number(v),
				None => self.number(&Value::Str(context_string())),
			}),
			"position" => Value::Num(ctx.position as f64),
			"starts-with" => Value::Bool(str_arg(0).starts_with(&str_arg(1))),
			"string" => Value::Str(match values.first() {
				Some(v) => self.string(v),
				None => context_string(),
			}),
			"string-length" => {
				let s = match values.first() {
					Some(v) => self.string(v),
					None => context_string(),
				};
				Value::Num(s.chars().count() as f64)
			}
			"true" => Value::Bool(true),
			"ends-with" => Value::Bool(str_arg(0).ends_with(&str_arg(1))),
			"lower-case" => Value::Str(str_arg(0).to_lowercase()),
			"upper-case" => Value::Str(str_arg(0).to_uppercase()),
			"matches" => Value::Bool(self.regex(&str_arg(1))?.is_match(&str_arg(0))),
			_ => return Err(self.unknown_function(name, args.len())),
		})
	}

	/// Fails unless `name` exists in the dialect and accepts `arity` arguments.
	pub(super) fn check_call(&self, name: &str, arity: usize) -> Result<(), QueryError> {
		let available = FUNCTIONS
			.iter()
			.find(|f| f.name == name && (self.version.has_v2_functions() || !f.v2));
		match available {
			Some(signature) if (signature.min..=signature.max).contains(&arity) => Ok(()),
			_ => Err(self.unknown_function(name, arity)),
		}
	}

	fn unknown_function(&self, name: &str, arity: usize) -> QueryError {
		let message = match self.version {
			XPathVersion::V1 => format!("No such function {name}()"),
			XPathVersion::V1Compat | XPathVersion::V2 => {
				format!("Cannot find a {arity}-argument function named {name}()")
			}
		};
		QueryError::new(QueryErrorKind::UnknownFunction, message)
	}
}
