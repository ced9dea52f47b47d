//! Char-index tokenizer for XPath expressions.

use crate::engine::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
	Slash,
	DoubleSlash,
	LBracket,
	RBracket,
	LParen,
	RParen,
	At,
	Comma,
	Pipe,
	Dot,
	DotDot,
	ColonColon,
	Star,
	Plus,
	Minus,
	Eq,
	Neq,
	Lt,
	Le,
	Gt,
	Ge,
	Name(String),
	Variable(String),
	Literal(String),
	Number(f64),
}

/// Token with the char offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
	pub token: Token,
	pub at: usize,
}

fn is_name_start(c: char) -> bool {
	c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '-'
}

pub(super) fn tokenize(expression: &str) -> Result<Vec<Spanned>, QueryError> {
	let chars: Vec<char> = expression.chars().collect();
	let mut out = Vec::new();
	let mut i = 0usize;

	while i < chars.len() {
		let c = chars[i];
		if c.is_whitespace() {
			i += 1;
			continue;
		}
		let at = i;
		let next = chars.get(i + 1).copied();

		let (token, len) = match c {
			'/' if next == Some('/') => (Token::DoubleSlash, 2),
			'/' => (Token::Slash, 1),
			'[' => (Token::LBracket, 1),
			']' => (Token::RBracket, 1),
			'(' => (Token::LParen, 1),
			')' => (Token::RParen, 1),
			'@' => (Token::At, 1),
			',' => (Token::Comma, 1),
			'|' => (Token::Pipe, 1),
			'*' => (Token::Star, 1),
			'+' => (Token::Plus, 1),
			'-' => (Token::Minus, 1),
			'=' => (Token::Eq, 1),
			'!' if next == Some('=') => (Token::Neq, 2),
			'<' if next == Some('=') => (Token::Le, 2),
			'<' => (Token::Lt, 1),
			'>' if next == Some('=') => (Token::Ge, 2),
			'>' => (Token::Gt, 1),
			':' if next == Some(':') => (Token::ColonColon, 2),
			'.' if next == Some('.') => (Token::DotDot, 2),
			'.' if next.is_some_and(|n| n.is_ascii_digit()) => {
				let (value, len) = number(&chars[i..]);
				(Token::Number(value), len)
			}
			'.' => (Token::Dot, 1),
			'"' | '\'' => {
				let quote = c;
				let end = chars[i + 1..]
					.iter()
					.position(|&ch| ch == quote)
					.ok_or_else(|| QueryError::syntax(format!("Unterminated string literal at position {at}")))?;
				let literal: String = chars[i + 1..i + 1 + end].iter().collect();
				(Token::Literal(literal), end + 2)
			}
			'$' => {
				let len = name_len(&chars[i + 1..]);
				if len == 0 {
					return Err(QueryError::syntax(format!("Expected a variable name at position {at}")));
				}
				let name: String = chars[i + 1..i + 1 + len].iter().collect();
				(Token::Variable(name), len + 1)
			}
			c if c.is_ascii_digit() => {
				let (value, len) = number(&chars[i..]);
				(Token::Number(value), len)
			}
			c if is_name_start(c) => {
				let len = name_len(&chars[i..]);
				(Token::Name(chars[i..i + len].iter().collect()), len)
			}
			other => {
				return Err(QueryError::syntax(format!("Unexpected character '{other}' at position {at}")));
			}
		};
		out.push(Spanned { token, at });
		i += len;
	}
	Ok(out)
}

fn name_len(chars: &[char]) -> usize {
	match chars.first() {
		Some(&c) if is_name_start(c) => 1 + chars[1..].iter().take_while(|&&c| is_name_char(c)).count(),
		_ => 0,
	}
}

fn number(chars: &[char]) -> (f64, usize) {
	let int = chars.iter().take_while(|c| c.is_ascii_digit()).count();
	let mut len = int;
	if chars.get(len) == Some(&'.') {
		len += 1 + chars[len + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
	}
	let text: String = chars[..len].iter().collect();
	(text.parse().unwrap_or(f64::NAN), len)
}
